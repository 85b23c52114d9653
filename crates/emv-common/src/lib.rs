//! EMV Common - Tags, BER-TLV codec and semantic decoding for EMV data
//!
//! Everything in this crate is pure: byte slices in, owned values out. The
//! tag table is static data shared by the whole process.

pub mod decode;
pub mod tag;
pub mod tags;
pub mod tlv;

pub use decode::{decode, decode_field, decode_nodes, DecodedField, DecodedValue};
pub use tag::Tag;
pub use tags::{get_tag_name, tag_name, EMV_TAGS};
pub use tlv::{find_tag, parse, TlvError, TlvNode};
