//! EMV Card - Smart card reading and EMV card data acquisition
//!
//! This crate talks to EMV payment cards over a [`CardChannel`] (PC/SC in
//! production), walks them through application selection and the record
//! scan, and returns everything read as an [`AcquisitionResult`].

pub mod apdu;
pub mod atr;
pub mod channel;
pub mod policy;
pub mod protocol;
pub mod reader;
pub mod session;

pub use apdu::{ApduCommand, ApduResponse, SwClass};
pub use atr::{decode_atr, describe_atr, AtrInfo};
pub use channel::{CardChannel, ChannelError};
pub use policy::{ScanPolicy, ScanStrategy};
pub use protocol::{Sequencer, SequencerState};
pub use reader::{CardReader, PcscChannel};
pub use session::{
    acquire, AcquisitionResult, AcquisitionSession, AcquisitionStatus, CardBrand, CardRecord,
    CardSummary, PollOutcome,
};

/// Re-export commonly used types
pub use pcsc::Error as PcscError;
