//! BER-TLV (Tag-Length-Value) codec for EMV data
//!
//! [`parse`] never fails: malformed or truncated input yields the nodes
//! decoded before the fault, and a bad template only loses its own nesting
//! level. [`parse_strict`] reports the first fault instead.

use thiserror::Error;
use tracing::debug;

use crate::tag::{Tag, MAX_TAG_LEN};

/// Deepest template level expanded into children
///
/// A template found below this level is kept whole as raw bytes by
/// [`parse`] and rejected by [`parse_strict`].
pub const MAX_DEPTH: usize = 32;

/// Errors raised while reading a TLV header or value
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TlvError {
    #[error("unexpected end of data while reading tag at offset {0}")]
    TruncatedTag(usize),

    #[error("tag at offset {0} is longer than four bytes")]
    TagTooLong(usize),

    #[error("unexpected end of data while reading length at offset {0}")]
    TruncatedLength(usize),

    #[error("unsupported length byte {byte:#04X} at offset {offset}")]
    InvalidLength { offset: usize, byte: u8 },

    #[error("value at offset {offset} needs {needed} bytes but only {available} remain")]
    TruncatedValue {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("template at offset {offset} is nested deeper than {max} levels", max = MAX_DEPTH)]
    TooDeep { offset: usize },
}

/// One decoded TLV data object
///
/// Leaves have no children. Containers keep their undecoded payload in
/// `raw_value` next to the parsed `children`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlvNode {
    pub tag: Tag,
    pub raw_value: Vec<u8>,
    pub children: Vec<TlvNode>,
    /// Depth below the response root (0 for top-level objects)
    pub level: usize,
}

impl TlvNode {
    /// Whether this node was expanded as a template
    pub fn is_container(&self) -> bool {
        self.tag.is_template()
    }

    /// Depth-first search for a tag, starting with this node
    pub fn find(&self, tag: Tag) -> Option<&TlvNode> {
        if self.tag == tag {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(tag))
    }

    /// Bytes this node occupies with a minimal length encoding
    pub fn encoded_len(&self) -> usize {
        self.tag.len() + encode_length(self.raw_value.len()).len() + self.raw_value.len()
    }
}

/// Tag and length of one data object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub tag: Tag,
    pub length: usize,
    /// Bytes consumed by tag and length fields
    pub header_len: usize,
}

/// Read a tag starting at `offset`, returning it with its encoded length
pub fn read_tag(data: &[u8], offset: usize) -> Result<(Tag, usize), TlvError> {
    let first = *data.get(offset).ok_or(TlvError::TruncatedTag(offset))?;
    let mut end = offset + 1;

    // Low five bits all set: subsequent bytes follow while bit 8 is set
    if first & 0x1F == 0x1F {
        loop {
            let byte = *data.get(end).ok_or(TlvError::TruncatedTag(offset))?;
            end += 1;
            if end - offset > MAX_TAG_LEN {
                return Err(TlvError::TagTooLong(offset));
            }
            if byte & 0x80 == 0 {
                break;
            }
        }
    }

    let tag = Tag::from_bytes(&data[offset..end]).ok_or(TlvError::TagTooLong(offset))?;
    Ok((tag, end - offset))
}

fn read_length(data: &[u8], offset: usize) -> Result<(usize, usize), TlvError> {
    let first = *data.get(offset).ok_or(TlvError::TruncatedLength(offset))?;
    if first & 0x80 == 0 {
        return Ok((first as usize, 1));
    }

    let count = (first & 0x7F) as usize;
    if count == 0 || count > std::mem::size_of::<u32>() {
        return Err(TlvError::InvalidLength {
            offset,
            byte: first,
        });
    }
    let bytes = data
        .get(offset + 1..offset + 1 + count)
        .ok_or(TlvError::TruncatedLength(offset))?;
    let length = bytes
        .iter()
        .fold(0usize, |acc, &byte| (acc << 8) | byte as usize);

    Ok((length, 1 + count))
}

/// Read the tag and length fields starting at `offset`
pub fn read_header(data: &[u8], offset: usize) -> Result<Header, TlvError> {
    let (tag, tag_len) = read_tag(data, offset)?;
    let (length, length_len) = read_length(data, offset + tag_len)?;
    Ok(Header {
        tag,
        length,
        header_len: tag_len + length_len,
    })
}

/// Parse a response body into a TLV tree, keeping whatever decodes cleanly
pub fn parse(data: &[u8]) -> Vec<TlvNode> {
    // Lenient parsing reports faults through the log only
    parse_level(data, 0, false).unwrap_or_default()
}

/// Parse a response body, failing on the first malformed object
pub fn parse_strict(data: &[u8]) -> Result<Vec<TlvNode>, TlvError> {
    parse_level(data, 0, true)
}

fn stop(
    err: TlvError,
    strict: bool,
    nodes: Vec<TlvNode>,
    level: usize,
) -> Result<Vec<TlvNode>, TlvError> {
    if strict {
        return Err(err);
    }
    debug!(error = %err, level, parsed = nodes.len(), "TLV parsing stopped early");
    Ok(nodes)
}

fn parse_level(data: &[u8], level: usize, strict: bool) -> Result<Vec<TlvNode>, TlvError> {
    let mut nodes = Vec::new();
    let mut offset = 0;

    while offset < data.len() {
        let header = match read_header(data, offset) {
            Ok(header) => header,
            Err(err) => return stop(err, strict, nodes, level),
        };

        let start = offset + header.header_len;
        let available = data.len() - start;
        if header.length > available {
            let err = TlvError::TruncatedValue {
                offset: start,
                needed: header.length,
                available,
            };
            return stop(err, strict, nodes, level);
        }

        let raw_value = &data[start..start + header.length];
        let children = match header.tag.is_template() {
            true if level < MAX_DEPTH => parse_level(raw_value, level + 1, strict)?,
            true if strict => return Err(TlvError::TooDeep { offset }),
            true => {
                debug!(tag = %header.tag, level, "Template nested too deeply, kept unexpanded");
                Vec::new()
            }
            false => Vec::new(),
        };

        nodes.push(TlvNode {
            tag: header.tag,
            raw_value: raw_value.to_vec(),
            children,
            level,
        });
        offset = start + header.length;
    }

    Ok(nodes)
}

/// Encode a length field, short form below 128 and long form above
pub fn encode_length(length: usize) -> Vec<u8> {
    if length < 0x80 {
        return vec![length as u8];
    }
    let bytes = (length as u32).to_be_bytes();
    let skip = bytes.iter().take_while(|&&byte| byte == 0).count();
    let mut encoded = vec![0x80 | (bytes.len() - skip) as u8];
    encoded.extend_from_slice(&bytes[skip..]);
    encoded
}

/// Encode a single data object
pub fn encode(tag: Tag, value: &[u8]) -> Vec<u8> {
    let mut encoded = tag.as_bytes().to_vec();
    encoded.extend(encode_length(value.len()));
    encoded.extend_from_slice(value);
    encoded
}

/// Search the top level of EMV-encoded data for a tag and return its value
///
/// Multi-byte tags and long-form lengths are handled; nested templates are
/// not entered, so callers unwrap a template first and search inside it.
///
/// # Returns
/// * `Some(&[u8])` - The value bytes if tag is found
/// * `None` - If tag is not found or data is malformed
pub fn find_tag<'a>(data: &'a [u8], tag: &[u8]) -> Option<&'a [u8]> {
    let mut offset = 0;
    while offset < data.len() {
        let header = read_header(data, offset).ok()?;
        let start = offset + header.header_len;
        let value = data.get(start..)?.get(..header.length)?;

        if header.tag.as_bytes() == tag {
            return Some(value);
        }
        offset = start + header.length;
    }
    None
}
