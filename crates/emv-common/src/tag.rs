//! BER-TLV tag identifier

use std::fmt;

use serde::{Serialize, Serializer};

use crate::tags::TEMPLATE_TAGS;

/// Longest tag this engine accepts
pub const MAX_TAG_LEN: usize = 4;

/// EMV tag identifier (1 to 4 encoded bytes)
///
/// Equality is structural: two tags are the same when their encoded bytes
/// are the same.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    bytes: [u8; MAX_TAG_LEN],
    len: u8,
}

impl Tag {
    /// Single-byte tag such as `5A`
    pub const fn one(b0: u8) -> Self {
        Self {
            bytes: [b0, 0, 0, 0],
            len: 1,
        }
    }

    /// Two-byte tag such as `9F36`
    pub const fn two(b0: u8, b1: u8) -> Self {
        Self {
            bytes: [b0, b1, 0, 0],
            len: 2,
        }
    }

    /// Build a tag from its encoded bytes
    ///
    /// Returns `None` for an empty slice or one longer than [`MAX_TAG_LEN`].
    pub fn from_bytes(encoded: &[u8]) -> Option<Self> {
        if encoded.is_empty() || encoded.len() > MAX_TAG_LEN {
            return None;
        }
        let mut bytes = [0u8; MAX_TAG_LEN];
        bytes[..encoded.len()].copy_from_slice(encoded);
        Some(Self {
            bytes,
            len: encoded.len() as u8,
        })
    }

    /// Encoded tag bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Number of encoded bytes
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Always false; a tag has at least one byte
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Constructed bit (bit 6 of the first byte)
    pub fn is_constructed(&self) -> bool {
        self.bytes[0] & 0x20 != 0
    }

    /// Whether the codec recurses into this tag's value
    ///
    /// Only the template allow-list counts. Cards in the field mark some
    /// templates inconsistently, and opaque blobs such as certificates must
    /// never be expanded.
    pub fn is_template(&self) -> bool {
        TEMPLATE_TAGS.contains(self)
    }

    /// Table description, if the tag is known
    pub fn name(&self) -> Option<&'static str> {
        crate::tags::tag_name(self.as_bytes())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.as_bytes() {
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_bounds() {
        assert!(Tag::from_bytes(&[]).is_none());
        assert!(Tag::from_bytes(&[0xDF, 0x81, 0x81, 0x01, 0x02]).is_none());
        assert_eq!(Tag::from_bytes(&[0x9F, 0x36]), Some(Tag::two(0x9F, 0x36)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Tag::one(0x5A).to_string(), "5A");
        assert_eq!(Tag::from_bytes(&[0xDF, 0x81, 0x04]).unwrap().to_string(), "DF8104");
    }

    #[test]
    fn test_constructed_bit() {
        assert!(Tag::one(0x70).is_constructed());
        assert!(Tag::one(0xA5).is_constructed());
        assert!(!Tag::one(0x5A).is_constructed());
        // 80 and 84 are primitive by encoding but still expanded
        assert!(!Tag::one(0x84).is_constructed());
        assert!(Tag::one(0x84).is_template());
    }
}
