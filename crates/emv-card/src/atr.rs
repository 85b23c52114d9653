//! ATR (Answer To Reset) decoding
//!
//! Only the parts useful for a human reading a dump are decoded: the
//! convention byte, which first-level interface bytes are present, and the
//! historical bytes. The annotation is best effort and never blocks an
//! acquisition.

use serde::Serialize;
use thiserror::Error;

/// Reasons an ATR could not be annotated
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AtrError {
    #[error("ATR too short: {0} bytes")]
    TooShort(usize),
}

/// Bit convention announced by TS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Convention {
    Direct,
    Inverse,
}

/// Interpretation of the historical bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum HistoricalBytes {
    /// Every byte is printable ASCII, empty when K is zero
    Text(String),
    /// Uppercase hex otherwise
    Hex(String),
}

/// Decoded ATR
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtrInfo {
    /// `None` when TS is neither 3B nor 3F
    pub convention: Option<Convention>,
    pub ta1_present: bool,
    pub tb1_present: bool,
    pub tc1_present: bool,
    pub td1_present: bool,
    /// K, the low nibble of T0
    pub historical_count: usize,
    /// At most K trailing bytes, fewer when the ATR is cut short
    pub historical: HistoricalBytes,
}

impl AtrInfo {
    /// Short annotations in display order
    pub fn annotations(&self) -> Vec<String> {
        let mut notes = Vec::new();

        match self.convention {
            Some(Convention::Direct) => notes.push("Direct Convention".to_string()),
            Some(Convention::Inverse) => notes.push("Inverse Convention".to_string()),
            None => {}
        }

        let interface = [
            (self.ta1_present, "TA1 present"),
            (self.tb1_present, "TB1 present"),
            (self.tc1_present, "TC1 present"),
            (self.td1_present, "TD1 present"),
        ];
        notes.extend(
            interface
                .iter()
                .filter(|(present, _)| *present)
                .map(|(_, note)| note.to_string()),
        );

        match &self.historical {
            HistoricalBytes::Text(text) => notes.push(format!("Historical: {}", text)),
            HistoricalBytes::Hex(hex) => notes.push(format!("Historical: {}", hex)),
        }

        notes
    }
}

/// Decode the convention, interface byte flags and historical bytes
pub fn decode_atr(atr: &[u8]) -> Result<AtrInfo, AtrError> {
    let [ts, t0, rest @ ..] = atr else {
        return Err(AtrError::TooShort(atr.len()));
    };

    let convention = match ts {
        0x3B => Some(Convention::Direct),
        0x3F => Some(Convention::Inverse),
        _ => None,
    };

    let y1 = t0 >> 4;
    let k = (t0 & 0x0F) as usize;

    // The historical bytes are taken from the end of the ATR, never reaching into TS or T0
    let bytes = &rest[rest.len().saturating_sub(k)..];
    if bytes.len() < k {
        tracing::debug!(expected = k, available = bytes.len(), "ATR cut short in historical bytes");
    }
    let historical = if bytes.iter().all(|byte| (0x20..=0x7E).contains(byte)) {
        HistoricalBytes::Text(bytes.iter().map(|&byte| byte as char).collect())
    } else {
        HistoricalBytes::Hex(hex::encode_upper(bytes))
    };

    Ok(AtrInfo {
        convention,
        ta1_present: y1 & 0x1 != 0,
        tb1_present: y1 & 0x2 != 0,
        tc1_present: y1 & 0x4 != 0,
        td1_present: y1 & 0x8 != 0,
        historical_count: k,
        historical,
    })
}

/// Space separated uppercase hex, e.g. "3B 65 00"
pub fn spaced_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{:02X}", byte))
        .collect::<Vec<_>>()
        .join(" ")
}

/// ATR hex followed by its annotations, or the bare hex if it cannot be decoded
pub fn describe_atr(atr: &[u8]) -> String {
    let raw = spaced_hex(atr);
    match decode_atr(atr) {
        Ok(info) => format!("{} ({})", raw, info.annotations().join(" | ")),
        Err(err) => {
            tracing::debug!(error = %err, atr = %raw, "ATR left undecoded");
            raw
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JCOP_ATR: &[u8] = &[0x3B, 0x65, 0x00, 0x00, 0x4A, 0x43, 0x4F, 0x50, 0x76];

    #[test]
    fn test_printable_historical_bytes() {
        let info = decode_atr(JCOP_ATR).unwrap();
        assert_eq!(info.convention, Some(Convention::Direct));
        assert_eq!(info.historical_count, 5);
        assert!(!info.ta1_present);
        assert!(info.tb1_present);
        assert!(info.tc1_present);
        assert!(!info.td1_present);
        assert_eq!(info.historical, HistoricalBytes::Text("JCOPv".to_string()));

        assert_eq!(
            describe_atr(JCOP_ATR),
            "3B 65 00 00 4A 43 4F 50 76 (Direct Convention | TB1 present | TC1 present | Historical: JCOPv)"
        );
    }

    #[test]
    fn test_binary_historical_bytes() {
        let atr = [0x3F, 0x83, 0x80, 0x01, 0x00, 0x73, 0xC8];
        let info = decode_atr(&atr).unwrap();
        assert_eq!(info.convention, Some(Convention::Inverse));
        assert!(info.td1_present);
        assert_eq!(info.historical, HistoricalBytes::Hex("0073C8".to_string()));
    }

    #[test]
    fn test_unclassified_convention_is_not_an_error() {
        let info = decode_atr(&[0x3A, 0x00]).unwrap();
        assert_eq!(info.convention, None);
        assert_eq!(info.historical, HistoricalBytes::Text(String::new()));
        assert_eq!(describe_atr(&[0x3A, 0x00]), "3A 00 (Historical: )");
    }

    #[test]
    fn test_short_historical_bytes_still_annotated() {
        // K = 15 but only two bytes follow T0
        let atr = [0x3B, 0x1F, 0x41, 0x42];
        let info = decode_atr(&atr).unwrap();
        assert_eq!(info.historical_count, 15);
        assert!(info.ta1_present);
        assert_eq!(info.historical, HistoricalBytes::Text("AB".to_string()));
        assert_eq!(
            describe_atr(&atr),
            "3B 1F 41 42 (Direct Convention | TA1 present | Historical: AB)"
        );
    }

    #[test]
    fn test_undecodable_atr_is_returned_raw() {
        assert_eq!(decode_atr(&[0x3B]), Err(AtrError::TooShort(1)));
        assert_eq!(describe_atr(&[0x3B]), "3B");
        assert_eq!(describe_atr(&[]), "");
    }
}
