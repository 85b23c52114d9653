//! EMV semantic decoder
//!
//! Turns TLV nodes into [`DecodedField`]s: tag-specific interpretation of the
//! value (PAN grouping, dates, amounts, bit flags, data object lists, CVM
//! rules) plus a display line. A value that does not fit its interpretation
//! is reported as raw hex for that one field; nothing here fails.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::tag::Tag;
use crate::tags::UNKNOWN_TAG;
use crate::tlv::{self, TlvError, TlvNode};

/// Reasons a value could not be given its tag-specific interpretation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("value is empty")]
    Empty,

    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("value is not ASCII text")]
    NotAscii,

    #[error("{0} bytes is too long for an integer")]
    TooLong(usize),

    #[error("truncated data object list entry")]
    TruncatedDol,

    #[error("malformed tag in data object list: {0}")]
    DolTag(#[from] TlvError),

    #[error("CVM list of {0} bytes is not 8 bytes plus whole rules")]
    CvmListLength(usize),

    #[error("no service bits set")]
    NoServices,
}

/// A decoded data element as handed to presentation code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedField {
    pub tag: Tag,
    /// Table description, "Unknown Tag" when absent
    pub tag_name: &'static str,
    pub raw_hex: String,
    pub decoded_text: String,
    /// Nesting depth, used for indentation only
    pub level: usize,
    pub value: DecodedValue,
    #[serde(skip)]
    pub raw: Vec<u8>,
}

impl DecodedField {
    /// Nested fields of a template, empty for everything else
    pub fn children(&self) -> &[DecodedField] {
        match &self.value {
            DecodedValue::Container(children) => children,
            _ => &[],
        }
    }

    /// Whether the tag is absent from the tag table
    pub fn is_unknown(&self) -> bool {
        self.tag.name().is_none()
    }
}

/// Interpreted value of a data element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DecodedValue {
    /// Display text for a primitive value
    Leaf(String),
    /// Decoded children of a template
    Container(Vec<DecodedField>),
    /// Data object list (CDOL1/CDOL2)
    TagList(Vec<DolEntry>),
    /// Cardholder verification method list
    RuleList(CvmList),
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(text) => f.write_str(text),
            Self::Container(children) => write!(f, "{} data objects", children.len()),
            Self::TagList(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", entry)?;
                }
                Ok(())
            }
            Self::RuleList(list) => write!(f, "{}", list),
        }
    }
}

/// One entry of a data object list: a tag reference and the length requested
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DolEntry {
    pub tag: Tag,
    pub length: usize,
    pub name: &'static str,
}

impl fmt::Display for DolEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} [{}]", self.tag, self.name, self.length)
    }
}

/// Cardholder verification method list (tag 8E)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CvmList {
    pub amount_x: u32,
    pub amount_y: u32,
    pub rules: Vec<CvmRule>,
}

impl fmt::Display for CvmList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X={}, Y={}", self.amount_x, self.amount_y)?;
        for (i, rule) in self.rules.iter().enumerate() {
            write!(f, "; {}. {}", i + 1, rule)?;
        }
        Ok(())
    }
}

/// A single two-byte CVM rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CvmRule {
    pub code: u8,
    pub condition: u8,
    pub method: &'static str,
    pub condition_text: &'static str,
    /// Bit 7 of the code: try the next rule if this one fails
    pub apply_next_on_failure: bool,
}

impl fmt::Display for CvmRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.method, self.condition_text)?;
        if self.apply_next_on_failure {
            f.write_str(", next rule on failure")?;
        }
        Ok(())
    }
}

const USAGE_CONTROL_FLAGS: &[(u8, &str)] = &[
    (0x80, "ATM"),
    (0x40, "Non-ATM"),
    (0x20, "Domestic"),
    (0x10, "International"),
];

const AIP_FLAGS: &[(u8, &str)] = &[
    (0x80, "CDA Supported"),
    (0x40, "RFU"),
    (0x20, "EMV Mode"),
    (0x10, "Terminal Risk Management"),
    (0x08, "Cardholder Verification"),
    (0x04, "DDA Supported"),
    (0x02, "SDA Supported"),
    (0x01, "RFU"),
];

const TVR_FLAGS: &[(u8, &str)] = &[
    (0x80, "Offline Data Authentication Failed"),
    (0x40, "SDA Failed"),
    (0x20, "ICC Data Missing"),
    (0x10, "Card Appears on Terminal Exception File"),
    (0x08, "DDA Failed"),
    (0x04, "CDA Failed"),
];

const TERMINAL_CAPABILITY_FLAGS: &[(u8, &str)] = &[
    (0x80, "Manual Key Entry"),
    (0x40, "Magnetic Stripe"),
    (0x20, "IC with Contacts"),
];

/// Decode a parsed TLV sequence, preserving nesting
pub fn decode_nodes(nodes: &[TlvNode]) -> Vec<DecodedField> {
    nodes.iter().map(decode_field).collect()
}

/// Parse and decode one response body
pub fn decode(data: &[u8]) -> Vec<DecodedField> {
    decode_nodes(&tlv::parse(data))
}

/// Decode a single node (and its children, for templates)
pub fn decode_field(node: &TlvNode) -> DecodedField {
    let raw_hex = hex::encode_upper(&node.raw_value);
    let label = label(node.tag);

    let (value, decoded_text) = if node.is_container() {
        (DecodedValue::Container(decode_nodes(&node.children)), label)
    } else {
        match interpret(node.tag, &node.raw_value) {
            Ok(value) => {
                let text = format!("{}: {}", label, value);
                (value, text)
            }
            Err(err) => {
                debug!(tag = %node.tag, error = %err, "Falling back to raw value");
                let text = format!("{} (Raw): {}", label, raw_hex);
                (DecodedValue::Leaf(raw_hex.clone()), text)
            }
        }
    };

    DecodedField {
        tag: node.tag,
        tag_name: node.tag.name().unwrap_or(UNKNOWN_TAG),
        raw_hex,
        decoded_text,
        level: node.level,
        value,
        raw: node.raw_value.clone(),
    }
}

fn label(tag: Tag) -> String {
    match tag.name() {
        Some(name) => name.to_string(),
        None => format!("{} ({})", UNKNOWN_TAG, tag),
    }
}

/// Apply the tag-specific interpretation of a primitive value
pub fn interpret(tag: Tag, value: &[u8]) -> Result<DecodedValue, DecodeError> {
    use DecodedValue::Leaf;

    match tag.as_bytes() {
        // PAN and Track 2 equivalent data
        [0x5A] | [0x57] => Ok(Leaf(format_pan(value))),

        // Text fields
        [0x50] | [0x5F, 0x20] | [0x9F, 0x12] | [0x5F, 0x50] => ascii_text(value).map(Leaf),

        // Expiration and effective dates (YYMMDD)
        [0x5F, 0x24] | [0x5F, 0x25] => date(value).map(Leaf),

        // Country and currency codes
        [0x5F, 0x28] | [0x5F, 0x2A] | [0x9F, 0x1A] => {
            integer(value).map(|code| Leaf(code.to_string()))
        }

        // Amounts, in minor units
        [0x9F, 0x02] | [0x9F, 0x03] | [0x9F, 0x04] | [0x9F, 0x3A] => {
            integer(value).map(|amount| Leaf(format!("{}.{:02}", amount / 100, amount % 100)))
        }

        // Counters
        [0x9F, 0x36] | [0x9F, 0x17] | [0x9F, 0x41] => {
            integer(value).map(|count| Leaf(count.to_string()))
        }

        [0x9F, 0x07] => usage_control(value).map(Leaf),
        [0x82] => flags(value, AIP_FLAGS).map(Leaf),
        [0x95] => flags(value, TVR_FLAGS).map(Leaf),
        [0x9F, 0x33] => flags(value, TERMINAL_CAPABILITY_FLAGS).map(Leaf),

        // CDOL1 / CDOL2
        [0x8C] | [0x8D] => parse_dol(value).map(DecodedValue::TagList),

        [0x8E] => parse_cvm_list(value).map(DecodedValue::RuleList),

        _ => Ok(Leaf(hex::encode_upper(value))),
    }
}

/// Strip trailing `F` padding and group digits in blocks of four
fn format_pan(value: &[u8]) -> String {
    let digits = hex::encode_upper(value);
    let digits = digits.trim_end_matches('F');
    digits
        .as_bytes()
        .chunks(4)
        .map(|group| String::from_utf8_lossy(group))
        .collect::<Vec<_>>()
        .join(" ")
}

fn ascii_text(value: &[u8]) -> Result<String, DecodeError> {
    if !value.is_ascii() {
        return Err(DecodeError::NotAscii);
    }
    let text = String::from_utf8(value.to_vec()).map_err(|_| DecodeError::NotAscii)?;
    Ok(text.trim().to_string())
}

fn date(value: &[u8]) -> Result<String, DecodeError> {
    match value {
        [yy, mm, dd] => Ok(format!("20{:02X}-{:02X}-{:02X}", yy, mm, dd)),
        _ => Err(DecodeError::Length {
            expected: 3,
            actual: value.len(),
        }),
    }
}

fn integer(value: &[u8]) -> Result<u128, DecodeError> {
    if value.is_empty() {
        return Err(DecodeError::Empty);
    }
    if value.len() > 16 {
        return Err(DecodeError::TooLong(value.len()));
    }
    Ok(value
        .iter()
        .fold(0u128, |acc, &byte| (acc << 8) | byte as u128))
}

fn set_flags(byte: u8, table: &[(u8, &'static str)]) -> Vec<&'static str> {
    table
        .iter()
        .filter(|(mask, _)| byte & mask != 0)
        .map(|&(_, name)| name)
        .collect()
}

fn flags(value: &[u8], table: &[(u8, &'static str)]) -> Result<String, DecodeError> {
    let first = *value.first().ok_or(DecodeError::Empty)?;
    let names = set_flags(first, table);
    if names.is_empty() {
        return Ok("None".to_string());
    }
    Ok(names.join(", "))
}

fn usage_control(value: &[u8]) -> Result<String, DecodeError> {
    let services = usage_services(value);
    if services.is_empty() {
        return Err(DecodeError::NoServices);
    }
    Ok(services.join(", "))
}

/// Services allowed by an Application Usage Control value (tag 9F07)
pub fn usage_services(value: &[u8]) -> Vec<&'static str> {
    value
        .first()
        .map(|&byte| set_flags(byte, USAGE_CONTROL_FLAGS))
        .unwrap_or_default()
}

/// Parse a data object list into tag references
pub fn parse_dol(value: &[u8]) -> Result<Vec<DolEntry>, DecodeError> {
    let mut entries = Vec::new();
    let mut offset = 0;

    while offset < value.len() {
        let (tag, tag_len) = tlv::read_tag(value, offset)?;
        let length = *value
            .get(offset + tag_len)
            .ok_or(DecodeError::TruncatedDol)?;
        entries.push(DolEntry {
            tag,
            length: length as usize,
            name: tag.name().unwrap_or(UNKNOWN_TAG),
        });
        offset += tag_len + 1;
    }

    Ok(entries)
}

fn cvm_method(code: u8) -> &'static str {
    match code & 0x3F {
        0x00 => "Fail CVM processing",
        0x01 => "Plaintext PIN verification performed by ICC",
        0x02 => "Enciphered PIN verified online",
        0x03 => "Plaintext PIN verification performed by ICC and signature (paper)",
        0x04 => "Enciphered PIN verification performed by ICC",
        0x05 => "Enciphered PIN verification performed by ICC and signature (paper)",
        0x1E => "Signature (paper)",
        0x1F => "No CVM required",
        0x3F => "Not available for use",
        _ => "Proprietary or RFU method",
    }
}

fn cvm_condition(condition: u8) -> &'static str {
    match condition {
        0x00 => "Always",
        0x01 => "If unattended cash",
        0x02 => "If not unattended cash and not manual cash and not purchase with cashback",
        0x03 => "If terminal supports the CVM",
        0x04 => "If manual cash",
        0x05 => "If purchase with cashback",
        0x06 => "If transaction is in the application currency and is under X value",
        0x07 => "If transaction is in the application currency and is over X value",
        0x08 => "If transaction is in the application currency and is under Y value",
        0x09 => "If transaction is in the application currency and is over Y value",
        _ => "RFU condition",
    }
}

/// Split a CVM list into its amounts and two-byte rules
pub fn parse_cvm_list(value: &[u8]) -> Result<CvmList, DecodeError> {
    if value.len() < 8 || (value.len() - 8) % 2 != 0 {
        return Err(DecodeError::CvmListLength(value.len()));
    }

    let amount_x = u32::from_be_bytes([value[0], value[1], value[2], value[3]]);
    let amount_y = u32::from_be_bytes([value[4], value[5], value[6], value[7]]);
    let rules = value[8..]
        .chunks_exact(2)
        .map(|rule| CvmRule {
            code: rule[0],
            condition: rule[1],
            method: cvm_method(rule[0]),
            condition_text: cvm_condition(rule[1]),
            apply_next_on_failure: rule[0] & 0x40 != 0,
        })
        .collect();

    Ok(CvmList {
        amount_x,
        amount_y,
        rules,
    })
}

/// Best-effort reading of a value with no known interpretation
pub fn guess_unknown(value: &[u8]) -> String {
    let printable: String = value
        .iter()
        .filter(|&&byte| (0x20..=0x7E).contains(&byte))
        .map(|&byte| byte as char)
        .collect();
    if printable.len() > 2 {
        return format!("ASCII: {}", printable);
    }

    let digits = hex::encode_upper(value);
    if !value.is_empty() && value.len() <= 4 {
        let number = value
            .iter()
            .fold(0u32, |acc, &byte| (acc << 8) | byte as u32);
        if number < 1_000_000 {
            return format!("Number: {}", number);
        }
        if digits.bytes().all(|c| c.is_ascii_digit()) {
            return format!("BCD: {}", digits);
        }
    }

    let spaced = value
        .iter()
        .map(|byte| format!("{:02X}", byte))
        .collect::<Vec<_>>()
        .join(" ");
    format!("HEX: {}", spaced)
}

/// Depth-first walk over decoded fields, templates before their children
pub fn flatten(fields: &[DecodedField]) -> Vec<&DecodedField> {
    let mut out = Vec::new();
    for field in fields {
        out.push(field);
        out.extend(flatten(field.children()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(data: &[u8]) -> DecodedField {
        let fields = decode(data);
        assert_eq!(fields.len(), 1, "expected one field from {:02X?}", data);
        fields.into_iter().next().unwrap()
    }

    #[test]
    fn test_pan_grouping() {
        let pan = field(&[0x5A, 0x08, 0x47, 0x61, 0x73, 0x00, 0x12, 0x34, 0x56, 0xFF]);
        assert_eq!(pan.value, DecodedValue::Leaf("4761 7300 1234 56".to_string()));
        assert_eq!(
            pan.decoded_text,
            "Application Primary Account Number (PAN): 4761 7300 1234 56"
        );
        assert_eq!(pan.raw_hex, "47617300123456FF");

        // Only trailing F nibbles are padding
        let pan = field(&[0x5A, 0x08, 0x47, 0x61, 0x73, 0x00, 0x12, 0x34, 0x56, 0xF8]);
        assert_eq!(pan.value, DecodedValue::Leaf("4761 7300 1234 56F8".to_string()));
    }

    #[test]
    fn test_track2_keeps_separator() {
        let track = field(&[0x57, 0x05, 0x47, 0x61, 0xD2, 0x41, 0x2F]);
        assert_eq!(track.value, DecodedValue::Leaf("4761 D241 2".to_string()));
    }

    #[test]
    fn test_amount_is_binary_minor_units() {
        let amount = field(&[0x9F, 0x02, 0x06, 0x00, 0x00, 0x00, 0x01, 0x23, 0x45]);
        assert_eq!(amount.value, DecodedValue::Leaf("745.65".to_string()));
        assert_eq!(amount.decoded_text, "Amount, Authorized (Numeric): 745.65");

        let small = field(&[0x9F, 0x03, 0x01, 0x05]);
        assert_eq!(small.value, DecodedValue::Leaf("0.05".to_string()));
    }

    #[test]
    fn test_dates() {
        let expiry = field(&[0x5F, 0x24, 0x03, 0x24, 0x01, 0x31]);
        assert_eq!(
            expiry.decoded_text,
            "Application Expiration Date: 2024-01-31"
        );

        let short = field(&[0x5F, 0x25, 0x02, 0x24, 0x01]);
        assert_eq!(short.decoded_text, "Application Effective Date (Raw): 2401");
        assert_eq!(short.value, DecodedValue::Leaf("2401".to_string()));
    }

    #[test]
    fn test_text_fields() {
        let label = field(&[0x50, 0x06, b'V', b'I', b'S', b'A', b' ', b' ']);
        assert_eq!(label.decoded_text, "Application Label: VISA");

        let binary = field(&[0x5F, 0x20, 0x02, 0xC3, 0xA9]);
        assert_eq!(binary.decoded_text, "Cardholder Name (Raw): C3A9");
    }

    #[test]
    fn test_codes_and_counters() {
        assert_eq!(
            field(&[0x5F, 0x28, 0x02, 0x00, 0x56]).decoded_text,
            "Issuer Country Code: 86"
        );
        assert_eq!(
            field(&[0x9F, 0x36, 0x02, 0x01, 0x00]).decoded_text,
            "Application Transaction Counter (ATC): 256"
        );
        assert_eq!(
            field(&[0x9F, 0x17, 0x00]).decoded_text,
            "Personal Identification Number (PIN) Try Counter (Raw): "
        );
    }

    #[test]
    fn test_bit_flags() {
        assert_eq!(
            field(&[0x9F, 0x07, 0x02, 0xC0, 0x00]).decoded_text,
            "Application Usage Control: ATM, Non-ATM"
        );
        assert_eq!(
            field(&[0x82, 0x02, 0x38, 0x00]).decoded_text,
            "Application Interchange Profile: EMV Mode, Terminal Risk Management, Cardholder Verification"
        );
        assert_eq!(
            field(&[0x95, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00]).decoded_text,
            "Terminal Verification Results: None"
        );
        assert_eq!(
            field(&[0x9F, 0x33, 0x03, 0xE0, 0xF8, 0xC8]).decoded_text,
            "Terminal Capabilities: Manual Key Entry, Magnetic Stripe, IC with Contacts"
        );
        assert_eq!(usage_services(&[0x30, 0x00]), vec!["Domestic", "International"]);

        // No service bits is shown raw, unlike an empty TVR
        assert_eq!(
            field(&[0x9F, 0x07, 0x02, 0x00, 0xFF]).decoded_text,
            "Application Usage Control (Raw): 00FF"
        );
    }

    #[test]
    fn test_cdol_tag_list() {
        let cdol = field(&[0x8C, 0x06, 0x9F, 0x02, 0x06, 0x95, 0x05, 0x9A]);
        // trailing 9A has no length byte, so the whole list falls back
        assert!(cdol.decoded_text.ends_with("(Raw): 9F020695059A"));

        let cdol = field(&[0x8C, 0x07, 0x9F, 0x02, 0x06, 0x95, 0x05, 0x9A, 0x03]);
        let DecodedValue::TagList(entries) = &cdol.value else {
            panic!("expected tag list, got {:?}", cdol.value);
        };
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].tag, Tag::two(0x9F, 0x02));
        assert_eq!(entries[0].name, "Amount, Authorized (Numeric)");
        assert_eq!(entries[1].length, 5);
        assert_eq!(entries[2].name, "Transaction Date");
        assert_eq!(
            cdol.decoded_text,
            "Card Risk Management Data Object List 1 (CDOL1): 9F02 Amount, Authorized (Numeric) [6], \
             95 Terminal Verification Results [5], 9A Transaction Date [3]"
        );
    }

    #[test]
    fn test_cvm_rule_list() {
        let data = [
            0x8E, 0x0C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x42, 0x03, 0x1F, 0x00,
        ];
        let cvm = field(&data);
        let DecodedValue::RuleList(list) = &cvm.value else {
            panic!("expected rule list, got {:?}", cvm.value);
        };
        assert_eq!(list.rules.len(), 2);
        assert!(list.rules[0].apply_next_on_failure);
        assert_eq!(list.rules[0].method, "Enciphered PIN verified online");
        assert_eq!(list.rules[1].method, "No CVM required");
        assert_eq!(
            cvm.decoded_text,
            "Cardholder Verification Method (CVM) List: X=0, Y=0; \
             1. Enciphered PIN verified online, If terminal supports the CVM, next rule on failure; \
             2. No CVM required, Always"
        );

        assert_eq!(
            parse_cvm_list(&[0x00; 9]),
            Err(DecodeError::CvmListLength(9))
        );
    }

    #[test]
    fn test_unknown_and_default_tags() {
        let unknown = field(&[0xDF, 0x7F, 0x02, 0x01, 0x02]);
        assert_eq!(unknown.tag_name, "Unknown Tag");
        assert_eq!(unknown.decoded_text, "Unknown Tag (DF7F): 0102");
        assert!(unknown.is_unknown());

        let index = field(&[0x8F, 0x01, 0x05]);
        assert_eq!(index.decoded_text, "Certification Authority Public Key Index: 05");
    }

    #[test]
    fn test_template_nesting_preserved() {
        let fields = decode(&[
            0x70, 0x06, 0x5F, 0x24, 0x03, 0x24, 0x01, 0x01, 0x8F, 0x01, 0x05,
        ]);
        // 8F sits at the top level next to the template
        assert_eq!(fields.len(), 2);
        let template = &fields[0];
        assert_eq!(template.decoded_text, "EMV Proprietary Template");
        assert_eq!(template.children().len(), 1);
        let expiry = &template.children()[0];
        assert_eq!(expiry.tag, Tag::two(0x5F, 0x24));
        assert_eq!(expiry.value, DecodedValue::Leaf("2024-01-01".to_string()));
        assert_eq!(expiry.level, 1);

        let all = flatten(&fields);
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].tag, Tag::two(0x5F, 0x24));
    }

    #[test]
    fn test_deeply_nested_record_decodes() {
        let mut data = tlv::encode(Tag::one(0x8F), &[0x05]);
        for _ in 0..2_000 {
            data = tlv::encode(Tag::one(0x70), &data);
        }

        let fields = decode(&data);
        let all = flatten(&fields);
        assert_eq!(all.len(), tlv::MAX_DEPTH + 1);
        let deepest = all[all.len() - 1];
        assert_eq!(deepest.level, tlv::MAX_DEPTH);
        assert!(deepest.children().is_empty());
        assert!(!deepest.raw_hex.is_empty());
    }

    #[test]
    fn test_guess_unknown() {
        assert_eq!(guess_unknown(b"HELLO"), "ASCII: HELLO");
        assert_eq!(guess_unknown(&[0x01, 0x00]), "Number: 256");
        assert_eq!(guess_unknown(&[0x12, 0x34, 0x56, 0x08]), "BCD: 12345608");
        assert_eq!(guess_unknown(&[0xAB, 0xCD, 0xEF, 0x01]), "HEX: AB CD EF 01");
        assert_eq!(guess_unknown(&[]), "HEX: ");
    }

    #[test]
    fn test_serialized_field_names() {
        let expiry = field(&[0x5F, 0x24, 0x03, 0x24, 0x01, 0x01]);
        let json = serde_json::to_value(&expiry).unwrap();
        assert_eq!(json["tag"], "5F24");
        assert_eq!(json["tag_name"], "Application Expiration Date");
        assert_eq!(json["raw_hex"], "240101");
        assert_eq!(json["decoded_text"], "Application Expiration Date: 2024-01-01");
        assert_eq!(json["value"]["kind"], "leaf");
        assert!(json.get("raw").is_none());
    }
}
