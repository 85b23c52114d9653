//! Static EMV tag dictionary
//!
//! The table is sorted by tag bytes so lookups can binary search it.

use crate::tag::Tag;

/// Name reported for tags missing from [`EMV_TAGS`]
pub const UNKNOWN_TAG: &str = "Unknown Tag";

/// Every tag this engine can name, keyed by its encoded bytes
pub static EMV_TAGS: &[(&[u8], &str)] = &[
    (&[0x42], "Issuer Identification Number (IIN)"),
    (&[0x4F], "Application Dedicated File (ADF) Name"),
    (&[0x50], "Application Label"),
    (&[0x57], "Track 2 Equivalent Data"),
    (&[0x5A], "Application Primary Account Number (PAN)"),
    (&[0x5F, 0x20], "Cardholder Name"),
    (&[0x5F, 0x24], "Application Expiration Date"),
    (&[0x5F, 0x25], "Application Effective Date"),
    (&[0x5F, 0x28], "Issuer Country Code"),
    (&[0x5F, 0x2A], "Transaction Currency Code"),
    (&[0x5F, 0x2D], "Language Preference"),
    (&[0x5F, 0x30], "Service Code"),
    (&[0x5F, 0x34], "Application Primary Account Number (PAN) Sequence Number"),
    (&[0x5F, 0x36], "Transaction Currency Exponent"),
    (&[0x61], "Application Template"),
    (&[0x6F], "File Control Information (FCI) Template"),
    (&[0x70], "EMV Proprietary Template"),
    (&[0x71], "Issuer Script Template 1"),
    (&[0x72], "Issuer Script Template 2"),
    (&[0x73], "Directory Discretionary Template"),
    (&[0x77], "Response Message Template Format 2"),
    (&[0x80], "Response Message Template Format 1"),
    (&[0x82], "Application Interchange Profile"),
    (&[0x83], "Command Template"),
    (&[0x84], "Dedicated File (DF) Name"),
    (&[0x86], "Issuer Script Command"),
    (&[0x87], "Application Priority Indicator"),
    (&[0x88], "Short File Identifier (SFI)"),
    (&[0x89], "Authorization Code"),
    (&[0x8A], "Authorization Response Code"),
    (&[0x8C], "Card Risk Management Data Object List 1 (CDOL1)"),
    (&[0x8D], "Card Risk Management Data Object List 2 (CDOL2)"),
    (&[0x8E], "Cardholder Verification Method (CVM) List"),
    (&[0x8F], "Certification Authority Public Key Index"),
    (&[0x90], "Issuer Public Key Certificate"),
    (&[0x91], "Issuer Authentication Data"),
    (&[0x92], "Issuer Public Key Remainder"),
    (&[0x93], "Signed Static Application Data"),
    (&[0x94], "Application File Locator (AFL)"),
    (&[0x95], "Terminal Verification Results"),
    (&[0x97], "Transaction Certificate Data Object List (TDOL)"),
    (&[0x98], "Transaction Certificate (TC) Hash Value"),
    (&[0x99], "Transaction Personal Identification Number (PIN) Data"),
    (&[0x9A], "Transaction Date"),
    (&[0x9B], "Transaction Status Information"),
    (&[0x9C], "Transaction Type"),
    (&[0x9D], "Directory Definition File (DDF) Name"),
    (&[0x9F, 0x01], "Acquirer Identifier"),
    (&[0x9F, 0x02], "Amount, Authorized (Numeric)"),
    (&[0x9F, 0x03], "Amount, Other (Numeric)"),
    (&[0x9F, 0x04], "Amount, Other (Binary)"),
    (&[0x9F, 0x05], "Application Discretionary Data"),
    (&[0x9F, 0x06], "Application Identifier (AID) - Terminal"),
    (&[0x9F, 0x07], "Application Usage Control"),
    (&[0x9F, 0x08], "Application Version Number"),
    (&[0x9F, 0x09], "Application Version Number - Terminal"),
    (&[0x9F, 0x0B], "Cardholder Name Extended"),
    (&[0x9F, 0x0D], "Issuer Action Code - Default"),
    (&[0x9F, 0x0E], "Issuer Action Code - Denial"),
    (&[0x9F, 0x0F], "Issuer Action Code - Online"),
    (&[0x9F, 0x10], "Issuer Application Data"),
    (&[0x9F, 0x11], "Issuer Code Table Index"),
    (&[0x9F, 0x12], "Application Preferred Name"),
    (&[0x9F, 0x13], "Last Online Application Transaction Counter (ATC) Register"),
    (&[0x9F, 0x14], "Lower Consecutive Offline Limit"),
    (&[0x9F, 0x15], "Merchant Category Code"),
    (&[0x9F, 0x16], "Merchant Identifier"),
    (&[0x9F, 0x17], "Personal Identification Number (PIN) Try Counter"),
    (&[0x9F, 0x18], "Issuer Script Identifier"),
    (&[0x9F, 0x1A], "Terminal Country Code"),
    (&[0x9F, 0x1B], "Terminal Floor Limit"),
    (&[0x9F, 0x1C], "Terminal Identification"),
    (&[0x9F, 0x1D], "Terminal Risk Management Data"),
    (&[0x9F, 0x1E], "Interface Device (IFD) Serial Number"),
    (&[0x9F, 0x1F], "Track 1 Discretionary Data"),
    (&[0x9F, 0x20], "Track 2 Discretionary Data"),
    (&[0x9F, 0x21], "Transaction Time"),
    (&[0x9F, 0x22], "Certification Authority Public Key Index - Terminal"),
    (&[0x9F, 0x23], "Upper Consecutive Offline Limit"),
    (&[0x9F, 0x26], "Application Cryptogram"),
    (&[0x9F, 0x27], "Cryptogram Information Data"),
    (&[0x9F, 0x2D], "ICC PIN Encipherment Public Key Certificate"),
    (&[0x9F, 0x2E], "ICC PIN Encipherment Public Key Exponent"),
    (&[0x9F, 0x2F], "ICC PIN Encipherment Public Key Remainder"),
    (&[0x9F, 0x32], "Issuer Public Key Exponent"),
    (&[0x9F, 0x33], "Terminal Capabilities"),
    (&[0x9F, 0x34], "Cardholder Verification Method (CVM) Results"),
    (&[0x9F, 0x35], "Terminal Type"),
    (&[0x9F, 0x36], "Application Transaction Counter (ATC)"),
    (&[0x9F, 0x37], "Unpredictable Number"),
    (&[0x9F, 0x38], "Processing Options Data Object List (PDOL)"),
    (&[0x9F, 0x39], "Point-of-Service (POS) Entry Mode"),
    (&[0x9F, 0x3A], "Amount, Reference Currency"),
    (&[0x9F, 0x3B], "Application Reference Currency"),
    (&[0x9F, 0x3C], "Transaction Reference Currency Code"),
    (&[0x9F, 0x3D], "Transaction Reference Currency Exponent"),
    (&[0x9F, 0x40], "Additional Terminal Capabilities"),
    (&[0x9F, 0x41], "Transaction Sequence Counter"),
    (&[0x9F, 0x42], "Application Currency Code"),
    (&[0x9F, 0x43], "Application Reference Currency Exponent"),
    (&[0x9F, 0x44], "Application Currency Exponent"),
    (&[0x9F, 0x45], "Data Authentication Code"),
    (&[0x9F, 0x46], "ICC Public Key Certificate"),
    (&[0x9F, 0x47], "ICC Public Key Exponent"),
    (&[0x9F, 0x48], "ICC Public Key Remainder"),
    (&[0x9F, 0x49], "Dynamic Data Authentication Data Object List (DDOL)"),
    (&[0x9F, 0x4A], "Static Data Authentication Tag List"),
    (&[0x9F, 0x4B], "Signed Dynamic Application Data"),
    (&[0x9F, 0x4C], "ICC Dynamic Number"),
    (&[0x9F, 0x4D], "Log Entry"),
    (&[0x9F, 0x4E], "Merchant Name and Location"),
    (&[0x9F, 0x4F], "Log Format"),
    (&[0x9F, 0x50], "Offline Accumulator Balance"),
    (&[0x9F, 0x51], "DRDOL Related Data"),
    (&[0x9F, 0x52], "Terminal Compatibility Indicator"),
    (&[0x9F, 0x53], "Consecutive Transaction Limit (International)"),
    (&[0x9F, 0x54], "Cumulative Total Transaction Amount Limit"),
    (&[0x9F, 0x55], "Geographic Indicator"),
    (&[0x9F, 0x56], "Issuer Authentication Indicator"),
    (&[0x9F, 0x57], "Issuer Country Code"),
    (&[0x9F, 0x58], "Lower Consecutive Offline Limit (International)"),
    (&[0x9F, 0x59], "Upper Consecutive Offline Limit (International)"),
    (&[0x9F, 0x5A], "Issuer URL2"),
    (&[0x9F, 0x5B], "Issuer URL3"),
    (&[0x9F, 0x5C], "Upper Cumulative Total Transaction Amount Limit"),
    (&[0x9F, 0x6E], "Form Factor Indicator"),
    (&[0x9F, 0x72], "Consecutive Transaction International Upper Limit"),
    (&[0x9F, 0x73], "Currency Conversion Factor"),
    (&[0x9F, 0x74], "VLP Issuer Authorization Code"),
    (&[0x9F, 0x75], "Cumulative Total Transaction Amount Upper Limit"),
    (&[0x9F, 0x76], "Secondary Application Currency Code"),
    (&[0x9F, 0x77], "VLP Funds Limit"),
    (&[0x9F, 0x78], "VLP Single Transaction Limit"),
    (&[0x9F, 0x79], "VLP Available Funds"),
    (&[0x9F, 0x7A], "VLP Single Transaction Limit"),
    (&[0x9F, 0x7B], "VLP Transaction Qualifier"),
    (&[0x9F, 0x7C], "Customer Exclusive Data"),
    (&[0x9F, 0x7D], "Application Specific Transparent Template"),
    (&[0xA5], "File Control Information (FCI) Proprietary Template"),
    (&[0xBF, 0x0C], "File Control Information (FCI) Issuer Discretionary Data"),
    (&[0xDF, 0x01], "Proprietary Data Element"),
    (&[0xDF, 0x81, 0x04], "Balance Read Before Gen AC"),
    (&[0xDF, 0x81, 0x05], "Balance Read After Gen AC"),
    (&[0xDF, 0x81, 0x06], "Data Needed"),
    (&[0xDF, 0x81, 0x07], "CDOL1 Related Data"),
    (&[0xDF, 0x81, 0x08], "DS AC Type"),
    (&[0xDF, 0x81, 0x09], "DS Input (Term)"),
    (&[0xDF, 0x81, 0x0A], "DS ODS Info"),
    (&[0xDF, 0x81, 0x0B], "DS Summary 1"),
    (&[0xDF, 0x81, 0x0C], "DS Summary 2"),
    (&[0xDF, 0x81, 0x0D], "DS Summary 3"),
    (&[0xDF, 0x81, 0x0E], "DS Unpredictable Number"),
    (&[0xDF, 0x81, 0x0F], "Message Hold Time"),
    (&[0xDF, 0x81, 0x10], "Phone Message Table"),
    (&[0xDF, 0x81, 0x11], "Phone Response Code"),
    (&[0xDF, 0x81, 0x12], "Script Hold Time"),
    (&[0xDF, 0x81, 0x13], "Issuer Script Results"),
    (&[0xDF, 0x81, 0x14], "Post-Gen AC Put Data Status"),
    (&[0xDF, 0x81, 0x15], "Pre-Gen AC Put Data Status"),
    (&[0xDF, 0x81, 0x16], "Proceed To First Write Flag"),
    (&[0xDF, 0x81, 0x17], "PDOL Related Data"),
    (&[0xDF, 0x81, 0x18], "Tags To Read"),
    (&[0xDF, 0x81, 0x19], "Tags To Write Before Gen AC"),
    (&[0xDF, 0x81, 0x1A], "Tags To Write After Gen AC"),
    (&[0xDF, 0x81, 0x1B], "Data To Send"),
    (&[0xDF, 0x81, 0x1C], "Data Record"),
    (&[0xDF, 0x81, 0x1D], "Encryption Key"),
    (&[0xDF, 0x81, 0x1E], "Encrypted Data"),
];

/// Tags whose values are parsed as nested TLV regardless of the constructed bit
pub const TEMPLATE_TAGS: &[Tag] = &[
    Tag::one(0x61),
    Tag::one(0x6F),
    Tag::one(0x70),
    Tag::one(0x73),
    Tag::one(0x77),
    Tag::one(0x80),
    Tag::one(0x84),
    Tag::one(0xA5),
    Tag::two(0xBF, 0x0C),
];

/// Look up the description of a tag
pub fn tag_name(tag: &[u8]) -> Option<&'static str> {
    EMV_TAGS
        .binary_search_by(|(key, _)| (*key).cmp(tag))
        .ok()
        .map(|index| EMV_TAGS[index].1)
}

/// Get a human-readable name for an EMV tag, or "Unknown Tag"
pub fn get_tag_name(tag: &[u8]) -> &'static str {
    tag_name(tag).unwrap_or(UNKNOWN_TAG)
}

/// Well-known tags referenced by the card and session code
pub mod known {
    use crate::tag::Tag;

    pub const APPLICATION_IDENTIFIER: Tag = Tag::one(0x4F);
    pub const APPLICATION_LABEL: Tag = Tag::one(0x50);
    pub const TRACK_2_EQUIVALENT_DATA: Tag = Tag::one(0x57);
    pub const APPLICATION_PAN: Tag = Tag::one(0x5A);
    pub const CARDHOLDER_NAME: Tag = Tag::two(0x5F, 0x20);
    pub const APPLICATION_EXPIRATION_DATE: Tag = Tag::two(0x5F, 0x24);
    pub const RECORD_TEMPLATE: Tag = Tag::one(0x70);
    pub const RESPONSE_MESSAGE_TEMPLATE_FORMAT_2: Tag = Tag::one(0x77);
    pub const RESPONSE_MESSAGE_TEMPLATE_FORMAT_1: Tag = Tag::one(0x80);
    pub const COMMAND_TEMPLATE: Tag = Tag::one(0x83);
    pub const AFL: Tag = Tag::one(0x94);
    pub const APPLICATION_USAGE_CONTROL: Tag = Tag::two(0x9F, 0x07);
    pub const PIN_TRY_COUNTER: Tag = Tag::two(0x9F, 0x17);
    pub const APPLICATION_TRANSACTION_COUNTER: Tag = Tag::two(0x9F, 0x36);
}
