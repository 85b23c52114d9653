//! Output formatting for acquisitions, decoded fields and ATRs

use std::fmt::Write;

use anyhow::Result;
use clap::ValueEnum;
use emv_card::atr::spaced_hex;
use emv_card::session::RecordSource;
use emv_card::{decode_atr, describe_atr, AcquisitionResult, CardRecord, CardSummary};
use emv_common::decode::{flatten, guess_unknown};
use emv_common::{DecodedField, DecodedValue};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatMode {
    /// Human-readable decoded output
    Human,
    /// Raw hex output
    Raw,
    /// JSON for other tools
    Json,
}

impl FormatMode {
    pub fn description(&self) -> &'static str {
        match self {
            FormatMode::Human => "Human-Readable",
            FormatMode::Raw => "Raw",
            FormatMode::Json => "JSON",
        }
    }
}

/// Render one acquisition
pub fn format_result(result: &AcquisitionResult, mode: FormatMode) -> Result<String> {
    if mode == FormatMode::Json {
        return Ok(serde_json::to_string_pretty(result)?);
    }

    let mut out = String::new();
    writeln!(out, "Card Type: {}", result.card_brand)?;
    match mode {
        FormatMode::Raw => writeln!(out, "ATR: {}", spaced_hex(&result.atr))?,
        _ => writeln!(out, "ATR: {}", result.atr_description())?,
    }
    writeln!(out, "Status: {:?}", result.status)?;
    writeln!(
        out,
        "Records: {} ({} data objects)",
        result.records.len(),
        result.field_count()
    )?;
    if let Some(error) = &result.error {
        writeln!(out, "Error: {}", error)?;
    }

    if mode == FormatMode::Human {
        out.push_str(&format_summary(&result.summary())?);
    }

    writeln!(out, "\n=== EMV Card Data ({}) ===", mode.description())?;
    for record in &result.records {
        writeln!(out, "\n{}", record_heading(record))?;
        writeln!(out, "{}", "-".repeat(50))?;
        out.push_str(&format_fields(&record.fields, mode)?);
    }

    Ok(out)
}

fn record_heading(record: &CardRecord) -> String {
    match record.sfi_or_label {
        RecordSource::Label("PSE") => "Payment System Environment (PSE)".to_string(),
        RecordSource::Label("LOG") => "Transaction Log".to_string(),
        RecordSource::Label("PIN") => "PIN Information".to_string(),
        RecordSource::Label(label) => label.to_string(),
        RecordSource::Sfi(sfi) => format!("SFI: {}, Record: {}", sfi, record.record_number),
    }
}

fn format_summary(summary: &CardSummary) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "\n=== Card Summary ===")?;

    let lines = [
        ("Card Number", summary.card_number.clone()),
        ("Expiry Date", summary.expiry_date.clone()),
        ("AID", summary.aid.clone()),
        ("Application", summary.application_label.clone()),
        ("Cardholder", summary.cardholder_name.clone()),
        ("Transaction Count", summary.transaction_count.map(|n| n.to_string())),
        ("PIN Tries Remaining", summary.pin_tries.map(|n| n.to_string())),
    ];
    for (label, value) in lines {
        if let Some(value) = value {
            writeln!(out, "{}: {}", label, value)?;
        }
    }
    if !summary.services.is_empty() {
        writeln!(out, "Services: {}", summary.services.join(", "))?;
    }
    if !summary.logs.is_empty() {
        writeln!(out, "Log Entries: {}", summary.logs.len())?;
    }

    Ok(out)
}

/// Render decoded fields, one line each, indented by nesting level
///
/// Human mode skips templates since their children follow them; raw mode
/// shows every tag with its bytes.
pub fn format_fields(fields: &[DecodedField], mode: FormatMode) -> Result<String> {
    if mode == FormatMode::Json {
        return Ok(serde_json::to_string_pretty(fields)?);
    }

    let mut out = String::new();
    for field in flatten(fields) {
        let indent = "  ".repeat(field.level);
        match mode {
            FormatMode::Raw => writeln!(out, "{}[{}] {}", indent, field.tag, field.raw_hex)?,
            _ => {
                if matches!(field.value, DecodedValue::Container(_)) {
                    continue;
                }
                writeln!(out, "{}{}", indent, human_line(field))?;
            }
        }
    }
    Ok(out)
}

fn human_line(field: &DecodedField) -> String {
    if field.is_unknown() {
        return format!("{} [{}]", field.decoded_text, guess_unknown(&field.raw));
    }

    // Cards store these codes as n3 BCD, so 0840 names the United States
    let code = hex::encode(&field.raw).parse::<u16>().ok();

    let name = match field.tag.as_bytes() {
        // Issuer Country Code, Terminal Country Code
        [0x5F, 0x28] | [0x9F, 0x1A] => code.and_then(get_country_name),
        // Transaction Currency Code, Application Currency Code
        [0x5F, 0x2A] | [0x9F, 0x42] => code.and_then(get_currency_name),
        _ => None,
    };

    match name {
        Some(name) => format!("{} ({})", field.decoded_text, name),
        None => field.decoded_text.clone(),
    }
}

/// Render an ATR given on the command line
pub fn format_atr(atr: &[u8], mode: FormatMode) -> Result<String> {
    Ok(match mode {
        FormatMode::Human => describe_atr(atr),
        FormatMode::Raw => spaced_hex(atr),
        FormatMode::Json => serde_json::to_string_pretty(&decode_atr(atr)?)?,
    })
}

/// ISO 3166-1 numeric country codes (subset)
fn get_country_name(code: u16) -> Option<&'static str> {
    match code {
        124 => Some("Canada"),
        840 => Some("United States"),
        826 => Some("United Kingdom"),
        276 => Some("Germany"),
        250 => Some("France"),
        380 => Some("Italy"),
        724 => Some("Spain"),
        528 => Some("Netherlands"),
        156 => Some("China"),
        392 => Some("Japan"),
        _ => None,
    }
}

/// ISO 4217 numeric currency codes (subset)
fn get_currency_name(code: u16) -> Option<&'static str> {
    match code {
        124 => Some("CAD (Canadian Dollar)"),
        840 => Some("USD (US Dollar)"),
        978 => Some("EUR (Euro)"),
        826 => Some("GBP (Pound Sterling)"),
        392 => Some("JPY (Japanese Yen)"),
        156 => Some("CNY (Chinese Yuan)"),
        _ => None,
    }
}
