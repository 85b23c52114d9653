pub mod atr;
pub mod dump;
pub mod parse;
pub mod readers;
pub mod watch;

use anyhow::{Context, Result};
use emv_card::{CardReader, PcscChannel};

/// Connect to the named reader, or the first one when no name is given
pub(crate) fn connect(reader: &CardReader, reader_name: Option<&str>) -> Result<PcscChannel, emv_card::PcscError> {
    match reader_name {
        Some(name) => reader.connect_named(name),
        None => reader.connect_first(),
    }
}

/// Decode hex typed on the command line, ignoring spaces and colons
pub(crate) fn parse_hex_arg(input: &str) -> Result<Vec<u8>> {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&cleaned).with_context(|| format!("Invalid hex input: {}", input))
}
