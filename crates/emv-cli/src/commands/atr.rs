use anyhow::Result;

use super::parse_hex_arg;
use crate::formatters::{self, FormatMode};

pub fn cmd_atr(input: &str, mode: FormatMode) -> Result<()> {
    let atr = parse_hex_arg(input)?;
    println!("{}", formatters::format_atr(&atr, mode)?);
    Ok(())
}
