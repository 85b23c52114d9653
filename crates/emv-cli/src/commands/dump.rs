use anyhow::{bail, Context, Result};
use emv_card::{acquire, AcquisitionStatus, CardReader, ScanPolicy};
use tracing::info;

use super::connect;
use crate::formatters::{self, FormatMode};

pub fn cmd_dump(reader_name: Option<&str>, policy: &ScanPolicy, mode: FormatMode) -> Result<()> {
    let reader = CardReader::new().context("Failed to establish PC/SC context")?;

    let mut channel = connect(&reader, reader_name)
        .context("Failed to connect to card. Please ensure a card is present on the reader")?;
    info!(reader = %channel.reader_name(), "Card connected");

    let result = acquire(&mut channel, policy);
    println!("{}", formatters::format_result(&result, mode)?);

    if result.status == AcquisitionStatus::Error {
        bail!(
            "Card read interrupted: {}",
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}
