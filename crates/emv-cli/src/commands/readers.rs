use anyhow::{Context, Result};
use emv_card::{CardReader, PcscError};

pub fn cmd_readers() -> Result<()> {
    let reader = CardReader::new().context("Failed to establish PC/SC context")?;

    let readers = match reader.list_readers() {
        Ok(readers) => readers,
        Err(PcscError::NoReadersAvailable) => Vec::new(),
        Err(err) => return Err(err).context("Failed to list readers"),
    };

    if readers.is_empty() {
        println!("No card readers found");
        return Ok(());
    }

    for (i, name) in readers.iter().enumerate() {
        println!("{}: {}", i, name);
    }
    Ok(())
}
