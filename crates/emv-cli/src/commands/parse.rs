use anyhow::{bail, Result};
use emv_common::{decode_nodes, tlv};
use tracing::warn;

use super::parse_hex_arg;
use crate::formatters::{self, FormatMode};

pub fn cmd_parse(input: &str, mode: FormatMode) -> Result<()> {
    let data = parse_hex_arg(input)?;

    // Report where strict parsing fails, then show whatever parses
    let nodes = match tlv::parse_strict(&data) {
        Ok(nodes) => nodes,
        Err(err) => {
            warn!(error = %err, "Input is not well-formed BER-TLV, showing partial result");
            tlv::parse(&data)
        }
    };

    let fields = decode_nodes(&nodes);
    if fields.is_empty() {
        bail!("No data objects found in {}", input);
    }

    println!("{}", formatters::format_fields(&fields, mode)?.trim_end());
    Ok(())
}
