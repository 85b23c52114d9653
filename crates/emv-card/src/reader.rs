//! PC/SC card reader management

use std::ffi::{CStr, CString};

use pcsc::{Attribute, Card, Context, Protocols, Scope, ShareMode, Status, MAX_BUFFER_SIZE};
use tracing::{debug, trace};

use crate::apdu::ApduResponse;
use crate::channel::{CardChannel, ChannelError};

/// Card reader wrapper for managing PC/SC connections
pub struct CardReader {
    context: Context,
}

impl CardReader {
    /// Create a new CardReader by establishing a PC/SC context
    pub fn new() -> Result<Self, pcsc::Error> {
        let context = Context::establish(Scope::User)?;
        Ok(Self { context })
    }

    /// List all available card readers
    pub fn list_readers(&self) -> Result<Vec<String>, pcsc::Error> {
        let mut readers_buf = [0; 2048];
        let readers = self.context.list_readers(&mut readers_buf)?;

        Ok(readers
            .map(|r| r.to_str().unwrap_or("Unknown").to_string())
            .collect())
    }

    /// Connect to the card in the first available reader
    pub fn connect_first(&self) -> Result<PcscChannel, pcsc::Error> {
        let mut readers_buf = [0; 2048];
        let mut readers = self.context.list_readers(&mut readers_buf)?;

        match readers.next() {
            Some(reader) => self.connect(reader),
            None => Err(pcsc::Error::NoReadersAvailable),
        }
    }

    /// Connect to the card in a reader given by name
    pub fn connect_named(&self, reader_name: &str) -> Result<PcscChannel, pcsc::Error> {
        let name = CString::new(reader_name).map_err(|_| pcsc::Error::UnknownReader)?;
        self.connect(&name)
    }

    /// Connect to a specific reader by name (CStr)
    pub fn connect(&self, reader_name: &CStr) -> Result<PcscChannel, pcsc::Error> {
        let card = self
            .context
            .connect(reader_name, ShareMode::Shared, Protocols::ANY)?;
        let reader_name = reader_name.to_str().unwrap_or("Unknown").to_string();
        debug!(reader = %reader_name, "Connected to card");
        Ok(PcscChannel { card, reader_name })
    }
}

/// [`CardChannel`] over a connected PC/SC card handle
pub struct PcscChannel {
    card: Card,
    reader_name: String,
}

impl PcscChannel {
    /// Name of the reader this channel is connected through
    pub fn reader_name(&self) -> &str {
        &self.reader_name
    }
}

impl CardChannel for PcscChannel {
    fn transmit(&mut self, apdu: &[u8]) -> Result<ApduResponse, ChannelError> {
        let mut rapdu_buf = [0; MAX_BUFFER_SIZE];
        let rapdu = self.card.transmit(apdu, &mut rapdu_buf)?;
        trace!(rapdu = %hex::encode_upper(rapdu), "Raw response");
        ApduResponse::from_bytes(rapdu)
    }

    fn atr(&mut self) -> Result<Vec<u8>, ChannelError> {
        Ok(self.card.get_attribute_owned(Attribute::AtrString)?)
    }

    fn is_present(&mut self) -> bool {
        match self.card.status2_owned() {
            Ok(status) => status.status().contains(Status::PRESENT),
            Err(err) => {
                debug!(error = %err, "Card status unavailable");
                false
            }
        }
    }
}
