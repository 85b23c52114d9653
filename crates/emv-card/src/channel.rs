//! Card channel abstraction
//!
//! The sequencer only ever talks to a [`CardChannel`]. The PC/SC reader in
//! [`crate::reader`] is the production implementation; tests script one in
//! memory.

use thiserror::Error;

use crate::apdu::ApduResponse;

/// Transport-level failures; any of these ends the current acquisition
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("card removed")]
    CardRemoved,

    #[error("response too short: {0} bytes")]
    ShortResponse(usize),

    #[error("PC/SC error: {0}")]
    Pcsc(pcsc::Error),

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<pcsc::Error> for ChannelError {
    fn from(err: pcsc::Error) -> Self {
        match err {
            pcsc::Error::RemovedCard | pcsc::Error::NoSmartcard => Self::CardRemoved,
            other => Self::Pcsc(other),
        }
    }
}

/// An already connected, exclusively borrowed channel to one card
pub trait CardChannel {
    /// Send a command APDU and return the split response
    fn transmit(&mut self, apdu: &[u8]) -> Result<ApduResponse, ChannelError>;

    /// Answer-to-reset of the card currently in the reader
    fn atr(&mut self) -> Result<Vec<u8>, ChannelError>;

    /// Whether a card is still in the reader
    fn is_present(&mut self) -> bool;
}

impl<C: CardChannel + ?Sized> CardChannel for &mut C {
    fn transmit(&mut self, apdu: &[u8]) -> Result<ApduResponse, ChannelError> {
        (**self).transmit(apdu)
    }

    fn atr(&mut self) -> Result<Vec<u8>, ChannelError> {
        (**self).atr()
    }

    fn is_present(&mut self) -> bool {
        (**self).is_present()
    }
}
