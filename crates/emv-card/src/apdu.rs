//! APDU (Application Protocol Data Unit) command handling

use crate::channel::{CardChannel, ChannelError};

/// APDU response containing data and status word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApduResponse {
    /// Response data (without status word)
    pub data: Vec<u8>,
    /// Status word SW1
    pub sw1: u8,
    /// Status word SW2
    pub sw2: u8,
}

impl ApduResponse {
    /// Build a response from its parts
    pub fn new(data: Vec<u8>, sw1: u8, sw2: u8) -> Self {
        Self { data, sw1, sw2 }
    }

    /// Split a raw response APDU into data and trailing status word
    pub fn from_bytes(rapdu: &[u8]) -> Result<Self, ChannelError> {
        if rapdu.len() < 2 {
            return Err(ChannelError::ShortResponse(rapdu.len()));
        }

        let sw1 = rapdu[rapdu.len() - 2];
        let sw2 = rapdu[rapdu.len() - 1];
        let data = rapdu[..rapdu.len() - 2].to_vec();

        Ok(Self { data, sw1, sw2 })
    }

    /// Check if the response indicates success (9000, or 61xx with more data waiting)
    pub fn is_success(&self) -> bool {
        self.class().is_success()
    }

    /// Classify the status word
    pub fn class(&self) -> SwClass {
        SwClass::from_sw(self.sw1, self.sw2)
    }

    /// Get the full status word as a 16-bit value
    pub fn status_word(&self) -> u16 {
        ((self.sw1 as u16) << 8) | (self.sw2 as u16)
    }

    /// Get status word as hex string (e.g., "9000")
    pub fn status_string(&self) -> String {
        format!("{:02X}{:02X}", self.sw1, self.sw2)
    }
}

/// ISO 7816-4 status word classes the sequencer distinguishes
///
/// Every failure class is treated the same way by the sequencer (move on to
/// the next candidate); the distinction exists for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwClass {
    /// 9000
    Success,
    /// 61xx, xx bytes still available
    MoreData(u8),
    /// 6A83
    RecordNotFound,
    /// 6A82
    FileNotFound,
    /// 6A86
    IncorrectParameters,
    /// 6A81
    FunctionNotSupported,
    /// 6Cxx, retry with Le = xx
    WrongLength(u8),
    /// 6Dxx
    InsNotSupported,
    /// 6Exx
    ClaNotSupported,
    /// 6Fxx
    Aborted,
    Other(u16),
}

impl SwClass {
    pub fn from_sw(sw1: u8, sw2: u8) -> Self {
        match (sw1, sw2) {
            (0x90, 0x00) => Self::Success,
            (0x61, remaining) => Self::MoreData(remaining),
            (0x6A, 0x83) => Self::RecordNotFound,
            (0x6A, 0x82) => Self::FileNotFound,
            (0x6A, 0x86) => Self::IncorrectParameters,
            (0x6A, 0x81) => Self::FunctionNotSupported,
            (0x6C, le) => Self::WrongLength(le),
            (0x6D, _) => Self::InsNotSupported,
            (0x6E, _) => Self::ClaNotSupported,
            (0x6F, _) => Self::Aborted,
            _ => Self::Other(((sw1 as u16) << 8) | sw2 as u16),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::MoreData(_))
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::MoreData(_) => "Success, response bytes still available",
            Self::RecordNotFound => "Record not found",
            Self::FileNotFound => "File or application not found",
            Self::IncorrectParameters => "Incorrect parameters P1-P2",
            Self::FunctionNotSupported => "Function not supported",
            Self::WrongLength(_) => "Wrong length Le",
            Self::InsNotSupported => "Instruction not supported",
            Self::ClaNotSupported => "Class not supported",
            Self::Aborted => "No precise diagnosis",
            Self::Other(_) => "Unexpected status",
        }
    }
}

/// APDU command builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApduCommand {
    cla: u8,
    ins: u8,
    p1: u8,
    p2: u8,
    data: Vec<u8>,
    le: Option<u8>,
}

impl ApduCommand {
    /// Create a new APDU command
    pub fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: Vec::new(),
            le: None,
        }
    }

    /// Set command data
    pub fn data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    /// Set expected response length
    pub fn le(mut self, le: u8) -> Self {
        self.le = Some(le);
        self
    }

    /// Build the APDU command bytes
    pub fn build(&self) -> Vec<u8> {
        let mut apdu = vec![self.cla, self.ins, self.p1, self.p2];

        if !self.data.is_empty() {
            apdu.push(self.data.len() as u8);
            apdu.extend_from_slice(&self.data);
        }

        if let Some(le) = self.le {
            apdu.push(le);
        }

        apdu
    }

    /// Send this command over a card channel
    pub fn send<C: CardChannel + ?Sized>(&self, channel: &mut C) -> Result<ApduResponse, ChannelError> {
        channel.transmit(&self.build())
    }
}

/// Common EMV APDU commands
pub mod commands {
    use emv_common::tags::known;
    use emv_common::tlv;

    use super::ApduCommand;

    /// SELECT Visa credit/debit, as sent on the wire
    pub const SELECT_VISA_AID: &[u8] = &[
        0x00, 0xA4, 0x04, 0x00, 0x07, 0xA0, 0x00, 0x00, 0x00, 0x03, 0x10, 0x10,
    ];

    /// SELECT Mastercard credit/debit, as sent on the wire
    pub const SELECT_MASTERCARD_AID: &[u8] = &[
        0x00, 0xA4, 0x04, 0x00, 0x07, 0xA0, 0x00, 0x00, 0x00, 0x04, 0x10, 0x10,
    ];

    /// GET PROCESSING OPTIONS with an empty PDOL, as sent on the wire
    pub const GET_PROCESSING_OPTIONS: &[u8] = &[0x80, 0xA8, 0x00, 0x00, 0x02, 0x83, 0x00, 0x00];

    /// SELECT command (by name/AID)
    pub fn select(aid: &[u8]) -> ApduCommand {
        ApduCommand::new(0x00, 0xA4, 0x04, 0x00).data(aid.to_vec())
    }

    /// GET PROCESSING OPTIONS command with an empty command template (83 00)
    pub fn get_processing_options() -> ApduCommand {
        ApduCommand::new(0x80, 0xA8, 0x00, 0x00)
            .data(tlv::encode(known::COMMAND_TEMPLATE, &[]))
            .le(0x00)
    }

    /// READ RECORD command
    pub fn read_record(record_number: u8, sfi: u8) -> ApduCommand {
        let p2 = (sfi << 3) | 0x04;
        ApduCommand::new(0x00, 0xB2, record_number, p2).le(0x00)
    }

    /// GET RESPONSE command, fetching bytes announced by a 61xx status
    pub fn get_response(length: u8) -> ApduCommand {
        ApduCommand::new(0x00, 0xC0, 0x00, 0x00).le(length)
    }

    /// GET DATA command - request specific data object from card
    pub fn get_data(tag: &[u8]) -> ApduCommand {
        match tag {
            [t] => ApduCommand::new(0x80, 0xCA, 0x00, *t).le(0x00),
            [t0, t1] => ApduCommand::new(0x80, 0xCA, *t0, *t1).le(0x00),
            // Longer tags go in the data field
            _ => ApduCommand::new(0x80, 0xCA, 0x00, 0x00)
                .data(tag.to_vec())
                .le(0x00),
        }
    }
}
