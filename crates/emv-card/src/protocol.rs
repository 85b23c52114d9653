//! EMV protocol implementation
//!
//! The [`Sequencer`] walks a card through brand detection, GET PROCESSING
//! OPTIONS and the record scan. Status words decide whether to continue,
//! skip to the next SFI, or move on; only transport failures end a run early.

use emv_common::decode;
use emv_common::tags::known;
use emv_common::{find_tag, tlv};
use tracing::{debug, info, warn};

use crate::apdu::{commands, ApduResponse, SwClass};
use crate::channel::{CardChannel, ChannelError};
use crate::policy::{ScanPolicy, ScanStrategy};
use crate::session::{AcquisitionStatus, CardBrand, CardRecord, RecordNumber, RecordSource};

/// Known EMV Application Identifiers (AIDs)
pub mod aids {
    /// PSE (Payment System Environment)
    pub const PSE: &[u8] = b"1PAY.SYS.DDF01";

    /// Visa credit/debit
    pub const VISA: &[u8] = &[0xA0, 0x00, 0x00, 0x00, 0x03, 0x10, 0x10];

    /// Visa Electron
    pub const VISA_ELECTRON: &[u8] = &[0xA0, 0x00, 0x00, 0x00, 0x03, 0x20, 0x10];

    /// Visa V PAY
    pub const VISA_VPAY: &[u8] = &[0xA0, 0x00, 0x00, 0x00, 0x03, 0x30, 0x10];

    /// Mastercard credit/debit
    pub const MASTERCARD: &[u8] = &[0xA0, 0x00, 0x00, 0x00, 0x04, 0x10, 0x10];

    /// Maestro
    pub const MAESTRO: &[u8] = &[0xA0, 0x00, 0x00, 0x00, 0x04, 0x30, 0x60];

    /// Cirrus
    pub const CIRRUS: &[u8] = &[0xA0, 0x00, 0x00, 0x00, 0x04, 0x60, 0x00];
}

/// SFI holding the transaction log on most cards
pub const LOG_SFI: u8 = 11;

/// Sequencer progress, in the order states are entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    /// Payment System Environment directory being read
    DirectoryRead,
    BrandDetection,
    ApplicationSelected,
    ProcessingOptionsRequested,
    RecordScan,
    /// Transaction log and PIN try counter reads
    ExtraData,
    Done,
}

/// One Application File Locator entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AflEntry {
    pub sfi: u8,
    pub first_record: u8,
    pub last_record: u8,
    /// Records involved in offline data authentication
    pub offline_records: u8,
}

/// Parse AFL (Application File Locator) from a GPO response
///
/// Format 2 responses carry the AFL in tag 94 inside template 77; format 1
/// responses (template 80) carry it after the two-byte AIP.
pub fn parse_afl(gpo_data: &[u8]) -> Option<Vec<AflEntry>> {
    let search_data = find_tag(gpo_data, &[0x77]).unwrap_or(gpo_data);

    let afl = match find_tag(search_data, &[0x94]) {
        Some(afl) => afl,
        None => find_tag(gpo_data, &[0x80])?.get(2..)?,
    };

    if afl.is_empty() || afl.len() % 4 != 0 {
        debug!(len = afl.len(), "AFL is not a whole number of entries");
        return None;
    }

    // Byte 1: SFI in the upper 5 bits, byte 2: first record,
    // byte 3: last record, byte 4: offline authentication records
    let entries = afl
        .chunks_exact(4)
        .map(|entry| AflEntry {
            sfi: entry[0] >> 3,
            first_record: entry[1],
            last_record: entry[2],
            offline_records: entry[3],
        })
        .filter(|entry| entry.sfi != 0 && entry.first_record != 0 && entry.first_record <= entry.last_record)
        .collect();

    Some(entries)
}

/// What the sequencer collected
#[derive(Debug, Clone)]
pub struct SequenceOutcome {
    pub brand: CardBrand,
    pub status: AcquisitionStatus,
    pub records: Vec<CardRecord>,
    pub error: Option<String>,
}

enum RecordRead {
    Found,
    NotFound,
    Failed,
}

/// APDU command sequencer for one acquisition
pub struct Sequencer<'a, C: CardChannel + ?Sized> {
    channel: &'a mut C,
    policy: &'a ScanPolicy,
    state: SequencerState,
    brand: CardBrand,
    records: Vec<CardRecord>,
    read_attempts: usize,
}

impl<'a, C: CardChannel + ?Sized> Sequencer<'a, C> {
    pub fn new(channel: &'a mut C, policy: &'a ScanPolicy) -> Self {
        Self {
            channel,
            policy,
            state: SequencerState::Idle,
            brand: CardBrand::Unknown,
            records: Vec::new(),
            read_attempts: 0,
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// READ RECORD commands issued so far
    pub fn read_attempts(&self) -> usize {
        self.read_attempts
    }

    /// Drive the card to [`SequencerState::Done`]
    ///
    /// Never fails: a transport error ends the run with
    /// [`AcquisitionStatus::Error`] and whatever records were read before it.
    /// A policy that does not validate ends it before any command is sent.
    pub fn run(&mut self) -> SequenceOutcome {
        // Out-of-range SFIs would wrap inside the READ RECORD P2 byte
        if let Err(err) = self.policy.validate() {
            warn!(error = %err, "Scan policy rejected");
            self.enter(SequencerState::Done);
            return SequenceOutcome {
                brand: CardBrand::Unknown,
                status: AcquisitionStatus::Error,
                records: Vec::new(),
                error: Some(err.to_string()),
            };
        }

        let result = self.drive();
        self.enter(SequencerState::Done);

        let records = std::mem::take(&mut self.records);
        let (status, error) = match result {
            Ok(()) if records.is_empty() => (AcquisitionStatus::NoData, None),
            Ok(()) => (AcquisitionStatus::Success, None),
            Err(err) => {
                warn!(error = %err, records = records.len(), "Acquisition aborted");
                (AcquisitionStatus::Error, Some(err.to_string()))
            }
        };

        SequenceOutcome {
            brand: self.brand,
            status,
            records,
            error,
        }
    }

    fn drive(&mut self) -> Result<(), ChannelError> {
        if self.policy.read_pse {
            self.enter(SequencerState::DirectoryRead);
            self.read_directory()?;
        }

        self.enter(SequencerState::BrandDetection);
        self.brand = self.detect_brand()?;
        if self.brand == CardBrand::Unknown {
            info!("No supported payment application found");
            return Ok(());
        }
        self.enter(SequencerState::ApplicationSelected);

        let gpo = self.exchange(commands::GET_PROCESSING_OPTIONS)?;
        self.enter(SequencerState::ProcessingOptionsRequested);
        let afl = if gpo.is_success() {
            let objects = tlv::parse(&gpo.data);
            debug!(objects = objects.len(), "Processing options received");
            parse_afl(&gpo.data)
        } else {
            debug!(sw = %gpo.status_string(), class = ?gpo.class(), "GET PROCESSING OPTIONS failed, continuing");
            None
        };

        self.enter(SequencerState::RecordScan);
        match (self.policy.strategy, afl) {
            (ScanStrategy::Afl, Some(entries)) if !entries.is_empty() => self.scan_afl(&entries)?,
            (ScanStrategy::Afl, _) => {
                info!("No usable AFL, scanning all files");
                self.scan_all()?
            }
            (ScanStrategy::BruteForce, _) => self.scan_all()?,
        }

        if self.policy.read_transaction_log || self.policy.read_pin_try_counter {
            self.enter(SequencerState::ExtraData);
            self.read_extra_data()?;
        }

        Ok(())
    }

    fn enter(&mut self, state: SequencerState) {
        debug!(from = ?self.state, to = ?state, "Sequencer state");
        self.state = state;
    }

    /// Send one command, following 61xx with GET RESPONSE when enabled
    fn exchange(&mut self, apdu: &[u8]) -> Result<ApduResponse, ChannelError> {
        debug!(capdu = %hex::encode_upper(apdu), "Sending APDU");
        let mut response = self.channel.transmit(apdu)?;
        debug!(sw = %response.status_string(), len = response.data.len(), "Received response");

        if !self.policy.follow_get_response {
            return Ok(response);
        }

        let mut data = std::mem::take(&mut response.data);
        let mut follow_ups = 0;
        while let SwClass::MoreData(available) = response.class() {
            if follow_ups == self.policy.max_get_response {
                warn!(follow_ups, "GET RESPONSE limit reached");
                break;
            }
            follow_ups += 1;
            response = self.channel.transmit(&commands::get_response(available).build())?;
            debug!(sw = %response.status_string(), len = response.data.len(), "GET RESPONSE");
            data.append(&mut response.data);
        }
        response.data = data;

        Ok(response)
    }

    fn ensure_present(&mut self) -> Result<(), ChannelError> {
        if self.channel.is_present() {
            Ok(())
        } else {
            Err(ChannelError::CardRemoved)
        }
    }

    fn candidates(&self) -> Vec<(CardBrand, &'static [u8])> {
        let mut candidates = vec![
            (CardBrand::Visa, aids::VISA),
            (CardBrand::Mastercard, aids::MASTERCARD),
        ];
        if self.policy.brand_aid_variants {
            candidates.extend([
                (CardBrand::Visa, aids::VISA_ELECTRON),
                (CardBrand::Visa, aids::VISA_VPAY),
                (CardBrand::Mastercard, aids::MAESTRO),
                (CardBrand::Mastercard, aids::CIRRUS),
            ]);
        }
        candidates
    }

    fn detect_brand(&mut self) -> Result<CardBrand, ChannelError> {
        for (brand, aid) in self.candidates() {
            let response = self.exchange(&commands::select(aid).build())?;
            if response.is_success() {
                info!(?brand, aid = %hex::encode_upper(aid), "Application selected");
                return Ok(brand);
            }
            debug!(
                aid = %hex::encode_upper(aid),
                sw = %response.status_string(),
                reason = response.class().description(),
                "SELECT failed"
            );
        }
        Ok(CardBrand::Unknown)
    }

    fn read_directory(&mut self) -> Result<(), ChannelError> {
        let response = self.exchange(&commands::select(aids::PSE).build())?;
        if !response.is_success() {
            debug!(sw = %response.status_string(), "No payment system environment");
            return Ok(());
        }

        let record = self.exchange(&commands::read_record(1, 1).build())?;
        if record.is_success() {
            self.push_record(RecordSource::Label("PSE"), RecordNumber::Number(1), &record.data);
        } else {
            debug!(sw = %record.status_string(), "PSE record unavailable");
        }
        Ok(())
    }

    fn budget_exhausted(&self) -> bool {
        match self.policy.max_read_attempts {
            Some(max) if self.read_attempts >= max => {
                info!(attempts = self.read_attempts, "Read attempt budget reached");
                true
            }
            _ => false,
        }
    }

    fn scan_all(&mut self) -> Result<(), ChannelError> {
        for sfi in self.policy.sfis() {
            self.ensure_present()?;
            for record in self.policy.records() {
                if self.budget_exhausted() {
                    return Ok(());
                }
                if let RecordRead::NotFound = self.read_record(sfi, record)? {
                    break;
                }
            }
        }
        Ok(())
    }

    fn scan_afl(&mut self, entries: &[AflEntry]) -> Result<(), ChannelError> {
        debug!(entries = entries.len(), "Scanning records listed in AFL");
        for entry in entries {
            self.ensure_present()?;
            for record in entry.first_record..=entry.last_record {
                if self.budget_exhausted() {
                    return Ok(());
                }
                if let RecordRead::NotFound = self.read_record(entry.sfi, record)? {
                    break;
                }
            }
        }
        Ok(())
    }

    fn read_record(&mut self, sfi: u8, record: u8) -> Result<RecordRead, ChannelError> {
        self.read_attempts += 1;
        let response = self.exchange(&commands::read_record(record, sfi).build())?;

        match response.class() {
            class if class.is_success() => {
                self.push_record(RecordSource::Sfi(sfi), RecordNumber::Number(record), &response.data);
                Ok(RecordRead::Found)
            }
            SwClass::RecordNotFound => Ok(RecordRead::NotFound),
            class => {
                debug!(sfi, record, sw = %response.status_string(), reason = class.description(), "Record read failed");
                Ok(RecordRead::Failed)
            }
        }
    }

    fn read_extra_data(&mut self) -> Result<(), ChannelError> {
        self.ensure_present()?;

        if self.policy.read_transaction_log {
            let response = self.exchange(&commands::read_record(1, LOG_SFI).build())?;
            if response.is_success() {
                self.push_record(RecordSource::Label("LOG"), RecordNumber::Number(1), &response.data);
            } else {
                debug!(sw = %response.status_string(), "Transaction log unavailable");
            }
        }

        if self.policy.read_pin_try_counter {
            let response = self.exchange(&commands::get_data(known::PIN_TRY_COUNTER.as_bytes()).build())?;
            if response.is_success() {
                self.push_record(
                    RecordSource::Label("PIN"),
                    RecordNumber::Label("try_counter"),
                    &response.data,
                );
            } else {
                debug!(sw = %response.status_string(), "PIN try counter unavailable");
            }
        }

        Ok(())
    }

    fn push_record(&mut self, source: RecordSource, number: RecordNumber, data: &[u8]) {
        let fields = decode(data);
        if fields.is_empty() {
            debug!(%source, %number, "Record holds no data objects");
            return;
        }
        debug!(%source, %number, fields = fields.len(), "Record read");
        self.records.push(CardRecord {
            sfi_or_label: source,
            record_number: number,
            fields,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aids() {
        assert_eq!(aids::VISA.len(), 7);
        assert_eq!(aids::MASTERCARD.len(), 7);
        assert_eq!(aids::PSE, b"1PAY.SYS.DDF01");
        for aid in [aids::VISA_ELECTRON, aids::VISA_VPAY] {
            assert_eq!(&aid[..5], &aids::VISA[..5]);
        }
        for aid in [aids::MAESTRO, aids::CIRRUS] {
            assert_eq!(&aid[..5], &aids::MASTERCARD[..5]);
        }
    }

    #[test]
    fn test_parse_afl_format_2() {
        // 77 0E  82 02 1980  94 08 08010100 10010300
        let gpo = [
            0x77, 0x0E, 0x82, 0x02, 0x19, 0x80, 0x94, 0x08, 0x08, 0x01, 0x01, 0x00, 0x10, 0x01,
            0x03, 0x00,
        ];
        let entries = parse_afl(&gpo).unwrap();
        assert_eq!(
            entries,
            vec![
                AflEntry { sfi: 1, first_record: 1, last_record: 1, offline_records: 0 },
                AflEntry { sfi: 2, first_record: 1, last_record: 3, offline_records: 0 },
            ]
        );
    }

    #[test]
    fn test_parse_afl_format_1() {
        // 80 06  AIP 1980  AFL 18010201
        let gpo = [0x80, 0x06, 0x19, 0x80, 0x18, 0x01, 0x02, 0x01];
        let entries = parse_afl(&gpo).unwrap();
        assert_eq!(
            entries,
            vec![AflEntry { sfi: 3, first_record: 1, last_record: 2, offline_records: 1 }]
        );
    }

    #[test]
    fn test_parse_afl_rejects_bad_entries() {
        assert_eq!(parse_afl(&[0x77, 0x02, 0x82, 0x00]), None);
        // Record range reversed, and SFI 0
        let gpo = [0x94, 0x08, 0x08, 0x03, 0x01, 0x00, 0x00, 0x01, 0x01, 0x00];
        assert_eq!(parse_afl(&gpo), Some(Vec::new()));
        // Not a whole number of entries
        assert_eq!(parse_afl(&[0x94, 0x03, 0x08, 0x01, 0x01]), None);
    }
}
