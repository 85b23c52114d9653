//! Acquisition session
//!
//! One acquisition per card: read the ATR, run the [`Sequencer`] to
//! completion and package everything as an [`AcquisitionResult`]. The
//! [`AcquisitionSession`] adds the polling side, re-acquiring only when the
//! ATR changes.

use std::fmt;

use emv_common::decode::{flatten, usage_services};
use emv_common::tags::known;
use emv_common::DecodedField;
use serde::{Serialize, Serializer};
use tracing::{info, warn};

use crate::atr::describe_atr;
use crate::channel::{CardChannel, ChannelError};
use crate::policy::ScanPolicy;
use crate::protocol::Sequencer;

/// Payment brand of the selected application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CardBrand {
    Visa,
    Mastercard,
    Unknown,
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Visa => f.write_str("VISA"),
            Self::Mastercard => f.write_str("MASTERCARD"),
            Self::Unknown => f.write_str("UNKNOWN"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AcquisitionStatus {
    /// At least one record was read
    Success,
    /// The card answered but no record could be read
    NoData,
    /// The channel failed part way; records hold what was read before
    Error,
}

/// Where a record came from: an SFI, or a label for directory and extra reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RecordSource {
    Sfi(u8),
    Label(&'static str),
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sfi(sfi) => write!(f, "{}", sfi),
            Self::Label(label) => f.write_str(label),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RecordNumber {
    Number(u8),
    Label(&'static str),
}

impl fmt::Display for RecordNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{}", number),
            Self::Label(label) => f.write_str(label),
        }
    }
}

/// Decoded contents of one successful read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardRecord {
    pub sfi_or_label: RecordSource,
    pub record_number: RecordNumber,
    /// Top-level fields; templates keep their children nested
    pub fields: Vec<DecodedField>,
}

impl CardRecord {
    /// Every field, templates before their children
    pub fn all_fields(&self) -> Vec<&DecodedField> {
        flatten(&self.fields)
    }
}

fn serialize_hex<S, T>(bytes: T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: AsRef<[u8]>,
{
    serializer.serialize_str(&hex::encode_upper(bytes))
}

/// Everything learned from one card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcquisitionResult {
    pub card_brand: CardBrand,
    #[serde(serialize_with = "serialize_hex")]
    pub atr: Vec<u8>,
    pub status: AcquisitionStatus,
    pub records: Vec<CardRecord>,
    /// Transport failure that ended the run, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AcquisitionResult {
    fn failed(atr: Vec<u8>, err: ChannelError) -> Self {
        Self {
            card_brand: CardBrand::Unknown,
            atr,
            status: AcquisitionStatus::Error,
            records: Vec::new(),
            error: Some(err.to_string()),
        }
    }

    /// The ATR with its decoded annotations
    pub fn atr_description(&self) -> String {
        describe_atr(&self.atr)
    }

    /// Number of data objects across all records, templates included
    pub fn field_count(&self) -> usize {
        self.records.iter().map(|r| r.all_fields().len()).sum()
    }

    /// Key card details, first occurrence of each tag wins
    pub fn summary(&self) -> CardSummary {
        let mut summary = CardSummary {
            card_brand: self.card_brand,
            ..CardSummary::default()
        };

        for record in &self.records {
            let is_log = record.sfi_or_label == RecordSource::Label("LOG");
            for field in record.all_fields() {
                if is_log && !field.tag.is_template() {
                    summary.logs.push(field.raw_hex.clone());
                }
                summary.absorb(field);
            }
        }

        summary
    }
}

/// Key details pulled from an acquisition for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardSummary {
    pub card_brand: CardBrand,
    pub card_number: Option<String>,
    pub expiry_date: Option<String>,
    pub aid: Option<String>,
    pub application_label: Option<String>,
    pub cardholder_name: Option<String>,
    pub transaction_count: Option<u64>,
    pub pin_tries: Option<u64>,
    pub services: Vec<&'static str>,
    /// Raw hex of each transaction log entry
    pub logs: Vec<String>,
}

impl Default for CardSummary {
    fn default() -> Self {
        Self {
            card_brand: CardBrand::Unknown,
            card_number: None,
            expiry_date: None,
            aid: None,
            application_label: None,
            cardholder_name: None,
            transaction_count: None,
            pin_tries: None,
            services: Vec::new(),
            logs: Vec::new(),
        }
    }
}

fn counter(raw: &[u8]) -> Option<u64> {
    if raw.is_empty() || raw.len() > 8 {
        return None;
    }
    Some(raw.iter().fold(0u64, |acc, &byte| (acc << 8) | byte as u64))
}

impl CardSummary {
    fn absorb(&mut self, field: &DecodedField) {
        let tag = field.tag;
        if tag == known::APPLICATION_PAN {
            self.card_number.get_or_insert_with(|| field.value.to_string());
        } else if tag == known::APPLICATION_EXPIRATION_DATE {
            self.expiry_date.get_or_insert_with(|| field.value.to_string());
        } else if tag == known::APPLICATION_IDENTIFIER {
            self.aid.get_or_insert_with(|| field.raw_hex.clone());
        } else if tag == known::APPLICATION_LABEL {
            self.application_label.get_or_insert_with(|| field.value.to_string());
        } else if tag == known::CARDHOLDER_NAME {
            self.cardholder_name.get_or_insert_with(|| field.value.to_string());
        } else if tag == known::APPLICATION_TRANSACTION_COUNTER {
            if self.transaction_count.is_none() {
                self.transaction_count = counter(&field.raw);
            }
        } else if tag == known::PIN_TRY_COUNTER {
            if self.pin_tries.is_none() {
                self.pin_tries = counter(&field.raw);
            }
        } else if tag == known::APPLICATION_USAGE_CONTROL && self.services.is_empty() {
            self.services = usage_services(&field.raw);
        }
    }
}

/// Run one acquisition on an already connected card
pub fn acquire<C: CardChannel + ?Sized>(channel: &mut C, policy: &ScanPolicy) -> AcquisitionResult {
    match channel.atr() {
        Ok(atr) => run_acquisition(channel, policy, atr),
        Err(err) => {
            warn!(error = %err, "Could not read ATR");
            AcquisitionResult::failed(Vec::new(), err)
        }
    }
}

fn run_acquisition<C: CardChannel + ?Sized>(
    channel: &mut C,
    policy: &ScanPolicy,
    atr: Vec<u8>,
) -> AcquisitionResult {
    info!(atr = %describe_atr(&atr), "Starting acquisition");

    let outcome = Sequencer::new(channel, policy).run();
    info!(
        brand = %outcome.brand,
        status = ?outcome.status,
        records = outcome.records.len(),
        "Acquisition finished"
    );

    AcquisitionResult {
        card_brand: outcome.brand,
        atr,
        status: outcome.status,
        records: outcome.records,
        error: outcome.error,
    }
}

/// Result of one poll
#[derive(Debug)]
pub enum PollOutcome<'a> {
    /// No card in the reader
    NoCard,
    /// Same card as last time, nothing sent
    Unchanged,
    /// A new ATR was seen and a fresh acquisition ran
    Acquired(&'a AcquisitionResult),
}

/// Polling state: the last ATR seen and the result it produced
#[derive(Debug, Default)]
pub struct AcquisitionSession {
    policy: ScanPolicy,
    last_atr: Option<Vec<u8>>,
    latest: Option<AcquisitionResult>,
}

impl AcquisitionSession {
    pub fn new(policy: ScanPolicy) -> Self {
        Self {
            policy,
            last_atr: None,
            latest: None,
        }
    }

    pub fn policy(&self) -> &ScanPolicy {
        &self.policy
    }

    /// Most recent result; survives card removal until the next card
    pub fn latest(&self) -> Option<&AcquisitionResult> {
        self.latest.as_ref()
    }

    /// Check the reader and acquire if a new card is present
    pub fn poll<C: CardChannel + ?Sized>(&mut self, channel: &mut C) -> PollOutcome<'_> {
        if !channel.is_present() {
            self.card_removed();
            return PollOutcome::NoCard;
        }

        let atr = match channel.atr() {
            Ok(atr) => atr,
            Err(err) => {
                warn!(error = %err, "Could not read ATR");
                self.card_removed();
                return PollOutcome::NoCard;
            }
        };

        if self.last_atr.as_deref() == Some(atr.as_slice()) {
            return PollOutcome::Unchanged;
        }

        info!(atr = %hex::encode_upper(&atr), "New card detected");
        self.last_atr = Some(atr.clone());
        let result = run_acquisition(channel, &self.policy, atr);
        PollOutcome::Acquired(self.latest.insert(result))
    }

    /// Forget the current card so the next one is always acquired
    pub fn card_removed(&mut self) {
        if self.last_atr.take().is_some() {
            info!("Card removed");
        }
    }
}
