//! Record scan policy

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the record phase picks the (SFI, record) pairs to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStrategy {
    /// Every SFI and record in the configured ranges
    #[default]
    BruteForce,
    /// Only the records the Application File Locator lists, falling back to
    /// brute force when the card returns no usable AFL
    Afl,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("SFI range {first}..={last} must lie within 1..=31")]
    SfiRange { first: u8, last: u8 },

    #[error("record range {first}..={last} must start at 1 or later and not be reversed")]
    RecordRange { first: u8, last: u8 },

    #[error("max_get_response must be at least 1 when follow_get_response is enabled")]
    GetResponseLimit,
}

/// Tunables for one acquisition
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanPolicy {
    pub first_sfi: u8,
    pub last_sfi: u8,
    pub first_record: u8,
    pub last_record: u8,
    pub strategy: ScanStrategy,
    /// Issue GET RESPONSE after a 61xx status and append the bytes
    pub follow_get_response: bool,
    /// Upper bound on chained GET RESPONSE commands for one exchange
    pub max_get_response: usize,
    /// Stop the record phase after this many READ RECORD commands
    pub max_read_attempts: Option<usize>,
    /// Select the PSE directory and read its first record before brand detection
    pub read_pse: bool,
    /// Also try Visa Electron, V PAY, Maestro and Cirrus during brand detection
    pub brand_aid_variants: bool,
    pub read_transaction_log: bool,
    pub read_pin_try_counter: bool,
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self {
            first_sfi: 1,
            last_sfi: 31,
            first_record: 1,
            last_record: 16,
            strategy: ScanStrategy::BruteForce,
            follow_get_response: true,
            max_get_response: 8,
            max_read_attempts: None,
            read_pse: true,
            brand_aid_variants: false,
            read_transaction_log: true,
            read_pin_try_counter: true,
        }
    }
}

impl ScanPolicy {
    pub fn sfis(&self) -> RangeInclusive<u8> {
        self.first_sfi..=self.last_sfi
    }

    pub fn records(&self) -> RangeInclusive<u8> {
        self.first_record..=self.last_record
    }

    /// Check the ranges fit in a READ RECORD command
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.first_sfi == 0 || self.last_sfi > 31 || self.first_sfi > self.last_sfi {
            return Err(PolicyError::SfiRange {
                first: self.first_sfi,
                last: self.last_sfi,
            });
        }
        if self.first_record == 0 || self.first_record > self.last_record {
            return Err(PolicyError::RecordRange {
                first: self.first_record,
                last: self.last_record,
            });
        }
        if self.follow_get_response && self.max_get_response == 0 {
            return Err(PolicyError::GetResponseLimit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scan_ranges() {
        let policy = ScanPolicy::default();
        assert_eq!(policy.sfis(), 1..=31);
        assert_eq!(policy.records(), 1..=16);
        assert_eq!(policy.strategy, ScanStrategy::BruteForce);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_invalid_ranges() {
        let policy = ScanPolicy {
            last_sfi: 32,
            ..ScanPolicy::default()
        };
        assert_eq!(
            policy.validate(),
            Err(PolicyError::SfiRange { first: 1, last: 32 })
        );

        let policy = ScanPolicy {
            first_record: 0,
            ..ScanPolicy::default()
        };
        assert!(matches!(policy.validate(), Err(PolicyError::RecordRange { .. })));

        let policy = ScanPolicy {
            max_get_response: 0,
            ..ScanPolicy::default()
        };
        assert_eq!(policy.validate(), Err(PolicyError::GetResponseLimit));
    }
}
