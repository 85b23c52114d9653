use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use emv_card::{AcquisitionResult, AcquisitionSession, CardReader, PcscError, PollOutcome, ScanPolicy};
use tracing::{debug, info};

use super::connect;
use crate::formatters::{self, FormatMode};

/// Messages sent from the card worker to the printing loop
#[derive(Debug)]
pub enum CardEvent {
    /// A new card was read
    Acquired(Box<AcquisitionResult>),
    /// Card was removed
    CardRemoved,
    /// Reader is unavailable
    ReaderUnavailable { error: String },
    /// Reader became available
    ReaderAvailable,
}

/// Errors after which the PC/SC context itself must be re-established
fn context_lost(err: &PcscError) -> bool {
    matches!(
        err,
        PcscError::NoService | PcscError::ServiceStopped | PcscError::InvalidHandle
    )
}

/// Background worker polling the reader
struct CardWorker {
    event_tx: Sender<CardEvent>,
    reader_name: Option<String>,
    interval: Duration,
    session: AcquisitionSession,
}

impl CardWorker {
    /// Spawn a new card worker thread
    ///
    /// The worker stops once the receiving side is dropped.
    fn spawn(reader_name: Option<String>, interval: Duration, policy: ScanPolicy) -> Receiver<CardEvent> {
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let worker = CardWorker {
                event_tx,
                reader_name,
                interval,
                session: AcquisitionSession::new(policy),
            };
            worker.run();
        });

        event_rx
    }

    fn run(mut self) {
        info!("Card worker thread started");

        let mut reader: Option<CardReader> = None;
        let mut card_present = false;
        let mut last_reader_check: Option<Instant> = None;

        loop {
            // Try to get reader if we don't have one (check every 2 seconds)
            let check_due = last_reader_check.map_or(true, |at| at.elapsed() > Duration::from_secs(2));
            if reader.is_none() && check_due {
                let event = match CardReader::new() {
                    Ok(r) => {
                        info!("Card reader initialized");
                        reader = Some(r);
                        CardEvent::ReaderAvailable
                    }
                    Err(e) => {
                        debug!("Card reader unavailable: {}", e);
                        CardEvent::ReaderUnavailable {
                            error: e.to_string(),
                        }
                    }
                };
                if self.event_tx.send(event).is_err() {
                    break;
                }
                last_reader_check = Some(Instant::now());
            }

            let mut lost_context = false;
            if let Some(ref r) = reader {
                let event = match connect(r, self.reader_name.as_deref()) {
                    Ok(mut channel) => match self.session.poll(&mut channel) {
                        PollOutcome::Acquired(result) => {
                            card_present = true;
                            Some(CardEvent::Acquired(Box::new(result.clone())))
                        }
                        PollOutcome::Unchanged => None,
                        PollOutcome::NoCard => card_present.then_some(CardEvent::CardRemoved),
                    },
                    Err(e) => {
                        debug!("Connect failed: {}", e);
                        lost_context = context_lost(&e);
                        self.session.card_removed();
                        card_present.then_some(CardEvent::CardRemoved)
                    }
                };

                if let Some(event) = event {
                    if matches!(event, CardEvent::CardRemoved) {
                        card_present = false;
                    }
                    if self.event_tx.send(event).is_err() {
                        break;
                    }
                }
            }

            if lost_context {
                info!("PC/SC service lost, reinitializing");
                reader = None;
                last_reader_check = None;
            }

            // Sleep briefly to avoid busy loop
            thread::sleep(self.interval);
        }

        info!("Card worker thread stopped");
    }
}

pub fn cmd_watch(
    reader_name: Option<String>,
    interval_ms: u64,
    policy: ScanPolicy,
    mode: FormatMode,
) -> Result<()> {
    let events = CardWorker::spawn(reader_name, Duration::from_millis(interval_ms), policy);
    let mut reader_reported = false;

    if mode != FormatMode::Json {
        println!("Waiting for card...");
    }

    for event in events {
        match event {
            CardEvent::Acquired(result) => {
                println!("{}", formatters::format_result(&result, mode)?);
            }
            CardEvent::CardRemoved => {
                if mode != FormatMode::Json {
                    println!("Waiting for card...");
                }
            }
            CardEvent::ReaderUnavailable { error } => {
                if !reader_reported {
                    eprintln!("Card reader unavailable: {}", error);
                    reader_reported = true;
                }
            }
            CardEvent::ReaderAvailable => {
                reader_reported = false;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_lost_errors() {
        assert!(context_lost(&PcscError::ServiceStopped));
        assert!(context_lost(&PcscError::NoService));
        assert!(context_lost(&PcscError::InvalidHandle));
        assert!(!context_lost(&PcscError::NoSmartcard));
        assert!(!context_lost(&PcscError::RemovedCard));
    }
}
