//! Hardware-dependent integration tests
//!
//! These tests require a physical EMV card in a card reader.
//! They are ignored by default and must be explicitly run with:
//!
//!     cargo test --package emv-card --test hardware_integration -- --ignored
//!
//! Or to run all tests including hardware tests:
//!
//!     cargo test --package emv-card --test hardware_integration -- --include-ignored

use emv_card::apdu::commands;
use emv_card::protocol::aids;
use emv_card::reader::CardReader;
use emv_card::{acquire, AcquisitionStatus, CardBrand, CardChannel, ScanPolicy, ScanStrategy};

/// Test that we can connect to a card reader
///
/// **Requires**: Card reader connected (card not required)
#[test]
#[ignore = "requires hardware: card reader"]
fn test_connect_to_reader() {
    let reader = CardReader::new().expect("Failed to establish PC/SC context");
    let readers = reader.list_readers().expect("Failed to list readers");
    assert!(!readers.is_empty(), "No card reader found. Is a reader connected?");
}

/// Test that we can detect an inserted card and read its ATR
///
/// **Requires**: Card reader with card inserted
#[test]
#[ignore = "requires hardware: card inserted in reader"]
fn test_card_present() {
    let reader = CardReader::new().expect("Failed to connect to reader");
    let mut channel = reader.connect_first().expect("Failed to connect to card");

    println!("Connected to reader: {}", channel.reader_name());
    assert!(channel.is_present());

    let atr = channel.atr().expect("Failed to read ATR");
    println!("ATR: {}", emv_card::describe_atr(&atr));
    assert!(atr.len() >= 2);
}

/// Test selecting a known EMV application
///
/// **Requires**: EMV card (credit/debit card) inserted
#[test]
#[ignore = "requires hardware: EMV card"]
fn test_select_emv_application() {
    let reader = CardReader::new().expect("Failed to connect to reader");
    let mut channel = reader.connect_first().expect("Failed to connect to card");

    let known_aids = [("Visa", aids::VISA), ("Mastercard", aids::MASTERCARD)];

    let mut selected = false;
    for (name, aid) in &known_aids {
        if let Ok(response) = commands::select(aid).send(&mut channel) {
            if response.is_success() {
                println!("Successfully selected {} ({})", name, hex::encode_upper(aid));
                selected = true;
                break;
            }
        }
    }

    assert!(selected, "No EMV application could be selected");
}

/// Full end-to-end acquisition with the default brute-force scan
///
/// **Requires**: Visa or Mastercard EMV card inserted
#[test]
#[ignore = "requires hardware: Visa or Mastercard EMV card"]
fn test_full_acquisition() {
    let reader = CardReader::new().expect("Failed to connect to reader");
    let mut channel = reader.connect_first().expect("Failed to connect to card");

    let result = acquire(&mut channel, &ScanPolicy::default());

    println!("ATR: {}", result.atr_description());
    println!("Brand: {}", result.card_brand);
    println!("Records: {}", result.records.len());
    let summary = result.summary();
    println!("Card number: {:?}", summary.card_number);
    println!("Expiry: {:?}", summary.expiry_date);

    assert_ne!(result.card_brand, CardBrand::Unknown);
    assert_eq!(result.status, AcquisitionStatus::Success);
    assert!(summary.card_number.is_some(), "PAN should be readable");
}

/// AFL-driven scan should reach the same card number with far fewer commands
///
/// **Requires**: Visa or Mastercard EMV card inserted
#[test]
#[ignore = "requires hardware: Visa or Mastercard EMV card"]
fn test_afl_acquisition() {
    let reader = CardReader::new().expect("Failed to connect to reader");
    let mut channel = reader.connect_first().expect("Failed to connect to card");

    let policy = ScanPolicy {
        strategy: ScanStrategy::Afl,
        ..ScanPolicy::default()
    };
    let result = acquire(&mut channel, &policy);

    println!("Records: {}", result.records.len());
    assert_eq!(result.status, AcquisitionStatus::Success);
    assert!(result.summary().card_number.is_some());
}

/// Test GET DATA command for application data
///
/// **Requires**: EMV card inserted
#[test]
#[ignore = "requires hardware: EMV card"]
fn test_get_data_command() {
    let reader = CardReader::new().expect("Failed to connect to reader");
    let mut channel = reader.connect_first().expect("Failed to connect to card");

    // Select application first
    for aid in [aids::VISA, aids::MASTERCARD] {
        if let Ok(response) = commands::select(aid).send(&mut channel) {
            if response.is_success() {
                break;
            }
        }
    }

    // Try to get PIN Try Counter (tag 9F17)
    let cmd = commands::get_data(&[0x9F, 0x17]);
    if let Ok(response) = cmd.send(&mut channel) {
        if response.is_success() {
            println!("PIN Try Counter: {:?}", response.data);
            assert!(!response.data.is_empty());
        } else {
            println!("GET DATA not supported or tag not available");
        }
    }
}
