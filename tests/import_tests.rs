// Copyright (c) 2025 Assocompta contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use assocompta::codec::{self, Archive, IdGen};
use assocompta::import::{Decision, ImportMode, ImportSession, ImportState};
use assocompta::models::{
    Category, EntryKind, Event, EventKind, Member, PaymentMethod, Transaction,
};
use assocompta::store::Store;
use assocompta::workbook::{Sheet, Workbook};
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn sample_archive() -> Archive {
    Archive {
        transactions: vec![Transaction {
            id: "trans-1".to_string(),
            date: date("2025-12-20"),
            amount: "610.00".parse().unwrap(),
            description: "Billetterie concert".to_string(),
            category: "70".to_string(),
            subcategory: None,
            payment_method: PaymentMethod::Especes,
            kind: EntryKind::Recette,
            event_id: Some("event-1".to_string()),
            piece_number: "2025-REC001".to_string(),
            validated: true,
            exercice: "2025".to_string(),
            created_at: "2025-12-21T10:00:00Z".to_string(),
            updated_at: "2025-12-21T10:00:00Z".to_string(),
            attachment: None,
        }],
        events: vec![Event {
            id: "event-1".to_string(),
            name: "Concert de Noël".to_string(),
            date: date("2025-12-20"),
            kind: EventKind::Concert,
            budget: "500".parse().unwrap(),
            actual_cost: Decimal::ZERO,
            revenue: Decimal::ZERO,
            capacity: 120,
            attendance: 95,
            exercice: "2025".to_string(),
            description: None,
        }],
        categories: vec![Category {
            id: "cat-70".to_string(),
            code: "70".to_string(),
            name: "Ventes et prestations".to_string(),
            kind: EntryKind::Recette,
            subcategories: Vec::new(),
        }],
        members: vec![Member {
            id: "member-1".to_string(),
            first_name: "Marie".to_string(),
            last_name: "Dupont".to_string(),
            email: "marie@example.org".to_string(),
            phone: None,
            membership_date: date("2025-01-15"),
            membership_fee: "20".parse().unwrap(),
            active: true,
            address: None,
        }],
        exercice: "2025".to_string(),
        export_date: "2025-12-31".to_string(),
    }
}

fn run_to_confirmation(store: &Store, wb: Workbook, tag: &str) -> ImportSession {
    let mut session = ImportSession::new();
    session.select_file(wb).unwrap();
    session.parse(&mut IdGen::with_run_tag(tag)).unwrap();
    session.analyze(store.snapshot().unwrap()).unwrap();
    session.request_confirmation().unwrap();
    session
}

#[test]
fn merge_into_empty_store_imports_everything() {
    let store = Store::open_in_memory().unwrap();
    let wb = codec::encode(&sample_archive());
    let mut session = run_to_confirmation(&store, wb, "run1");
    let counts = session
        .apply(&store, ImportMode::Merge, Decision::Proceed)
        .unwrap();
    assert_eq!(counts.transactions, 1);
    assert_eq!(counts.events, 1);
    assert_eq!(counts.categories, 1);
    assert_eq!(counts.members, 1);
    assert_eq!(session.state(), ImportState::Done);

    // The event link survived by name through the decode.
    let txs = store.transactions().unwrap();
    let events = store.events().unwrap();
    assert_eq!(txs[0].event_id.as_deref(), Some(events[0].id.as_str()));
}

#[test]
fn merge_twice_is_idempotent() {
    let store = Store::open_in_memory().unwrap();
    let wb = codec::encode(&sample_archive());
    let mut first = run_to_confirmation(&store, wb.clone(), "run1");
    first
        .apply(&store, ImportMode::Merge, Decision::Proceed)
        .unwrap();

    let mut second = run_to_confirmation(&store, wb, "run2");
    let counts = second
        .apply(&store, ImportMode::Merge, Decision::Proceed)
        .unwrap();
    assert_eq!(counts.total(), 0);
    assert_eq!(store.transactions().unwrap().len(), 1);
    assert_eq!(store.events().unwrap().len(), 1);
    assert_eq!(store.categories().unwrap().len(), 1);
    assert_eq!(store.members().unwrap().len(), 1);
}

#[test]
fn duplicate_report_counts_matches() {
    let store = Store::open_in_memory().unwrap();
    let wb = codec::encode(&sample_archive());
    let mut first = run_to_confirmation(&store, wb.clone(), "run1");
    first
        .apply(&store, ImportMode::Merge, Decision::Proceed)
        .unwrap();

    let mut second = ImportSession::new();
    second.select_file(wb).unwrap();
    second.parse(&mut IdGen::with_run_tag("run2")).unwrap();
    let report = *second.analyze(store.snapshot().unwrap()).unwrap();
    assert_eq!(report.decoded.transactions, 1);
    assert_eq!(report.duplicates.transactions, 1);
    assert_eq!(report.duplicates.events, 1);
    assert_eq!(report.duplicates.categories, 1);
    assert_eq!(report.duplicates.members, 1);
}

#[test]
fn replace_clears_existing_records_first() {
    let store = Store::open_in_memory().unwrap();
    store
        .add_event(&Event {
            id: "old-event".to_string(),
            name: "Vide-grenier".to_string(),
            date: date("2024-05-01"),
            kind: EventKind::Jeux,
            budget: Decimal::ZERO,
            actual_cost: Decimal::ZERO,
            revenue: Decimal::ZERO,
            capacity: 0,
            attendance: 0,
            exercice: "2024".to_string(),
            description: None,
        })
        .unwrap();

    let wb = codec::encode(&sample_archive());
    let mut session = run_to_confirmation(&store, wb, "run1");
    let counts = session
        .apply(&store, ImportMode::Replace, Decision::Proceed)
        .unwrap();
    assert_eq!(counts.events, 1);

    let events = store.events().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "Concert de Noël");
}

#[test]
fn replace_mode_inserts_even_what_merge_would_skip() {
    let store = Store::open_in_memory().unwrap();
    let wb = codec::encode(&sample_archive());
    let mut first = run_to_confirmation(&store, wb.clone(), "run1");
    first
        .apply(&store, ImportMode::Merge, Decision::Proceed)
        .unwrap();

    let mut second = run_to_confirmation(&store, wb, "run2");
    let counts = second
        .apply(&store, ImportMode::Replace, Decision::Proceed)
        .unwrap();
    assert_eq!(counts.transactions, 1);
    assert_eq!(store.transactions().unwrap().len(), 1);
}

#[test]
fn abort_leaves_the_store_untouched() {
    let store = Store::open_in_memory().unwrap();
    let wb = codec::encode(&sample_archive());
    let mut session = run_to_confirmation(&store, wb, "run1");
    let counts = session
        .apply(&store, ImportMode::Replace, Decision::Abort)
        .unwrap();
    assert_eq!(counts.total(), 0);
    assert_eq!(session.state(), ImportState::Done);
    assert!(store.transactions().unwrap().is_empty());
    assert!(store.events().unwrap().is_empty());
}

#[test]
fn parse_failure_moves_session_to_failed() {
    let mut wb = Workbook::new();
    wb.insert("Événements", Sheet::with_headers(&["Nom", "Date"]));
    // No Transactions sheet.
    let mut session = ImportSession::new();
    session.select_file(wb).unwrap();
    assert!(session.parse(&mut IdGen::with_run_tag("t")).is_err());
    assert_eq!(session.state(), ImportState::Failed);
    // A failed session cannot continue.
    let store = Store::open_in_memory().unwrap();
    assert!(session.analyze(store.snapshot().unwrap()).is_err());
}

#[test]
fn steps_out_of_order_are_rejected() {
    let store = Store::open_in_memory().unwrap();
    let mut session = ImportSession::new();
    assert!(session.parse(&mut IdGen::with_run_tag("t")).is_err());
    assert!(session.analyze(store.snapshot().unwrap()).is_err());
    assert!(session
        .apply(&store, ImportMode::Merge, Decision::Proceed)
        .is_err());
    assert_eq!(session.state(), ImportState::Idle);

    let wb = codec::encode(&sample_archive());
    session.select_file(wb).unwrap();
    // Skipping parse and analysis is refused too.
    assert!(session.request_confirmation().is_err());
    assert!(session
        .apply(&store, ImportMode::Merge, Decision::Proceed)
        .is_err());
}

#[test]
fn dedup_runs_against_the_snapshot_not_the_file() {
    // Two identical member rows in one file both land: duplicate analysis
    // compares against the store as it was before the import, not against
    // other rows of the same file.
    let store = Store::open_in_memory().unwrap();
    let mut archive = sample_archive();
    let mut twin = archive.members[0].clone();
    twin.id = "member-2".to_string();
    archive.members.push(twin);

    let wb = codec::encode(&archive);
    let mut session = run_to_confirmation(&store, wb, "run1");
    let counts = session
        .apply(&store, ImportMode::Merge, Decision::Proceed)
        .unwrap();
    assert_eq!(counts.members, 2);
    assert_eq!(store.members().unwrap().len(), 2);
}
