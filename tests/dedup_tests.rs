// Copyright (c) 2025 Assocompta contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use assocompta::dedup::{
    is_duplicate_category, is_duplicate_event, is_duplicate_member, is_duplicate_transaction,
};
use assocompta::models::{
    Category, EntryKind, Event, EventKind, Member, PaymentMethod, Transaction,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn tx(desc: &str, amount: &str, category: &str) -> Transaction {
    Transaction {
        id: format!("t-{}", desc),
        date: date("2025-03-10"),
        amount: amount.parse().unwrap(),
        description: desc.to_string(),
        category: category.to_string(),
        subcategory: None,
        payment_method: PaymentMethod::Cb,
        kind: EntryKind::Depense,
        event_id: None,
        piece_number: "2025-DEP001".to_string(),
        validated: false,
        exercice: "2025".to_string(),
        created_at: "2025-03-10T00:00:00Z".to_string(),
        updated_at: "2025-03-10T00:00:00Z".to_string(),
        attachment: None,
    }
}

fn event(name: &str) -> Event {
    Event {
        id: format!("e-{}", name),
        name: name.to_string(),
        date: date("2025-06-01"),
        kind: EventKind::Atelier,
        budget: Decimal::ZERO,
        actual_cost: Decimal::ZERO,
        revenue: Decimal::ZERO,
        capacity: 0,
        attendance: 0,
        exercice: "2025".to_string(),
        description: None,
    }
}

fn member(first: &str, last: &str, email: &str) -> Member {
    Member {
        id: format!("m-{}", email),
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: email.to_string(),
        phone: None,
        membership_date: date("2025-01-01"),
        membership_fee: Decimal::ZERO,
        active: true,
        address: None,
    }
}

#[test]
fn transaction_key_is_date_amount_description_category_kind() {
    let existing = vec![tx("Achat matériel", "45.00", "60")];
    assert!(is_duplicate_transaction(
        &tx("Achat matériel", "45.00", "60"),
        &existing
    ));
    assert!(!is_duplicate_transaction(
        &tx("Achat matériel", "46.00", "60"),
        &existing
    ));
    assert!(!is_duplicate_transaction(
        &tx("Achat matériel", "45.00", "61"),
        &existing
    ));
    assert!(!is_duplicate_transaction(
        &tx("Autre achat", "45.00", "60"),
        &existing
    ));
}

#[test]
fn payment_method_is_not_part_of_the_transaction_key() {
    let existing = vec![tx("Achat matériel", "45.00", "60")];
    let mut candidate = tx("Achat matériel", "45.00", "60");
    candidate.payment_method = PaymentMethod::Cheque;
    candidate.validated = true;
    assert!(is_duplicate_transaction(&candidate, &existing));
}

#[test]
fn event_key_is_name_trimmed_case_insensitive() {
    let existing = vec![event("Concert de Noël")];
    assert!(is_duplicate_event(&event("  concert de noël "), &existing));
    let mut different_date = event("Concert de Noël");
    different_date.date = date("2025-12-24");
    assert!(is_duplicate_event(&different_date, &existing));
    assert!(!is_duplicate_event(&event("Concert d'été"), &existing));
}

#[test]
fn category_key_is_the_code() {
    let existing = vec![Category {
        id: "cat-70".to_string(),
        code: "70".to_string(),
        name: "Ventes".to_string(),
        kind: EntryKind::Recette,
        subcategories: Vec::new(),
    }];
    let mut candidate = existing[0].clone();
    candidate.id = "other-id".to_string();
    candidate.name = "Renamed".to_string();
    assert!(is_duplicate_category(&candidate, &existing));
    candidate.code = "74".to_string();
    assert!(!is_duplicate_category(&candidate, &existing));
}

#[test]
fn member_matches_on_email_or_full_name() {
    let existing = vec![member("Marie", "Dupont", "marie@example.org")];
    // Same email, different name.
    assert!(is_duplicate_member(
        &member("M.", "D.", "marie@example.org"),
        &existing
    ));
    // Same name, different email.
    assert!(is_duplicate_member(
        &member("Marie", "Dupont", "marie.dupont@example.org"),
        &existing
    ));
    assert!(!is_duplicate_member(
        &member("Paul", "Martin", "paul@example.org"),
        &existing
    ));
}
