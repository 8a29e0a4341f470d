// Copyright (c) 2025 Assocompta contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use assocompta::models::{
    EntryKind, Event, EventKind, Exercice, PaymentMethod, Transaction,
};
use assocompta::store::Store;
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn exercice(year: &str) -> Exercice {
    let y: i32 = year.parse().unwrap();
    Exercice {
        id: format!("exercice-{}", year),
        year: year.to_string(),
        start_date: NaiveDate::from_ymd_opt(y, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(y, 12, 31).unwrap(),
        closed: false,
        active: false,
        opening_balance: "100".parse().unwrap(),
        closing_balance: Decimal::ZERO,
        total_revenue: Decimal::ZERO,
        total_expenses: Decimal::ZERO,
        result: Decimal::ZERO,
    }
}

fn tx(id: &str, date_str: &str, amount: &str, kind: EntryKind) -> Transaction {
    let d = date(date_str);
    Transaction {
        id: id.to_string(),
        date: d,
        amount: amount.parse().unwrap(),
        description: format!("mouvement {}", id),
        category: "70".to_string(),
        subcategory: None,
        payment_method: PaymentMethod::Cb,
        kind,
        event_id: None,
        piece_number: format!("{}-X{}", &date_str[..4], id),
        validated: false,
        exercice: date_str[..4].to_string(),
        created_at: "2025-01-01T00:00:00Z".to_string(),
        updated_at: "2025-01-01T00:00:00Z".to_string(),
        attachment: None,
    }
}

fn event(id: &str, name: &str, exercice: &str) -> Event {
    Event {
        id: id.to_string(),
        name: name.to_string(),
        date: date(&format!("{}-06-01", exercice)),
        kind: EventKind::Projection,
        budget: Decimal::ZERO,
        actual_cost: Decimal::ZERO,
        revenue: Decimal::ZERO,
        capacity: 0,
        attendance: 0,
        exercice: exercice.to_string(),
        description: None,
    }
}

#[test]
fn activation_is_exclusive() {
    let store = Store::open_in_memory().unwrap();
    store.add_exercice(&exercice("2024")).unwrap();
    store.add_exercice(&exercice("2025")).unwrap();

    store.activate_exercice("2024").unwrap();
    store.activate_exercice("2025").unwrap();

    let active = store.active_exercice().unwrap().unwrap();
    assert_eq!(active.year, "2025");
    let flags: Vec<bool> = store
        .exercices()
        .unwrap()
        .iter()
        .map(|e| e.active)
        .collect();
    assert_eq!(flags.iter().filter(|a| **a).count(), 1);
}

#[test]
fn closed_exercice_cannot_be_activated() {
    let store = Store::open_in_memory().unwrap();
    store.add_exercice(&exercice("2024")).unwrap();
    store.close_exercice("2024").unwrap();
    assert!(store.activate_exercice("2024").is_err());
}

#[test]
fn close_freezes_totals_and_closing_balance() {
    let store = Store::open_in_memory().unwrap();
    store.add_exercice(&exercice("2025")).unwrap();
    store
        .add_transaction(&tx("t1", "2025-02-01", "300", EntryKind::Recette))
        .unwrap();
    store
        .add_transaction(&tx("t2", "2025-03-01", "120.50", EntryKind::Depense))
        .unwrap();
    // A movement in another year stays out of the totals.
    store
        .add_transaction(&tx("t3", "2024-03-01", "999", EntryKind::Depense))
        .unwrap();

    let closed = store.close_exercice("2025").unwrap();
    assert_eq!(closed.total_revenue, "300".parse::<Decimal>().unwrap());
    assert_eq!(closed.total_expenses, "120.50".parse::<Decimal>().unwrap());
    assert_eq!(closed.result, "179.50".parse::<Decimal>().unwrap());
    // opening 100 + result 179.50
    assert_eq!(closed.closing_balance, "279.50".parse::<Decimal>().unwrap());
    assert!(closed.closed);
    assert!(!closed.active);

    assert!(store.close_exercice("2025").is_err());
    store.reopen_exercice("2025").unwrap();
    assert!(!store.exercice_by_year("2025").unwrap().unwrap().closed);
}

#[test]
fn reopen_requires_a_closed_exercice() {
    let store = Store::open_in_memory().unwrap();
    store.add_exercice(&exercice("2025")).unwrap();
    assert!(store.reopen_exercice("2025").is_err());
}

#[test]
fn exercice_with_transactions_cannot_be_deleted() {
    let store = Store::open_in_memory().unwrap();
    store.add_exercice(&exercice("2025")).unwrap();
    store
        .add_transaction(&tx("t1", "2025-02-01", "10", EntryKind::Recette))
        .unwrap();
    assert!(store.delete_exercice("2025").is_err());

    store.delete_transaction("t1").unwrap();
    store.delete_exercice("2025").unwrap();
    assert!(store.exercice_by_year("2025").unwrap().is_none());
}

#[test]
fn referenced_event_cannot_be_deleted() {
    let store = Store::open_in_memory().unwrap();
    store.add_event(&event("e1", "Loto", "2025")).unwrap();
    let mut t = tx("t1", "2025-02-01", "10", EntryKind::Recette);
    t.event_id = Some("e1".to_string());
    store.add_transaction(&t).unwrap();

    assert!(store.delete_event("e1").is_err());
    store.delete_transaction("t1").unwrap();
    store.delete_event("e1").unwrap();
    assert!(store.events().unwrap().is_empty());
}

#[test]
fn piece_numbers_count_per_kind_and_exercice() {
    let store = Store::open_in_memory().unwrap();
    assert_eq!(
        store.next_piece_number(EntryKind::Recette, "2025").unwrap(),
        "2025-REC001"
    );
    store
        .add_transaction(&tx("t1", "2025-02-01", "10", EntryKind::Recette))
        .unwrap();
    store
        .add_transaction(&tx("t2", "2025-02-02", "10", EntryKind::Depense))
        .unwrap();
    assert_eq!(
        store.next_piece_number(EntryKind::Recette, "2025").unwrap(),
        "2025-REC002"
    );
    assert_eq!(
        store.next_piece_number(EntryKind::Depense, "2025").unwrap(),
        "2025-DEP002"
    );
    assert_eq!(
        store.next_piece_number(EntryKind::Recette, "2024").unwrap(),
        "2024-REC001"
    );
}

#[test]
fn by_exercice_queries_filter() {
    let store = Store::open_in_memory().unwrap();
    store
        .add_transaction(&tx("t1", "2025-02-01", "10", EntryKind::Recette))
        .unwrap();
    store
        .add_transaction(&tx("t2", "2024-02-01", "10", EntryKind::Recette))
        .unwrap();
    store.add_event(&event("e1", "Loto", "2025")).unwrap();
    store.add_event(&event("e2", "Kermesse", "2024")).unwrap();

    assert_eq!(store.transactions_by_exercice("2025").unwrap().len(), 1);
    assert_eq!(store.events_by_exercice("2024").unwrap().len(), 1);
    assert_eq!(
        store.events_by_exercice("2024").unwrap()[0].name,
        "Kermesse"
    );
}

#[test]
fn clear_all_spares_exercices() {
    let store = Store::open_in_memory().unwrap();
    store.add_exercice(&exercice("2025")).unwrap();
    store
        .add_transaction(&tx("t1", "2025-02-01", "10", EntryKind::Recette))
        .unwrap();
    store.add_event(&event("e1", "Loto", "2025")).unwrap();

    store.clear_all().unwrap();
    assert!(store.transactions().unwrap().is_empty());
    assert!(store.events().unwrap().is_empty());
    assert_eq!(store.exercices().unwrap().len(), 1);
}

#[test]
fn transaction_round_trips_through_sqlite() {
    let store = Store::open_in_memory().unwrap();
    let mut t = tx("t1", "2025-02-01", "12.34", EntryKind::Depense);
    t.subcategory = Some("60-2".to_string());
    t.payment_method = PaymentMethod::Virement;
    t.attachment = Some("facture.pdf".to_string());
    t.validated = true;
    store.add_transaction(&t).unwrap();

    let loaded = store.transaction("t1").unwrap().unwrap();
    assert_eq!(loaded.date, t.date);
    assert_eq!(loaded.amount, t.amount);
    assert_eq!(loaded.subcategory, t.subcategory);
    assert_eq!(loaded.payment_method, PaymentMethod::Virement);
    assert_eq!(loaded.kind, EntryKind::Depense);
    assert!(loaded.validated);
    assert_eq!(loaded.attachment.as_deref(), Some("facture.pdf"));
}
