// Copyright (c) 2025 Assocompta contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, NaiveDate};

use crate::models::{Event, Transaction};

/// The fiscal year owning a date: its 4-digit calendar year.
pub fn resolve_fiscal_year(date: NaiveDate) -> String {
    date.year().to_string()
}

/// Events that belong to the given exercice, in input order.
pub fn filter_by_exercice<'a>(events: &'a [Event], exercice: &str) -> Vec<&'a Event> {
    events.iter().filter(|e| e.exercice == exercice).collect()
}

/// Sets a transaction's date, recomputes its exercice and drops the event
/// link when the linked event no longer belongs to the new exercice.
///
/// Every date change goes through here: `exercice` is never edited on its
/// own.
pub fn apply_date(tx: &mut Transaction, date: NaiveDate, events: &[Event]) {
    tx.date = date;
    tx.exercice = resolve_fiscal_year(date);
    if let Some(event_id) = &tx.event_id {
        let still_valid = events
            .iter()
            .any(|e| &e.id == event_id && e.exercice == tx.exercice);
        if !still_valid {
            tx.event_id = None;
        }
    }
}
