// Copyright (c) 2025 Assocompta contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Heuristic duplicate checks used during import to avoid re-inserting
//! records that are already present. The keys are deliberately coarse:
//! skipping a legitimately distinct record is the accepted cost of not
//! re-importing noise.

use crate::models::{Category, Event, Member, Transaction};

/// Date, amount, description, category and kind. Payment method,
/// subcategory, event link and validation state are not part of the key.
pub fn is_duplicate_transaction(candidate: &Transaction, existing: &[Transaction]) -> bool {
    existing.iter().any(|t| {
        t.date == candidate.date
            && t.amount == candidate.amount
            && t.description == candidate.description
            && t.category == candidate.category
            && t.kind == candidate.kind
    })
}

/// Name alone, trimmed and case-insensitive. Two same-named events are the
/// same event for import purposes regardless of date or type.
pub fn is_duplicate_event(candidate: &Event, existing: &[Event]) -> bool {
    let name = candidate.name.trim().to_lowercase();
    existing.iter().any(|e| e.name.trim().to_lowercase() == name)
}

/// Code equality only; the storage id is not an identity.
pub fn is_duplicate_category(candidate: &Category, existing: &[Category]) -> bool {
    existing.iter().any(|c| c.code == candidate.code)
}

/// Email match alone suffices; failing that, the first+last name pair.
pub fn is_duplicate_member(candidate: &Member, existing: &[Member]) -> bool {
    existing.iter().any(|m| {
        m.email.trim() == candidate.email.trim()
            || (m.first_name == candidate.first_name && m.last_name == candidate.last_name)
    })
}
