// Copyright (c) 2025 Assocompta contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Recette (income) or dépense (expense). The wire strings are the French
/// forms used everywhere: store, workbook and CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Recette,
    Depense,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Recette => "recette",
            EntryKind::Depense => "depense",
        }
    }

    /// Anything that is not exactly "recette" is a dépense.
    pub fn from_wire(s: &str) -> Self {
        if s.trim() == "recette" {
            EntryKind::Recette
        } else {
            EntryKind::Depense
        }
    }

    pub fn piece_prefix(&self) -> &'static str {
        match self {
            EntryKind::Recette => "REC",
            EntryKind::Depense => "DEP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "CB")]
    Cb,
    Especes,
    Cheque,
    Virement,
    Prelevement,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::Cb,
        PaymentMethod::Especes,
        PaymentMethod::Cheque,
        PaymentMethod::Virement,
        PaymentMethod::Prelevement,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            PaymentMethod::Cb => "CB",
            PaymentMethod::Especes => "Especes",
            PaymentMethod::Cheque => "Cheque",
            PaymentMethod::Virement => "Virement",
            PaymentMethod::Prelevement => "Prelevement",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cb => "Carte bancaire",
            PaymentMethod::Especes => "Espèces",
            PaymentMethod::Cheque => "Chèque",
            PaymentMethod::Virement => "Virement",
            PaymentMethod::Prelevement => "Prélèvement",
        }
    }

    /// Unknown codes fall back to card, the capture form's default.
    pub fn from_code(code: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|m| m.code().eq_ignore_ascii_case(code.trim()))
            .unwrap_or(PaymentMethod::Cb)
    }

    /// Resolves a display label (legacy workbook column) back to a code.
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|m| m.label() == label.trim())
            .unwrap_or(PaymentMethod::Cb)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Concert,
    Theatre,
    Projection,
    Atelier,
    Jeux,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::Concert,
        EventKind::Theatre,
        EventKind::Projection,
        EventKind::Atelier,
        EventKind::Jeux,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            EventKind::Concert => "concert",
            EventKind::Theatre => "theatre",
            EventKind::Projection => "projection",
            EventKind::Atelier => "atelier",
            EventKind::Jeux => "jeux",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Concert => "Concert",
            EventKind::Theatre => "Théâtre",
            EventKind::Projection => "Projection",
            EventKind::Atelier => "Atelier",
            EventKind::Jeux => "Journée jeux",
        }
    }

    pub fn from_code(code: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|k| k.code().eq_ignore_ascii_case(code.trim()))
            .unwrap_or(EventKind::Concert)
    }
}

/// A single financial movement. `exercice` is always recomputed from
/// `date` (see `fiscal`), never set directly by callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub payment_method: PaymentMethod,
    pub kind: EntryKind,
    pub event_id: Option<String>,
    pub piece_number: String,
    pub validated: bool,
    pub exercice: String,
    pub created_at: String,
    pub updated_at: String,
    pub attachment: Option<String>,
}

/// A recordable activity transactions may reference. Its `exercice` is set
/// explicitly at creation and is independent of the year of `date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub kind: EventKind,
    pub budget: Decimal,
    pub actual_cost: Decimal,
    pub revenue: Decimal,
    pub capacity: i64,
    pub attendance: i64,
    pub exercice: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subcategory {
    pub code: String,
    pub name: String,
    pub parent_code: String,
}

/// An accounting-plan entry. `code` is the identity key (unique within its
/// kind); `id` is only the storage key. Subcategories keep insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub code: String,
    pub name: String,
    pub kind: EntryKind,
    pub subcategories: Vec<Subcategory>,
}

/// A twelve-month accounting period. At most one is active at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercice {
    pub id: String,
    pub year: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub closed: bool,
    pub active: bool,
    pub opening_balance: Decimal,
    pub closing_balance: Decimal,
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub result: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub membership_date: NaiveDate,
    pub membership_fee: Decimal,
    pub active: bool,
    pub address: Option<String>,
}
