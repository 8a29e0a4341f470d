// Copyright (c) 2025 Assocompta contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Bidirectional mapping between the normalized store and the flat
//! multi-sheet workbook used for backup and exchange.
//!
//! The workbook has no foreign keys: a transaction references its event by
//! NAME, and categories are denormalized into one row per subcategory.
//! Decoding therefore runs in two passes — events first, building a
//! name→id map, then transactions resolved against that map. No id found
//! in a file is ever reused; every imported record gets a fresh synthetic
//! id from the caller-supplied [`IdGen`].

use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;

use crate::fiscal::resolve_fiscal_year;
use crate::models::{
    Category, EntryKind, Event, EventKind, Member, PaymentMethod, Subcategory, Transaction,
};
use crate::utils::{now_rfc3339, today};
use crate::workbook::{bool_cell, parse_bool_cell, parse_date_cell, RowView, Sheet, Workbook};

pub const SHEET_TRANSACTIONS: &str = "Transactions";
pub const SHEET_EVENTS: &str = "Événements";
pub const SHEET_CATEGORIES: &str = "Catégories";
pub const SHEET_MEMBERS: &str = "Adhérents";
pub const SHEET_SUMMARY: &str = "Résumé";

/// Everything a workbook carries: the four entity sets plus the document
/// metadata kept in the Résumé sheet.
#[derive(Debug, Clone, Default)]
pub struct Archive {
    pub transactions: Vec<Transaction>,
    pub events: Vec<Event>,
    pub categories: Vec<Category>,
    pub members: Vec<Member>,
    pub exercice: String,
    pub export_date: String,
}

/// Synthetic-id source injected into [`decode`]. A run tag plus a counter
/// keeps decoding deterministic under test while two real imports of the
/// same file still yield distinct ids.
#[derive(Debug)]
pub struct IdGen {
    run: String,
    next: usize,
}

impl IdGen {
    pub fn from_clock() -> Self {
        IdGen {
            run: chrono::Utc::now().timestamp_millis().to_string(),
            next: 0,
        }
    }

    pub fn with_run_tag(tag: &str) -> Self {
        IdGen {
            run: tag.to_string(),
            next: 0,
        }
    }

    pub fn next_id(&mut self, prefix: &str) -> String {
        let id = format!("{}-{}-{}", prefix, self.run, self.next);
        self.next += 1;
        id
    }
}

/// Document-structure failures. Anything below this level (unmatched event
/// name, unknown payment label, bad number) degrades per row instead.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("required sheet '{0}' is missing from the workbook")]
    MissingSheet(&'static str),
}

pub fn encode(archive: &Archive) -> Workbook {
    let mut wb = Workbook::new();

    // Lookups first, so every row resolves its references in O(1).
    let event_names: HashMap<&str, &str> = archive
        .events
        .iter()
        .map(|e| (e.id.as_str(), e.name.as_str()))
        .collect();
    let categories: HashMap<&str, &Category> = archive
        .categories
        .iter()
        .map(|c| (c.code.as_str(), c))
        .collect();

    let mut transactions = Sheet::with_headers(&[
        "Date",
        "N° Pièce",
        "Description",
        "Catégorie Code",
        "Catégorie Nom",
        "Sous-catégorie Code",
        "Sous-catégorie Nom",
        "Type",
        "Montant",
        "Mode Paiement Code",
        "Mode Paiement Nom",
        "Événement Nom",
        "Validé",
        "Exercice",
        "Créé le",
        "Modifié le",
        "Justificatif",
    ]);
    for t in &archive.transactions {
        let category = categories.get(t.category.as_str());
        let category_name = category.map(|c| c.name.as_str()).unwrap_or_default();
        let subcategory_code = t.subcategory.as_deref().unwrap_or_default();
        let subcategory_name = match (&t.subcategory, category) {
            (Some(code), Some(cat)) => cat
                .subcategories
                .iter()
                .find(|s| &s.code == code)
                .map(|s| s.name.as_str())
                .unwrap_or_default(),
            _ => "",
        };
        // The event is exported by name only; ids do not survive reimport.
        let event_name = t
            .event_id
            .as_deref()
            .and_then(|id| event_names.get(id).copied())
            .unwrap_or_default();
        transactions.push_row(vec![
            t.date.to_string(),
            t.piece_number.clone(),
            t.description.clone(),
            t.category.clone(),
            category_name.to_string(),
            subcategory_code.to_string(),
            subcategory_name.to_string(),
            t.kind.as_str().to_string(),
            t.amount.to_string(),
            t.payment_method.code().to_string(),
            t.payment_method.label().to_string(),
            event_name.to_string(),
            bool_cell(t.validated),
            t.exercice.clone(),
            t.created_at.clone(),
            t.updated_at.clone(),
            t.attachment.clone().unwrap_or_default(),
        ]);
    }
    wb.insert(SHEET_TRANSACTIONS, transactions);

    let mut events = Sheet::with_headers(&[
        "Nom",
        "Date",
        "Type",
        "Budget",
        "Coût réel",
        "Recettes",
        "Capacité",
        "Fréquentation",
        "Exercice",
        "Description",
    ]);
    for e in &archive.events {
        events.push_row(vec![
            e.name.clone(),
            e.date.to_string(),
            e.kind.code().to_string(),
            e.budget.to_string(),
            e.actual_cost.to_string(),
            e.revenue.to_string(),
            e.capacity.to_string(),
            e.attendance.to_string(),
            e.exercice.clone(),
            e.description.clone().unwrap_or_default(),
        ]);
    }
    wb.insert(SHEET_EVENTS, events);

    // One header row per category, one extra row per subcategory with the
    // parent code repeated: the tree flattened into a table.
    let mut cats = Sheet::with_headers(&[
        "Code",
        "Nom",
        "Type",
        "Sous-catégorie",
        "Code sous-catégorie",
        "Nom sous-catégorie",
    ]);
    for c in &archive.categories {
        cats.push_row(vec![
            c.code.clone(),
            c.name.clone(),
            c.kind.as_str().to_string(),
            String::new(),
            String::new(),
            String::new(),
        ]);
        for sub in &c.subcategories {
            cats.push_row(vec![
                c.code.clone(),
                c.name.clone(),
                c.kind.as_str().to_string(),
                "Oui".to_string(),
                sub.code.clone(),
                sub.name.clone(),
            ]);
        }
    }
    wb.insert(SHEET_CATEGORIES, cats);

    let mut members = Sheet::with_headers(&[
        "Prénom",
        "Nom",
        "Email",
        "Téléphone",
        "Date adhésion",
        "Cotisation",
        "Actif",
        "Adresse",
    ]);
    for m in &archive.members {
        members.push_row(vec![
            m.first_name.clone(),
            m.last_name.clone(),
            m.email.clone(),
            m.phone.clone().unwrap_or_default(),
            m.membership_date.to_string(),
            m.membership_fee.to_string(),
            bool_cell(m.active),
            m.address.clone().unwrap_or_default(),
        ]);
    }
    wb.insert(SHEET_MEMBERS, members);

    let total_recettes: Decimal = archive
        .transactions
        .iter()
        .filter(|t| t.kind == EntryKind::Recette)
        .map(|t| t.amount)
        .sum();
    let total_depenses: Decimal = archive
        .transactions
        .iter()
        .filter(|t| t.kind == EntryKind::Depense)
        .map(|t| t.amount)
        .sum();
    let active_members = archive.members.iter().filter(|m| m.active).count();
    let mut summary = Sheet::with_headers(&["Indicateur", "Valeur"]);
    let indicators: [(&str, String); 8] = [
        ("Exercice", archive.exercice.clone()),
        ("Date export", archive.export_date.clone()),
        (
            "Nombre transactions",
            archive.transactions.len().to_string(),
        ),
        ("Nombre événements", archive.events.len().to_string()),
        ("Nombre adhérents actifs", active_members.to_string()),
        ("Total recettes", total_recettes.to_string()),
        ("Total dépenses", total_depenses.to_string()),
        ("Résultat", (total_recettes - total_depenses).to_string()),
    ];
    for (name, value) in indicators {
        summary.push_row(vec![name.to_string(), value]);
    }
    wb.insert(SHEET_SUMMARY, summary);

    wb
}

pub fn decode(wb: &Workbook, ids: &mut IdGen) -> Result<Archive, DecodeError> {
    let events_sheet = wb
        .sheet(SHEET_EVENTS)
        .ok_or(DecodeError::MissingSheet(SHEET_EVENTS))?;
    let transactions_sheet = wb
        .sheet(SHEET_TRANSACTIONS)
        .ok_or(DecodeError::MissingSheet(SHEET_TRANSACTIONS))?;

    // Pass 1: events. Rows without a name are skipped, every kept row gets
    // a fresh id, and the name→id map drives transaction resolution below.
    let mut events = Vec::new();
    let mut event_ids: HashMap<String, String> = HashMap::new();
    for row in events_sheet.rows() {
        let Some(name) = row.get("Nom") else { continue };
        let date = row
            .get("Date")
            .and_then(parse_date_cell)
            .unwrap_or_else(today);
        let exercice = row
            .get("Exercice")
            .map(str::to_string)
            .unwrap_or_else(|| resolve_fiscal_year(date));
        let event = Event {
            id: ids.next_id("imported-event"),
            name: name.to_string(),
            date,
            kind: EventKind::from_code(row.get("Type").unwrap_or_default()),
            budget: decimal_cell(&row, "Budget"),
            actual_cost: decimal_cell(&row, "Coût réel"),
            revenue: decimal_cell(&row, "Recettes"),
            capacity: int_cell(&row, "Capacité"),
            attendance: int_cell(&row, "Fréquentation"),
            exercice,
            description: row.get("Description").map(str::to_string),
        };
        event_ids.insert(event.name.trim().to_string(), event.id.clone());
        events.push(event);
    }

    // Pass 2: transactions, resolved against the map by exact trimmed
    // name. A miss means no link, never a dropped row.
    let now = now_rfc3339();
    let mut transactions = Vec::new();
    for row in transactions_sheet.rows() {
        let date = row
            .get("Date")
            .and_then(parse_date_cell)
            .unwrap_or_else(today);
        let event_id = row
            .first(&["Événement Nom", "Nom Événement"])
            .and_then(|name| event_ids.get(name.trim()))
            .cloned();
        let subcategory = row
            .first(&["Sous-catégorie Code", "Code sous-catégorie"])
            .filter(|v| *v != "Sélectionner une sous-catégorie")
            .map(str::to_string);
        let payment_method = match row.get("Mode Paiement Code") {
            Some(code) => PaymentMethod::from_code(code),
            None => PaymentMethod::from_label(row.get("Mode de paiement").unwrap_or_default()),
        };
        transactions.push(Transaction {
            id: ids.next_id("imported-trans"),
            date,
            amount: decimal_cell(&row, "Montant"),
            description: row.get("Description").unwrap_or_default().to_string(),
            category: row
                .first(&["Catégorie Code", "Catégorie"])
                .unwrap_or_default()
                .to_string(),
            subcategory,
            payment_method,
            kind: EntryKind::from_wire(row.get("Type").unwrap_or_default()),
            event_id,
            piece_number: row.get("N° Pièce").unwrap_or_default().to_string(),
            validated: parse_bool_cell(row.get("Validé")),
            exercice: resolve_fiscal_year(date),
            created_at: now.clone(),
            updated_at: now.clone(),
            attachment: row.get("Justificatif").map(str::to_string),
        });
    }

    // Rows sharing a code fold into one category, subcategories appended
    // in file order.
    let mut categories: Vec<Category> = Vec::new();
    let mut category_index: HashMap<String, usize> = HashMap::new();
    if let Some(sheet) = wb.sheet(SHEET_CATEGORIES) {
        for row in sheet.rows() {
            let Some(code) = row.get("Code") else { continue };
            let idx = match category_index.get(code) {
                Some(idx) => *idx,
                None => {
                    categories.push(Category {
                        id: ids.next_id("imported-cat"),
                        code: code.to_string(),
                        name: row.get("Nom").unwrap_or_default().to_string(),
                        kind: EntryKind::from_wire(row.get("Type").unwrap_or_default()),
                        subcategories: Vec::new(),
                    });
                    category_index.insert(code.to_string(), categories.len() - 1);
                    categories.len() - 1
                }
            };
            if parse_bool_cell(row.get("Sous-catégorie")) {
                if let Some(sub_code) = row.get("Code sous-catégorie") {
                    categories[idx].subcategories.push(Subcategory {
                        code: sub_code.to_string(),
                        name: row.get("Nom sous-catégorie").unwrap_or_default().to_string(),
                        parent_code: code.to_string(),
                    });
                }
            }
        }
    }

    let mut members = Vec::new();
    if let Some(sheet) = wb.sheet(SHEET_MEMBERS) {
        for row in sheet.rows() {
            members.push(Member {
                id: ids.next_id("imported-member"),
                first_name: row.get("Prénom").unwrap_or_default().to_string(),
                last_name: row.get("Nom").unwrap_or_default().to_string(),
                email: row.get("Email").unwrap_or_default().to_string(),
                phone: row.get("Téléphone").map(str::to_string),
                membership_date: row
                    .get("Date adhésion")
                    .and_then(parse_date_cell)
                    .unwrap_or_else(today),
                membership_fee: decimal_cell(&row, "Cotisation"),
                active: parse_bool_cell(row.get("Actif")),
                address: row.get("Adresse").map(str::to_string),
            });
        }
    }

    // The summary only carries display metadata; its absence is harmless.
    let mut exercice = String::new();
    let mut export_date = String::new();
    if let Some(sheet) = wb.sheet(SHEET_SUMMARY) {
        for row in sheet.rows() {
            match row.get("Indicateur") {
                Some("Exercice") => {
                    exercice = row.get("Valeur").unwrap_or_default().to_string();
                }
                Some("Date export") => {
                    export_date = row.get("Valeur").unwrap_or_default().to_string();
                }
                _ => {}
            }
        }
    }

    Ok(Archive {
        transactions,
        events,
        categories,
        members,
        exercice,
        export_date,
    })
}

fn decimal_cell(row: &RowView<'_>, column: &str) -> Decimal {
    row.get(column)
        .and_then(|v| v.parse::<Decimal>().ok())
        .unwrap_or_default()
}

fn int_cell(row: &RowView<'_>, column: &str) -> i64 {
    row.get(column)
        .and_then(|v| v.parse::<f64>().ok())
        .map(|v| v.trunc() as i64)
        .unwrap_or_default()
}
