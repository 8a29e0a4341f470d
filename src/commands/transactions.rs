// Copyright (c) 2025 Assocompta contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{bail, Result};

use crate::fiscal::{self, resolve_fiscal_year};
use crate::models::{EntryKind, PaymentMethod, Transaction};
use crate::store::Store;
use crate::utils::{maybe_print_json, new_id, now_rfc3339, parse_date, parse_decimal, pretty_table};

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("edit", sub)) => edit(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("validate", sub)) => validate(store, sub)?,
        Some(("rm", sub)) => rm(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let description = sub.get_one::<String>("description").unwrap().clone();
    let category = sub.get_one::<String>("category").unwrap().clone();
    let kind = EntryKind::from_wire(sub.get_one::<String>("kind").unwrap());
    let payment_method = sub
        .get_one::<String>("payment")
        .map(|s| PaymentMethod::from_code(s))
        .unwrap_or(PaymentMethod::Cb);

    let Some(cat) = store.category_by_code(&category)? else {
        bail!("Unknown category code '{}'", category);
    };
    if cat.kind != kind {
        bail!(
            "Category '{}' is a {} category, not {}",
            category,
            cat.kind.as_str(),
            kind.as_str()
        );
    }
    let subcategory = match sub.get_one::<String>("subcategory") {
        Some(code) => {
            if !cat.subcategories.iter().any(|s| &s.code == code) {
                bail!("Category '{}' has no subcategory '{}'", category, code);
            }
            Some(code.clone())
        }
        None => None,
    };

    // The owning exercice follows the date, and an event link must stay
    // inside that exercice.
    let exercice = resolve_fiscal_year(date);
    let event_id = match sub.get_one::<String>("event") {
        Some(name) => {
            let events = store.events_by_exercice(&exercice)?;
            match events.iter().find(|e| e.name.trim() == name.trim()) {
                Some(event) => Some(event.id.clone()),
                None => bail!("No event named '{}' in exercice {}", name, exercice),
            }
        }
        None => None,
    };

    let now = now_rfc3339();
    let tx = Transaction {
        id: new_id("trans"),
        date,
        amount,
        description,
        category,
        subcategory,
        payment_method,
        kind,
        event_id,
        piece_number: store.next_piece_number(kind, &exercice)?,
        validated: false,
        exercice,
        created_at: now.clone(),
        updated_at: now,
        attachment: sub.get_one::<String>("attachment").cloned(),
    };
    store.add_transaction(&tx)?;
    println!(
        "Recorded {} {} on {} ({})",
        tx.kind.as_str(),
        tx.amount,
        tx.date,
        tx.piece_number
    );
    Ok(())
}

fn edit(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap();
    let Some(mut tx) = store.transaction(id)? else {
        bail!("Transaction '{}' not found", id);
    };
    let old_exercice = tx.exercice.clone();
    let had_event = tx.event_id.is_some();

    if let Some(raw) = sub.get_one::<String>("date") {
        let date = parse_date(raw)?;
        fiscal::apply_date(&mut tx, date, &store.events()?);
    }
    if let Some(raw) = sub.get_one::<String>("amount") {
        tx.amount = parse_decimal(raw)?;
    }
    if let Some(description) = sub.get_one::<String>("description") {
        tx.description = description.clone();
    }
    if let Some(code) = sub.get_one::<String>("category") {
        if store.category_by_code(code)?.is_none() {
            bail!("Unknown category code '{}'", code);
        }
        tx.category = code.clone();
    }
    if let Some(code) = sub.get_one::<String>("subcategory") {
        tx.subcategory = Some(code.clone());
    }
    if let Some(code) = sub.get_one::<String>("payment") {
        tx.payment_method = PaymentMethod::from_code(code);
    }
    if sub.get_flag("no-event") {
        tx.event_id = None;
    } else if let Some(name) = sub.get_one::<String>("event") {
        let events = store.events_by_exercice(&tx.exercice)?;
        match events.iter().find(|e| e.name.trim() == name.trim()) {
            Some(event) => tx.event_id = Some(event.id.clone()),
            None => bail!("No event named '{}' in exercice {}", name, tx.exercice),
        }
    }

    if tx.exercice != old_exercice {
        tx.piece_number = store.next_piece_number(tx.kind, &tx.exercice)?;
        println!(
            "Moved to exercice {} (new piece {})",
            tx.exercice, tx.piece_number
        );
        if had_event && tx.event_id.is_none() {
            println!("Event link removed: the event belongs to exercice {}", old_exercice);
        }
    }
    tx.updated_at = now_rfc3339();
    store.put_transaction(&tx)?;
    println!("Updated transaction {}", tx.id);
    Ok(())
}

fn list(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let data = match sub.get_one::<String>("exercice") {
        Some(year) => store.transactions_by_exercice(year)?,
        None => store.transactions()?,
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let events = store.events()?;
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                let event = t
                    .event_id
                    .as_deref()
                    .and_then(|id| events.iter().find(|e| e.id == id))
                    .map(|e| e.name.clone())
                    .unwrap_or_default();
                vec![
                    t.date.to_string(),
                    t.piece_number.clone(),
                    t.description.clone(),
                    t.category.clone(),
                    t.kind.as_str().to_string(),
                    t.amount.to_string(),
                    t.payment_method.code().to_string(),
                    event,
                    if t.validated { "Oui" } else { "Non" }.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "Date",
                    "Pièce",
                    "Description",
                    "Catégorie",
                    "Type",
                    "Montant",
                    "Paiement",
                    "Événement",
                    "Validé"
                ],
                rows,
            )
        );
    }
    Ok(())
}

fn validate(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap();
    let Some(mut tx) = store.transaction(id)? else {
        bail!("Transaction '{}' not found", id);
    };
    tx.validated = true;
    tx.updated_at = now_rfc3339();
    store.put_transaction(&tx)?;
    println!("Validated {} ({})", tx.id, tx.piece_number);
    Ok(())
}

fn rm(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap();
    store.delete_transaction(id)?;
    println!("Deleted transaction {}", id);
    Ok(())
}
