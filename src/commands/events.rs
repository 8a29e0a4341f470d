// Copyright (c) 2025 Assocompta contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rust_decimal::Decimal;

use crate::fiscal::resolve_fiscal_year;
use crate::models::{Event, EventKind};
use crate::store::Store;
use crate::utils::{maybe_print_json, new_id, parse_date, parse_decimal, pretty_table};

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("rm", sub)) => rm(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().clone();
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let kind = sub
        .get_one::<String>("kind")
        .map(|s| EventKind::from_code(s))
        .unwrap_or(EventKind::Concert);
    let budget = match sub.get_one::<String>("budget") {
        Some(raw) => parse_decimal(raw)?,
        None => Decimal::ZERO,
    };
    let exercice = sub
        .get_one::<String>("exercice")
        .cloned()
        .unwrap_or_else(|| resolve_fiscal_year(date));

    let event = Event {
        id: new_id("event"),
        name,
        date,
        kind,
        budget,
        actual_cost: Decimal::ZERO,
        revenue: Decimal::ZERO,
        capacity: sub.get_one::<i64>("capacity").copied().unwrap_or(0),
        attendance: 0,
        exercice,
        description: sub.get_one::<String>("description").cloned(),
    };
    store.add_event(&event)?;
    println!(
        "Created event '{}' on {} (exercice {}, id {})",
        event.name, event.date, event.exercice, event.id
    );
    Ok(())
}

fn list(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let data = match sub.get_one::<String>("exercice") {
        Some(year) => store.events_by_exercice(year)?,
        None => store.events()?,
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|e| {
                vec![
                    e.id.clone(),
                    e.name.clone(),
                    e.date.to_string(),
                    e.kind.label().to_string(),
                    e.budget.to_string(),
                    e.capacity.to_string(),
                    e.exercice.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Nom", "Date", "Type", "Budget", "Capacité", "Exercice"],
                rows,
            )
        );
    }
    Ok(())
}

fn rm(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap();
    store.delete_event(id)?;
    println!("Deleted event {}", id);
    Ok(())
}
