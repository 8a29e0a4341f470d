// Copyright (c) 2025 Assocompta contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::Exercice;
use crate::store::Store;
use crate::utils::{confirm, maybe_print_json, parse_decimal, pretty_table};

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("activate", sub)) => activate(store, sub)?,
        Some(("close", sub)) => close(store, sub)?,
        Some(("reopen", sub)) => reopen(store, sub)?,
        Some(("rm", sub)) => rm(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let year = sub.get_one::<String>("year").unwrap().clone();
    let y: i32 = year
        .parse()
        .with_context(|| format!("Invalid year '{}'", year))?;
    if store.exercice_by_year(&year)?.is_some() {
        bail!("Exercice '{}' already exists", year);
    }
    let opening_balance = match sub.get_one::<String>("opening-balance") {
        Some(raw) => parse_decimal(raw)?,
        None => Decimal::ZERO,
    };
    let Some(start_date) = NaiveDate::from_ymd_opt(y, 1, 1) else {
        bail!("Year '{}' is out of range", year);
    };
    let Some(end_date) = NaiveDate::from_ymd_opt(y, 12, 31) else {
        bail!("Year '{}' is out of range", year);
    };
    let exercice = Exercice {
        id: format!("exercice-{}", year),
        year: year.clone(),
        start_date,
        end_date,
        closed: false,
        active: false,
        opening_balance,
        closing_balance: Decimal::ZERO,
        total_revenue: Decimal::ZERO,
        total_expenses: Decimal::ZERO,
        result: Decimal::ZERO,
    };
    store.add_exercice(&exercice)?;
    // The first exercice opened becomes the working one straight away.
    if store.active_exercice()?.is_none() {
        store.activate_exercice(&year)?;
        println!("Opened exercice {} (now active)", year);
    } else {
        println!("Opened exercice {}", year);
    }
    Ok(())
}

fn list(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    // Open years show live totals; closed years keep the frozen ones.
    let mut data = store.exercices()?;
    for exercice in &mut data {
        if !exercice.closed {
            let stats = store.exercice_stats(&exercice.year)?;
            exercice.total_revenue = stats.total_revenue;
            exercice.total_expenses = stats.total_expenses;
            exercice.result = stats.result;
        }
    }
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|e| {
                vec![
                    e.year.clone(),
                    if e.active { "Oui" } else { "Non" }.to_string(),
                    if e.closed { "Oui" } else { "Non" }.to_string(),
                    e.opening_balance.to_string(),
                    e.total_revenue.to_string(),
                    e.total_expenses.to_string(),
                    e.result.to_string(),
                    e.closing_balance.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "Année",
                    "Actif",
                    "Clôturé",
                    "Solde initial",
                    "Recettes",
                    "Dépenses",
                    "Résultat",
                    "Solde final"
                ],
                rows,
            )
        );
    }
    Ok(())
}

fn activate(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let year = sub.get_one::<String>("year").unwrap();
    store.activate_exercice(year)?;
    println!("Exercice {} is now active", year);
    Ok(())
}

fn close(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let year = sub.get_one::<String>("year").unwrap();
    let closed = store.close_exercice(year)?;
    println!(
        "Closed exercice {}: recettes {}, dépenses {}, résultat {}, solde final {}",
        closed.year,
        closed.total_revenue,
        closed.total_expenses,
        closed.result,
        closed.closing_balance
    );
    Ok(())
}

fn reopen(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let year = sub.get_one::<String>("year").unwrap();
    if !sub.get_flag("yes")
        && !confirm(&format!(
            "Reopen exercice {}? Its frozen totals become editable again.",
            year
        ))?
    {
        println!("Cancelled");
        return Ok(());
    }
    store.reopen_exercice(year)?;
    println!("Reopened exercice {}", year);
    Ok(())
}

fn rm(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let year = sub.get_one::<String>("year").unwrap();
    store.delete_exercice(year)?;
    println!("Deleted exercice {}", year);
    Ok(())
}
