// Copyright (c) 2025 Assocompta contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rust_decimal::Decimal;

use crate::models::Member;
use crate::store::Store;
use crate::utils::{maybe_print_json, new_id, parse_date, parse_decimal, pretty_table, today};

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
    let membership_date = match sub.get_one::<String>("date") {
        Some(raw) => parse_date(raw)?,
        None => today(),
    };
    let membership_fee = match sub.get_one::<String>("fee") {
        Some(raw) => parse_decimal(raw)?,
        None => Decimal::ZERO,
    };
    let member = Member {
        id: new_id("member"),
        first_name: sub.get_one::<String>("first-name").unwrap().clone(),
        last_name: sub.get_one::<String>("last-name").unwrap().clone(),
        email: sub.get_one::<String>("email").unwrap().clone(),
        phone: sub.get_one::<String>("phone").cloned(),
        membership_date,
        membership_fee,
        active: true,
        address: sub.get_one::<String>("address").cloned(),
    };
    store.add_member(&member)?;
    println!(
        "Registered {} {} (id {})",
        member.first_name, member.last_name, member.id
    );
    Ok(())
}

fn list(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let data = store.members()?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|m| {
                vec![
                    m.id.clone(),
                    m.first_name.clone(),
                    m.last_name.clone(),
                    m.email.clone(),
                    m.membership_date.to_string(),
                    m.membership_fee.to_string(),
                    if m.active { "Oui" } else { "Non" }.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Prénom", "Nom", "Email", "Adhésion", "Cotisation", "Actif"],
                rows,
            )
        );
    }
    Ok(())
}

fn rm(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap();
    store.delete_member(id)?;
    println!("Deleted member {}", id);
    Ok(())
}
