// Copyright (c) 2025 Assocompta contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{bail, Result};
use std::path::Path;

use crate::codec::{self, Archive};
use crate::store::Store;
use crate::utils::today;

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    let out = m.get_one::<String>("out").unwrap();
    let exercice = match m.get_one::<String>("exercice") {
        Some(year) => year.clone(),
        None => match store.active_exercice()? {
            Some(e) => e.year,
            None => bail!("No active exercice; pass --exercice"),
        },
    };

    // The archive scopes movements to one exercice but always carries the
    // full accounting plan and member roll.
    let archive = Archive {
        transactions: store.transactions_by_exercice(&exercice)?,
        events: store.events_by_exercice(&exercice)?,
        categories: store.categories()?,
        members: store.members()?,
        exercice: exercice.clone(),
        export_date: today().to_string(),
    };
    let counts = (
        archive.transactions.len(),
        archive.events.len(),
        archive.categories.len(),
        archive.members.len(),
    );
    let workbook = codec::encode(&archive);
    workbook.write_dir(Path::new(out))?;
    println!(
        "Exported exercice {} to {}: {} transaction(s), {} événement(s), {} catégorie(s), {} adhérent(s)",
        exercice, out, counts.0, counts.1, counts.2, counts.3
    );
    Ok(())
}
