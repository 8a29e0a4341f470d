// Copyright (c) 2025 Assocompta contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::Path;

use crate::codec::IdGen;
use crate::import::{Decision, ImportMode, ImportSession};
use crate::store::Store;
use crate::utils::confirm;
use crate::workbook::Workbook;

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    let path = m.get_one::<String>("path").unwrap();
    let mode = if m.get_flag("replace") {
        ImportMode::Replace
    } else {
        ImportMode::Merge
    };

    let workbook = Workbook::read_dir(Path::new(path))?;
    let mut session = ImportSession::new();
    session.select_file(workbook)?;
    let mut ids = IdGen::from_clock();
    session.parse(&mut ids)?;
    session.analyze(store.snapshot()?)?;
    let report = *session.request_confirmation()?;

    println!(
        "Found {} transaction(s), {} événement(s), {} catégorie(s), {} adhérent(s)",
        report.decoded.transactions,
        report.decoded.events,
        report.decoded.categories,
        report.decoded.members
    );
    if mode == ImportMode::Merge && report.duplicates.total() > 0 {
        println!(
            "Already present (will be skipped): {} transaction(s), {} événement(s), {} catégorie(s), {} adhérent(s)",
            report.duplicates.transactions,
            report.duplicates.events,
            report.duplicates.categories,
            report.duplicates.members
        );
    }
    if mode == ImportMode::Replace {
        println!("Replace mode: existing transactions, events, categories and members will be cleared first.");
    }

    let decision = if m.get_flag("yes") || confirm("Proceed with the import?")? {
        Decision::Proceed
    } else {
        Decision::Abort
    };
    let counts = session.apply(store, mode, decision)?;
    if decision == Decision::Abort {
        println!("Import cancelled; nothing was written");
    } else {
        println!(
            "Imported {} transaction(s), {} événement(s), {} catégorie(s), {} adhérent(s)",
            counts.transactions, counts.events, counts.categories, counts.members
        );
    }
    Ok(())
}
