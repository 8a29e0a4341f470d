// Copyright (c) 2025 Assocompta contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{bail, Result};

use crate::models::{Category, EntryKind, Subcategory};
use crate::plan::default_plan;
use crate::store::Store;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("add-sub", sub)) => add_sub(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("rm", sub)) => rm(store, sub)?,
        Some(("seed", _)) => seed(store)?,
        _ => {}
    }
    Ok(())
}

fn add(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let code = sub.get_one::<String>("code").unwrap().clone();
    if store.category_by_code(&code)?.is_some() {
        bail!("Category '{}' already exists", code);
    }
    let category = Category {
        id: format!("cat-{}", code),
        code: code.clone(),
        name: sub.get_one::<String>("name").unwrap().clone(),
        kind: EntryKind::from_wire(sub.get_one::<String>("kind").unwrap()),
        subcategories: Vec::new(),
    };
    store.add_category(&category)?;
    println!("Added category {} '{}'", category.code, category.name);
    Ok(())
}

fn add_sub(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let parent = sub.get_one::<String>("parent").unwrap();
    let code = sub.get_one::<String>("code").unwrap().clone();
    let Some(mut category) = store.category_by_code(parent)? else {
        bail!("Unknown category code '{}'", parent);
    };
    if category.subcategories.iter().any(|s| s.code == code) {
        bail!("Category '{}' already has subcategory '{}'", parent, code);
    }
    category.subcategories.push(Subcategory {
        code: code.clone(),
        name: sub.get_one::<String>("name").unwrap().clone(),
        parent_code: parent.clone(),
    });
    store.put_category(&category)?;
    println!("Added subcategory {} under {}", code, parent);
    Ok(())
}

fn list(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let data = store.categories()?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|c| {
                let subs = c
                    .subcategories
                    .iter()
                    .map(|s| s.code.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                vec![
                    c.code.clone(),
                    c.name.clone(),
                    c.kind.as_str().to_string(),
                    subs,
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Code", "Nom", "Type", "Sous-catégories"], rows)
        );
    }
    Ok(())
}

fn rm(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let code = sub.get_one::<String>("code").unwrap();
    store.delete_category(code)?;
    println!("Deleted category {}", code);
    Ok(())
}

/// Installs the plan entries that are not present yet; existing codes are
/// left untouched.
fn seed(store: &Store) -> Result<()> {
    let mut added = 0;
    for category in default_plan() {
        if store.category_by_code(&category.code)?.is_none() {
            store.add_category(&category)?;
            added += 1;
        }
    }
    println!("Seeded {} categorie(s)", added);
    Ok(())
}
