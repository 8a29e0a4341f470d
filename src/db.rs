// Copyright (c) 2025 Assocompta contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

use crate::plan::default_plan;
use crate::store::Store;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("fr.assocompta", "Assocompta", "assocompta"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("assocompta.sqlite"))
}

pub fn open_or_init() -> Result<Store> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    let store = Store::new(conn)?;
    seed_accounting_plan(&store)?;
    Ok(store)
}

/// First run: install the association's chart of accounts so the capture
/// form has somewhere to post.
fn seed_accounting_plan(store: &Store) -> Result<()> {
    if store.categories()?.is_empty() {
        for category in default_plan() {
            store.add_category(&category)?;
        }
    }
    Ok(())
}

pub(crate) fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS transactions(
        id TEXT PRIMARY KEY,
        date TEXT NOT NULL,
        amount TEXT NOT NULL,
        description TEXT NOT NULL,
        category TEXT NOT NULL,
        subcategory TEXT,
        payment_method TEXT NOT NULL,
        kind TEXT NOT NULL CHECK(kind IN ('recette','depense')),
        event_id TEXT,
        piece_number TEXT NOT NULL,
        validated INTEGER NOT NULL DEFAULT 0,
        exercice TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        attachment TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_exercice ON transactions(exercice);
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
    CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category);

    CREATE TABLE IF NOT EXISTS events(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        date TEXT NOT NULL,
        kind TEXT NOT NULL,
        budget TEXT NOT NULL,
        actual_cost TEXT NOT NULL,
        revenue TEXT NOT NULL,
        capacity INTEGER NOT NULL DEFAULT 0,
        attendance INTEGER NOT NULL DEFAULT 0,
        exercice TEXT NOT NULL,
        description TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_events_exercice ON events(exercice);
    CREATE INDEX IF NOT EXISTS idx_events_date ON events(date);

    CREATE TABLE IF NOT EXISTS exercices(
        id TEXT PRIMARY KEY,
        year TEXT NOT NULL UNIQUE,
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        closed INTEGER NOT NULL DEFAULT 0,
        active INTEGER NOT NULL DEFAULT 0,
        opening_balance TEXT NOT NULL DEFAULT '0',
        closing_balance TEXT NOT NULL DEFAULT '0',
        total_revenue TEXT NOT NULL DEFAULT '0',
        total_expenses TEXT NOT NULL DEFAULT '0',
        result TEXT NOT NULL DEFAULT '0'
    );
    CREATE INDEX IF NOT EXISTS idx_exercices_year ON exercices(year);

    CREATE TABLE IF NOT EXISTS categories(
        id TEXT PRIMARY KEY,
        code TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        kind TEXT NOT NULL CHECK(kind IN ('recette','depense')),
        subcategories TEXT NOT NULL DEFAULT '[]'
    );
    CREATE INDEX IF NOT EXISTS idx_categories_kind ON categories(kind);

    CREATE TABLE IF NOT EXISTS members(
        id TEXT PRIMARY KEY,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT,
        membership_date TEXT NOT NULL,
        membership_fee TEXT NOT NULL DEFAULT '0',
        active INTEGER NOT NULL DEFAULT 1,
        address TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_members_active ON members(active);
    "#,
    )?;
    Ok(())
}
