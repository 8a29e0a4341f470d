// Copyright (c) 2025 Assocompta contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The record store: per-entity CRUD over SQLite with index reads by
//! exercice. `Store` is the one repository boundary the commands and the
//! import orchestrator depend on; tests open it in memory.

use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use crate::db::init_schema;
use crate::models::{
    Category, EntryKind, Event, EventKind, Exercice, Member, PaymentMethod, Transaction,
};

pub struct Store {
    conn: Connection,
}

/// The existing records captured once at the start of duplicate analysis,
/// so the Applying phase never reads its own writes.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub transactions: Vec<Transaction>,
    pub events: Vec<Event>,
    pub categories: Vec<Category>,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone)]
pub struct ExerciceStats {
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub result: Decimal,
    pub transaction_count: usize,
}

const TRANSACTION_COLUMNS: &str = "id, date, amount, description, category, subcategory, \
     payment_method, kind, event_id, piece_number, validated, exercice, created_at, \
     updated_at, attachment";

const EVENT_COLUMNS: &str =
    "id, name, date, kind, budget, actual_cost, revenue, capacity, attendance, exercice, \
     description";

const EXERCICE_COLUMNS: &str = "id, year, start_date, end_date, closed, active, \
     opening_balance, closing_balance, total_revenue, total_expenses, result";

impl Store {
    pub fn new(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Store { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Open in-memory store")?;
        Store::new(conn)
    }

    // ----- transactions -----

    pub fn add_transaction(&self, t: &Transaction) -> Result<()> {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO transactions({}) \
                     VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15)",
                    TRANSACTION_COLUMNS
                ),
                params![
                    t.id,
                    t.date,
                    t.amount.to_string(),
                    t.description,
                    t.category,
                    t.subcategory,
                    t.payment_method.code(),
                    t.kind.as_str(),
                    t.event_id,
                    t.piece_number,
                    t.validated,
                    t.exercice,
                    t.created_at,
                    t.updated_at,
                    t.attachment
                ],
            )
            .with_context(|| format!("Insert transaction '{}'", t.id))?;
        Ok(())
    }

    pub fn put_transaction(&self, t: &Transaction) -> Result<()> {
        self.conn
            .execute(
                &format!(
                    "INSERT OR REPLACE INTO transactions({}) \
                     VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15)",
                    TRANSACTION_COLUMNS
                ),
                params![
                    t.id,
                    t.date,
                    t.amount.to_string(),
                    t.description,
                    t.category,
                    t.subcategory,
                    t.payment_method.code(),
                    t.kind.as_str(),
                    t.event_id,
                    t.piece_number,
                    t.validated,
                    t.exercice,
                    t.created_at,
                    t.updated_at,
                    t.attachment
                ],
            )
            .with_context(|| format!("Upsert transaction '{}'", t.id))?;
        Ok(())
    }

    pub fn transaction(&self, id: &str) -> Result<Option<Transaction>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM transactions WHERE id=?1",
                    TRANSACTION_COLUMNS
                ),
                params![id],
                map_transaction,
            )
            .optional()?;
        Ok(row)
    }

    pub fn transactions(&self) -> Result<Vec<Transaction>> {
        self.query_transactions(
            &format!(
                "SELECT {} FROM transactions ORDER BY date, id",
                TRANSACTION_COLUMNS
            ),
            &[],
        )
    }

    pub fn transactions_by_exercice(&self, exercice: &str) -> Result<Vec<Transaction>> {
        self.query_transactions(
            &format!(
                "SELECT {} FROM transactions WHERE exercice=?1 ORDER BY date, id",
                TRANSACTION_COLUMNS
            ),
            &[exercice],
        )
    }

    fn query_transactions(&self, sql: &str, args: &[&str]) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(args), map_transaction)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn delete_transaction(&self, id: &str) -> Result<()> {
        let n = self
            .conn
            .execute("DELETE FROM transactions WHERE id=?1", params![id])?;
        if n == 0 {
            bail!("Transaction '{}' not found", id);
        }
        Ok(())
    }

    pub fn clear_transactions(&self) -> Result<()> {
        self.conn.execute("DELETE FROM transactions", [])?;
        Ok(())
    }

    /// Sequential voucher number, namespaced by kind and exercice:
    /// `2024-REC001`, `2024-DEP007`, ...
    pub fn next_piece_number(&self, kind: EntryKind, exercice: &str) -> Result<String> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE exercice=?1 AND kind=?2",
            params![exercice, kind.as_str()],
            |r| r.get(0),
        )?;
        Ok(format!(
            "{}-{}{:03}",
            exercice,
            kind.piece_prefix(),
            count + 1
        ))
    }

    // ----- events -----

    pub fn add_event(&self, e: &Event) -> Result<()> {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO events({}) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
                    EVENT_COLUMNS
                ),
                params![
                    e.id,
                    e.name,
                    e.date,
                    e.kind.code(),
                    e.budget.to_string(),
                    e.actual_cost.to_string(),
                    e.revenue.to_string(),
                    e.capacity,
                    e.attendance,
                    e.exercice,
                    e.description
                ],
            )
            .with_context(|| format!("Insert event '{}'", e.name))?;
        Ok(())
    }

    pub fn put_event(&self, e: &Event) -> Result<()> {
        self.conn
            .execute(
                &format!(
                    "INSERT OR REPLACE INTO events({}) \
                     VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
                    EVENT_COLUMNS
                ),
                params![
                    e.id,
                    e.name,
                    e.date,
                    e.kind.code(),
                    e.budget.to_string(),
                    e.actual_cost.to_string(),
                    e.revenue.to_string(),
                    e.capacity,
                    e.attendance,
                    e.exercice,
                    e.description
                ],
            )
            .with_context(|| format!("Upsert event '{}'", e.name))?;
        Ok(())
    }

    pub fn event(&self, id: &str) -> Result<Option<Event>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM events WHERE id=?1", EVENT_COLUMNS),
                params![id],
                map_event,
            )
            .optional()?;
        Ok(row)
    }

    pub fn events(&self) -> Result<Vec<Event>> {
        self.query_events(
            &format!("SELECT {} FROM events ORDER BY date, id", EVENT_COLUMNS),
            &[],
        )
    }

    pub fn events_by_exercice(&self, exercice: &str) -> Result<Vec<Event>> {
        self.query_events(
            &format!(
                "SELECT {} FROM events WHERE exercice=?1 ORDER BY date, id",
                EVENT_COLUMNS
            ),
            &[exercice],
        )
    }

    fn query_events(&self, sql: &str, args: &[&str]) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(args), map_event)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Refused while transactions still reference the event; links are
    /// never silently left dangling.
    pub fn delete_event(&self, id: &str) -> Result<()> {
        let used: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE event_id=?1",
            params![id],
            |r| r.get(0),
        )?;
        if used > 0 {
            bail!(
                "Event '{}' is referenced by {} transaction(s); delete or relink them first",
                id,
                used
            );
        }
        let n = self
            .conn
            .execute("DELETE FROM events WHERE id=?1", params![id])?;
        if n == 0 {
            bail!("Event '{}' not found", id);
        }
        Ok(())
    }

    pub fn clear_events(&self) -> Result<()> {
        self.conn.execute("DELETE FROM events", [])?;
        Ok(())
    }

    // ----- categories -----

    pub fn add_category(&self, c: &Category) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO categories(id, code, name, kind, subcategories) \
                 VALUES (?1,?2,?3,?4,?5)",
                params![
                    c.id,
                    c.code,
                    c.name,
                    c.kind.as_str(),
                    serde_json::to_string(&c.subcategories)?
                ],
            )
            .with_context(|| format!("Insert category '{}'", c.code))?;
        Ok(())
    }

    pub fn put_category(&self, c: &Category) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO categories(id, code, name, kind, subcategories) \
                 VALUES (?1,?2,?3,?4,?5)",
                params![
                    c.id,
                    c.code,
                    c.name,
                    c.kind.as_str(),
                    serde_json::to_string(&c.subcategories)?
                ],
            )
            .with_context(|| format!("Upsert category '{}'", c.code))?;
        Ok(())
    }

    pub fn category_by_code(&self, code: &str) -> Result<Option<Category>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, code, name, kind, subcategories FROM categories WHERE code=?1",
                params![code],
                map_category,
            )
            .optional()?;
        Ok(row)
    }

    pub fn categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, code, name, kind, subcategories FROM categories ORDER BY code")?;
        let rows = stmt.query_map([], map_category)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Guarded like exercice deletion: refused while transactions use the
    /// code.
    pub fn delete_category(&self, code: &str) -> Result<()> {
        let used: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE category=?1",
            params![code],
            |r| r.get(0),
        )?;
        if used > 0 {
            bail!(
                "Category '{}' is used by {} transaction(s); reassign them first",
                code,
                used
            );
        }
        let n = self
            .conn
            .execute("DELETE FROM categories WHERE code=?1", params![code])?;
        if n == 0 {
            bail!("Category '{}' not found", code);
        }
        Ok(())
    }

    pub fn clear_categories(&self) -> Result<()> {
        self.conn.execute("DELETE FROM categories", [])?;
        Ok(())
    }

    // ----- members -----

    pub fn add_member(&self, m: &Member) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO members(id, first_name, last_name, email, phone, \
                 membership_date, membership_fee, active, address) \
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
                params![
                    m.id,
                    m.first_name,
                    m.last_name,
                    m.email,
                    m.phone,
                    m.membership_date,
                    m.membership_fee.to_string(),
                    m.active,
                    m.address
                ],
            )
            .with_context(|| format!("Insert member '{} {}'", m.first_name, m.last_name))?;
        Ok(())
    }

    pub fn members(&self) -> Result<Vec<Member>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, first_name, last_name, email, phone, membership_date, \
             membership_fee, active, address FROM members ORDER BY last_name, first_name",
        )?;
        let rows = stmt.query_map([], map_member)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn delete_member(&self, id: &str) -> Result<()> {
        let n = self
            .conn
            .execute("DELETE FROM members WHERE id=?1", params![id])?;
        if n == 0 {
            bail!("Member '{}' not found", id);
        }
        Ok(())
    }

    pub fn clear_members(&self) -> Result<()> {
        self.conn.execute("DELETE FROM members", [])?;
        Ok(())
    }

    // ----- exercices -----

    pub fn add_exercice(&self, e: &Exercice) -> Result<()> {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO exercices({}) \
                     VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
                    EXERCICE_COLUMNS
                ),
                params![
                    e.id,
                    e.year,
                    e.start_date,
                    e.end_date,
                    e.closed,
                    e.active,
                    e.opening_balance.to_string(),
                    e.closing_balance.to_string(),
                    e.total_revenue.to_string(),
                    e.total_expenses.to_string(),
                    e.result.to_string()
                ],
            )
            .with_context(|| format!("Insert exercice '{}'", e.year))?;
        Ok(())
    }

    pub fn exercices(&self) -> Result<Vec<Exercice>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM exercices ORDER BY year",
            EXERCICE_COLUMNS
        ))?;
        let rows = stmt.query_map([], map_exercice)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn exercice_by_year(&self, year: &str) -> Result<Option<Exercice>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM exercices WHERE year=?1", EXERCICE_COLUMNS),
                params![year],
                map_exercice,
            )
            .optional()?;
        Ok(row)
    }

    pub fn active_exercice(&self) -> Result<Option<Exercice>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM exercices WHERE active=1", EXERCICE_COLUMNS),
                [],
                map_exercice,
            )
            .optional()?;
        Ok(row)
    }

    /// Activating one exercice deactivates every other in the same pass.
    pub fn activate_exercice(&self, year: &str) -> Result<()> {
        let Some(exercice) = self.exercice_by_year(year)? else {
            bail!("Exercice '{}' not found", year);
        };
        if exercice.closed {
            bail!("Exercice '{}' is closed and cannot be activated", year);
        }
        self.conn.execute("UPDATE exercices SET active=0", [])?;
        self.conn
            .execute("UPDATE exercices SET active=1 WHERE year=?1", params![year])?;
        Ok(())
    }

    /// Freezes the year: totals and closing balance are recomputed from
    /// its transactions, the record is deactivated and marked closed.
    pub fn close_exercice(&self, year: &str) -> Result<Exercice> {
        let Some(mut exercice) = self.exercice_by_year(year)? else {
            bail!("Exercice '{}' not found", year);
        };
        if exercice.closed {
            bail!("Exercice '{}' is already closed", year);
        }
        let stats = self.exercice_stats(year)?;
        exercice.total_revenue = stats.total_revenue;
        exercice.total_expenses = stats.total_expenses;
        exercice.result = stats.result;
        exercice.closing_balance = exercice.opening_balance + stats.result;
        exercice.closed = true;
        exercice.active = false;
        self.conn.execute(
            "UPDATE exercices SET closed=1, active=0, closing_balance=?1, total_revenue=?2, \
             total_expenses=?3, result=?4 WHERE year=?5",
            params![
                exercice.closing_balance.to_string(),
                exercice.total_revenue.to_string(),
                exercice.total_expenses.to_string(),
                exercice.result.to_string(),
                year
            ],
        )?;
        Ok(exercice)
    }

    pub fn reopen_exercice(&self, year: &str) -> Result<()> {
        let Some(exercice) = self.exercice_by_year(year)? else {
            bail!("Exercice '{}' not found", year);
        };
        if !exercice.closed {
            bail!("Exercice '{}' is not closed", year);
        }
        self.conn
            .execute("UPDATE exercices SET closed=0 WHERE year=?1", params![year])?;
        Ok(())
    }

    /// Refused while transactions are recorded against the year.
    pub fn delete_exercice(&self, year: &str) -> Result<()> {
        let used: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE exercice=?1",
            params![year],
            |r| r.get(0),
        )?;
        if used > 0 {
            bail!(
                "Exercice '{}' has {} transaction(s); it cannot be deleted",
                year,
                used
            );
        }
        let n = self
            .conn
            .execute("DELETE FROM exercices WHERE year=?1", params![year])?;
        if n == 0 {
            bail!("Exercice '{}' not found", year);
        }
        Ok(())
    }

    pub fn exercice_stats(&self, year: &str) -> Result<ExerciceStats> {
        let transactions = self.transactions_by_exercice(year)?;
        let total_revenue: Decimal = transactions
            .iter()
            .filter(|t| t.kind == EntryKind::Recette)
            .map(|t| t.amount)
            .sum();
        let total_expenses: Decimal = transactions
            .iter()
            .filter(|t| t.kind == EntryKind::Depense)
            .map(|t| t.amount)
            .sum();
        Ok(ExerciceStats {
            total_revenue,
            total_expenses,
            result: total_revenue - total_expenses,
            transaction_count: transactions.len(),
        })
    }

    // ----- bulk -----

    /// Clears the four imported entity types. Exercices survive a
    /// replace-mode import.
    pub fn clear_all(&self) -> Result<()> {
        self.clear_transactions()?;
        self.clear_events()?;
        self.clear_categories()?;
        self.clear_members()?;
        Ok(())
    }

    pub fn snapshot(&self) -> Result<StoreSnapshot> {
        Ok(StoreSnapshot {
            transactions: self.transactions()?,
            events: self.events()?,
            categories: self.categories()?,
            members: self.members()?,
        })
    }
}


fn map_transaction(r: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: r.get(0)?,
        date: r.get(1)?,
        amount: decimal_column(r, 2)?,
        description: r.get(3)?,
        category: r.get(4)?,
        subcategory: r.get(5)?,
        payment_method: PaymentMethod::from_code(&r.get::<_, String>(6)?),
        kind: EntryKind::from_wire(&r.get::<_, String>(7)?),
        event_id: r.get(8)?,
        piece_number: r.get(9)?,
        validated: r.get(10)?,
        exercice: r.get(11)?,
        created_at: r.get(12)?,
        updated_at: r.get(13)?,
        attachment: r.get(14)?,
    })
}

fn map_event(r: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: r.get(0)?,
        name: r.get(1)?,
        date: r.get(2)?,
        kind: EventKind::from_code(&r.get::<_, String>(3)?),
        budget: decimal_column(r, 4)?,
        actual_cost: decimal_column(r, 5)?,
        revenue: decimal_column(r, 6)?,
        capacity: r.get(7)?,
        attendance: r.get(8)?,
        exercice: r.get(9)?,
        description: r.get(10)?,
    })
}

fn map_category(r: &Row<'_>) -> rusqlite::Result<Category> {
    let subcategories: String = r.get(4)?;
    Ok(Category {
        id: r.get(0)?,
        code: r.get(1)?,
        name: r.get(2)?,
        kind: EntryKind::from_wire(&r.get::<_, String>(3)?),
        subcategories: serde_json::from_str(&subcategories).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?,
    })
}

fn map_member(r: &Row<'_>) -> rusqlite::Result<Member> {
    Ok(Member {
        id: r.get(0)?,
        first_name: r.get(1)?,
        last_name: r.get(2)?,
        email: r.get(3)?,
        phone: r.get(4)?,
        membership_date: r.get(5)?,
        membership_fee: decimal_column(r, 6)?,
        active: r.get(7)?,
        address: r.get(8)?,
    })
}

fn map_exercice(r: &Row<'_>) -> rusqlite::Result<Exercice> {
    Ok(Exercice {
        id: r.get(0)?,
        year: r.get(1)?,
        start_date: r.get(2)?,
        end_date: r.get(3)?,
        closed: r.get(4)?,
        active: r.get(5)?,
        opening_balance: decimal_column(r, 6)?,
        closing_balance: decimal_column(r, 7)?,
        total_revenue: decimal_column(r, 8)?,
        total_expenses: decimal_column(r, 9)?,
        result: decimal_column(r, 10)?,
    })
}

fn decimal_column(r: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = r.get(idx)?;
    raw.parse().map_err(|e: rust_decimal::Error| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
