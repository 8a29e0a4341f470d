// Copyright (c) 2025 Assocompta contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! One import operation as an explicit state machine:
//!
//! `Idle → FileSelected → Parsed → DuplicatesAnalyzed →
//!  AwaitingConfirmation → Applying → Done | Failed`
//!
//! The operator gate is a state transition fed with a [`Decision`], so the
//! engine stays UI-agnostic: the CLI prompts on stdin, tests pass the
//! decision directly. Nothing is written to the store before an explicit
//! `Decision::Proceed`.

use anyhow::{anyhow, bail, Result};

use crate::codec::{self, Archive, IdGen};
use crate::dedup::{
    is_duplicate_category, is_duplicate_event, is_duplicate_member, is_duplicate_transaction,
};
use crate::store::{Store, StoreSnapshot};
use crate::workbook::Workbook;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Skip records the duplicate detector flags against the pre-import
    /// snapshot.
    Merge,
    /// Clear transactions, events, categories and members first, then
    /// insert every decoded record unconditionally.
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportState {
    Idle,
    FileSelected,
    Parsed,
    DuplicatesAnalyzed,
    AwaitingConfirmation,
    Applying,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportCounts {
    pub transactions: usize,
    pub events: usize,
    pub categories: usize,
    pub members: usize,
}

impl ImportCounts {
    pub fn total(&self) -> usize {
        self.transactions + self.events + self.categories + self.members
    }
}

/// Decoded totals and how many of them match existing records, per entity
/// type. Shown to the operator before anything is written.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateReport {
    pub decoded: ImportCounts,
    pub duplicates: ImportCounts,
}

pub struct ImportSession {
    state: ImportState,
    workbook: Option<Workbook>,
    archive: Option<Archive>,
    existing: Option<StoreSnapshot>,
    report: Option<DuplicateReport>,
}

impl Default for ImportSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportSession {
    pub fn new() -> Self {
        ImportSession {
            state: ImportState::Idle,
            workbook: None,
            archive: None,
            existing: None,
            report: None,
        }
    }

    pub fn state(&self) -> ImportState {
        self.state
    }

    fn expect_state(&self, expected: ImportState, step: &str) -> Result<()> {
        if self.state != expected {
            bail!(
                "Cannot {} from state {:?} (expected {:?})",
                step,
                self.state,
                expected
            );
        }
        Ok(())
    }

    pub fn select_file(&mut self, workbook: Workbook) -> Result<()> {
        self.expect_state(ImportState::Idle, "select a file")?;
        self.workbook = Some(workbook);
        self.state = ImportState::FileSelected;
        Ok(())
    }

    /// Decodes the selected workbook. A structural failure (missing
    /// required sheet) is fatal: the session moves to `Failed` and must be
    /// restarted from scratch.
    pub fn parse(&mut self, ids: &mut IdGen) -> Result<&Archive> {
        self.expect_state(ImportState::FileSelected, "parse")?;
        let workbook = self
            .workbook
            .as_ref()
            .ok_or_else(|| anyhow!("No workbook selected"))?;
        match codec::decode(workbook, ids) {
            Ok(archive) => {
                self.state = ImportState::Parsed;
                Ok(self.archive.insert(archive))
            }
            Err(e) => {
                self.state = ImportState::Failed;
                Err(anyhow!(e).context("Import file could not be parsed"))
            }
        }
    }

    /// Runs the duplicate detector for every decoded record against one
    /// snapshot of the current store.
    pub fn analyze(&mut self, existing: StoreSnapshot) -> Result<&DuplicateReport> {
        self.expect_state(ImportState::Parsed, "analyze duplicates")?;
        let archive = self
            .archive
            .as_ref()
            .ok_or_else(|| anyhow!("No parsed data to analyze"))?;
        let report = DuplicateReport {
            decoded: ImportCounts {
                transactions: archive.transactions.len(),
                events: archive.events.len(),
                categories: archive.categories.len(),
                members: archive.members.len(),
            },
            duplicates: ImportCounts {
                transactions: archive
                    .transactions
                    .iter()
                    .filter(|t| is_duplicate_transaction(t, &existing.transactions))
                    .count(),
                events: archive
                    .events
                    .iter()
                    .filter(|e| is_duplicate_event(e, &existing.events))
                    .count(),
                categories: archive
                    .categories
                    .iter()
                    .filter(|c| is_duplicate_category(c, &existing.categories))
                    .count(),
                members: archive
                    .members
                    .iter()
                    .filter(|m| is_duplicate_member(m, &existing.members))
                    .count(),
            },
        };
        self.existing = Some(existing);
        self.state = ImportState::DuplicatesAnalyzed;
        Ok(self.report.insert(report))
    }

    /// Hands the counts to the operator and blocks the session on their
    /// answer.
    pub fn request_confirmation(&mut self) -> Result<&DuplicateReport> {
        self.expect_state(ImportState::DuplicatesAnalyzed, "request confirmation")?;
        self.state = ImportState::AwaitingConfirmation;
        self.report
            .as_ref()
            .ok_or_else(|| anyhow!("No duplicate report"))
    }

    /// Applies the import. Insertion order is categories, events, members,
    /// transactions, so referenced records exist before their dependents.
    /// Individual insert failures are warned and counted out, never abort
    /// the batch.
    pub fn apply(
        &mut self,
        store: &Store,
        mode: ImportMode,
        decision: Decision,
    ) -> Result<ImportCounts> {
        self.expect_state(ImportState::AwaitingConfirmation, "apply")?;
        if decision == Decision::Abort {
            self.state = ImportState::Done;
            return Ok(ImportCounts::default());
        }
        self.state = ImportState::Applying;
        let archive = self
            .archive
            .as_ref()
            .ok_or_else(|| anyhow!("No parsed data to apply"))?;
        let existing = self
            .existing
            .as_ref()
            .ok_or_else(|| anyhow!("No store snapshot captured"))?;

        if mode == ImportMode::Replace {
            store.clear_all()?;
        }
        let keep_all = mode == ImportMode::Replace;
        let mut counts = ImportCounts::default();

        for category in &archive.categories {
            if keep_all || !is_duplicate_category(category, &existing.categories) {
                match store.add_category(category) {
                    Ok(()) => counts.categories += 1,
                    Err(e) => eprintln!("warning: category '{}' skipped: {:#}", category.code, e),
                }
            }
        }
        for event in &archive.events {
            if keep_all || !is_duplicate_event(event, &existing.events) {
                match store.add_event(event) {
                    Ok(()) => counts.events += 1,
                    Err(e) => eprintln!("warning: event '{}' skipped: {:#}", event.name, e),
                }
            }
        }
        for member in &archive.members {
            if keep_all || !is_duplicate_member(member, &existing.members) {
                match store.add_member(member) {
                    Ok(()) => counts.members += 1,
                    Err(e) => eprintln!("warning: member '{}' skipped: {:#}", member.email, e),
                }
            }
        }
        for transaction in &archive.transactions {
            if keep_all || !is_duplicate_transaction(transaction, &existing.transactions) {
                match store.add_transaction(transaction) {
                    Ok(()) => counts.transactions += 1,
                    Err(e) => eprintln!(
                        "warning: transaction '{}' skipped: {:#}",
                        transaction.description, e
                    ),
                }
            }
        }

        self.state = ImportState::Done;
        Ok(counts)
    }

    pub fn archive(&self) -> Option<&Archive> {
        self.archive.as_ref()
    }
}
