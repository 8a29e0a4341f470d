// Copyright (c) 2025 Assocompta contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::Path;

/// One flat table: a header row plus string cells. All typing is deferred
/// to the codec; the sheet only knows trimmed text.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn with_headers(headers: &[&str]) -> Self {
        Sheet {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(move |cells| RowView { sheet: self, cells })
    }

    fn col(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Read access to one row by column name. Cells are trimmed; a missing
/// column and an empty cell both read as `None`.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    sheet: &'a Sheet,
    cells: &'a [String],
}

impl<'a> RowView<'a> {
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.sheet.col(column)?;
        let cell = self.cells.get(idx)?.trim();
        if cell.is_empty() { None } else { Some(cell) }
    }

    /// First non-empty cell among several column names, for the
    /// new-format/legacy-format fallback chains.
    pub fn first(&self, columns: &[&str]) -> Option<&'a str> {
        columns.iter().find_map(|c| self.get(c))
    }
}

/// An in-memory workbook: named sheets in insertion order. The codec is a
/// pure function over this type; the CSV-directory layout below is the
/// only file representation.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<(String, Sheet)>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, sheet: Sheet) {
        self.sheets.push((name.to_string(), sheet));
    }

    /// Sheet lookup is accent-tolerant: `Événements` and `Evenements`
    /// resolve to the same sheet, so workbooks survive filesystems that
    /// mangle accented names.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        let wanted = fold_accents(name);
        self.sheets
            .iter()
            .find(|(n, _)| fold_accents(n) == wanted)
            .map(|(_, s)| s)
    }

    /// Reads a workbook directory: every `*.csv` file becomes a sheet
    /// named after its file stem.
    pub fn read_dir(dir: &Path) -> Result<Workbook> {
        let mut wb = Workbook::new();
        let entries =
            fs::read_dir(dir).with_context(|| format!("Open workbook {}", dir.display()))?;
        let mut paths: Vec<_> = entries
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("csv"))
            .collect();
        paths.sort();
        for path in paths {
            let name = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem.to_string(),
                None => continue,
            };
            let mut rdr = csv::ReaderBuilder::new()
                .has_headers(true)
                .flexible(true)
                .from_path(&path)
                .with_context(|| format!("Open sheet {}", path.display()))?;
            let headers: Vec<String> = rdr
                .headers()
                .with_context(|| format!("Read headers of {}", path.display()))?
                .iter()
                .map(|h| h.to_string())
                .collect();
            let mut sheet = Sheet {
                headers,
                rows: Vec::new(),
            };
            for record in rdr.records() {
                let record =
                    record.with_context(|| format!("Read row in {}", path.display()))?;
                let mut row: Vec<String> = record.iter().map(|c| c.to_string()).collect();
                row.resize(sheet.headers.len(), String::new());
                sheet.rows.push(row);
            }
            wb.insert(&name, sheet);
        }
        Ok(wb)
    }

    pub fn write_dir(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Create workbook directory {}", dir.display()))?;
        for (name, sheet) in &self.sheets {
            let path = dir.join(format!("{}.csv", name));
            let mut wtr = csv::Writer::from_path(&path)
                .with_context(|| format!("Write sheet {}", path.display()))?;
            wtr.write_record(&sheet.headers)?;
            for row in &sheet.rows {
                wtr.write_record(row)?;
            }
            wtr.flush()?;
        }
        Ok(())
    }
}

pub fn fold_accents(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'à' | 'â' | 'ä' => 'a',
            'À' | 'Â' | 'Ä' => 'A',
            'î' | 'ï' => 'i',
            'Î' | 'Ï' => 'I',
            'ô' | 'ö' => 'o',
            'Ô' | 'Ö' => 'O',
            'ù' | 'û' | 'ü' => 'u',
            'Ù' | 'Û' | 'Ü' => 'U',
            'ç' => 'c',
            'Ç' => 'C',
            other => other,
        })
        .collect()
}

// Spreadsheet tools serialize dates either as plain strings or as the
// numeric day count since 1899-12-30; both must decode.
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

pub fn parse_date_cell(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%d/%m/%Y") {
        return Some(d);
    }
    if let Ok(serial) = raw.parse::<f64>() {
        let days = serial.trunc() as i64;
        if days > 0 && days < 200_000 {
            let epoch = NaiveDate::from_ymd_opt(SERIAL_EPOCH.0, SERIAL_EPOCH.1, SERIAL_EPOCH.2)?;
            return epoch.checked_add_signed(chrono::Duration::days(days));
        }
    }
    None
}

pub fn parse_bool_cell(raw: Option<&str>) -> bool {
    matches!(raw.map(str::trim), Some("Oui"))
}

pub fn bool_cell(value: bool) -> String {
    if value { "Oui" } else { "Non" }.to_string()
}
