// Input/output prop table.
//
// Keeps the caller's CSV as-is (column order, extra columns, cell text) and
// only adds or overwrites the seven result columns.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::batch::PropInput;
use crate::prop::{HitMiss, Verification};

/// Result columns, in the order they are appended.
pub const RESULT_COLUMNS: [&str; 7] = [
    "Actual_Stat",
    "Hit_Miss",
    "Result",
    "Game_Date",
    "Matchup",
    "Match_Method",
    "Days_Old",
];

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{}: spreadsheets are not supported, save the sheet as CSV first", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("expected {expected} results, got {got}")]
    RowCountMismatch { expected: usize, got: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl PropTable {
    /// Parse a CSV with a header row. Short rows are padded to the header width.
    pub fn read_csv<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(headers.len().max(row.len()), String::new());
            rows.push(row);
        }
        Ok(Self { headers, rows })
    }

    pub fn load(path: &Path) -> Result<Self, TableError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        if matches!(ext.as_deref(), Some("xlsx" | "xls" | "xlsm" | "ods")) {
            return Err(TableError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::read_csv(file)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Case-insensitive column lookup.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column(column)?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    fn require(&self, name: &'static str) -> Result<usize, TableError> {
        self.column(name).ok_or(TableError::MissingColumn(name))
    }

    /// The verifier's view of each row, in table order.
    pub fn inputs(&self) -> Result<Vec<PropInput>, TableError> {
        let player = self.require("Player")?;
        let stat = self.require("Stat")?;
        let line = self.require("Line")?;
        let opponent = self.column("Opponent");

        fn get(row: &[String], col: usize) -> &str {
            row.get(col).map(|s| s.trim()).unwrap_or("")
        }

        Ok(self
            .rows
            .iter()
            .map(|row| PropInput {
                player: get(row, player).to_string(),
                stat: get(row, stat).to_string(),
                line: get(row, line).parse::<f64>().ok().filter(|v| v.is_finite()),
                opponent: opponent
                    .map(|col| get(row, col))
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            })
            .collect())
    }

    fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column(name) {
            return idx;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.resize(self.headers.len(), String::new());
        }
        self.headers.len() - 1
    }

    /// Write verification results into the result columns.
    ///
    /// `results` must line up with the rows. `None` (a skipped row) leaves
    /// that row's result cells untouched.
    pub fn apply(&mut self, results: &[Option<Verification>]) -> Result<(), TableError> {
        if results.len() != self.rows.len() {
            return Err(TableError::RowCountMismatch {
                expected: self.rows.len(),
                got: results.len(),
            });
        }

        let cols: Vec<usize> = RESULT_COLUMNS
            .iter()
            .map(|name| self.ensure_column(name))
            .collect();

        for (row, result) in self.rows.iter_mut().zip(results) {
            let Some(v) = result else { continue };
            let values = [
                v.actual_display(),
                v.hit_miss.as_str().to_string(),
                v.result_symbol().to_string(),
                v.game_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
                v.matchup.clone().unwrap_or_default(),
                v.match_method.map(|m| m.as_str().to_string()).unwrap_or_default(),
                v.days_old.map(|n| n.to_string()).unwrap_or_default(),
            ];
            for (col, value) in cols.iter().zip(values) {
                if let Some(cell) = row.get_mut(*col) {
                    *cell = value;
                }
            }
        }
        Ok(())
    }

    /// `Hit_Miss` of every row; `None` for blank or unrecognised cells.
    pub fn hit_miss_values(&self) -> Vec<Option<HitMiss>> {
        let col = self.column("Hit_Miss");
        self.rows
            .iter()
            .map(|row| {
                col.and_then(|c| row.get(c))
                    .and_then(|cell| HitMiss::parse(cell))
            })
            .collect()
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), TableError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush().map_err(|e| TableError::Csv(e.into()))?;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), TableError> {
        let file = File::create(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.write_csv(file)
    }

    /// `<stem>_updated.csv` next to the input file.
    pub fn updated_path(input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "props".to_string());
        input.with_file_name(format!("{stem}_updated.csv"))
    }
}
