//! Persistent result tables.
//!
//! A [`ResultTable`] is an append-only CSV file whose first row is the header.
//! Rows are only appended when no identical row exists yet, so re-running an
//! evaluation with the same inputs leaves the file unchanged. The Markdown
//! rendering is regenerated from the full table on every run.

use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::AppError;

pub const RECALL_HEADER: [&str; 9] = [
    "input_kg_file_name",
    "base_kg_file_name",
    "eval_type",
    "recall",
    "hit_count",
    "rel_count",
    "base_kg_size",
    "base_count",
    "base_coverage",
];

pub const PRECISION_HEADER: [&str; 4] = [
    "input_kg_file_name",
    "full precision",
    "types precision",
    "instances precision",
];

#[derive(Debug)]
pub struct ResultTable {
    path: PathBuf,
    /// Header first, then data rows in file order.
    rows: Vec<Vec<String>>,
}

impl ResultTable {
    /// Open an existing table, or create it with `header` as its first row.
    pub fn open(path: &Path, header: &[&str]) -> Result<Self, AppError> {
        let mut rows = Vec::new();
        if path.exists() {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_path(path)?;
            for record in reader.records() {
                rows.push(record?.iter().map(str::to_string).collect());
            }
        } else if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut table = Self { path: path.to_path_buf(), rows };
        if table.rows.is_empty() {
            let header: Vec<String> = header.iter().map(|h| h.to_string()).collect();
            table.write_row(&header)?;
            table.rows.push(header);
        }
        debug!(path = %path.display(), rows = table.rows.len(), "result table opened");
        Ok(table)
    }

    /// Append `row` unless an identical row is already present.
    /// Returns whether the row was written.
    pub fn append(&mut self, row: Vec<String>) -> Result<bool, AppError> {
        if self.rows.contains(&row) {
            debug!(path = %self.path.display(), ?row, "row already recorded, skipped");
            return Ok(false);
        }
        self.write_row(&row)?;
        self.rows.push(row);
        Ok(true)
    }

    pub fn header(&self) -> &[String] {
        &self.rows[0]
    }

    pub fn data_rows(&self) -> &[Vec<String>] {
        &self.rows[1..]
    }

    fn write_row(&self, row: &[String]) -> Result<(), AppError> {
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(row)?;
        writer.flush()?;
        Ok(())
    }

    /// Render the whole table as a GitHub-flavoured Markdown table under a
    /// `# title` heading. Columns whose cells are all numbers are right-aligned.
    pub fn render_markdown(&self, title: &str) -> String {
        let columns = self.header().len();
        let cell = |row: &[String], i: usize| -> String {
            row.get(i).map(|c| c.replace('|', "\\|")).unwrap_or_default()
        };

        let widths: Vec<usize> = (0..columns)
            .map(|i| {
                self.rows
                    .iter()
                    .map(|r| cell(r, i).chars().count())
                    .max()
                    .unwrap_or(0)
                    .max(3)
            })
            .collect();
        let numeric: Vec<bool> = (0..columns)
            .map(|i| {
                !self.data_rows().is_empty()
                    && self.data_rows().iter().all(|r| cell(r, i).trim().parse::<f64>().is_ok())
            })
            .collect();

        let mut out = format!("# {title}\n");
        let mut push_line = |cells: Vec<String>| {
            let _ = writeln!(out, "|{}|", cells.join("|"));
        };

        push_line((0..columns).map(|i| format!("{:<w$}", cell(self.header(), i), w = widths[i])).collect());
        push_line(
            (0..columns)
                .map(|i| {
                    if numeric[i] {
                        format!("{}:", "-".repeat(widths[i] - 1))
                    } else {
                        "-".repeat(widths[i])
                    }
                })
                .collect(),
        );
        for row in self.data_rows() {
            push_line(
                (0..columns)
                    .map(|i| {
                        let c = cell(row, i);
                        if numeric[i] {
                            format!("{c:>w$}", w = widths[i])
                        } else {
                            format!("{c:<w$}", w = widths[i])
                        }
                    })
                    .collect(),
            );
        }
        out
    }

    /// Overwrite `path` with the Markdown rendering.
    pub fn write_markdown(&self, path: &Path, title: &str) -> Result<(), AppError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.render_markdown(title))?;
        Ok(())
    }
}

/// Base name of `path` as written in the `input_kg_file_name` columns.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn creates_file_with_header_and_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results").join("precision.csv");
        let table = ResultTable::open(&path, &PRECISION_HEADER).unwrap();
        assert!(table.data_rows().is_empty());
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text.lines().next().unwrap(),
            "input_kg_file_name,full precision,types precision,instances precision"
        );
    }

    #[test]
    fn duplicate_rows_are_not_appended() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("precision.csv");
        let r = row(&["kg.jsonl", "1.0000", "1.0000", "0.0000"]);

        let mut table = ResultTable::open(&path, &PRECISION_HEADER).unwrap();
        assert!(table.append(r.clone()).unwrap());
        assert!(!table.append(r.clone()).unwrap());

        // A fresh open sees the persisted row and still refuses the duplicate.
        let mut reopened = ResultTable::open(&path, &PRECISION_HEADER).unwrap();
        assert!(!reopened.append(r).unwrap());
        assert_eq!(reopened.data_rows().len(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 2);
    }

    #[test]
    fn different_rows_are_appended() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("precision.csv");
        let mut table = ResultTable::open(&path, &PRECISION_HEADER).unwrap();
        table.append(row(&["a.jsonl", "0.5000", "0.5000", "0.0000"])).unwrap();
        table.append(row(&["b.jsonl", "0.5000", "0.5000", "0.0000"])).unwrap();
        assert_eq!(table.data_rows().len(), 2);
    }

    #[test]
    fn cells_with_commas_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recall.csv");
        let mut table = ResultTable::open(&path, &PRECISION_HEADER).unwrap();
        let r = row(&["kg, v2.jsonl", "0.1000", "0.2000", "0.3000"]);
        table.append(r.clone()).unwrap();

        let reopened = ResultTable::open(&path, &PRECISION_HEADER).unwrap();
        assert_eq!(reopened.data_rows()[0], r);
    }

    #[test]
    fn markdown_aligns_numeric_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("precision.csv");
        let mut table = ResultTable::open(&path, &["name", "score"]).unwrap();
        table.append(row(&["kg.jsonl", "0.5000"])).unwrap();

        let md = table.render_markdown("Precision Results");
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines[0], "# Precision Results");
        assert_eq!(lines[1], "|name    |score |");
        assert_eq!(lines[2], "|--------|-----:|");
        assert_eq!(lines[3], "|kg.jsonl|0.5000|");
    }

    #[test]
    fn markdown_file_is_overwritten() {
        let dir = TempDir::new().unwrap();
        let csv_path = dir.path().join("t.csv");
        let md_path = dir.path().join("out").join("t.md");
        let mut table = ResultTable::open(&csv_path, &["name"]).unwrap();
        table.write_markdown(&md_path, "First").unwrap();
        table.append(row(&["x"])).unwrap();
        table.write_markdown(&md_path, "Second").unwrap();
        let md = fs::read_to_string(&md_path).unwrap();
        assert!(md.starts_with("# Second"));
        assert!(!md.contains("First"));
        assert!(md.contains("|x   |"));
    }

    #[test]
    fn file_name_strips_directories() {
        assert_eq!(file_name(Path::new("data/base-kg/base-kg-v1.jsonl")), "base-kg-v1.jsonl");
    }
}
