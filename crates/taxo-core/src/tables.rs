//! Read and write delimited taxonomy tables.
//!
//! Required columns and fields are checked strictly: a missing column or an
//! empty required value is an error naming the file, line and column. Rows are
//! never skipped, since a dropped edge or id would silently change depths and
//! paths downstream.

use crate::graph::Edge;
use crate::labels::LabelTable;
use csv::StringRecord;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Errors raised while reading or writing tables.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to create {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: missing required column `{column}`")]
    MissingColumn { path: PathBuf, column: String },
    #[error("{path}:{line}: empty value in required column `{column}`")]
    MissingField {
        path: PathBuf,
        line: u64,
        column: String,
    },
}

/// Field delimiter of a table file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    /// `.txt` and `.tsv` files are tab-delimited, everything else is CSV.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("txt") || ext.eq_ignore_ascii_case("tsv") => {
                Self::Tab
            }
            _ => Self::Comma,
        }
    }

    fn byte(self) -> u8 {
        match self {
            Self::Comma => b',',
            Self::Tab => b'\t',
        }
    }
}

/// An in-memory table: header row plus records.
#[derive(Debug, Clone)]
pub struct Table {
    path: PathBuf,
    headers: StringRecord,
    records: Vec<StringRecord>,
}

impl Table {
    /// Read a table, choosing the delimiter from the file extension.
    pub fn read(path: &Path) -> Result<Self, TableError> {
        Self::read_with(path, Delimiter::for_path(path))
    }

    pub fn read_with(path: &Path, delimiter: Delimiter) -> Result<Self, TableError> {
        let read_err = |source| TableError::Read {
            path: path.to_path_buf(),
            source,
        };

        // O*NET text exports carry bare quotes inside task statements.
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter.byte())
            .quoting(delimiter == Delimiter::Comma)
            .from_path(path)
            .map_err(read_err)?;

        let headers = reader.headers().map_err(read_err)?.clone();
        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_err)?;

        tracing::debug!("read {} rows from {}", records.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            headers,
            records,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn records(&self) -> &[StringRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index of the column named `name`.
    pub fn column(&self, name: &str) -> Result<usize, TableError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| TableError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })
    }

    /// Index of the column named `name`, if present.
    pub fn find_column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Value of a required field. Empty values are an error.
    pub fn require<'r>(&self, record: &'r StringRecord, col: usize) -> Result<&'r str, TableError> {
        match record.get(col).map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(TableError::MissingField {
                path: self.path.clone(),
                line: record.position().map_or(0, csv::Position::line),
                column: self.headers.get(col).unwrap_or_default().to_string(),
            }),
        }
    }

    /// Value of an optional field, empty string when absent.
    pub fn optional<'r>(record: &'r StringRecord, col: usize) -> &'r str {
        record.get(col).map_or("", str::trim)
    }
}

/// Read (child, parent) edges from the named columns of a table.
pub fn read_edges(path: &Path, child_col: &str, parent_col: &str) -> Result<Vec<Edge>, TableError> {
    let table = Table::read(path)?;
    let child = table.column(child_col)?;
    let parent = table.column(parent_col)?;

    let mut edges = Vec::with_capacity(table.len());
    for record in table.records() {
        edges.push(Edge::new(
            table.require(record, child)?,
            table.require(record, parent)?,
        ));
    }
    tracing::info!("loaded {} edges from {}", edges.len(), path.display());
    Ok(edges)
}

/// Read an id → label table from the named columns.
///
/// Rows with an empty label are left out so lookups fall back to the raw id.
pub fn read_labels(path: &Path, id_col: &str, label_col: &str) -> Result<LabelTable, TableError> {
    let table = Table::read(path)?;
    let id = table.column(id_col)?;
    let label = table.column(label_col)?;

    let mut labels = LabelTable::new();
    for record in table.records() {
        let id = table.require(record, id)?;
        let text = Table::optional(record, label);
        if !text.is_empty() {
            labels.insert(id, text);
        }
    }
    tracing::info!("loaded {} labels from {}", labels.len(), path.display());
    Ok(labels)
}

/// Buffered CSV writer for output tables.
pub struct TableWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows: usize,
}

impl TableWriter {
    /// Create the output file (and its directory) and write the header row.
    pub fn create<I, T>(path: &Path, headers: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).map_err(|source| TableError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let write_err = |source| TableError::Write {
            path: path.to_path_buf(),
            source,
        };
        let mut writer = csv::Writer::from_path(path).map_err(write_err)?;
        writer.write_record(headers).map_err(write_err)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer,
            rows: 0,
        })
    }

    pub fn write_row<I, T>(&mut self, row: I) -> Result<(), TableError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer
            .write_record(row)
            .map_err(|source| TableError::Write {
                path: self.path.clone(),
                source,
            })?;
        self.rows += 1;
        Ok(())
    }

    /// Flush buffered rows. Returns the number of data rows written.
    pub fn finish(mut self) -> Result<usize, TableError> {
        self.writer.flush().map_err(|source| TableError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(self.rows)
    }
}
