//! Tabular data model for the national and county datasets.
//!
//! A [`Table`] is built once from CSV text and never mutated afterwards. Each
//! [`Row`] keeps its cells in source column order together with the parsed
//! observation date and, for regional tables, the canonical county name.

use chrono::NaiveDate;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::error::{CovidPtError, Result};

/// Textual format of every date in the datasets and in request paths.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Which dataset a table holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    /// One row per date
    National,
    /// One row per (date, county)
    Regional,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::National => write!(f, "national"),
            TableKind::Regional => write!(f, "regional"),
        }
    }
}

impl FromStr for TableKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "national" => Ok(TableKind::National),
            "regional" => Ok(TableKind::Regional),
            other => Err(format!(
                "Unknown table kind: {}. Must be one of: national, regional",
                other
            )),
        }
    }
}

/// A calendar day, written as `dd-mm-yyyy`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(NaiveDate);

impl Date {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Date)
    }

    pub fn naive(&self) -> NaiveDate {
        self.0
    }
}

/// Text that is not a `dd-mm-yyyy` calendar day
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid date: {0} (expected dd-mm-yyyy)")]
pub struct InvalidDate(pub String);

impl FromStr for Date {
    type Err = InvalidDate;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        // chrono accepts single-digit days and months; the datasets never use them
        if trimmed.len() != 10 {
            return Err(InvalidDate(s.to_string()));
        }
        NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
            .map(Date)
            .map_err(|_| InvalidDate(s.to_string()))
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

/// Normalize a county name to its canonical upper-case form
pub fn canonical_county(name: &str) -> String {
    name.trim().to_uppercase()
}

/// A single cell value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Number(f64),
    Text(String),
    Null,
}

impl Value {
    /// Interpret a raw CSV cell
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Value::Null;
        }
        if let Ok(int) = raw.parse::<i64>() {
            return Value::Integer(int);
        }
        match raw.parse::<f64>() {
            Ok(num) if num.is_finite() => Value::Number(num),
            // pandas writes missing values as NaN
            Ok(_) => Value::Null,
            Err(_) => Value::Text(raw.to_string()),
        }
    }
}

/// One observation
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    date: Date,
    county: Option<String>,
    fields: Vec<(Arc<str>, Value)>,
}

impl Row {
    pub fn new(date: Date, county: Option<String>, fields: Vec<(Arc<str>, Value)>) -> Self {
        Self {
            date,
            county,
            fields,
        }
    }

    pub fn date(&self) -> Date {
        self.date
    }

    /// Canonical county, `None` for national rows
    pub fn county(&self) -> Option<&str> {
        self.county.as_deref()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name.as_ref() == column)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_ref(), value))
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name.as_ref(), value)?;
        }
        map.end()
    }
}

/// Names of the columns used to locate rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyColumns {
    pub date: String,
    pub county: String,
}

impl Default for KeyColumns {
    fn default() -> Self {
        Self {
            date: "data".to_string(),
            county: "concelho".to_string(),
        }
    }
}

/// An immutable, ordered snapshot of one dataset
#[derive(Debug, Clone)]
pub struct Table {
    kind: TableKind,
    columns: Vec<Arc<str>>,
    rows: Vec<Row>,
    skipped: usize,
}

impl Table {
    pub fn new(kind: TableKind, columns: Vec<Arc<str>>, rows: Vec<Row>) -> Self {
        Self {
            kind,
            columns,
            rows,
            skipped: 0,
        }
    }

    /// Parse CSV text into a table.
    ///
    /// Records that cannot be read or whose date does not parse are skipped.
    /// National tables keep only the first row for any given date.
    pub fn from_csv(kind: TableKind, text: &str, keys: &KeyColumns) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(false)
            .from_reader(text.as_bytes());

        let headers = reader.headers().map_err(|e| CovidPtError::MalformedSource {
            message: format!("Unreadable header: {}", e),
        })?;
        let columns: Vec<Arc<str>> = headers.iter().map(|h| Arc::from(h.trim())).collect();

        let date_idx = column_index(&columns, &keys.date)?;
        let county_idx = match kind {
            TableKind::National => None,
            TableKind::Regional => Some(column_index(&columns, &keys.county)?),
        };

        let mut rows = Vec::new();
        let mut seen_dates = std::collections::HashSet::new();
        let mut skipped = 0;

        for (line, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!(kind = %kind, line = line + 2, error = %e, "Skipping unreadable record");
                    skipped += 1;
                    continue;
                }
            };

            let raw_date = record.get(date_idx).unwrap_or_default();
            let date = match raw_date.parse::<Date>() {
                Ok(date) => date,
                Err(_) => {
                    warn!(kind = %kind, line = line + 2, date = raw_date, "Skipping record with invalid date");
                    skipped += 1;
                    continue;
                }
            };

            if kind == TableKind::National && !seen_dates.insert(date) {
                warn!(date = %date, "Duplicate date in national source, keeping first row");
                skipped += 1;
                continue;
            }

            let county = county_idx.map(|idx| canonical_county(record.get(idx).unwrap_or_default()));
            if county.as_deref() == Some("") {
                warn!(kind = %kind, line = line + 2, date = %date, "Skipping record without a county");
                skipped += 1;
                continue;
            }

            let fields = columns
                .iter()
                .enumerate()
                .map(|(idx, name)| {
                    let raw = record.get(idx).unwrap_or_default();
                    let value = if Some(idx) == county_idx {
                        Value::Text(canonical_county(raw))
                    } else if idx == date_idx {
                        Value::Text(raw.trim().to_string())
                    } else {
                        Value::parse(raw)
                    };
                    (Arc::clone(name), value)
                })
                .collect();

            rows.push(Row::new(date, county, fields));
        }

        Ok(Self {
            kind,
            columns,
            rows,
            skipped,
        })
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.as_ref())
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of source records dropped while parsing
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Earliest and latest dates present
    pub fn date_span(&self) -> Option<(Date, Date)> {
        let min = self.rows.iter().map(Row::date).min()?;
        let max = self.rows.iter().map(Row::date).max()?;
        Some((min, max))
    }
}

fn column_index(columns: &[Arc<str>], name: &str) -> Result<usize> {
    columns
        .iter()
        .position(|c| c.as_ref() == name)
        .ok_or_else(|| CovidPtError::MalformedSource {
            message: format!("Missing column: {}", name),
        })
}
