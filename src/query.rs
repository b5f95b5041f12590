//! Query engine.
//!
//! Every operation here is a pure function of a borrowed [`Table`] and a
//! [`QueryDescriptor`]. Nothing is cached or mutated, so any number of requests
//! may resolve against their own tables concurrently.

use serde::Serialize;
use thiserror::Error;

use crate::table::{canonical_county, Date, Row, Table};

/// A request against one table.
///
/// Dates are carried as the text the client sent; the engine parses them so
/// that malformed dates are reported the same way as absent ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryDescriptor {
    LastUpdate,
    LastUpdateCounty { county: String },
    FullDataset,
    EntryAt { date: String },
    RangeEntries { from: String, to: String },
    CountyList,
    EntryAtCounty { date: String, county: String },
    RangeEntriesCounty { from: String, to: String, county: String },
}

impl QueryDescriptor {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            QueryDescriptor::LastUpdate => "last_update",
            QueryDescriptor::LastUpdateCounty { .. } => "last_update_county",
            QueryDescriptor::FullDataset => "full_dataset",
            QueryDescriptor::EntryAt { .. } => "entry_at",
            QueryDescriptor::RangeEntries { .. } => "range_entries",
            QueryDescriptor::CountyList => "county_list",
            QueryDescriptor::EntryAtCounty { .. } => "entry_at_county",
            QueryDescriptor::RangeEntriesCounty { .. } => "range_entries_county",
        }
    }
}

/// Why a query produced no result
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("No entry found for date {date}")]
    DateNotFound { date: String },

    #[error("No entries between {from} and {to}")]
    RangeNotFound { from: String, to: String },

    #[error("County not found: {county}")]
    CountyNotFound { county: String },

    #[error("The dataset has no entries")]
    EmptyTable,
}

/// A successful query result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryOutput<'a> {
    Rows(Vec<&'a Row>),
    Counties(Vec<&'a str>),
}

impl<'a> QueryOutput<'a> {
    pub fn len(&self) -> usize {
        match self {
            QueryOutput::Rows(rows) => rows.len(),
            QueryOutput::Counties(counties) => counties.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The rows of a row-shaped result
    pub fn rows(&self) -> Option<&[&'a Row]> {
        match self {
            QueryOutput::Rows(rows) => Some(rows.as_slice()),
            QueryOutput::Counties(_) => None,
        }
    }
}

/// Resolve a query against a table
pub fn execute<'a>(
    table: &'a Table,
    query: &QueryDescriptor,
) -> Result<QueryOutput<'a>, QueryError> {
    let rows = match query {
        QueryDescriptor::LastUpdate => last_update(table)?,
        QueryDescriptor::LastUpdateCounty { county } => {
            let rows = last_update(table)?;
            require_county(resolve_county(rows, county), county)?
        }
        QueryDescriptor::FullDataset => table.rows().iter().collect(),
        QueryDescriptor::EntryAt { date } => entries_at(table, date)?,
        QueryDescriptor::RangeEntries { from, to } => resolve_range(table, from, to)?,
        QueryDescriptor::CountyList => return Ok(QueryOutput::Counties(counties(table))),
        QueryDescriptor::EntryAtCounty { date, county } => {
            let rows = entries_at(table, date)?;
            require_county(resolve_county(rows, county), county)?
        }
        QueryDescriptor::RangeEntriesCounty { from, to, county } => {
            let rows = resolve_range(table, from, to)?;
            require_county(resolve_county(rows, county), county)?
        }
    };

    Ok(QueryOutput::Rows(rows))
}

/// Parse a date sent by a client
pub fn parse_date(text: &str) -> Result<Date, QueryError> {
    text.parse().map_err(|_| QueryError::DateNotFound {
        date: text.to_string(),
    })
}

/// Positions of every row observed on `date`
pub fn resolve_date(table: &Table, date: Date) -> Vec<usize> {
    table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| row.date() == date)
        .map(|(idx, _)| idx)
        .collect()
}

/// Rows whose canonical county matches `county` in any letter case
pub fn resolve_county<'a>(rows: Vec<&'a Row>, county: &str) -> Vec<&'a Row> {
    let wanted = canonical_county(county);
    rows.into_iter()
        .filter(|row| row.county() == Some(wanted.as_str()))
        .collect()
}

/// Rows whose date lies in the closed interval spanned by the two endpoints,
/// in ascending date order. The endpoints may be given in either order.
pub fn resolve_range<'a>(table: &'a Table, from: &str, to: &str) -> Result<Vec<&'a Row>, QueryError> {
    let a = parse_date(from)?;
    let b = parse_date(to)?;
    let (low, high) = if a <= b { (a, b) } else { (b, a) };

    let mut rows: Vec<&Row> = table
        .rows()
        .iter()
        .filter(|row| row.date() >= low && row.date() <= high)
        .collect();
    // stable: rows sharing a date keep table order
    rows.sort_by_key(|row| row.date());

    if rows.is_empty() {
        return Err(QueryError::RangeNotFound {
            from: low.to_string(),
            to: high.to_string(),
        });
    }
    Ok(rows)
}

/// Every row at the latest date present in the table
pub fn last_update(table: &Table) -> Result<Vec<&Row>, QueryError> {
    let latest = table
        .rows()
        .iter()
        .map(Row::date)
        .max()
        .ok_or(QueryError::EmptyTable)?;

    Ok(table.rows().iter().filter(|row| row.date() == latest).collect())
}

/// Distinct counties in order of first appearance
pub fn counties(table: &Table) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    table
        .rows()
        .iter()
        .filter_map(Row::county)
        .filter(|county| seen.insert(*county))
        .collect()
}

fn entries_at<'a>(table: &'a Table, text: &str) -> Result<Vec<&'a Row>, QueryError> {
    let date = parse_date(text)?;
    let positions = resolve_date(table, date);
    if positions.is_empty() {
        return Err(QueryError::DateNotFound {
            date: text.to_string(),
        });
    }
    Ok(positions.into_iter().map(|idx| &table.rows()[idx]).collect())
}

fn require_county<'a>(rows: Vec<&'a Row>, county: &str) -> Result<Vec<&'a Row>, QueryError> {
    if rows.is_empty() {
        return Err(QueryError::CountyNotFound {
            county: county.to_string(),
        });
    }
    Ok(rows)
}
