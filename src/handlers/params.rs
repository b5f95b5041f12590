//! Path segment decoding.
//!
//! Range endpoints pack both dates (and optionally a county) into one path
//! segment: `{from}_until_{to}` or `{from}_until_{to}_{county}`.

use crate::error::{CovidPtError, Result};
use crate::query::QueryDescriptor;

/// Separator between the two dates of a range
pub const UNTIL: &str = "_until_";

/// Decode `/get_entry/{segment}` and `/get_entry_counties/{segment}`
pub fn entry_query(segment: &str) -> QueryDescriptor {
    match segment.split_once(UNTIL) {
        Some((from, to)) => QueryDescriptor::RangeEntries {
            from: from.to_string(),
            to: to.to_string(),
        },
        None => QueryDescriptor::EntryAt {
            date: segment.to_string(),
        },
    }
}

/// Decode `/get_entry_county/{segment}`.
///
/// Dates never contain `_`, so the county is whatever follows the first `_`
/// after the last date.
pub fn county_entry_query(segment: &str) -> Result<QueryDescriptor> {
    match segment.split_once(UNTIL) {
        Some((from, rest)) => {
            let (to, county) = split_county(rest)?;
            Ok(QueryDescriptor::RangeEntriesCounty {
                from: from.to_string(),
                to: to.to_string(),
                county: county.to_string(),
            })
        }
        None => {
            let (date, county) = split_county(segment)?;
            Ok(QueryDescriptor::EntryAtCounty {
                date: date.to_string(),
                county: county.to_string(),
            })
        }
    }
}

fn split_county(segment: &str) -> Result<(&str, &str)> {
    match segment.split_once('_') {
        Some((date, county)) if !county.trim().is_empty() => Ok((date, county)),
        _ => Err(CovidPtError::InvalidParameter {
            param: "county".to_string(),
            message: format!("No county given in '{}'", segment),
        }),
    }
}
