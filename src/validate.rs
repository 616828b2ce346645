use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::row::{Country, ItemRow, Lifecycle};

lazy_static! {
    static ref ITEM_NUMBER_REGEX: Regex = Regex::new(r"^[0-9]{7}$").unwrap();
}

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One validation failure on one row. Row numbers are 1-based, matching the
/// order the rows arrived in (blank rows included in the count).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowIssue {
    #[error("row {row}: {field} is required")]
    MissingField { row: usize, field: &'static str },

    #[error("row {row}: item number must be exactly 7 digits, got \"{value}\"")]
    BadItemNumber { row: usize, value: String },

    #[error("row {row}: unknown country \"{value}\" (expected NOR, SVE or FIN)")]
    UnknownCountry { row: usize, value: String },

    #[error("row {row}: price must be a non-negative number, got \"{value}\"")]
    BadPrice { row: usize, value: String },

    #[error("row {row}: unknown lifecycle \"{value}\" (expected ZA, ZI, ZD, ZP or ZC)")]
    UnknownLifecycle { row: usize, value: String },

    #[error("row {row}: activation date must be a valid YYYY-MM-DD date, got \"{value}\"")]
    BadDate { row: usize, value: String },
}

/// Validate a single row, returning every issue found on it.
pub fn validate_row(row_number: usize, row: &ItemRow) -> Vec<RowIssue> {
    let mut issues = Vec::new();

    let item_number = row.item_number.trim();
    if item_number.is_empty() {
        issues.push(RowIssue::MissingField {
            row: row_number,
            field: "itemNumber",
        });
    } else if !ITEM_NUMBER_REGEX.is_match(item_number) {
        issues.push(RowIssue::BadItemNumber {
            row: row_number,
            value: item_number.to_string(),
        });
    }

    let country = row.country.trim();
    if country.is_empty() {
        issues.push(RowIssue::MissingField {
            row: row_number,
            field: "country",
        });
    } else if Country::parse(country).is_none() {
        issues.push(RowIssue::UnknownCountry {
            row: row_number,
            value: country.to_string(),
        });
    }

    let price = row.new_price.trim();
    if price.is_empty() {
        issues.push(RowIssue::MissingField {
            row: row_number,
            field: "newPrice",
        });
    } else if !is_valid_price(price) {
        issues.push(RowIssue::BadPrice {
            row: row_number,
            value: price.to_string(),
        });
    }

    // Lifecycle is the one optional field: empty passes, junk does not.
    let lifecycle = row.product_lifecycle.trim();
    if !lifecycle.is_empty() && Lifecycle::parse(lifecycle).is_none() {
        issues.push(RowIssue::UnknownLifecycle {
            row: row_number,
            value: lifecycle.to_string(),
        });
    }

    let date = row.activation_date.trim();
    if date.is_empty() {
        issues.push(RowIssue::MissingField {
            row: row_number,
            field: "activationDate",
        });
    } else if NaiveDate::parse_from_str(date, DATE_FORMAT).is_err() {
        issues.push(RowIssue::BadDate {
            row: row_number,
            value: date.to_string(),
        });
    }

    issues
}

/// Validate a batch of rows. Blank rows are skipped; the editor always keeps
/// one possibly-empty row in the table and that must not block an export.
pub fn validate_rows(rows: &[ItemRow]) -> Result<(), Vec<RowIssue>> {
    let mut issues = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        if row.is_blank() {
            continue;
        }
        issues.extend(validate_row(index + 1, row));
    }

    if issues.is_empty() { Ok(()) } else { Err(issues) }
}

fn is_valid_price(value: &str) -> bool {
    match value.parse::<f64>() {
        Ok(price) => price.is_finite() && price >= 0.0,
        Err(_) => false,
    }
}
