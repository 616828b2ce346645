use chrono::Local;
use csv::WriterBuilder;
use thiserror::Error;

use crate::row::ItemRow;

/// Fixed CSV header, in the order the receiving side expects the columns.
pub const COLUMNS: [&str; 6] = [
    "ITEM NUMBER",
    "COUNTRY",
    "NEW PRICE",
    "NEW PRODUCT LIFECYCLE",
    "ACTIVATION DATE",
    "KEY",
];

pub const DELIMITER: u8 = b';';

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode csv: {0}")]
    Encode(#[from] csv::Error),

    #[error("failed to finish csv buffer: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv output was not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encode rows as semicolon-delimited CSV with the fixed column header.
///
/// Fields are quoted only when they contain the delimiter, a quote or a
/// newline; embedded quotes are doubled. Blank rows are skipped and the KEY
/// column is re-derived from country and item number.
pub fn rows_to_csv(rows: &[ItemRow]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();

    {
        let mut writer = WriterBuilder::new()
            .delimiter(DELIMITER)
            .from_writer(&mut buffer);

        writer.write_record(COLUMNS)?;

        for row in rows.iter().filter(|row| !row.is_blank()) {
            let key = row.key();
            writer.write_record([
                row.item_number.trim(),
                row.country.trim(),
                row.new_price.trim(),
                row.product_lifecycle.trim(),
                row.activation_date.trim(),
                key.as_str(),
            ])?;
        }

        writer.flush()?;
    }

    Ok(String::from_utf8(buffer)?)
}

/// Attachment/download filename with a local timestamp, e.g.
/// `items-20240301-154500.csv`.
pub fn csv_filename() -> String {
    format!("items-{}.csv", Local::now().format("%Y%m%d-%H%M%S"))
}
