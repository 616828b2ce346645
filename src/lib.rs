/*!
# Price Sheet

A browser-based form for entering item price rows, exporting them as CSV and
emailing the CSV through an SMTP relay.

## Overview

The frontend is a plain-DOM table editor: rows of typed fields built from a
field-definition table, with a live preview of the derived row key (country
code + item number). The backend is a small axum service that serves the
frontend, validates submitted rows, encodes them as semicolon-delimited CSV
and either returns the CSV as a download or sends it as a mail attachment.

Rows are transient: request-scoped on the server, page-scoped in the browser.
There is no persistence and no authentication.

## Modules

- **row**: the item row, its derived key, and the country/lifecycle enums
- **validate**: required-field, format and enumeration checks over rows
- **exporter**: CSV encoding with the fixed column header
- **mailer**: SMTP transport and the `MailSender` seam
- **config**: environment-driven server and relay configuration
- **app**: routing and request handlers

## REST API Endpoints

- `GET /` - the form page
- `GET /api/health` - liveness probe
- `POST /api/send-csv` - validate rows, encode CSV, email it as an attachment
- `POST /api/export-csv` - validate rows, return the CSV as a file download
*/

pub mod app;
pub mod config;
pub mod exporter;
pub mod mailer;
pub mod row;
pub mod validate;

/// Re-export the core types to make them easier to use
pub use exporter::{COLUMNS, ExportError, csv_filename, rows_to_csv};
pub use mailer::{MailError, MailSender, OutgoingCsv, SmtpMailer};
pub use row::{Country, ItemRow, Lifecycle};
pub use validate::{RowIssue, validate_row, validate_rows};
