//! Google Sheets export.

mod auth;
mod client;

pub use auth::{SHEETS_SCOPE, ServiceAccountKey, TokenSource, signed_assertion};
pub use client::{SHEETS_BASE_URL, SheetsExporter, TOKEN_URL};
