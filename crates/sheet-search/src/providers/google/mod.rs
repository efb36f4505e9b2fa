//! Google Drive and Sheets provider
//!
//! - Service-account OAuth2 (JWT bearer grant)
//! - Drive v3 folder listing
//! - Sheets v4 bulk grid reads and range writes

mod auth;
mod sheets_client;

pub use auth::{ServiceAccountAuth, SCOPES};
pub use sheets_client::{GoogleSheetsClient, GoogleSpreadsheet};
