// Google Sheets and Drive adapters for the record ports.

pub mod drive_uploader;
pub mod service_account;
pub mod sheets_client;

pub use drive_uploader::DriveUploader;
pub use service_account::{ServiceAccountAuth, SHEETS_AND_DRIVE_SCOPES};
pub use sheets_client::GoogleSheetsClient;
