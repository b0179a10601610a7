pub mod file_store;
pub mod record_cache;
pub mod records_models;
pub mod sheet_schema;
pub mod table_store;

pub use file_store::{FileStore, UploadError};
pub use record_cache::RecordCache;
pub use records_models::{
    LedgerEntry, Participant, PhotoEntry, PriceTier, RestaurantEntry, WishlistEntry, Worksheet,
};
pub use sheet_schema::SheetRow;
pub use table_store::{Record, SheetHandle, TableError, TableStore, WorksheetHandle};
