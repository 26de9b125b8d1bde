pub mod config;
pub mod csv;
pub mod error;
pub mod export;
pub mod json;
pub mod merge;
pub mod repository;
pub mod session;
pub mod shared;
pub mod store;

// Re-export key types for convenience.
pub use config::{StoreConfig, default_config_path};
pub use error::{PersistError, Result};
pub use export::{ExportFormat, export_sessions, import_sessions};
pub use merge::merge_imported;
pub use repository::SessionRepository;
pub use session::{
    Session, SessionPatch, format_timestamp, is_encodable_timestamp, parse_timestamp,
};
pub use shared::SharedSessionRepository;
pub use store::SessionFile;
