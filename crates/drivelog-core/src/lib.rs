//! drivelog-core
//!
//! Business logic for the trip logbook: validation, the record store, the
//! persistence and export contracts, and the periodic backup task. Depends on
//! drivelog-domain. No terminal I/O, no direct filesystem access.

pub mod backup;
pub mod error;
pub mod storage;
pub mod store;
pub mod time;
pub mod transfer;
pub mod validate;

pub use backup::AutoBackup;
pub use error::{ImportError, NotFoundError, PersistenceError, StoreError, ValidationError};
pub use storage::{ExportSink, KeyValueStore, MemoryKeyValueStore};
pub use store::RecordStore;
pub use time::{Clock, SystemClock};
pub use transfer::ExportDocument;
pub use validate::{validate, RecordField};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("drivelog_core=info".parse().unwrap());

        fmt().with_env_filter(filter).init();
    });
}
