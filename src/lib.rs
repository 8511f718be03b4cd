pub mod access;
pub mod app;
pub mod config;
pub mod error;
pub mod export;
pub mod forms;
pub mod handlers;
pub mod materials;
pub mod middleware;
pub mod models;
pub mod ordering;
pub mod store;
pub mod urls;
pub mod utils;

// Re-export commonly used items
pub use access::{AccessContext, AccessError, Gate};
pub use app::{router, ApiDoc, AppState};
pub use config::{Config, ConfigError};
pub use error::AppError;
pub use export::{DocumentGenerator, ExportError, ExportPayload, SimplePdf};
pub use forms::{EventProtectionForm, RequestParams, ValidationError};
pub use materials::{MaterialFactory, MaterialRegistry};
pub use models::{Conference, Contribution, Material, Principal, SubContribution};
pub use ordering::OrderingError;
pub use store::{MemoryStore, PgStore, Seed, Store, StoreError};
