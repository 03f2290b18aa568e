//! CLI command implementations.

mod convert;
mod doctor;
mod export;
mod import;
mod query;

pub use convert::run_convert;
pub use doctor::run_doctor;
pub use export::{run_export, ExportOptions};
pub use import::run_import;
pub use query::run_query;
