pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{CsvParser, HttpUploader};
pub use config::cli::LocalFileSource;
pub use config::toml_config::TomlConfig;
pub use crate::core::session::{SelectOutcome, Session, UploadOutcome};
pub use crate::core::state::{AppState, TableView, ViewModel};
pub use crate::core::view::{PageCountMode, ViewOptions};
pub use utils::error::{AppError, Result};
