pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod lti;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{
    gradebook::{CsvGradebook, InMemoryGradebook},
    storage::LocalStorage,
};
pub use config::toml_config::TomlConfig;
pub use core::{engine::ExportEngine, exporter::LtiExportPlugin};
pub use domain::model::{Action, ExportReport, Submission};
pub use utils::error::{LtiError, Result};
