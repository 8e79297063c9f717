pub mod engine;
pub mod exporter;

pub use crate::domain::model::{Action, ExportReport, LaunchParams, Submission};
pub use crate::domain::ports::{ConfigProvider, ExportPlugin, Gradebook, Storage};
pub use crate::utils::error::Result;
