pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::{DataDir, OpenAiClient};
pub use crate::config::{cli::CliArgs, ComponentConfig};
pub use crate::core::{component::Component, pipeline::RowPipeline};
pub use crate::utils::error::{ComponentError, Result};
