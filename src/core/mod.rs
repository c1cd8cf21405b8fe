pub mod component;
pub mod pipeline;
pub mod prompt;
pub mod response;

pub use crate::domain::model::{Row, TableDefinition, TableManifest, OUTPUT_COLUMN};
pub use crate::domain::ports::Completion;
pub use crate::utils::error::Result;
