pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod types;

pub use config::{BiographyOrder, Config, JoinPolicy, Relation, RelationPolicies};
pub use domain::{BiographyEntry, Collaborator, Minister, Ministry, PersonRole};
pub use error::{BuildError, Result};
pub use loader::{load_source, SourceFormat, TableSource};
pub use pipeline::{Pipeline, PipelineResult, ValidationReport};
