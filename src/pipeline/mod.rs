// Build pipeline: assemble, order, validate. Loading and writing sit on either side.

pub mod assemble;
pub mod normalize;
pub mod validate;

use std::path::Path;

use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::domain::Minister;
use crate::error::{BuildError, Result};
use crate::loader::{self, SourceFormat};
use crate::types::SourceTables;

pub use assemble::{Assembler, Assembly, UnresolvedLink};
pub use validate::{ValidationError, ValidationReport, ValidationWarning};

/// Result of a successful pipeline run
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Final ordered minister sequence, ready to serialize
    pub ministers: Vec<Minister>,
    /// Validation report; errors are always empty on success
    pub report: ValidationReport,
}

pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load `source` and run every stage on it
    pub fn run_from_source(
        &self,
        source: &Path,
        format: Option<SourceFormat>,
    ) -> Result<PipelineResult> {
        let tables = loader::load_source(source, format)?;
        self.run(&tables)
    }

    /// Assemble → order → validate.
    ///
    /// Data-quality violations come back as [`BuildError::Validation`]
    /// carrying the full report; nothing is written by this stage.
    #[instrument(skip_all)]
    pub fn run(&self, tables: &SourceTables) -> Result<PipelineResult> {
        info!("🏗️ Assembling ministers...");
        let Assembly {
            ministers,
            unresolved,
            shared_ids,
        } = Assembler::assemble(tables, &self.config.policies)?;

        info!("🔧 Ordering biographies...");
        let ministers = normalize::finalize(ministers, self.config.biography_order);

        info!("✅ Validating {} ministers...", ministers.len());
        let report = validate::validate(&ministers, &unresolved, &shared_ids, &self.config.policies);
        for warning in &report.warnings {
            warn!("{}", warning);
        }
        if !report.is_ok() {
            return Err(BuildError::Validation(report));
        }

        Ok(PipelineResult { ministers, report })
    }
}
