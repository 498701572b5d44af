use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use super::assemble::UnresolvedLink;
use crate::config::{JoinPolicy, Relation, RelationPolicies};
use crate::domain::Minister;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Blocking data-quality violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    DuplicateId { id: String },
    MissingName { id: String },
    DanglingDelegate { minister_id: String, delegate_id: String },
    UnresolvedReference(UnresolvedLink),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateId { id } => write!(f, "ID dupliqué: {id}"),
            ValidationError::MissingName { id } => write!(f, "Ministre {id} sans nom"),
            ValidationError::DanglingDelegate {
                minister_id,
                delegate_id,
            } => write!(f, "Delegate {delegate_id} inexistant pour {minister_id}"),
            ValidationError::UnresolvedReference(link) => write!(
                f,
                "Référence inexistante ({}) dans {} ligne {}: {}",
                link.relation, link.table, link.line, link.reference
            ),
        }
    }
}

/// Non-blocking finding, logged only
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    MultiplePrimaries { id: String, count: usize },
    EmptyPortfolio { id: String },
    InvalidEmail { id: String, email: String },
    UnknownSuperior { id: String, superior_id: String },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::MultiplePrimaries { id, count } => {
                write!(f, "Ministre {id} avec {count} ministères primaires")
            }
            ValidationWarning::EmptyPortfolio { id } => write!(f, "Ministre {id}: 'portfolio' vide"),
            ValidationWarning::InvalidEmail { id, email } => {
                write!(f, "Ministre {id}: email invalide \"{email}\"")
            }
            ValidationWarning::UnknownSuperior { id, superior_id } => {
                write!(f, "Ministre {id}: supérieur {superior_id} inexistant")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// State threaded through the validation fold
#[derive(Debug, Default)]
pub struct ValidationState {
    seen: HashSet<String>,
    errors: Vec<ValidationError>,
}

impl ValidationState {
    /// Check one minister against the ids seen so far, then record its id.
    ///
    /// A delegate must belong to a minister earlier in the sequence; a
    /// later one counts as inexistant.
    pub fn visit(mut self, minister: &Minister, check_delegates: bool) -> Self {
        if self.seen.contains(&minister.id) {
            self.errors.push(ValidationError::DuplicateId {
                id: minister.id.clone(),
            });
        }
        self.seen.insert(minister.id.clone());

        if !minister.has_name() {
            self.errors.push(ValidationError::MissingName {
                id: minister.id.clone(),
            });
        }

        if check_delegates {
            for delegate_id in &minister.delegates {
                if !self.seen.contains(delegate_id) {
                    self.errors.push(ValidationError::DanglingDelegate {
                        minister_id: minister.id.clone(),
                        delegate_id: delegate_id.clone(),
                    });
                }
            }
        }
        self
    }
}

/// Validate the final minister sequence. Never fails; the report says
/// whether output may be written.
///
/// `shared_ids` are minister ids that a non-minister person row reuses;
/// each one is a duplicate id.
pub fn validate(
    ministers: &[Minister],
    unresolved: &[UnresolvedLink],
    shared_ids: &[String],
    policies: &RelationPolicies,
) -> ValidationReport {
    let check_delegates = policies.policy(Relation::Delegates) == JoinPolicy::Validate;
    let state = ministers
        .iter()
        .fold(ValidationState::default(), |state, minister| {
            state.visit(minister, check_delegates)
        });

    let mut errors = state.errors;
    errors.extend(
        shared_ids
            .iter()
            .map(|id| ValidationError::DuplicateId { id: id.clone() }),
    );
    errors.extend(
        unresolved
            .iter()
            .filter(|link| policies.policy(link.relation) == JoinPolicy::Validate)
            .cloned()
            .map(ValidationError::UnresolvedReference),
    );

    ValidationReport {
        errors,
        warnings: warnings(ministers, &state.seen),
    }
}

fn warnings(ministers: &[Minister], ids: &HashSet<String>) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    for minister in ministers {
        let id = &minister.id;
        let primaries = minister.ministries.iter().filter(|m| m.is_primary).count();
        if primaries > 1 {
            warnings.push(ValidationWarning::MultiplePrimaries {
                id: id.clone(),
                count: primaries,
            });
        }
        if minister.portfolio.trim().is_empty() {
            warnings.push(ValidationWarning::EmptyPortfolio { id: id.clone() });
        }
        if !minister.email.is_empty() && !EMAIL_RE.is_match(&minister.email) {
            warnings.push(ValidationWarning::InvalidEmail {
                id: id.clone(),
                email: minister.email.clone(),
            });
        }
        if let Some(superior_id) = &minister.superior_id {
            if !ids.contains(superior_id) {
                warnings.push(ValidationWarning::UnknownSuperior {
                    id: id.clone(),
                    superior_id: superior_id.clone(),
                });
            }
        }
    }
    warnings
}
