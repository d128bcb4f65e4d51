use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::id::ParticipantId;
use crate::port::outbound::solver::SolveError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Numerical failures of a valuation pass.
///
/// Every variant carries the member ids of the offending component so the
/// failure can be traced back to the holdings that produced it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValuationError {
    #[error("solve failed for component {}: {source}", format_ids(members))]
    SolveFailed {
        members: Vec<ParticipantId>,
        #[source]
        source: SolveError,
    },

    #[error(
        "non-finite net worth for participant {participant} in component {}",
        format_ids(members)
    )]
    NonFiniteSolution {
        members: Vec<ParticipantId>,
        participant: ParticipantId,
    },
}

/// Render ids as `[1, 2, 3]`.
fn format_ids(ids: &[ParticipantId]) -> String {
    let joined: Vec<String> = ids.iter().map(ToString::to_string).collect();
    format!("[{}]", joined.join(", "))
}

impl ValuationError {
    /// Member ids of the component that failed.
    #[must_use]
    pub fn members(&self) -> &[ParticipantId] {
        match self {
            Self::SolveFailed { members, .. } | Self::NonFiniteSolution { members, .. } => members,
        }
    }
}

/// Failure taxonomy reported with every aborted pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Holdings graph violates an ownership invariant.
    DataInconsistency,
    /// A component system has no finite, well-defined solution.
    Numerical,
    /// Storage could not be read, written or committed.
    Storage,
    /// Anything else (configuration, runtime).
    Internal,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::DataInconsistency => "data_inconsistency",
            Self::Numerical => "numerical",
            Self::Storage => "storage",
            Self::Internal => "internal",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Valuation(#[from] ValuationError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}

impl Error {
    /// Classify this error for failure reporting.
    #[must_use]
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Domain(_) => FailureKind::DataInconsistency,
            Self::Valuation(_) => FailureKind::Numerical,
            Self::Connection(_) | Self::Database(_) | Self::Parse(_) => FailureKind::Storage,
            Self::Config(_) | Self::Json(_) | Self::Io(_) | Self::Runtime(_) => {
                FailureKind::Internal
            }
        }
    }

    /// Participant ids involved in the failure, if known.
    #[must_use]
    pub fn participants(&self) -> Vec<ParticipantId> {
        match self {
            Self::Domain(e) => e.participants(),
            Self::Valuation(e) => e.members().to_vec(),
            _ => Vec::new(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::Database(err.to_string())
    }
}
