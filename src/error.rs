//! @acp:module "Errors"
//! @acp:summary "Error types for rule resolution and repository integrity"
//! @acp:domain symbology
//! @acp:layer model
//!
//! Feature-level data problems never surface here: conditional procedures
//! recover locally with documented defaults. The variants below describe a
//! corrupt or mismatched rule repository and abort the load that produced it.

use thiserror::Error;

/// @acp:summary "Errors raised by the symbology engine"
#[derive(Debug, Error)]
pub enum SymbologyError {
    /// A look-up rule references more than one conditional procedure
    #[error("rule {rule} for class {class} calls conditional symbology {count} times")]
    MultipleConditionalCalls {
        class: String,
        rule: usize,
        count: usize,
    },

    /// A `CS(...)` command names a procedure missing from the registry
    #[error("unknown conditional symbology procedure: {0}")]
    UnknownProcedure(String),

    /// A procedure documented to always emit a fragment returned nothing
    #[error("conditional procedure {procedure} returned no instructions for {class}")]
    EmptyProcedureOutput { procedure: String, class: String },

    /// A conditional fragment itself requested conditional symbology
    #[error("conditional procedure {0} emitted a nested CS call")]
    NestedConditionalCall(String),

    /// Registration of a procedure or alias under an existing name
    #[error("procedure name already registered: {0}")]
    DuplicateProcedure(String),

    /// Alias pointing at a name that is not registered
    #[error("alias {alias} targets unregistered procedure {target}")]
    DanglingAlias { alias: String, target: String },

    /// Feature id not present in the arena
    #[error("unknown feature id: {0}")]
    UnknownFeature(u64),

    #[error("invalid priority override payload: {0}")]
    InvalidPriorityOverride(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl SymbologyError {
    /// Whether the error invalidates the whole repository load
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SymbologyError::MultipleConditionalCalls { .. }
                | SymbologyError::UnknownProcedure(_)
                | SymbologyError::EmptyProcedureOutput { .. }
                | SymbologyError::NestedConditionalCall(_)
                | SymbologyError::DuplicateProcedure(_)
                | SymbologyError::DanglingAlias { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SymbologyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrity_errors_are_fatal() {
        assert!(SymbologyError::UnknownProcedure("XXXXXX01".into()).is_fatal());
        assert!(SymbologyError::EmptyProcedureOutput {
            procedure: "DEPARE02".into(),
            class: "DEPARE".into(),
        }
        .is_fatal());
        assert!(!SymbologyError::UnknownFeature(3).is_fatal());
    }

    #[test]
    fn test_error_messages() {
        let err = SymbologyError::MultipleConditionalCalls {
            class: "LIGHTS".into(),
            rule: 2,
            count: 2,
        };
        assert_eq!(
            err.to_string(),
            "rule 2 for class LIGHTS calls conditional symbology 2 times"
        );
    }
}
