use thiserror::Error;

use crate::resolver::UnknownFieldError;

/// A recognized operator applied to a field/value combination that has no
/// safe SQL translation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("operator `{operator}` is not supported here: {reason}")]
pub struct UnsupportedOperatorError {
    pub operator: String,
    pub reason: String,
}

impl UnsupportedOperatorError {
    pub fn new(operator: impl Into<String>, reason: impl Into<String>) -> Self {
        UnsupportedOperatorError {
            operator: operator.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlGenError {
    #[error(transparent)]
    UnknownField(#[from] UnknownFieldError),

    #[error(transparent)]
    UnsupportedOperator(#[from] UnsupportedOperatorError),

    #[error("unknown primary table `{0}`")]
    UnknownPrimaryTable(String),
}
