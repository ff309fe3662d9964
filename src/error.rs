use thiserror::Error;

pub type Result<T> = std::result::Result<T, LinError>;

#[derive(Debug, Error)]
pub enum LinError {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("no value provided for variable `{0}`")]
    MissingValue(String),
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),
    #[error("segment index {index} is out of range for a formula with {len} segments")]
    IndexOutOfRange { index: isize, len: usize },
    #[error("coefficient and variable sequences must have the same length")]
    MismatchedSequences,
    #[error("recursive substitution did not converge; the bindings contain a cycle")]
    SubstitutionCycle,
    #[error("invalid operation: {0}")]
    Unsupported(String),
}
