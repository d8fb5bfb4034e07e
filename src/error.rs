use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used across the crate.
pub type Result<T> = std::result::Result<T, SagErr>;

/// Errors produced when constructing or updating gradient aggregators and optimizers.
///
/// Every check runs before any mutation, so receiving one of these means the
/// value that reported it was left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SagErr {
    /// An argument is invalid for domain reasons (e.g. zero components).
    InvalidArgument(&'static str),

    /// An array's shape disagrees with the shape it has to match.
    ShapeMismatch {
        what: &'static str,
        got: Vec<usize>,
        expected: Vec<usize>,
    },

    /// A component index is outside `0..len`.
    IndexOutOfRange { index: usize, len: usize },
}

impl Display for SagErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SagErr::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            SagErr::ShapeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "shape mismatch for {what}: got {got:?}, expected {expected:?}"
            ),
            SagErr::IndexOutOfRange { index, len } => write!(
                f,
                "component index {index} is out of range for {len} components"
            ),
        }
    }
}

impl Error for SagErr {}
