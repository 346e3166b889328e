use std::fmt;

/// Failure of a write or lookup through the named parameter surface.
///
/// The render path has no error type: it falls back to bypass values instead.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamError {
    UnknownParameter(String),
    NotFinite { id: String, value: f64 },
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamError::UnknownParameter(id) => write!(f, "unknown parameter `{id}`"),
            ParamError::NotFinite { id, value } => {
                write!(f, "parameter `{id}` cannot be set to non-finite value {value}")
            }
        }
    }
}

impl std::error::Error for ParamError {}
