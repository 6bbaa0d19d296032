use thiserror::Error;

/// A stored or transmitted string that does not name any variant of an enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    /// Which enum was being parsed (e.g. "severity").
    pub kind: &'static str,
    /// The offending string.
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
