use thiserror::Error;

/// Returned by the boundary parsers when an external caller supplies an
/// unknown enum name. Core state mutators only ever see pre-validated
/// values, so this never originates inside the tick loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} '{value}'; valid options: {valid}")]
pub struct InvalidSelector {
    kind: &'static str,
    value: String,
    valid: String,
}

impl InvalidSelector {
    pub fn new<I>(kind: &'static str, value: &str, valid: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        InvalidSelector {
            kind,
            value: value.to_string(),
            valid: valid.into_iter().collect::<Vec<_>>().join(", "),
        }
    }
}
