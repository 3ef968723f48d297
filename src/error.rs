use crate::fields::Key;

/// Reasons a calendar date/time token can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateTokenError {
    #[error("expected 8, 15 or 16 characters, got {0}")]
    Length(usize),

    #[error("expected a digit at position {0}")]
    NotDigit(usize),

    #[error("expected 'T' between date and time")]
    Separator,

    #[error("unrecognized suffix, only 'Z' is allowed")]
    Suffix,

    #[error("no such calendar date or time of day")]
    OutOfRange,
}

/// Error produced while parsing rule text.
///
/// Parsing stops at the first offending part, no partial rule is ever
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("malformed rule part '{part}', expected KEY=VALUE")]
    MalformedPart { part: String },

    #[error("unknown rule part '{key}'")]
    UnknownKey { key: String },

    #[error("{key} given more than once")]
    DuplicateKey { key: Key },

    #[error("missing required FREQ")]
    MissingFrequency,

    #[error("unknown frequency '{value}'")]
    UnknownFrequency { value: String },

    #[error("{key}: malformed integer '{token}'")]
    MalformedInteger { key: Key, token: String },

    #[error("{key}: value '{token}' out of range")]
    OutOfRange { key: Key, token: String },

    #[error("BYDAY: malformed token '{token}'")]
    MalformedByDayToken { token: String },

    #[error("{key}: malformed date '{token}'")]
    MalformedDateToken {
        key: Key,
        token: String,
        #[source]
        source: DateTokenError,
    },

    #[error("BYMONTH, BYMONTHDAY and BYDAY cannot be combined in one rule")]
    UnsupportedCombination,
}
