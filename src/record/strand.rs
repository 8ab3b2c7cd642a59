//! The strand upon which a feature is located.

use std::str::FromStr;

/// An error related to the parsing of a strand.
#[derive(Debug)]
pub enum ParseError {
    /// The value is not one of `+`, `-`, `.` or `?`.
    Invalid(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Invalid(value) => write!(f, "{value} is not a valid strand"),
        }
    }
}

impl std::error::Error for ParseError {}

/// The strand of a feature.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Strand {
    /// The positive strand (`+`).
    Positive,

    /// The negative strand (`-`).
    Negative,

    /// A feature that is not stranded (`.`).
    Unstranded,

    /// A stranded feature whose strand is unknown (`?`).
    Unknown,
}

impl Strand {
    /// Gets the symbol for the strand as it appears in a GFF3 file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strand::Positive => "+",
            Strand::Negative => "-",
            Strand::Unstranded => ".",
            Strand::Unknown => "?",
        }
    }
}

impl FromStr for Strand {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Self::Positive),
            "-" => Ok(Self::Negative),
            "." => Ok(Self::Unstranded),
            "?" => Ok(Self::Unknown),
            value => Err(ParseError::Invalid(value.into())),
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
