//! A feature record.

pub mod attributes;
pub mod feature_type;
pub mod parser;
pub mod strand;

use std::num::ParseIntError;
use std::str::FromStr;

pub use attributes::Attributes;
pub use strand::Strand;

use crate::handler::HandlerChain;
use crate::line::DELIMITER;
use crate::record::parser::RowParser;
use crate::record::parser::Standard;

/// The number of expected fields in a feature line.
pub const NUM_FIELDS: usize = 9;

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error associated with parsing a feature line.
#[derive(Debug)]
pub enum ParseError {
    /// An incorrect number of fields in the line.
    IncorrectNumberOfFields(usize),

    /// An invalid start position.
    InvalidStart(ParseIntError),

    /// An invalid end position.
    InvalidEnd(ParseIntError),

    /// An invalid strand.
    InvalidStrand(strand::ParseError),

    /// An invalid attribute column.
    InvalidAttributes(attributes::ParseError),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::IncorrectNumberOfFields(fields) => write!(
                f,
                "invalid number of fields: expected {NUM_FIELDS} fields, found {fields} fields"
            ),
            ParseError::InvalidStart(err) => write!(f, "invalid start: {err}"),
            ParseError::InvalidEnd(err) => write!(f, "invalid end: {err}"),
            ParseError::InvalidStrand(err) => write!(f, "invalid strand: {err}"),
            ParseError::InvalidAttributes(err) => write!(f, "invalid attributes: {err}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// An error related to a [`Record`].
#[derive(Debug)]
pub enum Error {
    /// A parse error along with the offending line.
    Parse(ParseError, String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Parse(err, line) => write!(f, "invalid record: {err}\n\nline: {line}"),
        }
    }
}

impl std::error::Error for Error {}

////////////////////////////////////////////////////////////////////////////////////////
// Score
////////////////////////////////////////////////////////////////////////////////////////

/// The score of a feature.
///
/// The score is kept exactly as written so that a record renders back to the
/// same text. A numeric view is available through [`Score::value()`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Score(String);

impl Score {
    /// Gets the score as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Gets the numeric value of the score, if it has one.
    ///
    /// # Examples
    ///
    /// ```
    /// use genegroup::record::Score;
    ///
    /// assert_eq!(Score::from("0.5").value(), Some(0.5));
    /// assert_eq!(Score::from(".").value(), None);
    /// ```
    pub fn value(&self) -> Option<f64> {
        self.0.parse().ok()
    }
}

impl From<&str> for Score {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Record
////////////////////////////////////////////////////////////////////////////////////////

/// A single feature line of a GFF3 file.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// The line as it was read, before any handler ran.
    raw: String,

    /// The sequence id.
    seqid: String,

    /// The source.
    source: String,

    /// The feature type.
    feature_type: String,

    /// The start position.
    start: u64,

    /// The end position.
    end: u64,

    /// The score.
    score: Score,

    /// The strand.
    strand: Strand,

    /// The phase.
    phase: String,

    /// The attributes.
    attributes: Attributes,

    /// The feature id.
    id: Option<String>,

    /// The parent feature id(s).
    parent: Option<String>,
}

impl Record {
    /// Gets the line as it was read.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Gets the sequence id.
    pub fn seqid(&self) -> &str {
        &self.seqid
    }

    /// Gets the source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Gets the feature type.
    ///
    /// # Examples
    ///
    /// ```
    /// use genegroup::record::Record;
    ///
    /// let record = "chr1\tRefSeq\tmRNA\t1\t90\t.\t+\t.\tID=rna-A".parse::<Record>()?;
    /// assert_eq!(record.feature_type(), "mRNA");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn feature_type(&self) -> &str {
        &self.feature_type
    }

    /// Returns whether the feature type equals `feature_type`, ignoring case.
    pub fn is_type(&self, feature_type: &str) -> bool {
        self.feature_type.to_lowercase() == feature_type.to_lowercase()
    }

    /// Gets the start position.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Gets the end position.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Gets the score.
    pub fn score(&self) -> &Score {
        &self.score
    }

    /// Gets the strand.
    pub fn strand(&self) -> Strand {
        self.strand
    }

    /// Gets the phase.
    pub fn phase(&self) -> &str {
        &self.phase
    }

    /// Gets the attributes.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Gets the feature id.
    ///
    /// # Examples
    ///
    /// ```
    /// use genegroup::record::Record;
    ///
    /// let record = "chr1\t.\tCDS\t1\t9\t.\t+\t0\tID=cds-B1;Parent=rna-B".parse::<Record>()?;
    /// assert_eq!(record.id(), Some("cds-B1"));
    /// assert_eq!(record.parent(), Some("rna-B"));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Gets the parent feature id(s).
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }
}

impl FromStr for Record {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Standard.parse(s, &HandlerChain::default())
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}\
             {DELIMITER}{}{DELIMITER}{}",
            self.seqid,
            self.source,
            self.feature_type,
            self.start,
            self.end,
            self.score,
            self.strand,
            self.phase,
            self.attributes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() -> Result<(), Box<dyn std::error::Error>> {
        let line = "NC_1.1\tGnomon\tCDS\t120\t380\t0.87\t-\t2\tID=cds-XP_1.1;Parent=rna-XM_1.1";
        let record = line.parse::<Record>()?;

        assert_eq!(record.raw(), line);
        assert_eq!(record.seqid(), "NC_1.1");
        assert_eq!(record.source(), "Gnomon");
        assert_eq!(record.feature_type(), "CDS");
        assert_eq!(record.start(), 120);
        assert_eq!(record.end(), 380);
        assert_eq!(record.score().as_str(), "0.87");
        assert_eq!(record.score().value(), Some(0.87));
        assert_eq!(record.strand(), Strand::Negative);
        assert_eq!(record.phase(), "2");
        assert_eq!(record.id(), Some("cds-XP_1.1"));
        assert_eq!(record.parent(), Some("rna-XM_1.1"));

        Ok(())
    }

    #[test]
    fn display_reparses_to_the_same_fields() -> Result<(), Box<dyn std::error::Error>> {
        let lines = [
            "chr1\tRefSeq\tgene\t1\t1000\t.\t+\t.\tID=gene-A;Name=A",
            "chr1\tRefSeq\texon\t1\t90\t12\t?\t.\tParent=rna-A",
            "chr2\t.\tregion\t1\t5000\t.\t.\t.\t.",
        ];

        for line in lines {
            let record = line.parse::<Record>()?;
            let reparsed = record.to_string().parse::<Record>()?;

            assert_eq!(record.seqid(), reparsed.seqid());
            assert_eq!(record.source(), reparsed.source());
            assert_eq!(record.feature_type(), reparsed.feature_type());
            assert_eq!(record.start(), reparsed.start());
            assert_eq!(record.end(), reparsed.end());
            assert_eq!(record.score(), reparsed.score());
            assert_eq!(record.strand(), reparsed.strand());
            assert_eq!(record.phase(), reparsed.phase());
            assert_eq!(record.attributes(), reparsed.attributes());
            assert_eq!(record.id(), reparsed.id());
            assert_eq!(record.parent(), reparsed.parent());
        }

        Ok(())
    }

    #[test]
    fn display_lowercases_attribute_keys() -> Result<(), Box<dyn std::error::Error>> {
        let record = "chr1\t.\tmRNA\t1\t9\t.\t+\t.\tID=rna-A;Parent=gene-A".parse::<Record>()?;
        assert_eq!(
            record.to_string(),
            "chr1\t.\tmRNA\t1\t9\t.\t+\t.\tid=rna-A;parent=gene-A"
        );
        Ok(())
    }

    #[test]
    fn type_comparison_ignores_case() -> Result<(), Box<dyn std::error::Error>> {
        let record = "chr1\t.\tmRNA\t1\t9\t.\t+\t.\tID=rna-A".parse::<Record>()?;
        assert!(record.is_type("mrna"));
        assert!(record.is_type("MRNA"));
        assert!(!record.is_type("gene"));
        Ok(())
    }

    #[test]
    fn invalid_number_of_fields() {
        let err = "chr1\t.\tgene\t1\t9\t.\t+\t.".parse::<Record>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid record: invalid number of fields: expected 9 fields, found 8 fields\n\n\
             line: chr1\t.\tgene\t1\t9\t.\t+\t."
        );

        let err = "chr1\t.\tgene\t1\t9\t.\t+\t.\tID=a\textra"
            .parse::<Record>()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(ParseError::IncorrectNumberOfFields(10), _)
        ));
    }

    #[test]
    fn invalid_positions_and_strand() {
        let err = "chr1\t.\tgene\tone\t9\t.\t+\t.\tID=a".parse::<Record>().unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::InvalidStart(_), _)));

        let err = "chr1\t.\tgene\t1\t?\t.\t+\t.\tID=a".parse::<Record>().unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::InvalidEnd(_), _)));

        let err = "chr1\t.\tgene\t1\t9\t.\tx\t.\tID=a".parse::<Record>().unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::InvalidStrand(_), _)));
    }

    #[test]
    fn invalid_attributes() {
        let err = "chr1\t.\tgene\t1\t9\t.\t+\t.\tID=a;broken"
            .parse::<Record>()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(ParseError::InvalidAttributes(_), _)
        ));
    }
}
