//! The pattern used to pull feature ids out of a block.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

/// The default id pattern.
///
/// Matches the value of an `ID` attribute (in any case) up to the next `;`,
/// tab or line ending. The attribute must open the attribute column or follow
/// a `;`.
pub const DEFAULT_ID_PATTERN: &str = r"(?i)[\t;]ID=([^;\t\r\n]+)";

/// The compiled default id pattern.
static DEFAULT: LazyLock<Regex> = LazyLock::new(|| Regex::new(DEFAULT_ID_PATTERN).unwrap());

/// An error related to an [`IdPattern`].
#[derive(Debug)]
pub enum Error {
    /// The pattern is not a valid regular expression.
    InvalidRegex(regex::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidRegex(err) => write!(f, "invalid id pattern: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A pattern that extracts feature ids from the raw text of a block.
///
/// When the pattern has a capture group, the first group is the id.
/// Otherwise, the whole match is. Extracted ids are always lowercased.
#[derive(Clone, Debug)]
pub struct IdPattern(Regex);

impl IdPattern {
    /// Attempts to create a new [`IdPattern`].
    ///
    /// # Examples
    ///
    /// ```
    /// use genegroup::IdPattern;
    ///
    /// let pattern = IdPattern::try_new(r"Name=([^;\s]+)")?;
    /// let ids = pattern.extract("chr1\t.\tgene\t1\t2\t.\t+\t.\tName=BRCA2").collect::<Vec<_>>();
    /// assert_eq!(ids, vec![String::from("brca2")]);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_new(pattern: &str) -> Result<Self, Error> {
        Regex::new(pattern).map(Self).map_err(Error::InvalidRegex)
    }

    /// Gets the pattern as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Extracts every lowercased id from `text`, in order of appearance.
    ///
    /// # Examples
    ///
    /// ```
    /// use genegroup::IdPattern;
    ///
    /// let text = "chr1\t.\tgene\t1\t9\t.\t+\t.\tID=Gene-A;Name=A\n\
    ///             chr1\t.\tCDS\t1\t9\t.\t+\t0\tParent=gene-A;id=CDS-A1";
    ///
    /// let ids = IdPattern::default().extract(text).collect::<Vec<_>>();
    /// assert_eq!(ids, vec![String::from("gene-a"), String::from("cds-a1")]);
    /// ```
    pub fn extract<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        self.0.captures_iter(text).filter_map(|captures| {
            captures
                .get(1)
                .or_else(|| captures.get(0))
                .map(|m| m.as_str().to_lowercase())
        })
    }
}

impl Default for IdPattern {
    fn default() -> Self {
        Self(DEFAULT.clone())
    }
}

impl FromStr for IdPattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_new(s)
    }
}

impl std::fmt::Display for IdPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pattern_reads_id_values() {
        let text = "chr1\tRefSeq\tgene\t1\t100\t.\t+\t.\tID=gene-LOC1.2;Name=LOC1\n\
                    chr1\tRefSeq\tmRNA\t1\t100\t.\t+\t.\tID=rna-XM_1.1;Parent=gene-LOC1.2";

        let ids = IdPattern::default().extract(text).collect::<Vec<_>>();
        assert_eq!(ids, vec!["gene-loc1.2", "rna-xm_1.1"]);
    }

    #[test]
    fn default_pattern_reads_ids_at_the_end_of_the_column() {
        let ids = IdPattern::default()
            .extract("chr1\t.\texon\t1\t2\t.\t+\t.\tParent=rna-1;ID=exon-1")
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["exon-1"]);
    }

    #[test]
    fn default_pattern_ignores_suffixed_keys() {
        let ids = IdPattern::default()
            .extract("chr1\t.\tgene\t1\t2\t.\t+\t.\tgene_ID=g1;Dbxref_ID=x")
            .collect::<Vec<_>>();
        assert!(ids.is_empty());
    }

    #[test]
    fn patterns_without_groups_use_the_whole_match() -> Result<(), Box<dyn std::error::Error>> {
        let pattern = IdPattern::try_new(r"(?i)cds-\w+")?;
        let ids = pattern.extract("ID=CDS-x1;ID=cds-Y2").collect::<Vec<_>>();
        assert_eq!(ids, vec!["cds-x1", "cds-y2"]);
        Ok(())
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        let err = IdPattern::try_new("ID=(").unwrap_err();
        assert!(err.to_string().starts_with("invalid id pattern: "));
    }
}
