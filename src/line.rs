//! A line within a GFF3 file.

use crate::record::feature_type::GENE;

/// The delimiter between the columns of a feature line.
pub const DELIMITER: char = '\t';

/// The marker that flags a line as a comment or directive.
pub const COMMENT_MARKER: char = '#';

/// The zero-based index of the type column.
const TYPE_COLUMN: usize = 2;

/// A line within a GFF3 file, classified for block segmentation.
///
/// Classification only looks at the raw text: a feature line is not validated
/// here. Validation happens when a block is materialized into
/// [records](crate::record::Record).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Line {
    /// An empty (or whitespace-only) line.
    Empty,

    /// A line containing the comment marker anywhere within it.
    Comment(String),

    /// A feature line whose type column is exactly `gene`.
    Gene(String),

    /// Any other feature line.
    Feature(String),
}

impl Line {
    /// Gets the raw text of the line, if it carries any.
    ///
    /// # Examples
    ///
    /// ```
    /// use genegroup::Line;
    ///
    /// let line = Line::from("chr1\t.\tgene\t1\t10\t.\t+\t.\tID=a");
    /// assert_eq!(line.raw(), Some("chr1\t.\tgene\t1\t10\t.\t+\t.\tID=a"));
    /// assert_eq!(Line::from("").raw(), None);
    /// ```
    pub fn raw(&self) -> Option<&str> {
        match self {
            Line::Empty => None,
            Line::Comment(raw) | Line::Gene(raw) | Line::Feature(raw) => Some(raw),
        }
    }

    /// Returns whether the line is skipped during segmentation.
    pub fn is_skipped(&self) -> bool {
        matches!(self, Line::Empty | Line::Comment(_))
    }
}

impl From<&str> for Line {
    fn from(s: &str) -> Self {
        if s.trim().is_empty() {
            Line::Empty
        } else if s.contains(COMMENT_MARKER) {
            Line::Comment(s.into())
        } else if s.split(DELIMITER).nth(TYPE_COLUMN) == Some(GENE) {
            Line::Gene(s.into())
        } else {
            Line::Feature(s.into())
        }
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_gene_lines() {
        let line = Line::from("chr1\tRefSeq\tgene\t1\t100\t.\t+\t.\tID=gene-A");
        assert!(matches!(line, Line::Gene(_)));
    }

    #[test]
    fn classifies_feature_lines() {
        let line = Line::from("chr1\tRefSeq\tmRNA\t1\t100\t.\t+\t.\tID=rna-A;Parent=gene-A");
        assert!(matches!(line, Line::Feature(_)));
    }

    #[test]
    fn only_the_type_column_opens_a_block() {
        // `gene` in the source column and `pseudogene` in the type column are
        // both ordinary features.
        let line = Line::from("chr1\tgene\tCDS\t1\t100\t.\t+\t0\tID=cds-A");
        assert!(matches!(line, Line::Feature(_)));

        let line = Line::from("chr1\tRefSeq\tpseudogene\t1\t100\t.\t+\t.\tID=gene-P");
        assert!(matches!(line, Line::Feature(_)));
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert_eq!(Line::from(""), Line::Empty);
        assert_eq!(Line::from("  \t "), Line::Empty);
        assert!(Line::from("##gff-version 3").is_skipped());
        assert!(Line::from("###").is_skipped());
        assert!(Line::from("chr1\t.\tgene\t1\t2\t.\t+\t.\tNote=a#b").is_skipped());
    }
}
