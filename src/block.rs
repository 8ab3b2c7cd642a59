//! Gene-rooted blocks of feature lines.

pub mod blocks;
pub mod builder;

pub use blocks::Blocks;
pub use builder::Builder;
use nonempty::NonEmpty;

use crate::handler::HandlerChain;
use crate::line::Line;
use crate::pattern::IdPattern;
use crate::record;
use crate::record::parser::RowParser;
use crate::record::Record;

/// The separator placed between lines when a block is rendered as raw text.
const LINE_SEPARATOR: &str = "\n";

/// A block: a gene line followed by every feature line up to (but excluding)
/// the next gene line.
///
/// The first block of a file may not start with a gene line if the file has
/// feature lines before its first gene. Blocks are produced fresh by every
/// scan. Only their ordinal is ever persisted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Block {
    /// The zero-based position of the block within the scan.
    ordinal: usize,

    /// The raw feature lines.
    lines: NonEmpty<String>,
}

impl Block {
    /// Gets the ordinal of the block.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Gets the raw feature lines of the block.
    ///
    /// # Examples
    ///
    /// ```
    /// use genegroup::block::Builder;
    ///
    /// let block = Builder::new(0, "chr1\t.\tgene\t1\t9\t.\t+\t.\tID=gene-A")
    ///     .push_line("chr1\t.\tmRNA\t1\t9\t.\t+\t.\tID=rna-A;Parent=gene-A")
    ///     .build();
    ///
    /// assert_eq!(block.lines().len(), 2);
    /// assert_eq!(block.lines().first(), "chr1\t.\tgene\t1\t9\t.\t+\t.\tID=gene-A");
    /// ```
    pub fn lines(&self) -> &NonEmpty<String> {
        &self.lines
    }

    /// Returns whether the block opens with a gene line.
    pub fn is_gene_rooted(&self) -> bool {
        matches!(Line::from(self.lines.first().as_str()), Line::Gene(_))
    }

    /// Gets the raw text of the block, lines joined by newlines.
    pub fn raw(&self) -> String {
        self.lines
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(LINE_SEPARATOR)
    }

    /// Gets every (lowercased) id that `pattern` finds in the block.
    ///
    /// # Examples
    ///
    /// ```
    /// use genegroup::block::Builder;
    /// use genegroup::IdPattern;
    ///
    /// let block = Builder::new(0, "chr1\t.\tgene\t1\t9\t.\t+\t.\tID=gene-A")
    ///     .push_line("chr1\t.\tCDS\t1\t9\t.\t+\t0\tID=CDS-A1;Parent=gene-A")
    ///     .build();
    ///
    /// assert_eq!(block.ids(&IdPattern::default()), vec!["gene-a", "cds-a1"]);
    /// ```
    pub fn ids(&self, pattern: &IdPattern) -> Vec<String> {
        pattern.extract(&self.raw()).collect()
    }

    /// Materializes every line of the block into a [`Record`].
    ///
    /// Each line is passed through `handlers` and then parsed by `parser`.
    /// The first line that fails to parse aborts materialization.
    ///
    /// # Examples
    ///
    /// ```
    /// use genegroup::block::Builder;
    /// use genegroup::handler::HandlerChain;
    /// use genegroup::record::parser::Standard;
    ///
    /// let block = Builder::new(0, "chr1\t.\tgene\t1\t9\t.\t+\t.\tID=gene-A")
    ///     .push_line("chr1\t.\tmRNA\t1\t9\t.\t+\t.\tID=rna-A;Parent=gene-A")
    ///     .build();
    ///
    /// let records = block.records(&Standard, &HandlerChain::default())?;
    /// assert_eq!(records.len(), 2);
    /// assert_eq!(records[1].parent(), Some("gene-A"));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn records<P>(
        &self,
        parser: &P,
        handlers: &HandlerChain,
    ) -> Result<Vec<Record>, record::Error>
    where
        P: RowParser + ?Sized,
    {
        self.lines
            .iter()
            .map(|line| parser.parse(line, handlers))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::parser::Standard;

    #[test]
    fn degenerate_blocks_are_not_gene_rooted() {
        let block = Builder::new(0, "chr1\t.\tregion\t1\t900\t.\t+\t.\tID=chr1").build();
        assert!(!block.is_gene_rooted());

        let block = Builder::new(1, "chr1\t.\tgene\t1\t9\t.\t+\t.\tID=gene-A").build();
        assert!(block.is_gene_rooted());
    }

    #[test]
    fn raw_text_joins_lines() {
        let block = Builder::new(0, "a\tb")
            .push_line("c\td")
            .push_line("e\tf")
            .build();
        assert_eq!(block.raw(), "a\tb\nc\td\ne\tf");
    }

    #[test]
    fn materialization_fails_on_the_first_malformed_line() {
        let block = Builder::new(0, "chr1\t.\tgene\t1\t9\t.\t+\t.\tID=gene-A")
            .push_line("chr1\t.\tmRNA\t1\t9")
            .build();

        let err = block
            .records(&Standard, &HandlerChain::default())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid record: invalid number of fields: expected 9 fields, found 5 fields\n\n\
             line: chr1\t.\tmRNA\t1\t9"
        );
    }
}
