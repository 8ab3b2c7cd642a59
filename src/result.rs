//! The records selected by a query.

use std::io;
use std::io::Write;

use serde::Serialize;

use crate::record::Attributes;
use crate::record::Record;

/// The line that separates blocks in tabular output.
pub const BLOCK_SEPARATOR: &str = "###";

/// A record laid out for structured serialization.
#[derive(Clone, Debug, Serialize)]
pub struct StructuredRecord<'a> {
    /// The line as it was read.
    pub raw: &'a str,

    /// The sequence id.
    pub seqid: &'a str,

    /// The source.
    pub source: &'a str,

    /// The feature type.
    #[serde(rename = "type")]
    pub feature_type: &'a str,

    /// The score as written.
    pub score: &'a str,

    /// The start position.
    pub start: u64,

    /// The end position.
    pub end: u64,

    /// The strand symbol.
    pub strand: &'static str,

    /// The phase.
    pub phase: &'a str,

    /// The attributes.
    pub attrs: &'a Attributes,

    /// The feature id.
    pub id: Option<&'a str>,

    /// The parent feature id(s).
    pub parent: Option<&'a str>,
}

impl<'a> From<&'a Record> for StructuredRecord<'a> {
    fn from(record: &'a Record) -> Self {
        Self {
            raw: record.raw(),
            seqid: record.seqid(),
            source: record.source(),
            feature_type: record.feature_type(),
            score: record.score().as_str(),
            start: record.start(),
            end: record.end(),
            strand: record.strand().as_str(),
            phase: record.phase(),
            attrs: record.attributes(),
            id: record.id(),
            parent: record.parent(),
        }
    }
}

/// The records of every selected block, grouped by block in file order.
///
/// A block may be empty when a type filter removed all of its records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultSet(Vec<Vec<Record>>);

impl ResultSet {
    /// Creates a new [`ResultSet`].
    pub fn new(blocks: Vec<Vec<Record>>) -> Self {
        Self(blocks)
    }

    /// Gets the records, grouped by block.
    pub fn blocks(&self) -> &[Vec<Record>] {
        &self.0
    }

    /// Returns an iterator over every record across all blocks.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.0.iter().flatten()
    }

    /// Gets the number of blocks.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether there are no blocks.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes `self` and returns the records, grouped by block.
    pub fn into_inner(self) -> Vec<Vec<Record>> {
        self.0
    }

    /// Renders the records as tab-separated text.
    ///
    /// Each record is one line. Blocks are separated by a
    /// [`BLOCK_SEPARATOR`] line. Blocks without records are skipped, and no
    /// separator ever leads or trails the text.
    ///
    /// # Examples
    ///
    /// ```
    /// use genegroup::record::Record;
    /// use genegroup::result::ResultSet;
    ///
    /// let a = "chr1\t.\tgene\t1\t9\t.\t+\t.\tID=gene-A".parse::<Record>()?;
    /// let b = "chr1\t.\tgene\t20\t29\t.\t-\t.\tID=gene-B".parse::<Record>()?;
    ///
    /// let results = ResultSet::new(vec![vec![a], Vec::new(), vec![b]]);
    /// assert_eq!(
    ///     results.to_tabular(),
    ///     "chr1\t.\tgene\t1\t9\t.\t+\t.\tid=gene-A\n###\n\
    ///      chr1\t.\tgene\t20\t29\t.\t-\t.\tid=gene-B"
    /// );
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn to_tabular(&self) -> String {
        self.to_string()
    }

    /// Writes the tabular text, followed by a newline unless it is empty.
    pub fn write_tabular<W>(&self, mut writer: W) -> io::Result<()>
    where
        W: Write,
    {
        let text = self.to_tabular();

        if !text.is_empty() {
            writeln!(writer, "{text}")?;
        }

        writer.flush()
    }

    /// Lays the records out for structured serialization: one sequence per
    /// block, one object per record.
    pub fn to_structured(&self) -> Vec<Vec<StructuredRecord<'_>>> {
        self.0
            .iter()
            .map(|block| block.iter().map(StructuredRecord::from).collect())
            .collect()
    }

    /// Serializes the structured layout as JSON.
    ///
    /// # Examples
    ///
    /// ```
    /// use genegroup::record::Record;
    /// use genegroup::result::ResultSet;
    ///
    /// let record = "chr1\t.\tCDS\t1\t9\t.\t+\t0\tID=cds-A;Parent=rna-A".parse::<Record>()?;
    /// let results = ResultSet::new(vec![vec![record]]);
    ///
    /// let json = results.to_json()?;
    /// assert!(json.starts_with(r#"[[{"raw":"chr1\t.\tCDS"#));
    /// assert!(json.contains(r#""type":"CDS""#));
    /// assert!(json.contains(r#""attrs":{"id":"cds-A","parent":"rna-A"}"#));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.to_structured())
    }

    /// Writes the structured layout as JSON.
    pub fn write_json<W>(&self, writer: W) -> serde_json::Result<()>
    where
        W: Write,
    {
        serde_json::to_writer(writer, &self.to_structured())
    }
}

impl std::fmt::Display for ResultSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let blocks = self.0.iter().filter(|block| !block.is_empty());

        for (i, block) in blocks.enumerate() {
            if i > 0 {
                writeln!(f)?;
                writeln!(f, "{BLOCK_SEPARATOR}")?;
            }

            for (j, record) in block.iter().enumerate() {
                if j > 0 {
                    writeln!(f)?;
                }

                write!(f, "{record}")?;
            }
        }

        Ok(())
    }
}

impl From<Vec<Vec<Record>>> for ResultSet {
    fn from(blocks: Vec<Vec<Record>>) -> Self {
        Self::new(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> Result<ResultSet, Box<dyn std::error::Error>> {
        let lines = [
            vec![
                "chr1\tRefSeq\tgene\t1\t100\t.\t+\t.\tID=gene-A",
                "chr1\tRefSeq\tmRNA\t1\t100\t0.5\t+\t.\tID=rna-A;Parent=gene-A",
            ],
            vec![],
            vec!["chr2\tRefSeq\tgene\t5\t50\t.\t-\t.\tID=gene-B;Name=B"],
        ];

        let blocks = lines
            .iter()
            .map(|block| {
                block
                    .iter()
                    .map(|line| line.parse::<Record>())
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<Vec<_>>, _>>()?;

        Ok(ResultSet::new(blocks))
    }

    #[test]
    fn tabular() -> Result<(), Box<dyn std::error::Error>> {
        let results = results()?;

        assert_eq!(
            results.to_tabular(),
            "chr1\tRefSeq\tgene\t1\t100\t.\t+\t.\tid=gene-A\n\
             chr1\tRefSeq\tmRNA\t1\t100\t0.5\t+\t.\tid=rna-A;parent=gene-A\n\
             ###\n\
             chr2\tRefSeq\tgene\t5\t50\t.\t-\t.\tid=gene-B;name=B"
        );

        let mut buffer = Vec::new();
        results.write_tabular(&mut buffer)?;
        assert_eq!(String::from_utf8(buffer)?, format!("{}\n", results.to_tabular()));

        Ok(())
    }

    #[test]
    fn empty_results_render_nothing() -> Result<(), Box<dyn std::error::Error>> {
        let results = ResultSet::new(vec![Vec::new(), Vec::new()]);
        assert_eq!(results.to_tabular(), "");

        let mut buffer = Vec::new();
        results.write_tabular(&mut buffer)?;
        assert!(buffer.is_empty());

        assert_eq!(results.to_json()?, "[[],[]]");
        Ok(())
    }

    #[test]
    fn structured() -> Result<(), Box<dyn std::error::Error>> {
        let results = results()?;
        let structured = results.to_structured();

        assert_eq!(structured.len(), 3);
        assert!(structured[1].is_empty());

        let rna = &structured[0][1];
        assert_eq!(rna.feature_type, "mRNA");
        assert_eq!(rna.score, "0.5");
        assert_eq!(rna.strand, "+");
        assert_eq!(rna.id, Some("rna-A"));
        assert_eq!(rna.parent, Some("gene-A"));

        let value = serde_json::to_value(&structured)?;
        assert_eq!(value[2][0]["type"], "gene");
        assert_eq!(value[2][0]["start"], 5);
        assert_eq!(value[2][0]["strand"], "-");
        assert_eq!(value[2][0]["attrs"]["name"], "B");
        assert_eq!(value[2][0]["parent"], serde_json::Value::Null);
        assert_eq!(
            value[2][0]["raw"],
            "chr2\tRefSeq\tgene\t5\t50\t.\t-\t.\tID=gene-B;Name=B"
        );

        let mut buffer = Vec::new();
        results.write_json(&mut buffer)?;
        assert_eq!(String::from_utf8(buffer)?, results.to_json()?);

        Ok(())
    }
}
