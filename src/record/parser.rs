//! Row parsers: the pluggable step that turns a raw line into a [`Record`].
//!
//! A [`RowParser`] owns the split-and-validate logic in its provided
//! [`RowParser::parse()`] method and exposes one override point per column
//! (plus the derived id and parent). Every override defaults to the identity,
//! so a variant only implements the columns it post-processes.
//!
//! Two named variants ship with the crate:
//!
//! - [`Standard`], which keeps every column as written.
//! - [`Lookup`], which remaps feature ids and parent ids through a lookup
//!   table.
//!
//! [`Variant`] selects one of them by name.

use std::collections::HashMap;
use std::io;
use std::io::BufRead;
use std::str::FromStr;

use crate::handler::HandlerChain;
use crate::line::COMMENT_MARKER;
use crate::line::DELIMITER;
use crate::record;
use crate::record::Attributes;
use crate::record::ParseError;
use crate::record::Record;
use crate::record::Score;
use crate::record::Strand;
use crate::record::NUM_FIELDS;

/// The separator between multiple parents of one feature.
const PARENT_SEPARATOR: char = ',';

/// The name of the [`Standard`] variant.
pub const STANDARD: &str = "standard";

/// The name of the [`Lookup`] variant.
pub const LOOKUP: &str = "lookup";

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error raised while configuring a row parser variant.
#[derive(Debug)]
pub enum Error {
    /// No variant has the requested name.
    UnknownVariant(String),

    /// The lookup variant was requested without a lookup table.
    MissingLookupTable,

    /// A lookup table was provided to a variant that does not use one.
    UnexpectedLookupTable(String),

    /// The lookup table has no entries.
    EmptyLookupTable,

    /// The lookup table has an entry with a blank key.
    BlankLookupKey,

    /// A line of a lookup table did not have exactly two columns.
    MalformedLookupLine(usize, String),

    /// An I/O error while reading a lookup table.
    Io(io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownVariant(name) => write!(
                f,
                "invalid variant: unknown variant \"{name}\" (expected \"{STANDARD}\" or \
                 \"{LOOKUP}\")"
            ),
            Error::MissingLookupTable => {
                write!(f, "invalid variant: the {LOOKUP} variant needs a lookup table")
            }
            Error::UnexpectedLookupTable(name) => write!(
                f,
                "invalid variant: the {name} variant does not take a lookup table"
            ),
            Error::EmptyLookupTable => write!(f, "invalid variant: empty lookup table"),
            Error::BlankLookupKey => {
                write!(f, "invalid variant: blank key in lookup table")
            }
            Error::MalformedLookupLine(line_no, line) => write!(
                f,
                "invalid variant: expected two tab-separated columns in lookup table: line \
                 {line_no}: {line}"
            ),
            Error::Io(err) => write!(f, "i/o error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

////////////////////////////////////////////////////////////////////////////////////////
// Row parsers
////////////////////////////////////////////////////////////////////////////////////////

/// A parser from a raw feature line to a [`Record`].
pub trait RowParser: std::fmt::Debug {
    /// Post-processes the sequence id.
    fn handle_seqid(&self, seqid: String) -> String {
        seqid
    }

    /// Post-processes the source.
    fn handle_source(&self, source: String) -> String {
        source
    }

    /// Post-processes the feature type.
    fn handle_type(&self, feature_type: String) -> String {
        feature_type
    }

    /// Post-processes the start position.
    fn handle_start(&self, start: u64) -> u64 {
        start
    }

    /// Post-processes the end position.
    fn handle_end(&self, end: u64) -> u64 {
        end
    }

    /// Post-processes the score.
    fn handle_score(&self, score: Score) -> Score {
        score
    }

    /// Post-processes the strand.
    fn handle_strand(&self, strand: Strand) -> Strand {
        strand
    }

    /// Post-processes the phase.
    fn handle_phase(&self, phase: String) -> String {
        phase
    }

    /// Post-processes the parsed attribute column.
    fn handle_attributes(&self, attributes: Attributes) -> Attributes {
        attributes
    }

    /// Post-processes the feature id, which is read from the attributes after
    /// [`RowParser::handle_attributes()`] has run.
    fn handle_id(&self, id: Option<String>) -> Option<String> {
        id
    }

    /// Post-processes the parent id(s), which are read from the attributes
    /// after [`RowParser::handle_attributes()`] has run.
    fn handle_parent(&self, parent: Option<String>) -> Option<String> {
        parent
    }

    /// Parses `raw` into a [`Record`].
    ///
    /// `handlers` runs over the raw text first. Its output must split into
    /// exactly nine tab-separated fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use genegroup::handler::Handler;
    /// use genegroup::handler::HandlerChain;
    /// use genegroup::record::parser::RowParser as _;
    /// use genegroup::record::parser::Standard;
    ///
    /// let mut handlers = HandlerChain::default();
    /// handlers.push(Handler::lowercase());
    ///
    /// let record = Standard.parse("Chr1\t.\tmRNA\t1\t9\t.\t+\t.\tID=RNA-A", &handlers)?;
    /// assert_eq!(record.raw(), "Chr1\t.\tmRNA\t1\t9\t.\t+\t.\tID=RNA-A");
    /// assert_eq!(record.seqid(), "chr1");
    /// assert_eq!(record.id(), Some("rna-a"));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    fn parse(&self, raw: &str, handlers: &HandlerChain) -> Result<Record, record::Error> {
        let line = handlers.apply(raw);
        let invalid = |err: ParseError| record::Error::Parse(err, line.to_string());

        let fields = line.split(DELIMITER).collect::<Vec<_>>();
        if fields.len() != NUM_FIELDS {
            return Err(invalid(ParseError::IncorrectNumberOfFields(fields.len())));
        }

        let start = fields[3]
            .parse::<u64>()
            .map_err(|err| invalid(ParseError::InvalidStart(err)))?;
        let end = fields[4]
            .parse::<u64>()
            .map_err(|err| invalid(ParseError::InvalidEnd(err)))?;
        let strand = fields[6]
            .parse::<Strand>()
            .map_err(|err| invalid(ParseError::InvalidStrand(err)))?;
        let attributes = fields[8]
            .parse::<Attributes>()
            .map_err(|err| invalid(ParseError::InvalidAttributes(err)))?;

        let attributes = self.handle_attributes(attributes);
        let id = self.handle_id(attributes.id().map(String::from));
        let parent = self.handle_parent(attributes.parent().map(String::from));

        Ok(Record {
            raw: raw.to_string(),
            seqid: self.handle_seqid(fields[0].to_string()),
            source: self.handle_source(fields[1].to_string()),
            feature_type: self.handle_type(fields[2].to_string()),
            start: self.handle_start(start),
            end: self.handle_end(end),
            score: self.handle_score(Score::from(fields[5])),
            strand: self.handle_strand(strand),
            phase: self.handle_phase(fields[7].to_string()),
            attributes,
            id,
            parent,
        })
    }
}

impl<P> RowParser for Box<P>
where
    P: RowParser + ?Sized,
{
    fn handle_seqid(&self, seqid: String) -> String {
        (**self).handle_seqid(seqid)
    }

    fn handle_source(&self, source: String) -> String {
        (**self).handle_source(source)
    }

    fn handle_type(&self, feature_type: String) -> String {
        (**self).handle_type(feature_type)
    }

    fn handle_start(&self, start: u64) -> u64 {
        (**self).handle_start(start)
    }

    fn handle_end(&self, end: u64) -> u64 {
        (**self).handle_end(end)
    }

    fn handle_score(&self, score: Score) -> Score {
        (**self).handle_score(score)
    }

    fn handle_strand(&self, strand: Strand) -> Strand {
        (**self).handle_strand(strand)
    }

    fn handle_phase(&self, phase: String) -> String {
        (**self).handle_phase(phase)
    }

    fn handle_attributes(&self, attributes: Attributes) -> Attributes {
        (**self).handle_attributes(attributes)
    }

    fn handle_id(&self, id: Option<String>) -> Option<String> {
        (**self).handle_id(id)
    }

    fn handle_parent(&self, parent: Option<String>) -> Option<String> {
        (**self).handle_parent(parent)
    }

    fn parse(&self, raw: &str, handlers: &HandlerChain) -> Result<Record, record::Error> {
        (**self).parse(raw, handlers)
    }
}

/// The row parser that keeps every column as written.
#[derive(Clone, Copy, Debug, Default)]
pub struct Standard;

impl RowParser for Standard {}

/// The row parser that remaps feature ids and parent ids through a lookup
/// table.
///
/// Keys are matched case-insensitively. Ids that are not in the table are
/// kept as written. Each comma-separated parent is remapped on its own.
#[derive(Clone, Debug)]
pub struct Lookup {
    /// The table, keyed by lowercased id.
    table: HashMap<String, String>,
}

impl Lookup {
    /// Attempts to create a new [`Lookup`] from `(from, to)` pairs.
    ///
    /// # Examples
    ///
    /// ```
    /// use genegroup::record::parser::Lookup;
    /// use genegroup::record::parser::RowParser as _;
    ///
    /// let lookup = Lookup::try_new([(String::from("gene-A"), String::from("BRCA2"))])?;
    /// assert_eq!(lookup.handle_id(Some(String::from("GENE-A"))), Some(String::from("BRCA2")));
    /// assert_eq!(lookup.handle_id(Some(String::from("gene-B"))), Some(String::from("gene-B")));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_new<I>(pairs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut table = HashMap::new();

        for (from, to) in pairs {
            if from.trim().is_empty() {
                return Err(Error::BlankLookupKey);
            }

            table.insert(from.to_lowercase(), to);
        }

        if table.is_empty() {
            return Err(Error::EmptyLookupTable);
        }

        Ok(Self { table })
    }

    /// Attempts to read a [`Lookup`] from two tab-separated columns (`from`
    /// and `to`). Blank lines and comment lines are skipped.
    pub fn from_reader<R>(reader: R) -> Result<Self, Error>
    where
        R: BufRead,
    {
        let mut pairs = Vec::new();

        for (i, result) in reader.lines().enumerate() {
            let line = result.map_err(Error::Io)?;

            if line.trim().is_empty() || line.starts_with(COMMENT_MARKER) {
                continue;
            }

            match line.split(DELIMITER).collect::<Vec<_>>()[..] {
                [from, to] => pairs.push((from.to_string(), to.to_string())),
                _ => return Err(Error::MalformedLookupLine(i + 1, line.clone())),
            }
        }

        Self::try_new(pairs)
    }

    /// Remaps a single id.
    fn remap(&self, id: &str) -> String {
        self.table
            .get(&id.to_lowercase())
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }
}

impl RowParser for Lookup {
    fn handle_id(&self, id: Option<String>) -> Option<String> {
        id.map(|id| self.remap(&id))
    }

    fn handle_parent(&self, parent: Option<String>) -> Option<String> {
        parent.map(|parent| {
            parent
                .split(PARENT_SEPARATOR)
                .map(|id| self.remap(id))
                .collect::<Vec<_>>()
                .join(&PARENT_SEPARATOR.to_string())
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Variants
////////////////////////////////////////////////////////////////////////////////////////

/// A named row parser variant.
#[derive(Clone, Debug)]
pub enum Variant {
    /// The [`Standard`] variant.
    Standard(Standard),

    /// The [`Lookup`] variant.
    Lookup(Lookup),
}

impl Variant {
    /// Attempts to select the variant called `name`.
    ///
    /// The check happens here, at configuration time: an unknown name, a
    /// lookup variant without a table or a table handed to a variant that
    /// does not use one are all rejected before any line is parsed.
    ///
    /// # Examples
    ///
    /// ```
    /// use genegroup::record::parser::Variant;
    ///
    /// let variant = Variant::try_from_name("standard", None)?;
    /// assert_eq!(variant.name(), "standard");
    ///
    /// let err = Variant::try_from_name("lookup", None).unwrap_err();
    /// assert_eq!(err.to_string(), "invalid variant: the lookup variant needs a lookup table");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_from_name(name: &str, table: Option<Lookup>) -> Result<Self, Error> {
        match (name.to_lowercase().as_str(), table) {
            (STANDARD, None) => Ok(Variant::Standard(Standard)),
            (STANDARD, Some(_)) => Err(Error::UnexpectedLookupTable(STANDARD.into())),
            (LOOKUP, Some(table)) => Ok(Variant::Lookup(table)),
            (LOOKUP, None) => Err(Error::MissingLookupTable),
            _ => Err(Error::UnknownVariant(name.into())),
        }
    }

    /// Gets the name of the variant.
    pub fn name(&self) -> &'static str {
        match self {
            Variant::Standard(_) => STANDARD,
            Variant::Lookup(_) => LOOKUP,
        }
    }

    /// Consumes `self` and returns the row parser it selects.
    pub fn into_parser(self) -> Box<dyn RowParser> {
        match self {
            Variant::Standard(parser) => Box::new(parser),
            Variant::Lookup(parser) => Box::new(parser),
        }
    }
}

impl Default for Variant {
    fn default() -> Self {
        Variant::Standard(Standard)
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from_name(s, None)
    }
}
