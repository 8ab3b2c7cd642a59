//! Queries: extracting the gene blocks that hold a set of feature ids.
//!
//! A [`Query`] is configured and built through a [`Builder`]. Building runs
//! the first pass over the source (creating the ordinal index if it does not
//! exist yet) and resolves the requested ids against the index. Each call to
//! [`Query::search()`] then runs a second pass that selects and materializes
//! the blocks holding those ids.

pub mod builder;

use std::io;
use std::io::BufRead;
use std::path::PathBuf;

pub use builder::Builder;
use tracing::debug;

use crate::handler::HandlerChain;
use crate::index;
use crate::index::Entry;
use crate::index::Index;
use crate::index::Store;
use crate::reader::Rewind;
use crate::record;
use crate::record::parser::RowParser;
use crate::resolve;
use crate::resolve::Resolver;
use crate::result::ResultSet;
use crate::Reader;

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error related to a [`Query`].
#[derive(Debug)]
pub enum Error {
    /// The source does not exist.
    SourceNotFound(PathBuf),

    /// An I/O error.
    Io(io::Error),

    /// An error from the ordinal index.
    Index(index::Error),

    /// An error while opening the index store.
    Store(index::store::Error),

    /// An error while selecting blocks.
    Resolve(resolve::Error),

    /// An error while materializing records.
    Record(record::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::SourceNotFound(path) => write!(f, "source not found: {}", path.display()),
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::Index(err) => write!(f, "index error: {err}"),
            Error::Store(err) => write!(f, "store error: {err}"),
            Error::Resolve(err) => write!(f, "resolve error: {err}"),
            Error::Record(err) => write!(f, "record error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////
// Query
////////////////////////////////////////////////////////////////////////////////////////

/// A query for the gene blocks holding a set of feature ids.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
///
/// use genegroup::index::MemoryStore;
/// use genegroup::query::Builder;
/// use genegroup::Reader;
///
/// let data = "##gff-version 3\n\
///             chr1\t.\tgene\t1\t90\t.\t+\t.\tID=gene-A\n\
///             chr1\t.\tgene\t100\t190\t.\t-\t.\tID=gene-B\n\
///             chr1\t.\tmRNA\t100\t190\t.\t-\t.\tID=rna-B;Parent=gene-B\n\
///             chr1\t.\tCDS\t120\t180\t.\t-\t0\tID=cds-B1;Parent=rna-B\n";
/// let reader = Reader::new(Cursor::new(data));
///
/// let mut query = Builder::default()
///     .id("cds-B1")
///     .try_build_from(reader, MemoryStore::default())?;
///
/// let results = query.search(None, None)?;
/// assert_eq!(results.len(), 1);
/// assert_eq!(results.blocks()[0][0].id(), Some("gene-B"));
///
/// let results = query.search(Some("mrna"), None)?;
/// assert_eq!(results.to_tabular(), "chr1\t.\tmRNA\t100\t190\t.\t-\t.\tid=rna-B;parent=gene-B");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Query<T, S>
where
    T: BufRead + Rewind,
    S: Store,
{
    /// The source.
    reader: Reader<T>,

    /// The ordinal index over the source.
    index: Index<S>,

    /// The requested ids.
    ids: Vec<String>,

    /// The index hits for the requested ids.
    hits: Vec<Entry>,

    /// The row parser that materializes records.
    parser: Box<dyn RowParser>,
}

impl<T, S> Query<T, S>
where
    T: BufRead + Rewind,
    S: Store,
{
    /// Gets the requested ids.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Gets the index hits for the requested ids, by descending ordinal.
    pub fn hits(&self) -> &[Entry] {
        &self.hits
    }

    /// Gets the ordinal index.
    pub fn index(&self) -> &Index<S> {
        &self.index
    }

    /// Gets the row parser.
    pub fn parser(&self) -> &dyn RowParser {
        self.parser.as_ref()
    }

    /// Runs the query.
    ///
    /// Every block holding at least one requested id is selected once, in
    /// file order, and its lines are materialized into records through
    /// `handlers` and the row parser. With a `feature_type`, only records of
    /// that type (ignoring case) are kept; a selected block whose records are
    /// all filtered out stays in the result as an empty block.
    pub fn search(
        &mut self,
        feature_type: Option<&str>,
        handlers: Option<&HandlerChain>,
    ) -> Result<ResultSet> {
        let default = HandlerChain::default();
        let handlers = handlers.unwrap_or(&default);

        self.reader.rewind().map_err(Error::Io)?;
        let blocks = Resolver::new(self.hits.clone())
            .resolve(&mut self.reader)
            .map_err(Error::Resolve)?;

        debug!(
            ids = self.ids.len(),
            hits = self.hits.len(),
            blocks = blocks.len(),
            handlers = %handlers,
            "selected blocks"
        );

        let mut results = Vec::with_capacity(blocks.len());

        for block in blocks {
            let mut records = block
                .records(self.parser.as_ref(), handlers)
                .map_err(Error::Record)?;

            if let Some(feature_type) = feature_type {
                records.retain(|record| record.is_type(feature_type));
            }

            results.push(records);
        }

        Ok(ResultSet::new(results))
    }
}
