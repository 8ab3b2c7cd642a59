//! A builder for a [`Query`].

use std::io::BufRead;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::info;

use crate::index::sqlite::index_path;
use crate::index::Index;
use crate::index::SqliteStore;
use crate::index::Store;
use crate::pattern::IdPattern;
use crate::query::Error;
use crate::query::Query;
use crate::reader::Rewind;
use crate::reader::Source;
use crate::record::parser::RowParser;
use crate::record::parser::Standard;
use crate::record::parser::Variant;
use crate::Reader;

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// A builder for a [`Query`].
///
/// Every setting has a default: no ids, the default [`IdPattern`], the
/// [`Standard`] row parser, an index next to the source and exact id
/// matching.
#[derive(Debug, Default)]
pub struct Builder {
    /// The requested ids.
    ids: Vec<String>,

    /// The pattern that finds ids within a block.
    pattern: Option<IdPattern>,

    /// The row parser.
    parser: Option<Box<dyn RowParser>>,

    /// The path of the on-disk index.
    index_path: Option<PathBuf>,

    /// Whether requested ids are wildcard patterns.
    wildcard: bool,
}

impl Builder {
    /// Adds a requested id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.ids.push(id.into());
        self
    }

    /// Adds requested ids.
    pub fn ids<I, V>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Sets the pattern that finds ids within a block.
    ///
    /// The pattern only matters when the index is built. An index that
    /// already exists keeps the ids it was built with.
    pub fn id_pattern(mut self, pattern: IdPattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Sets the row parser.
    pub fn parser<P>(mut self, parser: P) -> Self
    where
        P: RowParser + 'static,
    {
        self.parser = Some(Box::new(parser));
        self
    }

    /// Sets the row parser to a named variant.
    pub fn variant(mut self, variant: Variant) -> Self {
        self.parser = Some(variant.into_parser());
        self
    }

    /// Sets the path of the on-disk index.
    ///
    /// Only used by [`Builder::try_build_from_path()`]. Defaults to the
    /// source path with `.db` appended.
    pub fn index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.index_path = Some(path.into());
        self
    }

    /// Sets whether the requested ids are wildcard patterns (`%` for any run
    /// of characters, `_` for exactly one) instead of exact ids.
    pub fn wildcard(mut self, wildcard: bool) -> Self {
        self.wildcard = wildcard;
        self
    }

    /// Consumes `self` and attempts to build a [`Query`] over the file at
    /// `path`, backed by an on-disk index.
    ///
    /// If the index does not exist yet, it is built now.
    ///
    /// # Examples
    ///
    /// ```
    /// use genegroup::query::Builder;
    /// use genegroup::query::Error;
    ///
    /// let err = Builder::default()
    ///     .id("gene-A")
    ///     .try_build_from_path("missing.gff3")
    ///     .unwrap_err();
    ///
    /// assert!(matches!(err, Error::SourceNotFound(_)));
    /// ```
    pub fn try_build_from_path(
        self,
        path: impl AsRef<Path>,
    ) -> Result<Query<Source, SqliteStore>> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(Error::SourceNotFound(path.to_path_buf()));
        }

        let source = Source::open(path).map_err(Error::Io)?;

        let db = self.index_path.clone().unwrap_or_else(|| index_path(path));
        debug!(source = %path.display(), index = %db.display(), "opening source");
        let store = SqliteStore::open(db).map_err(Error::Store)?;

        self.try_build_from(Reader::new(source), store)
    }

    /// Consumes `self` and attempts to build a [`Query`] over `reader`,
    /// backed by `store`.
    ///
    /// If `store` has not been built yet, it is built now.
    pub fn try_build_from<T, S>(self, mut reader: Reader<T>, store: S) -> Result<Query<T, S>>
    where
        T: BufRead + Rewind,
        S: Store,
    {
        let mut index = Index::new(store, self.pattern.unwrap_or_default());
        index.build(&mut reader).map_err(Error::Index)?;

        let hits = if self.wildcard {
            index.resolve_matching(&self.ids)
        } else {
            index.resolve(&self.ids)
        }
        .map_err(Error::Index)?;

        info!(
            requested = self.ids.len(),
            resolved = hits.len(),
            "resolved requested ids"
        );

        Ok(Query {
            reader,
            index,
            ids: self.ids,
            hits,
            parser: self.parser.unwrap_or_else(|| Box::new(Standard)),
        })
    }
}
