//! The ordinal index: a durable mapping from feature id to the ordinal of the
//! block that holds it.
//!
//! An index is built with one full pass over the source (see
//! [`Index::build()`]). Every id found by the configured [`IdPattern`] in a
//! block is stored, lowercased, alongside the ordinal of that block. Once
//! built, an index is only ever read.
//!
//! Storage is pluggable through the [`Store`] trait. [`MemoryStore`] keeps
//! the table in memory and [`SqliteStore`] persists it next to the source.

pub mod sqlite;
pub mod store;

use std::io;
use std::io::BufRead;

pub use sqlite::SqliteStore;
pub use store::Entry;
pub use store::MemoryStore;
pub use store::Store;
use tracing::debug;
use tracing::info;

use crate::block::blocks;
use crate::pattern::IdPattern;
use crate::reader::Rewind;
use crate::Reader;

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error related to an [`Index`].
#[derive(Debug)]
pub enum Error {
    /// An error while scanning the blocks of the source.
    Blocks(blocks::Error),

    /// An I/O error while rewinding the source.
    Io(io::Error),

    /// An error from the store.
    Store(store::Error),

    /// A lookup was attempted before the index was built.
    NotBuilt,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Blocks(err) => write!(f, "blocks error: {err}"),
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::Store(err) => write!(f, "store error: {err}"),
            Error::NotBuilt => write!(f, "the index has not been built"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////
// Index
////////////////////////////////////////////////////////////////////////////////////////

/// A summary of a finished build.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Summary {
    /// The number of blocks scanned.
    blocks: usize,

    /// The number of entries stored.
    entries: usize,
}

impl Summary {
    /// Gets the number of blocks scanned.
    pub fn blocks(&self) -> usize {
        self.blocks
    }

    /// Gets the number of entries stored.
    pub fn entries(&self) -> usize {
        self.entries
    }
}

/// An ordinal index over the blocks of one source.
#[derive(Debug)]
pub struct Index<S>
where
    S: Store,
{
    /// The store.
    store: S,

    /// The pattern that finds ids within a block.
    pattern: IdPattern,
}

impl<S> Index<S>
where
    S: Store,
{
    /// Creates a new [`Index`].
    pub fn new(store: S, pattern: IdPattern) -> Self {
        Self { store, pattern }
    }

    /// Gets the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Gets the id pattern.
    pub fn pattern(&self) -> &IdPattern {
        &self.pattern
    }

    /// Returns whether the index has been built.
    pub fn is_built(&self) -> bool {
        self.store.is_built()
    }

    /// Builds the index from `reader`, unless it has been built already.
    ///
    /// The build scans every block once, from the start of the source, and
    /// leaves the source rewound. Returns a [`Summary`] if a build happened
    /// and [`None`] if an existing index was reused. If the scan fails, the
    /// partial build is discarded.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    ///
    /// use genegroup::index::Index;
    /// use genegroup::index::MemoryStore;
    /// use genegroup::IdPattern;
    /// use genegroup::Reader;
    ///
    /// let data = "chr1\t.\tgene\t1\t9\t.\t+\t.\tID=gene-A\n\
    ///             chr1\t.\tmRNA\t1\t9\t.\t+\t.\tID=rna-A;Parent=gene-A\n\
    ///             chr1\t.\tgene\t20\t29\t.\t-\t.\tID=gene-B\n";
    /// let mut reader = Reader::new(Cursor::new(data));
    ///
    /// let mut index = Index::new(MemoryStore::default(), IdPattern::default());
    /// let summary = index.build(&mut reader)?.unwrap();
    /// assert_eq!(summary.blocks(), 2);
    /// assert_eq!(summary.entries(), 3);
    ///
    /// // A second build is a no-op.
    /// assert!(index.build(&mut reader)?.is_none());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn build<T>(&mut self, reader: &mut Reader<T>) -> Result<Option<Summary>>
    where
        T: BufRead + Rewind,
    {
        if self.store.is_built() {
            info!("reusing existing index");
            return Ok(None);
        }

        reader.rewind().map_err(Error::Io)?;
        self.store.begin().map_err(Error::Store)?;

        let summary = match self.scan(reader) {
            Ok(summary) => summary,
            Err(err) => {
                self.store.abort();
                return Err(err);
            }
        };

        self.store.finish().map_err(Error::Store)?;
        reader.rewind().map_err(Error::Io)?;

        info!(
            blocks = summary.blocks,
            entries = summary.entries,
            "built index"
        );

        Ok(Some(summary))
    }

    /// Inserts the ids of every block into the build in progress.
    fn scan<T>(&mut self, reader: &mut Reader<T>) -> Result<Summary>
    where
        T: BufRead,
    {
        let mut summary = Summary {
            blocks: 0,
            entries: 0,
        };

        for result in reader.blocks() {
            let block = result.map_err(Error::Blocks)?;

            for id in block.ids(&self.pattern) {
                self.store
                    .insert(&Entry::new(block.ordinal(), id))
                    .map_err(Error::Store)?;
                summary.entries += 1;
            }

            summary.blocks += 1;
        }

        Ok(summary)
    }

    /// Resolves each of `ids` to the first block that holds it.
    ///
    /// Ids are matched exactly, ignoring case. An id present in several
    /// blocks resolves to the one with the lowest ordinal. Ids that are not in
    /// the index are dropped. The result is sorted by descending ordinal.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    ///
    /// use genegroup::index::Entry;
    /// use genegroup::index::Index;
    /// use genegroup::index::MemoryStore;
    /// use genegroup::IdPattern;
    /// use genegroup::Reader;
    ///
    /// let data = "chr1\t.\tgene\t1\t9\t.\t+\t.\tID=gene-A\n\
    ///             chr1\t.\tgene\t20\t29\t.\t-\t.\tID=gene-B\n\
    ///             chr1\t.\tCDS\t20\t29\t.\t-\t0\tID=cds-B1;Parent=gene-B\n";
    /// let mut reader = Reader::new(Cursor::new(data));
    ///
    /// let mut index = Index::new(MemoryStore::default(), IdPattern::default());
    /// index.build(&mut reader)?;
    ///
    /// let hits = index.resolve(["GENE-A", "cds-b1", "gene-z"])?;
    /// assert_eq!(hits, vec![Entry::new(1, "cds-b1"), Entry::new(0, "gene-a")]);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn resolve<I, V>(&self, ids: I) -> Result<Vec<Entry>>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        if !self.store.is_built() {
            return Err(Error::NotBuilt);
        }

        let mut hits = Vec::new();

        for id in ids {
            let id = id.as_ref().to_lowercase();
            let ordinals = self.store.ordinals(&id).map_err(Error::Store)?;

            match ordinals.first() {
                Some(ordinal) => hits.push(Entry::new(*ordinal, id)),
                None => debug!(%id, "no block holds the requested id"),
            }
        }

        Ok(descending(hits))
    }

    /// Resolves each of the wildcard `patterns` to every entry it matches.
    ///
    /// In a pattern, `%` matches any run of characters and `_` matches
    /// exactly one. Patterns are matched ignoring case. Patterns that match
    /// nothing are dropped. The result is sorted by descending ordinal.
    pub fn resolve_matching<I, V>(&self, patterns: I) -> Result<Vec<Entry>>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        if !self.store.is_built() {
            return Err(Error::NotBuilt);
        }

        let mut hits = Vec::new();

        for pattern in patterns {
            let pattern = pattern.as_ref().to_lowercase();
            let entries = self.store.matching(&pattern).map_err(Error::Store)?;

            if entries.is_empty() {
                debug!(%pattern, "no id matches the requested pattern");
            }

            hits.extend(entries);
        }

        Ok(descending(hits))
    }
}

/// Sorts entries by descending ordinal.
fn descending(mut entries: Vec<Entry>) -> Vec<Entry> {
    entries.sort_by(|a, b| b.cmp(a));
    entries
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use tempdir::TempDir;

    use super::*;

    const DATA: &str = "##gff-version 3\n\
                        chr1\t.\tgene\t1\t10\t.\t+\t.\tID=gene-A\n\
                        chr1\t.\tmRNA\t1\t10\t.\t+\t.\tID=rna-A;Parent=gene-A\n\
                        chr1\t.\tgene\t20\t30\t.\t-\t.\tID=gene-B\n\
                        chr1\t.\tmRNA\t20\t30\t.\t-\t.\tID=rna-B1;Parent=gene-B\n\
                        chr1\t.\tmRNA\t20\t30\t.\t-\t.\tID=rna-B2;Parent=gene-B\n\
                        chr1\t.\tgene\t40\t50\t.\t+\t.\tID=gene-C\n\
                        chr1\t.\tgene\t60\t70\t.\t+\t.\tID=shared\n\
                        chr1\t.\tgene\t80\t90\t.\t+\t.\tID=shared\n";

    fn built<S: Store>(store: S) -> std::result::Result<Index<S>, Box<dyn std::error::Error>> {
        let mut reader = Reader::new(Cursor::new(DATA));
        let mut index = Index::new(store, IdPattern::default());
        index.build(&mut reader)?;
        Ok(index)
    }

    #[test]
    fn lookups_need_a_build() {
        let index = Index::new(MemoryStore::default(), IdPattern::default());
        assert!(matches!(index.resolve(["gene-a"]), Err(Error::NotBuilt)));
        assert!(matches!(index.resolve_matching(["gene-%"]), Err(Error::NotBuilt)));
    }

    #[test]
    fn the_build_leaves_the_source_rewound() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let mut reader = Reader::new(Cursor::new(DATA));
        let mut index = Index::new(MemoryStore::default(), IdPattern::default());
        index.build(&mut reader)?;

        assert_eq!(reader.blocks().count(), 5);
        Ok(())
    }

    #[test]
    fn hits_are_deduplicated_per_id_and_descending(
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let index = built(MemoryStore::default())?;

        let hits = index.resolve(["rna-b2", "gene-a", "Rna-B1", "shared", "missing"])?;
        assert_eq!(
            hits,
            vec![
                Entry::new(3, "shared"),
                Entry::new(1, "rna-b2"),
                Entry::new(1, "rna-b1"),
                Entry::new(0, "gene-a"),
            ]
        );

        Ok(())
    }

    #[test]
    fn exact_lookups_do_not_match_prefixes() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let index = built(MemoryStore::default())?;
        assert!(index.resolve(["rna-b"])?.is_empty());
        Ok(())
    }

    #[test]
    fn wildcard_lookups() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let index = built(MemoryStore::default())?;

        let hits = index.resolve_matching(["RNA-B%", "nothing-%"])?;
        assert_eq!(
            hits,
            vec![Entry::new(1, "rna-b2"), Entry::new(1, "rna-b1")]
        );

        Ok(())
    }

    #[test]
    fn an_on_disk_index_is_built_once() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("genegroup")?;
        let path = dir.path().join("genomic.gff.db");

        let index = built(SqliteStore::open(&path)?)?;
        let first = index.resolve(["gene-c", "shared"])?;
        drop(index);

        let mut reader = Reader::new(Cursor::new(DATA));
        let mut index = Index::new(SqliteStore::open(&path)?, IdPattern::default());
        assert!(index.is_built());
        assert!(index.build(&mut reader)?.is_none());

        let second = index.resolve(["gene-c", "shared"])?;
        assert_eq!(first, second);
        assert_eq!(second, vec![Entry::new(3, "shared"), Entry::new(2, "gene-c")]);

        Ok(())
    }

    #[test]
    fn rebuilding_from_the_same_source_is_idempotent(
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("genegroup")?;
        let ids = ["gene-a", "rna-a", "gene-b", "rna-b1", "rna-b2", "gene-c", "shared"];

        let first = built(SqliteStore::open(dir.path().join("first.gff.db"))?)?;
        let second = built(SqliteStore::open(dir.path().join("second.gff.db"))?)?;
        let memory = built(MemoryStore::default())?;

        assert_eq!(first.resolve(ids)?, second.resolve(ids)?);
        assert_eq!(first.resolve(ids)?, memory.resolve(ids)?);

        let everything = first.store().matching("%")?;
        assert_eq!(everything.len(), 8);
        assert_eq!(everything, second.store().matching("%")?);
        assert_eq!(everything, memory.store().matching("%")?);

        Ok(())
    }
}
