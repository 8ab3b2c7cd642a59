//! Storage behind an ordinal [`Index`](crate::index::Index).

use std::collections::HashMap;
use std::io;

use regex::Regex;

/// The wildcard that matches any run of characters (including none).
pub const ANY_RUN: char = '%';

/// The wildcard that matches exactly one character.
pub const ANY_ONE: char = '_';

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error related to a [`Store`].
#[derive(Debug)]
pub enum Error {
    /// An I/O error.
    Io(io::Error),

    /// An error from SQLite.
    Sqlite(rusqlite::Error),

    /// A build was started on a store that is already built.
    AlreadyBuilt,

    /// A build was started while another build is in progress.
    AlreadyBuilding,

    /// An entry was inserted, or a build finished, outside of a build.
    NotBuilding,

    /// A lookup was attempted before the store was built.
    NotBuilt,

    /// A stored ordinal does not fit in memory.
    InvalidOrdinal(i64),

    /// A wildcard pattern could not be compiled.
    InvalidPattern(regex::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Error::AlreadyBuilt => write!(f, "the index is already built"),
            Error::AlreadyBuilding => write!(f, "the index is already being built"),
            Error::NotBuilding => write!(f, "the index is not being built"),
            Error::NotBuilt => write!(f, "the index has not been built"),
            Error::InvalidOrdinal(ordinal) => write!(f, "invalid stored ordinal: {ordinal}"),
            Error::InvalidPattern(err) => write!(f, "invalid wildcard pattern: {err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Sqlite(err)
    }
}

/// A [`Result`](std::result::Result) with an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////
// Entries
////////////////////////////////////////////////////////////////////////////////////////

/// A single row of the index: a (lowercased) feature id and the ordinal of
/// the block that holds it.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Entry {
    /// The ordinal of the block.
    ordinal: usize,

    /// The feature id.
    id: String,
}

impl Entry {
    /// Creates a new [`Entry`].
    ///
    /// # Examples
    ///
    /// ```
    /// use genegroup::index::Entry;
    ///
    /// let entry = Entry::new(3, "gene-a");
    /// assert_eq!(entry.ordinal(), 3);
    /// assert_eq!(entry.id(), "gene-a");
    /// ```
    pub fn new(ordinal: usize, id: impl Into<String>) -> Self {
        Self {
            ordinal,
            id: id.into(),
        }
    }

    /// Gets the ordinal of the block.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Gets the feature id.
    pub fn id(&self) -> &str {
        &self.id
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Stores
////////////////////////////////////////////////////////////////////////////////////////

/// A durable table of [`Entry`]s.
///
/// A store is written exactly once: [`Store::begin()`], any number of
/// [`Store::insert()`]s, then [`Store::finish()`]. Nothing inserted is
/// visible to lookups until the build has finished.
pub trait Store {
    /// Returns whether a finished build is available for lookups.
    fn is_built(&self) -> bool;

    /// Starts a build.
    fn begin(&mut self) -> Result<()>;

    /// Inserts an entry into the build in progress.
    fn insert(&mut self, entry: &Entry) -> Result<()>;

    /// Finishes the build in progress and makes it visible to lookups.
    fn finish(&mut self) -> Result<()>;

    /// Discards the build in progress (if any).
    fn abort(&mut self);

    /// Gets every ordinal stored for exactly `id`, in ascending order.
    fn ordinals(&self, id: &str) -> Result<Vec<usize>>;

    /// Gets every entry whose id matches the wildcard `pattern`, in ascending
    /// ordinal order.
    ///
    /// In `pattern`, [`ANY_RUN`] matches any run of characters and
    /// [`ANY_ONE`] matches exactly one character.
    fn matching(&self, pattern: &str) -> Result<Vec<Entry>>;
}

/// The build phase of a [`MemoryStore`].
#[derive(Debug, Default)]
enum Phase {
    /// Nothing has been built.
    #[default]
    Empty,

    /// A build is in progress.
    Building(Vec<Entry>),

    /// The build has finished.
    Built(HashMap<String, Vec<usize>>),
}

/// A [`Store`] that lives in memory for the lifetime of the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// The build phase.
    phase: Phase,
}

impl Store for MemoryStore {
    fn is_built(&self) -> bool {
        matches!(self.phase, Phase::Built(_))
    }

    fn begin(&mut self) -> Result<()> {
        match self.phase {
            Phase::Empty => {
                self.phase = Phase::Building(Vec::new());
                Ok(())
            }
            Phase::Building(_) => Err(Error::AlreadyBuilding),
            Phase::Built(_) => Err(Error::AlreadyBuilt),
        }
    }

    fn insert(&mut self, entry: &Entry) -> Result<()> {
        match &mut self.phase {
            Phase::Building(entries) => {
                entries.push(entry.clone());
                Ok(())
            }
            _ => Err(Error::NotBuilding),
        }
    }

    fn finish(&mut self) -> Result<()> {
        let entries = match std::mem::take(&mut self.phase) {
            Phase::Building(entries) => entries,
            phase => {
                self.phase = phase;
                return Err(Error::NotBuilding);
            }
        };

        let mut table = HashMap::<String, Vec<usize>>::new();

        for entry in entries {
            table.entry(entry.id).or_default().push(entry.ordinal);
        }

        for ordinals in table.values_mut() {
            ordinals.sort_unstable();
        }

        self.phase = Phase::Built(table);
        Ok(())
    }

    fn abort(&mut self) {
        if let Phase::Building(_) = self.phase {
            self.phase = Phase::Empty;
        }
    }

    fn ordinals(&self, id: &str) -> Result<Vec<usize>> {
        match &self.phase {
            Phase::Built(table) => Ok(table.get(id).cloned().unwrap_or_default()),
            _ => Err(Error::NotBuilt),
        }
    }

    fn matching(&self, pattern: &str) -> Result<Vec<Entry>> {
        let table = match &self.phase {
            Phase::Built(table) => table,
            _ => return Err(Error::NotBuilt),
        };

        let regex = wildcard_to_regex(pattern)?;

        let mut entries = table
            .iter()
            .filter(|(id, _)| regex.is_match(id))
            .flat_map(|(id, ordinals)| {
                ordinals
                    .iter()
                    .map(move |ordinal| Entry::new(*ordinal, id))
            })
            .collect::<Vec<_>>();

        entries.sort();
        Ok(entries)
    }
}

/// Compiles a wildcard pattern into an anchored, case-insensitive regex.
fn wildcard_to_regex(pattern: &str) -> Result<Regex> {
    let mut expression = String::from("(?is)^");

    for c in pattern.chars() {
        match c {
            ANY_RUN => expression.push_str(".*"),
            ANY_ONE => expression.push('.'),
            c => expression.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }

    expression.push('$');
    Regex::new(&expression).map_err(Error::InvalidPattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn built(entries: &[(usize, &str)]) -> Result<MemoryStore> {
        let mut store = MemoryStore::default();
        store.begin()?;

        for (ordinal, id) in entries {
            store.insert(&Entry::new(*ordinal, *id))?;
        }

        store.finish()?;
        Ok(store)
    }

    #[test]
    fn lookups_need_a_finished_build() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut store = MemoryStore::default();
        assert!(matches!(store.ordinals("a"), Err(Error::NotBuilt)));

        store.begin()?;
        store.insert(&Entry::new(0, "a"))?;
        assert!(!store.is_built());
        assert!(matches!(store.ordinals("a"), Err(Error::NotBuilt)));

        store.finish()?;
        assert!(store.is_built());
        assert_eq!(store.ordinals("a")?, vec![0]);

        Ok(())
    }

    #[test]
    fn a_store_is_built_once() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut store = built(&[(0, "a")])?;
        assert!(matches!(store.begin(), Err(Error::AlreadyBuilt)));
        assert!(matches!(store.finish(), Err(Error::NotBuilding)));
        assert!(store.is_built());
        Ok(())
    }

    #[test]
    fn aborting_discards_the_build() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut store = MemoryStore::default();
        store.begin()?;
        store.insert(&Entry::new(0, "a"))?;
        store.abort();

        assert!(!store.is_built());
        assert!(matches!(store.insert(&Entry::new(1, "b")), Err(Error::NotBuilding)));

        Ok(())
    }

    #[test]
    fn ordinals_are_ascending() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let store = built(&[(4, "dup"), (1, "dup"), (2, "other"), (3, "dup")])?;
        assert_eq!(store.ordinals("dup")?, vec![1, 3, 4]);
        assert!(store.ordinals("missing")?.is_empty());
        Ok(())
    }

    #[test]
    fn wildcard_matching() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let store = built(&[(0, "gene-a"), (1, "gene-b"), (1, "rna-b"), (2, "gene-ab")])?;

        assert_eq!(
            store.matching("gene-_")?,
            vec![Entry::new(0, "gene-a"), Entry::new(1, "gene-b")]
        );
        assert_eq!(
            store.matching("%b")?,
            vec![
                Entry::new(1, "gene-b"),
                Entry::new(1, "rna-b"),
                Entry::new(2, "gene-ab")
            ]
        );
        assert!(store.matching("gene.a")?.is_empty());

        Ok(())
    }
}
