//! An on-disk [`Store`] backed by SQLite.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use rusqlite::Connection;
use rusqlite::OpenFlags;

use crate::index::store::Entry;
use crate::index::store::Error;
use crate::index::store::Result;
use crate::index::store::Store;

/// The extension appended to a source path to name its index.
pub const EXTENSION: &str = "db";

/// The marker in the name of a build that has not finished yet.
const STAGING_MARKER: &str = "partial";

/// Creates the table and opens the write transaction of a build.
const CREATE_TABLE: &str = "CREATE TABLE id_index (
    ordinal INTEGER NOT NULL,
    id TEXT NOT NULL
);
BEGIN;";

/// Indexes the id column and commits a build.
const FINISH_BUILD: &str = "CREATE INDEX id_index_by_id ON id_index (id);
COMMIT;";

/// Inserts one entry.
const INSERT: &str = "INSERT INTO id_index (ordinal, id) VALUES (?1, ?2)";

/// Looks up the ordinals of one id.
const SELECT_ORDINALS: &str = "SELECT ordinal FROM id_index WHERE id = ?1 ORDER BY ordinal";

/// Looks up the entries whose id matches a wildcard pattern.
const SELECT_MATCHING: &str =
    "SELECT ordinal, id FROM id_index WHERE id LIKE ?1 ORDER BY ordinal, id";

/// Gets the default index path for a source: the source path with
/// [`EXTENSION`] appended.
///
/// # Examples
///
/// ```
/// use std::path::Path;
///
/// use genegroup::index::sqlite::index_path;
///
/// assert_eq!(
///     index_path("data/genomic.gff.gz"),
///     Path::new("data/genomic.gff.gz.db")
/// );
/// ```
pub fn index_path(source: impl AsRef<Path>) -> PathBuf {
    let mut path = OsString::from(source.as_ref().as_os_str());
    path.push(".");
    path.push(EXTENSION);
    PathBuf::from(path)
}

/// The state of a [`SqliteStore`].
#[derive(Debug)]
enum State {
    /// No index exists at the path.
    Absent,

    /// A build is being written into a staging file.
    Building {
        /// The connection to the staging file.
        connection: Connection,

        /// The staging file.
        staging: PathBuf,
    },

    /// A finished index, opened read-only.
    Built(Connection),
}

/// A [`Store`] persisted in a SQLite database file.
///
/// A build is written into a staging file next to the final path inside a
/// single transaction. Only once the transaction has committed is the staging
/// file renamed onto the final path, so a reader either finds a complete
/// index or none at all. An index that already exists is opened read-only and
/// is never rebuilt.
#[derive(Debug)]
pub struct SqliteStore {
    /// The final path of the index.
    path: PathBuf,

    /// The state.
    state: State,
}

impl SqliteStore {
    /// Opens the index at `path`, if there is one.
    ///
    /// If no file exists at `path`, the store starts out unbuilt.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let state = if path.exists() {
            State::Built(open_read_only(&path)?)
        } else {
            State::Absent
        };

        Ok(Self { path, state })
    }

    /// Gets the final path of the index.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the path a build from this process is staged at.
    fn staging_path(&self) -> PathBuf {
        let mut path = OsString::from(self.path.as_os_str());
        path.push(format!(".{STAGING_MARKER}.{}", std::process::id()));
        PathBuf::from(path)
    }

    /// Gets the connection of a finished index.
    fn connection(&self) -> Result<&Connection> {
        match &self.state {
            State::Built(connection) => Ok(connection),
            _ => Err(Error::NotBuilt),
        }
    }
}

impl Store for SqliteStore {
    fn is_built(&self) -> bool {
        matches!(self.state, State::Built(_))
    }

    fn begin(&mut self) -> Result<()> {
        match self.state {
            State::Absent => {}
            State::Building { .. } => return Err(Error::AlreadyBuilding),
            State::Built(_) => return Err(Error::AlreadyBuilt),
        }

        let staging = self.staging_path();
        remove_if_exists(&staging)?;

        let connection = Connection::open(&staging)?;
        connection.execute_batch(CREATE_TABLE)?;

        self.state = State::Building {
            connection,
            staging,
        };

        Ok(())
    }

    fn insert(&mut self, entry: &Entry) -> Result<()> {
        let connection = match &self.state {
            State::Building { connection, .. } => connection,
            _ => return Err(Error::NotBuilding),
        };

        connection
            .prepare_cached(INSERT)?
            .execute((entry.ordinal() as i64, entry.id()))?;

        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let (connection, staging) = match std::mem::replace(&mut self.state, State::Absent) {
            State::Building {
                connection,
                staging,
            } => (connection, staging),
            state => {
                self.state = state;
                return Err(Error::NotBuilding);
            }
        };

        let published =
            commit(connection).and_then(|()| fs::rename(&staging, &self.path).map_err(Error::Io));

        if let Err(err) = published {
            let _ = fs::remove_file(&staging);
            return Err(err);
        }

        self.state = State::Built(open_read_only(&self.path)?);
        Ok(())
    }

    fn abort(&mut self) {
        if let State::Building { staging, .. } =
            std::mem::replace(&mut self.state, State::Absent)
        {
            let _ = fs::remove_file(staging);
        }
    }

    fn ordinals(&self, id: &str) -> Result<Vec<usize>> {
        let mut statement = self.connection()?.prepare_cached(SELECT_ORDINALS)?;

        let ordinals = statement
            .query_map((id,), |row| row.get::<_, i64>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        ordinals.into_iter().map(to_ordinal).collect()
    }

    fn matching(&self, pattern: &str) -> Result<Vec<Entry>> {
        let mut statement = self.connection()?.prepare_cached(SELECT_MATCHING)?;

        let rows = statement
            .query_map((pattern,), |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(ordinal, id)| to_ordinal(ordinal).map(|ordinal| Entry::new(ordinal, id)))
            .collect()
    }
}

/// Opens a finished index without write access.
fn open_read_only(path: &Path) -> Result<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    Ok(Connection::open_with_flags(path, flags)?)
}

/// Commits a build and closes its connection.
fn commit(connection: Connection) -> Result<()> {
    connection.execute_batch(FINISH_BUILD)?;
    connection.close().map_err(|(_, err)| Error::Sqlite(err))
}

/// Removes a file, succeeding if it does not exist.
fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(Error::Io(err)),
    }
}

/// Converts a stored ordinal back into a block ordinal.
fn to_ordinal(ordinal: i64) -> Result<usize> {
    usize::try_from(ordinal).map_err(|_| Error::InvalidOrdinal(ordinal))
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;

    #[test]
    fn a_finished_build_is_published_atomically() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let dir = TempDir::new("genegroup")?;
        let path = dir.path().join("genomic.gff.db");

        let mut store = SqliteStore::open(&path)?;
        assert!(!store.is_built());

        store.begin()?;
        store.insert(&Entry::new(0, "gene-a"))?;
        store.insert(&Entry::new(1, "gene-b"))?;
        store.insert(&Entry::new(1, "rna-b"))?;
        store.insert(&Entry::new(3, "gene-b"))?;

        assert!(!path.exists());
        assert!(store.staging_path().exists());

        store.finish()?;
        assert!(store.is_built());
        assert!(path.exists());
        assert!(!store.staging_path().exists());

        assert_eq!(store.ordinals("gene-b")?, vec![1, 3]);
        assert!(store.ordinals("gene-c")?.is_empty());

        Ok(())
    }

    #[test]
    fn an_existing_index_is_reused() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("genegroup")?;
        let path = dir.path().join("genomic.gff.db");

        let mut store = SqliteStore::open(&path)?;
        store.begin()?;
        store.insert(&Entry::new(7, "gene-a"))?;
        store.finish()?;
        drop(store);

        let mut store = SqliteStore::open(&path)?;
        assert!(store.is_built());
        assert!(matches!(store.begin(), Err(Error::AlreadyBuilt)));
        assert!(matches!(
            store.insert(&Entry::new(8, "gene-b")),
            Err(Error::NotBuilding)
        ));
        assert_eq!(store.ordinals("gene-a")?, vec![7]);

        Ok(())
    }

    #[test]
    fn aborting_leaves_nothing_behind() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("genegroup")?;
        let path = dir.path().join("genomic.gff.db");

        let mut store = SqliteStore::open(&path)?;
        store.begin()?;
        store.insert(&Entry::new(0, "gene-a"))?;
        store.abort();

        assert!(!store.is_built());
        assert!(!path.exists());
        assert!(!store.staging_path().exists());
        assert!(matches!(store.ordinals("gene-a"), Err(Error::NotBuilt)));

        Ok(())
    }

    #[test]
    fn wildcard_matching() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("genegroup")?;
        let mut store = SqliteStore::open(dir.path().join("genomic.gff.db"))?;

        store.begin()?;
        for (ordinal, id) in [(0, "gene-a"), (1, "gene-b"), (1, "rna-b"), (2, "gene-ab")] {
            store.insert(&Entry::new(ordinal, id))?;
        }
        store.finish()?;

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

        Ok(())
    }
}
