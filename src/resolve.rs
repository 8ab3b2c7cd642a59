//! Selection of the blocks that hold a set of resolved ids.

use std::io::BufRead;

use tracing::debug;
use tracing::trace;

use crate::block::blocks;
use crate::block::Block;
use crate::index::Entry;
use crate::Reader;

/// An error related to a [`Resolver`].
#[derive(Debug)]
pub enum Error {
    /// An error while scanning the blocks of the source.
    Blocks(blocks::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Blocks(err) => write!(f, "blocks error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// Selects blocks by ordinal in a single forward pass over the source.
///
/// The hits are held as a stack with the lowest ordinal on top. Each block
/// whose ordinal matches the top of the stack is selected once, and every
/// hit sharing that ordinal is popped with it. Scanning stops as soon as the
/// stack is empty.
#[derive(Clone, Debug)]
pub struct Resolver {
    /// The outstanding hits, highest ordinal first.
    stack: Vec<Entry>,
}

impl Resolver {
    /// Creates a new [`Resolver`] from index hits in any order.
    pub fn new(mut hits: Vec<Entry>) -> Self {
        hits.sort_by(|a, b| b.cmp(a));
        Self { stack: hits }
    }

    /// Gets the number of outstanding hits.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Returns whether there are no outstanding hits.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Consumes `self` and selects the blocks holding the hits from `reader`,
    /// which must be positioned at the start of the source.
    ///
    /// Blocks come back in ascending file order, each exactly once.
    ///
    /// # Examples
    ///
    /// ```
    /// use genegroup::index::Entry;
    /// use genegroup::resolve::Resolver;
    /// use genegroup::Reader;
    ///
    /// let data = b"chr1\t.\tgene\t1\t9\t.\t+\t.\tID=gene-A\n\
    ///              chr1\t.\tgene\t20\t29\t.\t+\t.\tID=gene-B\n\
    ///              chr1\t.\tmRNA\t20\t29\t.\t+\t.\tID=rna-B;Parent=gene-B\n\
    ///              chr1\t.\tgene\t40\t49\t.\t+\t.\tID=gene-C\n";
    /// let mut reader = Reader::new(&data[..]);
    ///
    /// let resolver = Resolver::new(vec![
    ///     Entry::new(1, "rna-b"),
    ///     Entry::new(0, "gene-a"),
    ///     Entry::new(1, "gene-b"),
    /// ]);
    ///
    /// let blocks = resolver.resolve(&mut reader)?;
    /// assert_eq!(blocks.iter().map(|b| b.ordinal()).collect::<Vec<_>>(), vec![0, 1]);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn resolve<T>(mut self, reader: &mut Reader<T>) -> Result<Vec<Block>>
    where
        T: BufRead,
    {
        let mut selected = Vec::new();

        if self.stack.is_empty() {
            return Ok(selected);
        }

        for result in reader.blocks() {
            let block = result.map_err(Error::Blocks)?;
            let ordinal = block.ordinal();

            // Hits below the current block can no longer be reached.
            while let Some(entry) = self.stack.last().filter(|e| e.ordinal() < ordinal) {
                debug!(id = entry.id(), ordinal = entry.ordinal(), "skipping unreachable hit");
                self.stack.pop();
            }

            if self.stack.last().map(Entry::ordinal) == Some(ordinal) {
                while self.stack.last().map(Entry::ordinal) == Some(ordinal) {
                    self.stack.pop();
                }

                trace!(ordinal, "selected block");
                selected.push(block);
            }

            if self.stack.is_empty() {
                break;
            }
        }

        for entry in self.stack.iter().rev() {
            debug!(id = entry.id(), ordinal = entry.ordinal(), "no block at hit ordinal");
        }

        Ok(selected)
    }
}
