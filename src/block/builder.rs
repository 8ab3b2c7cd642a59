//! A builder for a [`Block`].

use nonempty::NonEmpty;

use crate::block::Block;

/// A builder for a [`Block`].
///
/// A builder always starts from the line that opens the block, so the block
/// it produces is never empty.
#[derive(Debug)]
pub struct Builder {
    /// The ordinal the block will carry.
    ordinal: usize,

    /// The lines accumulated so far.
    lines: NonEmpty<String>,
}

impl Builder {
    /// Creates a new [`Builder`] for the block at `ordinal` that opens with
    /// `line`.
    ///
    /// # Examples
    ///
    /// ```
    /// use genegroup::block::Builder;
    ///
    /// let block = Builder::new(3, "chr1\t.\tgene\t1\t9\t.\t+\t.\tID=gene-A").build();
    /// assert_eq!(block.ordinal(), 3);
    /// ```
    pub fn new(ordinal: usize, line: impl Into<String>) -> Self {
        Self {
            ordinal,
            lines: NonEmpty::new(line.into()),
        }
    }

    /// Pushes a line onto the end of the block.
    pub fn push_line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    /// Consumes `self` to build a [`Block`].
    pub fn build(self) -> Block {
        Block {
            ordinal: self.ordinal,
            lines: self.lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_keep_their_order() {
        let block = Builder::new(0, "first")
            .push_line("second")
            .push_line("third")
            .build();

        let lines = block.lines().iter().cloned().collect::<Vec<_>>();
        assert_eq!(lines, vec!["first", "second", "third"]);
    }
}
