//! An iterator over the [blocks](crate::block::Block) of a GFF3 file.

use std::io::BufRead;

use crate::block::Block;
use crate::block::Builder;
use crate::reader;
use crate::Line;
use crate::Reader;

/// An error related to [`Blocks`].
#[derive(Debug)]
pub enum Error {
    /// There was an issue reading from the underlying reader.
    Reader(reader::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Reader(err) => write!(f, "reader error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// An iterator that streams the blocks of a GFF3 file.
///
/// Only the block currently being accumulated is held in memory. Blank lines
/// and lines containing the comment marker are skipped. A gene line closes
/// the block in progress (if any) and opens the next one. At the end of the
/// input, whatever has been accumulated is emitted, even if it never saw a
/// gene line.
///
/// Ordinals start at zero for the first block produced by this iterator and
/// increase by exactly one per block.
#[derive(Debug)]
pub struct Blocks<'a, T>
where
    T: BufRead,
{
    /// The inner reader.
    reader: &'a mut Reader<T>,

    /// The block in progress.
    builder: Option<Builder>,

    /// The ordinal of the next block to open.
    next_ordinal: usize,

    /// The line buffer.
    buffer: String,
}

impl<'a, T> Blocks<'a, T>
where
    T: BufRead,
{
    /// Creates a new [`Blocks`].
    pub(crate) fn new(reader: &'a mut Reader<T>) -> Self {
        Self {
            reader,
            builder: None,
            next_ordinal: 0,
            buffer: String::new(),
        }
    }

    /// Opens a new block with `line`, returning the block that was in
    /// progress.
    fn open(&mut self, line: String) -> Option<Block> {
        let builder = Builder::new(self.next_ordinal, line);
        self.next_ordinal += 1;

        self.builder.replace(builder).map(Builder::build)
    }
}

impl<T> Iterator for Blocks<'_, T>
where
    T: BufRead,
{
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.reader.read_line(&mut self.buffer) {
                Ok(line) => line,
                Err(err) => return Some(Err(Error::Reader(err))),
            };

            // The end of the input flushes the block in progress (if any).
            let line = match line {
                Some(line) => line,
                None => return self.builder.take().map(|builder| Ok(builder.build())),
            };

            match line {
                Line::Empty | Line::Comment(_) => {}
                Line::Gene(raw) => {
                    if let Some(block) = self.open(raw) {
                        return Some(Ok(block));
                    }
                }
                Line::Feature(raw) => match self.builder.take() {
                    Some(builder) => self.builder = Some(builder.push_line(raw)),
                    None => {
                        // Features before the first gene form a degenerate
                        // leading block.
                        self.open(raw);
                    }
                },
            }
        }
    }
}
