//! A GFF3 file reader.

pub mod source;

use std::fs::File;
use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Seek;
use std::iter;

pub use source::Source;

use crate::block::Blocks;
use crate::Line;

/// The new line character.
const NEW_LINE: char = '\n';

/// The carriage return character.
const CARRIAGE_RETURN: char = '\r';

/// An error related to a [`Reader`].
#[derive(Debug)]
pub enum Error {
    /// An I/O error.
    Io(io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A source that can be moved back to its first byte.
///
/// Every pass over a GFF3 file starts from the beginning of the file, and the
/// cursor is never reset implicitly. Anything that is scanned more than once
/// must implement this trait.
pub trait Rewind {
    /// Moves the read cursor back to the start of the source.
    fn rewind(&mut self) -> io::Result<()>;
}

impl<T> Rewind for io::Cursor<T>
where
    T: AsRef<[u8]>,
{
    fn rewind(&mut self) -> io::Result<()> {
        self.set_position(0);
        Ok(())
    }
}

impl Rewind for BufReader<File> {
    fn rewind(&mut self) -> io::Result<()> {
        Seek::rewind(self)
    }
}

/// A GFF3 file reader.
#[derive(Clone, Debug)]
pub struct Reader<T>(T)
where
    T: BufRead;

impl<T> Reader<T>
where
    T: BufRead,
{
    /// Creates a GFF3 file reader.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"chr1\t.\tgene\t1\t10\t.\t+\t.\tID=gene-A\n";
    /// let reader = genegroup::Reader::new(&data[..]);
    /// ```
    pub fn new(inner: T) -> Self {
        Self::from(inner)
    }

    /// Gets a reference to the inner reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io;
    ///
    /// let data = b"chr1\t.\tgene\t1\t10\t.\t+\t.\tID=gene-A\n";
    /// let cursor = io::Cursor::new(data);
    ///
    /// let reader = genegroup::Reader::new(cursor);
    /// assert_eq!(reader.inner().position(), 0);
    /// ```
    pub fn inner(&self) -> &T {
        &self.0
    }

    /// Gets a mutable reference to the inner reader.
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.0
    }

    /// Consumes self and returns the inner reader.
    pub fn into_inner(self) -> T {
        self.0
    }

    /// Reads a raw, textual line from the underlying reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io;
    ///
    /// let data = b"##gff-version 3\r\nchr1\t.\tgene\t1\t10\t.\t+\t.\tID=gene-A";
    /// let mut reader = genegroup::Reader::new(&data[..]);
    ///
    /// let mut buffer = String::new();
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 17);
    /// assert_eq!(buffer, "##gff-version 3");
    ///
    /// reader.read_line_raw(&mut buffer)?;
    /// assert_eq!(buffer, "chr1\t.\tgene\t1\t10\t.\t+\t.\tID=gene-A");
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 0);
    ///
    /// # Ok::<(), io::Error>(())
    /// ```
    pub fn read_line_raw(&mut self, buffer: &mut String) -> io::Result<usize> {
        read_line(self.inner_mut(), buffer)
    }

    /// Attempts to read a [`Line`] from the underlying reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use genegroup::Line;
    ///
    /// let data = b"##gff-version 3\nchr1\t.\tgene\t1\t10\t.\t+\t.\tID=gene-A";
    /// let mut reader = genegroup::Reader::new(&data[..]);
    ///
    /// let mut buffer = String::new();
    /// assert!(matches!(reader.read_line(&mut buffer)?, Some(Line::Comment(_))));
    /// assert!(matches!(reader.read_line(&mut buffer)?, Some(Line::Gene(_))));
    /// assert!(matches!(reader.read_line(&mut buffer)?, None));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn read_line(&mut self, buffer: &mut String) -> Result<Option<Line>, Error> {
        let read = self.read_line_raw(buffer).map_err(Error::Io)?;

        match read {
            0 => Ok(None),
            _ => Ok(Some(Line::from(buffer.as_str()))),
        }
    }

    /// Returns an iterator over the [`Line`]s in the underlying reader.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"##gff-version 3\nchr1\t.\tgene\t1\t10\t.\t+\t.\tID=gene-A\n\n";
    /// let mut reader = genegroup::Reader::new(&data[..]);
    ///
    /// let lines = reader.lines().collect::<Vec<_>>();
    /// assert_eq!(lines.len(), 3);
    /// ```
    pub fn lines(&mut self) -> impl Iterator<Item = io::Result<Line>> + '_ {
        let mut buffer = String::new();

        iter::from_fn(move || match self.read_line_raw(&mut buffer) {
            Ok(0) => None,
            Ok(_) => Some(Ok(Line::from(buffer.as_str()))),
            Err(e) => Some(Err(e)),
        })
    }

    /// Returns an iterator over the gene-rooted [blocks](crate::block::Block)
    /// from the current position of the underlying reader.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"chr1\t.\tgene\t1\t10\t.\t+\t.\tID=gene-A\n\
    ///              chr1\t.\tgene\t20\t30\t.\t+\t.\tID=gene-B\n\
    ///              chr1\t.\tmRNA\t20\t30\t.\t+\t.\tID=rna-B;Parent=gene-B\n";
    /// let mut reader = genegroup::Reader::new(&data[..]);
    ///
    /// let blocks = reader
    ///     .blocks()
    ///     .collect::<Result<Vec<_>, _>>()?;
    /// assert_eq!(blocks.len(), 2);
    /// assert_eq!(blocks[1].lines().len(), 2);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn blocks(&mut self) -> Blocks<'_, T> {
        Blocks::new(self)
    }
}

impl<T> Reader<T>
where
    T: BufRead + Rewind,
{
    /// Moves the underlying reader back to the start of the source so that
    /// the next pass reproduces the same sequence of lines.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io;
    ///
    /// let data = b"chr1\t.\tgene\t1\t10\t.\t+\t.\tID=gene-A\n";
    /// let mut reader = genegroup::Reader::new(io::Cursor::new(&data[..]));
    ///
    /// assert_eq!(reader.blocks().count(), 1);
    /// assert_eq!(reader.blocks().count(), 0);
    ///
    /// reader.rewind()?;
    /// assert_eq!(reader.blocks().count(), 1);
    ///
    /// # Ok::<(), io::Error>(())
    /// ```
    pub fn rewind(&mut self) -> io::Result<()> {
        Rewind::rewind(self.inner_mut())
    }
}

impl<T> From<T> for Reader<T>
where
    T: BufRead,
{
    fn from(inner: T) -> Self {
        Self(inner)
    }
}

/// Reads a line from a buffered reader, stripping the line ending.
///
/// Follows the line reading of noodles-gtf.
fn read_line<T>(reader: &mut T, buffer: &mut String) -> io::Result<usize>
where
    T: BufRead,
{
    buffer.clear();

    match reader.read_line(buffer) {
        Ok(0) => Ok(0),
        Ok(n) => {
            if buffer.ends_with(NEW_LINE) {
                buffer.pop();

                if buffer.ends_with(CARRIAGE_RETURN) {
                    buffer.pop();
                }
            }

            Ok(n)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_read_line() {
        let data = b"hello\r\nworld!";
        let mut cursor = io::Cursor::new(data);

        let mut buffer = String::new();
        let len = read_line(&mut cursor, &mut buffer).unwrap();
        assert_eq!(buffer, "hello");
        assert_eq!(len, 7);

        let len = read_line(&mut cursor, &mut buffer).unwrap();
        assert_eq!(buffer, "world!");
        assert_eq!(len, 6);
    }

    #[test]
    fn rewinding_restarts_the_line_sequence() -> Result<(), Box<dyn std::error::Error>> {
        let data = b"##gff-version 3\nchr1\t.\tgene\t1\t10\t.\t+\t.\tID=gene-A\n";
        let mut reader = Reader::new(io::Cursor::new(&data[..]));

        let first = reader.lines().collect::<io::Result<Vec<_>>>()?;
        assert!(reader.lines().next().is_none());

        reader.rewind()?;
        let second = reader.lines().collect::<io::Result<Vec<_>>>()?;
        assert_eq!(first, second);

        Ok(())
    }
}
