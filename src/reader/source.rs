//! A GFF3 source opened from a path.

use std::fs::File;
use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use std::path::PathBuf;

use flate2::read::GzDecoder;

use crate::reader::Rewind;

/// The extension that marks a gzip-compressed source.
const GZIP_EXTENSION: &str = "gz";

/// A GFF3 source backed by a file on disk.
///
/// Plain files are rewound by seeking. Gzip-compressed files (ending in
/// `.gz`) cannot seek, so rewinding reopens the file and starts a fresh
/// decoder.
#[derive(Debug)]
pub enum Source {
    /// An uncompressed file.
    Plain(BufReader<File>),

    /// A gzip-compressed file.
    Gzip {
        /// The path to reopen on rewind.
        path: PathBuf,

        /// The decoding reader.
        inner: BufReader<GzDecoder<File>>,
    },
}

impl Source {
    /// Opens the source at `path`.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();

        if is_gzipped(path) {
            Ok(Source::Gzip {
                path: path.to_path_buf(),
                inner: open_gzip(path)?,
            })
        } else {
            File::open(path).map(BufReader::new).map(Source::Plain)
        }
    }
}

/// Returns whether `path` names a gzip-compressed file.
fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(GZIP_EXTENSION))
        .unwrap_or(false)
}

/// Opens a decoding reader over the gzip file at `path`.
fn open_gzip(path: &Path) -> io::Result<BufReader<GzDecoder<File>>> {
    File::open(path).map(GzDecoder::new).map(BufReader::new)
}

impl Read for Source {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Source::Plain(inner) => inner.read(buf),
            Source::Gzip { inner, .. } => inner.read(buf),
        }
    }
}

impl BufRead for Source {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            Source::Plain(inner) => inner.fill_buf(),
            Source::Gzip { inner, .. } => inner.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            Source::Plain(inner) => inner.consume(amt),
            Source::Gzip { inner, .. } => inner.consume(amt),
        }
    }
}

impl Rewind for Source {
    fn rewind(&mut self) -> io::Result<()> {
        match self {
            Source::Plain(inner) => Seek::rewind(inner),
            Source::Gzip { path, inner } => {
                *inner = open_gzip(path)?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempdir::TempDir;

    use super::*;
    use crate::Reader;

    const DATA: &[u8] = b"chr1\t.\tgene\t1\t10\t.\t+\t.\tID=gene-A\n\
                          chr1\t.\tgene\t20\t30\t.\t+\t.\tID=gene-B\n";

    #[test]
    fn plain_sources_rewind() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("genegroup")?;
        let path = dir.path().join("plain.gff3");
        std::fs::write(&path, DATA)?;

        let mut reader = Reader::new(Source::open(&path)?);
        assert_eq!(reader.blocks().count(), 2);

        reader.rewind()?;
        assert_eq!(reader.blocks().count(), 2);

        Ok(())
    }

    #[test]
    fn gzip_sources_rewind() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("genegroup")?;
        let path = dir.path().join("compressed.gff3.gz");

        let mut encoder = GzEncoder::new(File::create(&path)?, Compression::default());
        encoder.write_all(DATA)?;
        encoder.finish()?;

        let mut reader = Reader::new(Source::open(&path)?);
        assert!(matches!(reader.inner(), Source::Gzip { .. }));
        assert_eq!(reader.blocks().count(), 2);

        reader.rewind()?;
        assert_eq!(reader.blocks().count(), 2);

        Ok(())
    }
}
