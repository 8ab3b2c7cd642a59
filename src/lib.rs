//! `genegroup` is a crate for extracting gene-rooted groups of features from
//! GFF3 files.
//!
//! A GFF3 file is read as a sequence of [blocks](crate::block::Block): a block
//! opens with a `gene` line and runs up to (but excluding) the next `gene`
//! line, so that a gene travels together with its transcripts, exons, coding
//! sequences and so on. Blocks are numbered by their position in the file
//! (their _ordinal_).
//!
//! The crate provides two main points of entry:
//!
//! - Reading GFF3 files directly, line by line or block by block.
//! - Querying a GFF3 file for the blocks that hold a set of feature ids.
//!
//! ## Reading GFF3 files
//!
//! The [`Reader`] facility classifies each [`Line`] and streams blocks via
//! [`Reader::blocks()`]. Only the block in progress is held in memory. Each
//! block can be materialized into [records](crate::record::Record) through a
//! [row parser](crate::record::parser::RowParser) and a
//! [handler chain](crate::handler::HandlerChain).
//!
//! ```
//! use genegroup::handler::HandlerChain;
//! use genegroup::record::parser::Standard;
//!
//! let data = b"##gff-version 3\n\
//!              chr1\t.\tgene\t1\t90\t.\t+\t.\tID=gene-A\n\
//!              chr1\t.\tmRNA\t1\t90\t.\t+\t.\tID=rna-A;Parent=gene-A\n\
//!              chr1\t.\tgene\t100\t190\t.\t-\t.\tID=gene-B\n";
//! let mut reader = genegroup::Reader::new(&data[..]);
//!
//! for result in reader.blocks() {
//!     let block = result?;
//!
//!     for record in block.records(&Standard, &HandlerChain::default())? {
//!         println!("{}: {:?}", block.ordinal(), record.id());
//!     }
//! }
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Querying
//!
//! Finding the blocks that hold a handful of ids is a two-pass affair. The
//! first pass builds an [ordinal index](crate::index::Index) that maps every
//! feature id to the ordinal of its block. The index is durable: by default it
//! is kept next to the GFF3 file in a SQLite database and is only built once.
//! The second pass selects the blocks at the ordinals of the requested ids, in
//! file order, each exactly once.
//!
//! A [`query::Query`] cannot be instantiated directly. Instead, you should use
//! [`query::Builder`] and either [`query::Builder::try_build_from_path()`] or
//! [`query::Builder::try_build_from()`].
//!
//! ```
//! use std::io::Cursor;
//!
//! use genegroup::index::MemoryStore;
//! use genegroup::query::Builder;
//! use genegroup::Reader;
//!
//! let data = "chr1\t.\tgene\t1\t90\t.\t+\t.\tID=gene-A\n\
//!             chr1\t.\tgene\t100\t190\t.\t-\t.\tID=gene-B\n\
//!             chr1\t.\tmRNA\t100\t190\t.\t-\t.\tID=rna-B;Parent=gene-B\n\
//!             chr1\t.\tCDS\t120\t180\t.\t-\t0\tID=cds-B1;Parent=rna-B\n";
//!
//! let mut query = Builder::default()
//!     .ids(["cds-B1", "RNA-B"])
//!     .try_build_from(Reader::new(Cursor::new(data)), MemoryStore::default())?;
//!
//! let results = query.search(Some("cds"), None)?;
//! println!("{}", results.to_tabular());
//! println!("{}", results.to_json()?);
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod block;
pub mod handler;
pub mod index;
pub mod line;
pub mod pattern;
pub mod query;
pub mod reader;
pub mod record;
pub mod resolve;
pub mod result;

pub use line::Line;
pub use pattern::IdPattern;

pub use self::reader::Reader;
