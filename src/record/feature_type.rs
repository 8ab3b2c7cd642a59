//! Names of common feature types.
//!
//! Any of these can be handed to [`Query::search()`](crate::query::Query::search)
//! as a type filter. Filtering compares types ignoring case, so `MRNA` matches
//! a record typed `mRNA`.

/// A gene. Every gene line opens a new block.
pub const GENE: &str = "gene";

/// A messenger RNA.
pub const MRNA: &str = "mrna";

/// A coding sequence.
pub const CDS: &str = "cds";

/// A long non-coding RNA.
pub const LNC_RNA: &str = "lnc_rna";

/// An exon.
pub const EXON: &str = "exon";

/// A region, such as a whole chromosome.
pub const REGION: &str = "region";

/// A pseudogene.
pub const PSEUDOGENE: &str = "pseudogene";

/// A transcript.
pub const TRANSCRIPT: &str = "transcript";

/// A feature of unknown type.
pub const UNKNOWN: &str = "unknown";
