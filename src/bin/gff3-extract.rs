//! A binary that extracts the gene blocks holding a set of feature ids from a
//! GFF3 file.
//!
//! ```shell
//! cargo run --release --bin=gff3-extract --features=binaries -- \
//!     genomic.gff gene-BRCA2 cds-NP_000050.3 --type mRNA --format json
//! ```
//!
//! The first run over a GFF3 file creates an ordinal index next to it
//! (`<GFF3>.db`), which later runs reuse.

use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use clap::Parser;
use clap::ValueEnum;
use clap_verbosity_flag::Verbosity;
use genegroup::IdPattern;
use genegroup::handler::Handler;
use genegroup::handler::HandlerChain;
use genegroup::query::Builder;
use genegroup::record::parser::Lookup;
use genegroup::record::parser::Variant;
use genegroup::result::ResultSet;
use tracing::info;
use tracing_log::AsTrace as _;
use tracing_subscriber::EnvFilter;

/// The output format.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// Tab-separated feature lines, blocks separated by `###`.
    Tabular,

    /// One JSON array per block, one object per record.
    Json,
}

/// Extracts the gene blocks holding a set of feature ids from a GFF3 file.
#[derive(Parser)]
struct Args {
    /// The GFF3 file (optionally gzip-compressed).
    source: PathBuf,

    /// The feature ids to look up (compared ignoring case).
    #[arg(required = true)]
    ids: Vec<String>,

    /// If desired, only keep records of this feature type (compared ignoring
    /// case).
    #[arg(short = 't', long = "type")]
    feature_type: Option<String>,

    /// The output format.
    #[arg(short, long, value_enum, default_value_t = Format::Tabular)]
    format: Format,

    /// If desired, a file to write the output to instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// The row parser variant (`standard` or `lookup`).
    #[arg(long, default_value = "standard")]
    variant: String,

    /// A two-column, tab-separated table that remaps ids and parent ids.
    /// Required by the `lookup` variant.
    #[arg(long)]
    lookup: Option<PathBuf>,

    /// A regular expression that finds the ids within a block when the index
    /// is built. The first capture group (or the whole match) is the id.
    #[arg(long)]
    id_pattern: Option<String>,

    /// If desired, where to keep the ordinal index (defaults to `<SOURCE>.db`).
    #[arg(long)]
    index: Option<PathBuf>,

    /// Treat the ids as wildcard patterns (`%` matches any run of characters
    /// and `_` matches a single character).
    #[arg(short, long, default_value_t = false)]
    wildcard: bool,

    /// Built-in line handlers to run before parsing (`lowercase` or
    /// `uppercase`). Only the last handler's output is kept.
    #[arg(long = "handler")]
    handlers: Vec<String>,

    #[command(flatten)]
    verbose: Verbosity,
}

/// Builds the row parser variant requested on the command line.
fn variant(args: &Args) -> Result<Variant> {
    let table = match &args.lookup {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening lookup table: {}", path.display()))?;
            let table = Lookup::from_reader(BufReader::new(file))
                .with_context(|| format!("reading lookup table: {}", path.display()))?;
            Some(table)
        }
        None => None,
    };

    Variant::try_from_name(&args.variant, table).context("selecting row parser variant")
}

/// Builds the handler chain requested on the command line.
fn handlers(args: &Args) -> Result<HandlerChain> {
    let mut chain = HandlerChain::default();

    for name in &args.handlers {
        match Handler::builtin(name) {
            Some(handler) => chain.push(handler),
            None => bail!("unknown handler: {name}"),
        };
    }

    Ok(chain)
}

/// Writes the results in the requested format.
fn write(results: &ResultSet, format: Format, writer: impl Write) -> Result<()> {
    let mut writer = BufWriter::new(writer);

    match format {
        Format::Tabular => results.write_tabular(&mut writer)?,
        Format::Json => {
            results.write_json(&mut writer)?;
            writeln!(writer)?;
        }
    }

    writer.flush().context("flushing output")
}

fn extract(args: &Args) -> Result<()> {
    let mut builder = Builder::default()
        .ids(args.ids.iter().cloned())
        .variant(variant(args)?)
        .wildcard(args.wildcard);

    if let Some(pattern) = &args.id_pattern {
        let pattern = pattern.parse::<IdPattern>().context("parsing id pattern")?;
        builder = builder.id_pattern(pattern);
    }

    if let Some(index) = &args.index {
        builder = builder.index_path(index);
    }

    let handlers = handlers(args)?;
    info!("handlers: {handlers}");

    let mut query = builder
        .try_build_from_path(&args.source)
        .with_context(|| format!("preparing query over {}", args.source.display()))?;

    let results = query
        .search(args.feature_type.as_deref(), Some(&handlers))
        .context("searching")?;

    info!(
        "found {} block(s) with {} record(s)",
        results.len(),
        results.records().count()
    );

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating output file: {}", path.display()))?;
            write(&results, args.format, file)
        }
        None => write(&results, args.format, io::stdout().lock()),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    match std::env::var("RUST_LOG") {
        Ok(_) => tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(io::stderr)
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_max_level(args.verbose.log_level_filter().as_trace())
            .with_writer(io::stderr)
            .init(),
    };

    extract(&args)
}
