//! Prints the gene blocks holding a set of feature ids as a table.
//!
//! ```
//! cargo run --release --example gff3_view <GFF3> <ID>...
//! ```
//!
//! The ordinal index is created next to the GFF3 file on the first run and is
//! reused afterwards.

use std::env;

use genegroup::query::Builder as QueryBuilder;
use tabled::builder::Builder;
use tabled::settings::Alignment;
use tabled::settings::Style;
use tabled::settings::object::Rows;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let src = env::args().nth(1).expect("missing src");
    let ids = env::args().skip(2).collect::<Vec<_>>();

    let mut query = QueryBuilder::default().ids(ids).try_build_from_path(src)?;
    let results = query.search(None, None)?;

    let mut builder = Builder::default();
    builder.push_record([
        "Block", "Seqid", "Source", "Type", "Start", "End", "Strand", "ID", "Parent",
    ]);

    for (i, block) in results.blocks().iter().enumerate() {
        let number = (i + 1).to_string();

        for record in block {
            builder.push_record([
                number.as_str(),
                record.seqid(),
                record.source(),
                record.feature_type(),
                &record.start().to_string(),
                &record.end().to_string(),
                record.strand().as_str(),
                record.id().unwrap_or("<None>"),
                record.parent().unwrap_or("<None>"),
            ]);
        }
    }

    let table = builder
        .build()
        .with(Style::rounded())
        .modify(Rows::new(1..), Alignment::left())
        .to_string();

    println!("{}", table);

    Ok(())
}
