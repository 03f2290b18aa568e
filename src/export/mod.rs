//! Convert and export pipelines: place records in, JSONL documents out.

mod postgres;
mod source;
mod writer;

pub use postgres::PostgresPlaceSource;
pub use source::{ExportFilter, ExportQuery, MemoryPlaceSource, PlaceSource};
pub use writer::{DocumentWriter, ExportStats};

use crate::error::Result;
use crate::place::{read_json_array, GeneratedDocument, PlaceRecord};
use futures::TryStreamExt;
use indicatif::ProgressBar;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Default output path for a converted file: the input with a `.jsonl` extension.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("jsonl")
}

/// Generate and write the document for one place.
fn write_place<W: Write>(writer: &mut DocumentWriter<W>, place: &PlaceRecord) -> Result<()> {
    let doc = GeneratedDocument::from_place(place)?;
    writer.write(&doc)
}

/// Convert a JSON array of places into a JSONL document file.
#[instrument(skip(progress))]
pub fn convert_json_to_jsonl(
    input: &Path,
    output: &Path,
    progress: &ProgressBar,
) -> Result<ExportStats> {
    info!("Reading input file: {}", input.display());
    let places = read_json_array::<PlaceRecord>(input)?;
    info!("Loaded {} places from JSON file", places.len());

    progress.set_length(places.len() as u64);
    info!("Converting to JSONL format: {}", output.display());

    let mut writer = DocumentWriter::create(output)?;
    for place in places {
        write_place(&mut writer, &place?)?;
        progress.inc(1);
    }

    writer.finish()
}

/// Export filtered places from a source into a JSONL document file.
///
/// Rows are streamed; nothing beyond the current record is kept in memory.
#[instrument(skip(source, query, progress))]
pub async fn export_places(
    source: &dyn PlaceSource,
    query: &ExportQuery,
    output: &Path,
    batch_size: usize,
    progress: &ProgressBar,
) -> Result<ExportStats> {
    let matching = source.count(query).await?;
    let total = query.filter.reported_total(matching);
    info!("Starting export, estimated records: {}", total);
    progress.set_length(total);

    let mut writer = DocumentWriter::create(output)?.with_flush_every(batch_size);
    let mut rows = source.fetch(query);
    while let Some(place) = rows.try_next().await? {
        write_place(&mut writer, &place)?;
        progress.inc(1);
    }

    writer.finish()
}
