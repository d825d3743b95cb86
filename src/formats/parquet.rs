//! Parquet table finalization.
//!
//! Assembles the resolved schema and the drained column arrays into one
//! record batch and writes it to disk. Schema and arrays are produced by the
//! same iteration over the candidate-column list, so their order agrees by
//! construction; this module only glues them together.

use std::fs::File;
use std::path::Path;

use arrow::array::{ArrayRef, RecordBatch, RecordBatchOptions};
use arrow::datatypes::SchemaRef;
use log::debug;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;

use crate::error::Result;

/// Rows per Parquet row group in the physical file layout.
pub const ROW_GROUP_SIZE: usize = 20_000;

/// Write one finished table to `path`. Returns the number of rows written.
///
/// The output file is created here, after decoding has completed, so a
/// failed run never leaves a partial table behind.
pub fn write_table(path: &Path, schema: SchemaRef, columns: Vec<ArrayRef>) -> Result<usize> {
    let num_rows = columns.first().map_or(0, |c| c.len());
    let options = RecordBatchOptions::new().with_row_count(Some(num_rows));
    let batch = RecordBatch::try_new_with_options(schema.clone(), columns, &options)?;

    debug!(
        "writing {} rows x {} columns to {}",
        batch.num_rows(),
        batch.num_columns(),
        path.display()
    );

    let file = File::create(path)?;
    let props = WriterProperties::builder()
        .set_max_row_group_size(ROW_GROUP_SIZE)
        .build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(batch.num_rows())
}
