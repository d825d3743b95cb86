//! The row emission engine.
//!
//! Consumes one decoded message at a time and expands it into flat output
//! rows: one row per (field, value-index) pair across the message's standard
//! and developer fields, each row decorated with the source-file and device
//! identity context. Emission is gated on identity resolution — until a
//! `file_id` message has yielded both a manufacturer and a product, every
//! message's rows are dropped with a diagnostic.

use arrow::array::ArrayRef;
use arrow::datatypes::SchemaRef;
use log::warn;

use crate::columns::ColumnBank;
use crate::error::Result;
use crate::fit::mesg::{
    BaseType, Field, FileIdMesg, Mesg, FIELD_NUM_INVALID, MESG_NUM_FILE_ID, MESG_NUM_INVALID,
};
use crate::fit::profile;
use crate::fit::MesgHandler;
use crate::schema::{ColumnId, ResolvedSchema};

/// Scaled-float vs raw-integer interpretations closer than this are
/// classified integer: no scale/offset was actually applied.
const TYPE_EPSILON: f64 = 1e-8;

/// Outcome of classifying one field value.
enum ValueClass {
    Integer(i64),
    Float(f64),
    Str,
}

/// Device identity resolved from the stream's `file_id` message and
/// denormalized onto every row. Populated once per run; rows emitted before
/// both manufacturer and product are known must be dropped.
#[derive(Debug, Clone, Default)]
struct IdentityContext {
    time_created: Option<u32>,
    manufacturer_index: Option<u16>,
    manufacturer_name: String,
    product_index: Option<u16>,
    product_name: String,
}

impl IdentityContext {
    fn is_resolved(&self) -> bool {
        self.manufacturer_index.is_some() && self.product_index.is_some()
    }

    fn clear(&mut self) {
        *self = IdentityContext::default();
    }
}

/// The per-run state machine feeding the column accumulators.
pub struct RowEmitter {
    schema: ResolvedSchema,
    bank: ColumnBank,
    identity: IdentityContext,
    source_filename: String,
    source_file_uri: String,
    mesgs: usize,
    rows: usize,
}

impl RowEmitter {
    pub fn new(schema: ResolvedSchema) -> Self {
        let bank = ColumnBank::from_schema(&schema);
        Self {
            schema,
            bank,
            identity: IdentityContext::default(),
            source_filename: String::new(),
            source_file_uri: String::new(),
            mesgs: 0,
            rows: 0,
        }
    }

    /// Record the source file's name and canonical URI for denormalization
    /// onto every row of the upcoming run.
    pub fn begin_source(&mut self, filename: String, file_uri: String) {
        self.source_filename = filename;
        self.source_file_uri = file_uri;
    }

    pub fn mesg_count(&self) -> usize {
        self.mesgs
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Drain the accumulators into (schema, arrays), leaving them empty.
    pub fn finish_table(&mut self) -> (SchemaRef, Vec<ArrayRef>) {
        let arrow_schema = self.schema.to_arrow();
        let columns = self.bank.finish(&self.schema);
        (arrow_schema, columns)
    }

    /// Clear all per-run state: identity context, source names, counters,
    /// and accumulated rows. The schema snapshot is untouched.
    pub fn reset(&mut self) {
        self.identity.clear();
        self.source_filename.clear();
        self.source_file_uri.clear();
        self.mesgs = 0;
        self.rows = 0;
        self.bank.reset();
    }

    /// Identity extraction step: only `file_id` messages contribute, and
    /// only their valid fields overwrite existing context.
    fn update_identity(&mut self, mesg: &Mesg) {
        let Some(file_id) = FileIdMesg::from_mesg(mesg) else {
            return;
        };
        if let Some(created) = file_id.time_created {
            self.identity.time_created = Some(created);
        }
        if let Some(index) = file_id.manufacturer {
            self.identity.manufacturer_index = Some(index);
            self.identity.manufacturer_name = profile::manufacturer_name(index)
                .unwrap_or_default()
                .to_string();
        }
        if let Some(index) = file_id.favero_product() {
            self.identity.product_index = Some(index);
            self.identity.product_name = profile::favero_product_name(index)
                .unwrap_or_default()
                .to_string();
        } else if let Some(index) = file_id.garmin_product() {
            self.identity.product_index = Some(index);
            self.identity.product_name = profile::garmin_product_name(index)
                .unwrap_or_default()
                .to_string();
        } else if let Some(index) = file_id.product() {
            self.identity.product_index = Some(index);
        }
    }

    /// Generic row emission step: expand every (field, value) pair into one
    /// row, then back-fill the block timestamp.
    fn emit_rows(&mut self, mesg: &Mesg) -> Result<()> {
        if !self.identity.is_resolved() {
            warn!("manufacturer/product unresolved, dropping: {}", mesg.name);
            return Ok(());
        }

        let mut block_timestamp = self.identity.time_created;
        let mut block_rows = 0usize;

        for field in &mesg.fields {
            let is_timestamp = field.name == "timestamp";
            for j in 0..field.num_values() {
                let sval = field.string_value(j);
                if self.schema.exclude_empty_values && sval.is_empty() {
                    continue;
                }
                if is_timestamp {
                    // The capture happens even when the row itself is elided.
                    block_timestamp = field.uint32_value(j);
                    if self.schema.exclude_timestamp_values {
                        continue;
                    }
                }
                self.append_mesg_columns(mesg)?;
                self.append_field_columns(field, &sval, j)?;
                block_rows += 1;
            }
        }

        // Developer fields never participate in timestamp special-casing.
        for field in &mesg.developer_fields {
            for j in 0..field.num_values() {
                let sval = field.string_value(j);
                if self.schema.exclude_empty_values && sval.is_empty() {
                    continue;
                }
                self.append_mesg_columns(mesg)?;
                self.append_field_columns(field, &sval, j)?;
                block_rows += 1;
            }
        }

        if self.schema.enabled(ColumnId::Timestamp) {
            let epoch = block_timestamp.map(|ts| {
                if self.schema.unix_epoch {
                    i64::from(ts) + profile::FIT_EPOCH_OFFSET_SECS
                } else {
                    i64::from(ts)
                }
            });
            self.bank
                .append_timestamp_block(ColumnId::Timestamp, epoch, block_rows)?;
        }

        self.rows += block_rows;
        Ok(())
    }

    fn append_mesg_columns(&mut self, mesg: &Mesg) -> Result<()> {
        self.bank.append_str(ColumnId::SourceFiletype, "FIT")?;
        self.bank
            .append_str(ColumnId::SourceFilename, &self.source_filename)?;
        self.bank
            .append_str(ColumnId::SourceFileUri, &self.source_file_uri)?;

        // Identity is resolved before any row is emitted.
        let manufacturer = self.identity.manufacturer_index.unwrap_or(0);
        let product = self.identity.product_index.unwrap_or(0);
        self.bank
            .append_i32(ColumnId::ManufacturerIndex, i32::from(manufacturer))?;
        self.bank
            .append_str(ColumnId::ManufacturerName, &self.identity.manufacturer_name)?;
        self.bank
            .append_i32(ColumnId::ProductIndex, i32::from(product))?;
        self.bank
            .append_opt_str(ColumnId::ProductName, &self.identity.product_name)?;

        self.bank
            .append_i32(ColumnId::MesgIndex, i32::from(mesg.num))?;
        self.bank.append_str(ColumnId::MesgName, &mesg.name)?;
        Ok(())
    }

    fn append_field_columns(&mut self, field: &Field, sval: &str, j: usize) -> Result<()> {
        if field.num == FIELD_NUM_INVALID {
            self.bank.append_null(ColumnId::FieldIndex)?;
        } else {
            self.bank
                .append_i32(ColumnId::FieldIndex, i32::from(field.num))?;
        }
        self.bank.append_str(ColumnId::FieldName, &field.name)?;
        self.bank.append_opt_str(ColumnId::Units, &field.units)?;

        if !self.schema.needs_value_typing() {
            // No typed column consumes the classification; only the string
            // rendering remains.
            return self.bank.append_str(ColumnId::ValueString, sval);
        }

        match classify(field, j) {
            ValueClass::Integer(ival) => {
                self.bank.append_str(ColumnId::FieldType, "integer")?;
                self.bank.append_i64(ColumnId::ValueInteger, ival)?;
                self.bank.append_null(ColumnId::ValueFloat)?;
            }
            ValueClass::Float(fval) => {
                self.bank.append_str(ColumnId::FieldType, "float")?;
                self.bank.append_null(ColumnId::ValueInteger)?;
                self.bank.append_f64(ColumnId::ValueFloat, fval)?;
            }
            ValueClass::Str => {
                self.bank.append_str(ColumnId::FieldType, "string")?;
                self.bank.append_null(ColumnId::ValueInteger)?;
                self.bank.append_null(ColumnId::ValueFloat)?;
            }
        }
        self.bank.append_str(ColumnId::ValueString, sval)
    }
}

fn classify(field: &Field, j: usize) -> ValueClass {
    match field.base_type {
        base if base.is_integer() => {
            let fval = field.float64_value(j);
            let ival = field.sint64_value(j);
            if (fval - ival as f64).abs() < TYPE_EPSILON {
                ValueClass::Integer(ival)
            } else {
                ValueClass::Float(fval)
            }
        }
        BaseType::Float32 | BaseType::Float64 => ValueClass::Float(field.float64_value(j)),
        BaseType::String => ValueClass::Str,
        BaseType::Unknown(code) => {
            warn!("unrecognized FIT base type {code}, emitting empty string value");
            ValueClass::Str
        }
        _ => ValueClass::Str,
    }
}

impl MesgHandler for RowEmitter {
    fn on_mesg(&mut self, mesg: &Mesg) -> Result<()> {
        if mesg.num == MESG_NUM_INVALID {
            return Ok(());
        }
        self.mesgs += 1;
        if mesg.num == MESG_NUM_FILE_ID {
            self.update_identity(mesg);
        }
        self.emit_rows(mesg)
    }
}
