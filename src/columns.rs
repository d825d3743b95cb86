//! Column accumulators.
//!
//! One growable, append-only builder per enabled column. All enabled
//! builders advance in lockstep: every emitted row appends exactly one value
//! or null to each of them, so finalization always yields equal-length
//! arrays. Appending a value of the wrong type for a column is a fatal
//! [`Error::ColumnType`].

use std::sync::Arc;

use arrow::array::{
    ArrayBuilder, ArrayRef, Float64Builder, Int32Builder, Int64Builder, StringBuilder,
    TimestampSecondBuilder,
};

use crate::error::{Error, Result};
use crate::schema::{ColumnId, ColumnKind, ResolvedSchema};

/// A typed, append-only builder for one output column.
#[derive(Debug)]
pub enum ColumnBuilder {
    Utf8(StringBuilder),
    Int32(Int32Builder),
    Int64(Int64Builder),
    Float64(Float64Builder),
    Timestamp(TimestampSecondBuilder),
}

impl ColumnBuilder {
    pub fn for_kind(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Utf8 => ColumnBuilder::Utf8(StringBuilder::new()),
            ColumnKind::Int32 => ColumnBuilder::Int32(Int32Builder::new()),
            ColumnKind::Int64 => ColumnBuilder::Int64(Int64Builder::new()),
            ColumnKind::Float64 => ColumnBuilder::Float64(Float64Builder::new()),
            ColumnKind::TimestampSeconds => {
                ColumnBuilder::Timestamp(TimestampSecondBuilder::new())
            }
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            ColumnBuilder::Utf8(_) => "utf8",
            ColumnBuilder::Int32(_) => "int32",
            ColumnBuilder::Int64(_) => "int64",
            ColumnBuilder::Float64(_) => "float64",
            ColumnBuilder::Timestamp(_) => "timestamp",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnBuilder::Utf8(b) => b.len(),
            ColumnBuilder::Int32(b) => b.len(),
            ColumnBuilder::Int64(b) => b.len(),
            ColumnBuilder::Float64(b) => b.len(),
            ColumnBuilder::Timestamp(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn append_null(&mut self) {
        match self {
            ColumnBuilder::Utf8(b) => b.append_null(),
            ColumnBuilder::Int32(b) => b.append_null(),
            ColumnBuilder::Int64(b) => b.append_null(),
            ColumnBuilder::Float64(b) => b.append_null(),
            ColumnBuilder::Timestamp(b) => b.append_null(),
        }
    }

    /// Finish into an immutable array, leaving the builder empty for reuse.
    pub fn finish(&mut self) -> ArrayRef {
        match self {
            ColumnBuilder::Utf8(b) => Arc::new(b.finish()),
            ColumnBuilder::Int32(b) => Arc::new(b.finish()),
            ColumnBuilder::Int64(b) => Arc::new(b.finish()),
            ColumnBuilder::Float64(b) => Arc::new(b.finish()),
            ColumnBuilder::Timestamp(b) => Arc::new(b.finish()),
        }
    }

    /// Drop any accumulated rows, keeping the builder usable.
    pub fn reset(&mut self) {
        let _ = self.finish();
    }
}

/// The bank of accumulators for one conversion run, indexed by [`ColumnId`].
///
/// Disabled columns hold no builder; appends addressed to them are no-ops,
/// which is what lets the emitter call through unconditionally for cheap
/// values while still skipping expensive work behind explicit flag checks.
#[derive(Debug)]
pub struct ColumnBank {
    builders: [Option<ColumnBuilder>; ColumnId::COUNT],
}

impl ColumnBank {
    pub fn from_schema(schema: &ResolvedSchema) -> Self {
        let builders = ColumnId::ALL.map(|id| {
            schema
                .enabled(id)
                .then(|| ColumnBuilder::for_kind(id.kind()))
        });
        Self { builders }
    }

    fn builder_mut(&mut self, id: ColumnId) -> Option<&mut ColumnBuilder> {
        self.builders[id.index()].as_mut()
    }

    fn mismatch(id: ColumnId, builder: &ColumnBuilder, expected: &str) -> Error {
        Error::ColumnType(format!(
            "column {} is {}, refused {expected} append",
            id.key(),
            builder.kind_name()
        ))
    }

    pub fn append_str(&mut self, id: ColumnId, value: &str) -> Result<()> {
        match self.builder_mut(id) {
            Some(ColumnBuilder::Utf8(b)) => {
                b.append_value(value);
                Ok(())
            }
            Some(other) => Err(Self::mismatch(id, other, "utf8")),
            None => Ok(()),
        }
    }

    /// String append treating the empty string as null.
    pub fn append_opt_str(&mut self, id: ColumnId, value: &str) -> Result<()> {
        match self.builder_mut(id) {
            Some(ColumnBuilder::Utf8(b)) => {
                if value.is_empty() {
                    b.append_null();
                } else {
                    b.append_value(value);
                }
                Ok(())
            }
            Some(other) => Err(Self::mismatch(id, other, "utf8")),
            None => Ok(()),
        }
    }

    pub fn append_i32(&mut self, id: ColumnId, value: i32) -> Result<()> {
        match self.builder_mut(id) {
            Some(ColumnBuilder::Int32(b)) => {
                b.append_value(value);
                Ok(())
            }
            Some(other) => Err(Self::mismatch(id, other, "int32")),
            None => Ok(()),
        }
    }

    pub fn append_i64(&mut self, id: ColumnId, value: i64) -> Result<()> {
        match self.builder_mut(id) {
            Some(ColumnBuilder::Int64(b)) => {
                b.append_value(value);
                Ok(())
            }
            Some(other) => Err(Self::mismatch(id, other, "int64")),
            None => Ok(()),
        }
    }

    pub fn append_f64(&mut self, id: ColumnId, value: f64) -> Result<()> {
        match self.builder_mut(id) {
            Some(ColumnBuilder::Float64(b)) => {
                b.append_value(value);
                Ok(())
            }
            Some(other) => Err(Self::mismatch(id, other, "float64")),
            None => Ok(()),
        }
    }

    pub fn append_null(&mut self, id: ColumnId) -> Result<()> {
        if let Some(builder) = self.builder_mut(id) {
            builder.append_null();
        }
        Ok(())
    }

    /// Back-fill the timestamp column for a whole row block.
    pub fn append_timestamp_block(
        &mut self,
        id: ColumnId,
        epoch_seconds: Option<i64>,
        rows: usize,
    ) -> Result<()> {
        match self.builder_mut(id) {
            Some(ColumnBuilder::Timestamp(b)) => {
                match epoch_seconds {
                    Some(value) => {
                        for _ in 0..rows {
                            b.append_value(value);
                        }
                    }
                    None => b.append_nulls(rows),
                }
                Ok(())
            }
            Some(other) => Err(Self::mismatch(id, other, "timestamp")),
            None => Ok(()),
        }
    }

    /// Number of rows accumulated in the column, `None` when disabled.
    pub fn len(&self, id: ColumnId) -> Option<usize> {
        self.builders[id.index()].as_ref().map(ColumnBuilder::len)
    }

    /// Finish every enabled column into arrays, in candidate-column order —
    /// the same iteration and filter that produce the Arrow schema, so the
    /// two cannot disagree on column order.
    pub fn finish(&mut self, schema: &ResolvedSchema) -> Vec<ArrayRef> {
        ColumnId::ALL
            .iter()
            .zip(self.builders.iter_mut())
            .filter(|(id, _)| schema.enabled(**id))
            .filter_map(|(_, builder)| builder.as_mut())
            .map(ColumnBuilder::finish)
            .collect()
    }

    /// Clear all accumulated rows without reallocating the bank.
    pub fn reset(&mut self) {
        for builder in self.builders.iter_mut().flatten() {
            builder.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_typed_append_and_finish() {
        let schema = ResolvedSchema::from_config(&Config::default());
        let mut bank = ColumnBank::from_schema(&schema);
        bank.append_str(ColumnId::MesgName, "record").unwrap();
        bank.append_i64(ColumnId::ValueInteger, 42).unwrap();
        bank.append_null(ColumnId::ValueFloat).unwrap();
        assert_eq!(bank.len(ColumnId::MesgName), Some(1));
        assert_eq!(bank.len(ColumnId::ValueInteger), Some(1));
    }

    #[test]
    fn test_type_mismatch_is_fatal() {
        let schema = ResolvedSchema::from_config(&Config::default());
        let mut bank = ColumnBank::from_schema(&schema);
        let err = bank.append_str(ColumnId::ValueInteger, "nope").unwrap_err();
        assert!(matches!(err, Error::ColumnType(_)));
    }

    #[test]
    fn test_disabled_column_append_is_noop() {
        let config = Config::from_pairs([("mesg_name", "true")]);
        let schema = ResolvedSchema::from_config(&config);
        let mut bank = ColumnBank::from_schema(&schema);
        bank.append_i64(ColumnId::ValueInteger, 7).unwrap();
        assert_eq!(bank.len(ColumnId::ValueInteger), None);
        let arrays = bank.finish(&schema);
        assert_eq!(arrays.len(), 1);
    }

    #[test]
    fn test_finish_empty_bank_yields_empty_arrays() {
        let schema = ResolvedSchema::from_config(&Config::default());
        let mut bank = ColumnBank::from_schema(&schema);
        let arrays = bank.finish(&schema);
        assert_eq!(arrays.len(), ColumnId::COUNT);
        assert!(arrays.iter().all(|a| a.is_empty()));
    }

    #[test]
    fn test_reset_clears_rows() {
        let schema = ResolvedSchema::from_config(&Config::default());
        let mut bank = ColumnBank::from_schema(&schema);
        bank.append_str(ColumnId::MesgName, "event").unwrap();
        bank.reset();
        assert_eq!(bank.len(ColumnId::MesgName), Some(0));
    }
}
