//! Output column schema resolution.
//!
//! The output table draws from a fixed list of 17 candidate columns; which
//! of them materialize is decided entirely by configuration, once per run.
//! [`ResolvedSchema`] snapshots that decision into a plain array of flags so
//! the row-emission hot path never touches a string-keyed map.

use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};

use crate::config::{
    Config, KEY_EPOCH_FORMAT, KEY_EXCLUDE_EMPTY_VALUES, KEY_EXCLUDE_TIMESTAMP_VALUES,
};

/// Physical builder/array type behind a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Utf8,
    Int32,
    Int64,
    Float64,
    TimestampSeconds,
}

impl ColumnKind {
    pub fn data_type(self) -> DataType {
        match self {
            ColumnKind::Utf8 => DataType::Utf8,
            ColumnKind::Int32 => DataType::Int32,
            ColumnKind::Int64 => DataType::Int64,
            ColumnKind::Float64 => DataType::Float64,
            ColumnKind::TimestampSeconds => DataType::Timestamp(TimeUnit::Second, None),
        }
    }
}

/// The fixed candidate columns, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnId {
    SourceFiletype,
    SourceFilename,
    SourceFileUri,
    ManufacturerIndex,
    ManufacturerName,
    ProductIndex,
    ProductName,
    Timestamp,
    MesgIndex,
    MesgName,
    FieldIndex,
    FieldName,
    FieldType,
    ValueString,
    ValueInteger,
    ValueFloat,
    Units,
}

impl ColumnId {
    pub const COUNT: usize = 17;

    pub const ALL: [ColumnId; Self::COUNT] = [
        ColumnId::SourceFiletype,
        ColumnId::SourceFilename,
        ColumnId::SourceFileUri,
        ColumnId::ManufacturerIndex,
        ColumnId::ManufacturerName,
        ColumnId::ProductIndex,
        ColumnId::ProductName,
        ColumnId::Timestamp,
        ColumnId::MesgIndex,
        ColumnId::MesgName,
        ColumnId::FieldIndex,
        ColumnId::FieldName,
        ColumnId::FieldType,
        ColumnId::ValueString,
        ColumnId::ValueInteger,
        ColumnId::ValueFloat,
        ColumnId::Units,
    ];

    /// Configuration key and output column name.
    pub fn key(self) -> &'static str {
        match self {
            ColumnId::SourceFiletype => "source_filetype",
            ColumnId::SourceFilename => "source_filename",
            ColumnId::SourceFileUri => "source_file_uri",
            ColumnId::ManufacturerIndex => "manufacturer_index",
            ColumnId::ManufacturerName => "manufacturer_name",
            ColumnId::ProductIndex => "product_index",
            ColumnId::ProductName => "product_name",
            ColumnId::Timestamp => "timestamp",
            ColumnId::MesgIndex => "mesg_index",
            ColumnId::MesgName => "mesg_name",
            ColumnId::FieldIndex => "field_index",
            ColumnId::FieldName => "field_name",
            ColumnId::FieldType => "field_type",
            ColumnId::ValueString => "value_string",
            ColumnId::ValueInteger => "value_integer",
            ColumnId::ValueFloat => "value_float",
            ColumnId::Units => "units",
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            ColumnId::ManufacturerIndex
            | ColumnId::ProductIndex
            | ColumnId::MesgIndex
            | ColumnId::FieldIndex => ColumnKind::Int32,
            ColumnId::ValueInteger => ColumnKind::Int64,
            ColumnId::ValueFloat => ColumnKind::Float64,
            ColumnId::Timestamp => ColumnKind::TimestampSeconds,
            _ => ColumnKind::Utf8,
        }
    }

    /// Nullability is fixed per column: identity and name columns are
    /// required, everything that can legitimately be absent is optional.
    pub fn nullable(self) -> bool {
        matches!(
            self,
            ColumnId::ProductName
                | ColumnId::Timestamp
                | ColumnId::FieldIndex
                | ColumnId::FieldType
                | ColumnId::ValueInteger
                | ColumnId::ValueFloat
                | ColumnId::Units
        )
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// One run's resolved column selection and emission flags.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSchema {
    enabled: [bool; ColumnId::COUNT],
    pub exclude_empty_values: bool,
    pub exclude_timestamp_values: bool,
    pub unix_epoch: bool,
}

impl ResolvedSchema {
    pub fn from_config(config: &Config) -> Self {
        let mut enabled = [false; ColumnId::COUNT];
        for id in ColumnId::ALL {
            enabled[id.index()] = config.is_true(id.key());
        }
        Self {
            enabled,
            exclude_empty_values: config.is_true(KEY_EXCLUDE_EMPTY_VALUES),
            exclude_timestamp_values: config.is_true(KEY_EXCLUDE_TIMESTAMP_VALUES),
            unix_epoch: config.get(KEY_EPOCH_FORMAT) == Some("UNIX"),
        }
    }

    pub fn enabled(&self, id: ColumnId) -> bool {
        self.enabled[id.index()]
    }

    pub fn enabled_count(&self) -> usize {
        self.enabled.iter().filter(|e| **e).count()
    }

    /// Whether the value triple needs integer/float classification at all.
    /// With all three consumers disabled the engine skips that work.
    pub fn needs_value_typing(&self) -> bool {
        self.enabled(ColumnId::FieldType)
            || self.enabled(ColumnId::ValueInteger)
            || self.enabled(ColumnId::ValueFloat)
    }

    /// The Arrow schema over the enabled columns, in candidate order.
    pub fn to_arrow(&self) -> SchemaRef {
        let fields: Vec<Field> = ColumnId::ALL
            .iter()
            .filter(|id| self.enabled(**id))
            .map(|id| Field::new(id.key(), id.kind().data_type(), id.nullable()))
            .collect();
        Arc::new(Schema::new(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_enabled_schema_order() {
        let schema = ResolvedSchema::from_config(&Config::default());
        let arrow = schema.to_arrow();
        assert_eq!(arrow.fields().len(), ColumnId::COUNT);
        assert_eq!(arrow.field(0).name(), "source_filetype");
        assert_eq!(arrow.field(7).name(), "timestamp");
        assert_eq!(arrow.field(16).name(), "units");
    }

    #[test]
    fn test_nullability_fixed_per_column() {
        let schema = ResolvedSchema::from_config(&Config::default());
        let arrow = schema.to_arrow();
        assert!(!arrow.field_with_name("value_string").unwrap().is_nullable());
        assert!(arrow.field_with_name("value_integer").unwrap().is_nullable());
        assert!(arrow.field_with_name("value_float").unwrap().is_nullable());
        assert!(!arrow.field_with_name("mesg_name").unwrap().is_nullable());
        assert!(arrow.field_with_name("product_name").unwrap().is_nullable());
    }

    #[test]
    fn test_unconfigured_columns_disabled() {
        let config = Config::from_pairs([("mesg_name", "true"), ("value_string", "yes")]);
        let schema = ResolvedSchema::from_config(&config);
        assert!(schema.enabled(ColumnId::MesgName));
        // Only the literal "true" enables a column.
        assert!(!schema.enabled(ColumnId::ValueString));
        assert_eq!(schema.enabled_count(), 1);
        assert_eq!(schema.to_arrow().fields().len(), 1);
    }

    #[test]
    fn test_epoch_mode_resolution() {
        let mut config = Config::default();
        assert!(ResolvedSchema::from_config(&config).unix_epoch);
        config.set(KEY_EPOCH_FORMAT, "FIT");
        assert!(!ResolvedSchema::from_config(&config).unix_epoch);
    }
}
