use arrow::array::{Array, Float64Array, Int64Array, StringArray, TimestampSecondArray};
use fit_parquet::config::Config;
use fit_parquet::emitter::RowEmitter;
use fit_parquet::fit::mesg::{BaseType, Field, Mesg, Value, MESG_NUM_INVALID};
use fit_parquet::fit::profile::FIT_EPOCH_OFFSET_SECS;
use fit_parquet::fit::MesgHandler;
use fit_parquet::schema::ResolvedSchema;

fn uint_field(num: u16, name: &str, base_type: BaseType, value: u64) -> Field {
    Field {
        num,
        name: name.to_string(),
        units: String::new(),
        base_type,
        scale: 1.0,
        offset: 0.0,
        values: vec![Value::Uint(value)],
    }
}

fn string_field(num: u16, name: &str, value: &str) -> Field {
    Field {
        num,
        name: name.to_string(),
        units: String::new(),
        base_type: BaseType::String,
        scale: 1.0,
        offset: 0.0,
        values: vec![Value::Text(value.to_string())],
    }
}

fn file_id_mesg(manufacturer: u16, product: u16) -> Mesg {
    Mesg {
        num: 0,
        name: "file_id".to_string(),
        fields: vec![
            uint_field(1, "manufacturer", BaseType::Uint16, u64::from(manufacturer)),
            uint_field(2, "product", BaseType::Uint16, u64::from(product)),
        ],
        developer_fields: Vec::new(),
    }
}

fn record_mesg(fields: Vec<Field>) -> Mesg {
    Mesg {
        num: 20,
        name: "record".to_string(),
        fields,
        developer_fields: Vec::new(),
    }
}

fn emitter_with(config: &Config) -> RowEmitter {
    RowEmitter::new(ResolvedSchema::from_config(config))
}

fn string_column(columns: &[std::sync::Arc<dyn Array>], idx: usize) -> &StringArray {
    columns[idx].as_any().downcast_ref::<StringArray>().unwrap()
}

// ============================================================================
// IDENTITY GATING
// ============================================================================

#[test]
fn test_no_rows_before_identity_resolution() {
    let mut emitter = emitter_with(&Config::default());

    let record = record_mesg(vec![uint_field(3, "heart_rate", BaseType::Uint8, 150)]);
    emitter.on_mesg(&record).unwrap();
    assert_eq!(emitter.row_count(), 0);

    emitter.on_mesg(&file_id_mesg(1, 1036)).unwrap();
    emitter.on_mesg(&record).unwrap();
    // file_id is itself data-bearing: two identity fields plus one record row
    assert_eq!(emitter.row_count(), 3);
}

#[test]
fn test_invalid_mesg_dropped_silently() {
    let mut emitter = emitter_with(&Config::default());
    let unknown = Mesg {
        num: MESG_NUM_INVALID,
        name: "unknown".to_string(),
        fields: vec![uint_field(0, "unknown", BaseType::Uint8, 1)],
        developer_fields: Vec::new(),
    };
    emitter.on_mesg(&unknown).unwrap();
    assert_eq!(emitter.mesg_count(), 0);
    assert_eq!(emitter.row_count(), 0);
}

#[test]
fn test_identity_denormalized_onto_rows() {
    let mut emitter = emitter_with(&Config::default());
    emitter.on_mesg(&file_id_mesg(1, 1036)).unwrap();
    emitter
        .on_mesg(&record_mesg(vec![uint_field(
            3,
            "heart_rate",
            BaseType::Uint8,
            150,
        )]))
        .unwrap();

    let (schema, columns) = emitter.finish_table();
    let names = string_column(&columns, schema.index_of("manufacturer_name").unwrap());
    let products = string_column(&columns, schema.index_of("product_name").unwrap());
    for i in 0..names.len() {
        assert_eq!(names.value(i), "GARMIN");
        assert_eq!(products.value(i), "EDGE500");
    }
}

// ============================================================================
// LOCKSTEP INVARIANT
// ============================================================================

#[test]
fn test_all_columns_advance_in_lockstep() {
    let mut emitter = emitter_with(&Config::default());
    emitter.on_mesg(&file_id_mesg(1, 1036)).unwrap();
    emitter
        .on_mesg(&record_mesg(vec![
            uint_field(253, "timestamp", BaseType::Uint32, 1000),
            uint_field(3, "heart_rate", BaseType::Uint8, 150),
            string_field(200, "label", "abc"),
        ]))
        .unwrap();

    let expected = emitter.row_count();
    let (_, columns) = emitter.finish_table();
    assert_eq!(expected, 5);
    assert!(columns.iter().all(|c| c.len() == expected));
}

#[test]
fn test_lockstep_with_sparse_column_selection() {
    let config = Config::from_pairs([
        ("mesg_name", "true"),
        ("value_integer", "true"),
        ("timestamp", "true"),
    ]);
    let mut emitter = emitter_with(&config);
    emitter.on_mesg(&file_id_mesg(1, 1036)).unwrap();
    emitter
        .on_mesg(&record_mesg(vec![
            uint_field(3, "heart_rate", BaseType::Uint8, 150),
            string_field(200, "label", "abc"),
        ]))
        .unwrap();

    let (schema, columns) = emitter.finish_table();
    assert_eq!(schema.fields().len(), 3);
    assert!(columns.iter().all(|c| c.len() == 4));
}

// ============================================================================
// VALUE CLASSIFICATION
// ============================================================================

#[test]
fn test_integer_classification_unscaled() {
    let mut emitter = emitter_with(&Config::default());
    emitter.on_mesg(&file_id_mesg(1, 1036)).unwrap();
    emitter
        .on_mesg(&record_mesg(vec![uint_field(
            3,
            "heart_rate",
            BaseType::Uint8,
            150,
        )]))
        .unwrap();

    let (schema, columns) = emitter.finish_table();
    let row = columns[0].len() - 1;

    let types = string_column(&columns, schema.index_of("field_type").unwrap());
    assert_eq!(types.value(row), "integer");

    let ints = columns[schema.index_of("value_integer").unwrap()]
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap();
    assert_eq!(ints.value(row), 150);

    let floats = columns[schema.index_of("value_float").unwrap()]
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert!(floats.is_null(row));

    let strings = string_column(&columns, schema.index_of("value_string").unwrap());
    assert_eq!(strings.value(row), "150");
}

#[test]
fn test_float_classification_scaled() {
    let mut emitter = emitter_with(&Config::default());
    emitter.on_mesg(&file_id_mesg(1, 1036)).unwrap();
    let altitude = Field {
        num: 2,
        name: "altitude".to_string(),
        units: "m".to_string(),
        base_type: BaseType::Uint16,
        scale: 5.0,
        offset: 500.0,
        values: vec![Value::Uint(3003)],
    };
    emitter.on_mesg(&record_mesg(vec![altitude])).unwrap();

    let (schema, columns) = emitter.finish_table();
    let row = columns[0].len() - 1;

    let types = string_column(&columns, schema.index_of("field_type").unwrap());
    assert_eq!(types.value(row), "float");

    let ints = columns[schema.index_of("value_integer").unwrap()]
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap();
    assert!(ints.is_null(row));

    let floats = columns[schema.index_of("value_float").unwrap()]
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert!((floats.value(row) - 100.6).abs() < 1e-9);

    let units = string_column(&columns, schema.index_of("units").unwrap());
    assert_eq!(units.value(row), "m");
}

#[test]
fn test_string_classification() {
    let mut emitter = emitter_with(&Config::default());
    emitter.on_mesg(&file_id_mesg(1, 1036)).unwrap();
    emitter
        .on_mesg(&record_mesg(vec![string_field(200, "label", "tempo run")]))
        .unwrap();

    let (schema, columns) = emitter.finish_table();
    let row = columns[0].len() - 1;

    let types = string_column(&columns, schema.index_of("field_type").unwrap());
    assert_eq!(types.value(row), "string");
    let ints = columns[schema.index_of("value_integer").unwrap()]
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap();
    assert!(ints.is_null(row));
    let floats = columns[schema.index_of("value_float").unwrap()]
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert!(floats.is_null(row));
    let strings = string_column(&columns, schema.index_of("value_string").unwrap());
    assert_eq!(strings.value(row), "tempo run");
}

#[test]
fn test_unknown_base_type_emits_empty_string_row() {
    let mut emitter = emitter_with(&Config::default());
    emitter.on_mesg(&file_id_mesg(1, 1036)).unwrap();
    let odd = Field {
        num: 60,
        name: "unknown".to_string(),
        units: String::new(),
        base_type: BaseType::Unknown(0x55),
        scale: 1.0,
        offset: 0.0,
        values: vec![Value::Uint(9)],
    };
    emitter.on_mesg(&record_mesg(vec![odd])).unwrap();

    let (schema, columns) = emitter.finish_table();
    assert_eq!(columns[0].len(), 3);
    let row = 2;
    let types = string_column(&columns, schema.index_of("field_type").unwrap());
    assert_eq!(types.value(row), "string");
    let strings = string_column(&columns, schema.index_of("value_string").unwrap());
    assert_eq!(strings.value(row), "");
}

// ============================================================================
// TIMESTAMP DENORMALIZATION
// ============================================================================

fn timestamped_record() -> Mesg {
    record_mesg(vec![
        uint_field(3, "heart_rate", BaseType::Uint8, 150),
        uint_field(253, "timestamp", BaseType::Uint32, 1000),
        uint_field(7, "power", BaseType::Uint16, 220),
    ])
}

#[test]
fn test_timestamp_backfilled_onto_whole_block() {
    let mut emitter = emitter_with(&Config::default());
    emitter.on_mesg(&file_id_mesg(1, 1036)).unwrap();
    emitter.on_mesg(&timestamped_record()).unwrap();

    let (schema, columns) = emitter.finish_table();
    let ts = columns[schema.index_of("timestamp").unwrap()]
        .as_any()
        .downcast_ref::<TimestampSecondArray>()
        .unwrap();
    // The timestamp applies to rows emitted before the field in file order
    // too: the whole record block carries it, three rows in this message.
    let last = ts.len() - 1;
    for row in [last - 2, last - 1, last] {
        assert_eq!(ts.value(row), 1000 + FIT_EPOCH_OFFSET_SECS);
    }
}

#[test]
fn test_exclude_timestamp_values_still_captures() {
    let mut config = Config::default();
    config.set("exclude_timestamp_values", "true");
    let mut emitter = emitter_with(&config);
    emitter.on_mesg(&file_id_mesg(1, 1036)).unwrap();
    emitter.on_mesg(&timestamped_record()).unwrap();

    let (schema, columns) = emitter.finish_table();
    // heart_rate and power rows only; the raw timestamp row is elided
    assert_eq!(columns[0].len(), 4);
    let names = string_column(&columns, schema.index_of("field_name").unwrap());
    for i in 0..names.len() {
        assert_ne!(names.value(i), "timestamp");
    }
    let ts = columns[schema.index_of("timestamp").unwrap()]
        .as_any()
        .downcast_ref::<TimestampSecondArray>()
        .unwrap();
    assert_eq!(ts.value(2), 1000 + FIT_EPOCH_OFFSET_SECS);
    assert_eq!(ts.value(3), 1000 + FIT_EPOCH_OFFSET_SECS);
}

#[test]
fn test_timestamp_null_when_never_seen() {
    let mut emitter = emitter_with(&Config::default());
    emitter.on_mesg(&file_id_mesg(1, 1036)).unwrap();
    emitter
        .on_mesg(&record_mesg(vec![uint_field(
            3,
            "heart_rate",
            BaseType::Uint8,
            150,
        )]))
        .unwrap();

    let (schema, columns) = emitter.finish_table();
    let ts = columns[schema.index_of("timestamp").unwrap()]
        .as_any()
        .downcast_ref::<TimestampSecondArray>()
        .unwrap();
    for row in 0..ts.len() {
        assert!(ts.is_null(row));
    }
}

#[test]
fn test_timestamp_falls_back_to_time_created() {
    let mut emitter = emitter_with(&Config::default());
    let mut file_id = file_id_mesg(1, 1036);
    file_id
        .fields
        .push(uint_field(4, "time_created", BaseType::Uint32, 500));
    emitter.on_mesg(&file_id).unwrap();
    emitter
        .on_mesg(&record_mesg(vec![uint_field(
            3,
            "heart_rate",
            BaseType::Uint8,
            150,
        )]))
        .unwrap();

    let (schema, columns) = emitter.finish_table();
    let ts = columns[schema.index_of("timestamp").unwrap()]
        .as_any()
        .downcast_ref::<TimestampSecondArray>()
        .unwrap();
    assert_eq!(ts.value(ts.len() - 1), 500 + FIT_EPOCH_OFFSET_SECS);
}

#[test]
fn test_raw_epoch_mode_leaves_device_seconds() {
    let mut config = Config::default();
    config.set("epoch_format", "FIT");
    let mut emitter = emitter_with(&config);
    emitter.on_mesg(&file_id_mesg(1, 1036)).unwrap();
    emitter.on_mesg(&timestamped_record()).unwrap();

    let (schema, columns) = emitter.finish_table();
    let ts = columns[schema.index_of("timestamp").unwrap()]
        .as_any()
        .downcast_ref::<TimestampSecondArray>()
        .unwrap();
    assert_eq!(ts.value(ts.len() - 1), 1000);
}

// ============================================================================
// VALUE FILTERS AND DEVELOPER FIELDS
// ============================================================================

#[test]
fn test_exclude_empty_values_skips_invalid() {
    let mut config = Config::default();
    config.set("exclude_empty_values", "true");
    let mut emitter = emitter_with(&config);
    emitter.on_mesg(&file_id_mesg(1, 1036)).unwrap();
    emitter
        .on_mesg(&record_mesg(vec![
            uint_field(3, "heart_rate", BaseType::Uint8, 0xFF),
            uint_field(7, "power", BaseType::Uint16, 220),
        ]))
        .unwrap();
    // only the power row survives the filter
    assert_eq!(emitter.row_count(), 3);
}

#[test]
fn test_developer_field_has_no_timestamp_special_case() {
    let mut emitter = emitter_with(&Config::default());
    emitter.on_mesg(&file_id_mesg(1, 1036)).unwrap();
    let mut mesg = record_mesg(vec![uint_field(3, "heart_rate", BaseType::Uint8, 150)]);
    // a developer field named "timestamp" must not become the block time
    mesg.developer_fields
        .push(uint_field(0, "timestamp", BaseType::Uint32, 7777));
    emitter.on_mesg(&mesg).unwrap();

    let (schema, columns) = emitter.finish_table();
    let ts = columns[schema.index_of("timestamp").unwrap()]
        .as_any()
        .downcast_ref::<TimestampSecondArray>()
        .unwrap();
    for row in 0..ts.len() {
        assert!(ts.is_null(row));
    }
}

#[test]
fn test_reset_clears_rows_and_identity() {
    let mut emitter = emitter_with(&Config::default());
    emitter.on_mesg(&file_id_mesg(1, 1036)).unwrap();
    emitter
        .on_mesg(&record_mesg(vec![uint_field(
            3,
            "heart_rate",
            BaseType::Uint8,
            150,
        )]))
        .unwrap();
    assert!(emitter.row_count() > 0);

    emitter.reset();
    assert_eq!(emitter.row_count(), 0);

    // Identity must be gone: data messages drop again until a new file_id.
    emitter
        .on_mesg(&record_mesg(vec![uint_field(
            3,
            "heart_rate",
            BaseType::Uint8,
            150,
        )]))
        .unwrap();
    assert_eq!(emitter.row_count(), 0);
    let (_, columns) = emitter.finish_table();
    assert!(columns.iter().all(|c| c.is_empty()));
}
