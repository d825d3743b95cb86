//! Decoded message and field model.
//!
//! A [`Mesg`] is one decoded unit of the FIT stream: a global message number,
//! a profile-resolved name, and the message's fields (standard and
//! developer-defined). Fields carry their declared base type plus the
//! scale/offset transform from the profile, and expose typed accessors over
//! their raw values.

use crate::fit::profile;

/// Global message number of the `file_id` message.
pub const MESG_NUM_FILE_ID: u16 = 0;
/// Global message number of the `field_description` message.
pub const MESG_NUM_FIELD_DESCRIPTION: u16 = 206;
/// Sentinel for messages whose global number is not in the profile.
pub const MESG_NUM_INVALID: u16 = 0xFFFF;

/// Sentinel for fields without a definition number.
pub const FIELD_NUM_INVALID: u16 = 0xFFFF;
/// Field definition number of the standard `timestamp` field.
pub const FIELD_NUM_TIMESTAMP: u8 = 253;

/// FIT base types, tagged by the profile's base type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Enum,
    Sint8,
    Uint8,
    Sint16,
    Uint16,
    Sint32,
    Uint32,
    String,
    Float32,
    Float64,
    Uint8z,
    Uint16z,
    Uint32z,
    Byte,
    Sint64,
    Uint64,
    Uint64z,
    /// Base type code not in the profile; values decode as invalid.
    Unknown(u8),
}

impl BaseType {
    pub fn from_code(code: u8) -> BaseType {
        match code {
            0x00 => BaseType::Enum,
            0x01 => BaseType::Sint8,
            0x02 => BaseType::Uint8,
            0x83 => BaseType::Sint16,
            0x84 => BaseType::Uint16,
            0x85 => BaseType::Sint32,
            0x86 => BaseType::Uint32,
            0x07 => BaseType::String,
            0x88 => BaseType::Float32,
            0x89 => BaseType::Float64,
            0x0A => BaseType::Uint8z,
            0x8B => BaseType::Uint16z,
            0x8C => BaseType::Uint32z,
            0x0D => BaseType::Byte,
            0x8E => BaseType::Sint64,
            0x8F => BaseType::Uint64,
            0x90 => BaseType::Uint64z,
            other => BaseType::Unknown(other),
        }
    }

    /// Wire size of one value of this type, in bytes.
    pub fn size(&self) -> usize {
        match self {
            BaseType::Enum
            | BaseType::Sint8
            | BaseType::Uint8
            | BaseType::Uint8z
            | BaseType::Byte
            | BaseType::String
            | BaseType::Unknown(_) => 1,
            BaseType::Sint16 | BaseType::Uint16 | BaseType::Uint16z => 2,
            BaseType::Sint32 | BaseType::Uint32 | BaseType::Uint32z | BaseType::Float32 => 4,
            BaseType::Sint64
            | BaseType::Uint64
            | BaseType::Uint64z
            | BaseType::Float64 => 8,
        }
    }

    /// Whether this is one of the integer-like base types subject to
    /// integer-vs-float value classification.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            BaseType::Enum
                | BaseType::Byte
                | BaseType::Sint8
                | BaseType::Uint8
                | BaseType::Sint16
                | BaseType::Uint16
                | BaseType::Sint32
                | BaseType::Uint32
                | BaseType::Sint64
                | BaseType::Uint64
                | BaseType::Uint8z
                | BaseType::Uint16z
                | BaseType::Uint32z
                | BaseType::Uint64z
        )
    }
}

/// One raw decoded value, before any scale/offset transform.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Sint(i64),
    Uint(u64),
    Float(f64),
    Text(String),
}

/// A named, typed, possibly multi-valued attribute of a message.
#[derive(Debug, Clone)]
pub struct Field {
    pub num: u16,
    pub name: String,
    pub units: String,
    pub base_type: BaseType,
    pub scale: f64,
    pub offset: f64,
    pub values: Vec<Value>,
}

impl Field {
    pub fn num_values(&self) -> usize {
        self.values.len()
    }

    fn has_transform(&self) -> bool {
        self.scale != 1.0 || self.offset != 0.0
    }

    /// Whether the value at `j` is a real reading, as opposed to the base
    /// type's FIT invalid sentinel.
    pub fn is_valid(&self, j: usize) -> bool {
        let value = match self.values.get(j) {
            Some(v) => v,
            None => return false,
        };
        match (self.base_type, value) {
            (BaseType::Enum, Value::Uint(u)) => *u != 0xFF,
            (BaseType::Uint8, Value::Uint(u)) => *u != 0xFF,
            (BaseType::Byte, Value::Uint(u)) => *u != 0xFF,
            (BaseType::Uint8z, Value::Uint(u)) => *u != 0,
            (BaseType::Uint16, Value::Uint(u)) => *u != 0xFFFF,
            (BaseType::Uint16z, Value::Uint(u)) => *u != 0,
            (BaseType::Uint32, Value::Uint(u)) => *u != 0xFFFF_FFFF,
            (BaseType::Uint32z, Value::Uint(u)) => *u != 0,
            (BaseType::Uint64, Value::Uint(u)) => *u != u64::MAX,
            (BaseType::Uint64z, Value::Uint(u)) => *u != 0,
            (BaseType::Sint8, Value::Sint(i)) => *i != i64::from(i8::MAX),
            (BaseType::Sint16, Value::Sint(i)) => *i != i64::from(i16::MAX),
            (BaseType::Sint32, Value::Sint(i)) => *i != i64::from(i32::MAX),
            (BaseType::Sint64, Value::Sint(i)) => *i != i64::MAX,
            (BaseType::Float32 | BaseType::Float64, Value::Float(f)) => !f.is_nan(),
            (BaseType::String, Value::Text(s)) => !s.is_empty(),
            (BaseType::Unknown(_), _) => false,
            _ => false,
        }
    }

    /// Raw integer interpretation: no scale/offset applied.
    pub fn sint64_value(&self, j: usize) -> i64 {
        match self.values.get(j) {
            Some(Value::Sint(i)) => *i,
            Some(Value::Uint(u)) => *u as i64,
            Some(Value::Float(f)) => *f as i64,
            _ => 0,
        }
    }

    /// Float interpretation with the field's scale/offset transform applied.
    pub fn float64_value(&self, j: usize) -> f64 {
        let raw = match self.values.get(j) {
            Some(Value::Sint(i)) => *i as f64,
            Some(Value::Uint(u)) => *u as f64,
            Some(Value::Float(f)) => *f,
            _ => 0.0,
        };
        if self.has_transform() {
            raw / self.scale - self.offset
        } else {
            raw
        }
    }

    /// The value at `j` as a valid u32, or `None` when absent or invalid.
    pub fn uint32_value(&self, j: usize) -> Option<u32> {
        match self.values.get(j) {
            Some(Value::Uint(u)) if self.is_valid(j) => Some(*u as u32),
            _ => None,
        }
    }

    /// The value at `j` as a valid u16, or `None` when absent or invalid.
    pub fn uint16_value(&self, j: usize) -> Option<u16> {
        match self.values.get(j) {
            Some(Value::Uint(u)) if self.is_valid(j) => Some(*u as u16),
            _ => None,
        }
    }

    /// Canonical text rendering of the value at `j`.
    ///
    /// Invalid values render as the empty string. Numeric values render
    /// scaled when the field carries a transform, raw otherwise.
    pub fn string_value(&self, j: usize) -> String {
        if !self.is_valid(j) {
            return String::new();
        }
        match &self.values[j] {
            Value::Text(s) => s.clone(),
            Value::Sint(i) if !self.has_transform() => i.to_string(),
            Value::Uint(u) if !self.has_transform() => u.to_string(),
            _ => self.float64_value(j).to_string(),
        }
    }
}

/// One decoded message: global number, profile name, and fields.
#[derive(Debug, Clone)]
pub struct Mesg {
    pub num: u16,
    pub name: String,
    pub fields: Vec<Field>,
    pub developer_fields: Vec<Field>,
}

impl Mesg {
    pub fn field_by_num(&self, num: u8) -> Option<&Field> {
        self.fields.iter().find(|f| f.num == u16::from(num))
    }
}

/// Typed view over a `file_id` message.
///
/// Extracted once by pattern-matching the generic message, so identity
/// resolution never inspects raw fields twice. The vendor-specific product
/// accessors mirror the profile's product subfields: they resolve only when
/// the manufacturer matches the vendor.
#[derive(Debug, Clone, Default)]
pub struct FileIdMesg {
    pub time_created: Option<u32>,
    pub manufacturer: Option<u16>,
    product: Option<u16>,
}

impl FileIdMesg {
    /// Returns the typed view when `mesg` is a `file_id` message.
    pub fn from_mesg(mesg: &Mesg) -> Option<FileIdMesg> {
        if mesg.num != MESG_NUM_FILE_ID {
            return None;
        }
        Some(FileIdMesg {
            time_created: mesg.field_by_num(4).and_then(|f| f.uint32_value(0)),
            manufacturer: mesg.field_by_num(1).and_then(|f| f.uint16_value(0)),
            product: mesg.field_by_num(2).and_then(|f| f.uint16_value(0)),
        })
    }

    /// Product index when the manufacturer is Favero Electronics.
    pub fn favero_product(&self) -> Option<u16> {
        if self.manufacturer == Some(profile::MANUFACTURER_FAVERO_ELECTRONICS) {
            self.product
        } else {
            None
        }
    }

    /// Product index when the manufacturer is Garmin or a Dynastream OEM.
    pub fn garmin_product(&self) -> Option<u16> {
        match self.manufacturer {
            Some(profile::MANUFACTURER_GARMIN)
            | Some(profile::MANUFACTURER_DYNASTREAM)
            | Some(profile::MANUFACTURER_DYNASTREAM_OEM) => self.product,
            _ => None,
        }
    }

    /// Generic product index, for any manufacturer.
    pub fn product(&self) -> Option<u16> {
        self.product
    }
}
