//! Streaming FIT container decoder.
//!
//! Validates the file header and CRC, then walks the record stream:
//! definition records establish the wire layout for a local message type,
//! data records decode against it and are pushed to a [`MesgHandler`], one
//! callback per message in file order. Developer fields are resolved through
//! `field_description` messages seen earlier in the stream.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::debug;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::fit::mesg::{
    BaseType, Field, Mesg, Value, FIELD_NUM_TIMESTAMP, MESG_NUM_FIELD_DESCRIPTION,
    MESG_NUM_INVALID,
};
use crate::fit::profile;

const HEADER_MAGIC: &[u8; 4] = b".FIT";
const COMPRESSED_HEADER_BIT: u8 = 0x80;
const DEFINITION_BIT: u8 = 0x40;
const DEVELOPER_DATA_BIT: u8 = 0x20;

const CRC_TABLE: [u16; 16] = [
    0x0000, 0xCC01, 0xD801, 0x1401, 0xF001, 0x3C01, 0x2801, 0xE401, 0xA001, 0x6C01, 0x7801,
    0xB401, 0x5001, 0x9C01, 0x8801, 0x4401,
];

/// FIT CRC-16 (nibble-table form of CRC-16/ARC).
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        let tmp = CRC_TABLE[(crc & 0xF) as usize];
        crc = (crc >> 4) & 0x0FFF;
        crc = crc ^ tmp ^ CRC_TABLE[(byte & 0xF) as usize];
        let tmp = CRC_TABLE[(crc & 0xF) as usize];
        crc = (crc >> 4) & 0x0FFF;
        crc = crc ^ tmp ^ CRC_TABLE[((byte >> 4) & 0xF) as usize];
    }
    crc
}

/// Receives decoded messages, one callback per message in file order.
pub trait MesgHandler {
    fn on_mesg(&mut self, mesg: &Mesg) -> Result<()>;
}

#[derive(Debug, Clone)]
struct FieldDef {
    num: u8,
    size: u8,
    base_type: BaseType,
}

#[derive(Debug, Clone)]
struct DevFieldDef {
    num: u8,
    size: u8,
    dev_data_index: u8,
}

#[derive(Debug, Clone)]
struct MesgDefinition {
    global_num: u16,
    big_endian: bool,
    fields: Vec<FieldDef>,
    dev_fields: Vec<DevFieldDef>,
}

#[derive(Debug, Clone)]
struct DevFieldDescription {
    base_type: BaseType,
    name: String,
    units: String,
}

struct FileHeader {
    header_size: usize,
    data_size: usize,
}

fn parse_header(data: &[u8]) -> Result<FileHeader> {
    if data.len() < 12 {
        return Err(Error::InvalidFormat("file too short for header".to_string()));
    }
    let header_size = data[0] as usize;
    if header_size != 12 && header_size != 14 {
        return Err(Error::InvalidFormat(format!(
            "unsupported header size {header_size}"
        )));
    }
    if &data[8..12] != HEADER_MAGIC {
        return Err(Error::InvalidFormat("missing .FIT magic bytes".to_string()));
    }
    let data_size = LittleEndian::read_u32(&data[4..8]) as usize;
    if data.len() < header_size + data_size + 2 {
        return Err(Error::InvalidFormat(format!(
            "declared data size {data_size} exceeds file length"
        )));
    }
    Ok(FileHeader {
        header_size,
        data_size,
    })
}

fn take(data: &[u8], pos: usize, n: usize) -> Result<&[u8]> {
    data.get(pos..pos + n)
        .ok_or_else(|| Error::Decode(format!("record truncated at offset {pos}")))
}

/// Streaming decoder over one FIT byte stream.
///
/// Definition state accumulates as the stream is walked, so a decoder
/// instance is good for exactly one pass over one file.
pub struct Decoder {
    definitions: HashMap<u8, MesgDefinition>,
    dev_descriptions: HashMap<(u8, u8), DevFieldDescription>,
    last_timestamp: Option<u32>,
}

impl Decoder {
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
            dev_descriptions: HashMap::new(),
            last_timestamp: None,
        }
    }

    /// Structural integrity check: header layout, header CRC when present,
    /// and the trailing file CRC over header plus data.
    pub fn check_integrity(data: &[u8]) -> bool {
        let header = match parse_header(data) {
            Ok(h) => h,
            Err(_) => return false,
        };
        if header.header_size == 14 {
            let stored = LittleEndian::read_u16(&data[12..14]);
            if stored != 0 && stored != crc16(&data[..12]) {
                return false;
            }
        }
        let end = header.header_size + header.data_size;
        let stored = LittleEndian::read_u16(&data[end..end + 2]);
        crc16(&data[..end]) == stored
    }

    /// Decode the whole stream, pushing each message into `handler`.
    pub fn decode(&mut self, data: &[u8], handler: &mut dyn MesgHandler) -> Result<()> {
        let header = parse_header(data)?;
        let mut pos = header.header_size;
        let end = header.header_size + header.data_size;

        while pos < end {
            let hdr = data[pos];
            pos += 1;

            if hdr & COMPRESSED_HEADER_BIT != 0 {
                let local = (hdr >> 5) & 0x03;
                let time_offset = hdr & 0x1F;
                let (mut mesg, next) =
                    decode_data_mesg(self.definition(local)?, &self.dev_descriptions, data, pos)?;
                pos = next;
                if let Some(ts) = self.advance_compressed_timestamp(time_offset) {
                    if mesg.field_by_num(FIELD_NUM_TIMESTAMP).is_none() {
                        mesg.fields.push(timestamp_field(ts));
                    }
                }
                self.observe(&mesg);
                handler.on_mesg(&mesg)?;
            } else if hdr & DEFINITION_BIT != 0 {
                let local = hdr & 0x0F;
                let has_dev = hdr & DEVELOPER_DATA_BIT != 0;
                pos = self.read_definition(data, pos, local, has_dev)?;
            } else {
                let local = hdr & 0x0F;
                let (mesg, next) =
                    decode_data_mesg(self.definition(local)?, &self.dev_descriptions, data, pos)?;
                pos = next;
                self.observe(&mesg);
                handler.on_mesg(&mesg)?;
            }
        }

        Ok(())
    }

    fn definition(&self, local: u8) -> Result<&MesgDefinition> {
        self.definitions.get(&local).ok_or_else(|| {
            Error::Decode(format!(
                "data record references undefined local message type {local}"
            ))
        })
    }

    fn read_definition(
        &mut self,
        data: &[u8],
        mut pos: usize,
        local: u8,
        has_dev: bool,
    ) -> Result<usize> {
        let fixed = take(data, pos, 5)?;
        let big_endian = fixed[1] == 1;
        let global_num = if big_endian {
            BigEndian::read_u16(&fixed[2..4])
        } else {
            LittleEndian::read_u16(&fixed[2..4])
        };
        let num_fields = fixed[4] as usize;
        pos += 5;

        let mut fields = Vec::with_capacity(num_fields);
        for _ in 0..num_fields {
            let triple = take(data, pos, 3)?;
            fields.push(FieldDef {
                num: triple[0],
                size: triple[1],
                base_type: BaseType::from_code(triple[2]),
            });
            pos += 3;
        }

        let mut dev_fields = Vec::new();
        if has_dev {
            let num_dev = take(data, pos, 1)?[0] as usize;
            pos += 1;
            for _ in 0..num_dev {
                let triple = take(data, pos, 3)?;
                dev_fields.push(DevFieldDef {
                    num: triple[0],
                    size: triple[1],
                    dev_data_index: triple[2],
                });
                pos += 3;
            }
        }

        self.definitions.insert(
            local,
            MesgDefinition {
                global_num,
                big_endian,
                fields,
                dev_fields,
            },
        );
        Ok(pos)
    }

    /// Tracks stream state fed by decoded messages: the most recent
    /// timestamp (for compressed headers) and developer field descriptions.
    fn observe(&mut self, mesg: &Mesg) {
        if let Some(field) = mesg.field_by_num(FIELD_NUM_TIMESTAMP) {
            if let Some(ts) = field.uint32_value(0) {
                self.last_timestamp = Some(ts);
            }
        }
        if mesg.num == MESG_NUM_FIELD_DESCRIPTION {
            self.register_field_description(mesg);
        }
    }

    fn register_field_description(&mut self, mesg: &Mesg) {
        let dev_index = mesg.field_by_num(0).and_then(|f| f.uint16_value(0));
        let field_num = mesg.field_by_num(1).and_then(|f| f.uint16_value(0));
        let base_code = mesg.field_by_num(2).and_then(|f| f.uint16_value(0));
        let (Some(dev_index), Some(field_num), Some(base_code)) =
            (dev_index, field_num, base_code)
        else {
            debug!("ignoring incomplete field_description message");
            return;
        };
        let name = mesg
            .field_by_num(3)
            .map(|f| f.string_value(0))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "unknown".to_string());
        let units = mesg
            .field_by_num(8)
            .map(|f| f.string_value(0))
            .unwrap_or_default();
        self.dev_descriptions.insert(
            (dev_index as u8, field_num as u8),
            DevFieldDescription {
                base_type: BaseType::from_code(base_code as u8),
                name,
                units,
            },
        );
    }

    /// Applies a 5-bit compressed time offset to the last known timestamp,
    /// with rollover. Returns `None` until a full timestamp has been seen.
    fn advance_compressed_timestamp(&mut self, time_offset: u8) -> Option<u32> {
        let prev = self.last_timestamp?;
        let prev_offset = (prev & 0x1F) as u8;
        let mut ts = (prev & !0x1F) | u32::from(time_offset);
        if time_offset < prev_offset {
            ts += 0x20;
        }
        self.last_timestamp = Some(ts);
        Some(ts)
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_data_mesg(
    def: &MesgDefinition,
    dev_descriptions: &HashMap<(u8, u8), DevFieldDescription>,
    data: &[u8],
    mut pos: usize,
) -> Result<(Mesg, usize)> {
    let mut fields = Vec::with_capacity(def.fields.len());
    for fd in &def.fields {
        let bytes = take(data, pos, fd.size as usize)?;
        pos += fd.size as usize;
        let values = decode_values(bytes, fd.base_type, def.big_endian);
        if values.is_empty() {
            continue;
        }
        let info = profile::field_info(def.global_num, fd.num);
        fields.push(Field {
            num: u16::from(fd.num),
            name: info.map_or_else(|| "unknown".to_string(), |i| i.name.to_string()),
            units: info.map_or_else(String::new, |i| i.units.to_string()),
            base_type: fd.base_type,
            scale: info.map_or(1.0, |i| i.scale),
            offset: info.map_or(0.0, |i| i.offset),
            values,
        });
    }

    let mut developer_fields = Vec::new();
    for dd in &def.dev_fields {
        let bytes = take(data, pos, dd.size as usize)?;
        pos += dd.size as usize;
        match dev_descriptions.get(&(dd.dev_data_index, dd.num)) {
            Some(desc) => {
                let values = decode_values(bytes, desc.base_type, def.big_endian);
                if values.is_empty() {
                    continue;
                }
                developer_fields.push(Field {
                    num: u16::from(dd.num),
                    name: desc.name.clone(),
                    units: desc.units.clone(),
                    base_type: desc.base_type,
                    scale: 1.0,
                    offset: 0.0,
                    values,
                });
            }
            None => debug!(
                "skipping developer field {} with no field_description (data index {})",
                dd.num, dd.dev_data_index
            ),
        }
    }

    let (num, name) = match profile::mesg_name(def.global_num) {
        Some(n) => (def.global_num, n.to_string()),
        None => (MESG_NUM_INVALID, "unknown".to_string()),
    };

    Ok((
        Mesg {
            num,
            name,
            fields,
            developer_fields,
        },
        pos,
    ))
}

fn timestamp_field(ts: u32) -> Field {
    Field {
        num: u16::from(FIELD_NUM_TIMESTAMP),
        name: "timestamp".to_string(),
        units: "s".to_string(),
        base_type: BaseType::Uint32,
        scale: 1.0,
        offset: 0.0,
        values: vec![Value::Uint(u64::from(ts))],
    }
}

fn decode_values(bytes: &[u8], base: BaseType, big_endian: bool) -> Vec<Value> {
    if base == BaseType::String {
        let terminated = bytes.split(|&b| b == 0).next().unwrap_or(bytes);
        return vec![Value::Text(String::from_utf8_lossy(terminated).into_owned())];
    }
    let size = base.size();
    let count = bytes.len() / size;
    let mut values = Vec::with_capacity(count);
    for k in 0..count {
        let chunk = &bytes[k * size..(k + 1) * size];
        values.push(if big_endian {
            decode_scalar::<BigEndian>(chunk, base)
        } else {
            decode_scalar::<LittleEndian>(chunk, base)
        });
    }
    values
}

fn decode_scalar<B: ByteOrder>(bytes: &[u8], base: BaseType) -> Value {
    match base {
        BaseType::Enum
        | BaseType::Uint8
        | BaseType::Uint8z
        | BaseType::Byte
        | BaseType::Unknown(_) => Value::Uint(u64::from(bytes[0])),
        BaseType::Sint8 => Value::Sint(i64::from(bytes[0] as i8)),
        BaseType::Sint16 => Value::Sint(i64::from(B::read_i16(bytes))),
        BaseType::Uint16 | BaseType::Uint16z => Value::Uint(u64::from(B::read_u16(bytes))),
        BaseType::Sint32 => Value::Sint(i64::from(B::read_i32(bytes))),
        BaseType::Uint32 | BaseType::Uint32z => Value::Uint(u64::from(B::read_u32(bytes))),
        BaseType::Sint64 => Value::Sint(B::read_i64(bytes)),
        BaseType::Uint64 | BaseType::Uint64z => Value::Uint(B::read_u64(bytes)),
        BaseType::Float32 => Value::Float(f64::from(B::read_f32(bytes))),
        BaseType::Float64 => Value::Float(B::read_f64(bytes)),
        BaseType::String => unreachable!("strings decoded separately"),
    }
}
