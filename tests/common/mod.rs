/// Test utilities for building synthetic FIT files
use byteorder::{LittleEndian, WriteBytesExt};

/// FIT base type codes used across the tests
pub const ENUM: u8 = 0x00;
pub const UINT8: u8 = 0x02;
pub const UINT16: u8 = 0x84;
pub const UINT32: u8 = 0x86;
pub const STRING: u8 = 0x07;
pub const FLOAT64: u8 = 0x89;

/// Builder for creating FIT test files
pub struct FitFileBuilder {
    body: Vec<u8>,
}

impl FitFileBuilder {
    pub fn new() -> Self {
        Self { body: Vec::new() }
    }

    /// Add a definition record for a local message type (little endian)
    pub fn definition(mut self, local: u8, global: u16, fields: &[(u8, u8, u8)]) -> Self {
        self.body.push(0x40 | (local & 0x0F));
        self.body.push(0); // reserved
        self.body.push(0); // little endian architecture
        self.body.write_u16::<LittleEndian>(global).unwrap();
        self.body.push(fields.len() as u8);
        for &(num, size, base_type) in fields {
            self.body.push(num);
            self.body.push(size);
            self.body.push(base_type);
        }
        self
    }

    /// Add a definition record that also declares developer fields
    /// (dev field triples are `(field_num, size, dev_data_index)`)
    pub fn definition_with_dev(
        mut self,
        local: u8,
        global: u16,
        fields: &[(u8, u8, u8)],
        dev_fields: &[(u8, u8, u8)],
    ) -> Self {
        self.body.push(0x60 | (local & 0x0F));
        self.body.push(0);
        self.body.push(0);
        self.body.write_u16::<LittleEndian>(global).unwrap();
        self.body.push(fields.len() as u8);
        for &(num, size, base_type) in fields {
            self.body.push(num);
            self.body.push(size);
            self.body.push(base_type);
        }
        self.body.push(dev_fields.len() as u8);
        for &(num, size, dev_index) in dev_fields {
            self.body.push(num);
            self.body.push(size);
            self.body.push(dev_index);
        }
        self
    }

    /// Add a data record with a raw little-endian payload
    pub fn data(mut self, local: u8, payload: &[u8]) -> Self {
        self.body.push(local & 0x0F);
        self.body.extend_from_slice(payload);
        self
    }

    /// Add a compressed-timestamp data record (5-bit time offset)
    pub fn compressed_data(mut self, local: u8, time_offset: u8, payload: &[u8]) -> Self {
        self.body
            .push(0x80 | ((local & 0x03) << 5) | (time_offset & 0x1F));
        self.body.extend_from_slice(payload);
        self
    }

    /// Add a file_id definition (local type 0) plus its data record with
    /// manufacturer, product and time_created
    pub fn file_id(self, manufacturer: u16, product: u16, time_created: u32) -> Self {
        let mut payload = Vec::new();
        payload.write_u16::<LittleEndian>(manufacturer).unwrap();
        payload.write_u16::<LittleEndian>(product).unwrap();
        payload.write_u32::<LittleEndian>(time_created).unwrap();
        self.definition(0, 0, &[(1, 2, UINT16), (2, 2, UINT16), (4, 4, UINT32)])
            .data(0, &payload)
    }

    /// Build the final FIT byte stream: 14-byte header, records, file CRC
    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.body.len() + 16);
        out.push(14); // header size
        out.push(0x20); // protocol version 2.0
        out.write_u16::<LittleEndian>(2195).unwrap(); // profile version
        out.write_u32::<LittleEndian>(self.body.len() as u32).unwrap();
        out.extend_from_slice(b".FIT");
        let header_crc = crc16(&out[..12]);
        out.write_u16::<LittleEndian>(header_crc).unwrap();
        out.extend_from_slice(&self.body);
        let file_crc = crc16(&out);
        out.write_u16::<LittleEndian>(file_crc).unwrap();
        out
    }
}

impl Default for FitFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// FIT CRC-16 (nibble-table form of CRC-16/ARC)
pub fn crc16(data: &[u8]) -> u16 {
    const TABLE: [u16; 16] = [
        0x0000, 0xCC01, 0xD801, 0x1401, 0xF001, 0x3C01, 0x2801, 0xE401, 0xA001, 0x6C01, 0x7801,
        0xB401, 0x5001, 0x9C01, 0x8801, 0x4401,
    ];
    let mut crc: u16 = 0;
    for &byte in data {
        let tmp = TABLE[(crc & 0xF) as usize];
        crc = (crc >> 4) & 0x0FFF;
        crc = crc ^ tmp ^ TABLE[(byte & 0xF) as usize];
        let tmp = TABLE[(crc & 0xF) as usize];
        crc = (crc >> 4) & 0x0FFF;
        crc = crc ^ tmp ^ TABLE[((byte >> 4) & 0xF) as usize];
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc16_check_value() {
        // CRC-16/ARC check value
        assert_eq!(crc16(b"123456789"), 0xBB3D);
    }

    #[test]
    fn test_builder_header_layout() {
        let data = FitFileBuilder::new().build();
        assert_eq!(data[0], 14); // header size
        assert_eq!(&data[8..12], b".FIT");
        assert_eq!(&data[4..8], [0, 0, 0, 0]); // empty body
    }
}
