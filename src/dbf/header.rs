//! Table header and field descriptor parsing

use super::latin1;
use crate::error::ReadError;
use chrono::NaiveDate;
use serde::Serialize;

/// Size of the fixed table header
pub const HEADER_SIZE: usize = 32;

/// Version bytes written by dBASE II..7, FoxBASE, FoxPro and Visual FoxPro
const SUPPORTED_VERSIONS: &[u8] = &[
    0x02, 0x03, 0x04, 0x05, 0x30, 0x31, 0x32, 0x43, 0x63, 0x7B, 0x83, 0x8B, 0x8E, 0xCB, 0xE5,
    0xF5, 0xFB,
];

const DBASE7: u8 = 0x04;

/// Field type as declared in the descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldType {
    Character,
    Varchar,
    Numeric,
    Float,
    Logical,
    Date,
    DateTime,
    Integer,
    AutoIncrement,
    Double,
    /// `B`: a double in Visual FoxPro, a binary memo in dBASE
    Binary,
    Currency,
    Memo,
    General,
    Picture,
    Varbinary,
    NullFlags,
    Other(char),
}

impl FieldType {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'C' => Self::Character,
            b'V' => Self::Varchar,
            b'N' => Self::Numeric,
            b'F' => Self::Float,
            b'L' => Self::Logical,
            b'D' => Self::Date,
            b'T' => Self::DateTime,
            b'I' => Self::Integer,
            b'+' => Self::AutoIncrement,
            b'O' => Self::Double,
            b'B' => Self::Binary,
            b'Y' => Self::Currency,
            b'M' => Self::Memo,
            b'G' => Self::General,
            b'P' => Self::Picture,
            b'Q' => Self::Varbinary,
            b'0' => Self::NullFlags,
            other => Self::Other(other as char),
        }
    }

    /// Whether values of this type may point into the memo file
    pub fn uses_memo(self, length: usize) -> bool {
        match self {
            Self::Memo | Self::General | Self::Picture => true,
            Self::Binary => length != 8,
            _ => false,
        }
    }
}

/// One column definition from the header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    pub length: usize,
    pub decimals: u8,
}

/// Parsed table header
#[derive(Debug, Clone, Serialize)]
pub struct TableHeader {
    pub version: u8,
    pub last_update: Option<NaiveDate>,
    pub record_count: u32,
    pub header_length: usize,
    pub record_length: usize,
    pub language_driver: u8,
    pub fields: Vec<FieldDescriptor>,
}

impl TableHeader {
    /// Parse the header and field descriptors from the start of a table file
    pub fn parse(data: &[u8]) -> Result<Self, ReadError> {
        if data.len() < HEADER_SIZE {
            return Err(ReadError::bad_header(format!(
                "file is {} bytes, shorter than the {HEADER_SIZE}-byte table header",
                data.len()
            )));
        }

        let version = data[0];
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ReadError::UnsupportedVersion { version });
        }

        let last_update = NaiveDate::from_ymd_opt(
            1900 + i32::from(data[1]),
            u32::from(data[2]),
            u32::from(data[3]),
        );
        let record_count = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        let header_length = usize::from(u16::from_le_bytes([data[8], data[9]]));
        let record_length = usize::from(u16::from_le_bytes([data[10], data[11]]));
        let language_driver = data[29];

        if header_length > data.len() {
            return Err(ReadError::bad_header(format!(
                "header length {header_length} exceeds file size {}",
                data.len()
            )));
        }

        let fields = parse_descriptors(data, version, header_length)?;

        let fields_width: usize = fields.iter().map(|f| f.length).sum();
        if fields_width + 1 > record_length {
            return Err(ReadError::bad_header(format!(
                "fields need {} bytes but records are {record_length} bytes",
                fields_width + 1
            )));
        }

        Ok(Self {
            version,
            last_update,
            record_count,
            header_length,
            record_length,
            language_driver,
            fields,
        })
    }

    /// Whether any field needs the memo file
    pub fn has_memo_fields(&self) -> bool {
        self.fields
            .iter()
            .any(|f| f.field_type.uses_memo(f.length))
    }
}

/// Byte layout of the field descriptor array for a table version
struct DescriptorLayout {
    start: usize,
    size: usize,
    name_len: usize,
    length_at: usize,
}

fn descriptor_layout(version: u8) -> DescriptorLayout {
    if version == DBASE7 {
        DescriptorLayout {
            start: 68,
            size: 48,
            name_len: 32,
            length_at: 33,
        }
    } else {
        DescriptorLayout {
            start: HEADER_SIZE,
            size: 32,
            name_len: 11,
            length_at: 16,
        }
    }
}

fn parse_descriptors(
    data: &[u8],
    version: u8,
    header_length: usize,
) -> Result<Vec<FieldDescriptor>, ReadError> {
    let DescriptorLayout {
        start,
        size,
        name_len,
        length_at,
    } = descriptor_layout(version);
    let mut fields = Vec::new();
    let mut offset = start;

    loop {
        if offset >= header_length {
            return Err(ReadError::bad_header(
                "field descriptor terminator not found",
            ));
        }
        if matches!(data[offset], 0x0D | 0x0A) {
            break;
        }
        if offset + size > header_length {
            return Err(ReadError::bad_header(format!(
                "truncated field descriptor at offset {offset}"
            )));
        }

        let desc = &data[offset..offset + size];
        let name_bytes = &desc[..name_len];
        let name_end = name_bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(name_len);
        let name = latin1(&name_bytes[..name_end]).trim().to_string();
        if name.is_empty() {
            return Err(ReadError::bad_header(format!(
                "field {} has an empty name",
                fields.len() + 1
            )));
        }

        let field_type = FieldType::from_byte(desc[name_len]);
        let mut length = usize::from(desc[length_at]);
        let mut decimals = desc[length_at + 1];
        // Clipper and FoxPro store the high byte of long character fields in the decimal count
        if field_type == FieldType::Character && decimals > 0 {
            length += usize::from(decimals) << 8;
            decimals = 0;
        }

        fields.push(FieldDescriptor {
            name,
            field_type,
            length,
            decimals,
        });

        offset += size;
    }

    if fields.is_empty() {
        return Err(ReadError::bad_header("table declares no fields"));
    }

    Ok(fields)
}
