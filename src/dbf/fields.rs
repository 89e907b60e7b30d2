//! Field value decoders
//!
//! Each decoder turns the raw bytes of one field into a [`Value`]. Decoders
//! return `Err(message)` for malformed data and leave the error policy to the
//! reader.

use super::header::{FieldDescriptor, FieldType};
use super::latin1;
use super::memo::{Memo, MemoFile};
use crate::types::Value;
use chrono::{NaiveDate, TimeDelta};

/// Julian day number of 0001-01-01 minus one
const JULIAN_DAY_OFFSET: i64 = 1_721_425;

/// Outcome of decoding a single field
pub type FieldResult = std::result::Result<Value, String>;

/// Decodes fields of one table, with access to its memo file
pub struct FieldDecoder<'a> {
    memo: Option<&'a MemoFile>,
}

impl<'a> FieldDecoder<'a> {
    pub fn new(memo: Option<&'a MemoFile>) -> Self {
        Self { memo }
    }

    /// Decode the raw bytes of a field
    pub fn decode(&self, field: &FieldDescriptor, raw: &[u8]) -> FieldResult {
        match field.field_type {
            FieldType::Character | FieldType::Varchar => Ok(decode_character(raw)),
            FieldType::Numeric | FieldType::Float => decode_numeric(raw),
            FieldType::Logical => decode_logical(raw),
            FieldType::Date => decode_date(raw),
            FieldType::DateTime => decode_datetime(raw),
            FieldType::Integer | FieldType::AutoIncrement => decode_integer(raw),
            FieldType::Double => decode_double(raw),
            FieldType::Currency => decode_currency(raw),
            FieldType::Binary if raw.len() == 8 => decode_double(raw),
            FieldType::Memo => self.decode_memo(raw, false),
            FieldType::Binary | FieldType::General | FieldType::Picture => {
                self.decode_memo(raw, true)
            }
            FieldType::Varbinary | FieldType::NullFlags | FieldType::Other(_) => {
                Ok(Value::Binary(raw.to_vec()))
            }
        }
    }

    fn decode_memo(&self, raw: &[u8], binary: bool) -> FieldResult {
        let index = memo_index(raw)?;
        if index == 0 {
            return Ok(Value::Null);
        }
        let Some(memo) = self.memo else {
            return Ok(Value::Null);
        };

        match memo.get(index)? {
            Memo::Text(bytes) if !binary => Ok(Value::Text(latin1(&bytes))),
            Memo::Text(bytes) | Memo::Binary(bytes) => Ok(Value::Binary(bytes)),
        }
    }
}

fn decode_character(raw: &[u8]) -> Value {
    let end = raw
        .iter()
        .rposition(|&b| b != b' ' && b != 0)
        .map_or(0, |i| i + 1);
    Value::Text(latin1(&raw[..end]))
}

fn decode_numeric(raw: &[u8]) -> FieldResult {
    let text = latin1(raw);
    let trimmed = text
        .trim_matches(|c: char| c.is_whitespace() || c == '\0')
        .trim_matches('*');

    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Ok(Value::Integer(i));
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .map(Value::Float)
        .map_err(|_| format!("invalid number {trimmed:?}"))
}

fn decode_logical(raw: &[u8]) -> FieldResult {
    match raw.first() {
        None | Some(b'?' | b' ') => Ok(Value::Null),
        Some(b'T' | b't' | b'Y' | b'y') => Ok(Value::Logical(true)),
        Some(b'F' | b'f' | b'N' | b'n') => Ok(Value::Logical(false)),
        Some(other) => Err(format!("invalid logical value 0x{other:02X}")),
    }
}

fn decode_date(raw: &[u8]) -> FieldResult {
    let text = latin1(raw);

    if text.len() == 8 && text.bytes().all(|b| b.is_ascii_digit()) {
        let year = text[0..4].parse::<i32>().unwrap_or(0);
        let month = text[4..6].parse::<u32>().unwrap_or(0);
        let day = text[6..8].parse::<u32>().unwrap_or(0);
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Ok(Value::Date(date));
        }
    }

    // Spaces and zeros only is how dBASE writes an empty date
    if text.trim_matches(|c| c == ' ' || c == '0').is_empty() {
        Ok(Value::Null)
    } else {
        Err(format!("invalid date {text:?}"))
    }
}

fn decode_datetime(raw: &[u8]) -> FieldResult {
    if raw.iter().all(|&b| b == b' ' || b == 0) {
        return Ok(Value::Null);
    }
    let bytes = fixed::<8>(raw, "datetime")?;
    let day = i64::from(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]));
    let millis = i64::from(u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]));
    if day == 0 {
        return Ok(Value::Null);
    }

    let days_from_ce = i32::try_from(day - JULIAN_DAY_OFFSET)
        .map_err(|_| format!("julian day {day} out of range"))?;
    NaiveDate::from_num_days_from_ce_opt(days_from_ce)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .zip(TimeDelta::try_milliseconds(millis))
        .and_then(|(midnight, offset)| midnight.checked_add_signed(offset))
        .map(Value::DateTime)
        .ok_or_else(|| format!("invalid datetime (day {day}, {millis} ms)"))
}

fn decode_integer(raw: &[u8]) -> FieldResult {
    let bytes = fixed::<4>(raw, "integer")?;
    Ok(Value::Integer(i64::from(i32::from_le_bytes(bytes))))
}

fn decode_double(raw: &[u8]) -> FieldResult {
    let bytes = fixed::<8>(raw, "double")?;
    Ok(Value::Float(f64::from_le_bytes(bytes)))
}

fn decode_currency(raw: &[u8]) -> FieldResult {
    let bytes = fixed::<8>(raw, "currency")?;
    Ok(Value::Float(i64::from_le_bytes(bytes) as f64 / 10_000.0))
}

/// Memo references are 4-byte little endian in Visual FoxPro, ASCII digits elsewhere
fn memo_index(raw: &[u8]) -> std::result::Result<u32, String> {
    if raw.len() == 4 {
        return Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]));
    }
    let text = latin1(raw);
    let trimmed = text.trim_matches(|c: char| c.is_whitespace() || c == '\0');
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<u32>()
        .map_err(|_| format!("invalid memo index {trimmed:?}"))
}

fn fixed<const N: usize>(raw: &[u8], what: &str) -> std::result::Result<[u8; N], String> {
    raw.try_into()
        .map_err(|_| format!("{what} field must be {N} bytes, got {}", raw.len()))
}
