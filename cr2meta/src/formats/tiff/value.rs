// SPDX-License-Identifier: MIT
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use std::{fmt::Display, io::Cursor};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::reader::{EndianReader, ReadByteOrder};
use crate::{Result, bits::Endian};

/// TIFF field types
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, enumn::N)]
#[repr(u16)]
pub enum TagType {
  /// 8-bit unsigned integer
  BYTE = 1,
  /// 8-bit byte that contains a 7-bit ASCII code; the last byte must be zero
  ASCII = 2,
  /// 16-bit unsigned integer
  SHORT = 3,
  /// 32-bit unsigned integer
  LONG = 4,
  /// Fraction stored as two 32-bit unsigned integers
  RATIONAL = 5,
  /// 8-bit signed integer
  SBYTE = 6,
  /// 8-bit byte that may contain anything, depending on the field
  UNDEFINED = 7,
  /// 16-bit signed integer
  SSHORT = 8,
  /// 32-bit signed integer
  SLONG = 9,
  /// Fraction stored as two 32-bit signed integers
  SRATIONAL = 10,
  /// 32-bit IEEE floating point
  FLOAT = 11,
  /// 64-bit IEEE floating point
  DOUBLE = 12,
}

impl TagType {
  /// Size of a single value of this type in bytes
  pub fn size(&self) -> usize {
    match self {
      Self::BYTE | Self::ASCII | Self::SBYTE | Self::UNDEFINED => 1,
      Self::SHORT | Self::SSHORT => 2,
      Self::LONG | Self::SLONG | Self::FLOAT => 4,
      Self::RATIONAL | Self::SRATIONAL | Self::DOUBLE => 8,
    }
  }

  /// Size of a single value for a raw type code.
  /// Unknown codes are handled as opaque bytes.
  pub fn size_of_code(typ: u16) -> usize {
    Self::n(typ).map(|t| t.size()).unwrap_or(1)
  }
}

/// Type to represent tiff values of type `RATIONAL`
#[derive(Clone, Debug, Default, PartialEq, Copy)]
pub struct Rational {
  pub n: u32,
  pub d: u32,
}

impl Rational {
  pub fn new(n: u32, d: u32) -> Self {
    Self { n, d }
  }
}

impl Display for Rational {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_fmt(format_args!("{}/{}", self.n, self.d))
  }
}

impl From<Rational> for f32 {
  fn from(v: Rational) -> Self {
    (v.n as f32) / (v.d as f32)
  }
}

impl Serialize for Rational {
  fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

impl<'de> Deserialize<'de> for Rational {
  fn deserialize<D>(deserializer: D) -> std::result::Result<Rational, D::Error>
  where
    D: Deserializer<'de>,
  {
    use serde::de::Error;
    let s = String::deserialize(deserializer)?;
    match s.split_once('/') {
      Some((n, d)) => Ok(Rational::new(
        n.parse::<u32>().map_err(D::Error::custom)?,
        d.parse::<u32>().map_err(D::Error::custom)?,
      )),
      None => Err(D::Error::custom(format!("Invalid rational value: {}", s))),
    }
  }
}

/// Type to represent tiff values of type `SRATIONAL`
#[derive(Clone, Debug, Default, PartialEq, Copy)]
pub struct SRational {
  pub n: i32,
  pub d: i32,
}

impl SRational {
  pub fn new(n: i32, d: i32) -> Self {
    Self { n, d }
  }
}

impl Display for SRational {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_fmt(format_args!("{}/{}", self.n, self.d))
  }
}

impl From<SRational> for f32 {
  fn from(v: SRational) -> Self {
    (v.n as f32) / (v.d as f32)
  }
}

impl Serialize for SRational {
  fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

impl<'de> Deserialize<'de> for SRational {
  fn deserialize<D>(deserializer: D) -> std::result::Result<SRational, D::Error>
  where
    D: Deserializer<'de>,
  {
    use serde::de::Error;
    let s = String::deserialize(deserializer)?;
    match s.split_once('/') {
      Some((n, d)) => Ok(SRational::new(
        n.parse::<i32>().map_err(D::Error::custom)?,
        d.parse::<i32>().map_err(D::Error::custom)?,
      )),
      None => Err(D::Error::custom(format!("Invalid srational value: {}", s))),
    }
  }
}

/// Decoded value of a directory entry.
///
/// Every variant holds the complete sequence of `count` values.
/// Single-valued entries are a sequence of length one, use the scalar
/// accessors like `get_u32(0)` or `as_string()` to read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
  /// 8-bit unsigned integer
  Byte(Vec<u8>),
  /// ASCII string, trailing NULs removed
  Ascii(String),
  /// 16-bit unsigned integer
  Short(Vec<u16>),
  /// 32-bit unsigned integer
  Long(Vec<u32>),
  /// Fraction stored as two 32-bit unsigned integers
  Rational(Vec<Rational>),
  /// 8-bit signed integer
  SByte(Vec<i8>),
  /// 8-bit byte that may contain anything, depending on the field
  Undefined(Vec<u8>),
  /// 16-bit signed integer
  SShort(Vec<i16>),
  /// 32-bit signed integer
  SLong(Vec<i32>),
  /// Fraction stored as two 32-bit signed integers
  SRational(Vec<SRational>),
  /// 32-bit IEEE floating point
  Float(Vec<f32>),
  /// 64-bit IEEE floating point
  Double(Vec<f64>),
  /// Unknown type, wrapped in u8
  Unknown(u16, Vec<u8>),
}

impl Value {
  /// Decode `count` values of type `typ` from `data`.
  ///
  /// `data` must hold at least `count * TagType::size_of_code(typ)` bytes,
  /// surplus bytes (inline padding) are ignored.
  pub fn decode(typ: u16, count: usize, endian: Endian, data: &[u8]) -> Result<Value> {
    let mut cursor = Cursor::new(data);
    let mut reader = EndianReader::new(&mut cursor, endian);
    let value = match TagType::n(typ) {
      Some(TagType::BYTE) => {
        let mut v = vec![0; count];
        reader.read_u8_into(&mut v)?;
        Value::Byte(v)
      }
      Some(TagType::ASCII) => {
        let mut v = vec![0; count];
        reader.read_u8_into(&mut v)?;
        while v.last() == Some(&0) {
          v.pop();
        }
        Value::Ascii(String::from_utf8_lossy(&v).into_owned())
      }
      Some(TagType::SHORT) => {
        let mut v = vec![0; count];
        reader.read_u16_into(&mut v)?;
        Value::Short(v)
      }
      Some(TagType::LONG) => {
        let mut v = vec![0; count];
        reader.read_u32_into(&mut v)?;
        Value::Long(v)
      }
      Some(TagType::RATIONAL) => {
        let mut tmp = vec![0; count * 2]; // Rational is 2x u32
        reader.read_u32_into(&mut tmp)?;
        Value::Rational(tmp.chunks_exact(2).map(|p| Rational::new(p[0], p[1])).collect())
      }
      Some(TagType::SBYTE) => {
        let mut v = vec![0; count];
        reader.read_i8_into(&mut v)?;
        Value::SByte(v)
      }
      Some(TagType::UNDEFINED) => {
        let mut v = vec![0; count];
        reader.read_u8_into(&mut v)?;
        Value::Undefined(v)
      }
      Some(TagType::SSHORT) => {
        let mut v = vec![0; count];
        reader.read_i16_into(&mut v)?;
        Value::SShort(v)
      }
      Some(TagType::SLONG) => {
        let mut v = vec![0; count];
        reader.read_i32_into(&mut v)?;
        Value::SLong(v)
      }
      Some(TagType::SRATIONAL) => {
        let mut tmp = vec![0; count * 2]; // SRational is 2x i32
        reader.read_i32_into(&mut tmp)?;
        Value::SRational(tmp.chunks_exact(2).map(|p| SRational::new(p[0], p[1])).collect())
      }
      Some(TagType::FLOAT) => {
        let mut v = vec![0.0; count];
        reader.read_f32_into(&mut v)?;
        Value::Float(v)
      }
      Some(TagType::DOUBLE) => {
        let mut v = vec![0.0; count];
        reader.read_f64_into(&mut v)?;
        Value::Double(v)
      }
      None => {
        let mut v = vec![0; count];
        reader.read_u8_into(&mut v)?;
        Value::Unknown(typ, v)
      }
    };
    Ok(value)
  }

  pub fn as_string(&self) -> Option<&str> {
    match self {
      Self::Ascii(v) => Some(v.as_str()),
      _ => None,
    }
  }

  /// Get an integer value at position `idx`.
  ///
  /// Signed values are reinterpreted, non-integer types yield `None`.
  pub fn get_u32(&self, idx: usize) -> Option<u32> {
    match self {
      Value::Byte(v) => v.get(idx).map(|v| *v as u32),
      Value::Short(v) => v.get(idx).map(|v| *v as u32),
      Value::Long(v) => v.get(idx).copied(),
      Value::SByte(v) => v.get(idx).map(|v| *v as u32),
      Value::SShort(v) => v.get(idx).map(|v| *v as u32),
      Value::SLong(v) => v.get(idx).map(|v| *v as u32),
      _ => None,
    }
  }

  pub fn get_u16(&self, idx: usize) -> Option<u16> {
    self.get_u32(idx).map(|v| v as u16)
  }

  pub fn get_f32(&self, idx: usize) -> Option<f32> {
    match self {
      Value::Rational(v) => v.get(idx).map(|v| (*v).into()),
      Value::SRational(v) => v.get(idx).map(|v| (*v).into()),
      Value::Float(v) => v.get(idx).copied(),
      Value::Double(v) => v.get(idx).map(|v| *v as f32),
      _ => self.get_u32(idx).map(|v| v as f32),
    }
  }

  /// Raw bytes for byte-like types
  pub fn as_bytes(&self) -> Option<&[u8]> {
    match self {
      Value::Byte(v) | Value::Undefined(v) | Value::Unknown(_, v) => Some(v),
      _ => None,
    }
  }

  pub fn visual_rep(&self, limit: usize) -> String {
    fn join<T: Display>(v: &[T], limit: usize) -> String {
      v.iter().take(limit).map(|a| format!("{}", a)).collect::<Vec<String>>().join(" ")
    }
    fn join_hex(v: &[u8], limit: usize) -> String {
      v.iter().take(limit).map(|a| format!("{:02X}", a)).collect::<Vec<String>>().join(" ")
    }
    match self {
      Value::Byte(v) => join_hex(v, limit),
      Value::Ascii(v) => v.clone(),
      Value::Short(v) => join(v, limit),
      Value::Long(v) => join(v, limit),
      Value::Rational(v) => join(v, limit),
      Value::SByte(v) => join(v, limit),
      Value::Undefined(v) => join_hex(v, limit),
      Value::SShort(v) => join(v, limit),
      Value::SLong(v) => join(v, limit),
      Value::SRational(v) => join(v, limit),
      Value::Float(v) => join(v, limit),
      Value::Double(v) => join(v, limit),
      Value::Unknown(_, v) => join_hex(v, limit),
    }
  }

  /// Number of values. For ASCII this is the string length.
  pub fn count(&self) -> usize {
    match self {
      Self::Byte(v) => v.len(),
      Self::Ascii(v) => v.len(),
      Self::Short(v) => v.len(),
      Self::Long(v) => v.len(),
      Self::Rational(v) => v.len(),
      Self::SByte(v) => v.len(),
      Self::Undefined(v) => v.len(),
      Self::SShort(v) => v.len(),
      Self::SLong(v) => v.len(),
      Self::SRational(v) => v.len(),
      Self::Float(v) => v.len(),
      Self::Double(v) => v.len(),
      Self::Unknown(_, v) => v.len(),
    }
  }

  pub fn value_type(&self) -> u16 {
    match self {
      Self::Byte(_) => TagType::BYTE as u16,
      Self::Ascii(_) => TagType::ASCII as u16,
      Self::Short(_) => TagType::SHORT as u16,
      Self::Long(_) => TagType::LONG as u16,
      Self::Rational(_) => TagType::RATIONAL as u16,
      Self::SByte(_) => TagType::SBYTE as u16,
      Self::Undefined(_) => TagType::UNDEFINED as u16,
      Self::SShort(_) => TagType::SSHORT as u16,
      Self::SLong(_) => TagType::SLONG as u16,
      Self::SRational(_) => TagType::SRATIONAL as u16,
      Self::Float(_) => TagType::FLOAT as u16,
      Self::Double(_) => TagType::DOUBLE as u16,
      Self::Unknown(t, _) => *t,
    }
  }

  pub fn value_type_name(&self) -> String {
    match self {
      Self::Byte(_) => "BYTE".into(),
      Self::Ascii(_) => "ASCII".into(),
      Self::Short(_) => "SHORT".into(),
      Self::Long(_) => "LONG".into(),
      Self::Rational(_) => "RATIONAL".into(),
      Self::SByte(_) => "SBYTE".into(),
      Self::Undefined(_) => "UNDEF".into(),
      Self::SShort(_) => "SSHORT".into(),
      Self::SLong(_) => "SLONG".into(),
      Self::SRational(_) => "SRATIONAL".into(),
      Self::Float(_) => "FLOAT".into(),
      Self::Double(_) => "DOUBLE".into(),
      Self::Unknown(t, _) => format!("UNKNOWN ({})", t),
    }
  }
}
