//! Decoders for the primitive encodings BSII fields are stored in.
//!
//! Everything here reads little-endian from a shared cursor and leans on
//! [`ReadLe`](crate::ioutils::ReadLe) for exact truncation reporting. The
//! interesting encodings are the base-38 token packing, the dotted
//! identifier scheme and the placement bias recovery; the rest are plain
//! fixed-width reads and count-prefixed repetitions.

use std::collections::HashMap;
use std::io::Cursor;

use crate::ioutils::ReadLe;
use crate::types::{Float2, Float3, Float4, Int3, Placement7, Placement8, UnitId};
use crate::{Error, Result};

/// Characters a packed token can carry, in base-38 digit order.
/// Digit 0 is reserved as "no character".
const TOKEN_ALPHABET: &[u8; 37] = b"0123456789abcdefghijklmnopqrstuvwxyz_";

/// Unpack a base-38 token from its `u64` form.
///
/// Digits come out least-significant first and append in that order, so the
/// packed value reads back directly. Value 0 is the empty string.
pub(crate) fn unpack_token(mut value: u64) -> String {
    let mut out = String::new();
    while value != 0 {
        let digit = (value % 38) as usize;
        value /= 38;
        if digit > 0 {
            out.push(char::from(TOKEN_ALPHABET[digit - 1]));
        }
    }
    out
}

/// Read a length-prefixed UTF-8 string. Invalid byte sequences are
/// replaced, never rejected.
pub(crate) fn read_string(pos: &mut Cursor<&[u8]>) -> Result<String> {
    let len = pos.read_u32le()? as usize;
    let bytes = pos.read_slice(len)?;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

/// Read one packed token.
pub(crate) fn read_token(pos: &mut Cursor<&[u8]>) -> Result<String> {
    Ok(unpack_token(pos.read_u64le()?))
}

/// Read a unit identifier.
///
/// The leading part count selects the shape: 0 is the null identity, 0xFF
/// an anonymous 64-bit address, anything else that many packed token parts.
pub(crate) fn read_id(pos: &mut Cursor<&[u8]>) -> Result<UnitId> {
    let part_count = pos.read_u8()?;
    match part_count {
        0 => Ok(UnitId::Null),
        0xff => Ok(UnitId::Nameless(pos.read_u64le()?)),
        n => {
            let n = n as usize;
            let needed = n * size_of::<u64>();
            if pos.remaining() < needed {
                return Err(Error::Truncated {
                    offset: pos.position() as usize,
                    needed,
                    available: pos.remaining(),
                });
            }
            let mut parts = Vec::with_capacity(n);
            for _ in 0..n {
                parts.push(unpack_token(pos.read_u64le()?));
            }
            Ok(UnitId::Named(parts))
        }
    }
}

/// Read a byte boolean (nonzero = true).
pub(crate) fn read_bool(pos: &mut Cursor<&[u8]>) -> Result<bool> {
    Ok(pos.read_u8()? != 0)
}

pub(crate) fn read_float2(pos: &mut Cursor<&[u8]>) -> Result<Float2> {
    Ok(Float2 {
        a: pos.read_f32le()?,
        b: pos.read_f32le()?,
    })
}

pub(crate) fn read_float3(pos: &mut Cursor<&[u8]>) -> Result<Float3> {
    Ok(Float3 {
        a: pos.read_f32le()?,
        b: pos.read_f32le()?,
        c: pos.read_f32le()?,
    })
}

pub(crate) fn read_float4(pos: &mut Cursor<&[u8]>) -> Result<Float4> {
    Ok(Float4 {
        a: pos.read_f32le()?,
        b: pos.read_f32le()?,
        c: pos.read_f32le()?,
        d: pos.read_f32le()?,
    })
}

pub(crate) fn read_int3(pos: &mut Cursor<&[u8]>) -> Result<Int3> {
    Ok(Int3 {
        a: pos.read_i32le()?,
        b: pos.read_i32le()?,
        c: pos.read_i32le()?,
    })
}

/// Read a version-1 placement: six floats on the wire, `g` fixed to 0.
pub(crate) fn read_placement7(pos: &mut Cursor<&[u8]>) -> Result<Placement7> {
    Ok(Placement7 {
        a: pos.read_f32le()?,
        b: pos.read_f32le()?,
        c: pos.read_f32le()?,
        d: pos.read_f32le()?,
        e: pos.read_f32le()?,
        f: pos.read_f32le()?,
        g: 0.0,
    })
}

/// Read a version-2+ placement and fold the packed bias back in.
///
/// `d` carries two 12-bit words, each biased by 2048 and scaled by 512:
/// the low word extends `a`, the high word extends `c`. The addition runs
/// in `f64` so the only rounding step is the final narrowing.
pub(crate) fn read_placement8(pos: &mut Cursor<&[u8]>) -> Result<Placement8> {
    let mut v = Placement8 {
        a: pos.read_f32le()?,
        b: pos.read_f32le()?,
        c: pos.read_f32le()?,
        d: pos.read_f32le()?,
        e: pos.read_f32le()?,
        f: pos.read_f32le()?,
        g: pos.read_f32le()?,
        h: pos.read_f32le()?,
    };

    let bias = f64::from(v.d).floor() as i64;
    let offset_a = ((bias & 0xfff) - 2048) << 9;
    let offset_c = (((bias >> 12) & 0xfff) - 2048) << 9;
    v.a = (f64::from(v.a) + offset_a as f64) as f32;
    v.c = (f64::from(v.c) + offset_c as f64) as f32;

    Ok(v)
}

/// Read an inline ordinal string table: count-prefixed
/// `(u32 ordinal, string)` pairs. Duplicate ordinals keep the last value.
pub(crate) fn read_ordinal_table(pos: &mut Cursor<&[u8]>) -> Result<HashMap<u32, String>> {
    let count = pos.read_u32le()? as usize;
    // Each entry needs at least its ordinal and a string length prefix.
    let needed = count.saturating_mul(2 * size_of::<u32>());
    if pos.remaining() < needed {
        return Err(Error::Truncated {
            offset: pos.position() as usize,
            needed,
            available: pos.remaining(),
        });
    }

    let mut table = HashMap::with_capacity(count);
    for _ in 0..count {
        let ordinal = pos.read_u32le()?;
        let value = read_string(pos)?;
        table.insert(ordinal, value);
    }
    Ok(table)
}

/// Read a count-prefixed array of `elem`s.
///
/// `min_elem_width` is the smallest number of bytes one element can occupy;
/// the count is checked against the remaining buffer before anything is
/// allocated, so a corrupt count fails as `Truncated` instead of reserving
/// gigabytes.
pub(crate) fn read_array<'a, T>(
    pos: &mut Cursor<&'a [u8]>,
    min_elem_width: usize,
    mut elem: impl FnMut(&mut Cursor<&'a [u8]>) -> Result<T>,
) -> Result<Vec<T>> {
    let count = pos.read_u32le()? as usize;
    let needed = count.saturating_mul(min_elem_width);
    if pos.remaining() < needed {
        return Err(Error::Truncated {
            offset: pos.position() as usize,
            needed,
            available: pos.remaining(),
        });
    }

    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(elem(pos)?);
    }
    Ok(items)
}
