//! BSII block model resolver.
//!
//! A BSII stream is a header followed by records, each introduced by a
//! `u32` tag. Tag 0 is a structure template (a named, ordered field
//! schema keyed by structure id); any other tag is an instance of the
//! template registered under that id. Templates must therefore appear
//! before their instances, which the game's own writer guarantees.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::io::Cursor;

use tracing::{debug, trace, warn};

use crate::file::SIGNATURE_BINARY;
use crate::ioutils::ReadLe;
use crate::primitives;
use crate::types::{DataType, Field, Unit, Value};
use crate::{Error, Result};

/// BSII stream header: magic plus format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BsiiHeader {
    /// Raw signature value (`BSII` little-endian).
    pub signature: u32,
    /// Format version; 1, 2 and 3 are supported. Version 1 stores
    /// placements as six floats, later versions as eight with a packed
    /// precision bias.
    pub version: u32,
}

impl BsiiHeader {
    /// Parse and validate the 8-byte stream header.
    pub fn parse(pos: &mut Cursor<&[u8]>) -> Result<Self> {
        let signature = pos.read_u32le()?;
        if signature != SIGNATURE_BINARY {
            return Err(Error::UnknownSignature(signature));
        }

        let version = pos.read_u32le()?;
        if !(1..=3).contains(&version) {
            return Err(Error::UnsupportedVersion(version));
        }

        Ok(Self { signature, version })
    }
}

/// A fully decoded BSII stream: header plus unit instances in stream order.
#[derive(Debug, Clone)]
pub struct BsiiDocument {
    pub header: BsiiHeader,
    pub units: Vec<Unit>,
}

/// One field slot of a structure template.
#[derive(Debug, Clone)]
struct FieldSchema {
    name: String,
    tag: u32,
}

/// A registered structure template.
#[derive(Debug, Clone)]
struct Template {
    name: String,
    fields: Vec<FieldSchema>,
}

impl BsiiDocument {
    /// Decode a complete BSII buffer.
    ///
    /// One pass over the stream: templates register as they appear
    /// (first registration per structure id wins), instances decode
    /// against whatever is registered at that point. An instance whose
    /// id has no template is skipped with only its 4-byte tag consumed;
    /// if such a record carried data the rest of the stream is
    /// misaligned, but no better recovery is known for this format.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut pos = Cursor::new(data);
        let header = BsiiHeader::parse(&mut pos)?;
        debug!(version = header.version, len = data.len(), "decoding BSII stream");

        let mut templates: HashMap<u32, Template> = HashMap::new();
        let mut ordinals: HashMap<u32, HashMap<u32, String>> = HashMap::new();
        let mut units = Vec::new();

        // A record is always attempted after the header; exhaustion is
        // only checked at record boundaries.
        loop {
            let tag = pos.read_u32le()?;
            if tag == 0 {
                read_template(&mut pos, &mut templates, &mut ordinals)?;
            } else if let Some(unit) =
                decode_instance(&mut pos, tag, &templates, &ordinals, header.version)?
            {
                units.push(unit);
            }

            if pos.remaining() == 0 {
                break;
            }
        }

        debug!(
            templates = templates.len(),
            units = units.len(),
            "BSII decode pass complete"
        );

        Ok(Self { header, units })
    }
}

/// Read one template record (the leading zero tag is already consumed).
fn read_template(
    pos: &mut Cursor<&[u8]>,
    templates: &mut HashMap<u32, Template>,
    ordinals: &mut HashMap<u32, HashMap<u32, String>>,
) -> Result<()> {
    let valid = primitives::read_bool(pos)?;
    if !valid {
        debug!("invalid structure template, nothing to register");
        return Ok(());
    }

    let struct_id = pos.read_u32le()?;
    let name = primitives::read_string(pos)?;

    let mut fields = Vec::new();
    loop {
        let tag = pos.read_u32le()?;
        if tag == 0 {
            break;
        }
        let field_name = primitives::read_string(pos)?;

        // An ordinal field carries its value table inline in the schema.
        // The bytes must be consumed every time to stay aligned; only the
        // first table seen for a structure id is kept.
        if DataType::from_u32(tag) == Some(DataType::OrdinalString) {
            let table = primitives::read_ordinal_table(pos)?;
            ordinals.entry(struct_id).or_insert(table);
        }

        fields.push(FieldSchema {
            name: field_name,
            tag,
        });
    }

    trace!(
        struct_id,
        name = %name,
        fields = fields.len(),
        "structure template"
    );

    match templates.entry(struct_id) {
        Entry::Vacant(slot) => {
            slot.insert(Template { name, fields });
        }
        Entry::Occupied(_) => {
            debug!(struct_id, name = %name, "duplicate structure id, keeping first template");
        }
    }

    Ok(())
}

/// Decode one instance record against its registered template.
///
/// Returns `None` when no template exists for `struct_id`; in that case
/// nothing beyond the tag has been consumed.
fn decode_instance(
    pos: &mut Cursor<&[u8]>,
    struct_id: u32,
    templates: &HashMap<u32, Template>,
    ordinals: &HashMap<u32, HashMap<u32, String>>,
    version: u32,
) -> Result<Option<Unit>> {
    let Some(template) = templates.get(&struct_id) else {
        warn!(struct_id, "instance references unregistered structure, skipping tag");
        return Ok(None);
    };

    let id = primitives::read_id(pos)?;

    let empty = HashMap::new();
    let table = ordinals.get(&struct_id).unwrap_or(&empty);

    let mut fields = Vec::with_capacity(template.fields.len());
    for schema in &template.fields {
        let value = decode_value(pos, schema.tag, version, table, &schema.name)?;
        fields.push(Field {
            name: schema.name.clone(),
            tag: schema.tag,
            value,
        });
    }

    trace!(struct_id, class = %template.name, id = %id, "unit instance");

    Ok(Some(Unit {
        struct_id,
        class: template.name.clone(),
        id,
        fields,
    }))
}

/// Decode a single field value by its wire tag.
///
/// An unrecognized tag is not fatal: the slot stays `Unset` and decoding
/// continues, although with an unknown payload width the remainder of the
/// record can no longer be trusted.
fn decode_value(
    pos: &mut Cursor<&[u8]>,
    tag: u32,
    version: u32,
    ordinals: &HashMap<u32, String>,
    field_name: &str,
) -> Result<Value> {
    let Some(ty) = DataType::from_u32(tag) else {
        warn!(
            field = field_name,
            tag,
            "unknown field tag, leaving value unset (stream may be misaligned)"
        );
        return Ok(Value::Unset);
    };

    Ok(match ty {
        DataType::String => Value::String(primitives::read_string(pos)?),
        DataType::StringArray => {
            Value::StringArray(primitives::read_array(pos, 4, primitives::read_string)?)
        }
        DataType::Token => Value::Token(primitives::read_token(pos)?),
        DataType::TokenArray => {
            Value::TokenArray(primitives::read_array(pos, 8, primitives::read_token)?)
        }
        DataType::Float => Value::Float(pos.read_f32le()?),
        DataType::FloatArray => {
            Value::FloatArray(primitives::read_array(pos, 4, |p| p.read_f32le())?)
        }
        DataType::Float2 => Value::Float2(primitives::read_float2(pos)?),
        DataType::Float2Array => {
            Value::Float2Array(primitives::read_array(pos, 8, primitives::read_float2)?)
        }
        DataType::Float3 => Value::Float3(primitives::read_float3(pos)?),
        DataType::Float3Array => {
            Value::Float3Array(primitives::read_array(pos, 12, primitives::read_float3)?)
        }
        DataType::Int3 => Value::Int3(primitives::read_int3(pos)?),
        DataType::Int3Array => {
            Value::Int3Array(primitives::read_array(pos, 12, primitives::read_int3)?)
        }
        DataType::Float4 => Value::Float4(primitives::read_float4(pos)?),
        DataType::Float4Array => {
            Value::Float4Array(primitives::read_array(pos, 16, primitives::read_float4)?)
        }
        DataType::Placement => {
            if version == 1 {
                Value::Placement7(primitives::read_placement7(pos)?)
            } else {
                Value::Placement8(primitives::read_placement8(pos)?)
            }
        }
        DataType::PlacementArray => {
            if version == 1 {
                Value::Placement7Array(primitives::read_array(
                    pos,
                    24,
                    primitives::read_placement7,
                )?)
            } else {
                Value::Placement8Array(primitives::read_array(
                    pos,
                    32,
                    primitives::read_placement8,
                )?)
            }
        }
        DataType::Int32 => Value::Int32(pos.read_i32le()?),
        DataType::Int32Array => {
            Value::Int32Array(primitives::read_array(pos, 4, |p| p.read_i32le())?)
        }
        DataType::UInt32 => Value::UInt32(pos.read_u32le()?),
        DataType::UInt32Array => {
            Value::UInt32Array(primitives::read_array(pos, 4, |p| p.read_u32le())?)
        }
        DataType::Int16 => Value::Int16(pos.read_i16le()?),
        DataType::Int16Array => {
            Value::Int16Array(primitives::read_array(pos, 2, |p| p.read_i16le())?)
        }
        DataType::UInt16 => Value::UInt16(pos.read_u16le()?),
        DataType::UInt16Array => {
            Value::UInt16Array(primitives::read_array(pos, 2, |p| p.read_u16le())?)
        }
        DataType::Int64 => Value::Int64(pos.read_i64le()?),
        DataType::Int64Array => {
            Value::Int64Array(primitives::read_array(pos, 8, |p| p.read_i64le())?)
        }
        DataType::UInt64 => Value::UInt64(pos.read_u64le()?),
        DataType::UInt64Array => {
            Value::UInt64Array(primitives::read_array(pos, 8, |p| p.read_u64le())?)
        }
        DataType::Bool => Value::Bool(primitives::read_bool(pos)?),
        DataType::BoolArray => {
            Value::BoolArray(primitives::read_array(pos, 1, primitives::read_bool)?)
        }
        DataType::OrdinalString => {
            let index = pos.read_u32le()?;
            Value::OrdinalString(ordinals.get(&index).cloned().unwrap_or_default())
        }
        DataType::Id => Value::Id(primitives::read_id(pos)?),
        DataType::IdArray => Value::IdArray(primitives::read_array(pos, 1, primitives::read_id)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UnitId;

    fn push_u32(buf: &mut Vec<u8>, v: u32) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    fn push_string(buf: &mut Vec<u8>, s: &str) {
        push_u32(buf, s.len() as u32);
        buf.extend_from_slice(s.as_bytes());
    }

    fn header(version: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"BSII");
        push_u32(&mut buf, version);
        buf
    }

    /// Template record: tag 0, valid, id, name, fields, sentinel.
    fn push_template(buf: &mut Vec<u8>, struct_id: u32, name: &str, fields: &[(&str, u32)]) {
        push_u32(buf, 0);
        buf.push(1);
        push_u32(buf, struct_id);
        push_string(buf, name);
        for (field_name, tag) in fields {
            push_u32(buf, *tag);
            push_string(buf, field_name);
        }
        push_u32(buf, 0);
    }

    /// Instance record opener: tag + single-part token identifier.
    fn push_instance_id(buf: &mut Vec<u8>, struct_id: u32, token: u64) {
        push_u32(buf, struct_id);
        buf.push(1);
        buf.extend_from_slice(&token.to_le_bytes());
    }

    #[test]
    fn test_header_rejects_bad_magic() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"XXXX");
        push_u32(&mut buf, 2);
        assert!(matches!(
            BsiiDocument::parse(&buf),
            Err(Error::UnknownSignature(_))
        ));
    }

    #[test]
    fn test_header_rejects_version_out_of_range() {
        for version in [0, 4, 99] {
            let buf = header(version);
            assert!(matches!(
                BsiiDocument::parse(&buf),
                Err(Error::UnsupportedVersion(v)) if v == version
            ));
        }
    }

    #[test]
    fn test_header_only_stream_is_truncated() {
        // The record loop always attempts a read after the header.
        let buf = header(2);
        assert!(matches!(
            BsiiDocument::parse(&buf),
            Err(Error::Truncated { .. })
        ));
    }

    #[test]
    fn test_template_and_instance_round() {
        let mut buf = header(2);
        push_template(&mut buf, 1, "unit", &[("x", 0x25)]);
        push_instance_id(&mut buf, 1, 11); // token "a"
        buf.extend_from_slice(&42i32.to_le_bytes());

        let doc = BsiiDocument::parse(&buf).unwrap();
        assert_eq!(doc.header.version, 2);
        assert_eq!(doc.units.len(), 1);

        let unit = &doc.units[0];
        assert_eq!(unit.struct_id, 1);
        assert_eq!(unit.class, "unit");
        assert_eq!(unit.id, UnitId::Named(vec!["a".into()]));
        assert_eq!(unit.fields.len(), 1);
        assert_eq!(unit.fields[0].name, "x");
        assert_eq!(unit.fields[0].value, Value::Int32(42));
    }

    #[test]
    fn test_invalid_template_registers_nothing() {
        let mut buf = header(2);
        push_u32(&mut buf, 0);
        buf.push(0); // validity = false, record ends here

        let doc = BsiiDocument::parse(&buf).unwrap();
        assert!(doc.units.is_empty());
    }

    #[test]
    fn test_duplicate_template_keeps_first() {
        let mut buf = header(2);
        push_template(&mut buf, 7, "first", &[("x", 0x25)]);
        push_template(&mut buf, 7, "second", &[("y", 0x35)]);
        push_instance_id(&mut buf, 7, 11);
        buf.extend_from_slice(&5i32.to_le_bytes());

        let doc = BsiiDocument::parse(&buf).unwrap();
        assert_eq!(doc.units.len(), 1);
        assert_eq!(doc.units[0].class, "first");
        assert_eq!(doc.units[0].fields[0].value, Value::Int32(5));
    }

    #[test]
    fn test_missing_template_skips_only_the_tag() {
        let mut buf = header(2);
        // No template registered for id 5; the decoder must consume the
        // tag and pick up the following template record cleanly.
        push_u32(&mut buf, 5);
        push_template(&mut buf, 1, "unit", &[("x", 0x25)]);
        push_instance_id(&mut buf, 1, 11);
        buf.extend_from_slice(&1i32.to_le_bytes());

        let doc = BsiiDocument::parse(&buf).unwrap();
        assert_eq!(doc.units.len(), 1);
        assert_eq!(doc.units[0].fields[0].value, Value::Int32(1));
    }

    #[test]
    fn test_unknown_field_tag_leaves_value_unset() {
        let mut buf = header(2);
        push_template(&mut buf, 1, "unit", &[("mystery", 0x0b)]);
        push_instance_id(&mut buf, 1, 11);

        let doc = BsiiDocument::parse(&buf).unwrap();
        assert_eq!(doc.units[0].fields[0].value, Value::Unset);
    }

    #[test]
    fn test_ordinal_table_resolves_instance_values() {
        let mut buf = header(2);

        // Template with one ordinal field; the value table rides inline.
        push_u32(&mut buf, 0);
        buf.push(1);
        push_u32(&mut buf, 1);
        push_string(&mut buf, "job");
        push_u32(&mut buf, 0x37);
        push_string(&mut buf, "state");
        push_u32(&mut buf, 2); // table entries
        push_u32(&mut buf, 0);
        push_string(&mut buf, "idle");
        push_u32(&mut buf, 3);
        push_string(&mut buf, "driving");
        push_u32(&mut buf, 0); // schema sentinel

        push_instance_id(&mut buf, 1, 11);
        push_u32(&mut buf, 3);
        push_instance_id(&mut buf, 1, 12);
        push_u32(&mut buf, 9); // not in the table

        let doc = BsiiDocument::parse(&buf).unwrap();
        assert_eq!(doc.units.len(), 2);
        assert_eq!(
            doc.units[0].fields[0].value,
            Value::OrdinalString("driving".into())
        );
        assert_eq!(
            doc.units[1].fields[0].value,
            Value::OrdinalString(String::new())
        );
    }

    #[test]
    fn test_placement_arity_follows_version() {
        let mut field_bytes_v1 = Vec::new();
        for v in [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0] {
            field_bytes_v1.extend_from_slice(&v.to_le_bytes());
        }

        let mut buf = header(1);
        push_template(&mut buf, 1, "unit", &[("pos", 0x19)]);
        push_instance_id(&mut buf, 1, 11);
        buf.extend_from_slice(&field_bytes_v1);

        let doc = BsiiDocument::parse(&buf).unwrap();
        assert!(matches!(doc.units[0].fields[0].value, Value::Placement7(p) if p.g == 0.0));

        // Same field, version 2: eight floats with a neutral bias word.
        let mut buf = header(2);
        push_template(&mut buf, 1, "unit", &[("pos", 0x19)]);
        push_instance_id(&mut buf, 1, 11);
        for v in [1.0f32, 2.0, 3.0, 8_390_656.0, 5.0, 6.0, 7.0, 8.0] {
            buf.extend_from_slice(&v.to_le_bytes());
        }

        let doc = BsiiDocument::parse(&buf).unwrap();
        assert!(matches!(doc.units[0].fields[0].value, Value::Placement8(p) if p.a == 1.0));
    }

    #[test]
    fn test_instances_preserve_stream_order() {
        let mut buf = header(2);
        push_template(&mut buf, 1, "unit", &[("x", 0x25)]);
        for (token, v) in [(11u64, 1i32), (12, 2), (13, 3)] {
            push_instance_id(&mut buf, 1, token);
            buf.extend_from_slice(&v.to_le_bytes());
        }

        let doc = BsiiDocument::parse(&buf).unwrap();
        let values: Vec<_> = doc.units.iter().map(|u| &u.fields[0].value).collect();
        assert_eq!(
            values,
            [&Value::Int32(1), &Value::Int32(2), &Value::Int32(3)]
        );
    }
}
