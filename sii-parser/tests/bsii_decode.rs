//! End-to-end BSII decoding: hand-assembled binary streams through
//! `BsiiDocument::parse` and `serializer::serialize`.

use pretty_assertions::assert_eq;

use sii_parser::decoder::BsiiDocument;
use sii_parser::serializer::serialize;
use sii_parser::types::{UnitId, Value};

fn push_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn push_string(buf: &mut Vec<u8>, s: &str) {
    push_u32(buf, s.len() as u32);
    buf.extend_from_slice(s.as_bytes());
}

fn push_f32(buf: &mut Vec<u8>, v: f32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn header(version: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"BSII");
    push_u32(&mut buf, version);
    buf
}

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

/// Instance opener with a single-part token identifier.
fn push_instance_id(buf: &mut Vec<u8>, struct_id: u32, token: u64) {
    push_u32(buf, struct_id);
    buf.push(1);
    buf.extend_from_slice(&token.to_le_bytes());
}

#[test]
fn minimal_int32_unit_serializes_exactly() {
    let mut buf = header(2);
    push_template(&mut buf, 1, "unit", &[("x", 0x25)]);
    push_instance_id(&mut buf, 1, 11); // token "a"
    buf.extend_from_slice(&42i32.to_le_bytes());

    let doc = BsiiDocument::parse(&buf).unwrap();
    let text = serialize(&doc).unwrap();

    assert_eq!(text, "SiiNunit\n{\nunit : a {\n x: 42\n}\n\n}");
}

#[test]
fn lossless_types_round_trip_to_text() {
    let mut buf = header(2);
    push_template(
        &mut buf,
        1,
        "economy",
        &[
            ("bank", 0x31),    // i64
            ("xp", 0x27),      // u32
            ("paused", 0x35),  // bool
            ("company", 0x01), // string
            ("city", 0x03),    // token
        ],
    );
    push_instance_id(&mut buf, 1, 11);
    buf.extend_from_slice(&(-1_234_567_890i64).to_le_bytes());
    push_u32(&mut buf, 90_210);
    buf.push(0);
    push_string(&mut buf, "Fast Freight Ltd.");
    // "unit" in base-38 packing
    buf.extend_from_slice(&1_674_539u64.to_le_bytes());

    let doc = BsiiDocument::parse(&buf).unwrap();
    let text = serialize(&doc).unwrap();

    assert!(text.contains(" bank: -1234567890\n"));
    assert!(text.contains(" xp: 90210\n"));
    assert!(text.contains(" paused: false\n"));
    assert!(text.contains(" company: \"Fast Freight Ltd.\"\n"));
    assert!(text.contains(" city: unit\n"));
}

#[test]
fn version1_placement_renders_seven_components() {
    let mut buf = header(1);
    push_template(&mut buf, 1, "truck", &[("pos", 0x19)]);
    push_instance_id(&mut buf, 1, 11);
    for v in [10.0f32, 20.0, 30.0, 1.0, 0.0, 0.0] {
        push_f32(&mut buf, v);
    }

    let doc = BsiiDocument::parse(&buf).unwrap();
    let text = serialize(&doc).unwrap();

    assert!(text.contains(" pos: (10, 20, 30) (1; 0, 0, 0)\n"));
}

#[test]
fn version2_placement_recovers_bias_then_renders() {
    let mut buf = header(2);
    push_template(&mut buf, 1, "truck", &[("pos", 0x19)]);
    push_instance_id(&mut buf, 1, 11);
    // Low bias word 2049 shifts `a` by +512; high word stays neutral.
    let d = (2049 + 2048 * 4096) as f32;
    for v in [100.0f32, 20.0, 30.0, d, 1.0, 0.0, 0.0, 0.0] {
        push_f32(&mut buf, v);
    }

    let doc = BsiiDocument::parse(&buf).unwrap();
    let text = serialize(&doc).unwrap();

    assert!(text.contains(" pos: (612, 20, 30) (1; 0, 0, 0)\n"));
}

#[test]
fn nameless_and_null_identifiers() {
    let mut buf = header(2);
    push_template(&mut buf, 1, "unit", &[("link", 0x39)]);

    // Unit identified by a nameless address, field links to null.
    push_u32(&mut buf, 1);
    buf.push(0xff);
    buf.extend_from_slice(&0x0000_4567_89ab_cdefu64.to_le_bytes());
    buf.push(0); // link: partCount 0 -> null

    let doc = BsiiDocument::parse(&buf).unwrap();
    assert_eq!(doc.units[0].id, UnitId::Nameless(0x0000_4567_89ab_cdef));
    assert_eq!(doc.units[0].fields[0].value, Value::Id(UnitId::Null));

    let text = serialize(&doc).unwrap();
    assert!(text.contains("unit : _nameless.4567.89ab.cdef {\n"));
    assert!(text.contains(" link: null\n"));
}

#[test]
fn arrays_decode_and_render_with_indices() {
    let mut buf = header(2);
    push_template(&mut buf, 1, "garage", &[("levels", 0x26), ("names", 0x02)]);
    push_instance_id(&mut buf, 1, 11);
    push_u32(&mut buf, 3);
    for v in [5i32, -1, 12] {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    push_u32(&mut buf, 2);
    push_string(&mut buf, "small");
    push_string(&mut buf, "big garage");

    let doc = BsiiDocument::parse(&buf).unwrap();
    let text = serialize(&doc).unwrap();

    assert!(text.contains(" levels: 3\n levels[0]: 5\n levels[1]: -1\n levels[2]: 12\n"));
    assert!(text.contains(" names: 2\n names[0]: small\n names[1]: \"big garage\"\n"));
}

#[test]
fn multiple_units_keep_stream_order() {
    let mut buf = header(2);
    push_template(&mut buf, 1, "unit", &[("x", 0x25)]);
    push_template(&mut buf, 2, "other", &[("y", 0x35)]);

    push_instance_id(&mut buf, 2, 12); // "b"
    buf.push(1);
    push_instance_id(&mut buf, 1, 11); // "a"
    buf.extend_from_slice(&7i32.to_le_bytes());

    let doc = BsiiDocument::parse(&buf).unwrap();
    let text = serialize(&doc).unwrap();

    let other_at = text.find("other : b").unwrap();
    let unit_at = text.find("unit : a").unwrap();
    assert!(other_at < unit_at);
}

#[test]
fn truncated_instance_aborts_the_pass() {
    let mut buf = header(2);
    push_template(&mut buf, 1, "unit", &[("x", 0x25)]);
    push_instance_id(&mut buf, 1, 11);
    buf.extend_from_slice(&[0x2a, 0x00]); // i32 cut short

    assert!(matches!(
        BsiiDocument::parse(&buf),
        Err(sii_parser::Error::Truncated { .. })
    ));
}
