use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use tracing_subscriber::EnvFilter;

use nbt2json::error::{DecodeError, SchemaErrorKind};
use nbt2json::{
    binary_to_json, binary_to_json_with, binary_to_yaml, decode, encode, from_document, json,
    json_to_binary, to_document, yaml, yaml_to_binary, ConvertOptions, Endianness, Error,
    ErrorKind, NbtCompound, NbtList, NbtTag, NbtValue, TagType,
};

// Unnamed root compound holding Short "SleepTimer" = 0.
#[rustfmt::skip]
const SLEEP_TIMER: [u8; 19] = [
    0x0a, 0x00, 0x00,
    0x02, 0x00, 0x0a, b'S', b'l', b'e', b'e', b'p', b'T', b'i', b'm', b'e', b'r', 0x00, 0x00,
    0x00,
];

const TEST_SHORT_YAML: &str = "\
nbt:
- name: \"\"
  tagType: 10
  value:
  - name: Test
    tagType: 2
    value: 256
";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A tree touching every tag type, nested lists and an empty typed list.
fn level() -> NbtTag {
    let mut inventory = NbtList::new();
    for (slot, id) in [(0i8, "minecraft:stone"), (1, "minecraft:dirt")] {
        let item = NbtCompound::new()
            .with("Slot", slot)
            .unwrap()
            .with("id", id)
            .unwrap()
            .with("Count", 64i8)
            .unwrap();
        inventory.push(item).unwrap();
    }

    let mut matrix = NbtList::new();
    matrix.push(NbtList::try_from(vec![NbtValue::Int(1), NbtValue::Int(2)]).unwrap()).unwrap();
    matrix.push(NbtList::with_type(TagType::Int)).unwrap();

    let root = NbtCompound::new()
        .with("hardcore", 0i8)
        .unwrap()
        .with("SleepTimer", 0i16)
        .unwrap()
        .with("SpawnX", -2_147_483_648i32)
        .unwrap()
        .with("RandomSeed", 9_223_372_036_854_775_807i64)
        .unwrap()
        .with("foodExhaustionLevel", 0.1f32)
        .unwrap()
        .with("Rotation", -12.345678901234567f64)
        .unwrap()
        .with("Infinite", f64::INFINITY)
        .unwrap()
        .with("heightmap", vec![-128i8, 0, 127])
        .unwrap()
        .with("LevelName", "Nöw wörld ✓")
        .unwrap()
        .with("Inventory", inventory)
        .unwrap()
        .with("matrix", matrix)
        .unwrap()
        .with("Effects", NbtList::with_type(TagType::Compound))
        .unwrap()
        .with("Data", NbtCompound::new())
        .unwrap()
        .with("Biomes", vec![i32::MIN, 0, i32::MAX])
        .unwrap()
        .with("BlockStates", vec![i64::MIN, -1, i64::MAX])
        .unwrap();
    NbtTag::new("", root)
}

#[test]
fn scenario_a_sleep_timer_to_json() {
    init_tracing();
    let tag = decode(&SLEEP_TIMER, Endianness::Big).unwrap();
    let NbtValue::Compound(root) = &tag.value else {
        panic!("root should be a compound, got {:?}", tag.value);
    };
    assert_eq!(root.len(), 1);
    assert_eq!(root.short("SleepTimer"), Some(0));

    assert_eq!(
        binary_to_json(&SLEEP_TIMER, Endianness::Big).unwrap(),
        r#"{"nbt":[{"name":"","tagType":10,"value":[{"name":"SleepTimer","tagType":2,"value":0}]}]}"#
    );
}

#[test]
fn scenario_b_yaml_round_trip() {
    init_tracing();
    let bytes = yaml_to_binary(TEST_SHORT_YAML, Endianness::Big).unwrap();
    #[rustfmt::skip]
    let expected = [
        0x0a, 0x00, 0x00,
        0x02, 0x00, 0x04, b'T', b'e', b's', b't', 0x01, 0x00,
        0x00,
    ];
    assert_eq!(bytes, expected);

    let text = binary_to_yaml(&bytes, Endianness::Big).unwrap();
    assert_eq!(yaml::parse(&text).unwrap(), yaml::parse(TEST_SHORT_YAML).unwrap());
}

#[test]
fn scenario_c_truncated_buffer() {
    init_tracing();
    let err = binary_to_json(&SLEEP_TIMER[..3], Endianness::Big).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(
        matches!(err, Error::Decode(DecodeError::Truncated { pos: 3, .. })),
        "{err:?}"
    );
    assert!(err.to_string().contains("position 3"), "{err}");
}

#[test]
fn binary_round_trip() {
    let tag = level();
    for endianness in [Endianness::Big, Endianness::Little] {
        let bytes = encode(&tag, endianness).unwrap();
        assert_eq!(decode(&bytes, endianness).unwrap(), tag);
    }
}

#[test]
fn textual_round_trip() {
    let tag = level();
    assert_eq!(from_document(&to_document(&tag)).unwrap(), tag);

    for endianness in [Endianness::Big, Endianness::Little] {
        let bytes = encode(&tag, endianness).unwrap();
        let json = binary_to_json(&bytes, endianness).unwrap();
        assert_eq!(json_to_binary(&json, endianness).unwrap(), bytes);
        let yaml = binary_to_yaml(&bytes, endianness).unwrap();
        assert_eq!(yaml_to_binary(&yaml, endianness).unwrap(), bytes);
    }
}

#[test]
fn json_and_yaml_agree() {
    let document = to_document(&level());
    let from_json = json::parse(&json::print(&document).unwrap()).unwrap();
    let from_yaml = yaml::parse(&yaml::print(&document).unwrap()).unwrap();
    assert_eq!(from_json, from_yaml);
    assert_eq!(from_json, document);
}

#[test]
fn printing_is_idempotent() {
    let document = to_document(&level());

    let json = json::print(&document).unwrap();
    assert_eq!(json::print(&json::parse(&json).unwrap()).unwrap(), json);

    let pretty = json::print_pretty(&document).unwrap();
    assert_eq!(json::print_pretty(&json::parse(&pretty).unwrap()).unwrap(), pretty);

    let yaml = yaml::print(&document).unwrap();
    assert_eq!(yaml::print(&yaml::parse(&yaml).unwrap()).unwrap(), yaml);
}

#[test]
fn heterogeneous_list_is_rejected() {
    let mut list = NbtList::new();
    list.push(1i32).unwrap();
    assert!(list.push("two").is_err());

    let text = r#"{"nbt":[{"name":"","tagType":9,"value":[
        {"name":"","tagType":3,"value":1},
        {"name":"","tagType":8,"value":"two"}
    ]}]}"#;
    let err = json_to_binary(text, Endianness::Big).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
    let Error::Schema(err) = err else {
        unreachable!()
    };
    assert_eq!(err.path, "nbt[0].value[1]");
}

#[test]
fn duplicate_names_are_rejected() {
    assert!(NbtCompound::new()
        .with("a", 1i8)
        .unwrap()
        .with("a", 2i8)
        .is_err());

    #[rustfmt::skip]
    let bytes = [
        0x0a, 0x00, 0x00,
        0x01, 0x00, 0x01, b'a', 0x01,
        0x01, 0x00, 0x01, b'a', 0x02,
        0x00,
    ];
    let err = binary_to_json(&bytes, Endianness::Big).unwrap_err();
    assert!(
        matches!(err, Error::Decode(DecodeError::DuplicateName { pos: 8, .. })),
        "{err:?}"
    );

    let text = "\
nbt:
- name: ''
  tagType: 10
  value:
  - {name: a, tagType: 1, value: 1}
  - {name: a, tagType: 1, value: 2}
";
    let err = yaml_to_binary(text, Endianness::Big).unwrap_err();
    let Error::Schema(err) = err else {
        panic!("expected schema error, got {err:?}");
    };
    assert_eq!(err.kind, SchemaErrorKind::DuplicateName("a".into()));
}

#[test]
fn error_kinds() {
    let err = json_to_binary("{\"nbt\": [", Endianness::Big).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);

    let err = yaml_to_binary("nbt:\n- {name: '', tagType: 42, value: 0}\n", Endianness::Big)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
    assert_eq!(err.to_string(), "unsupported tagType 42 at nbt[0]");

    let err = json_to_binary(
        r#"{"nbt":[{"name":"","tagType":1,"value":300}]}"#,
        Endianness::Big,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert_eq!(err.to_string(), "300 is out of range for Byte at nbt[0].value");

    let err = json_to_binary(
        r#"{"nbt":[{"name":"","tagType":8,"value":"x"},{"name":"","tagType":8,"value":"y"}]}"#,
        Endianness::Big,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
}

#[test]
fn gzipped_input() {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&SLEEP_TIMER).unwrap();
    let compressed = encoder.finish().unwrap();

    assert_eq!(
        binary_to_json(&compressed, Endianness::Big).unwrap(),
        binary_to_json(&SLEEP_TIMER, Endianness::Big).unwrap()
    );
}

#[test]
fn legacy_documents() {
    // Shape written by older converters: tab indentation, metadata keys,
    // Long as string and as halves, the old list form and explicit End records.
    let text = "{
\t\"name\": \"Named Binary Tag to JSON\",
\t\"version\": \"0.2.0\",
\t\"nbt\": [{
\t\t\"tagType\": 10,
\t\t\"name\": \"\",
\t\t\"value\": [
\t\t\t{\"tagType\": 4, \"name\": \"TestLong\", \"value\": {\"valueLeast\": 4294967295, \"valueMost\": 2147483647}},
\t\t\t{\"tagType\": 4, \"name\": \"TestLongString\", \"value\": \"-9223372036854775808\"},
\t\t\t{\"tagType\": 9, \"name\": \"TestList\", \"value\": {\"tagListType\": 3, \"list\": [0, 2147483647]}},
\t\t\t{\"tagType\": 0, \"name\": \"\", \"value\": null}
\t\t]
\t}]
}";
    let bytes = json_to_binary(text, Endianness::Little).unwrap();
    let tag = decode(&bytes, Endianness::Little).unwrap();
    let NbtValue::Compound(root) = tag.value else {
        panic!("expected compound");
    };
    assert_eq!(root.len(), 3);
    assert_eq!(root.long("TestLong"), Some(i64::MAX));
    assert_eq!(root.long("TestLongString"), Some(i64::MIN));
    let list = root.list("TestList").unwrap();
    assert_eq!(list.element_type(), TagType::Int);
    assert_eq!(list.get(1), Some(&NbtValue::Int(i32::MAX)));
}

#[test]
fn comment_is_carried() {
    let options = ConvertOptions {
        comment: Some("from level.dat".into()),
        ..Default::default()
    };
    let text = binary_to_json_with(&SLEEP_TIMER, &options).unwrap();
    assert_eq!(
        json::parse(&text).unwrap().comment.as_deref(),
        Some("from level.dat")
    );
    assert_eq!(json_to_binary(&text, Endianness::Big).unwrap(), SLEEP_TIMER);
}
