mod common;

use std::collections::HashMap;
use std::sync::Arc;

use common::{init_tracing, sample, Test};
use kvstructure::{
    Encoder, Error, Fanout, FloatPolicy, Kind, KvStore, MemoryStore, Metadata, OpaqueConvention,
    Options, RecordingStore, StoreCall,
};
use serde::{Deserialize, Serialize};

fn recording() -> RecordingStore<MemoryStore> {
    RecordingStore::new(MemoryStore::new())
}

#[test]
fn test_encode_struct_writes_expected_keys() {
    init_tracing();
    let store = recording();

    Encoder::new(&store)
        .with_prefix("prefix")
        .encode("foo", &sample())
        .unwrap();

    assert_eq!(
        store.calls_sorted(),
        vec![
            StoreCall::put("prefix/foo/condition", "true"),
            StoreCall::put("prefix/foo/description", "bar"),
            StoreCall::put("prefix/foo/proto", "\"\""),
            StoreCall::put("prefix/foo/tests/0/condition", "true"),
            StoreCall::put("prefix/foo/tests/0/description", "bar"),
            StoreCall::put("prefix/foo/tests/0/proto", "\"\""),
            StoreCall::put("prefix/foo/tests/0/with_omit", "\"\""),
            StoreCall::put("prefix/foo/with_omit", "\"\""),
            StoreCall::delete_tree("prefix/foo/tests"),
        ]
    );
}

#[test]
fn test_encode_sequence_deletes_then_writes() {
    let store = recording();

    Encoder::new(&store)
        .with_prefix("prefix")
        .encode("foo", &vec!["foo".to_string(), "bar".to_string()])
        .unwrap();

    let calls = store.calls();
    assert_eq!(calls[0], StoreCall::delete_tree("prefix/foo"));
    assert_eq!(
        calls[1..],
        [
            StoreCall::put("prefix/foo/0", "foo"),
            StoreCall::put("prefix/foo/1", "bar"),
        ]
    );
}

#[test]
fn test_encode_replaces_stale_elements() {
    let store = MemoryStore::with_entries([
        ("foo/0", "old"),
        ("foo/1", "old"),
        ("foo/2", "old"),
        ("foobar", "untouched"),
    ]);

    Encoder::new(&store).encode("foo", &vec![1u32]).unwrap();

    assert_eq!(store.keys(), vec!["foo/0", "foobar"]);
    assert_eq!(store.get("foo/0").unwrap().value, "1");
}

#[test]
fn test_ignored_fields_are_never_written() {
    let store = MemoryStore::new();
    let mut value = sample();
    value.ignore = "secret".to_string();

    Encoder::new(&store).encode("foo", &value).unwrap();

    assert!(store.keys().iter().all(|k| !k.contains("ignore")));
}

#[test]
fn test_opaque_fields_hold_json_documents() {
    let store = MemoryStore::new();
    let mut value = sample();
    value.proto = "line \"quoted\"".to_string();

    Encoder::new(&store).encode("foo", &value).unwrap();

    let stored = store.get("foo/proto").unwrap().value;
    assert_eq!(stored, r#""line \"quoted\"""#);
}

#[test]
fn test_empty_prefix_has_no_leading_slash() {
    let store = MemoryStore::new();
    Encoder::new(&store).encode("foo", &"bar".to_string()).unwrap();
    assert_eq!(store.keys(), vec!["foo"]);

    let store = MemoryStore::new();
    Encoder::new(&store)
        .with_prefix("prefix///")
        .encode("/foo/", &"bar".to_string())
        .unwrap();
    assert_eq!(store.keys(), vec!["prefix/foo"]);
}

#[test]
fn test_custom_tag_name() {
    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Peer {
        address: String,
        weight: u32,
    }

    kvstructure::structure! {
        Peer {
            address { kv = "addr", kvstructure = "ignored" },
            weight,
        }
    }

    let store = MemoryStore::new();
    let value = Peer {
        address: "10.0.0.1".to_string(),
        weight: 3,
    };
    Encoder::new(&store)
        .with_options(Options::new().with_tag_name("kv"))
        .encode("peer", &value)
        .unwrap();

    assert_eq!(store.keys(), vec!["peer/addr", "peer/weight"]);
}

#[test]
fn test_tag_option_convention() {
    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Config {
        name: String,
        limits: Vec<u32>,
        proto: String,
    }

    kvstructure::structure! {
        Config {
            name,
            limits { kvstructure = "limits,json" },
            proto { json = "proto" },
        }
    }

    let store = MemoryStore::new();
    let value = Config {
        name: "c".to_string(),
        limits: vec![1, 2],
        proto: "p".to_string(),
    };
    Encoder::new(&store)
        .with_options(Options::new().with_opaque_convention(OpaqueConvention::TagOption))
        .encode("cfg", &value)
        .unwrap();

    assert_eq!(store.keys(), vec!["cfg/limits", "cfg/name", "cfg/proto"]);
    assert_eq!(store.get("cfg/limits").unwrap().value, "[1,2]");
    assert_eq!(store.get("cfg/proto").unwrap().value, "p");
}

#[test]
fn test_maps_need_an_opaque_tag() {
    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Labels {
        labels: HashMap<String, String>,
    }

    kvstructure::structure! {
        Labels {
            labels,
        }
    }

    let store = recording();
    let err = Encoder::new(&store)
        .encode("svc", &Labels::default())
        .unwrap_err();

    assert!(matches!(
        err,
        Error::UnsupportedType {
            kind: Kind::Map,
            ref path,
        } if path == "svc/labels"
    ));
    assert!(store.calls().is_empty());
}

#[test]
fn test_unsupported_elements_keep_stored_sequence() {
    let store = MemoryStore::with_entries([("items/0", "1"), ("items/1", "2")]);

    let err = Encoder::new(&store)
        .encode("items", &vec![Some(1u8)])
        .unwrap_err();

    assert!(matches!(err, Error::UnsupportedType { kind: Kind::Option, .. }));
    assert_eq!(store.keys(), vec!["items/0", "items/1"]);
    assert_eq!(store.get("items/1").unwrap().value, "2");
}

#[test]
fn test_float_policy() {
    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Reading {
        sensor: String,
        value: f64,
    }

    kvstructure::structure! {
        Reading {
            sensor,
            value,
        }
    }

    let reading = Reading {
        sensor: "t1".to_string(),
        value: 21.5,
    };

    let store = MemoryStore::new();
    Encoder::new(&store).encode("r", &reading).unwrap();
    assert_eq!(store.keys(), vec!["r/sensor"]);

    let store = MemoryStore::new();
    Encoder::new(&store)
        .with_options(Options::new().with_floats(FloatPolicy::Encode))
        .encode("r", &reading)
        .unwrap();
    assert_eq!(store.get("r/value").unwrap().value, "21.5");
}

#[test]
fn test_same_writes_under_every_fanout() {
    let mut value = sample();
    value.tests = (0..12)
        .map(|i| {
            Box::new(Test {
                desc: format!("child {}", i),
                ..sample()
            })
        })
        .collect();

    let expected = {
        let store = recording();
        Encoder::new(&store)
            .with_options(Options::new().with_fanout(Fanout::Sequential))
            .encode("foo", &value)
            .unwrap();
        store.calls_sorted()
    };

    for fanout in [
        Fanout::Bounded(0),
        Fanout::Bounded(1),
        Fanout::Bounded(4),
        Fanout::Unbounded,
    ] {
        let store = recording();
        Encoder::new(&store)
            .with_options(Options::new().with_fanout(fanout))
            .encode("foo", &value)
            .unwrap();
        assert_eq!(store.calls_sorted(), expected, "{:?}", fanout);
    }
}

#[test]
fn test_metadata_records_written_keys() {
    let store = MemoryStore::with_entries([("foo/stale", "left over")]);
    let metadata = Arc::new(Metadata::new());

    Encoder::new(&store)
        .with_metadata(Arc::clone(&metadata))
        .encode("foo", &sample())
        .unwrap();

    assert!(metadata.contains_key("foo/description"));
    assert!(metadata.contains_key("foo/proto"));
    assert!(metadata.contains_key("foo/tests/0/condition"));
    assert!(!metadata.contains_key("foo/ignore"));
    assert_eq!(metadata.unused(), vec!["foo/stale"]);
}
