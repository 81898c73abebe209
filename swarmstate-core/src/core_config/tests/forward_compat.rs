//! Unknown fields survive merge, dump and load untouched

use super::helpers::*;
use crate::core_codec::{DictConsumer, RawValue, Unknowns, Value};
use crate::core_config::{ConfigKind, ConfigState};
use crate::config::EngineConfig;

#[test]
fn test_unknown_fragment_keys_roundtrip() {
    let mut state = fresh(ConfigKind::UserProfile);
    state.merge(&[profile_msg(
        "h1",
        100,
        &[("n", Value::text("alice")), ("~", Value::List(vec![Value::from(1)]))],
    )]);
    let dump = state.dump();

    let mut loaded = fresh(ConfigKind::UserProfile);
    loaded.load(&dump).unwrap();
    assert_eq!(loaded.get_field("~"), Some(&Value::List(vec![Value::from(1)])));
    assert_eq!(loaded.encode_dump(), state.encode_dump());
}

#[test]
fn test_unknown_fields_merge_with_same_tie_break() {
    let mut state = fresh(ConfigKind::UserProfile);
    state.merge(&[profile_msg("h2", 100, &[("~", Value::text("second"))])]);
    state.merge(&[profile_msg("h1", 100, &[("~", Value::text("first"))])]);
    assert_eq!(state.get_field("~"), Some(&Value::text("second")));
}

#[test]
fn test_unknown_top_level_dump_keys_kept_across_merge() {
    let dump = b"d1:#i1e1:dde1:ki2e1:ude1:xi42e1:y4:spame";
    let mut state = ConfigState::from_dump(
        ConfigKind::UserProfile,
        user_account(),
        &EngineConfig::default(),
        dump,
    )
    .unwrap();

    state.merge(&[profile_msg("h1", 1, &[("n", Value::text("alice"))])]);
    let out = state.dump();

    let mut consumer = DictConsumer::new(&out).unwrap();
    let mut unknowns = Unknowns::new();
    assert!(consumer.seek(b"u", &mut unknowns).unwrap().is_some());
    consumer.finish(&mut unknowns).unwrap();
    assert_eq!(unknowns.get(&b"x".to_vec()), Some(&RawValue::new(b"i42e".to_vec()).unwrap()));
    assert_eq!(unknowns.get(&b"y".to_vec()), Some(&RawValue::new(b"4:spam".to_vec()).unwrap()));
}

#[test]
fn test_recognised_field_overwrites_nothing_unknown() {
    let mut state = fresh(ConfigKind::UserProfile);
    state.merge(&[profile_msg("h1", 1, &[("~", Value::text("keep"))])]);
    state.set_profile_name(Some("bob")).unwrap();
    assert_eq!(state.get_field("~"), Some(&Value::text("keep")));
}
