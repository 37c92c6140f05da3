//! Tests for pagination module

use super::*;
use crate::error::Error;
use crate::types::ParamValue;
use serde_json::json;
use test_case::test_case;

fn take(pager: &mut Pager, n: usize) -> Vec<PageDescriptor> {
    (0..n)
        .map(|_| pager.next_page().into_descriptor().expect("pager ended early"))
        .collect()
}

// ============================================================================
// Cursor Mode Tests
// ============================================================================

#[test_case(0, 10 ; "offset from zero")]
#[test_case(100, 25 ; "offset from hundred")]
#[test_case(-5, 1 ; "negative start")]
fn test_cursor_progression(start: i64, step: i64) {
    let mut pager = Pager::cursor("offset", start, step).unwrap();
    assert_eq!(pager.mode(), PagingMode::Cursor);

    for (n, page) in take(&mut pager, 6).into_iter().enumerate() {
        let expected = start + n as i64 * step;
        assert_eq!(page.get("offset"), Some(&ParamValue::Int(expected)));
    }
}

#[test]
fn test_cursor_includes_limit() {
    let mut pager = PagerConfig::cursor("offset", 0, 50)
        .with_limit("limit", 50)
        .build()
        .unwrap();

    let first = pager.next_page().into_descriptor().unwrap();
    assert_eq!(first.get("offset"), Some(&ParamValue::Int(0)));
    assert_eq!(first.get("limit"), Some(&ParamValue::Int(50)));

    let second = pager.next_page().into_descriptor().unwrap();
    assert_eq!(second.get("offset"), Some(&ParamValue::Int(50)));
    assert_eq!(second.get("limit"), Some(&ParamValue::Int(50)));
}

#[test]
fn test_cursor_step_defaults_to_limit() {
    let config = PagerConfig {
        cursor_param: Some("skip".to_string()),
        cursor_value: Some(0),
        limit_param: Some("take".to_string()),
        limit_value: Some(20),
        ..Default::default()
    };
    let mut pager = config.build().unwrap();

    let offsets: Vec<_> = take(&mut pager, 3)
        .iter()
        .map(|p| p.get("skip").and_then(ParamValue::as_int).unwrap())
        .collect();
    assert_eq!(offsets, vec![0, 20, 40]);
}

#[test_case(Some(0) ; "zero step")]
#[test_case(Some(-10) ; "negative step")]
#[test_case(None ; "missing step")]
fn test_cursor_invalid_step_rejected_at_construction(step: Option<i64>) {
    let config = PagerConfig {
        cursor_param: Some("offset".to_string()),
        cursor_value: Some(0),
        step,
        ..Default::default()
    };
    let err = config.build().unwrap_err();
    assert!(matches!(err, Error::Config { .. }), "got {err:?}");
}

#[test]
fn test_cursor_overflow_ends_sequence() {
    let mut pager = Pager::cursor("offset", i64::MAX - 1, 10).unwrap();

    let page = pager.next_page().into_descriptor().unwrap();
    assert_eq!(page.get("offset"), Some(&ParamValue::Int(i64::MAX - 1)));
    assert!(!pager.is_live());
    assert!(pager.next_page().is_done());
}

// ============================================================================
// Page Mode Tests
// ============================================================================

#[test_case(0 ; "zero based")]
#[test_case(1 ; "one based")]
#[test_case(42 ; "resume later")]
fn test_page_progression(start: i64) {
    let mut pager = Pager::page_number("page", start).unwrap();
    assert_eq!(pager.mode(), PagingMode::Page);

    for (n, page) in take(&mut pager, 5).into_iter().enumerate() {
        assert_eq!(page.get("page"), Some(&ParamValue::Int(start + n as i64)));
    }
}

#[test]
fn test_page_ignores_step_and_keeps_fixed_params() {
    let config = PagerConfig {
        step: Some(10),
        ..PagerConfig::page_number("p", 1)
            .with_limit("per_page", 100)
            .with_fixed("sort", "asc")
    };
    let mut pager = config.build().unwrap();

    let pages = take(&mut pager, 2);
    assert_eq!(pages[0].get("p"), Some(&ParamValue::Int(1)));
    assert_eq!(pages[1].get("p"), Some(&ParamValue::Int(2)));
    assert_eq!(pages[1].get("per_page"), Some(&ParamValue::Int(100)));
    assert_eq!(pages[1].get("sort"), Some(&ParamValue::from("asc")));
}

#[test]
fn test_descriptors_are_fresh_each_step() {
    let mut pager = Pager::page_number("page", 1).unwrap().with_fixed("count", "10");
    let first = pager.next_page().into_descriptor().unwrap();
    let _second = pager.next_page().into_descriptor().unwrap();

    assert_eq!(first.get("page"), Some(&ParamValue::Int(1)));
    assert_eq!(first.params().len(), 2);
}

// ============================================================================
// Mode Selection Tests
// ============================================================================

#[test]
fn test_both_modes_rejected() {
    let config = PagerConfig {
        page_param: Some("page".to_string()),
        page_value: Some(1),
        ..PagerConfig::cursor("offset", 0, 10)
    };
    let err = config.build().unwrap_err();
    assert!(err.to_string().contains("both cursor and page"));
}

#[test]
fn test_neither_mode_rejected() {
    let err = PagerConfig::default().build().unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn test_half_configured_mode_rejected() {
    let config = PagerConfig {
        page_param: Some("page".to_string()),
        ..Default::default()
    };
    let err = config.build().unwrap_err();
    assert!(err.to_string().contains("page_param requires page_value"));
}

#[test]
fn test_limit_param_without_value_rejected() {
    let config = PagerConfig {
        limit_param: Some("limit".to_string()),
        ..PagerConfig::page_number("page", 1)
    };
    assert!(config.build().is_err());
}

#[test]
fn test_empty_param_name_rejected() {
    assert!(Pager::page_number("", 1).is_err());
}

// ============================================================================
// Stop Tests
// ============================================================================

#[test]
fn test_stop_ends_sequence_immediately() {
    let mut pager = Pager::cursor("offset", 0, 10).unwrap();
    take(&mut pager, 3);

    pager.stop();
    assert!(!pager.is_live());
    assert!(pager.next_page().is_done());
    assert!(pager.next_page().is_done());
}

#[test]
fn test_stop_before_first_page() {
    let mut pager = Pager::page_number("page", 1).unwrap();
    pager.stop();
    assert_eq!(pager.next_page(), NextPage::Done);
}

#[test]
fn test_stop_is_permanent() {
    let mut pager = Pager::page_number("page", 1).unwrap();
    pager.stop();
    pager.stop();
    assert!(!pager.is_live());
    assert_eq!(pager.current(), 1);
    assert!(pager.next_page().is_done());
}

// ============================================================================
// Config Deserialization Tests
// ============================================================================

#[test]
fn test_pager_config_from_yaml() {
    let yaml = r"
cursor_param: offset
cursor_value: 0
limit_param: limit
limit_value: 25
fixed:
  order: desc
";
    let config: PagerConfig = serde_yaml::from_str(yaml).unwrap();
    let mut pager = config.build().unwrap();
    let page = pager.next_page().into_descriptor().unwrap();

    assert_eq!(page.get("offset"), Some(&ParamValue::Int(0)));
    assert_eq!(page.get("limit"), Some(&ParamValue::Int(25)));
    assert_eq!(page.get("order"), Some(&ParamValue::from("desc")));
    assert_eq!(pager.current(), 25);
}

// ============================================================================
// EmptyPageRule Tests
// ============================================================================

#[test]
fn test_empty_body_rule() {
    let rule = EmptyPageRule::EmptyBody;
    assert!(rule.matches(b""));
    assert!(rule.matches(b"  \n"));
    assert!(!rule.matches(b"[]"));
}

#[test]
fn test_empty_array_rule() {
    let rule = EmptyPageRule::empty_array("$.data.items");
    assert!(rule.matches(br#"{"data": {"items": []}}"#));
    assert!(rule.matches(br#"{"data": {"items": null}}"#));
    assert!(rule.matches(br#"{"data": {}}"#));
    assert!(!rule.matches(br#"{"data": {"items": [1]}}"#));
    assert!(!rule.matches(b"not json"));
}

#[test]
fn test_empty_array_rule_root() {
    let rule = EmptyPageRule::empty_array("");
    assert!(rule.matches(b"[]"));
    assert!(!rule.matches(b"[{\"id\": 1}]"));
}

#[test]
fn test_field_equals_rule() {
    let rule = EmptyPageRule::field("has_more", false);
    assert!(rule.matches(br#"{"has_more": false}"#));
    assert!(!rule.matches(br#"{"has_more": true}"#));
    assert!(!rule.matches(br"{}"));
}

#[test]
fn test_field_equals_rule_indexes_arrays() {
    let rule = EmptyPageRule::field("pages.0.last", json!(true));
    assert!(rule.matches(br#"{"pages": [{"last": true}]}"#));
}

#[test]
fn test_empty_page_rule_from_yaml() {
    let rule: EmptyPageRule = serde_yaml::from_str("type: empty_array\npath: results").unwrap();
    assert_eq!(rule, EmptyPageRule::empty_array("results"));

    let rule: EmptyPageRule =
        serde_yaml::from_str("type: field_equals\npath: done\nvalue: true").unwrap();
    assert_eq!(rule, EmptyPageRule::field("done", true));
}
