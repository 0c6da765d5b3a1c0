//! Browser-side checks of the JS surface. Run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use radarcore::{KeywordRadar, Match};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn titles(list: &[&str]) -> JsValue {
    serde_wasm_bindgen::to_value(list).unwrap()
}

#[wasm_bindgen_test]
fn constructor_accepts_missing_config() {
    let radar = KeywordRadar::js_new(JsValue::UNDEFINED).unwrap();
    assert_eq!(radar.keyword_count(), 0);
}

#[wasm_bindgen_test]
fn rebuild_and_search_round_trip() {
    let mut radar = KeywordRadar::js_new(JsValue::NULL).unwrap();
    assert_eq!(radar.js_rebuild(titles(&["cat", "dog"])).unwrap(), 2);
    assert!(!radar.js_rebuild_if_changed(titles(&["cat", "dog"])).unwrap());

    let matches: Vec<Match> = serde_wasm_bindgen::from_value(radar.js_search("see [[cat]] and cat")).unwrap();
    assert_eq!(matches, vec![Match::new("cat", 16, 18)]);
    assert_eq!(radar.js_link_all("a dog"), "a [[dog]]");
}

#[wasm_bindgen_test]
fn bad_titles_are_rejected() {
    let mut radar = KeywordRadar::js_new(JsValue::NULL).unwrap();
    assert!(radar.js_rebuild(JsValue::from_f64(3.0)).is_err());
}
