use blocks_wasm::*;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use serde::{Deserialize, Serialize};

fn to_js_object(value: &serde_json::Value) -> wasm_bindgen::JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap()
}

#[derive(Deserialize)]
struct TestPlacement {
    pub x: i32,
    pub y: i32,
    pub rotation: u8,
}

#[derive(Deserialize)]
struct TestMove {
    pub score: f32,
    pub reachable: bool,
    pub path: Vec<TestPlacement>,
}

#[wasm_bindgen_test]
fn test_field_new() {
    let field = JsField::new(10, 20);
    assert_eq!(field.columns(), 10);
    assert!(!field.is_filled(0, 0));
    assert!(!field.is_filled(-1, 0));
}

#[wasm_bindgen_test]
fn test_field_from_rows() {
    let rows = serde_wasm_bindgen::to_value(&vec!["....", "a..."]).unwrap();
    let field = JsField::from_rows(rows).unwrap();
    assert!(field.is_filled(0, 0));
    assert!(!field.is_filled(0, 1));
    let back: Vec<String> = serde_wasm_bindgen::from_value(field.to_rows()).unwrap();
    assert_eq!(back, vec!["....", "#..."]);
}

#[wasm_bindgen_test]
fn test_ranked_moves_on_empty_field() {
    let field = JsField::new(10, 20);
    let moves: Vec<TestMove> = serde_wasm_bindgen::from_value(ranked_moves(&field, "I", 0)).unwrap();
    assert_eq!(moves.len(), 17);
    assert!(moves.windows(2).all(|pair| pair[0].score >= pair[1].score));
    for mv in &moves {
        assert!(mv.reachable);
        let start = &mv.path[0];
        assert_eq!((start.x, start.y, start.rotation), (3, 17, 0));
    }
}

#[wasm_bindgen_test]
fn test_unknown_piece_is_null() {
    let field = JsField::new(10, 20);
    assert!(ranked_moves(&field, "Q", 0).is_null());
}

#[wasm_bindgen_test]
fn test_perft_depth_one() {
    let field = JsField::new(10, 20);
    let pieces = serde_wasm_bindgen::to_value(&vec!["O"]).unwrap();
    assert_eq!(perft(&field, pieces, 1), 9.0);
}

#[wasm_bindgen_test]
fn test_session_plays_best_moves() {
    let level = serde_json::json!({
        "columns": 10,
        "rows": 20,
        "pieces": ["O", "T"],
        "fall": { "fall_speed": 0.0, "move_step_duration": 0.0 }
    });
    let level = to_js_object(&level);
    let mut session = JsGameSession::new(level, wasm_bindgen::JsValue::UNDEFINED).unwrap();
    session.tick(0.0);
    assert_eq!(session.phase(), "falling");
    assert!(!session.play_best_move().is_null());
    session.tick(0.0);
    assert_eq!(session.phase(), "locked");

    let events: Vec<serde_json::Value> = serde_wasm_bindgen::from_value(session.drain_events()).unwrap();
    assert_eq!(events[0]["type"], "piece_spawned");
    assert!(events.iter().any(|event| event["type"] == "piece_locked"));
}

#[wasm_bindgen_test]
fn test_session_rejects_bad_level() {
    let level = serde_json::json!({ "columns": 2, "rows": 20, "pieces": ["O"] });
    let level = to_js_object(&level);
    assert!(JsGameSession::new(level, wasm_bindgen::JsValue::UNDEFINED).is_err());
}
