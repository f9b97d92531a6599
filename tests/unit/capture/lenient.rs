use super::*;

#[test]
fn trailing_commas_parse_like_clean_input() {
    let dirty: serde_json::Value = parse_lenient(br#"{"a":[1,2,],}"#).unwrap();
    let clean: serde_json::Value = serde_json::from_str(r#"{"a":[1,2]}"#).unwrap();
    assert_eq!(dirty, clean);
}

#[test]
fn strip_removes_only_commas_before_closers() {
    assert_eq!(
        strip_trailing_commas("{\"a\": [1, 2 ,\n ] ,\t}").as_deref(),
        Some("{\"a\": [1, 2 \n ] \t}")
    );
    assert_eq!(strip_trailing_commas(r#"{"a":[1,2],"b":3}"#), None);
}

#[test]
fn commas_inside_strings_are_untouched() {
    assert_eq!(strip_trailing_commas(r#"{"a":"x,]"}"#), None);

    let v: serde_json::Value = parse_lenient(br#"{"a":"x,]","b":[1,],}"#).unwrap();
    assert_eq!(v["a"], "x,]");
    assert_eq!(v["b"], serde_json::json!([1]));
}

#[test]
fn escaped_quote_keeps_string_open() {
    let text = r#"{"a":"say \",}\" ok",}"#;
    assert_eq!(
        strip_trailing_commas(text).as_deref(),
        Some(r#"{"a":"say \",}\" ok"}"#)
    );

    let text = r#"{"a":"back\\",}"#;
    assert_eq!(strip_trailing_commas(text).as_deref(), Some(r#"{"a":"back\\"}"#));
}

#[test]
fn unrepairable_input_surfaces_original_error() {
    let strict = serde_json::from_slice::<serde_json::Value>(b"{\"a\":[1,2,],").unwrap_err();
    let err = parse_lenient::<serde_json::Value>(b"{\"a\":[1,2,],").unwrap_err();
    let SpriteError::Document(msg) = err else {
        panic!("expected document error");
    };
    assert_eq!(msg, strict.to_string());
}

#[test]
fn input_without_repairable_commas_surfaces_original_error() {
    let err = parse_lenient::<serde_json::Value>(b"{\"a\" 1}").unwrap_err();
    assert!(matches!(err, SpriteError::Document(_)));
}
