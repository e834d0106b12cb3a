use jsonlink::{
    CommentPolicy, CustomEncoding, CustomFns, FieldDescriptor, JsonErrorKind, LiteralAsString,
    ParseOptions, Schema, Value, from_str, from_str_with_options, json_link, parse,
    parse_with_options,
};


fn ibs() -> FieldDescriptor {
    FieldDescriptor::class(
        "",
        Schema::new(vec![
            FieldDescriptor::signed("i"),
            FieldDescriptor::boolean("b"),
            FieldDescriptor::string("s"),
        ]),
    )
}

#[test]
fn parses_members_in_document_order() {
    let v = parse(&ibs(), br#"{"i":55,"b":true,"s":"yo"}"#).unwrap();
    assert_eq!(
        v,
        Value::Class(vec![
            Value::Signed(55),
            Value::Bool(true),
            Value::String("yo".into())
        ])
    );
}

#[test]
fn member_order_does_not_matter() {
    let canonical = parse(&ibs(), br#"{"i":55,"b":true,"s":"yo"}"#).unwrap();
    for input in [
        &br#"{"b":true,"i":55,"s":"yo"}"#[..],
        br#"{"s":"yo","b":true,"i":55}"#,
        br#"{"x":[1,{"i":2}],"s":"yo","y":"}","b":true,"z":null,"i":55}"#,
    ] {
        assert_eq!(parse(&ibs(), input).unwrap(), canonical);
    }
}

#[test]
fn whitespace_between_tokens_is_insignificant() {
    let compact = parse(&ibs(), br#"{"i":55,"b":true,"s":"yo"}"#).unwrap();
    let spaced = parse(
        &ibs(),
        b" \n{ \"i\" :\t55 ,\r\n  \"b\"\n:\ntrue , \"s\" : \"yo\"\n}\n ",
    )
    .unwrap();
    assert_eq!(compact, spaced);
}

#[test]
fn nested_array_member() {
    let desc = FieldDescriptor::class(
        "",
        Schema::new(vec![FieldDescriptor::array(
            "y",
            FieldDescriptor::signed(""),
        )]),
    );
    let v = parse(&desc, br#"{"y":[1,2,3,4]}"#).unwrap();
    assert_eq!(
        v,
        Value::Class(vec![Value::Array(
            (1..=4).map(Value::Signed).collect()
        )])
    );
}

#[test]
fn missing_required_member_points_at_closing_brace() {
    let desc = FieldDescriptor::class(
        "",
        Schema::new(vec![
            FieldDescriptor::signed("i"),
            FieldDescriptor::boolean("b"),
        ]),
    );
    let err = parse(&desc, br#"{"i":55}"#).unwrap_err();
    assert!(matches!(
        &err.kind,
        JsonErrorKind::MissingRequiredField { field, .. } if field == "b"
    ));
    assert_eq!(err.offset(), Some(7));
}

#[test]
fn absent_and_null_nullable_members() {
    let desc = FieldDescriptor::class(
        "",
        Schema::new(vec![
            FieldDescriptor::signed("a").nullable(),
            FieldDescriptor::string("b").nullable(),
        ]),
    );
    let v = parse(&desc, br#"{"b":null}"#).unwrap();
    assert_eq!(v, Value::Class(vec![Value::Null, Value::Null]));
}

#[test]
fn exact_mappings_reject_unknown_members() {
    let input = br#"{"i":1,"bb":true,"b":false,"s":""}"#;
    assert!(parse(&ibs(), input).is_ok());

    let options = ParseOptions::default().with_exact_mappings(true);
    let err = parse_with_options(&ibs(), input, options).unwrap_err();
    match &err.kind {
        JsonErrorKind::UnexpectedMember {
            field, suggestion, ..
        } => {
            assert_eq!(field, "bb");
            assert_eq!(suggestion.as_deref(), Some("b"));
        }
        other => panic!("unexpected error kind: {other:?}"),
    }
    assert_eq!(err.offset(), Some(7));
}

#[test]
fn first_duplicate_member_wins() {
    let v = parse(&ibs(), br#"{"i":1,"b":true,"i":2,"s":"x"}"#).unwrap();
    assert_eq!(
        v,
        Value::Class(vec![
            Value::Signed(1),
            Value::Bool(true),
            Value::String("x".into())
        ])
    );
}

#[test]
fn trailing_commas_are_tolerated() {
    let v: Vec<u32> = from_str("[1, 2, 3,]").unwrap();
    assert_eq!(v, [1, 2, 3]);
    assert!(parse(&ibs(), br#"{"i":1,"b":true,"s":"",}"#).is_ok());
}

#[test]
fn comments_are_whitespace_when_enabled() {
    let input = "# settings\n[\n  1, # one\n  2\n]\n";
    let options = ParseOptions::default().with_comments(CommentPolicy::Hash);
    let v: Vec<i32> = from_str_with_options(input, options).unwrap();
    assert_eq!(v, [1, 2]);
    assert!(from_str::<Vec<i32>>(input).is_err());
}

#[test]
fn trailing_data_check_can_be_disabled() {
    let err = from_str::<bool>("true false").unwrap_err();
    assert!(matches!(
        err.kind,
        JsonErrorKind::UnexpectedToken {
            expected: "end of input",
            ..
        }
    ));
    assert_eq!(err.offset(), Some(5));

    let options = ParseOptions::default().with_verify_end_of_data(false);
    assert!(from_str_with_options::<bool>("true false", options).unwrap());
}

#[test]
fn quoted_literals() {
    let maybe = FieldDescriptor::signed("").literal_as_string(LiteralAsString::Maybe);
    assert_eq!(parse(&maybe, br#""42""#).unwrap(), Value::Signed(42));
    assert_eq!(parse(&maybe, b"42").unwrap(), Value::Signed(42));

    let always = FieldDescriptor::boolean("").literal_as_string(LiteralAsString::Always);
    assert_eq!(parse(&always, br#""true""#).unwrap(), Value::Bool(true));
    assert!(parse(&always, b"true").is_err());

    let never = FieldDescriptor::signed("");
    let err = parse(&never, br#""42""#).unwrap_err();
    assert!(matches!(err.kind, JsonErrorKind::TypeMismatch { .. }));
}

#[test]
fn empty_string_as_null() {
    let desc = FieldDescriptor::string("").empty_is_null();
    assert_eq!(parse(&desc, br#""""#).unwrap(), Value::Null);
    assert_eq!(parse(&desc, br#""x""#).unwrap(), Value::String("x".into()));
}

#[test]
fn raw_strings_keep_escapes() {
    let v = parse(&FieldDescriptor::string_raw(""), br#""a\nb""#).unwrap();
    assert_eq!(v, Value::String(r"a\nb".into()));
}

#[test]
fn key_value_arrays() {
    let desc = FieldDescriptor::key_value_array(
        "",
        FieldDescriptor::string(""),
        FieldDescriptor::signed(""),
    );
    let v = parse(&desc, br#"[{"value": 1, "key": "a"}, {"key": "b", "value": 2}]"#).unwrap();
    assert_eq!(
        v,
        Value::Map(vec![
            (Value::String("a".into()), Value::Signed(1)),
            (Value::String("b".into()), Value::Signed(2)),
        ])
    );
}

#[test]
fn maps_with_number_keys() {
    let desc =
        FieldDescriptor::key_value("", FieldDescriptor::unsigned(""), FieldDescriptor::boolean(""));
    let v = parse(&desc, br#"{"1": true, "20": false}"#).unwrap();
    assert_eq!(
        v,
        Value::Map(vec![
            (Value::Unsigned(1), Value::Bool(true)),
            (Value::Unsigned(20), Value::Bool(false)),
        ])
    );
    let err = parse(&desc, br#"{"x": true}"#).unwrap_err();
    assert!(matches!(err.kind, JsonErrorKind::InvalidNumber { .. }));
}

fn hex_parse(text: &str) -> Result<Value<'static>, String> {
    let digits = text.strip_prefix("0x").ok_or("missing 0x prefix")?;
    u64::from_str_radix(digits, 16)
        .map(Value::Unsigned)
        .map_err(|e| e.to_string())
}

fn hex_write(value: &Value<'_>) -> Result<String, String> {
    value
        .as_u64()
        .map(|v| format!("0x{v:x}"))
        .ok_or_else(|| "not an unsigned value".to_string())
}

const HEX: CustomFns = CustomFns {
    parse: hex_parse,
    write: hex_write,
};

#[derive(Debug, PartialEq)]
struct Register {
    name: String,
    address: u64,
}

json_link! {
    Register {
        "name" => name: String,
        "address" => address: u64 as FieldDescriptor::custom("", CustomEncoding::String, HEX),
    }
}

#[test]
fn custom_members() {
    let r: Register = from_str(r#"{"address": "0xabc", "name": "pc"}"#).unwrap();
    assert_eq!(
        r,
        Register {
            name: "pc".into(),
            address: 2748
        }
    );
    assert_eq!(
        jsonlink::to_string(&r).unwrap(),
        r#"{"name":"pc","address":"0xabc"}"#
    );

    let err = from_str::<Register>(r#"{"address": "abc", "name": "pc"}"#).unwrap_err();
    assert!(matches!(
        &err.kind,
        JsonErrorKind::InvalidValue { message } if message == "missing 0x prefix"
    ));
}

#[test]
fn escaped_member_names() {
    let desc = FieldDescriptor::class("", Schema::new(vec![FieldDescriptor::signed("ab")]));
    let input = br#"{"a\u0062": 1}"#;
    assert!(parse(&desc, input).is_err());
    let options = ParseOptions::default().with_escaped_names(true);
    assert_eq!(
        parse_with_options(&desc, input, options).unwrap(),
        Value::Class(vec![Value::Signed(1)])
    );
}

#[test]
fn type_mismatch_reports_both_sides() {
    let err = parse(&ibs(), br#"{"i":"x","b":true,"s":""}"#).unwrap_err();
    assert_eq!(
        err.kind,
        JsonErrorKind::TypeMismatch {
            expected: "a number",
            got: "a string"
        }
    );
    assert_eq!(err.offset(), Some(5));
}
