use std::collections::BTreeMap;

use jsonlink::{
    FieldDescriptor, Indentation, IoWriter, NewLineDelimiter, RestrictedStringOutput, Schema,
    SerializationPolicy, SerializeErrorKind, SliceWriter, Timestamp, Value, from_str, json_link,
    parse, serialize, serialize_to_writer, to_string, to_string_pretty, to_vec_with_policy,
    to_writer,
};


#[derive(Debug, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

json_link! {
    Point {
        "x" => x: i32,
        "y" => y: i32,
    }
}

#[derive(Debug, PartialEq)]
struct Shape {
    name: String,
    points: Vec<Point>,
    label: Option<String>,
    meta: BTreeMap<String, bool>,
}

json_link! {
    Shape {
        "name" => name: String,
        "points" => points: Vec<Point>,
        "label" => label: Option<String>,
        "meta" => meta: BTreeMap<String, bool>,
    }
}

fn triangle() -> Shape {
    Shape {
        name: "tri".into(),
        points: vec![Point { x: 0, y: 0 }, Point { x: 4, y: 0 }, Point { x: 0, y: 3 }],
        label: None,
        meta: BTreeMap::from([("closed".to_string(), true)]),
    }
}

#[test]
fn minified_output() {
    insta::assert_snapshot!(
        to_string(&triangle()).unwrap(),
        @r#"{"name":"tri","points":[{"x":0,"y":0},{"x":4,"y":0},{"x":0,"y":3}],"meta":{"closed":true}}"#
    );
}

#[test]
fn pretty_output() {
    let shape = Shape {
        points: vec![Point { x: 1, y: 2 }],
        label: Some("one".into()),
        meta: BTreeMap::new(),
        ..triangle()
    };
    insta::assert_snapshot!(to_string_pretty(&shape).unwrap(), @r#"
    {
      "name": "tri",
      "points": [
        {
          "x": 1,
          "y": 2
        }
      ],
      "label": "one",
      "meta": {}
    }
    "#);
}

#[test]
fn round_trips_through_text() {
    let shape = triangle();
    let text = to_string(&shape).unwrap();
    assert_eq!(from_str::<Shape>(&text).unwrap(), shape);
    let pretty = to_string_pretty(&shape).unwrap();
    assert_eq!(from_str::<Shape>(&pretty).unwrap(), shape);
}

#[test]
fn policy_controls_layout() {
    let policy = SerializationPolicy::pretty()
        .with_indent(Indentation::Spaces(4))
        .with_newline(NewLineDelimiter::CrLf)
        .with_trailing_comma(true);
    let out = to_vec_with_policy(&Point { x: 1, y: 2 }, &policy).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "{\r\n    \"x\": 1,\r\n    \"y\": 2,\r\n}"
    );
}

#[test]
fn null_visibility() {
    let desc = FieldDescriptor::class(
        "",
        Schema::new(vec![
            FieldDescriptor::signed("hidden").nullable(),
            FieldDescriptor::signed("shown").null_visible(),
        ]),
    );
    let out = serialize(
        &desc,
        &Value::Class(vec![Value::Null, Value::Null]),
        &SerializationPolicy::minified(),
    )
    .unwrap();
    assert_eq!(out, br#"{"shown":null}"#);
}

#[test]
fn strings_are_escaped() {
    let s = "quote \" backslash \\ tab \t nul \u{0} é 😀";
    insta::assert_snapshot!(
        to_string(&s.to_string()).unwrap(),
        @r#""quote \" backslash \\ tab \t nul \u0000 é 😀""#
    );

    let policy =
        SerializationPolicy::minified().with_restricted_strings(RestrictedStringOutput::SevenBit);
    let out = to_vec_with_policy(&"é😀".to_string(), &policy).unwrap();
    assert_eq!(out, br#""\u00e9\ud83d\ude00""#);
    assert_eq!(from_str::<String>(core::str::from_utf8(&out).unwrap()).unwrap(), "é😀");
}

#[test]
fn numbers() {
    assert_eq!(to_string(&-17i64).unwrap(), "-17");
    assert_eq!(to_string(&u64::MAX).unwrap(), "18446744073709551615");
    assert_eq!(to_string(&0.1f64).unwrap(), "0.1");
    assert_eq!(to_string(&0.1f32).unwrap(), "0.1");
    assert_eq!(to_string(&1e300f64).unwrap(), "1e300");
    assert_eq!(to_string(&f64::NAN).unwrap(), "null");

    let special = FieldDescriptor::real("").special_values();
    let out = serialize(
        &special,
        &Value::Real(f64::NEG_INFINITY),
        &SerializationPolicy::minified(),
    )
    .unwrap();
    assert_eq!(out, br#""-Infinity""#);
    assert_eq!(parse(&special, &out).unwrap(), Value::Real(f64::NEG_INFINITY));
}

#[test]
fn timestamps() {
    let t: Timestamp = from_str(r#""2018-06-22T15:05:37Z""#).unwrap();
    assert_eq!(to_string(&t).unwrap(), r#""2018-06-22T15:05:37Z""#);
    let t = Timestamp::from_millis(t.as_millis() + 250);
    assert_eq!(to_string(&t).unwrap(), r#""2018-06-22T15:05:37.250Z""#);
}

#[test]
fn writers() {
    let mut buf = [0u8; 64];
    let mut sink = SliceWriter::new(&mut buf);
    to_writer(&Point { x: 1, y: 2 }, &mut sink).unwrap();
    assert_eq!(sink.written(), br#"{"x":1,"y":2}"#);

    let mut small = [0u8; 4];
    let mut sink = SliceWriter::new(&mut small);
    let err = to_writer(&Point { x: 1, y: 2 }, &mut sink).unwrap_err();
    assert_eq!(err.kind, SerializeErrorKind::CapacityExceeded { capacity: 4 });

    let mut io = IoWriter::new(Vec::new());
    serialize_to_writer(
        &FieldDescriptor::array("", FieldDescriptor::boolean("")),
        &Value::Array(vec![Value::Bool(true)]),
        &SerializationPolicy::minified(),
        &mut io,
    )
    .unwrap();
    assert_eq!(io.into_inner(), b"[true]");
}

#[test]
fn shape_mismatch_is_an_error() {
    let err = serialize(
        &FieldDescriptor::string(""),
        &Value::Signed(1),
        &SerializationPolicy::minified(),
    )
    .unwrap_err();
    assert!(matches!(err.kind, SerializeErrorKind::TypeMismatch { .. }));
}
