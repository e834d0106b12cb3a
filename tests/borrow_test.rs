use std::borrow::Cow;
use std::collections::HashMap;

use jsonlink::{JsonErrorKind, from_str, json_link};


#[derive(Debug)]
struct BorrowedStr<'a> {
    name: &'a str,
}

json_link! {
    BorrowedStr<'a> {
        "name" => name: &'a str,
    }
}

#[test]
fn test_borrowed_str_deser() {
    let json = r#"{"name":"hello"}"#;
    let result: BorrowedStr = from_str(json).unwrap();
    assert_eq!(result.name, "hello");
    assert!(json.as_bytes().as_ptr_range().contains(&result.name.as_ptr()));
}

#[test]
fn test_borrowed_str_escaped_fails() {
    // the unescaped text does not exist in the input
    let json = r#"{"name":"hello\nworld"}"#;
    let err = from_str::<BorrowedStr>(json).unwrap_err();
    assert!(matches!(err.kind, JsonErrorKind::InvalidValue { .. }));
    assert!(err.to_string().contains("escapes"));
}

#[derive(Debug)]
struct CowStr<'a> {
    name: Cow<'a, str>,
}

json_link! {
    CowStr<'a> {
        "name" => name: Cow<'a, str>,
    }
}

#[test]
fn test_cow_str_borrowed() {
    let json = r#"{"name":"hello"}"#;
    let result: CowStr = from_str(json).unwrap();
    assert!(matches!(result.name, Cow::Borrowed(_)));
    assert_eq!(&*result.name, "hello");
}

#[test]
fn test_cow_str_owned() {
    let json = r#"{"name":"hello\nworld"}"#;
    let result: CowStr = from_str(json).unwrap();
    assert!(matches!(result.name, Cow::Owned(_)));
    assert_eq!(&*result.name, "hello\nworld");
}

// Map key tests

#[test]
fn test_map_borrowed_str_keys() {
    let json = r#"{"foo":"value1","bar":"value2"}"#;
    let result: HashMap<&str, String> = from_str(json).unwrap();
    assert_eq!(result.get("foo"), Some(&"value1".to_string()));
    assert_eq!(result.get("bar"), Some(&"value2".to_string()));
}

#[test]
fn test_map_cow_str_keys_borrowed() {
    let json = r#"{"foo":"value1","bar":"value2"}"#;
    let result: HashMap<Cow<str>, String> = from_str(json).unwrap();
    for key in result.keys() {
        assert!(
            matches!(key, Cow::Borrowed(_)),
            "key {:?} should be borrowed",
            key
        );
    }
}

#[test]
fn test_map_cow_str_keys_escaped() {
    let json = r#"{"foo\nbar":"value"}"#;
    let result: HashMap<Cow<str>, String> = from_str(json).unwrap();
    let key = result.keys().next().unwrap();
    assert!(matches!(key, Cow::Owned(_)));
    assert_eq!(&**key, "foo\nbar");
}
