use jsonlink::{
    ArrayIter, CommentPolicy, JsonErrorKind, JsonLines, ParseOptions, Result, json_link,
};


#[derive(Debug, PartialEq)]
struct Event {
    id: u32,
    kind: String,
}

json_link! {
    Event {
        "id" => id: u32,
        "kind" => kind: String,
    }
}

fn event(id: u32, kind: &str) -> Event {
    Event {
        id,
        kind: kind.into(),
    }
}

#[test]
fn array_elements_one_at_a_time() {
    let input = br#"[{"id": 1, "kind": "open"}, {"kind": "close", "id": 2}]"#;
    let events: Vec<Event> = ArrayIter::new(input).collect::<Result<_>>().unwrap();
    assert_eq!(events, [event(1, "open"), event(2, "close")]);
}

#[test]
fn array_errors_surface_when_reached() {
    let input = br#"[{"id": 1, "kind": "open"}, {"id": -2, "kind": "close"}, oops]"#;
    let mut it = ArrayIter::<Event>::new(input);
    assert_eq!(it.next().unwrap().unwrap(), event(1, "open"));
    let err = it.next().unwrap().unwrap_err();
    assert!(matches!(err.kind, JsonErrorKind::NumberOutOfRange { .. }));
    assert!(it.next().is_none());
}

#[test]
fn array_trailing_data_is_checked_at_the_end() {
    let results: Vec<Result<u8>> = ArrayIter::new(b"[1] 2").collect();
    assert_eq!(results.len(), 2);
    assert_eq!(*results[0].as_ref().unwrap(), 1);
    let err = results[1].as_ref().unwrap_err();
    assert!(matches!(err.kind, JsonErrorKind::UnexpectedToken { .. }));
    assert_eq!(err.offset(), Some(4));
}

#[test]
fn array_iter_honours_options() {
    let options = ParseOptions::default().with_comments(CommentPolicy::Hash);
    let v: Vec<u8> = ArrayIter::with_options(b"[1, # first\n 2]", options)
        .collect::<Result<_>>()
        .unwrap();
    assert_eq!(v, [1, 2]);
}

#[test]
fn json_lines_documents() {
    let input = b"{\"id\": 1, \"kind\": \"a\"}\r\n\r\n  \n{\"id\": 2, \"kind\": \"b\"}";
    let events: Vec<Event> = JsonLines::new(input).collect::<Result<_>>().unwrap();
    assert_eq!(events, [event(1, "a"), event(2, "b")]);
}

#[test]
fn json_lines_stop_after_an_error() {
    let input = b"{\"id\": 1, \"kind\": \"a\"}\n{\"id\": 2}\n{\"id\": 3, \"kind\": \"c\"}\n";
    let mut it = JsonLines::<Event>::new(input);
    assert!(it.next().unwrap().is_ok());
    let err = it.next().unwrap().unwrap_err();
    assert!(matches!(
        &err.kind,
        JsonErrorKind::MissingRequiredField { field, .. } if field == "kind"
    ));
    assert_eq!(err.offset(), Some(31));
    assert!(it.next().is_none());
}

#[test]
fn a_value_may_not_span_lines() {
    let err = JsonLines::<Vec<u8>>::new(b"[1,\n2]\n")
        .next()
        .unwrap()
        .unwrap_err();
    assert!(matches!(err.kind, JsonErrorKind::UnexpectedEndOfInput { .. }));
    assert_eq!(err.offset(), Some(3));
}
