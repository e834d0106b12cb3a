use jsonlink::{
    FieldDescriptor, JsonErrorKind, LiteralAsString, ParseOptions, Value, from_str,
    from_str_with_options, parse, parse_real_fast, parse_real_precise,
};


fn ulps(a: f64, b: f64) -> u64 {
    (a.to_bits() as i64 - b.to_bits() as i64).unsigned_abs()
}

const TRICKY: &[&str] = &[
    "0.1",
    "0.30000000000000004",
    "9007199254740993",
    "2.2250738585072011e-308",
    "2.2250738585072014e-308",
    "1.7976931348623157e308",
    "4.9406564584124654e-324",
    "5e-324",
    "123456789012345678901234567890e-10",
    "7.038531e-26",
    "1e23",
    "-0.0",
    "1e400",
    "1e-400",
];

#[test]
fn precise_reals_match_the_standard_library() {
    for text in TRICKY {
        let expected: f64 = text.parse().unwrap();
        let got = parse_real_precise(text.as_bytes()).unwrap();
        assert_eq!(got.to_bits(), expected.to_bits(), "{text}");
    }
}

#[test]
fn fast_reals_are_close() {
    for text in ["0.1", "3.14159", "1e-5", "123456.789", "-2.5e10", "2.998e8"] {
        let expected: f64 = text.parse().unwrap();
        let got = parse_real_fast(text.as_bytes()).unwrap();
        assert!(ulps(got, expected) <= 2, "{text}: {got} vs {expected}");
    }
}

#[test]
fn fast_reals_stay_close_for_long_digit_strings() {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut digit = || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((state >> 33) % 10) as u8
    };
    let mut inputs = vec!["9505272876442065756419824116950588040".to_string()];
    for len in 20..40 {
        for _ in 0..50 {
            let mut text = String::with_capacity(len);
            for i in 0..len {
                let d = digit();
                let d = if i == 0 { d % 9 + 1 } else { d };
                text.push(char::from(b'0' + d));
            }
            inputs.push(format!("{}.{}", &text[..5], &text[5..]));
            inputs.push(format!("{text}e-30"));
            inputs.push(text);
        }
    }
    for text in &inputs {
        let expected: f64 = text.parse().unwrap();
        let got = parse_real_fast(text.as_bytes()).unwrap();
        assert!(ulps(got, expected) <= 2, "{text}: {got} vs {expected}");
    }
}

#[test]
fn real_grammar() {
    for bad in ["", "-", ".5", "1.", "1e", "1e+", "01x", "1.5.2", "0x10"] {
        assert!(parse_real_fast(bad.as_bytes()).is_none(), "{bad}");
        assert!(parse_real_precise(bad.as_bytes()).is_none(), "{bad}");
    }
}

#[test]
fn precision_is_chosen_per_parse() {
    let precise = ParseOptions::default().with_precise_reals(true);
    let v: Vec<f64> = from_str_with_options("[0.1, 9007199254740993, 1e23]", precise).unwrap();
    assert_eq!(v, [0.1, 9007199254740992.0, 1e23]);

    let v: f64 = from_str("0.5").unwrap();
    assert_eq!(v, 0.5);
}

#[test]
fn integers_are_range_checked_for_native_types() {
    assert_eq!(from_str::<i8>("-128").unwrap(), i8::MIN);
    assert_eq!(from_str::<i64>("-9223372036854775808").unwrap(), i64::MIN);
    assert_eq!(from_str::<u64>("18446744073709551615").unwrap(), u64::MAX);
    assert_eq!(from_str::<u16>("-0").unwrap(), 0);

    for (text, target) in [
        ("128", "i8"),
        ("9223372036854775808", "i64"),
        ("-1", "u64"),
        ("65536", "u16"),
    ] {
        let err = match target {
            "i8" => from_str::<i8>(text).map(drop),
            "i64" => from_str::<i64>(text).map(drop),
            "u64" => from_str::<u64>(text).map(drop),
            _ => from_str::<u16>(text).map(drop),
        }
        .unwrap_err();
        assert_eq!(
            err.kind,
            JsonErrorKind::NumberOutOfRange {
                value: text.into(),
                target_type: target,
            }
        );
        assert_eq!(err.offset(), Some(0));
    }
}

#[test]
fn unchecked_members_wrap() {
    let byte = FieldDescriptor::unsigned("").width(8);
    assert_eq!(parse(&byte, b"300").unwrap(), Value::Unsigned(44));
    let small = FieldDescriptor::signed("").width(8);
    assert_eq!(parse(&small, b"200").unwrap(), Value::Signed(-56));
    let err = parse(&small.range_checked(), b"200").unwrap_err();
    assert!(matches!(err.kind, JsonErrorKind::NumberOutOfRange { .. }));
}

#[test]
fn integers_reject_fractions() {
    let err = from_str::<i32>("1.5").unwrap_err();
    assert_eq!(
        err.kind,
        JsonErrorKind::InvalidNumber { text: "1.5".into() }
    );
}

#[test]
fn narrow_reals() {
    let v: f32 = from_str("0.1").unwrap();
    assert_eq!(v, 0.1f32);

    let checked = FieldDescriptor::real("").width(32).range_checked();
    let err = parse(&checked, b"1e39").unwrap_err();
    assert!(matches!(
        err.kind,
        JsonErrorKind::NumberOutOfRange { target_type: "f32", .. }
    ));
    assert_eq!(
        parse(&FieldDescriptor::real("").width(32), b"1e39").unwrap(),
        Value::Real(f64::INFINITY)
    );
}

#[test]
fn special_values_are_opt_in() {
    let special = FieldDescriptor::real("").special_values();
    let Value::Real(nan) = parse(&special, br#""NaN""#).unwrap() else {
        panic!("expected a real");
    };
    assert!(nan.is_nan());
    assert_eq!(
        parse(&special, br#""Infinity""#).unwrap(),
        Value::Real(f64::INFINITY)
    );
    assert!(parse(&FieldDescriptor::real(""), br#""NaN""#).is_err());
}

#[test]
fn quoted_reals() {
    let desc = FieldDescriptor::real("").literal_as_string(LiteralAsString::Maybe);
    assert_eq!(parse(&desc, br#""1.5""#).unwrap(), Value::Real(1.5));
    assert_eq!(parse(&desc, b"1.5").unwrap(), Value::Real(1.5));
    let err = parse(&desc, br#""1.5x""#).unwrap_err();
    assert!(matches!(err.kind, JsonErrorKind::InvalidNumber { .. }));
    assert_eq!(err.offset(), Some(1));
}
