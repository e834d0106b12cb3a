//! Showcase of jsonlink serialization
//!
//! Each section prints a value minified, pretty-printed, and under a custom
//! serialization policy, then reads the minified text back.

use std::collections::BTreeMap;

use jsonlink::{
    Discriminator, FieldDescriptor, FromJson, Indentation, JsonDescriptor, JsonError,
    JsonErrorKind, NewLineDelimiter, RestrictedStringOutput, Result, Schema, SerializationPolicy,
    Timestamp, ToJson, Value, from_str, json_link, to_string, to_string_pretty,
    to_vec_with_policy,
};

fn main() {
    println!("\n{}", "═".repeat(70));
    println!("  jsonlink Serialization Showcase");
    println!("{}\n", "═".repeat(70));

    // =========================================================================
    // Basic Struct
    // =========================================================================
    showcase(
        "Basic Struct",
        &Person {
            name: "Alice".to_string(),
            age: 30,
            email: Some("alice@example.com".to_string()),
        },
    );

    // =========================================================================
    // Nested Structs
    // =========================================================================
    showcase(
        "Nested Structs",
        &Company {
            name: "Acme Corp".to_string(),
            address: Address {
                street: "123 Main St".to_string(),
                city: "Springfield".to_string(),
            },
            employees: vec!["Bob".to_string(), "Carol".to_string()],
        },
    );

    // =========================================================================
    // Maps and Timestamps
    // =========================================================================
    showcase(
        "Maps and Timestamps",
        &Config {
            debug: true,
            max_connections: 100,
            endpoints: vec!["localhost:8080".to_string()],
            started: Timestamp::from_millis(1_529_679_937_250),
            weights: BTreeMap::from([(1, 0.5), (2, 0.25)]),
        },
    );

    // =========================================================================
    // Tagged Variants
    // =========================================================================
    showcase(
        "Tagged Variants",
        &vec![
            ApiResponse::Success {
                data: "ok".to_string(),
            },
            ApiResponse::Error {
                code: 404,
                message: "not found".to_string(),
            },
        ],
    );

    // =========================================================================
    // Output Policies
    // =========================================================================
    section("Output Policies");
    let person = Person {
        name: "Zoë 🎉".to_string(),
        age: 7,
        email: None,
    };
    let policy = SerializationPolicy::pretty()
        .with_indent(Indentation::Tab)
        .with_newline(NewLineDelimiter::Lf)
        .with_trailing_comma(true)
        .with_restricted_strings(RestrictedStringOutput::SevenBit);
    match to_vec_with_policy(&person, &policy) {
        Ok(bytes) => println!("{}", String::from_utf8_lossy(&bytes)),
        Err(e) => println!("error: {e}"),
    }

    println!("\n{}", "═".repeat(70));
}

fn section(title: &str) {
    println!("{}", "─".repeat(70));
    println!("  {title}");
    println!("{}", "─".repeat(70));
}

fn showcase<T>(title: &str, value: &T)
where
    T: ToJson + for<'a> FromJson<'a> + PartialEq + std::fmt::Debug,
{
    section(title);
    let minified = match to_string(value) {
        Ok(s) => s,
        Err(e) => {
            println!("error: {e}\n");
            return;
        }
    };
    println!("minified:\n{minified}\n");
    if let Ok(pretty) = to_string_pretty(value) {
        println!("pretty:\n{pretty}\n");
    }
    match from_str::<T>(&minified) {
        Ok(back) if &back == value => println!("round trip: ok\n"),
        Ok(back) => println!("round trip: differs: {back:?}\n"),
        Err(e) => println!("round trip: {e}\n"),
    }
}

#[derive(Debug, PartialEq)]
struct Person {
    name: String,
    age: u32,
    email: Option<String>,
}

json_link! {
    Person {
        "name" => name: String,
        "age" => age: u32,
        "email" => email: Option<String>,
    }
}

#[derive(Debug, PartialEq)]
struct Address {
    street: String,
    city: String,
}

json_link! {
    Address {
        "street" => street: String,
        "city" => city: String,
    }
}

#[derive(Debug, PartialEq)]
struct Company {
    name: String,
    address: Address,
    employees: Vec<String>,
}

json_link! {
    Company {
        "name" => name: String,
        "address" => address: Address,
        "employees" => employees: Vec<String>,
    }
}

#[derive(Debug, PartialEq)]
struct Config {
    debug: bool,
    max_connections: u32,
    endpoints: Vec<String>,
    started: Timestamp,
    weights: BTreeMap<u8, f64>,
}

json_link! {
    Config {
        "debug" => debug: bool,
        "max_connections" => max_connections: u32,
        "endpoints" => endpoints: Vec<String>,
        "started" => started: Timestamp,
        "weights" => weights: BTreeMap<u8, f64>,
    }
}

#[derive(Debug, PartialEq)]
enum ApiResponse {
    Success { data: String },
    Error { code: i32, message: String },
}

fn response_tag(tag: &Value<'_>) -> Option<usize> {
    match tag.as_str()? {
        "success" => Some(0),
        "error" => Some(1),
        _ => None,
    }
}

impl JsonDescriptor for ApiResponse {
    fn descriptor() -> FieldDescriptor {
        let success = Schema::new(vec![
            FieldDescriptor::string("type"),
            FieldDescriptor::string("data"),
        ]);
        let error = Schema::new(vec![
            FieldDescriptor::string("type"),
            FieldDescriptor::signed("code").width(32),
            FieldDescriptor::string("message"),
        ]);
        FieldDescriptor::variant_tagged(
            "",
            vec![
                FieldDescriptor::class("", success),
                FieldDescriptor::class("", error),
            ],
            Discriminator::Submember {
                tag: Box::new(FieldDescriptor::string("type")),
                switcher: response_tag,
            },
        )
    }
}

impl<'a> FromJson<'a> for ApiResponse {
    fn from_value(value: Value<'a>) -> Result<Self> {
        let not_a_response = || {
            JsonError::without_span(JsonErrorKind::InvalidValue {
                message: "not an API response".into(),
            })
        };
        let Value::Variant { index, value } = value else {
            return Err(not_a_response());
        };
        let Value::Class(members) = *value else {
            return Err(not_a_response());
        };
        let mut members = members.into_iter().skip(1);
        let mut next = || members.next().unwrap_or(Value::Null);
        Ok(match index {
            0 => ApiResponse::Success {
                data: String::from_value(next())?,
            },
            _ => ApiResponse::Error {
                code: i32::from_value(next())?,
                message: String::from_value(next())?,
            },
        })
    }
}

impl ToJson for ApiResponse {
    fn to_value(&self) -> Value<'_> {
        let (index, members) = match self {
            ApiResponse::Success { data } => (0, vec![Value::from("success"), data.to_value()]),
            ApiResponse::Error { code, message } => (
                1,
                vec![Value::from("error"), code.to_value(), message.to_value()],
            ),
        };
        Value::Variant {
            index,
            value: Box::new(Value::Class(members)),
        }
    }
}
