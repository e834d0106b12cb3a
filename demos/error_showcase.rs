//! Error Showcase: jsonlink error diagnostics
//!
//! Every parse error carries the byte offset it was raised at. Errors from
//! `from_str` also carry the source text, so miette can render the offending
//! line with a labelled marker under it.
//!
//! Run with: cargo run --example error_showcase

use std::collections::BTreeMap;

use jsonlink::{
    FieldDescriptor, JsonError, ParseOptions, Schema, from_slice_at, from_str,
    from_str_with_options, json_link, parse,
};
use miette::{GraphicalReportHandler, GraphicalTheme};

// ============================================================================
// Helper Functions
// ============================================================================

fn render_error(err: &dyn miette::Diagnostic) -> String {
    let mut output = String::new();
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode());
    if let Err(e) = handler.render_report(&mut output, err) {
        output = format!("(could not render report: {e})");
    }
    output
}

fn print_scenario(name: &str, description: &str) {
    println!();
    println!("{}", "═".repeat(78));
    println!("SCENARIO: {name}");
    println!("{}", "─".repeat(78));
    println!("{description}");
    println!("{}", "═".repeat(78));
}

fn print_json(json: &str) {
    println!();
    println!("JSON Input:");
    println!("{}", "─".repeat(60));
    for (i, line) in json.lines().enumerate() {
        println!("{:3} │ {line}", i + 1);
    }
    println!("{}", "─".repeat(60));
}

fn report<T>(result: Result<T, JsonError>) {
    match result {
        Ok(_) => println!("Unexpected success!"),
        Err(e) => {
            println!("\nError:");
            println!("{}", render_error(&e));
        }
    }
}

#[derive(Debug)]
#[allow(dead_code)]
struct Data {
    name: String,
    value: i32,
}

json_link! {
    Data {
        "name" => name: String,
        "value" => value: i32,
    }
}

// ============================================================================
// Syntax errors
// ============================================================================

fn scenario_syntax_error_unexpected_char() {
    print_scenario(
        "Syntax Error: Unexpected Character",
        "Invalid character at the start of JSON input.",
    );
    let json = r#"@invalid"#;
    print_json(json);
    report(from_str::<i32>(json));
}

fn scenario_syntax_error_in_context() {
    print_scenario(
        "Syntax Error: Invalid Character in Object",
        "Invalid character appears mid-parse with surrounding context visible.",
    );
    let json = r#"{"name": "test", "value": @bad}"#;
    print_json(json);
    report(from_str::<Data>(json));
}

fn scenario_syntax_error_multiline() {
    print_scenario(
        "Syntax Error: Multiline JSON",
        "Error on the third line of a pretty-printed document.",
    );
    let json = "{\n  \"name\": \"test\",\n  \"value\": ???\n}";
    print_json(json);
    report(from_str::<Data>(json));
}

fn scenario_unbalanced_skipped_member() {
    print_scenario(
        "Syntax Error: Unbalanced Brackets",
        "Unknown members are skipped without being parsed, but their brackets must still balance.",
    );
    let json = r#"{"other": [1, {"x": 2]}, "name": "a", "value": 1}"#;
    print_json(json);
    report(from_str::<Data>(json));
}

// ============================================================================
// Semantic errors
// ============================================================================

fn scenario_unknown_field() {
    print_scenario(
        "Unknown Field",
        "With exact mappings enabled, undeclared members are rejected with a suggestion.",
    );
    let json = r#"{"nmae": "test", "value": 1}"#;
    print_json(json);
    let options = ParseOptions::default().with_exact_mappings(true);
    report(from_str_with_options::<Data>(json, options));
}

fn scenario_type_mismatch() {
    print_scenario(
        "Type Mismatch",
        "A string where the schema declares a number.",
    );
    let json = r#"{"name": "test", "value": "forty-two"}"#;
    print_json(json);
    report(from_str::<Data>(json));
}

fn scenario_missing_field() {
    print_scenario(
        "Missing Required Field",
        "A non-nullable member is absent; both ends of the object are labelled.",
    );
    let json = "{\n  \"name\": \"test\"\n}";
    print_json(json);
    report(from_str::<Data>(json));
}

fn scenario_number_overflow() {
    print_scenario("Number Out of Range", "300 does not fit in a u8.");
    let json = r#"{"id": 300}"#;
    print_json(json);
    report(from_str::<BTreeMap<String, u8>>(json));
}

fn scenario_unexpected_null() {
    print_scenario(
        "Unexpected Null",
        "null for a member that is not declared nullable.",
    );
    let json = r#"{"name": null, "value": 1}"#;
    print_json(json);
    report(from_str::<Data>(json));
}

fn scenario_wrong_type_for_array() {
    print_scenario(
        "Wrong Type for Array",
        "An object where the schema declares an array.",
    );
    let json = r#"{"a": 1}"#;
    print_json(json);
    report(from_str::<Vec<i32>>(json));
}

fn scenario_unknown_variant() {
    print_scenario(
        "Unknown Variant",
        "No alternative of an untagged variant accepts a boolean.",
    );
    let json = "true";
    print_json(json);
    let desc = FieldDescriptor::variant(
        "",
        vec![FieldDescriptor::signed(""), FieldDescriptor::string("")],
    );
    report(parse(&desc, json.as_bytes()).map_err(|e| e.with_source(json)));
}

fn scenario_path_not_found() {
    print_scenario(
        "Path Not Found",
        "Selecting an array element past the end.",
    );
    let json = r#"{"servers": [{"port": 80}]}"#;
    print_json(json);
    report(from_slice_at::<u16>(json.as_bytes(), "servers[3].port").map_err(|e| e.with_source(json)));
}

fn scenario_nesting_too_deep() {
    print_scenario(
        "Nesting Too Deep",
        "The depth limit stops runaway recursion.",
    );
    let json = "[[[1]]]";
    print_json(json);
    let options = ParseOptions::default().with_max_depth(2);
    report(from_str_with_options::<Vec<Vec<Vec<i32>>>>(json, options));
}

// ============================================================================
// Edge cases
// ============================================================================

fn scenario_trailing_data() {
    print_scenario(
        "Trailing Data",
        "Valid JSON followed by unexpected content.",
    );
    let json = r#"42 extra stuff"#;
    print_json(json);
    report(from_str::<i32>(json));
}

fn scenario_empty_input() {
    print_scenario("Empty Input", "No JSON content at all.");
    let json = "";
    print_json(json);
    report(from_str::<i32>(json));
}

fn scenario_unicode_content() {
    print_scenario(
        "Unicode Content",
        "Offsets are in bytes; the report still lines up under multi-byte text.",
    );
    let json = r#"{"name": "🎉 party", "value": nope}"#;
    print_json(json);
    report(from_str::<Data>(json));
}

fn scenario_schema_free_class() {
    print_scenario(
        "Descriptor-Driven Parse",
        "Schemas can be built at runtime without any Rust type behind them.",
    );
    let json = r#"{"id": 1, "tags": ["a", 2]}"#;
    print_json(json);
    let desc = FieldDescriptor::class(
        "",
        Schema::new(vec![
            FieldDescriptor::unsigned("id"),
            FieldDescriptor::array("tags", FieldDescriptor::string("")),
        ]),
    );
    report(parse(&desc, json.as_bytes()).map_err(|e| e.with_source(json)));
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    println!();
    println!("{}", "═".repeat(78));
    println!("  JSONLINK ERROR SHOWCASE");
    println!("  Every error includes its offset, a code, and a labelled span");
    println!("{}", "═".repeat(78));

    // Syntax errors
    scenario_syntax_error_unexpected_char();
    scenario_syntax_error_in_context();
    scenario_syntax_error_multiline();
    scenario_unbalanced_skipped_member();

    // Semantic errors
    scenario_unknown_field();
    scenario_type_mismatch();
    scenario_missing_field();
    scenario_number_overflow();
    scenario_unexpected_null();
    scenario_wrong_type_for_array();
    scenario_unknown_variant();
    scenario_path_not_found();
    scenario_nesting_too_deep();

    // Edge cases
    scenario_trailing_data();
    scenario_empty_input();
    scenario_unicode_content();
    scenario_schema_free_class();

    println!();
    println!("{}", "═".repeat(78));
    println!("  END OF SHOWCASE");
    println!("{}", "═".repeat(78));
}
