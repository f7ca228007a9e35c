use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;
use tabled::{builder::Builder, Table};

use rental_calc_core::rental::format::{display_kind, format_value as format_display, DisplayKind};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            // Check if "result" key holds the primary data
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(map);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) if res_map.contains_key("matrix") => print_grid(res_map),
        Value::Object(res_map) => {
            print_flat_object(res_map);
            // Nested rows such as the amortisation years get their own table
            for (key, val) in res_map {
                if let Value::Array(rows) = val {
                    if rows.iter().any(Value::is_object) {
                        println!("\n{}:", key);
                        print_array_table(rows);
                    }
                }
            }
        }
        _ => print_flat_object(envelope),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        if is_row_list(val) {
            continue;
        }
        builder.push_record([key.as_str(), &format_field(key, val)]);
    }
    println!("{}", Table::from(builder));
}

/// Sensitivity grid: variable_1 down the side, variable_2 across the top.
fn print_grid(res_map: &Map<String, Value>) {
    let metric = res_map
        .get("output_metric")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let empty = Vec::new();
    let rows = res_map.get("variable_1_values").and_then(Value::as_array).unwrap_or(&empty);
    let cols = res_map.get("variable_2_values").and_then(Value::as_array).unwrap_or(&empty);
    let matrix = res_map.get("matrix").and_then(Value::as_array).unwrap_or(&empty);
    let row_name = res_map.get("variable_1_name").and_then(Value::as_str).unwrap_or_default();
    let col_name = res_map.get("variable_2_name").and_then(Value::as_str).unwrap_or_default();

    let mut builder = Builder::default();
    let mut header = vec![format!("{} \\ {}", row_name, col_name)];
    header.extend(cols.iter().map(|c| format_field(col_name, c)));
    builder.push_record(header);

    for (row_value, cells) in rows.iter().zip(matrix) {
        let mut record = vec![format_field(row_name, row_value)];
        if let Value::Array(cells) = cells {
            record.extend(cells.iter().map(|cell| format_field(metric, cell)));
        }
        builder.push_record(record);
    }
    println!("{}", Table::from(builder));

    if let Some(base) = res_map.get("base_case_value") {
        println!("\nBase case {}: {}", metric, format_field(metric, base));
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    // Collect all keys from first object for headers
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| {
                        map.get(h.as_str())
                            .map(|v| format_field(h, v))
                            .unwrap_or_default()
                    })
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_field("", item));
        }
    }
}

fn is_row_list(value: &Value) -> bool {
    matches!(value, Value::Array(rows) if rows.iter().any(Value::is_object))
}

/// Render a value with the display convention of the field it came from.
fn format_field(key: &str, value: &Value) -> String {
    let kind = display_kind(key);
    match value {
        Value::String(s) if kind != DisplayKind::Plain => match Decimal::from_str(s) {
            Ok(d) => format_display(kind, d),
            Err(_) => s.clone(),
        },
        Value::Null if kind == DisplayKind::Years => "N/A".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(|v| format_field(key, v)).collect();
            items.join(", ")
        }
        Value::Object(map) => {
            let items: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", k, format_field(k, v)))
                .collect();
            items.join("; ")
        }
    }
}
