use serde_json::Value;

/// Headline figures, most important first. The first non-null one present
/// is printed on its own.
const PRIORITY_KEYS: [&str; 6] = [
    "monthly_cash_flow",
    "monthly_payment",
    "base_case_value",
    "valid",
    "cash_on_cash_return",
    "cap_rate",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result_obj {
        Value::Object(map) => {
            for key in PRIORITY_KEYS {
                if let Some(val) = map.get(key) {
                    if !val.is_null() {
                        println!("{}", format_minimal(val));
                        return;
                    }
                }
            }
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, format_minimal(val));
                return;
            }
        }
        // Loan type listing: one label per line
        Value::Array(rows) => {
            for row in rows {
                let label = row.get("loan_type").unwrap_or(row);
                println!("{}", format_minimal(label));
            }
            return;
        }
        _ => {}
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
