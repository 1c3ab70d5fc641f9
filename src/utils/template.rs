use serde_json::{Map, Value};

/// Scalar argument as it appears in a URL; `None` for null, arrays and objects.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(num) => Some(num.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn encode_path_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

/// Fills `{key}` placeholders in `path` from scalar entries of `params`.
///
/// Returns the filled path and the keys that were consumed. Placeholders with
/// no matching scalar are left untouched.
pub fn fill_path_template(path: &str, params: &Map<String, Value>) -> (String, Vec<String>) {
    let mut out = String::with_capacity(path.len());
    let mut used = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let (prefix, tail) = rest.split_at(start);
        out.push_str(prefix);
        let Some(end) = tail.find('}') else {
            out.push_str(tail);
            rest = "";
            break;
        };
        let key = &tail[1..end];
        match params.get(key).and_then(scalar_to_string) {
            Some(value) if !key.is_empty() => {
                out.push_str(&encode_path_segment(&value));
                if !used.iter().any(|k| k == key) {
                    used.push(key.to_string());
                }
            }
            _ => out.push_str(&tail[..=end]),
        }
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    (out, used)
}
