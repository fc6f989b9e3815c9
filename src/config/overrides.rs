use serde::Serialize;
use serde_json::Value;

/// Serialize CLI overrides, dropping every field the user left unset
///
/// Unset flags serialize as `null`; left in place they would mask values from
/// config files and the environment.
pub fn filter_unset<T: Serialize>(input: T) -> Value {
    let mut value = serde_json::to_value(input).unwrap_or(Value::Null);
    filter_unset_recursive(&mut value);
    value
}

fn filter_unset_recursive(value: &mut Value) {
    if let Value::Object(map) = value {
        for (_, v) in map.iter_mut() {
            filter_unset_recursive(v);
        }

        map.retain(|_, v| match v {
            Value::Null => false,
            Value::Object(inner) => !inner.is_empty(),
            _ => true,
        });
    }
}
