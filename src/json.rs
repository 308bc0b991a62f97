//! JSON property payload conversion.
//!
//! Payloads arrive as JSON objects. Integers (signed or unsigned, the latter
//! narrowed) become int64, real numbers become double, nulls are dropped,
//! nested objects become bags, and arrays must be homogeneous over
//! {string, int, double, bool}. Arrays of objects, arrays of arrays and
//! mixed-type arrays reject the whole payload.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::properties::{ArrayValue, PropertyBag, PropertyValue};

/// Parses a payload string into an ordered property map. `None` means the
/// payload was rejected and the surrounding operation should fail with its
/// in-band zero/false result.
pub fn parse_properties(payload: &str) -> Option<BTreeMap<String, PropertyValue>> {
    let value: Value = serde_json::from_str(payload).ok()?;
    match value {
        Value::Object(members) => convert_object(members),
        _ => None,
    }
}

/// Parses a single JSON fragment into one property value. Nulls have no
/// property representation and reject the fragment.
pub fn parse_value(fragment: &str) -> Option<PropertyValue> {
    let value: Value = serde_json::from_str(fragment).ok()?;
    convert_value(&value)?
}

fn convert_object(
    members: serde_json::Map<String, Value>,
) -> Option<BTreeMap<String, PropertyValue>> {
    let mut map = BTreeMap::new();
    for (key, value) in members {
        match convert_value(&value)? {
            Some(converted) => {
                map.insert(key, converted);
            }
            None => {} // null: dropped
        }
    }
    Some(map)
}

/// Outer `None` rejects the payload; inner `None` drops a null member.
fn convert_value(value: &Value) -> Option<Option<PropertyValue>> {
    let converted = match value {
        Value::Null => return Some(None),
        Value::Bool(b) => PropertyValue::Boolean(*b),
        Value::Number(n) => convert_number(n),
        Value::String(s) => PropertyValue::String(s.clone()),
        Value::Array(items) => PropertyValue::List(convert_array(items)?),
        Value::Object(members) => {
            PropertyValue::Object(PropertyBag::from_map(convert_object(members.clone())?))
        }
    };
    Some(Some(converted))
}

fn convert_number(n: &serde_json::Number) -> PropertyValue {
    if let Some(i) = n.as_i64() {
        PropertyValue::Integer(i)
    } else if let Some(u) = n.as_u64() {
        // Unsigned values above i64::MAX narrow by wrapping.
        PropertyValue::Integer(u as i64)
    } else {
        PropertyValue::Double(n.as_f64().unwrap_or_default())
    }
}

fn convert_array(items: &[Value]) -> Option<ArrayValue> {
    let first = match items.first() {
        Some(first) => first,
        None => return Some(ArrayValue::default()),
    };
    match first {
        Value::String(_) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => out.push(s.clone()),
                    _ => return None,
                }
            }
            Some(ArrayValue::Strings(out))
        }
        Value::Bool(_) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Bool(b) => out.push(*b),
                    _ => return None,
                }
            }
            Some(ArrayValue::Booleans(out))
        }
        Value::Number(first_n) => {
            // An array is integral only if every member is; one real number
            // promotes nothing, it rejects mixing instead.
            if first_n.is_f64() {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Number(n) if n.is_f64() => out.push(n.as_f64()?),
                        _ => return None,
                    }
                }
                Some(ArrayValue::Doubles(out))
            } else {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Number(n) if !n.is_f64() => match convert_number(n) {
                            PropertyValue::Integer(i) => out.push(i),
                            _ => return None,
                        },
                        _ => return None,
                    }
                }
                Some(ArrayValue::Integers(out))
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_payload_converts() {
        let map = parse_properties(r#"{"name":"max","age":42,"weight":72.5,"admin":true}"#)
            .expect("valid payload");
        assert_eq!(map["name"], PropertyValue::String("max".to_string()));
        assert_eq!(map["age"], PropertyValue::Integer(42));
        assert_eq!(map["weight"], PropertyValue::Double(72.5));
        assert_eq!(map["admin"], PropertyValue::Boolean(true));
    }

    #[test]
    fn nulls_are_dropped() {
        let map = parse_properties(r#"{"keep":1,"drop":null}"#).expect("valid payload");
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("keep"));
    }

    #[test]
    fn nested_objects_become_bags() {
        let map = parse_properties(r#"{"address":{"city":"Lisbon","zip":1000}}"#).unwrap();
        match &map["address"] {
            PropertyValue::Object(bag) => {
                assert_eq!(bag.get_string("city"), "Lisbon");
                assert_eq!(bag.get_integer("zip"), 1000);
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn homogeneous_arrays_convert() {
        let map =
            parse_properties(r#"{"tags":["a","b"],"scores":[1,2,3],"flags":[true,false]}"#)
                .unwrap();
        assert_eq!(
            map["tags"],
            PropertyValue::List(ArrayValue::Strings(vec!["a".into(), "b".into()]))
        );
        assert_eq!(
            map["scores"],
            PropertyValue::List(ArrayValue::Integers(vec![1, 2, 3]))
        );
        assert_eq!(
            map["flags"],
            PropertyValue::List(ArrayValue::Booleans(vec![true, false]))
        );
    }

    #[test]
    fn bad_payloads_reject() {
        assert!(parse_properties("not json").is_none());
        assert!(parse_properties(r#"[1,2,3]"#).is_none());
        assert!(parse_properties(r#"{"mixed":[1,"two"]}"#).is_none());
        assert!(parse_properties(r#"{"nested":[[1],[2]]}"#).is_none());
        assert!(parse_properties(r#"{"objs":[{"a":1}]}"#).is_none());
    }

    #[test]
    fn unsigned_narrows_to_signed() {
        let map = parse_properties(r#"{"big":18446744073709551615}"#).unwrap();
        assert_eq!(map["big"], PropertyValue::Integer(-1));
    }

    #[test]
    fn single_value_fragments() {
        assert_eq!(parse_value("3"), Some(PropertyValue::Integer(3)));
        assert_eq!(
            parse_value(r#""three""#),
            Some(PropertyValue::String("three".to_string()))
        );
        assert_eq!(parse_value("null"), None);
    }
}
