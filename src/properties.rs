//! Property values and the ordered per-entity property bag.
//!
//! A bag keeps `(key, value)` pairs in insertion order after the last set of
//! each key. Keys are additionally interned to a 64-bit token so lookups
//! compare tokens before strings.
//!
//! Absent keys surface through the typed getters as tombstones: the empty
//! string, `i64::MIN`, the minimum positive double, `false`, the empty bag
//! or the empty list. Callers that cannot afford to confuse a tombstone with
//! a legitimately-minimal stored value should use [`PropertyBag::try_get`]
//! instead; the typed getters exist for API compatibility with the wire
//! surface.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::ids::key_token;

/// Tombstone returned by [`PropertyValue::as_integer`] for absent keys.
pub const TOMBSTONE_INTEGER: i64 = i64::MIN;
/// Tombstone returned by [`PropertyValue::as_double`] for absent keys.
pub const TOMBSTONE_DOUBLE: f64 = f64::MIN_POSITIVE;

/// A homogeneous array property. Mixed element types are rejected at the
/// payload boundary, so a list is always one of these four shapes.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum ArrayValue {
    Strings(Vec<String>),
    Integers(Vec<i64>),
    Doubles(Vec<f64>),
    Booleans(Vec<bool>),
}

impl Default for ArrayValue {
    fn default() -> Self {
        ArrayValue::Strings(Vec::new())
    }
}

impl ArrayValue {
    pub fn len(&self) -> usize {
        match self {
            ArrayValue::Strings(v) => v.len(),
            ArrayValue::Integers(v) => v.len(),
            ArrayValue::Doubles(v) => v.len(),
            ArrayValue::Booleans(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single property value: a tagged sum over the supported shapes.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    Object(PropertyBag),
    List(ArrayValue),
}

impl PropertyValue {
    /// The string inside, or the empty-string tombstone on mismatch.
    pub fn as_string(&self) -> String {
        match self {
            PropertyValue::String(s) => s.clone(),
            _ => String::new(),
        }
    }

    /// The integer inside, or [`TOMBSTONE_INTEGER`] on mismatch.
    pub fn as_integer(&self) -> i64 {
        match self {
            PropertyValue::Integer(i) => *i,
            _ => TOMBSTONE_INTEGER,
        }
    }

    /// The double inside, or [`TOMBSTONE_DOUBLE`] on mismatch.
    pub fn as_double(&self) -> f64 {
        match self {
            PropertyValue::Double(d) => *d,
            _ => TOMBSTONE_DOUBLE,
        }
    }

    /// The boolean inside, or `false` on mismatch.
    pub fn as_boolean(&self) -> bool {
        match self {
            PropertyValue::Boolean(b) => *b,
            _ => false,
        }
    }

    /// The nested bag inside, or the empty bag on mismatch.
    pub fn as_object(&self) -> PropertyBag {
        match self {
            PropertyValue::Object(bag) => bag.clone(),
            _ => PropertyBag::new(),
        }
    }

    /// The list inside, or the empty list on mismatch.
    pub fn as_list(&self) -> ArrayValue {
        match self {
            PropertyValue::List(list) => list.clone(),
            _ => ArrayValue::default(),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Double(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Property {
    token: u64,
    key: String,
    value: PropertyValue,
}

/// Ordered key/value list attached to one node or relationship.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyBag {
    entries: Vec<Property>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a bag from an ordered map, preserving the map's order.
    pub fn from_map(map: BTreeMap<String, PropertyValue>) -> Self {
        let mut bag = Self::new();
        for (key, value) in map {
            bag.push(key, value);
        }
        bag
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        let token = key_token(key);
        self.entries
            .iter()
            .position(|p| p.token == token && p.key == key)
    }

    fn push(&mut self, key: String, value: PropertyValue) {
        let token = key_token(&key);
        self.entries.push(Property { token, key, value });
    }

    /// Returns the value for `key` if present.
    pub fn try_get(&self, key: &str) -> Option<&PropertyValue> {
        self.position(key).map(|i| &self.entries[i].value)
    }

    /// True if `key` is set.
    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Typed getter: string value or the empty-string tombstone.
    pub fn get_string(&self, key: &str) -> String {
        self.try_get(key).map(|v| v.as_string()).unwrap_or_default()
    }

    /// Typed getter: integer value or [`TOMBSTONE_INTEGER`].
    pub fn get_integer(&self, key: &str) -> i64 {
        self.try_get(key)
            .map(|v| v.as_integer())
            .unwrap_or(TOMBSTONE_INTEGER)
    }

    /// Typed getter: double value or [`TOMBSTONE_DOUBLE`].
    pub fn get_double(&self, key: &str) -> f64 {
        self.try_get(key)
            .map(|v| v.as_double())
            .unwrap_or(TOMBSTONE_DOUBLE)
    }

    /// Typed getter: boolean value or `false`.
    pub fn get_boolean(&self, key: &str) -> bool {
        self.try_get(key).map(|v| v.as_boolean()).unwrap_or(false)
    }

    /// Typed getter: nested bag or the empty bag.
    pub fn get_object(&self, key: &str) -> PropertyBag {
        self.try_get(key).map(|v| v.as_object()).unwrap_or_default()
    }

    /// Typed getter: list or the empty list.
    pub fn get_list(&self, key: &str) -> ArrayValue {
        self.try_get(key).map(|v| v.as_list()).unwrap_or_default()
    }

    /// Sets `key` to `value`. Equivalent to delete-then-append, so a re-set
    /// key moves to the end of the iteration order.
    pub fn set(&mut self, key: &str, value: PropertyValue) {
        self.delete(key);
        self.push(key.to_string(), value);
    }

    /// Removes `key`. Returns false if it was not set.
    pub fn delete(&mut self, key: &str) -> bool {
        match self.position(key) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }

    /// Replaces the whole bag with `map`.
    pub fn replace_all(&mut self, map: BTreeMap<String, PropertyValue>) {
        self.entries.clear();
        for (key, value) in map {
            self.push(key, value);
        }
    }

    /// Overlays `map` onto the bag: existing keys keep their previous
    /// values, only unseen keys are appended.
    pub fn merge(&mut self, map: BTreeMap<String, PropertyValue>) {
        for (key, value) in map {
            if !self.contains(&key) {
                self.push(key, value);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All pairs as an ordered map.
    pub fn to_map(&self) -> BTreeMap<String, PropertyValue> {
        self.entries
            .iter()
            .map(|p| (p.key.clone(), p.value.clone()))
            .collect()
    }

    /// Pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|p| (p.key.as_str(), &p.value))
    }
}

impl Serialize for PropertyBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.key, &entry.value)?;
        }
        map.end()
    }
}
