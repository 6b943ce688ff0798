//! Samples: ordered attribute maps.

use ps_common::value::AttrValue;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One observed data point: an ordered mapping from attribute key to raw
/// value.
///
/// Insertion order is preserved for display; it is irrelevant to the
/// summary computation. Samples have no identity beyond their position in
/// a space, so duplicate-valued samples are distinct observations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    attrs: Vec<(String, AttrValue)>,
}

impl Sample {
    /// Create an empty sample.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an attribute, keeping the original position on
    /// replacement.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.attrs.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.attrs.push((key, value));
        }
    }

    /// Remove an attribute, returning its value if present.
    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        let idx = self.attrs.iter().position(|(k, _)| k == key)?;
        Some(self.attrs.remove(idx).1)
    }

    /// Replace all attributes wholesale.
    pub fn set_attributes(&mut self, attrs: impl IntoIterator<Item = (String, AttrValue)>) {
        self.attrs = attrs.into_iter().collect();
    }

    /// Look up an attribute by key.
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Raw equality probe: does `key` hold exactly `value`?
    ///
    /// This compares raw values without normalization; use a filter for
    /// coercing comparisons.
    pub fn attribute_equals(&self, key: &str, value: &AttrValue) -> bool {
        self.get(key) == Some(value)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Attribute keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attrs.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

impl FromIterator<(String, AttrValue)> for Sample {
    fn from_iter<I: IntoIterator<Item = (String, AttrValue)>>(iter: I) -> Self {
        let mut sample = Sample::new();
        for (key, value) in iter {
            sample.insert(key, value);
        }
        sample
    }
}

// Samples serialize as plain JSON objects, preserving insertion order.
impl Serialize for Sample {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.attrs.len()))?;
        for (key, value) in &self.attrs {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Sample {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SampleVisitor;

        impl<'de> Visitor<'de> for SampleVisitor {
            type Value = Sample;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of attribute keys to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Sample, A::Error> {
                let mut sample = Sample::new();
                while let Some((key, value)) = access.next_entry::<String, AttrValue>()? {
                    sample.insert(key, value);
                }
                Ok(sample)
            }
        }

        deserializer.deserialize_map(SampleVisitor)
    }
}
