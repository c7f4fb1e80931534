//! Localized string values
//!
//! Arches stores user-facing text as a map of language code to text. Depending on its
//! age, a package can carry that text as a plain string, a JSON-encoded object, a
//! `{lang: text}` map, or the tile-data shape `{lang: {"value": text, "direction": "ltr"}}`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Language assumed for plain, unlabelled strings
pub const DEFAULT_LANGUAGE: &str = "en";

/// Multilingual text keyed by language code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedString {
    values: BTreeMap<String, String>,
}

impl LocalizedString {
    /// Create a single-language string
    pub fn new(lang: &str, text: impl Into<String>) -> Self {
        let mut values = BTreeMap::new();
        values.insert(lang.to_string(), text.into());
        Self { values }
    }

    /// Interpret a stored JSON value as localized text.
    ///
    /// Plain strings that are not themselves JSON objects are attributed to `lang`.
    /// Returns `None` for values that carry no text at all (null, numbers, arrays).
    pub fn from_value(value: &Value, lang: &str) -> Option<Self> {
        match value {
            Value::String(text) => match serde_json::from_str::<Value>(text) {
                Ok(parsed @ Value::Object(_)) => Self::from_value(&parsed, lang),
                _ => Some(Self::new(lang, text.clone())),
            },
            Value::Object(map) => {
                let mut values = BTreeMap::new();
                for (code, entry) in map {
                    let text = match entry {
                        Value::String(text) => Some(text.clone()),
                        Value::Object(inner) => {
                            inner.get("value").and_then(Value::as_str).map(str::to_string)
                        }
                        _ => None,
                    };
                    if let Some(text) = text {
                        values.insert(code.clone(), text);
                    }
                }
                Some(Self { values })
            }
            _ => None,
        }
    }

    /// Resolve the text for `lang`.
    ///
    /// Falls back to `default_lang`, then to the first language available, then to an
    /// empty string.
    pub fn resolve(&self, lang: &str, default_lang: &str) -> &str {
        self.values
            .get(lang)
            .or_else(|| self.values.get(default_lang))
            .or_else(|| self.values.values().next())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Text in the default language
    pub fn text(&self) -> &str {
        self.resolve(DEFAULT_LANGUAGE, DEFAULT_LANGUAGE)
    }

    /// Language codes present
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<&str> for LocalizedString {
    fn from(text: &str) -> Self {
        Self::new(DEFAULT_LANGUAGE, text)
    }
}

impl std::fmt::Display for LocalizedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

impl Serialize for LocalizedString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LocalizedString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value, DEFAULT_LANGUAGE).unwrap_or_default())
    }
}
