//! Three-state attribute values and the helpers that bridge them to wire values.
//!
//! Every model attribute is either present ([`AttrValue::Known`]), explicitly
//! absent ([`AttrValue::Null`]) or not yet computed ([`AttrValue::Unknown`]).
//! Wire values are plain `Option<T>`. The helpers in this module are the only
//! place where the two meet, so the empty-string rule is applied uniformly:
//! an empty wire string always becomes `Null`.
//!
//! # Example
//!
//! ```
//! use instana_provider_core::value::{model_to_wire_string, wire_to_model_string, AttrValue};
//!
//! assert_eq!(wire_to_model_string(Some("")), AttrValue::Null);
//! assert_eq!(wire_to_model_string(None::<&str>), AttrValue::Null);
//! assert_eq!(model_to_wire_string(&AttrValue::<String>::Unknown), None);
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Placeholder the host uses for values that are not known until apply.
pub const UNKNOWN_PLACEHOLDER: &str = "74D93920-ED26-11E3-AC10-0800200C9A66";

/// A model value carrying one of three states.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AttrValue<T> {
    /// A concrete value.
    Known(T),
    /// Explicitly absent.
    #[default]
    Null,
    /// Will be computed before apply.
    Unknown,
}

/// Three-state string.
pub type StringValue = AttrValue<String>;
/// Three-state 64-bit integer.
pub type Int64Value = AttrValue<i64>;
/// Three-state 64-bit float.
pub type Float64Value = AttrValue<f64>;
/// Three-state boolean.
pub type BoolValue = AttrValue<bool>;
/// Three-state list or set of strings.
pub type StringListValue = AttrValue<Vec<String>>;

impl<T> AttrValue<T> {
    /// Create a known value.
    pub fn known(value: impl Into<T>) -> Self {
        Self::Known(value.into())
    }

    /// Whether the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether the value is unknown.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Whether the value is known.
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// Borrow the known value.
    pub fn as_known(&self) -> Option<&T> {
        match self {
            Self::Known(v) => Some(v),
            _ => None,
        }
    }

    /// Take the known value.
    pub fn into_known(self) -> Option<T> {
        match self {
            Self::Known(v) => Some(v),
            _ => None,
        }
    }

    /// Map the known value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> AttrValue<U> {
        match self {
            Self::Known(v) => AttrValue::Known(f(v)),
            Self::Null => AttrValue::Null,
            Self::Unknown => AttrValue::Unknown,
        }
    }
}

impl<T: Default + Clone> AttrValue<T> {
    /// The known value, or `T::default()` for null and unknown.
    pub fn value_or_default(&self) -> T {
        self.as_known().cloned().unwrap_or_default()
    }
}

impl<T> From<Option<T>> for AttrValue<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Known(v),
            None => Self::Null,
        }
    }
}

impl From<&str> for AttrValue<String> {
    fn from(value: &str) -> Self {
        Self::Known(value.to_string())
    }
}

impl<T: Serialize> Serialize for AttrValue<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Known(v) => v.serialize(serializer),
            Self::Null => serializer.serialize_none(),
            Self::Unknown => serializer.serialize_str(UNKNOWN_PLACEHOLDER),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for AttrValue<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        match raw {
            serde_json::Value::Null => Ok(Self::Null),
            serde_json::Value::String(ref s) if s == UNKNOWN_PLACEHOLDER => Ok(Self::Unknown),
            other => serde_json::from_value(other)
                .map(Self::Known)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Deserialize a nested block list, reading `null` as no elements.
///
/// Use with `#[serde(deserialize_with = "...")]` on `Vec` fields of models.
pub fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// =========================================================================
// Wire <-> model
// =========================================================================

/// Convert a nullable wire string into a model value; empty strings become null.
pub fn wire_to_model_string<S: AsRef<str>>(value: Option<S>) -> StringValue {
    match value {
        Some(s) if !s.as_ref().is_empty() => AttrValue::Known(s.as_ref().to_string()),
        _ => AttrValue::Null,
    }
}

/// Convert a model string into a nullable wire string; null and unknown become absent.
pub fn model_to_wire_string(value: &StringValue) -> Option<String> {
    value.as_known().cloned()
}

/// Convert a model string into a wire string, treating null and unknown as empty.
pub fn model_to_wire_string_or_empty(value: &StringValue) -> String {
    value.value_or_default()
}

/// Convert a nullable wire integer into a model value.
pub fn wire_to_model_int64(value: Option<i64>) -> Int64Value {
    value.into()
}

/// Convert a model integer into a nullable wire integer.
pub fn model_to_wire_int64(value: &Int64Value) -> Option<i64> {
    value.as_known().copied()
}

/// Convert a nullable wire float into a model value.
pub fn wire_to_model_float64(value: Option<f64>) -> Float64Value {
    value.into()
}

/// Convert a model float into a nullable wire float.
pub fn model_to_wire_float64(value: &Float64Value) -> Option<f64> {
    value.as_known().copied()
}

/// Convert a nullable wire boolean into a model value.
pub fn wire_to_model_bool(value: Option<bool>) -> BoolValue {
    value.into()
}

/// Convert a model boolean into a nullable wire boolean.
pub fn model_to_wire_bool(value: &BoolValue) -> Option<bool> {
    value.as_known().copied()
}

/// Convert a wire string list into a model list; an empty list becomes null.
pub fn wire_to_model_string_list(values: &[String]) -> StringListValue {
    if values.is_empty() {
        AttrValue::Null
    } else {
        AttrValue::Known(values.to_vec())
    }
}

/// Convert a model string list into a wire list; null and unknown become empty.
pub fn model_to_wire_string_list(values: &StringListValue) -> Vec<String> {
    values.value_or_default()
}

// =========================================================================
// JSON
// =========================================================================

/// Re-emit a JSON document with sorted object keys and no incidental whitespace.
///
/// Returns the input unchanged when it is not valid JSON.
pub fn canonicalize_json(text: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|_| text.to_string()),
        Err(err) => {
            tracing::debug!(error = %err, "Leaving invalid JSON unchanged");
            text.to_string()
        },
    }
}

/// Alias of [`canonicalize_json`] used for JSON blob attributes.
pub fn normalize_json(text: &str) -> String {
    canonicalize_json(text)
}

// =========================================================================
// Identifiers
// =========================================================================

const BASE32_HEX: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";

fn process_bytes() -> &'static [u8; 5] {
    static PROCESS: OnceLock<[u8; 5]> = OnceLock::new();
    PROCESS.get_or_init(|| rand::thread_rng().gen())
}

fn counter() -> &'static AtomicU32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    COUNTER.get_or_init(|| AtomicU32::new(rand::thread_rng().gen_range(0..0x00ff_ffff)))
}

/// Generate a 20-character identifier that sorts by creation time.
///
/// Layout: 4-byte big-endian Unix seconds, 5 per-process random bytes, and a
/// 3-byte counter, encoded as lowercase base32hex.
pub fn random_id() -> String {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or_default();
    let count = counter().fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;

    let mut raw = [0u8; 12];
    raw[..4].copy_from_slice(&seconds.to_be_bytes());
    raw[4..9].copy_from_slice(process_bytes());
    raw[9..].copy_from_slice(&count.to_be_bytes()[1..]);

    encode_base32_hex(&raw)
}

/// Generate an identifier of the form `prefix` + [`random_id`].
pub fn generate_id(prefix: &str) -> String {
    format!("{}{}", prefix, random_id())
}

fn encode_base32_hex(raw: &[u8; 12]) -> String {
    let mut out = String::with_capacity(20);
    let mut buffer: u32 = 0;
    let mut bits = 0;
    for byte in raw {
        buffer = (buffer << 8) | u32::from(*byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_HEX[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(BASE32_HEX[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}
