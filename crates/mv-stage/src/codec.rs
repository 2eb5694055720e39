//! Event codec: JSON encoding that never fails the simulation
//!
//! Delivery across the bus is best effort: a value that JSON cannot carry
//! (non-finite floats, maps with non-string keys, …) degrades to its string
//! representation rather than aborting the spin that produced it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::event::GameEvent;
use crate::{StageError, StageResult};

/// Encode an event as compact JSON.
///
/// Falls back to `{"type": ..., "payload": "<debug string>"}` if the event
/// cannot be encoded as-is.
pub fn serialize_event(event: &GameEvent) -> String {
    match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Event '{}' degraded to string payload: {}", event.type_name(), e);
            serde_json::json!({
                "type": event.type_name(),
                "payload": format!("{:?}", event),
            })
            .to_string()
        }
    }
}

/// Decode an event previously produced by [`serialize_event`]
pub fn deserialize_event(json: &str) -> StageResult<GameEvent> {
    let value: Value = serde_json::from_str(json)?;
    let type_name = value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if !GameEvent::TYPE_NAMES.contains(&type_name.as_str()) {
        return Err(StageError::UnknownType(type_name));
    }

    Ok(serde_json::from_value(value)?)
}

/// Convert any serializable value into JSON, coercing failures to a string.
pub fn lossy_value<T: Serialize + std::fmt::Debug>(value: &T) -> Value {
    match serde_json::to_value(value) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("Payload coerced to string: {}", e);
            Value::String(format!("{:?}", value))
        }
    }
}

/// Serde adapter for payout numbers.
///
/// Finite values are plain JSON numbers; NaN and infinities are written as
/// strings (`"NaN"`, `"inf"`, `"-inf"`) and parsed back on decode.
pub mod lenient_f64 {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_str(&value.to_string())
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::Text(s) => s.parse::<f64>().map_err(serde::de::Error::custom),
        }
    }
}
