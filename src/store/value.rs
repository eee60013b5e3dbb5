//! Firestore's typed value encoding.
//!
//! The REST API wraps every field in a one-key object naming its type:
//! `{"stringValue": "Widget"}`, `{"doubleValue": 9.99}`,
//! `{"integerValue": "3"}`. Documents cross the store boundary as plain JSON
//! maps, so values are converted on the way in and out.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number};

use super::Document;

/// One typed Firestore value. Externally tagged, which is exactly the wire
/// shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum Value {
    NullValue(()),
    BooleanValue(bool),
    IntegerValue(String), // int64 travels as a decimal string
    DoubleValue(#[serde(deserialize_with = "double")] f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String), // base64
    ReferenceValue(String),
    GeoPointValue(LatLng),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct LatLng {
    #[serde(default)]
    latitude: f64,
    #[serde(default)]
    longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct ArrayValue {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct MapValue {
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    fields: Map<String, serde_json::Value>,
}

pub(crate) type Fields = Map<String, serde_json::Value>;

/// proto3 JSON spells non-finite doubles as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireDouble {
    Number(f64),
    Named(String),
}

fn double<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match WireDouble::deserialize(deserializer)? {
        WireDouble::Number(f) => Ok(f),
        WireDouble::Named(name) => match name.as_str() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            _ => Err(serde::de::Error::custom(format!("invalid doubleValue `{name}`"))),
        },
    }
}

/// Encodes a plain document into Firestore `fields`.
pub(crate) fn encode_fields(document: Document) -> Fields {
    document
        .into_iter()
        .map(|(name, value)| (name, to_wire(encode(value))))
        .collect()
}

/// Decodes Firestore `fields` into a plain document.
pub(crate) fn decode_fields(fields: Fields) -> Result<Document, String> {
    fields
        .into_iter()
        .map(|(name, raw)| {
            let value = serde_json::from_value::<Value>(raw)
                .map_err(|e| format!("field `{name}`: {e}"))?;
            Ok((name, decode(value)?))
        })
        .collect()
}

fn encode(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::NullValue(()),
        serde_json::Value::Bool(b) => Value::BooleanValue(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::IntegerValue(i.to_string()),
            // u64 beyond i64::MAX and every float
            None => Value::DoubleValue(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::StringValue(s),
        serde_json::Value::Array(items) => Value::ArrayValue(ArrayValue {
            values: items.into_iter().map(encode).collect(),
        }),
        serde_json::Value::Object(map) => Value::MapValue(MapValue { fields: encode_fields(map) }),
    }
}

fn decode(value: Value) -> Result<serde_json::Value, String> {
    Ok(match value {
        Value::NullValue(()) => serde_json::Value::Null,
        Value::BooleanValue(b) => serde_json::Value::Bool(b),
        Value::IntegerValue(s) => {
            let i: i64 = s.parse().map_err(|_| format!("invalid integerValue `{s}`"))?;
            serde_json::Value::Number(i.into())
        }
        // NaN and infinities have no JSON representation
        Value::DoubleValue(f) => Number::from_f64(f).map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::TimestampValue(s)
        | Value::StringValue(s)
        | Value::BytesValue(s)
        | Value::ReferenceValue(s) => serde_json::Value::String(s),
        Value::GeoPointValue(LatLng { latitude, longitude }) => serde_json::json!({
            "latitude": latitude,
            "longitude": longitude,
        }),
        Value::ArrayValue(array) => serde_json::Value::Array(
            array.values.into_iter().map(decode).collect::<Result<_, _>>()?,
        ),
        Value::MapValue(map) => serde_json::Value::Object(decode_fields(map.fields)?),
    })
}

fn to_wire(value: Value) -> serde_json::Value {
    // Never fails: no payload has non-string map keys or a fallible Serialize.
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}
