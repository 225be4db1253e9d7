use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::constants::{GatewayOpcode, PUBSUB_OPCODE};

/// Envelope opcode: a numeric opcode or the pub/sub sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Code(u16),
    PubSub,
}

impl Op {
    #[must_use]
    pub const fn is_pubsub(self) -> bool {
        matches!(self, Self::PubSub)
    }

    /// Known opcode for numeric values.
    #[must_use]
    pub fn opcode(self) -> Option<GatewayOpcode> {
        match self {
            Self::Code(value) => GatewayOpcode::from_u16(value),
            Self::PubSub => None,
        }
    }
}

impl From<GatewayOpcode> for Op {
    fn from(opcode: GatewayOpcode) -> Self {
        Self::Code(opcode.as_u16())
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(value) => write!(f, "{value}"),
            Self::PubSub => f.write_str(PUBSUB_OPCODE),
        }
    }
}

impl Serialize for Op {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Code(value) => serializer.serialize_u16(*value),
            Self::PubSub => serializer.serialize_str(PUBSUB_OPCODE),
        }
    }
}

impl<'de> Deserialize<'de> for Op {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OpVisitor;

        impl Visitor<'_> for OpVisitor {
            type Value = Op;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "an integer opcode or \"{PUBSUB_OPCODE}\"")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Op, E> {
                u16::try_from(value)
                    .map(Op::Code)
                    .map_err(|_| E::custom(format!("opcode {value} out of range")))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Op, E> {
                u16::try_from(value)
                    .map(Op::Code)
                    .map_err(|_| E::custom(format!("opcode {value} out of range")))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Op, E> {
                if value == PUBSUB_OPCODE {
                    Ok(Op::PubSub)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(value), &self))
                }
            }
        }

        deserializer.deserialize_any(OpVisitor)
    }
}

/// One wire message: `{op, d, t?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub op: Op,
    #[serde(default)]
    pub d: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl Envelope {
    #[must_use]
    pub fn new(op: impl Into<Op>, d: Value) -> Self {
        Self {
            op: op.into(),
            d,
            t: None,
        }
    }

    /// Dispatch-style envelope carrying an event type.
    #[must_use]
    pub fn dispatch(event_type: impl Into<String>, d: Value) -> Self {
        Self {
            op: Op::from(GatewayOpcode::Dispatch),
            d,
            t: Some(event_type.into()),
        }
    }

    /// Pub/sub envelope; `d` must carry `event_type`.
    #[must_use]
    pub fn pubsub(d: Value) -> Self {
        Self {
            op: Op::PubSub,
            d,
            t: None,
        }
    }

    /// Keep-alive with a millisecond timestamp payload.
    #[must_use]
    pub fn heartbeat(timestamp_ms: i64) -> Self {
        Self::new(GatewayOpcode::Heartbeat, Value::from(timestamp_ms))
    }
}

/// Registry lookup key: numeric opcodes and names live in one domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DispatchKey {
    Opcode(u16),
    Named(String),
}

impl DispatchKey {
    /// Numeric strings normalize to opcodes, so `"40"` and `40` match.
    #[must_use]
    pub fn named(name: &str) -> Self {
        name.parse::<u16>()
            .map_or_else(|_| Self::Named(name.to_string()), Self::Opcode)
    }
}

impl From<&str> for DispatchKey {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<String> for DispatchKey {
    fn from(name: String) -> Self {
        Self::named(&name)
    }
}

impl From<u16> for DispatchKey {
    fn from(value: u16) -> Self {
        Self::Opcode(value)
    }
}

impl From<GatewayOpcode> for DispatchKey {
    fn from(opcode: GatewayOpcode) -> Self {
        Self::Opcode(opcode.as_u16())
    }
}

impl fmt::Display for DispatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opcode(value) => write!(f, "{value}"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_parses_numeric_op() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"op":0,"d":{"x":1},"t":"message_create"}"#).unwrap();
        assert_eq!(envelope.op, Op::Code(0));
        assert_eq!(envelope.op.opcode(), Some(GatewayOpcode::Dispatch));
        assert_eq!(envelope.t.as_deref(), Some("message_create"));
        assert_eq!(envelope.d, json!({"x": 1}));
    }

    #[test]
    fn test_envelope_parses_pubsub_sentinel() {
        let envelope: Envelope = serde_json::from_str(
            r#"{"op":"pubsub_event","d":{"event_type":"friend_request_received","data":{}}}"#,
        )
        .unwrap();
        assert!(envelope.op.is_pubsub());
        assert!(envelope.t.is_none());
    }

    #[test]
    fn test_envelope_rejects_unknown_string_op() {
        let result = serde_json::from_str::<Envelope>(r#"{"op":"bogus","d":null}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_envelope_rejects_missing_op() {
        assert!(serde_json::from_str::<Envelope>(r#"{"d":{}}"#).is_err());
    }

    #[test]
    fn test_missing_payload_defaults_to_null() {
        let envelope: Envelope = serde_json::from_str(r#"{"op":11}"#).unwrap();
        assert_eq!(envelope.d, Value::Null);
    }

    #[test]
    fn test_heartbeat_serialization() {
        let json = serde_json::to_string(&Envelope::heartbeat(1_700_000_000_000)).unwrap();
        assert_eq!(json, r#"{"op":1,"d":1700000000000}"#);
    }

    #[test]
    fn test_pubsub_serialization() {
        let envelope = Envelope::pubsub(json!({"event_type": "message_create"}));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["op"], json!("pubsub_event"));
    }

    #[test]
    fn test_sentinel_never_equals_numeric_key() {
        let sentinel = DispatchKey::from(PUBSUB_OPCODE);
        for opcode in GatewayOpcode::ALL {
            assert_ne!(sentinel, DispatchKey::from(opcode));
        }
    }

    #[test]
    fn test_numeric_strings_normalize_to_opcodes() {
        assert_eq!(DispatchKey::from("40"), DispatchKey::Opcode(40));
        assert_eq!(
            DispatchKey::from("message_create"),
            DispatchKey::Named("message_create".to_string())
        );
        assert_eq!(DispatchKey::from(40_u16).to_string(), "40");
    }
}
