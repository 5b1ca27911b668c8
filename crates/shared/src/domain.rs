use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! text_id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

// Opaque to the client: whatever the room control holds is forwarded as-is.
text_id_newtype!(RoomId);

/// Identifier of one piece of equipment as the server sends it.
///
/// The reservation server emits integer primary keys, but the option value is
/// only ever used as text, so string ids are accepted too. Anything else
/// (floats, booleans, `null`, objects) fails to decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PcId {
    Int(i64),
    // Only reached for integers above `i64::MAX`.
    UInt(u64),
    Text(String),
}

impl fmt::Display for PcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::UInt(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for PcId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pc_id_accepts_integers_and_strings() {
        let ids: Vec<PcId> = serde_json::from_str(r#"[7, "lab-3"]"#).expect("decode");
        assert_eq!(ids, vec![PcId::Int(7), PcId::Text("lab-3".into())]);
        assert_eq!(ids[0].to_string(), "7");
        assert_eq!(ids[1].to_string(), "lab-3");
    }

    #[test]
    fn pc_id_keeps_integers_beyond_i64() {
        let id: PcId = serde_json::from_str("18446744073709551615").expect("decode");
        assert_eq!(id, PcId::UInt(u64::MAX));
        assert_eq!(id.to_string(), "18446744073709551615");

        let id: PcId = serde_json::from_str("-3").expect("decode");
        assert_eq!(id, PcId::Int(-3));
    }

    #[test]
    fn pc_id_rejects_null_and_floats() {
        assert!(serde_json::from_str::<PcId>("null").is_err());
        assert!(serde_json::from_str::<PcId>("1.5").is_err());
        assert!(serde_json::from_str::<PcId>("true").is_err());
    }

    #[test]
    fn room_id_is_transparent_on_the_wire() {
        let room = RoomId::from("12");
        assert_eq!(serde_json::to_string(&room).expect("encode"), r#""12""#);
        assert_eq!(room.to_string(), "12");
    }
}
