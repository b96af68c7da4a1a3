use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Stores are free to hand out numeric or textual ids; both decode to the
/// same opaque string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(value: RawId) -> Self {
        match value {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

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

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into()))
            }
        }
    };
}

id_newtype!(BoardId);
id_newtype!(ColumnId);
id_newtype!(CardId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    pub board_id: BoardId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub title: String,
    pub description: String,
    pub column_id: ColumnId,
    pub board_id: BoardId,
}

impl Card {
    /// The card without its id, as sent on `PUT /cards/{id}`.
    pub fn to_payload(&self) -> crate::protocol::NewCard {
        crate::protocol::NewCard {
            title: self.title.clone(),
            description: self.description.clone(),
            column_id: self.column_id.clone(),
            board_id: self.board_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_decode_as_strings() {
        let column: Column =
            serde_json::from_str(r#"{"id":7,"title":"Doing","boardId":"3"}"#).expect("column");
        assert_eq!(column.id, ColumnId::new("7"));
        assert_eq!(column.board_id.as_str(), "3");
    }

    #[test]
    fn records_use_camel_case_keys() {
        let card = Card {
            id: CardId::new("c1"),
            title: "Fix bug".into(),
            description: "NPE on save".into(),
            column_id: ColumnId::new("col"),
            board_id: BoardId::new("b"),
        };
        let value = serde_json::to_value(&card).expect("json");
        assert_eq!(value["columnId"], "col");
        assert_eq!(value["boardId"], "b");
        assert_eq!(value["id"], "c1");
    }
}
