use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Every list the user has created, in display order.
pub type Database = Vec<List>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub name: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    pub items: Vec<Item>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub name: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp::option", default)]
    pub completed_at: Option<DateTime<Utc>>, // None while incomplete
}

impl List {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: Utc::now(),
            items: Vec::new(),
        }
    }

    pub fn push_item(&mut self, name: impl Into<String>) -> &Item {
        self.items.push(Item::new(name));
        &self.items[self.items.len() - 1]
    }
}

impl Item {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Flips completion and returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.toggle_at(Utc::now())
    }

    pub fn toggle_at(&mut self, now: DateTime<Utc>) -> bool {
        self.completed_at = match self.completed_at {
            Some(_) => None,
            None => Some(now),
        };
        self.is_completed()
    }

    /// The line shown under the item name, in the local time zone.
    pub fn status_line(&self) -> String {
        let (label, at) = match self.completed_at {
            Some(done) => ("Completed", done),
            None => ("Created", self.created_at),
        };
        format!("{} at {}", label, at.with_timezone(&Local).format("%c"))
    }
}

/// The database handed out on first run, when the storage slot is empty.
pub fn default_database() -> Database {
    let mut list = List::new("List One");
    list.push_item("Item One");
    list.push_item("Item Two");
    vec![list]
}

/// Timestamps travel as RFC 3339 text with millisecond precision and a `Z`
/// suffix, the same shape `Date#toJSON` produces.
mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(de::Error::custom)
    }

    fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(raw).map(|at| at.with_timezone(&Utc))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            at: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match at {
                Some(at) => super::serialize(at, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| super::parse(&raw).map_err(de::Error::custom))
                .transpose()
        }
    }
}
