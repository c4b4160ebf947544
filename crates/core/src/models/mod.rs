//! Records exchanged with the REST API.
//!
//! The API speaks camelCase JSON with document-style `_id` keys and may either
//! reference related documents by id or embed them ("populated"). Both shapes
//! deserialize into the same id-typed fields here.

pub mod category;
pub mod product;
pub mod store;
pub mod user;

pub use category::{Category, CategoryInput};
pub use product::{Product, ProductInput};
pub use store::{Day, DayHours, Store, StoreInput, StoreStatus};
pub use user::{AuthResponse, User};

use serde::{Deserialize, Deserializer};

/// A reference that is either a bare id or an embedded document with an id.
#[derive(Deserialize)]
#[serde(untagged)]
enum Reference<T> {
    Id(T),
    Document {
        #[serde(rename = "_id", alias = "id")]
        id: T,
    },
}

impl<T> Reference<T> {
    fn into_id(self) -> T {
        match self {
            Self::Id(id) | Self::Document { id } => id,
        }
    }
}

/// Deserialize a required reference field.
pub(crate) fn reference<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Reference::<T>::deserialize(deserializer).map(Reference::into_id)
}

/// Deserialize an optional (nullable) reference field.
pub(crate) fn optional_reference<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Reference<T>>::deserialize(deserializer).map(|r| r.map(Reference::into_id))
}

/// `HH:MM` wall-clock times, as used by store opening hours.
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(D::Error::custom)
    }

    /// Parse `HH:MM`, tolerating a trailing `:SS`.
    pub fn parse(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(raw.trim(), FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S"))
    }

    pub mod option {
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

        #[allow(clippy::ref_option)]
        pub fn serialize<S: Serializer>(
            time: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(t) => super::serialize(t, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) if !raw.trim().is_empty() => {
                    super::parse(&raw).map(Some).map_err(D::Error::custom)
                }
                _ => Ok(None),
            }
        }
    }
}
