//! Deserializers accepting the older definition layout
//!
//! Older catalog files store the lamp type as an integer, the channel group
//! as a `{ "value", "byte" }` object with the byte as text, mode channels
//! under `"channel"` as `{ "Number", "ChannelName" }`, empty strings for
//! unset colours and `null` for empty lists. Everything is written back in
//! the current layout.

use serde::{Deserialize, Deserializer};

use super::definition::{Capability, ChannelDefinition};
use super::kinds::{CapabilityColor, ChannelGroup, LampType};

/// `null` reads as the type's default
pub(super) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Lamp type given as its name or as its position in the type list
pub(super) fn lamp_type<'de, D>(deserializer: D) -> Result<LampType, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Index(u64),
        Text(String),
    }

    Ok(match Option::<Repr>::deserialize(deserializer)? {
        Some(Repr::Index(index)) => LampType::from_index(index),
        Some(Repr::Text(text)) => LampType::from(text),
        None => LampType::default(),
    })
}

/// Missing, `null` and empty colours are unset
pub(super) fn optional_color<'de, D>(
    deserializer: D,
) -> Result<Option<CapabilityColor>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text(deserializer)?.map(CapabilityColor::from))
}

/// Missing, `null` and empty strings are unset
pub(super) fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|text| !text.trim().is_empty()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ByteField {
    Number(u8),
    Text(String),
}

impl ByteField {
    fn value(self) -> u8 {
        match self {
            Self::Number(byte) => byte,
            Self::Text(text) => text.trim().parse().unwrap_or(0),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GroupField {
    Name(ChannelGroup),
    Tagged {
        value: ChannelGroup,
        #[serde(default)]
        byte: Option<ByteField>,
    },
}

/// On-disk form of a channel in either layout
#[derive(Deserialize)]
pub struct ChannelRecord {
    name: String,
    #[serde(default)]
    group: Option<GroupField>,
    #[serde(default)]
    byte: Option<ByteField>,
    #[serde(default, deserialize_with = "null_as_default")]
    capabilities: Vec<Capability>,
}

impl From<ChannelRecord> for ChannelDefinition {
    fn from(record: ChannelRecord) -> Self {
        let (group, group_byte) = match record.group {
            Some(GroupField::Name(group)) => (group, None),
            Some(GroupField::Tagged { value, byte }) => (value, byte),
            None => (ChannelGroup::default(), None),
        };

        Self {
            name: record.name,
            group,
            byte: record.byte.or(group_byte).map_or(0, ByteField::value),
            capabilities: record.capabilities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(json: &str) -> ChannelDefinition {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_group_forms() {
        let current = channel(r#"{ "name": "Tilt", "group": "Tilt", "byte": 1 }"#);
        assert_eq!((current.group, current.byte), (ChannelGroup::Tilt, 1));

        let tagged = channel(r#"{ "name": "Tilt", "group": { "value": "Tilt", "byte": "1" } }"#);
        assert_eq!((tagged.group, tagged.byte), (ChannelGroup::Tilt, 1));

        let bare = channel(r#"{ "name": "Spare" }"#);
        assert_eq!((bare.group, bare.byte), (ChannelGroup::Nothing, 0));
    }

    #[test]
    fn test_unparseable_byte_text_is_coarse() {
        let tagged = channel(r#"{ "name": "Pan", "group": { "value": "Pan", "byte": "" } }"#);
        assert_eq!(tagged.byte, 0);
    }
}
