//! Fixture definition data model

use serde::{Deserialize, Serialize};

use super::kinds::{CapabilityColor, ChannelGroup, LampType};
use super::legacy;

/// Read-only description of a fixture model and its channel layouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureDefinition {
    /// Manufacturer name
    pub manufacturer: String,
    /// Model name
    #[serde(alias = "name")]
    pub model: String,
    /// Kind of device
    #[serde(rename = "type", default, deserialize_with = "legacy::lamp_type")]
    pub lamp_type: LampType,
    /// Every channel the fixture knows about, across all modes
    #[serde(default, deserialize_with = "legacy::null_as_default")]
    pub channels: Vec<ChannelDefinition>,
    /// Selectable channel layouts
    #[serde(deserialize_with = "legacy::null_as_default")]
    pub modes: Vec<Mode>,
    /// Physical metadata shared by all modes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical: Option<Physical>,
}

/// A channel of the fixture and what its value ranges do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "legacy::ChannelRecord")]
pub struct ChannelDefinition {
    /// Channel name, referenced by mode channel roles
    pub name: String,
    /// Functional group
    #[serde(default)]
    pub group: ChannelGroup,
    /// Byte significance: 0 for coarse, 1 for the fine half of a 16-bit pair
    #[serde(default)]
    pub byte: u8,
    /// Value ranges
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

/// A DMX value range of a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    /// Lowest value of the range
    pub min: u8,
    /// Highest value of the range
    pub max: u8,
    /// Human readable description
    #[serde(rename = "value", default)]
    pub label: String,
    /// Display colour
    #[serde(
        default,
        deserialize_with = "legacy::optional_color",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<CapabilityColor>,
    /// Gobo image or other resource
    #[serde(
        rename = "res",
        default,
        deserialize_with = "legacy::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub resource: Option<String>,
}

/// A selectable channel layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mode {
    /// Mode name, e.g. "9 Channel"
    pub name: String,
    /// Channel roles in DMX order, one slot each
    #[serde(
        default,
        alias = "channel",
        deserialize_with = "legacy::null_as_default"
    )]
    pub channels: Vec<ModeChannel>,
    /// Mode specific physical metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical: Option<Physical>,
}

impl Mode {
    /// Create a mode from role names in DMX order
    pub fn new(name: impl Into<String>, roles: &[&str]) -> Self {
        Self {
            name: name.into(),
            channels: roles
                .iter()
                .enumerate()
                .map(|(number, role)| ModeChannel {
                    number: number as u16,
                    name: role.to_string(),
                })
                .collect(),
            physical: None,
        }
    }

    /// Number of consecutive DMX slots the mode occupies
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Role name at a 0-based logical index
    pub fn role(&self, index: usize) -> Option<&str> {
        self.channels.get(index).map(|channel| channel.name.as_str())
    }

    /// 0-based logical index of the first channel with this role
    pub fn role_index(&self, role: &str) -> Option<usize> {
        self.channels
            .iter()
            .position(|channel| channel.name.eq_ignore_ascii_case(role))
    }
}

/// Position of a channel inside a mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeChannel {
    /// 0-based position as written in the definition
    #[serde(alias = "Number")]
    pub number: u16,
    /// Channel role, matching a [`ChannelDefinition::name`]
    #[serde(alias = "ChannelName")]
    pub name: String,
}

/// Physical metadata. Carried through for catalog consumers only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Physical {
    /// Light source
    #[serde(alias = "bulp")]
    pub bulb: Bulb,
    /// Size and weight
    pub dimensions: Dimensions,
    /// Lens
    pub lens: Lens,
    /// Movement range
    pub focus: Focus,
    /// Power and connectors
    pub technical: Technical,
}

/// Light source metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bulb {
    /// Colour temperature in Kelvin
    pub colour_temperature: u32,
    /// Type as written by the vendor
    #[serde(rename = "type")]
    pub kind: String,
    /// Luminous flux
    pub lumens: u32,
}

/// Size and weight metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dimensions {
    /// Width in mm
    pub width: f32,
    /// Depth in mm
    pub depth: f32,
    /// Height in mm
    pub height: f32,
    /// Weight in kg
    pub weight: f32,
}

/// Lens metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lens {
    /// Lens name
    pub name: String,
    /// Narrowest beam angle
    pub degrees_min: u32,
    /// Widest beam angle
    pub degrees_max: u32,
}

/// Movement metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Focus {
    /// Type as written by the vendor
    #[serde(rename = "type")]
    pub kind: String,
    /// Pan range in degrees
    pub pan_max: u32,
    /// Tilt range in degrees
    pub tilt_max: u32,
}

/// Electrical metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Technical {
    /// Power draw in watts
    pub power_consumption: u32,
    /// DMX connector type
    pub dmx_connector: String,
}

impl FixtureDefinition {
    /// Create a definition with the given modes and no channel metadata
    pub fn new(
        manufacturer: impl Into<String>,
        model: impl Into<String>,
        modes: Vec<Mode>,
    ) -> Self {
        Self {
            manufacturer: manufacturer.into(),
            model: model.into(),
            lamp_type: LampType::default(),
            channels: Vec::new(),
            modes,
            physical: None,
        }
    }

    /// Look up a mode by name (case-insensitive)
    pub fn mode(&self, name: &str) -> Option<&Mode> {
        self.modes
            .iter()
            .find(|mode| mode.name.eq_ignore_ascii_case(name))
    }

    /// Look up a channel definition by name
    pub fn channel(&self, name: &str) -> Option<&ChannelDefinition> {
        self.channels.iter().find(|channel| channel.name == name)
    }

    /// Generic 3 channel RGB par
    pub fn rgb_par() -> Self {
        let mut definition = Self::new(
            "Generic",
            "RGB Par",
            vec![Mode::new("3 Channel", &["Red", "Green", "Blue"])],
        );
        definition.lamp_type = LampType::ColorChanger;
        definition.channels = ["Red", "Green", "Blue"]
            .iter()
            .map(|name| ChannelDefinition {
                name: name.to_string(),
                group: ChannelGroup::Colour,
                byte: 0,
                capabilities: Vec::new(),
            })
            .collect();
        definition
    }

    /// Generic single channel dimmer
    pub fn generic_dimmer() -> Self {
        let mut definition =
            Self::new("Generic", "Dimmer", vec![Mode::new("1 Channel", &["Dimmer"])]);
        definition.lamp_type = LampType::Dimmer;
        definition.channels = vec![ChannelDefinition {
            name: "Dimmer".to_string(),
            group: ChannelGroup::Intensity,
            byte: 0,
            capabilities: vec![Capability {
                min: 0,
                max: 255,
                label: "Intensity".to_string(),
                color: None,
                resource: None,
            }],
        }];
        definition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_par() {
        let definition = FixtureDefinition::rgb_par();
        let mode = definition.mode("3 channel").unwrap();
        assert_eq!(mode.channel_count(), 3);
        assert_eq!(mode.role(1), Some("Green"));
        assert_eq!(mode.role_index("blue"), Some(2));
        assert!(definition.channel("Red").is_some());
    }

    #[test]
    fn test_unknown_mode() {
        assert!(FixtureDefinition::generic_dimmer().mode("16 bit").is_none());
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(FixtureDefinition::generic_dimmer()).unwrap();
        assert_eq!(json["type"], "Dimmer");
        assert_eq!(json["channels"][0]["group"], "Intensity");
        assert_eq!(json["channels"][0]["capabilities"][0]["value"], "Intensity");
        assert_eq!(json["modes"][0]["channels"][0]["name"], "Dimmer");
        assert!(json.get("physical").is_none());
    }

    #[test]
    fn test_minimal_json() {
        let definition: FixtureDefinition = serde_json::from_str(
            r#"{
                "manufacturer": "Eurolite",
                "model": "LED TMH-6",
                "modes": [{ "name": "9 Channel" }]
            }"#,
        )
        .unwrap();
        assert_eq!(definition.lamp_type, LampType::Other);
        assert_eq!(definition.modes[0].channel_count(), 0);
    }
}
