//! QLC+ fixture definition import
//!
//! Converts a `.qxf` document into a [`FixtureDefinition`]. Channels keep
//! their group (or, in newer files, a group derived from the channel preset)
//! and capabilities; modes keep their channel order and physical data.
//! Heads, aliases and everything else QLC+ specific are dropped.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::definition::{
    Bulb, Capability, ChannelDefinition, Dimensions, FixtureDefinition, Focus, Lens, Mode,
    ModeChannel, Physical, Technical,
};
use super::kinds::{CapabilityColor, ChannelGroup, LampType};
use crate::Result;

/// Parse a `.qxf` document
pub fn parse_qxf(xml: &str) -> Result<FixtureDefinition> {
    let document: QxfDocument = quick_xml::de::from_str(xml)?;
    Ok(document.into())
}

/// Read and convert a `.qxf` file
pub fn read_qxf(path: impl AsRef<Path>) -> Result<FixtureDefinition> {
    let content = fs::read_to_string(path)?;
    parse_qxf(&content)
}

#[derive(Debug, Deserialize)]
struct QxfDocument {
    #[serde(rename = "Manufacturer")]
    manufacturer: String,
    #[serde(rename = "Model")]
    model: String,
    #[serde(rename = "Type", default)]
    lamp_type: String,
    #[serde(rename = "Channel", default)]
    channels: Vec<QxfChannel>,
    #[serde(rename = "Mode", default)]
    modes: Vec<QxfMode>,
    #[serde(rename = "Physical", default)]
    physical: Option<QxfPhysical>,
}

#[derive(Debug, Deserialize)]
struct QxfChannel {
    #[serde(rename = "@Name")]
    name: String,
    #[serde(rename = "@Preset", default)]
    preset: Option<String>,
    #[serde(rename = "Group", default)]
    group: Option<QxfGroup>,
    #[serde(rename = "Capability", default)]
    capabilities: Vec<QxfCapability>,
}

#[derive(Debug, Deserialize)]
struct QxfGroup {
    #[serde(rename = "@Byte", default)]
    byte: u8,
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct QxfCapability {
    #[serde(rename = "@Min")]
    min: u8,
    #[serde(rename = "@Max")]
    max: u8,
    #[serde(rename = "@Color", default)]
    color: Option<String>,
    #[serde(rename = "@Res", alias = "@Res1", default)]
    resource: Option<String>,
    #[serde(rename = "$text", default)]
    label: String,
}

#[derive(Debug, Deserialize)]
struct QxfMode {
    #[serde(rename = "@Name")]
    name: String,
    #[serde(rename = "Channel", default)]
    channels: Vec<QxfModeChannel>,
    #[serde(rename = "Physical", default)]
    physical: Option<QxfPhysical>,
}

#[derive(Debug, Deserialize)]
struct QxfModeChannel {
    #[serde(rename = "@Number")]
    number: u16,
    #[serde(rename = "$text", default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QxfPhysical {
    #[serde(rename = "Bulb", alias = "Bulp")]
    bulb: QxfBulb,
    #[serde(rename = "Dimensions")]
    dimensions: QxfDimensions,
    #[serde(rename = "Lens")]
    lens: QxfLens,
    #[serde(rename = "Focus")]
    focus: QxfFocus,
    #[serde(rename = "Technical")]
    technical: QxfTechnical,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QxfBulb {
    #[serde(rename = "@ColourTemperature")]
    colour_temperature: u32,
    #[serde(rename = "@Type")]
    kind: String,
    #[serde(rename = "@Lumens")]
    lumens: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QxfDimensions {
    #[serde(rename = "@Width")]
    width: f32,
    #[serde(rename = "@Depth")]
    depth: f32,
    #[serde(rename = "@Height")]
    height: f32,
    #[serde(rename = "@Weight")]
    weight: f32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QxfLens {
    #[serde(rename = "@Name")]
    name: String,
    #[serde(rename = "@DegreesMin")]
    degrees_min: f32,
    #[serde(rename = "@DegreesMax")]
    degrees_max: f32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QxfFocus {
    #[serde(rename = "@Type")]
    kind: String,
    #[serde(rename = "@PanMax")]
    pan_max: u32,
    #[serde(rename = "@TiltMax")]
    tilt_max: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QxfTechnical {
    #[serde(rename = "@PowerConsumption")]
    power_consumption: u32,
    #[serde(rename = "@DmxConnector")]
    dmx_connector: String,
}

impl From<QxfDocument> for FixtureDefinition {
    fn from(document: QxfDocument) -> Self {
        Self {
            manufacturer: document.manufacturer.trim().to_string(),
            model: document.model.trim().to_string(),
            lamp_type: lamp_type(&document.lamp_type),
            channels: document.channels.into_iter().map(Into::into).collect(),
            modes: document.modes.into_iter().map(Into::into).collect(),
            physical: document.physical.map(Into::into),
        }
    }
}

/// "Moving Head" -> `MovingHead`; unrecognised names are kept as written
fn lamp_type(text: &str) -> LampType {
    let compact: String = text.split_whitespace().collect();
    match LampType::from(compact) {
        LampType::Unknown(_) if text.trim().is_empty() => LampType::default(),
        LampType::Unknown(_) => LampType::Unknown(text.trim().to_string()),
        known => known,
    }
}

/// Group of a preset-only channel, e.g. `PositionPanFine` -> (Pan, 1)
fn preset_group(preset: &str) -> (ChannelGroup, u8) {
    let byte = u8::from(preset.ends_with("Fine"));
    let group = if preset.starts_with("PositionPan") {
        ChannelGroup::Pan
    } else if preset.starts_with("PositionTilt") {
        ChannelGroup::Tilt
    } else if preset.starts_with("Intensity") {
        ChannelGroup::Intensity
    } else if preset.starts_with("Color") || preset.starts_with("Colour") {
        ChannelGroup::Colour
    } else if preset.starts_with("Gobo") {
        ChannelGroup::Gobo
    } else if preset.starts_with("Shutter") {
        ChannelGroup::Shutter
    } else if preset.starts_with("Speed") {
        ChannelGroup::Speed
    } else if preset.starts_with("Prism") {
        ChannelGroup::Prism
    } else if preset.starts_with("Beam") {
        ChannelGroup::Beam
    } else if preset.starts_with("Nothing") || preset.is_empty() {
        ChannelGroup::Nothing
    } else {
        ChannelGroup::Unknown(preset.to_string())
    };
    (group, byte)
}

impl From<QxfChannel> for ChannelDefinition {
    fn from(channel: QxfChannel) -> Self {
        let (group, byte) = match (channel.group, channel.preset) {
            (Some(group), _) => {
                let name = group.value.trim().to_string();
                (ChannelGroup::from(name), group.byte)
            }
            (None, Some(preset)) => preset_group(preset.trim()),
            (None, None) => (ChannelGroup::default(), 0),
        };

        Self {
            name: channel.name,
            group,
            byte,
            capabilities: channel
                .capabilities
                .into_iter()
                .map(|capability| Capability {
                    min: capability.min,
                    max: capability.max,
                    label: capability.label.trim().to_string(),
                    color: non_empty(capability.color).map(CapabilityColor::from),
                    resource: non_empty(capability.resource),
                })
                .collect(),
        }
    }
}

impl From<QxfMode> for Mode {
    fn from(mode: QxfMode) -> Self {
        let mut channels: Vec<ModeChannel> = mode
            .channels
            .into_iter()
            .map(|channel| ModeChannel {
                number: channel.number,
                name: channel.name.trim().to_string(),
            })
            .collect();
        channels.sort_by_key(|channel| channel.number);

        Self {
            name: mode.name,
            channels,
            physical: mode.physical.map(Into::into),
        }
    }
}

impl From<QxfPhysical> for Physical {
    fn from(physical: QxfPhysical) -> Self {
        Self {
            bulb: Bulb {
                colour_temperature: physical.bulb.colour_temperature,
                kind: physical.bulb.kind,
                lumens: physical.bulb.lumens,
            },
            dimensions: Dimensions {
                width: physical.dimensions.width,
                depth: physical.dimensions.depth,
                height: physical.dimensions.height,
                weight: physical.dimensions.weight,
            },
            lens: Lens {
                name: physical.lens.name,
                degrees_min: physical.lens.degrees_min.round() as u32,
                degrees_max: physical.lens.degrees_max.round() as u32,
            },
            focus: Focus {
                kind: physical.focus.kind,
                pan_max: physical.focus.pan_max,
                tilt_max: physical.focus.tilt_max,
            },
            technical: Technical {
                power_consumption: physical.technical.power_consumption,
                dmx_connector: physical.technical.dmx_connector,
            },
        }
    }
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lamp_type_names() {
        assert_eq!(lamp_type("Moving Head"), LampType::MovingHead);
        assert_eq!(lamp_type("Color Changer"), LampType::ColorChanger);
        assert_eq!(lamp_type(""), LampType::Other);
        assert_eq!(
            lamp_type("LED Bar (Beams)"),
            LampType::Unknown("LED Bar (Beams)".to_string())
        );
    }

    #[test]
    fn test_preset_groups() {
        assert_eq!(preset_group("PositionPan"), (ChannelGroup::Pan, 0));
        assert_eq!(preset_group("PositionTiltFine"), (ChannelGroup::Tilt, 1));
        assert_eq!(preset_group("IntensityRed"), (ChannelGroup::Intensity, 0));
        assert_eq!(
            preset_group("Custom"),
            (ChannelGroup::Unknown("Custom".to_string()), 0)
        );
    }

    #[test]
    fn test_minimal_document() {
        let definition = parse_qxf(
            r#"<FixtureDefinition>
                 <Manufacturer>Generic</Manufacturer>
                 <Model>Dimmer</Model>
                 <Type>Dimmer</Type>
                 <Channel Name="Dimmer" Preset="IntensityDimmer"/>
                 <Mode Name="1 Channel">
                   <Channel Number="0">Dimmer</Channel>
                 </Mode>
               </FixtureDefinition>"#,
        )
        .unwrap();

        assert_eq!(definition.lamp_type, LampType::Dimmer);
        assert_eq!(definition.channels[0].group, ChannelGroup::Intensity);
        assert!(definition.channels[0].capabilities.is_empty());
        assert_eq!(definition.mode("1 Channel").unwrap().role(0), Some("Dimmer"));
        assert!(definition.physical.is_none());
    }

    #[test]
    fn test_missing_model_is_an_error() {
        let xml = "<FixtureDefinition><Manufacturer>X</Manufacturer></FixtureDefinition>";
        let err = parse_qxf(xml).unwrap_err();
        assert!(matches!(err, crate::CoreError::Xml(_)));
    }
}
