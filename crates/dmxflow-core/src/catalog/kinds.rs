//! Categorical fields of fixture definitions
//!
//! Definition files carry these as free text. Parsing maps every known
//! spelling onto a variant and keeps anything else in `Unknown`, so a
//! definition written by a newer tool still loads and writes back unchanged.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// Text not recognised by this version
            Unknown(String),
        }

        impl $name {
            /// Canonical text of this value
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $text,)+
                    Self::Unknown(text) => text,
                }
            }
        }

        impl FromStr for $name {
            type Err = Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(match s.trim() {
                    $($text => Self::$variant,)+
                    other => Self::Unknown(other.to_string()),
                })
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.parse() {
                    Ok(parsed) => parsed,
                    Err(never) => match never {},
                }
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum! {
    /// Kind of lighting device
    pub enum LampType {
        /// Colour changing wash or par
        ColorChanger => "ColorChanger",
        /// Plain dimmer channel
        Dimmer => "Dimmer",
        /// Effect light
        Effect => "Effect",
        /// Flower effect
        Flower => "Flower",
        /// Haze machine
        Hazer => "Hazer",
        /// Laser projector
        Laser => "Laser",
        /// Moving head
        MovingHead => "MovingHead",
        /// Anything else
        Other => "Other",
        /// Mirror scanner
        Scanner => "Scanner",
        /// Smoke machine
        Smoke => "Smoke",
        /// Strobe
        Strobe => "Strobe",
    }
}

impl Default for LampType {
    fn default() -> Self {
        Self::Other
    }
}

impl LampType {
    /// Type at `index` in the order above, as older files store it
    pub fn from_index(index: u64) -> Self {
        match index {
            0 => Self::ColorChanger,
            1 => Self::Dimmer,
            2 => Self::Effect,
            3 => Self::Flower,
            4 => Self::Hazer,
            5 => Self::Laser,
            6 => Self::MovingHead,
            7 => Self::Other,
            8 => Self::Scanner,
            9 => Self::Smoke,
            10 => Self::Strobe,
            other => Self::Unknown(other.to_string()),
        }
    }
}

text_enum! {
    /// Functional group of a channel
    pub enum ChannelGroup {
        /// Dimmer / intensity
        Intensity => "Intensity",
        /// Colour mixing or wheel
        Colour => "Colour",
        /// Gobo wheel
        Gobo => "Gobo",
        /// Prism
        Prism => "Prism",
        /// Shutter / strobe
        Shutter => "Shutter",
        /// Beam shaping (zoom, focus, iris)
        Beam => "Beam",
        /// Movement or effect speed
        Speed => "Speed",
        /// Built-in effects and macros
        Effect => "Effect",
        /// Pan movement
        Pan => "Pan",
        /// Tilt movement
        Tilt => "Tilt",
        /// Reset, lamp control and similar
        Maintenance => "Maintenance",
        /// Unused channel
        Nothing => "Nothing",
    }
}

impl Default for ChannelGroup {
    fn default() -> Self {
        Self::Nothing
    }
}

/// Display colour of a capability range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CapabilityColor {
    /// `#rrggbb` colour
    Rgb(u8, u8, u8),
    /// Text not recognised as a colour
    Unknown(String),
}

impl FromStr for CapabilityColor {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let parsed = text
            .strip_prefix('#')
            .filter(|hex| hex.len() == 6 && hex.is_ascii())
            .and_then(|hex| {
                let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16);
                Some(Self::Rgb(
                    channel(0..2).ok()?,
                    channel(2..4).ok()?,
                    channel(4..6).ok()?,
                ))
            });
        Ok(parsed.unwrap_or_else(|| Self::Unknown(text.to_string())))
    }
}

impl From<String> for CapabilityColor {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(parsed) => parsed,
            Err(never) => match never {},
        }
    }
}

impl From<CapabilityColor> for String {
    fn from(value: CapabilityColor) -> Self {
        value.to_string()
    }
}

impl fmt::Display for CapabilityColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rgb(r, g, b) => write!(f, "#{:02x}{:02x}{:02x}", r, g, b),
            Self::Unknown(text) => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lamp_type_parse() {
        assert_eq!("MovingHead".parse::<LampType>().unwrap(), LampType::MovingHead);
        assert_eq!(
            "Fogger".parse::<LampType>().unwrap(),
            LampType::Unknown("Fogger".to_string())
        );
    }

    #[test]
    fn test_lamp_type_json_round_trip() {
        let json = serde_json::to_string(&LampType::Scanner).unwrap();
        assert_eq!(json, r#""Scanner""#);

        let unknown: LampType = serde_json::from_str(r#""Fogger""#).unwrap();
        assert_eq!(serde_json::to_string(&unknown).unwrap(), r#""Fogger""#);
    }

    #[test]
    fn test_lamp_type_from_index() {
        assert_eq!(LampType::from_index(0), LampType::ColorChanger);
        assert_eq!(LampType::from_index(6), LampType::MovingHead);
        assert_eq!(LampType::from_index(10), LampType::Strobe);
        assert_eq!(LampType::from_index(11), LampType::Unknown("11".to_string()));
    }

    #[test]
    fn test_channel_group() {
        assert_eq!("Colour".parse::<ChannelGroup>().unwrap(), ChannelGroup::Colour);
        assert_eq!(ChannelGroup::Pan.to_string(), "Pan");
        assert_eq!(ChannelGroup::default(), ChannelGroup::Nothing);
    }

    #[test]
    fn test_capability_color() {
        assert_eq!(
            "#ff8000".parse::<CapabilityColor>().unwrap(),
            CapabilityColor::Rgb(255, 128, 0)
        );
        assert_eq!(CapabilityColor::Rgb(255, 128, 0).to_string(), "#ff8000");
        assert_eq!(
            "#zz0000".parse::<CapabilityColor>().unwrap(),
            CapabilityColor::Unknown("#zz0000".to_string())
        );
        assert_eq!(
            "red".parse::<CapabilityColor>().unwrap(),
            CapabilityColor::Unknown("red".to_string())
        );
    }
}
