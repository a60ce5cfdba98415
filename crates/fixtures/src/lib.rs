use std::fmt;

use serde::{Deserialize, Serialize};

pub use library::FixtureLibrary;
pub use patch::{has_manual_group, venue_patch, FixtureGroup, PatchEntry, Venue};

mod library;
mod patch;

/// A patched lighting fixture: one profile instance at a DMX address.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Fixture {
    pub id: usize,
    pub name: String,
    pub profile: FixtureProfile,
    pub channels: Vec<Channel>,
    pub universe: u8,
    pub start_address: u16,
}

/// Coarse fixture category, used to cluster loose fixtures into groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FixtureKind {
    Par,
    MovingHead,
    MotionStrip,
    Laser,
    Rotosphere,
    Derby,
    Pinspot,
}

impl FixtureKind {
    pub const ALL: [FixtureKind; 7] = [
        FixtureKind::Par,
        FixtureKind::MovingHead,
        FixtureKind::MotionStrip,
        FixtureKind::Laser,
        FixtureKind::Rotosphere,
        FixtureKind::Derby,
        FixtureKind::Pinspot,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            FixtureKind::Par => "par",
            FixtureKind::MovingHead => "moving head",
            FixtureKind::MotionStrip => "motion strip",
            FixtureKind::Laser => "laser",
            FixtureKind::Rotosphere => "rotosphere",
            FixtureKind::Derby => "derby",
            FixtureKind::Pinspot => "pinspot",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FixtureProfile {
    pub kind: FixtureKind,
    pub manufacturer: String,
    pub model: String,
    pub channel_layout: Vec<Channel>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub channel_type: ChannelType,
    pub value: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelType {
    Dimmer,
    Red,
    Green,
    Blue,
    White,
    Strobe,
    Pan,
    Tilt,
    Speed,
    Other(String),
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChannelType::Dimmer => write!(f, "Dimmer"),
            ChannelType::Red => write!(f, "Red"),
            ChannelType::Green => write!(f, "Green"),
            ChannelType::Blue => write!(f, "Blue"),
            ChannelType::White => write!(f, "White"),
            ChannelType::Strobe => write!(f, "Strobe"),
            ChannelType::Pan => write!(f, "Pan"),
            ChannelType::Tilt => write!(f, "Tilt"),
            ChannelType::Speed => write!(f, "Speed"),
            ChannelType::Other(s) => write!(f, "Other({})", s),
        }
    }
}

impl Fixture {
    pub fn new(id: usize, name: &str, profile: FixtureProfile, universe: u8, start_address: u16) -> Self {
        let channels = profile.channel_layout.clone();
        Fixture {
            id,
            name: name.to_string(),
            profile,
            channels,
            universe,
            start_address,
        }
    }

    pub fn kind(&self) -> FixtureKind {
        self.profile.kind
    }

    /// Clear transient accumulators ahead of an interpreter pass. Dimmer and
    /// strobe values combine via max() within a tick; positional and color
    /// channels latch their last value.
    pub fn begin(&mut self) {
        for channel in &mut self.channels {
            if matches!(channel.channel_type, ChannelType::Dimmer | ChannelType::Strobe) {
                channel.value = 0;
            }
        }
    }

    /// Overwrite a channel value.
    pub fn set_channel(&mut self, channel_type: &ChannelType, value: u8) {
        for channel in &mut self.channels {
            if &channel.channel_type == channel_type {
                channel.value = value;
            }
        }
    }

    /// Combine a channel value with whatever another interpreter already
    /// wrote this tick, keeping the stronger of the two.
    pub fn blend_channel(&mut self, channel_type: &ChannelType, value: u8) {
        for channel in &mut self.channels {
            if &channel.channel_type == channel_type {
                channel.value = channel.value.max(value);
            }
        }
    }

    pub fn channel_value(&self, channel_type: &ChannelType) -> Option<u8> {
        self.channels
            .iter()
            .find(|c| &c.channel_type == channel_type)
            .map(|c| c.value)
    }

    pub fn dmx_values(&self) -> Vec<u8> {
        self.channels.iter().map(|c| c.value).collect()
    }
}

impl fmt::Display for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} @ {}", self.profile.model, self.start_address)
    }
}

#[macro_export]
macro_rules! channel_layout {
    ($(($name:expr, $type:expr)),* $(,)?) => {
        vec![
            $(
                $crate::Channel {
                    name: $name.to_string(),
                    channel_type: $type,
                    value: 0,
                },
            )*
        ]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn par_fixture() -> Fixture {
        let library = FixtureLibrary::new();
        let profile = library.profiles.get("rgbw-par").unwrap().clone();
        Fixture::new(0, "Test PAR", profile, 1, 1)
    }

    #[test]
    fn test_begin_clears_accumulators_only() {
        let mut fixture = par_fixture();
        fixture.set_channel(&ChannelType::Dimmer, 200);
        fixture.set_channel(&ChannelType::Strobe, 120);
        fixture.set_channel(&ChannelType::Red, 90);

        fixture.begin();

        assert_eq!(fixture.channel_value(&ChannelType::Dimmer), Some(0));
        assert_eq!(fixture.channel_value(&ChannelType::Strobe), Some(0));
        // Color latches across ticks.
        assert_eq!(fixture.channel_value(&ChannelType::Red), Some(90));
    }

    #[test]
    fn test_blend_channel_keeps_max() {
        let mut fixture = par_fixture();
        fixture.blend_channel(&ChannelType::Dimmer, 100);
        fixture.blend_channel(&ChannelType::Dimmer, 60);
        assert_eq!(fixture.channel_value(&ChannelType::Dimmer), Some(100));

        fixture.blend_channel(&ChannelType::Dimmer, 180);
        assert_eq!(fixture.channel_value(&ChannelType::Dimmer), Some(180));
    }

    #[test]
    fn test_dmx_values_follow_channel_order() {
        let mut fixture = par_fixture();
        fixture.set_channel(&ChannelType::Dimmer, 255);
        fixture.set_channel(&ChannelType::Blue, 40);
        let values = fixture.dmx_values();
        assert_eq!(values.len(), fixture.channels.len());
        assert_eq!(values[0], 255);
    }
}
