use std::collections::HashMap;

use crate::{channel_layout, Channel, ChannelType, FixtureKind, FixtureProfile};

/// Built-in fixture profiles, keyed by profile id. Note in the future we'll
/// load these from disk.
pub struct FixtureLibrary {
    pub profiles: HashMap<String, FixtureProfile>,
}

impl FixtureLibrary {
    pub fn new() -> Self {
        let mut profiles = HashMap::new();

        profiles.insert(
            "rgbw-par".to_string(),
            FixtureProfile {
                kind: FixtureKind::Par,
                manufacturer: "Shehds".to_string(),
                model: "LED Flat PAR 12x3W RGBW".to_string(),
                channel_layout: channel_layout![
                    ("Dimmer", ChannelType::Dimmer),
                    ("Red", ChannelType::Red),
                    ("Green", ChannelType::Green),
                    ("Blue", ChannelType::Blue),
                    ("White", ChannelType::White),
                    ("Strobe", ChannelType::Strobe),
                ],
            },
        );

        profiles.insert(
            "spot-mover".to_string(),
            FixtureProfile {
                kind: FixtureKind::MovingHead,
                manufacturer: "Shehds".to_string(),
                model: "LED Spot 60W".to_string(),
                channel_layout: channel_layout![
                    ("Pan", ChannelType::Pan),
                    ("Tilt", ChannelType::Tilt),
                    ("Dimmer", ChannelType::Dimmer),
                    ("Red", ChannelType::Red),
                    ("Green", ChannelType::Green),
                    ("Blue", ChannelType::Blue),
                    ("Strobe", ChannelType::Strobe),
                    ("Speed", ChannelType::Speed),
                ],
            },
        );

        profiles.insert(
            "motion-strip".to_string(),
            FixtureProfile {
                kind: FixtureKind::MotionStrip,
                manufacturer: "Generic".to_string(),
                model: "Motion Strip 32".to_string(),
                channel_layout: channel_layout![
                    ("Dimmer", ChannelType::Dimmer),
                    ("Pan", ChannelType::Pan),
                    ("Red", ChannelType::Red),
                    ("Green", ChannelType::Green),
                    ("Blue", ChannelType::Blue),
                    ("Strobe", ChannelType::Strobe),
                ],
            },
        );

        profiles.insert(
            "rgb-laser".to_string(),
            FixtureProfile {
                kind: FixtureKind::Laser,
                manufacturer: "Generic".to_string(),
                model: "RGB Laser".to_string(),
                channel_layout: channel_layout![
                    ("Dimmer", ChannelType::Dimmer),
                    // 0-50: off, then banked patterns in steps of ~25
                    ("Pattern", ChannelType::Other("Pattern".to_string())),
                    ("Speed", ChannelType::Speed),
                    ("Strobe", ChannelType::Strobe),
                ],
            },
        );

        profiles.insert(
            "rotosphere".to_string(),
            FixtureProfile {
                kind: FixtureKind::Rotosphere,
                manufacturer: "Chauvet".to_string(),
                model: "Rotosphere".to_string(),
                channel_layout: channel_layout![
                    ("Dimmer", ChannelType::Dimmer),
                    ("Red", ChannelType::Red),
                    ("Green", ChannelType::Green),
                    ("Blue", ChannelType::Blue),
                    ("Strobe", ChannelType::Strobe),
                    ("Speed", ChannelType::Speed),
                ],
            },
        );

        profiles.insert(
            "derby".to_string(),
            FixtureProfile {
                kind: FixtureKind::Derby,
                manufacturer: "Chauvet".to_string(),
                model: "Derby".to_string(),
                channel_layout: channel_layout![
                    ("Dimmer", ChannelType::Dimmer),
                    ("Red", ChannelType::Red),
                    ("Green", ChannelType::Green),
                    ("Blue", ChannelType::Blue),
                    ("Strobe", ChannelType::Strobe),
                    ("Speed", ChannelType::Speed),
                ],
            },
        );

        profiles.insert(
            "pinspot".to_string(),
            FixtureProfile {
                kind: FixtureKind::Pinspot,
                manufacturer: "Shehds".to_string(),
                model: "Mini LED Pinspot 10W".to_string(),
                channel_layout: channel_layout![
                    ("Dimmer", ChannelType::Dimmer),
                    ("Red", ChannelType::Red),
                    ("Green", ChannelType::Green),
                    ("Blue", ChannelType::Blue),
                ],
            },
        );

        FixtureLibrary { profiles }
    }

    pub fn profile(&self, id: &str) -> Option<&FixtureProfile> {
        self.profiles.get(id)
    }
}

impl Default for FixtureLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_profile_has_a_dimmer() {
        let library = FixtureLibrary::new();
        assert!(!library.profiles.is_empty());
        for (id, profile) in &library.profiles {
            assert!(
                profile
                    .channel_layout
                    .iter()
                    .any(|c| c.channel_type == ChannelType::Dimmer),
                "profile {} has no dimmer channel",
                id
            );
        }
    }
}
