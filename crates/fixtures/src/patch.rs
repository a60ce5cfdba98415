use serde::{Deserialize, Serialize};

use crate::{ChannelType, Fixture, FixtureLibrary};

/// An ordered, non-empty set of fixtures driven as one unit. Manual groups
/// are excluded from interpreter control and follow the manual dimmer
/// override instead.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FixtureGroup {
    name: String,
    fixtures: Vec<Fixture>,
    manual: bool,
}

impl FixtureGroup {
    pub fn new(name: impl Into<String>, fixtures: Vec<Fixture>) -> Self {
        FixtureGroup {
            name: name.into(),
            fixtures,
            manual: false,
        }
    }

    pub fn manual(name: impl Into<String>, fixtures: Vec<Fixture>) -> Self {
        FixtureGroup {
            name: name.into(),
            fixtures,
            manual: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_manual(&self) -> bool {
        self.manual
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn fixtures_mut(&mut self) -> &mut [Fixture] {
        &mut self.fixtures
    }

    /// Apply the performer-controlled dimmer level to every member.
    pub fn set_manual_dimmer(&mut self, level: f32) {
        let value = (level.clamp(0.0, 1.0) * 255.0) as u8;
        for fixture in &mut self.fixtures {
            fixture.set_channel(&ChannelType::Dimmer, value);
        }
    }
}

/// One entry of a venue patch: either a loose fixture or a pre-built group.
#[derive(Clone, Debug)]
pub enum PatchEntry {
    Single(Fixture),
    Group(FixtureGroup),
}

/// The rooms this rig gets installed in. Each venue carries its own patch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Venue {
    Studio,
    Warehouse,
    BlackBox,
}

impl Venue {
    pub const ALL: [Venue; 3] = [Venue::Studio, Venue::Warehouse, Venue::BlackBox];

    pub fn name(&self) -> &'static str {
        match self {
            Venue::Studio => "studio",
            Venue::Warehouse => "warehouse",
            Venue::BlackBox => "black_box",
        }
    }
}

impl std::fmt::Display for Venue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Build the patch for a venue. Addresses are assigned sequentially within
/// universe 1; ids are unique per patch.
pub fn venue_patch(venue: Venue, library: &FixtureLibrary) -> Vec<PatchEntry> {
    let mut builder = PatchBuilder::new(library);
    match venue {
        Venue::Studio => {
            let front = vec![
                builder.fixture("rgbw-par", "Front PAR L"),
                builder.fixture("rgbw-par", "Front PAR R"),
            ];
            let booth = vec![
                builder.fixture("rgbw-par", "Booth PAR L"),
                builder.fixture("rgbw-par", "Booth PAR R"),
            ];
            vec![
                PatchEntry::Group(FixtureGroup::new("front wash", front)),
                PatchEntry::Single(builder.fixture("spot-mover", "Mover L")),
                PatchEntry::Single(builder.fixture("spot-mover", "Mover R")),
                PatchEntry::Single(builder.fixture("motion-strip", "Strip")),
                PatchEntry::Single(builder.fixture("pinspot", "Pinspot L")),
                PatchEntry::Single(builder.fixture("pinspot", "Pinspot R")),
                PatchEntry::Group(FixtureGroup::manual("booth wash", booth)),
            ]
        }
        Venue::Warehouse => {
            let wall = vec![
                builder.fixture("rgbw-par", "Wall PAR 1"),
                builder.fixture("rgbw-par", "Wall PAR 2"),
                builder.fixture("rgbw-par", "Wall PAR 3"),
                builder.fixture("rgbw-par", "Wall PAR 4"),
            ];
            let booth = vec![
                builder.fixture("rgbw-par", "Booth PAR L"),
                builder.fixture("rgbw-par", "Booth PAR R"),
            ];
            vec![
                PatchEntry::Group(FixtureGroup::new("par wall", wall)),
                PatchEntry::Single(builder.fixture("spot-mover", "Mover 1")),
                PatchEntry::Single(builder.fixture("spot-mover", "Mover 2")),
                PatchEntry::Single(builder.fixture("spot-mover", "Mover 3")),
                PatchEntry::Single(builder.fixture("spot-mover", "Mover 4")),
                PatchEntry::Single(builder.fixture("rgb-laser", "Laser L")),
                PatchEntry::Single(builder.fixture("rgb-laser", "Laser R")),
                PatchEntry::Single(builder.fixture("rotosphere", "Rotosphere")),
                PatchEntry::Single(builder.fixture("derby", "Derby L")),
                PatchEntry::Single(builder.fixture("derby", "Derby R")),
                PatchEntry::Group(FixtureGroup::manual("dj booth", booth)),
            ]
        }
        Venue::BlackBox => {
            vec![
                PatchEntry::Single(builder.fixture("rgbw-par", "PAR L")),
                PatchEntry::Single(builder.fixture("rgbw-par", "PAR R")),
                PatchEntry::Single(builder.fixture("derby", "Derby")),
            ]
        }
    }
}

/// True when the venue patch contains a manual group (i.e. the manual dimmer
/// override actually drives something).
pub fn has_manual_group(venue: Venue, library: &FixtureLibrary) -> bool {
    venue_patch(venue, library)
        .iter()
        .any(|entry| matches!(entry, PatchEntry::Group(g) if g.is_manual()))
}

struct PatchBuilder<'a> {
    library: &'a FixtureLibrary,
    next_id: usize,
    next_address: u16,
}

impl<'a> PatchBuilder<'a> {
    fn new(library: &'a FixtureLibrary) -> Self {
        PatchBuilder {
            library,
            next_id: 0,
            next_address: 1,
        }
    }

    fn fixture(&mut self, profile_id: &str, name: &str) -> Fixture {
        let profile = self
            .library
            .profile(profile_id)
            .unwrap_or_else(|| panic!("unknown builtin profile {}", profile_id))
            .clone();
        let fixture = Fixture::new(self.next_id, name, profile, 1, self.next_address);
        self.next_id += 1;
        self.next_address += fixture.channels.len() as u16;
        fixture
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_addresses_do_not_overlap() {
        let library = FixtureLibrary::new();
        for venue in Venue::ALL {
            let mut spans: Vec<(u16, u16)> = Vec::new();
            for entry in venue_patch(venue, &library) {
                let fixtures: Vec<Fixture> = match entry {
                    PatchEntry::Single(f) => vec![f],
                    PatchEntry::Group(g) => g.fixtures().to_vec(),
                };
                for f in fixtures {
                    let span = (f.start_address, f.start_address + f.channels.len() as u16);
                    for (start, end) in &spans {
                        assert!(
                            span.1 <= *start || span.0 >= *end,
                            "{:?}: overlapping span {:?}",
                            venue,
                            span
                        );
                    }
                    spans.push(span);
                }
            }
            assert!(!spans.is_empty());
        }
    }

    #[test]
    fn test_manual_group_presence() {
        let library = FixtureLibrary::new();
        assert!(has_manual_group(Venue::Studio, &library));
        assert!(has_manual_group(Venue::Warehouse, &library));
        assert!(!has_manual_group(Venue::BlackBox, &library));
    }

    #[test]
    fn test_manual_dimmer_clamps_and_applies() {
        let library = FixtureLibrary::new();
        let profile = library.profile("rgbw-par").unwrap().clone();
        let mut group = FixtureGroup::manual(
            "booth",
            vec![Fixture::new(0, "PAR", profile, 1, 1)],
        );

        group.set_manual_dimmer(1.7);
        assert_eq!(group.fixtures()[0].channel_value(&ChannelType::Dimmer), Some(255));

        group.set_manual_dimmer(-0.5);
        assert_eq!(group.fixtures()[0].channel_value(&ChannelType::Dimmer), Some(0));
    }
}
