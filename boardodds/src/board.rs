use serde::{Deserialize, Serialize};
use std::fmt;

/// The number of tiles on the board. Tile arithmetic wraps modulo this.
pub const NUM_TILES: u8 = 40;

/// The display name of each tile, indexed by tile position. Tile 0 is GO and
/// play proceeds in increasing index order.
pub const BOARD_NAMES: [&str; NUM_TILES as usize] = [
    "GO",
    "Mediterranean Avenue",
    "Community Chest",
    "Baltic Avenue",
    "Income Tax",
    "Reading Railroad",
    "Oriental Avenue",
    "Chance",
    "Vermont Avenue",
    "Connecticut Avenue",
    "Jail / Just Visiting",
    "St. Charles Place",
    "Electric Company",
    "States Avenue",
    "Virginia Avenue",
    "Pennsylvania Railroad",
    "St. James Place",
    "Community Chest",
    "Tennessee Avenue",
    "New York Avenue",
    "Free Parking",
    "Kentucky Avenue",
    "Chance",
    "Indiana Avenue",
    "Illinois Avenue",
    "B. & O. Railroad",
    "Atlantic Avenue",
    "Ventnor Avenue",
    "Water Works",
    "Marvin Gardens",
    "Go To Jail",
    "Pacific Avenue",
    "North Carolina Avenue",
    "Community Chest",
    "Pennsylvania Avenue",
    "Short Line",
    "Chance",
    "Park Place",
    "Luxury Tax",
    "Boardwalk",
];

//////////
// Tile //
//////////

/// A position on the board, always in the range `0 <= idx < NUM_TILES`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Tile(u8);

impl Tile {
    pub const GO: Tile = Tile(0);

    /// Panics if `idx` is off the board. Use [`Tile::try_new`] for untrusted
    /// input.
    #[inline]
    pub const fn new(idx: u8) -> Self {
        assert!(idx < NUM_TILES, "tile index out of range");
        Self(idx)
    }

    pub fn try_new(idx: u8) -> Result<Self, String> {
        if idx < NUM_TILES {
            Ok(Self(idx))
        } else {
            Err(format!(
                "tile index must be in the range [0,{}]: '{}'",
                NUM_TILES - 1,
                idx
            ))
        }
    }

    /// All tiles in board order.
    pub fn all() -> impl DoubleEndedIterator<Item = Tile> + ExactSizeIterator {
        (0..NUM_TILES).map(Tile)
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn name(self) -> &'static str {
        BOARD_NAMES[self.0 as usize]
    }

    /// The tile `steps` squares ahead of this one, wrapping past GO.
    #[inline]
    pub const fn advance(self, steps: u8) -> Self {
        Self(((self.0 as u16 + steps as u16) % NUM_TILES as u16) as u8)
    }

    /// The first (in `TileGroup::all()` order) named group containing this
    /// tile. Every tile belongs to exactly one group.
    pub fn group(self) -> TileGroup {
        TileGroup::all()
            .iter()
            .copied()
            .find(|group| group.contains(self))
            .unwrap_or(TileGroup::Properties)
    }
}

impl From<Tile> for u8 {
    fn from(tile: Tile) -> u8 {
        tile.0
    }
}

impl TryFrom<u8> for Tile {
    type Error = String;

    fn try_from(idx: u8) -> Result<Self, Self::Error> {
        Self::try_new(idx)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The display name of the tile at `tile`.
#[inline]
pub fn board_name(tile: Tile) -> &'static str {
    tile.name()
}

///////////////
// TileGroup //
///////////////

const CORNERS: [Tile; 4] = [Tile(0), Tile(10), Tile(20), Tile(30)];
const TAXES_UTILITIES: [Tile; 4] = [Tile(4), Tile(12), Tile(28), Tile(38)];
const CHANCE: [Tile; 3] = [Tile(7), Tile(22), Tile(36)];
const RAILROADS: [Tile; 4] = [Tile(5), Tile(15), Tile(25), Tile(35)];
const COMMUNITY_CHEST: [Tile; 3] = [Tile(2), Tile(17), Tile(33)];

/// The 22 tiles not covered by any other group.
const PROPERTIES: [Tile; 22] = precompute_properties();

const fn precompute_properties() -> [Tile; 22] {
    const OTHERS: [&[Tile]; 5] = [
        &CORNERS,
        &TAXES_UTILITIES,
        &CHANCE,
        &RAILROADS,
        &COMMUNITY_CHEST,
    ];

    let mut out = [Tile(0); 22];
    let mut len = 0;

    // const fn, so no iterators here
    let mut idx = 0;
    while idx < NUM_TILES {
        let mut taken = false;
        let mut g = 0;
        while g < OTHERS.len() {
            let mut t = 0;
            while t < OTHERS[g].len() {
                if OTHERS[g][t].0 == idx {
                    taken = true;
                }
                t += 1;
            }
            g += 1;
        }
        if !taken {
            out[len] = Tile(idx);
            len += 1;
        }
        idx += 1;
    }

    assert!(len == 22);
    out
}

/// A fixed, named subset of the board, used as a bulk-toggle target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TileGroup {
    Corners,
    TaxesUtilities,
    Chance,
    Railroads,
    CommunityChest,
    Properties,
}

impl TileGroup {
    pub const fn all() -> &'static [TileGroup; 6] {
        &[
            Self::Corners,
            Self::TaxesUtilities,
            Self::Chance,
            Self::Railroads,
            Self::CommunityChest,
            Self::Properties,
        ]
    }

    /// The group's tiles, in ascending order.
    pub const fn tiles(self) -> &'static [Tile] {
        match self {
            Self::Corners => &CORNERS,
            Self::TaxesUtilities => &TAXES_UTILITIES,
            Self::Chance => &CHANCE,
            Self::Railroads => &RAILROADS,
            Self::CommunityChest => &COMMUNITY_CHEST,
            Self::Properties => &PROPERTIES,
        }
    }

    pub fn contains(self, tile: Tile) -> bool {
        self.tiles().contains(&tile)
    }

    pub fn from_memnonic(s: &str) -> Option<Self> {
        let group = match s {
            "corners" => Self::Corners,
            "taxes" | "utilities" => Self::TaxesUtilities,
            "chance" => Self::Chance,
            "railroads" => Self::Railroads,
            "community-chest" | "cc" => Self::CommunityChest,
            "properties" => Self::Properties,
            _ => return None,
        };
        Some(group)
    }

    pub fn as_memnonic(self) -> &'static str {
        match self {
            Self::Corners => "corners",
            Self::TaxesUtilities => "taxes",
            Self::Chance => "chance",
            Self::Railroads => "railroads",
            Self::CommunityChest => "community-chest",
            Self::Properties => "properties",
        }
    }

    pub fn as_human_readable(self) -> &'static str {
        match self {
            Self::Corners => "Corners",
            Self::TaxesUtilities => "Taxes & Utilities",
            Self::Chance => "Chance",
            Self::Railroads => "Railroads",
            Self::CommunityChest => "Community Chest",
            Self::Properties => "Properties",
        }
    }
}

impl fmt::Display for TileGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_memnonic())
    }
}
