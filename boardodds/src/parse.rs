use crate::{
    board::{Tile, TileGroup},
    good_set::GoodSet,
};
use std::str::FromStr;

const SPLITTERS: &[char] = &[',', ' ', '\n', '\t'];

////////////////
// parse tile //
////////////////

impl FromStr for Tile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let idx = s
            .trim()
            .parse::<u8>()
            .map_err(|err| format!("failed to parse tile index: '{}', error: {}", s, err))?;
        Tile::try_new(idx)
    }
}

/////////////////
// parse group //
/////////////////

impl FromStr for TileGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TileGroup::from_memnonic(s.trim()).ok_or_else(|| {
            format!("didn't recognize tile group: '{}'", s)
        })
    }
}

/// A single entry in a good-set string: either one tile or a whole group.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    Tile(Tile),
    Group(TileGroup),
}

impl Selection {
    /// Apply this selection to `set` with the store's own toggle operations.
    pub fn apply(self, set: &mut GoodSet) {
        match self {
            Self::Tile(tile) => set.toggle(tile),
            Self::Group(group) => set.toggle_group(group.tiles().iter().copied()),
        }
    }
}

impl FromStr for Selection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with(|c: char| c.is_ascii_digit()) {
            Tile::from_str(s).map(Self::Tile)
        } else {
            TileGroup::from_str(s).map(Self::Group)
        }
    }
}

////////////////////
// parse good set //
////////////////////

/// Parses `[tok, tok, ..]`, where each token is a tile index or a group name.
/// The brackets are optional. Tokens are applied left to right starting from
/// the empty set, so `[railroads, 5]` leaves 15, 25 and 35.
impl FromStr for GoodSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.trim_start_matches('[');
        let s = s.trim_end_matches(']');

        let mut set = GoodSet::new();
        for token in s.split(SPLITTERS).filter(|s| !s.is_empty()) {
            Selection::from_str(token)?.apply(&mut set);
        }

        Ok(set)
    }
}
