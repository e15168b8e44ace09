use crate::board::{Tile, NUM_TILES};
use log::trace;
use serde::{Deserialize, Serialize};
use std::{fmt, iter::FusedIterator};

/// A mask with one bit set for every tile on the board.
const ALL_TILES_MASK: u64 = (1 << NUM_TILES) - 1;

/// The set of tiles currently marked "good", packed into the low 40 bits of a
/// `u64`. Bit `i` is set iff tile `i` is in the set.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Tile>", into = "Vec<Tile>")]
pub struct GoodSet(u64);

impl GoodSet {
    #[inline]
    pub const fn new() -> Self {
        Self(0)
    }

    #[inline]
    pub const fn all() -> Self {
        Self(ALL_TILES_MASK)
    }

    #[inline]
    const fn bit(tile: Tile) -> u64 {
        1 << tile.index()
    }

    #[inline]
    fn invariant(&self) -> bool {
        self.0 & !ALL_TILES_MASK == 0
    }

    #[inline]
    pub fn is_good(&self, tile: Tile) -> bool {
        self.0 & Self::bit(tile) != 0
    }

    #[inline]
    pub fn len(&self) -> u8 {
        self.0.count_ones() as u8
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Flip the membership of `tile`.
    pub fn toggle(&mut self, tile: Tile) {
        self.0 ^= Self::bit(tile);
        trace!(
            "GoodSet::toggle: tile: {}, is_good: {}",
            tile,
            self.is_good(tile)
        );
        debug_assert!(self.invariant());
    }

    /// Switch a whole group of tiles at once. If every tile in `tiles` is
    /// already good, they are all cleared; otherwise they are all set, even
    /// the ones that were already good.
    pub fn toggle_group(&mut self, tiles: impl IntoIterator<Item = Tile>) {
        let mask = tiles
            .into_iter()
            .fold(0_u64, |mask, tile| mask | Self::bit(tile));

        if self.0 & mask == mask {
            self.0 &= !mask;
        } else {
            self.0 |= mask;
        }

        trace!(
            "GoodSet::toggle_group: mask: {:#012x}, set: {}",
            mask,
            self
        );
        debug_assert!(self.invariant());
    }

    /// Returns `true` if every tile in `tiles` is good. Vacuously `true` for
    /// no tiles.
    pub fn contains_all(&self, tiles: impl IntoIterator<Item = Tile>) -> bool {
        tiles.into_iter().all(|tile| self.is_good(tile))
    }

    /// The good tiles in ascending board order.
    #[inline]
    pub fn iter(&self) -> GoodSetIter {
        GoodSetIter(self.0)
    }
}

impl FromIterator<Tile> for GoodSet {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Tile>,
    {
        Self(
            iter.into_iter()
                .fold(0_u64, |mask, tile| mask | Self::bit(tile)),
        )
    }
}

impl<'a> IntoIterator for &'a GoodSet {
    type Item = Tile;
    type IntoIter = GoodSetIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<GoodSet> for Vec<Tile> {
    fn from(set: GoodSet) -> Self {
        set.iter().collect()
    }
}

impl TryFrom<Vec<Tile>> for GoodSet {
    type Error = String;

    fn try_from(tiles: Vec<Tile>) -> Result<Self, Self::Error> {
        let set = GoodSet::from_iter(tiles.iter().copied());
        if set.len() as usize != tiles.len() {
            return Err("the good set can't contain any duplicates".to_string());
        }
        Ok(set)
    }
}

impl fmt::Display for GoodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use itertools::Itertools;
        write!(f, "[{}]", self.iter().join(", "))
    }
}

impl fmt::Debug for GoodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// An `Iterator` over the set bits of a `GoodSet`, from the least-significant
/// bit (tile 0) up.
pub struct GoodSetIter(u64);

impl Iterator for GoodSetIter {
    type Item = Tile;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            return None;
        }
        let idx = self.0.trailing_zeros() as u8;
        // clear lsb
        self.0 &= self.0 - 1;
        Some(Tile::new(idx))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.count_ones() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for GoodSetIter {}

impl FusedIterator for GoodSetIter {}


#[cfg(test)]
mod test {
    use super::{prop::*, *};
    use crate::board::TileGroup;
    use proptest::{collection::vec, prelude::*};
    use std::collections::BTreeSet;

    macro_rules! good_set {
        ($($x:expr),* $(,)?) => {
            GoodSet::from_iter([ $( Tile::new($x) ),* ])
        };
    }

    #[test]
    fn test_new_is_empty() {
        let set = GoodSet::new();
        assert!(set.is_empty());
        assert_eq!(0, set.len());
        assert!(Tile::all().all(|tile| !set.is_good(tile)));
    }

    #[test]
    fn test_all() {
        let set = GoodSet::all();
        assert_eq!(NUM_TILES, set.len());
        assert!(Tile::all().all(|tile| set.is_good(tile)));
    }

    #[test]
    fn test_toggle() {
        let mut set = GoodSet::new();
        set.toggle(Tile::new(5));
        assert!(set.is_good(Tile::new(5)));
        assert_eq!(good_set![5], set);

        set.toggle(Tile::new(39));
        assert_eq!(good_set![5, 39], set);

        set.toggle(Tile::new(5));
        assert_eq!(good_set![39], set);
    }

    #[test]
    fn test_toggle_is_involution() {
        proptest!(niters(500), |(set in arb_good_set(), tile in arb_tile())| {
            let mut set2 = set;
            set2.toggle(tile);
            prop_assert_ne!(set.is_good(tile), set2.is_good(tile));
            set2.toggle(tile);
            prop_assert_eq!(set, set2);
        });
    }

    #[test]
    fn test_toggle_group_corners() {
        let corners = || TileGroup::Corners.tiles().iter().copied();
        let mut set = GoodSet::new();

        // none on -> all on
        set.toggle_group(corners());
        assert_eq!(good_set![0, 10, 20, 30], set);

        // all on -> all off
        set.toggle_group(corners());
        assert_eq!(GoodSet::new(), set);

        // partially on resolves to all on
        set.toggle(Tile::new(10));
        set.toggle(Tile::new(30));
        set.toggle_group(corners());
        assert_eq!(good_set![0, 10, 20, 30], set);

        // an individual toggle off leaves it partial again
        set.toggle(Tile::new(20));
        set.toggle_group(corners());
        assert_eq!(good_set![0, 10, 20, 30], set);

        set.toggle_group(corners());
        assert!(set.is_empty());
    }

    #[test]
    fn test_toggle_group_leaves_others() {
        let mut set = good_set![1, 5, 39];
        set.toggle_group(TileGroup::Railroads.tiles().iter().copied());
        assert_eq!(good_set![1, 5, 15, 25, 35, 39], set);
        set.toggle_group(TileGroup::Railroads.tiles().iter().copied());
        assert_eq!(good_set![1, 39], set);
    }

    #[test]
    fn test_toggle_group_empty_is_noop() {
        proptest!(niters(200), |(set in arb_good_set())| {
            let mut set2 = set;
            set2.toggle_group(std::iter::empty());
            prop_assert_eq!(set, set2);
        });
    }

    #[test]
    fn test_toggle_group_two_state() {
        proptest!(niters(500), |(set in arb_good_set(), group in vec(arb_tile(), 1..10))| {
            let mut set2 = set;
            let was_full = set.contains_all(group.iter().copied());

            set2.toggle_group(group.iter().copied());
            for &tile in &group {
                prop_assert_eq!(!was_full, set2.is_good(tile));
            }

            // tiles outside the group are untouched
            for tile in Tile::all().filter(|tile| !group.contains(tile)) {
                prop_assert_eq!(set.is_good(tile), set2.is_good(tile));
            }

            // from not-fully-on: first call turns all on, second turns all off
            if !was_full {
                set2.toggle_group(group.iter().copied());
                for &tile in &group {
                    prop_assert!(!set2.is_good(tile));
                }
            }
        });
    }

    #[test]
    fn test_iter_matches_btree_set() {
        proptest!(niters(500), |(tiles in vec(arb_tile(), 0..40))| {
            let set = GoodSet::from_iter(tiles.iter().copied());
            let expected = tiles.iter().copied().collect::<BTreeSet<_>>();

            prop_assert_eq!(expected.len(), set.len() as usize);
            prop_assert_eq!(expected.len(), set.iter().len());
            prop_assert_eq!(
                expected.into_iter().collect::<Vec<_>>(),
                set.iter().collect::<Vec<_>>()
            );
        });
    }

    #[test]
    fn test_display() {
        assert_eq!("[]", GoodSet::new().to_string());
        assert_eq!("[2, 5, 15]", good_set![15, 2, 5].to_string());
    }

    #[test]
    fn test_serde_rejects_duplicates() {
        assert!(GoodSet::try_from(vec![Tile::new(1), Tile::new(1)]).is_err());
        assert_eq!(
            Ok(good_set![1, 2]),
            GoodSet::try_from(vec![Tile::new(2), Tile::new(1)])
        );
    }
}
