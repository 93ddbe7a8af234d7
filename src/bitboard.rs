use crate::piece::Color;
use crate::piece::PieceType;
use crate::square::Square;
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

// Build script to calculate lookup tables at compile time
include!(concat!(env!("OUT_DIR"), "/lookup.rs"));

#[repr(transparent)]
#[derive(Debug, Default, Copy, Clone, PartialOrd, PartialEq, Eq, Hash)]
pub struct Bitboard(pub u64);

impl Bitboard {
    #[inline]
    pub fn from_square(square: Square) -> Bitboard {
        Bitboard(1u64 << square)
    }
    #[inline]
    pub fn from_squares(squares: &[Square]) -> Bitboard {
        let mut bits: u64 = 0;
        for sq in squares {
            bits |= 1u64 << sq
        }
        Bitboard(bits)
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
    #[inline(always)]
    pub fn is_set(&self, sq: Square) -> bool {
        self.0 & (1 << sq) != 0
    }
    #[inline(always)]
    pub fn set(&mut self, sq: Square) {
        self.0 |= 1 << sq
    }
    #[inline(always)]
    pub fn unset(&mut self, sq: Square) {
        self.0 &= !(1 << sq)
    }

    /// Index of the least significant set bit
    /// ```
    /// use remora::bitboard::Bitboard;
    /// assert_eq!(Bitboard::from_squares(&[12, 40]).ls1b(), Some(12));
    /// assert_eq!(Bitboard::EMPTY.ls1b(), None);
    /// ```
    #[inline(always)]
    pub fn ls1b(&self) -> Option<Square> {
        if self.is_empty() {
            return None;
        }
        Some(self.0.trailing_zeros() as Square)
    }

    #[inline(always)]
    pub fn ms1b(&self) -> Option<Square> {
        if self.is_empty() {
            return None;
        }
        Some(63 - self.0.leading_zeros() as Square)
    }

    #[inline(always)]
    pub fn pop_ls1b(&mut self) -> Option<Square> {
        let ls1b = self.ls1b();
        self.0 &= self.0.wrapping_sub(1);
        ls1b
    }

    #[inline(always)]
    pub fn pop_count(&self) -> u32 {
        self.0.count_ones()
    }

    pub const EMPTY: Bitboard = Bitboard(0);
    pub const UNIVERSE: Bitboard = Bitboard(!0);
    pub const FILES: [Bitboard; 8] = [
        Bitboard(0x0101010101010101),
        Bitboard(0x0202020202020202),
        Bitboard(0x0404040404040404),
        Bitboard(0x0808080808080808),
        Bitboard(0x1010101010101010),
        Bitboard(0x2020202020202020),
        Bitboard(0x4040404040404040),
        Bitboard(0x8080808080808080),
    ];
    pub const RANKS: [Bitboard; 8] = [
        Bitboard(0x00000000000000ff),
        Bitboard(0x000000000000ff00),
        Bitboard(0x0000000000ff0000),
        Bitboard(0x00000000ff000000),
        Bitboard(0x000000ff00000000),
        Bitboard(0x0000ff0000000000),
        Bitboard(0x00ff000000000000),
        Bitboard(0xff00000000000000),
    ];

    /// Ray directions, in the order the build script generates them
    pub const EAST: usize = 0;
    pub const WEST: usize = 1;
    pub const NORTH: usize = 2;
    pub const SOUTH: usize = 3;
    pub const NORTH_WEST: usize = 4;
    pub const SOUTH_EAST: usize = 5;
    pub const NORTH_EAST: usize = 6;
    pub const SOUTH_WEST: usize = 7;

    #[inline(always)]
    pub fn is_diagonal_direction(direction: usize) -> bool {
        direction >= 4
    }

    /// Squares between origin and target, target included, origin excluded.
    /// Empty if both squares are not aligned
    #[inline]
    pub fn get_ray(origin: Square, target: Square) -> Bitboard {
        Self::ORIGIN_TARGET_RAYS[origin][target]
    }

    /// Direction going from origin to target, if they share a line
    pub fn direction_between(origin: Square, target: Square) -> Option<usize> {
        (0..8).find(|&dir| Self::RAYS[dir][origin].is_set(target))
    }

    /// First occupied square met when walking from origin in a direction
    #[inline]
    pub fn first_blocker(direction: usize, origin: Square, occupancy: Bitboard) -> Option<Square> {
        let blockers = Self::RAYS[direction][origin] & occupancy;
        if direction % 2 == 0 {
            blockers.ls1b()
        } else {
            blockers.ms1b()
        }
    }

    /// Attacks along a single ray, stopping at and including the first occupied square
    #[inline]
    pub fn ray_attacks(direction: usize, origin: Square, occupancy: Bitboard) -> Bitboard {
        let ray = Self::RAYS[direction][origin];
        match Self::first_blocker(direction, origin, occupancy) {
            Some(blocker) => ray & !Self::RAYS[direction][blocker],
            None => ray,
        }
    }

    #[inline]
    pub fn bishop_attacks(origin: Square, occupancy: Bitboard) -> Bitboard {
        (4..8).fold(Self::EMPTY, |acc, dir| acc | Self::ray_attacks(dir, origin, occupancy))
    }

    #[inline]
    pub fn rook_attacks(origin: Square, occupancy: Bitboard) -> Bitboard {
        (0..4).fold(Self::EMPTY, |acc, dir| acc | Self::ray_attacks(dir, origin, occupancy))
    }

    pub fn slider_attacks(piece_type: PieceType, origin: Square, occupancy: Bitboard) -> Bitboard {
        match piece_type {
            PieceType::Bishop => Self::bishop_attacks(origin, occupancy),
            PieceType::Rook => Self::rook_attacks(origin, occupancy),
            PieceType::Queen => {
                Self::bishop_attacks(origin, occupancy) | Self::rook_attacks(origin, occupancy)
            }
            _ => Self::EMPTY,
        }
    }

    /// Single step forward onto empty squares
    #[inline]
    pub fn pawn_pushes(pawns: Bitboard, empty: Bitboard, color: Color) -> Bitboard {
        let pushed = match color {
            Color::White => pawns.0 << 8,
            Color::Black => pawns.0 >> 8,
        };
        Bitboard(pushed) & empty
    }

    /// Squares attacked by a set of pawns of a given color
    /// ```
    /// use remora::bitboard::Bitboard;
    /// use remora::piece::Color;
    /// // a white pawn on e4 attacks d5 and f5
    /// assert_eq!(
    ///     Bitboard::pawn_attacks(Bitboard::from_square(28), Color::White),
    ///     Bitboard::from_squares(&[35, 37])
    /// );
    /// // a black pawn on a7 only attacks b6
    /// assert_eq!(
    ///     Bitboard::pawn_attacks(Bitboard::from_square(48), Color::Black),
    ///     Bitboard::from_square(41)
    /// );
    /// ```
    #[inline]
    pub fn pawn_attacks(pawns: Bitboard, color: Color) -> Bitboard {
        let (west, east) = match color {
            Color::White => (pawns.0 << 7, pawns.0 << 9),
            Color::Black => (pawns.0 >> 9, pawns.0 >> 7),
        };
        Bitboard(west & !Self::FILES[7].0 | east & !Self::FILES[0].0)
    }
}

impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rank in (0..8).rev() {
            let line: String = (0..8)
                .map(|file| if self.is_set(rank * 8 + file) { "x " } else { ". " })
                .collect();
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

// Yields set squares from the lowest up
impl Iterator for Bitboard {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        self.pop_ls1b()
    }
}

macro_rules! bitwise_ops {
    ($($trait:ident $method:ident $assign_trait:ident $assign_method:ident $op:tt),*) => {$(
        impl $trait for Bitboard {
            type Output = Bitboard;
            #[inline(always)]
            fn $method(self, rhs: Bitboard) -> Bitboard {
                Bitboard(self.0 $op rhs.0)
            }
        }
        impl $assign_trait for Bitboard {
            #[inline(always)]
            fn $assign_method(&mut self, rhs: Bitboard) {
                *self = Bitboard(self.0 $op rhs.0)
            }
        }
    )*};
}
bitwise_ops!(
    BitAnd bitand BitAndAssign bitand_assign &,
    BitOr bitor BitOrAssign bitor_assign |,
    BitXor bitxor BitXorAssign bitxor_assign ^
);

impl Not for Bitboard {
    type Output = Bitboard;
    fn not(self) -> Bitboard {
        Bitboard(!self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_primitives() {
        let mut bb = Bitboard::EMPTY;
        bb.set(0);
        bb.set(63);
        assert!(bb.is_set(0) && bb.is_set(63));
        assert_eq!(bb.pop_count(), 2);
        assert_eq!(bb.ls1b(), Some(0));
        assert_eq!(bb.ms1b(), Some(63));
        bb.unset(0);
        assert_eq!(bb.ls1b(), Some(63));
        assert_eq!(bb.collect::<Vec<_>>(), vec![63]);
    }

    #[test]
    fn knight_and_king_tables() {
        // a1 knight reaches b3 and c2
        assert_eq!(Bitboard::KNIGHT_ATTACKS[0], Bitboard::from_squares(&[10, 17]));
        // h8 king reaches g8, g7 and h7
        assert_eq!(Bitboard::KING_ATTACKS[63], Bitboard::from_squares(&[62, 54, 55]));
        assert_eq!(Bitboard::KING_ATTACKS[27].pop_count(), 8);
    }

    #[test]
    fn rays_stop_on_first_blocker() {
        // rook on a1, blocker on a4: a2, a3 and a4 are attacked northwards
        let occupancy = Bitboard::from_squares(&[0, 24]);
        assert_eq!(
            Bitboard::ray_attacks(Bitboard::NORTH, 0, occupancy),
            Bitboard::from_squares(&[8, 16, 24])
        );
        // same thing going south from a8 with a blocker on a5
        let occupancy = Bitboard::from_squares(&[56, 32]);
        assert_eq!(
            Bitboard::ray_attacks(Bitboard::SOUTH, 56, occupancy),
            Bitboard::from_squares(&[48, 40, 32])
        );
        assert_eq!(Bitboard::rook_attacks(0, Bitboard::EMPTY).pop_count(), 14);
        assert_eq!(Bitboard::bishop_attacks(27, Bitboard::EMPTY).pop_count(), 13);
    }

    #[test]
    fn origin_target_rays() {
        // e1 to e8: e2..e8
        assert_eq!(Bitboard::get_ray(4, 60).pop_count(), 7);
        assert!(Bitboard::get_ray(4, 60).is_set(60));
        assert!(!Bitboard::get_ray(4, 60).is_set(4));
        // unaligned squares have no ray
        assert!(Bitboard::get_ray(4, 21).is_empty());
        assert_eq!(Bitboard::direction_between(0, 63), Some(Bitboard::NORTH_EAST));
        assert_eq!(Bitboard::direction_between(63, 0), Some(Bitboard::SOUTH_WEST));
        assert_eq!(Bitboard::direction_between(0, 10), None);
    }
}
