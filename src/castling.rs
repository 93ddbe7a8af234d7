use crate::piece::Color;
use crate::square::{Square, A1, A8, B1, B8, C1, C8, D1, D8, E1, E8, F1, F8, G1, G8, H1, H8};
use std::fmt::{Display, Formatter};

/// The four independent castling rights, packed as KQkq from the high bit down
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq, Hash)]
pub struct CastlingRights(u8);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CastleSide {
    King,
    Queen,
}

/// Squares involved in one castling move
pub struct CastlingPath {
    pub king_from: Square,
    pub king_to: Square,
    pub rook_from: Square,
    pub rook_to: Square,
    /// Squares that must be empty
    pub empty: &'static [Square],
    /// Squares the king starts on, crosses and lands on
    pub safe: &'static [Square],
}

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    const WHITE_KING: u8 = 0b1000;
    const WHITE_QUEEN: u8 = 0b0100;
    const BLACK_KING: u8 = 0b0010;
    const BLACK_QUEEN: u8 = 0b0001;

    fn mask(side: Color, castle: CastleSide) -> u8 {
        match (side, castle) {
            (Color::White, CastleSide::King) => Self::WHITE_KING,
            (Color::White, CastleSide::Queen) => Self::WHITE_QUEEN,
            (Color::Black, CastleSide::King) => Self::BLACK_KING,
            (Color::Black, CastleSide::Queen) => Self::BLACK_QUEEN,
        }
    }

    /// Parses the castling field of a FEN string. `-` means no rights,
    /// anything outside of `KQkq` is rejected
    pub fn parse(s: &str) -> Option<CastlingRights> {
        if s == "-" {
            return Some(Self::NONE);
        }
        if s.is_empty() {
            return None;
        }
        let mut res = CastlingRights(0);
        for c in s.chars() {
            res.0 |= match c {
                'K' => Self::WHITE_KING,
                'Q' => Self::WHITE_QUEEN,
                'k' => Self::BLACK_KING,
                'q' => Self::BLACK_QUEEN,
                _ => return None,
            }
        }
        Some(res)
    }

    pub fn has(&self, side: Color, castle: CastleSide) -> bool {
        self.0 & Self::mask(side, castle) != 0
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Clears every right depending on a piece standing on `sq`:
    /// a king or rook leaving its home square, or a rook being captured there
    pub fn clear_for_square(&mut self, sq: Square) {
        self.0 &= match sq {
            E1 => !(Self::WHITE_KING | Self::WHITE_QUEEN),
            H1 => !Self::WHITE_KING,
            A1 => !Self::WHITE_QUEEN,
            E8 => !(Self::BLACK_KING | Self::BLACK_QUEEN),
            H8 => !Self::BLACK_KING,
            A8 => !Self::BLACK_QUEEN,
            _ => !0,
        }
    }

    pub fn path(side: Color, castle: CastleSide) -> &'static CastlingPath {
        match (side, castle) {
            (Color::White, CastleSide::King) => &WHITE_KING_SIDE,
            (Color::White, CastleSide::Queen) => &WHITE_QUEEN_SIDE,
            (Color::Black, CastleSide::King) => &BLACK_KING_SIDE,
            (Color::Black, CastleSide::Queen) => &BLACK_QUEEN_SIDE,
        }
    }

    /// Recognizes a castling move by its king squares
    pub fn path_for_king_move(from: Square, to: Square) -> Option<&'static CastlingPath> {
        match (from, to) {
            (E1, G1) => Some(&WHITE_KING_SIDE),
            (E1, C1) => Some(&WHITE_QUEEN_SIDE),
            (E8, G8) => Some(&BLACK_KING_SIDE),
            (E8, C8) => Some(&BLACK_QUEEN_SIDE),
            _ => None,
        }
    }
}

static WHITE_KING_SIDE: CastlingPath = CastlingPath {
    king_from: E1,
    king_to: G1,
    rook_from: H1,
    rook_to: F1,
    empty: &[F1, G1],
    safe: &[E1, F1, G1],
};
static WHITE_QUEEN_SIDE: CastlingPath = CastlingPath {
    king_from: E1,
    king_to: C1,
    rook_from: A1,
    rook_to: D1,
    empty: &[D1, C1, B1],
    safe: &[E1, D1, C1],
};
static BLACK_KING_SIDE: CastlingPath = CastlingPath {
    king_from: E8,
    king_to: G8,
    rook_from: H8,
    rook_to: F8,
    empty: &[F8, G8],
    safe: &[E8, F8, G8],
};
static BLACK_QUEEN_SIDE: CastlingPath = CastlingPath {
    king_from: E8,
    king_to: C8,
    rook_from: A8,
    rook_to: D8,
    empty: &[D8, C8, B8],
    safe: &[E8, D8, C8],
};

impl Display for CastlingRights {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        write!(
            f,
            "{}{}{}{}",
            if self.has(Color::White, CastleSide::King) { "K" } else { "" },
            if self.has(Color::White, CastleSide::Queen) { "Q" } else { "" },
            if self.has(Color::Black, CastleSide::King) { "k" } else { "" },
            if self.has(Color::Black, CastleSide::Queen) { "q" } else { "" }
        )
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        assert_eq!(CastlingRights::parse("KQkq"), Some(CastlingRights::ALL));
        assert_eq!(CastlingRights::parse("-"), Some(CastlingRights::NONE));
        assert_eq!(CastlingRights::parse("Kq").unwrap().to_string(), "Kq");
        assert_eq!(CastlingRights::NONE.to_string(), "-");
        assert!(CastlingRights::parse("KX").is_none());
        assert!(CastlingRights::parse("").is_none());
    }

    #[test]
    fn clearing_by_home_square() {
        let mut rights = CastlingRights::ALL;
        rights.clear_for_square(H1);
        assert!(!rights.has(Color::White, CastleSide::King));
        assert!(rights.has(Color::White, CastleSide::Queen));
        rights.clear_for_square(E8);
        assert_eq!(rights.to_string(), "Q");
        rights.clear_for_square(27);
        assert_eq!(rights.to_string(), "Q");
    }
}
