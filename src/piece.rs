use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}
impl Color {
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    #[inline(always)]
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
    /// Rank pawns of this color start on
    pub fn pawn_rank(&self) -> usize {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }
    /// Rank pawns of this color promote on
    pub fn promotion_rank(&self) -> usize {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }
}
impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", if *self == Color::White { "w" } else { "b" })
    }
}

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq, Hash)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}
impl PieceType {
    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];
    pub const PROMOTIONS: [PieceType; 4] = [
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
    ];

    pub fn from_char(c: char) -> Option<PieceType> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceType::Pawn),
            'n' => Some(PieceType::Knight),
            'b' => Some(PieceType::Bishop),
            'r' => Some(PieceType::Rook),
            'q' => Some(PieceType::Queen),
            'k' => Some(PieceType::King),
            _ => None,
        }
    }
    /// Lowercase FEN letter
    pub fn to_char(self) -> char {
        b"pnbrqk"[self as usize] as char
    }
    pub fn can_slide(&self) -> bool {
        matches!(self, PieceType::Bishop | PieceType::Queen | PieceType::Rook)
    }
}
impl Display for PieceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A colored piece. Its `index` addresses one of the 12 bitboards of a position:
/// white pieces first, each color ordered pawn to king
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq, Hash)]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Color,
}
impl Piece {
    pub const COUNT: usize = 12;

    pub const fn new(piece_type: PieceType, color: Color) -> Piece {
        Piece { piece_type, color }
    }

    #[inline(always)]
    pub fn index(&self) -> usize {
        self.color as usize * 6 + self.piece_type as usize
    }

    pub fn from_index(i: usize) -> Piece {
        let color = if i < 6 { Color::White } else { Color::Black };
        Piece::new(PieceType::ALL[i % 6], color)
    }

    pub fn from_char(c: char) -> Option<Piece> {
        let piece_type = PieceType::from_char(c)?;
        let color = if c.is_ascii_lowercase() {
            Color::Black
        } else {
            Color::White
        };
        Some(Piece { piece_type, color })
    }
}
impl Display for Piece {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let c = self.piece_type.to_char();
        match self.color {
            Color::White => write!(f, "{}", c.to_ascii_uppercase()),
            Color::Black => write!(f, "{}", c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_cover_the_twelve_boards() {
        for i in 0..Piece::COUNT {
            assert_eq!(Piece::from_index(i).index(), i);
        }
        assert_eq!(Piece::new(PieceType::King, Color::Black).index(), 11);
    }

    #[test]
    fn char_conversions() {
        let p = Piece::from_char('q').unwrap();
        assert_eq!(p, Piece::new(PieceType::Queen, Color::Black));
        assert_eq!(Piece::from_char('N').unwrap().to_string(), "N");
        assert!(Piece::from_char('x').is_none());
    }
}
