use crate::error::MoveError;
use crate::piece::PieceType;
use crate::square::{self, square_representation, Square};
use std::fmt::{Display, Formatter};

/// Moves are stored as a 2 bytes word, with the following alignment:
/// - 6*2 bits for origin and destination square
/// - 4 bits for the promotion: a set high bit, then the promoted piece
///
/// A move only describes squares, castling and en passant are recognized
/// by the position the move is applied to.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move(u16);

impl Move {
    const PROMOTION_FLAG: u16 = 0b1000;

    pub fn new(origin: Square, target: Square) -> Move {
        Move(((origin as u16) << 10) | ((target as u16) << 4))
    }

    pub fn new_promotion(origin: Square, target: Square, promote_to: PieceType) -> Move {
        let code = match promote_to {
            PieceType::Knight => 0b00,
            PieceType::Bishop => 0b01,
            PieceType::Rook => 0b10,
            _ => 0b11,
        };
        Move(Self::new(origin, target).0 | Self::PROMOTION_FLAG | code)
    }

    pub fn all_promotions(origin: Square, target: Square) -> [Move; 4] {
        PieceType::PROMOTIONS.map(|p| Self::new_promotion(origin, target, p))
    }

    #[inline(always)]
    pub fn origin(&self) -> Square {
        (self.0 >> 10) as Square
    }
    #[inline(always)]
    pub fn target(&self) -> Square {
        ((self.0 >> 4) & 0b111111) as Square
    }

    #[inline(always)]
    pub fn is_promotion(&self) -> bool {
        self.0 & Self::PROMOTION_FLAG != 0
    }

    pub fn promotion_piece(&self) -> Option<PieceType> {
        if !self.is_promotion() {
            return None;
        }
        Some(PieceType::PROMOTIONS[(self.0 & 0b11) as usize])
    }

    /// Parses a move written in coordinate notation (`e2e4`, `a7a8q`).
    /// Only the syntax is checked, legality is up to the position
    /// ```
    /// use remora::r#move::Move;
    /// use remora::piece::PieceType;
    /// assert_eq!(Move::parse("e2e4").unwrap(), (12, 28, None));
    /// assert_eq!(Move::parse("a7a8q").unwrap(), (48, 56, Some(PieceType::Queen)));
    /// assert!(Move::parse("a7a8k").is_err());
    /// assert!(Move::parse("e2").is_err());
    /// ```
    pub fn parse(mv: &str) -> Result<(Square, Square, Option<PieceType>), MoveError> {
        let bad_format = || MoveError::BadFormat(mv.to_string());
        if !mv.is_ascii() || !(4..=5).contains(&mv.len()) {
            return Err(bad_format());
        }
        let origin = square::parse_square(&mv[0..2]).ok_or_else(bad_format)?;
        let target = square::parse_square(&mv[2..4]).ok_or_else(bad_format)?;
        let promotion = match &mv[4..] {
            "" => None,
            "n" => Some(PieceType::Knight),
            "b" => Some(PieceType::Bishop),
            "r" => Some(PieceType::Rook),
            "q" => Some(PieceType::Queen),
            _ => return Err(bad_format()),
        };
        Ok((origin, target, promotion))
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let o = square_representation(self.origin()).unwrap_or_else(|| String::from("**"));
        let t = square_representation(self.target()).unwrap_or_else(|| String::from("**"));
        match self.promotion_piece() {
            Some(p) => write!(f, "{}{}{}", o, t, p),
            None => write!(f, "{}{}", o, t),
        }
    }
}
