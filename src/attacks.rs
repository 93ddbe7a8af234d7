use crate::bitboard::Bitboard;
use crate::piece::{Color, PieceType};
use crate::position::Position;
use crate::square::Square;

/// Every square `side` attacks, whatever stands on it
pub fn attacked(pos: &Position, side: Color) -> Bitboard {
    attack_map(pos, side, pos.occupancy())
}

/// Squares the king of `side` cannot step on. The king itself is removed from
/// the occupancy so that a slider keeps attacking the squares behind it
pub fn king_danger(pos: &Position, side: Color) -> Bitboard {
    let occupancy = pos.occupancy() & !pos.piece_bitboard(PieceType::King, side);
    attack_map(pos, side.opposite(), occupancy)
}

fn attack_map(pos: &Position, side: Color, occupancy: Bitboard) -> Bitboard {
    let mut attack_map = Bitboard::pawn_attacks(pos.piece_bitboard(PieceType::Pawn, side), side);
    for sq in pos.piece_bitboard(PieceType::Knight, side) {
        attack_map |= Bitboard::KNIGHT_ATTACKS[sq]
    }
    for sq in pos.piece_bitboard(PieceType::King, side) {
        attack_map |= Bitboard::KING_ATTACKS[sq]
    }
    for sq in pos.diagonal_sliders(side) {
        attack_map |= Bitboard::bishop_attacks(sq, occupancy)
    }
    for sq in pos.orthogonal_sliders(side) {
        attack_map |= Bitboard::rook_attacks(sq, occupancy)
    }
    attack_map
}

/// Pieces of `attacking_color` attacking a square
pub fn attackers_of_square(
    pos: &Position,
    target: Square,
    attacking_color: Color,
    occupancy: Bitboard,
) -> Bitboard {
    let target_bb = Bitboard::from_square(target);
    (Bitboard::pawn_attacks(target_bb, attacking_color.opposite())
        & pos.piece_bitboard(PieceType::Pawn, attacking_color))
        | (Bitboard::KNIGHT_ATTACKS[target] & pos.piece_bitboard(PieceType::Knight, attacking_color))
        | (Bitboard::KING_ATTACKS[target] & pos.piece_bitboard(PieceType::King, attacking_color))
        | (Bitboard::bishop_attacks(target, occupancy) & pos.diagonal_sliders(attacking_color))
        | (Bitboard::rook_attacks(target, occupancy) & pos.orthogonal_sliders(attacking_color))
}

pub fn is_square_attacked(pos: &Position, sq: Square, attacking_color: Color) -> bool {
    !attackers_of_square(pos, sq, attacking_color, pos.occupancy()).is_empty()
}

pub fn in_check(pos: &Position, side: Color) -> bool {
    is_square_attacked(pos, pos.king_square(side), side.opposite())
}

/// Enemy pieces checking the king of `side`, with their count.
/// Probing stops as soon as a second checker is found
pub fn checkers(pos: &Position, side: Color) -> (Bitboard, u32) {
    let king_square = pos.king_square(side);
    let them = side.opposite();
    let occupancy = pos.occupancy();

    let mut checkers = (Bitboard::pawn_attacks(Bitboard::from_square(king_square), side)
        & pos.piece_bitboard(PieceType::Pawn, them))
        | (Bitboard::KNIGHT_ATTACKS[king_square] & pos.piece_bitboard(PieceType::Knight, them));
    let mut count = checkers.pop_count();

    let diagonal = pos.diagonal_sliders(them);
    let orthogonal = pos.orthogonal_sliders(them);
    for direction in 0..8 {
        if count > 1 {
            break;
        }
        let sliders = if Bitboard::is_diagonal_direction(direction) {
            diagonal
        } else {
            orthogonal
        };
        if let Some(blocker) = Bitboard::first_blocker(direction, king_square, occupancy) {
            if sliders.is_set(blocker) {
                checkers.set(blocker);
                count += 1;
            }
        }
    }
    (checkers, count)
}

/// Pin state of the piece on `piece_sq` relative to the king on `king_sq`.
///
/// The piece is pinned when it is the first piece met walking from the king
/// and the next one along the same line is an enemy slider moving that way.
/// The returned ray holds the squares the piece may still move to: every
/// square between the king and the pinner, the pinner included.
pub fn pinned(pos: &Position, king_sq: Square, piece_sq: Square) -> Option<Bitboard> {
    let direction = Bitboard::direction_between(king_sq, piece_sq)?;
    let occupancy = pos.occupancy();
    if Bitboard::first_blocker(direction, king_sq, occupancy)? != piece_sq {
        return None;
    }

    let pinner = Bitboard::first_blocker(direction, piece_sq, occupancy)?;
    let them = if pos.piece_bitboard(PieceType::King, Color::White).is_set(king_sq) {
        Color::Black
    } else {
        Color::White
    };
    let sliders = if Bitboard::is_diagonal_direction(direction) {
        pos.diagonal_sliders(them)
    } else {
        pos.orthogonal_sliders(them)
    };
    if sliders.is_set(pinner) {
        Some(Bitboard::get_ray(king_sq, pinner))
    } else {
        None
    }
}
