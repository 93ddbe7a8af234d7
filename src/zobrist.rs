use crate::castling::{CastleSide, CastlingRights};
use crate::piece::{Color, Piece};
use crate::square::{file_of, Square};

// Keys are initialized at compile time for reproducibility and
// to avoid init functions
include!(concat!(env!("OUT_DIR"), "/zobrist_keys.rs"));

pub type Hash = u64;

pub struct ZobristHasher {}
impl ZobristHasher {
    pub const BLACK_TO_MOVE_INDEX: usize = 768;
    pub const CASTLING_OFFSET: usize = 769;
    pub const EP_TARGET_OFFSET: usize = 773;

    #[inline(always)]
    pub fn hash_for_piece_sq(piece: Piece, sq: Square) -> Hash {
        Self::ZOBRIST_KEYS[piece.index() * 64 + sq]
    }

    #[inline(always)]
    pub fn side_to_move_hash(color: Color) -> Hash {
        if color == Color::Black {
            Self::ZOBRIST_KEYS[Self::BLACK_TO_MOVE_INDEX]
        } else {
            0u64
        }
    }

    pub fn castling_rights_hash(castling_rights: CastlingRights) -> Hash {
        let rights = [
            (Color::White, CastleSide::King),
            (Color::White, CastleSide::Queen),
            (Color::Black, CastleSide::King),
            (Color::Black, CastleSide::Queen),
        ];
        rights
            .iter()
            .enumerate()
            .filter(|(_, (side, castle))| castling_rights.has(*side, *castle))
            .fold(0u64, |hash, (i, _)| hash ^ Self::ZOBRIST_KEYS[Self::CASTLING_OFFSET + i])
    }

    #[inline(always)]
    pub fn en_passant_hash(ep_target: Option<Square>) -> Hash {
        match ep_target {
            Some(sq) => Self::ZOBRIST_KEYS[Self::EP_TARGET_OFFSET + file_of(sq)],
            None => 0u64,
        }
    }
}
