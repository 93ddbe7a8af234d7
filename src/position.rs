use crate::attacks;
use crate::bitboard::Bitboard;
use crate::castling::CastlingRights;
use crate::error::{FenError, MoveError};
use crate::move_generator::legal_moves;
use crate::piece::{Color, Piece, PieceType};
use crate::r#move::Move;
use crate::square::{file_of, parse_square, rank_of, square_at, square_representation, Square};
use crate::zobrist::{Hash, ZobristHasher};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A board snapshot. Positions are never modified once built:
/// applying a move yields a new position.
///
/// The 12 bitboards are indexed by `Piece::index`, so finding which piece
/// stands on a square is a scan over the array.
#[derive(Clone, Debug)]
pub struct Position {
    bitboards: [Bitboard; Piece::COUNT],
    turn: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,

    move_history: Vec<Move>,
    repeatable: Vec<Hash>, // Hashes of earlier positions since the last irreversible move
    hash: Hash,
}

impl Position {
    pub fn starting() -> Position {
        Self::from_fen(STARTING_FEN).expect("the starting FEN is valid")
    }

    /// Applies a move, returning the resulting position.
    /// The move is expected to be legal: castling and en passant are
    /// recognized from the squares it touches
    pub fn apply_move(&self, mv: Move) -> Position {
        let mut next = self.clone();
        let (origin, target) = (mv.origin(), mv.target());
        let us = self.turn;
        let moving = self
            .piece_on(origin)
            .expect("applied a move from an empty square");
        let captured = self.piece_on(target);

        next.hash ^= ZobristHasher::castling_rights_hash(self.castling);
        next.hash ^= ZobristHasher::en_passant_hash(self.en_passant);

        // Clearing both squares on every board makes captures implicit
        let cleared = !(Bitboard::from_square(origin) | Bitboard::from_square(target));
        for bb in next.bitboards.iter_mut() {
            *bb &= cleared;
        }
        next.hash ^= ZobristHasher::hash_for_piece_sq(moving, origin);
        if let Some(c) = captured {
            next.hash ^= ZobristHasher::hash_for_piece_sq(c, target);
        }

        let placed = match mv.promotion_piece() {
            Some(p) if moving.piece_type == PieceType::Pawn => Piece::new(p, us),
            _ => moving,
        };
        next.bitboards[placed.index()].set(target);
        next.hash ^= ZobristHasher::hash_for_piece_sq(placed, target);

        let mut capture = captured.is_some();
        if moving.piece_type == PieceType::Pawn
            && captured.is_none()
            && Some(target) == self.en_passant
            && file_of(origin) != file_of(target)
        {
            // The captured pawn sits behind the target square
            let victim_square = match us {
                Color::White => target - 8,
                Color::Black => target + 8,
            };
            let victim = Piece::new(PieceType::Pawn, us.opposite());
            next.bitboards[victim.index()].unset(victim_square);
            next.hash ^= ZobristHasher::hash_for_piece_sq(victim, victim_square);
            capture = true;
        }

        if moving.piece_type == PieceType::King {
            if let Some(path) = CastlingRights::path_for_king_move(origin, target) {
                let rook = Piece::new(PieceType::Rook, us);
                next.bitboards[rook.index()].unset(path.rook_from);
                next.bitboards[rook.index()].set(path.rook_to);
                next.hash ^= ZobristHasher::hash_for_piece_sq(rook, path.rook_from);
                next.hash ^= ZobristHasher::hash_for_piece_sq(rook, path.rook_to);
            }
        }

        next.castling.clear_for_square(origin);
        next.castling.clear_for_square(target);
        next.hash ^= ZobristHasher::castling_rights_hash(next.castling);

        next.en_passant = if moving.piece_type == PieceType::Pawn && origin.abs_diff(target) == 16 {
            Some((origin + target) / 2)
        } else {
            None
        };
        next.hash ^= ZobristHasher::en_passant_hash(next.en_passant);

        let irreversible = capture || moving.piece_type == PieceType::Pawn;
        next.halfmove_clock = if irreversible { 0 } else { self.halfmove_clock + 1 };
        if us == Color::Black {
            next.fullmove_number += 1;
        }

        next.turn = us.opposite();
        next.hash ^= ZobristHasher::ZOBRIST_KEYS[ZobristHasher::BLACK_TO_MOVE_INDEX];

        if irreversible {
            next.repeatable.clear();
        } else {
            next.repeatable.push(self.hash);
        }
        next.move_history.push(mv);
        next
    }

    /// Parses a move in coordinate notation and applies it if it is legal
    pub fn apply_uci_move(&self, move_str: &str) -> Result<Position, MoveError> {
        let (origin, target, promotion) = Move::parse(move_str)?;
        legal_moves(self)
            .iter()
            .find(|m| m.origin() == origin && m.target() == target && m.promotion_piece() == promotion)
            .map(|m| self.apply_move(*m))
            .ok_or_else(|| MoveError::Illegal(move_str.to_string()))
    }

    /// The side to move passes its turn. Only used in search
    pub fn null_move(&self) -> Position {
        let mut next = self.clone();
        next.hash ^= ZobristHasher::en_passant_hash(self.en_passant);
        next.en_passant = None;
        next.hash ^= ZobristHasher::ZOBRIST_KEYS[ZobristHasher::BLACK_TO_MOVE_INDEX];
        next.turn = self.turn.opposite();
        next.halfmove_clock += 1;
        next.repeatable.push(self.hash);
        next
    }

    /*
    INTERESTING GETTERS
     */
    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Moves applied since this position was parsed
    pub fn move_history(&self) -> &[Move] {
        &self.move_history
    }

    pub fn bitboards(&self) -> &[Bitboard; Piece::COUNT] {
        &self.bitboards
    }

    #[inline(always)]
    pub fn pieces(&self, piece: Piece) -> Bitboard {
        self.bitboards[piece.index()]
    }

    #[inline(always)]
    pub fn piece_bitboard(&self, piece_type: PieceType, color: Color) -> Bitboard {
        self.bitboards[Piece::new(piece_type, color).index()]
    }

    pub fn color_bitboard(&self, color: Color) -> Bitboard {
        let offset = color as usize * 6;
        self.bitboards[offset..offset + 6]
            .iter()
            .fold(Bitboard::EMPTY, |acc, bb| acc | *bb)
    }

    pub fn occupancy(&self) -> Bitboard {
        self.bitboards.iter().fold(Bitboard::EMPTY, |acc, bb| acc | *bb)
    }

    pub fn diagonal_sliders(&self, color: Color) -> Bitboard {
        self.piece_bitboard(PieceType::Bishop, color) | self.piece_bitboard(PieceType::Queen, color)
    }

    pub fn orthogonal_sliders(&self, color: Color) -> Bitboard {
        self.piece_bitboard(PieceType::Rook, color) | self.piece_bitboard(PieceType::Queen, color)
    }

    /// Every position holds exactly one king per side
    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.piece_bitboard(PieceType::King, color).0.trailing_zeros() as Square
    }

    /// Scans the 12 boards for the owner of a square
    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.bitboards
            .iter()
            .position(|bb| bb.is_set(sq))
            .map(Piece::from_index)
    }

    /// Iterator over the material of a side, pawns to king
    pub fn material_iter(&self, color: Color) -> impl Iterator<Item = (PieceType, Bitboard)> + '_ {
        PieceType::ALL
            .iter()
            .map(move |&pt| (pt, self.piece_bitboard(pt, color)))
    }

    pub fn fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Number of earlier occurences of the current position
    pub fn repetitions(&self) -> usize {
        self.repeatable.iter().filter(|h| **h == self.hash).count()
    }

    pub fn is_drawn(&self) -> bool {
        self.repetitions() >= 2 || self.fifty_move_draw()
    }

    /*
    FEN STRING OPERATIONS
     */
    /// Parses a FEN string. The move counters may be omitted
    pub fn from_fen(fen: &str) -> Result<Position, FenError> {
        let mut sections = fen.split_whitespace();
        let placement = sections.next().ok_or(FenError::MissingField("piece placement"))?;
        let side = sections.next().ok_or(FenError::MissingField("side to move"))?;
        let castling = sections.next().ok_or(FenError::MissingField("castling rights"))?;
        let ep = sections.next().ok_or(FenError::MissingField("en passant square"))?;
        let halfmove = sections.next().unwrap_or("0");
        let fullmove = sections.next().unwrap_or("1");
        let rest: Vec<&str> = sections.collect();
        if !rest.is_empty() {
            return Err(FenError::TrailingInput(rest.join(" ")));
        }

        let bitboards = Self::parse_placement(placement)?;
        for color in Color::ALL {
            if bitboards[Piece::new(PieceType::King, color).index()].pop_count() != 1 {
                return Err(FenError::KingCount);
            }
        }

        let turn = match side {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(FenError::BadSideToMove(side.to_string())),
        };
        let castling =
            CastlingRights::parse(castling).ok_or_else(|| FenError::BadCastling(castling.to_string()))?;
        let en_passant = match ep {
            "-" => None,
            _ => {
                let sq = parse_square(ep)
                    .filter(|_| ep.len() == 2)
                    .ok_or_else(|| FenError::BadEnPassant(ep.to_string()))?;
                // The target lies behind a pawn the opponent just pushed
                let expected_rank = if turn == Color::White { 5 } else { 2 };
                if rank_of(sq) != expected_rank {
                    return Err(FenError::BadEnPassant(ep.to_string()));
                }
                Some(sq)
            }
        };
        let halfmove_clock = halfmove
            .parse::<u32>()
            .map_err(|_| FenError::BadCounter(halfmove.to_string()))?;
        let fullmove_number = fullmove
            .parse::<u32>()
            .map_err(|_| FenError::BadCounter(fullmove.to_string()))?;

        let mut position = Position {
            bitboards,
            turn,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
            move_history: Vec::with_capacity(128),
            repeatable: Vec::with_capacity(16),
            hash: 0,
        };
        position.hash = position.cold_hash();
        // Otherwise the side to move could capture the king
        if attacks::in_check(&position, turn.opposite()) {
            return Err(FenError::OpponentInCheck);
        }
        Ok(position)
    }

    fn parse_placement(placement: &str) -> Result<[Bitboard; Piece::COUNT], FenError> {
        let bad = |reason: &str| FenError::BadPlacement(format!("{} ({})", placement, reason));
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(bad("expected 8 ranks"));
        }

        let mut bitboards = [Bitboard::EMPTY; Piece::COUNT];
        // FEN lists rank 8 first
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file = 0usize;
            for c in rank_str.chars() {
                match c {
                    '1'..='8' => file += c as usize - '0' as usize,
                    _ => {
                        let piece = Piece::from_char(c).ok_or_else(|| bad("unknown piece"))?;
                        if file >= 8 {
                            return Err(bad("rank overflow"));
                        }
                        bitboards[piece.index()].set(square_at(rank, file));
                        file += 1;
                    }
                }
                if file > 8 {
                    return Err(bad("rank overflow"));
                }
            }
            if file != 8 {
                return Err(bad("rank does not cover 8 files"));
            }
        }
        Ok(bitboards)
    }

    pub fn to_fen(&self) -> String {
        let mut fen = String::new();
        for rank in (0..8).rev() {
            let mut empty_counter = 0;
            for file in 0..8 {
                match self.piece_on(square_at(rank, file)) {
                    Some(p) => {
                        if empty_counter != 0 {
                            fen.push_str(&empty_counter.to_string());
                            empty_counter = 0;
                        }
                        fen.push_str(&p.to_string());
                    }
                    None => empty_counter += 1,
                }
            }
            if empty_counter != 0 {
                fen.push_str(&empty_counter.to_string());
            }
            if rank != 0 {
                fen.push('/');
            }
        }

        let ep = self
            .en_passant
            .and_then(square_representation)
            .unwrap_or_else(|| String::from("-"));
        format!(
            "{} {} {} {} {} {}",
            fen, self.turn, self.castling, ep, self.halfmove_clock, self.fullmove_number
        )
    }

    /*
    HASHING
     */
    pub fn hash(&self) -> Hash {
        self.hash
    }

    /// Hash computed from scratch, the incremental one must always match it
    pub fn cold_hash(&self) -> Hash {
        let mut hash = 0u64;
        for (i, bb) in self.bitboards.iter().enumerate() {
            for sq in *bb {
                hash ^= ZobristHasher::hash_for_piece_sq(Piece::from_index(i), sq)
            }
        }
        hash ^= ZobristHasher::side_to_move_hash(self.turn);
        hash ^= ZobristHasher::castling_rights_hash(self.castling);
        hash ^= ZobristHasher::en_passant_hash(self.en_passant);
        hash
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::starting()
    }
}

impl FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let ranks: Vec<String> = (0..8)
            .rev()
            .map(|rank| {
                (0..8)
                    .map(|file| match self.piece_on(square_at(rank, file)) {
                        None => String::from(". "),
                        Some(p) => p.to_string() + " ",
                    })
                    .collect()
            })
            .collect();

        writeln!(f, "{}", ranks[0])?;
        writeln!(f, "{}  side to move: {}", ranks[1], self.turn)?;
        writeln!(f, "{}  castling rights: {}", ranks[2], self.castling)?;
        writeln!(
            f,
            "{}  en passant: {}",
            ranks[3],
            self.en_passant
                .and_then(square_representation)
                .unwrap_or_else(|| String::from("-"))
        )?;
        writeln!(f, "{}  halfmove clock: {}", ranks[4], self.halfmove_clock)?;
        writeln!(f, "{}  hash: {:#0x}", ranks[5], self.hash)?;
        writeln!(f, "{}  fen: {}", ranks[6], self.to_fen())?;
        write!(f, "{}", ranks[7])
    }
}
