use crate::bitboard::Bitboard;
use crate::config::EngineConfig;
use crate::movelist::MoveList;
use crate::piece::{Color, PieceType};
use crate::position::Position;

/// Centipawns, positive when White is better
pub type Score = i32;

pub const MATE_SCORE: Score = 1_000_000;
pub const DRAW_SCORE: Score = 0;
/// Scores beyond this are mates, the distance being the difference with `MATE_SCORE`
pub const MATE_THRESHOLD: Score = MATE_SCORE - 1000;

/// Static evaluation used at the leaves of the search.
///
/// Scores are White-positive whoever is to move. Positions without legal
/// moves never reach the evaluator, the search scores them itself.
pub trait Evaluator {
    fn evaluate(
        &self,
        pos: &Position,
        legal_moves: &MoveList,
        ply: usize,
        opponent_attacks: Bitboard,
        config: &EngineConfig,
    ) -> Score;
}

/// Tapered material count with a light mobility term
#[derive(Debug, Default, Clone, Copy)]
pub struct MaterialEvaluator;

impl MaterialEvaluator {
    const MIDGAME_LIMIT: Score = 15258;
    const ENDGAME_LIMIT: Score = 3915;
    const PHASE_RANGE: Score = 128;

    // Pawn to queen, in engine units where an endgame pawn is worth 206
    const MIDGAME_VALUE: [Score; 5] = [124, 781, 825, 1276, 2538];
    const ENDGAME_VALUE: [Score; 5] = [206, 854, 915, 1380, 2682];

    const MOBILITY_WEIGHT: Score = 2;

    fn non_pawn_material(pos: &Position) -> Score {
        Color::ALL
            .iter()
            .flat_map(|&color| pos.material_iter(color))
            .filter(|(pt, _)| !matches!(pt, PieceType::Pawn | PieceType::King))
            .map(|(pt, bb)| Self::MIDGAME_VALUE[pt as usize] * bb.pop_count() as Score)
            .sum()
    }

    /// Game phase, from 0 (endgame) to `PHASE_RANGE` (opening)
    pub fn phase(pos: &Position) -> Score {
        let npm = Self::non_pawn_material(pos).clamp(Self::ENDGAME_LIMIT, Self::MIDGAME_LIMIT);
        (npm - Self::ENDGAME_LIMIT) * Self::PHASE_RANGE / (Self::MIDGAME_LIMIT - Self::ENDGAME_LIMIT)
    }

    /// White-positive material balance, in centipawns
    pub fn material(pos: &Position) -> Score {
        let (mut mg, mut eg) = (0, 0);
        for color in Color::ALL {
            let sign = if color == Color::White { 1 } else { -1 };
            for (pt, bb) in pos.material_iter(color) {
                if pt == PieceType::King {
                    continue;
                }
                let count = bb.pop_count() as Score;
                mg += sign * Self::MIDGAME_VALUE[pt as usize] * count;
                eg += sign * Self::ENDGAME_VALUE[pt as usize] * count;
            }
        }
        let phase = Self::phase(pos);
        let tapered = (mg * phase + eg * (Self::PHASE_RANGE - phase)) / Self::PHASE_RANGE;
        tapered * 100 / Self::ENDGAME_VALUE[0]
    }
}

impl Evaluator for MaterialEvaluator {
    fn evaluate(
        &self,
        pos: &Position,
        legal_moves: &MoveList,
        _ply: usize,
        opponent_attacks: Bitboard,
        config: &EngineConfig,
    ) -> Score {
        let material = Self::material(pos) * config.eval_material / 100;

        // Our options against the squares the opponent controls
        let mobility = Self::MOBILITY_WEIGHT
            * (legal_moves.len() as Score - opponent_attacks.pop_count() as Score);
        let mobility = match pos.turn() {
            Color::White => mobility,
            Color::Black => -mobility,
        };

        material + mobility
    }
}
