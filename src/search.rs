use std::collections::TryReserveError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::attacks;
use crate::config::EngineConfig;
use crate::evaluation::{Evaluator, MaterialEvaluator, Score, DRAW_SCORE, MATE_SCORE, MATE_THRESHOLD};
use crate::move_generator::{generate, legal_moves};
use crate::piece::{Color, PieceType};
use crate::position::Position;
use crate::r#move::Move;
use crate::transposition_table::{Bound, TranspositionTable};

const INFINITY: Score = MATE_SCORE + 1;
/// Nodes with at least this much depth left always look at the clock
const CHECK_DEPTH: u8 = 2;
/// Shallower nodes only do so every that many nodes
const CHECK_INTERVAL: u64 = 1024;
const NULL_MOVE_MIN_DEPTH: u8 = 3;
const NULL_MOVE_REDUCTION: u8 = 2;

/// What bounds a search, every limit being optional.
/// Without any of them the search runs until stopped or `max_depth` is reached
#[derive(Clone, Debug, Default)]
pub struct SearchLimits {
    pub max_depth: Option<u8>,
    pub max_nodes: Option<u64>,
    pub max_time: Option<Duration>,
}
impl SearchLimits {
    pub fn set_depth(&mut self, value: Option<u8>) -> &mut Self {
        self.max_depth = value;
        self
    }
    pub fn set_nodes(&mut self, value: Option<u64>) -> &mut Self {
        self.max_nodes = value;
        self
    }
    pub fn set_time(&mut self, value: Option<Duration>) -> &mut Self {
        self.max_time = value;
        self
    }
    pub fn set_time_from_clock(&mut self, clock: Duration, increment: Option<Duration>) -> &mut Self {
        self.max_time = Some(Self::get_movetime(clock, increment));
        self
    }

    fn get_movetime(clock: Duration, increment: Option<Duration>) -> Duration {
        let movetime = clock / 50 + increment.map_or(Duration::ZERO, |inc| inc / 2);
        movetime.min(clock)
    }
}

/// Outcome of the deepest fully searched depth
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub depth: u8,
    /// White-positive
    pub score: Score,
    pub best_move: Option<Move>,
    pub principal_variation: Vec<Move>,
    pub nodes: u64,
    pub time: Duration,
    /// False when a deadline or a stop request cut the search short of its depth limit
    pub complete: bool,
}
impl SearchResult {
    /// Moves until mate, positive when White mates
    pub fn mate_in(&self) -> Option<i32> {
        if self.score > MATE_THRESHOLD {
            Some((MATE_SCORE - self.score + 1) / 2)
        } else if self.score < -MATE_THRESHOLD {
            Some(-(MATE_SCORE + self.score + 1) / 2)
        } else {
            None
        }
    }

    pub fn nps(&self) -> u64 {
        let secs = self.time.as_secs_f64();
        if secs > 0.0 {
            (self.nodes as f64 / secs) as u64
        } else {
            0
        }
    }
}

/// Iterative deepening alpha-beta search. The transposition table lives as
/// long as the searcher, so consecutive searches share it
pub struct Searcher<E: Evaluator = MaterialEvaluator> {
    transposition_table: TranspositionTable,
    evaluator: E,
}

impl Searcher<MaterialEvaluator> {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_evaluator(MaterialEvaluator, config)
    }
}

impl<E: Evaluator> Searcher<E> {
    pub fn with_evaluator(evaluator: E, config: &EngineConfig) -> Self {
        Searcher {
            transposition_table: TranspositionTable::with_megabytes(config.hash_mb),
            evaluator,
        }
    }

    pub fn resize(&mut self, hash_mb: usize) -> Result<(), TryReserveError> {
        self.transposition_table.resize(hash_mb)
    }

    pub fn clear(&mut self) {
        self.transposition_table.clear()
    }

    pub fn hashfull(&self) -> usize {
        self.transposition_table.hashfull()
    }

    pub fn search(
        &mut self,
        position: &Position,
        limits: &SearchLimits,
        config: &EngineConfig,
        stop: &AtomicBool,
    ) -> SearchResult {
        self.search_with_reporter(position, limits, config, stop, |_| ())
    }

    /// Searches the position, handing every completed depth to `reporter`
    pub fn search_with_reporter<F: FnMut(&SearchResult)>(
        &mut self,
        position: &Position,
        limits: &SearchLimits,
        config: &EngineConfig,
        stop: &AtomicBool,
        mut reporter: F,
    ) -> SearchResult {
        let start = Instant::now();
        let max_depth = limits.max_depth.unwrap_or(config.max_depth).clamp(1, config.max_depth.max(1));

        let mut context = SearchContext {
            transposition_table: &mut self.transposition_table,
            evaluator: &self.evaluator,
            config,
            stop,
            deadline: limits.max_time.map(|t| start + t),
            max_nodes: limits.max_nodes,
            nodes: 0,
            root_depth: 1,
            root_best_move: None,
            aborted: false,
        };

        let mut result = SearchResult {
            depth: 0,
            score: DRAW_SCORE,
            best_move: None,
            principal_variation: vec![],
            nodes: 0,
            time: Duration::ZERO,
            complete: true,
        };

        for depth in 1..=max_depth {
            context.root_depth = depth;
            if depth > 1 && context.out_of_budget() {
                result.complete = false;
                break;
            }

            context.root_best_move = None;
            let score = context.alpha_beta(position, depth, 0, -INFINITY, INFINITY, true);
            if context.aborted {
                result.complete = false;
                break;
            }

            result = SearchResult {
                depth,
                score,
                best_move: context.root_best_move,
                principal_variation: context.collect_pv(position, depth),
                nodes: context.nodes,
                time: start.elapsed(),
                complete: true,
            };
            reporter(&result);

            // Nothing to search, or a mate no deeper search can shorten
            let mate_found = result
                .mate_in()
                .map_or(false, |m| (m.unsigned_abs() * 2).saturating_sub(1) <= depth as u32);
            if result.best_move.is_none() || mate_found {
                break;
            }
        }

        result.nodes = context.nodes;
        result.time = start.elapsed();
        result
    }
}

struct SearchContext<'a, E: Evaluator> {
    transposition_table: &'a mut TranspositionTable,
    evaluator: &'a E,
    config: &'a EngineConfig,
    stop: &'a AtomicBool,
    deadline: Option<Instant>,
    max_nodes: Option<u64>,
    nodes: u64,
    root_depth: u8,
    root_best_move: Option<Move>,
    aborted: bool,
}

impl<'a, E: Evaluator> SearchContext<'a, E> {
    fn out_of_budget(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
            || self.deadline.map_or(false, |d| Instant::now() >= d)
            || self.max_nodes.map_or(false, |n| self.nodes >= n)
    }

    /// The first depth always runs to completion so that a move is always known
    fn should_abort(&mut self, depth: u8) -> bool {
        if self.aborted {
            return true;
        }
        if self.root_depth <= 1 {
            return false;
        }
        if depth < CHECK_DEPTH && self.nodes % CHECK_INTERVAL != 0 {
            return false;
        }
        self.aborted = self.out_of_budget();
        self.aborted
    }

    /// Minimax search with alpha-beta pruning. Scores are White-positive:
    /// White maximizes, Black minimizes
    fn alpha_beta(
        &mut self,
        position: &Position,
        depth: u8,
        ply: usize,
        mut alpha: Score,
        mut beta: Score,
        null_allowed: bool,
    ) -> Score {
        self.nodes += 1;
        if self.should_abort(depth) {
            return DRAW_SCORE;
        }
        let maximizing = position.turn() == Color::White;

        if ply > 0 && position.is_drawn() {
            return DRAW_SCORE;
        }

        let danger = attacks::king_danger(position, position.turn());
        let in_check = danger.is_set(position.king_square(position.turn()));
        let moves = generate(position, danger);
        if moves.is_empty() {
            return if !in_check {
                DRAW_SCORE
            } else if maximizing {
                -MATE_SCORE + ply as Score
            } else {
                MATE_SCORE - ply as Score
            };
        }
        if depth == 0 {
            return self.evaluator.evaluate(position, &moves, ply, danger, self.config);
        }

        let entry = self.transposition_table.probe(position.hash());
        if let (Some(entry), true) = (entry, ply > 0) {
            if entry.depth >= depth {
                let score = score_from_table(entry.score, ply);
                match entry.bound {
                    Bound::Exact => return score,
                    Bound::Lower => alpha = alpha.max(score),
                    Bound::Upper => beta = beta.min(score),
                }
                if alpha >= beta {
                    return score;
                }
            }
        }

        // Giving the opponent a free move: if our position still holds, it is likely to hold anyway
        if self.config.null_move_pruning
            && null_allowed
            && ply > 0
            && !in_check
            && depth >= NULL_MOVE_MIN_DEPTH
            && has_pieces(position, position.turn())
        {
            let reduced_depth = depth - 1 - NULL_MOVE_REDUCTION;
            let null_position = position.null_move();
            if maximizing {
                let score = self.alpha_beta(&null_position, reduced_depth, ply + 1, beta - 1, beta, false);
                if !self.aborted && score >= beta {
                    return beta;
                }
            } else {
                let score = self.alpha_beta(&null_position, reduced_depth, ply + 1, alpha, alpha + 1, false);
                if !self.aborted && score <= alpha {
                    return alpha;
                }
            }
            if self.aborted {
                return DRAW_SCORE;
            }
        }

        let (window_alpha, window_beta) = (alpha, beta);
        let mut best_score = if maximizing { -INFINITY } else { INFINITY };
        let mut best_move = None;
        for mv in moves.hash_move_first(entry.and_then(|e| e.best_move)) {
            let child = position.apply_move(mv);
            let score = self.alpha_beta(&child, depth - 1, ply + 1, alpha, beta, true);
            // A partially searched node is never stored
            if self.aborted {
                return DRAW_SCORE;
            }

            if maximizing {
                if score > best_score {
                    best_score = score;
                    best_move = Some(mv);
                }
                alpha = alpha.max(score);
            } else {
                if score < best_score {
                    best_score = score;
                    best_move = Some(mv);
                }
                beta = beta.min(score);
            }
            if alpha >= beta {
                break;
            }
        }

        let bound = if best_score >= window_beta {
            Bound::Lower
        } else if best_score <= window_alpha {
            Bound::Upper
        } else {
            Bound::Exact
        };
        self.transposition_table.store(
            position.hash(),
            best_move,
            depth,
            score_to_table(best_score, ply),
            bound,
        );
        if ply == 0 {
            self.root_best_move = best_move;
        }
        best_score
    }

    /// Follows the stored best moves from the root, as long as they are legal
    fn collect_pv(&self, root: &Position, depth: u8) -> Vec<Move> {
        let mut pv = Vec::with_capacity(depth as usize);
        let mut seen = Vec::with_capacity(depth as usize);
        let mut position = root.clone();
        let mut next = self.root_best_move;

        while let Some(mv) = next {
            if pv.len() >= depth as usize || seen.contains(&position.hash()) || !legal_moves(&position).contains(&mv) {
                break;
            }
            seen.push(position.hash());
            position = position.apply_move(mv);
            pv.push(mv);
            next = self
                .transposition_table
                .probe(position.hash())
                .and_then(|e| e.best_move);
        }
        pv
    }
}

/// Null moves are unsound in pawn endings, where zugzwang is common
fn has_pieces(position: &Position, color: Color) -> bool {
    [PieceType::Knight, PieceType::Bishop, PieceType::Rook, PieceType::Queen]
        .iter()
        .any(|pt| !position.piece_bitboard(*pt, color).is_empty())
}

/// Mate scores are stored relative to the node, not to the root
fn score_to_table(score: Score, ply: usize) -> Score {
    if score > MATE_THRESHOLD {
        score + ply as Score
    } else if score < -MATE_THRESHOLD {
        score - ply as Score
    } else {
        score
    }
}

fn score_from_table(score: Score, ply: usize) -> Score {
    if score > MATE_THRESHOLD {
        score - ply as Score
    } else if score < -MATE_THRESHOLD {
        score + ply as Score
    } else {
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitboard::Bitboard;
    use crate::movelist::MoveList;

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    fn depth_limit(depth: u8) -> SearchLimits {
        let mut limits = SearchLimits::default();
        limits.set_depth(Some(depth));
        limits
    }

    fn search(fen: &str, depth: u8) -> SearchResult {
        let config = EngineConfig::default().hash_mb(1);
        let mut searcher = Searcher::new(&config);
        searcher.search(&pos(fen), &depth_limit(depth), &config, &AtomicBool::new(false))
    }

    /// Leaf values derived from the position hash only
    struct HashEvaluator;
    impl Evaluator for HashEvaluator {
        fn evaluate(&self, pos: &Position, _: &MoveList, _: usize, _: Bitboard, _: &EngineConfig) -> Score {
            (pos.hash() % 2001) as Score - 1000
        }
    }

    /// Plain minimax over the same tree, without any pruning
    fn minimax(position: &Position, depth: u8, ply: usize) -> Score {
        let maximizing = position.turn() == Color::White;
        if ply > 0 && position.is_drawn() {
            return DRAW_SCORE;
        }
        let moves = legal_moves(position);
        if moves.is_empty() {
            return if !attacks::in_check(position, position.turn()) {
                DRAW_SCORE
            } else if maximizing {
                -MATE_SCORE + ply as Score
            } else {
                MATE_SCORE - ply as Score
            };
        }
        if depth == 0 {
            let danger = attacks::king_danger(position, position.turn());
            return HashEvaluator.evaluate(position, &moves, ply, danger, &EngineConfig::default());
        }
        let scores = moves.iter().map(|m| minimax(&position.apply_move(*m), depth - 1, ply + 1));
        if maximizing {
            scores.max().unwrap_or(-INFINITY)
        } else {
            scores.min().unwrap_or(INFINITY)
        }
    }

    #[test]
    fn pruning_never_changes_the_value() {
        let config = EngineConfig::default().hash_mb(1).null_move_pruning(false);
        let cases = [
            ("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 3),
            ("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1", 3),
            ("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", 4),
            ("r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1", 3),
        ];
        for (fen, max_depth) in cases {
            let position = pos(fen);
            for depth in 1..=max_depth {
                let mut searcher = Searcher::with_evaluator(HashEvaluator, &config);
                let result = searcher.search(&position, &depth_limit(depth), &config, &AtomicBool::new(false));
                assert_eq!(result.score, minimax(&position, depth, 0), "{} at depth {}", fen, depth);
                assert_eq!(result.depth, depth);
            }
        }
    }

    #[test]
    fn finds_mate_in_one() {
        let result = search("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", 3);
        assert_eq!(result.best_move.map(|m| m.to_string()), Some(String::from("a1a8")));
        assert_eq!(result.score, MATE_SCORE - 1);
        assert_eq!(result.mate_in(), Some(1));

        let result = search("r5k1/8/8/8/8/8/5PPP/6K1 b - - 0 1", 3);
        assert_eq!(result.best_move.map(|m| m.to_string()), Some(String::from("a8a1")));
        assert_eq!(result.score, -MATE_SCORE + 1);
        assert_eq!(result.mate_in(), Some(-1));
    }

    #[test]
    fn terminal_roots() {
        // stalemate
        let result = search("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", 4);
        assert_eq!((result.best_move, result.score), (None, DRAW_SCORE));
        assert!(result.complete);
        // black is already mated
        let result = search("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1", 4);
        assert_eq!((result.best_move, result.score), (None, MATE_SCORE));
    }

    #[test]
    fn fifty_move_rule_draws() {
        // every white move is quiet and reaches the hundredth reversible ply
        let result = search("4k3/8/8/8/8/8/8/Q3K3 w - - 99 80", 1);
        assert_eq!(result.score, DRAW_SCORE);
        assert!(result.best_move.is_some());
    }

    #[test]
    fn zero_budget_still_completes_depth_one() {
        let config = EngineConfig::default().hash_mb(1);
        let position = Position::starting();
        let mut limits = SearchLimits::default();
        limits.set_depth(Some(10)).set_time(Some(Duration::ZERO));

        let mut searcher = Searcher::new(&config);
        let result = searcher.search(&position, &limits, &config, &AtomicBool::new(false));
        assert_eq!(result.depth, 1);
        assert!(!result.complete);
        assert!(legal_moves(&position).contains(&result.best_move.unwrap()));
    }

    #[test]
    fn stop_flag_keeps_the_last_complete_depth() {
        let config = EngineConfig::default().hash_mb(1);
        let mut searcher = Searcher::new(&config);
        let stop = AtomicBool::new(true);
        let result = searcher.search(&Position::starting(), &depth_limit(6), &config, &stop);
        assert_eq!(result.depth, 1);
        assert!(result.best_move.is_some());
        assert!(!result.complete);
    }

    #[test]
    fn node_budget_stops_the_search() {
        let config = EngineConfig::default().hash_mb(1);
        let mut searcher = Searcher::new(&config);
        let mut limits = SearchLimits::default();
        limits.set_nodes(Some(5000));
        let result = searcher.search(&Position::starting(), &limits, &config, &AtomicBool::new(false));
        assert!(!result.complete);
        assert!(result.depth >= 1);
    }

    #[test]
    fn reporter_sees_every_depth() {
        let config = EngineConfig::default().hash_mb(1);
        let mut searcher = Searcher::new(&config);
        let position = pos("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let mut depths = vec![];
        let result = searcher.search_with_reporter(
            &position,
            &depth_limit(4),
            &config,
            &AtomicBool::new(false),
            |r| depths.push(r.depth),
        );
        assert_eq!(depths, vec![1, 2, 3, 4]);
        assert!(result.complete);

        // the principal variation is a legal line starting with the best move
        assert_eq!(result.principal_variation.first().copied(), result.best_move);
        let mut line = position.clone();
        for mv in &result.principal_variation {
            assert!(legal_moves(&line).contains(mv));
            line = line.apply_move(*mv);
        }
    }

    #[test]
    fn mate_scores_survive_the_table() {
        assert_eq!(score_from_table(score_to_table(MATE_SCORE - 7, 4), 2), MATE_SCORE - 5);
        assert_eq!(score_from_table(score_to_table(-MATE_SCORE + 3, 3), 1), -MATE_SCORE + 1);
        assert_eq!(score_from_table(score_to_table(250, 9), 1), 250);
    }

    #[test]
    fn movetime_from_clock() {
        assert_eq!(
            SearchLimits::get_movetime(Duration::from_secs(100), Some(Duration::from_secs(2))),
            Duration::from_secs(3)
        );
        assert_eq!(
            SearchLimits::get_movetime(Duration::from_millis(100), Some(Duration::from_secs(10))),
            Duration::from_millis(100)
        );
    }
}
