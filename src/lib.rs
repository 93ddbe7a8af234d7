use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::error::{FenError, MoveError};
use crate::movelist::MoveList;
use crate::position::Position;
use crate::search::{SearchLimits, SearchResult, Searcher};

pub mod attacks;
pub mod bitboard;
pub mod castling;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod r#move;
pub mod move_generator;
pub mod movelist;
pub mod piece;
pub mod position;
pub mod search;
pub mod square;
pub mod transposition_table;
pub mod uci;
pub mod zobrist;

/// Parses a position from its FEN record
///
/// ```
/// let pos = remora::parse_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
/// assert_eq!(remora::legal_moves(&pos).len(), 6);
/// ```
pub fn parse_fen(fen: &str) -> Result<Position, FenError> {
    Position::from_fen(fen)
}

pub fn to_fen(pos: &Position) -> String {
    pos.to_fen()
}

/// Plays a move given in coordinate notation, `e2e4` or `e7e8q`
///
/// ```
/// let pos = remora::position::Position::starting();
/// let next = remora::apply_uci_move(&pos, "e2e4").unwrap();
/// assert_eq!(
///     remora::to_fen(&next),
///     "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
/// );
/// assert!(remora::apply_uci_move(&next, "e2e4").is_err());
/// ```
pub fn apply_uci_move(pos: &Position, mv: &str) -> Result<Position, MoveError> {
    pos.apply_uci_move(mv)
}

pub fn legal_moves(pos: &Position) -> MoveList {
    move_generator::legal_moves(pos)
}

/// One-shot search with the default configuration and a fresh table.
/// Setting `cancel` makes the search return its last completed depth.
pub fn search(
    pos: &Position,
    depth_limit: Option<u8>,
    time_limit: Option<Duration>,
    cancel: &AtomicBool,
) -> SearchResult {
    let config = EngineConfig::default();
    let mut limits = SearchLimits::default();
    limits.set_depth(depth_limit).set_time(time_limit);
    Searcher::new(&config).search(pos, &limits, &config, cancel)
}

/// Prints the perft counts of a FEN, the starting position by default
pub fn perft(depth: usize, fen: Option<String>) -> Result<(), FenError> {
    let pos = match fen {
        None => Position::starting(),
        Some(f) => Position::from_fen(&f)?,
    };
    print_perft(&pos, depth);
    Ok(())
}

pub fn print_perft(pos: &Position, depth: usize) {
    println!("perft");
    println!("{}\n", pos);
    println!("depth nodes\n--------");
    for d in 0..depth + 1 {
        let start = Instant::now();
        let nodes = move_generator::perft(pos, d);
        let elapsed = start.elapsed();
        println!(
            "{}     {} ({}s, {} nps)",
            d,
            nodes,
            elapsed.as_secs_f32(),
            nodes as f32 / elapsed.as_secs_f32()
        );
    }
}
