use thiserror::Error;

/// Reasons a FEN string can be rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("missing FEN field: {0}")]
    MissingField(&'static str),

    #[error("invalid piece placement: {0}")]
    BadPlacement(String),

    #[error("invalid side to move: {0}")]
    BadSideToMove(String),

    #[error("invalid castling rights: {0}")]
    BadCastling(String),

    #[error("invalid en passant square: {0}")]
    BadEnPassant(String),

    #[error("invalid move counter: {0}")]
    BadCounter(String),

    #[error("each side needs exactly one king")]
    KingCount,

    #[error("the side that just moved is left in check")]
    OpponentInCheck,

    #[error("unexpected text after the move counters: {0}")]
    TrailingInput(String),
}

/// Reasons a coordinate notation move can be rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("badly formatted move: {0}")]
    BadFormat(String),

    #[error("illegal move: {0}")]
    Illegal(String),
}
