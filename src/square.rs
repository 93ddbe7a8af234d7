/// Squares are indexed `rank * 8 + file`, a1 being 0 and h8 being 63
pub type Square = usize;

pub const A1: Square = 0;
pub const B1: Square = 1;
pub const C1: Square = 2;
pub const D1: Square = 3;
pub const E1: Square = 4;
pub const F1: Square = 5;
pub const G1: Square = 6;
pub const H1: Square = 7;
pub const A8: Square = 56;
pub const B8: Square = 57;
pub const C8: Square = 58;
pub const D8: Square = 59;
pub const E8: Square = 60;
pub const F8: Square = 61;
pub const G8: Square = 62;
pub const H8: Square = 63;

#[inline(always)]
pub fn rank_of(sq: Square) -> usize {
    sq / 8
}
#[inline(always)]
pub fn file_of(sq: Square) -> usize {
    sq % 8
}
#[inline(always)]
pub fn square_at(rank: usize, file: usize) -> Square {
    rank * 8 + file
}

/// Parses a square from a given string slice,
/// only caring that the first two characters form a valid square representation
/// ```
/// use remora::square::parse_square;
/// assert_eq!(parse_square("e4"), Some(28));
/// assert_eq!(parse_square("d2someotherstuff"), Some(11));
/// assert_eq!(parse_square("randoma1stuff"), None);
/// assert_eq!(parse_square("k9"), None);
/// ```
pub fn parse_square(s: &str) -> Option<Square> {
    let mut chars = s.chars();
    let file = match chars.next()? {
        c @ 'a'..='h' => c as usize - 'a' as usize,
        _ => return None,
    };
    let rank = match chars.next()?.to_digit(10) {
        Some(r) if (1..=8).contains(&r) => r as usize - 1,
        _ => return None,
    };
    Some(square_at(rank, file))
}

/// Returns the coordinate representation of a square
/// ```
/// use remora::square::square_representation;
/// assert_eq!(square_representation(28), Some(String::from("e4")));
/// assert_eq!(square_representation(11), Some(String::from("d2")));
/// assert_eq!(square_representation(65), None);
/// ```
pub fn square_representation(sq: Square) -> Option<String> {
    (sq < 64).then(|| format!("{}{}", (b'a' + file_of(sq) as u8) as char, rank_of(sq) + 1))
}
