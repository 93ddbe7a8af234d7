use crate::r#move::Move;
use arrayvec::ArrayVec;

/// No legal position has more than 218 moves
pub const MAX_MOVELIST_CAPACITY: usize = 255;

#[derive(Clone, Debug)]
pub struct MoveList(ArrayVec<Move, MAX_MOVELIST_CAPACITY>);
impl Default for MoveList {
    fn default() -> Self {
        MoveList(ArrayVec::new())
    }
}
impl MoveList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn push(&mut self, m: Move) {
        self.0.push(m)
    }
    pub fn get(&self, i: usize) -> Option<&Move> {
        self.0.get(i)
    }
    pub fn contains(&self, m: &Move) -> bool {
        self.0.contains(m)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.0.iter()
    }

    /// Iterates with the hash move first, when it belongs to the list,
    /// then every other move in generation order
    pub fn hash_move_first(&self, hash_move: Option<Move>) -> HashMoveFirstIter<'_> {
        HashMoveFirstIter::new(self, hash_move.filter(|m| self.contains(m)))
    }
}
impl std::fmt::Display for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        let moves: Vec<String> = self.0.iter().map(Move::to_string).collect();
        write!(f, "{}", moves.join(" "))
    }
}
impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct HashMoveFirstIter<'a> {
    first: Option<Move>,
    skipped: Option<Move>,
    rest: std::slice::Iter<'a, Move>,
}
impl<'a> HashMoveFirstIter<'a> {
    fn new(move_list: &'a MoveList, hash_move: Option<Move>) -> Self {
        HashMoveFirstIter {
            first: hash_move,
            skipped: hash_move,
            rest: move_list.iter(),
        }
    }
}
impl<'a> Iterator for HashMoveFirstIter<'a> {
    type Item = Move;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(first) = self.first.take() {
            return Some(first);
        }
        let skipped = self.skipped;
        self.rest.by_ref().find(|m| Some(**m) != skipped).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(moves: &[(usize, usize)]) -> MoveList {
        let mut l = MoveList::default();
        for (o, t) in moves {
            l.push(Move::new(*o, *t))
        }
        l
    }

    #[test]
    fn hash_move_comes_first_once() {
        let l = list(&[(12, 28), (11, 27), (6, 21)]);
        let order: Vec<Move> = l.hash_move_first(Some(Move::new(6, 21))).collect();
        assert_eq!(order, vec![Move::new(6, 21), Move::new(12, 28), Move::new(11, 27)]);
    }

    #[test]
    fn unknown_hash_move_is_ignored() {
        let l = list(&[(12, 28), (11, 27)]);
        let order: Vec<Move> = l.hash_move_first(Some(Move::new(1, 18))).collect();
        assert_eq!(order, vec![Move::new(12, 28), Move::new(11, 27)]);
        assert_eq!(l.hash_move_first(None).count(), 2);
        assert_eq!(l.to_string(), "e2e4 d2d4");
    }
}
