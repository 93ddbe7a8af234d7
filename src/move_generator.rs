use crate::{
    attacks,
    bitboard::Bitboard,
    castling::{CastleSide, CastlingRights},
    movelist::MoveList,
    piece::{Color, PieceType},
    position::Position,
    r#move::Move,
    square::{rank_of, Square},
};

struct MoveGenInfo {
    pub move_list: MoveList,
    pub king_square: Square,
    pub side: Color,
    pub occupancy: Bitboard,
    pub friendly: Bitboard,
    pub opponents: Bitboard,
    /// Destinations resolving the current check, every square when not in check
    pub evasion_mask: Bitboard,
    /// Own pieces sharing a line with the king, the only ones that can be pinned
    pub pin_candidates: Bitboard,
}

/// Legal moves of the side to move
pub fn legal_moves(pos: &Position) -> MoveList {
    generate(pos, attacks::king_danger(pos, pos.turn()))
}

/// Generates every legal move given the squares the king cannot step on.
///
/// `opponent_attacks` must be computed with the moving king removed from the
/// board, as `attacks::king_danger` does, otherwise the king could retreat
/// along the line of a checking slider.
pub fn generate(pos: &Position, opponent_attacks: Bitboard) -> MoveList {
    let side = pos.turn();
    let king_square = pos.king_square(side);
    let friendly = pos.color_bitboard(side);
    let mut info = MoveGenInfo {
        move_list: MoveList::default(),
        king_square,
        side,
        occupancy: pos.occupancy(),
        friendly,
        opponents: pos.color_bitboard(side.opposite()),
        evasion_mask: Bitboard::UNIVERSE,
        pin_candidates: Bitboard::slider_attacks(PieceType::Queen, king_square, Bitboard::EMPTY) & friendly,
    };

    king_moves(opponent_attacks, &mut info);

    let (checkers, checker_count) = attacks::checkers(pos, side);
    if checker_count > 1 {
        // Only the king can get out of a double check
        return info.move_list;
    }
    if let Some(checker_square) = checkers.ls1b() {
        info.evasion_mask = Bitboard::from_square(checker_square);
        if pos.piece_on(checker_square).map_or(false, |p| p.piece_type.can_slide()) {
            info.evasion_mask |= Bitboard::get_ray(king_square, checker_square);
        }
    } else {
        castling(pos, opponent_attacks, &mut info);
    }

    for piece_type in [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
    ] {
        piece_moves(pos, piece_type, &mut info);
    }
    en_passant(pos, &mut info);

    info.move_list
}

fn king_moves(opponent_attacks: Bitboard, info: &mut MoveGenInfo) {
    let targets = Bitboard::KING_ATTACKS[info.king_square] & !info.friendly & !opponent_attacks;
    for target in targets {
        info.move_list.push(Move::new(info.king_square, target))
    }
}

fn piece_moves(pos: &Position, piece_type: PieceType, info: &mut MoveGenInfo) {
    let in_check = info.evasion_mask != Bitboard::UNIVERSE;
    for origin in pos.piece_bitboard(piece_type, info.side) {
        let mut allowed = info.evasion_mask & !info.friendly;
        if info.pin_candidates.is_set(origin) {
            if let Some(pin_ray) = attacks::pinned(pos, info.king_square, origin) {
                // A pinned piece never resolves a check, and a pinned knight never moves
                if in_check || piece_type == PieceType::Knight {
                    continue;
                }
                allowed &= pin_ray;
            }
        }

        let targets = match piece_type {
            PieceType::Pawn => pawn_targets(origin, info),
            PieceType::Knight => Bitboard::KNIGHT_ATTACKS[origin],
            _ => Bitboard::slider_attacks(piece_type, origin, info.occupancy),
        } & allowed;

        for target in targets {
            if piece_type == PieceType::Pawn && rank_of(target) == info.side.promotion_rank() {
                for promotion in Move::all_promotions(origin, target) {
                    info.move_list.push(promotion)
                }
            } else {
                info.move_list.push(Move::new(origin, target))
            }
        }
    }
}

/// Pushes and captures of a single pawn, en passant aside
fn pawn_targets(origin: Square, info: &MoveGenInfo) -> Bitboard {
    let pawn = Bitboard::from_square(origin);
    let empty = !info.occupancy;
    let single = Bitboard::pawn_pushes(pawn, empty, info.side);
    let double = if rank_of(origin) == info.side.pawn_rank() {
        Bitboard::pawn_pushes(single, empty, info.side)
    } else {
        Bitboard::EMPTY
    };
    let captures = Bitboard::pawn_attacks(pawn, info.side) & info.opponents;
    single | double | captures
}

/// En passant captures are checked by replaying the occupancy change, which
/// covers pinned pawns as well as the two pawns leaving the king's rank at once
fn en_passant(pos: &Position, info: &mut MoveGenInfo) {
    let target = match pos.en_passant() {
        Some(sq) => sq,
        None => return,
    };
    let them = info.side.opposite();
    let victim = match info.side {
        Color::White => target - 8,
        Color::Black => target + 8,
    };
    if !pos.piece_bitboard(PieceType::Pawn, them).is_set(victim) || info.occupancy.is_set(target) {
        return;
    }
    if !info.evasion_mask.is_set(target) && !info.evasion_mask.is_set(victim) {
        return;
    }

    let origins = Bitboard::pawn_attacks(Bitboard::from_square(target), them)
        & pos.piece_bitboard(PieceType::Pawn, info.side);
    for origin in origins {
        let occupancy = (info.occupancy ^ Bitboard::from_squares(&[origin, victim])) | Bitboard::from_square(target);
        let exposed = (Bitboard::bishop_attacks(info.king_square, occupancy) & pos.diagonal_sliders(them))
            | (Bitboard::rook_attacks(info.king_square, occupancy) & pos.orthogonal_sliders(them));
        if exposed.is_empty() {
            info.move_list.push(Move::new(origin, target))
        }
    }
}

fn castling(pos: &Position, opponent_attacks: Bitboard, info: &mut MoveGenInfo) {
    let rooks = pos.piece_bitboard(PieceType::Rook, info.side);
    for castle in [CastleSide::King, CastleSide::Queen] {
        if !pos.castling().has(info.side, castle) {
            continue;
        }
        let path = CastlingRights::path(info.side, castle);
        if info.king_square != path.king_from || !rooks.is_set(path.rook_from) {
            continue;
        }
        let blocked = path.empty.iter().any(|sq| info.occupancy.is_set(*sq));
        let attacked = path.safe.iter().any(|sq| opponent_attacks.is_set(*sq));
        if !blocked && !attacked {
            info.move_list.push(Move::new(path.king_from, path.king_to))
        }
    }
}

/// Counts the leaf nodes of the legal move tree
pub fn perft(pos: &Position, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = legal_moves(pos);
    if depth == 1 {
        return moves.len() as u64;
    }
    moves.iter().map(|m| perft(&pos.apply_move(*m), depth - 1)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    fn move_strings(pos: &Position) -> Vec<String> {
        let mut moves: Vec<String> = legal_moves(pos).iter().map(Move::to_string).collect();
        moves.sort();
        moves
    }

    #[test]
    fn starting_position_to_depth_five() {
        let start = Position::starting();
        for (depth, expected) in [20, 400, 8902, 197281, 4865609].iter().enumerate() {
            assert_eq!(perft(&start, depth + 1), *expected);
        }
    }

    // Depth 4 is enough for the positions below to exercise every kind of move
    const TEST_POSITIONS: [(&str, [u64; 4]); 6] = [
        (
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            [48, 2039, 97862, 4085603],
        ),
        (
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            [14, 191, 2812, 43238],
        ),
        (
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            [6, 264, 9467, 422333],
        ),
        (
            "r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1",
            [6, 264, 9467, 422333],
        ),
        (
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            [44, 1486, 62379, 2103487],
        ),
        (
            "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
            [46, 2079, 89890, 3894594],
        ),
    ];

    #[test]
    fn perft_verification() {
        for (fen, results) in TEST_POSITIONS {
            let position = pos(fen);
            for d in 1..=4 {
                assert_eq!(results[d - 1], perft(&position, d), "{} at depth {}", fen, d)
            }
        }
    }

    #[test]
    fn double_check_allows_king_moves_only() {
        // rook on e8 and knight on d3 both check the white king
        let p = pos("4r1k1/8/8/8/8/3n4/8/R3K2R w KQ - 0 1");
        assert_eq!(attacks::checkers(&p, Color::White).1, 2);
        let moves = legal_moves(&p);
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|m| m.origin() == 4));
    }

    #[test]
    fn checkmate_is_an_empty_list() {
        // the rook on e1 checks along the first rank, nothing can block or take it
        let p = pos("4k3/8/8/8/8/8/5PPP/4r1KN w - - 0 1");
        assert!(legal_moves(&p).is_empty());
        // rook and knight check together, the king escapes to f2
        let p = pos("6k1/8/8/8/8/5n2/6PP/3r2K1 w - - 0 1");
        assert_eq!(attacks::checkers(&p, Color::White).1, 2);
        assert_eq!(move_strings(&p), vec!["g1f2"]);
    }

    #[test]
    fn single_check_resolutions() {
        // bishop b4 checks e1: take it, block on c3 or d2, or step aside
        let p = pos("4k3/8/8/8/1b2N3/8/N7/4K3 w - - 0 1");
        assert_eq!(
            move_strings(&p),
            vec!["a2b4", "a2c3", "e1d1", "e1e2", "e1f1", "e1f2", "e4c3", "e4d2"]
        );
    }

    #[test]
    fn check_evasions_by_block() {
        // rook e8 checks along the e-file, only the bishop can interpose
        let p = pos("4r1k1/8/8/8/8/8/8/R1B1K3 w - - 0 1");
        let moves = move_strings(&p);
        assert!(moves.contains(&String::from("c1e3")));
        assert!(!moves.contains(&String::from("c1d2")));
        assert!(!moves.contains(&String::from("e1e2")));
        assert!(moves.iter().all(|m| m == "c1e3" || m.starts_with("e1")));
    }

    #[test]
    fn king_cannot_retreat_along_the_checking_ray() {
        let p = pos("7k/8/8/8/r3K3/8/8/8 w - - 0 1");
        let moves = move_strings(&p);
        assert!(!moves.contains(&String::from("e4f4")));
        assert!(!moves.contains(&String::from("e4d4")));
        assert!(moves.contains(&String::from("e4e5")));
    }

    #[test]
    fn pinned_bishop_stays_on_its_diagonal() {
        let p = pos("4k3/8/8/8/1b6/8/3B4/4K3 w - - 0 1");
        let bishop_moves: Vec<String> = move_strings(&p).into_iter().filter(|m| m.starts_with("d2")).collect();
        assert_eq!(bishop_moves, vec!["d2b4", "d2c3"]);
    }

    #[test]
    fn pinned_knight_is_immobile() {
        let p = pos("4k3/4r3/8/8/8/8/4N3/4K3 w - - 0 1");
        assert!(!move_strings(&p).iter().any(|m| m.starts_with("e2")));
    }

    #[test]
    fn pinned_pawn_can_push_along_the_pin() {
        let p = pos("4r1k1/8/8/8/8/8/4P3/4K3 w - - 0 1");
        let pawn_moves: Vec<String> = move_strings(&p).into_iter().filter(|m| m.starts_with("e2")).collect();
        assert_eq!(pawn_moves, vec!["e2e3", "e2e4"]);
    }

    #[test]
    fn en_passant_exposing_the_king_is_illegal() {
        // both pawns leave the fifth rank, uncovering the rook on h5
        let p = pos("8/8/8/K2pP2r/8/8/8/7k w - d6 0 1");
        assert!(!move_strings(&p).contains(&String::from("e5d6")));
        let p = pos("8/8/8/K2pP3/8/8/8/7k w - d6 0 1");
        assert!(move_strings(&p).contains(&String::from("e5d6")));
    }

    #[test]
    fn en_passant_captures_a_checking_pawn() {
        let p = pos("8/8/8/2k5/3Pp3/8/8/4K3 b - d3 0 1");
        let moves = move_strings(&p);
        assert!(moves.contains(&String::from("e4d3")));
        assert!(moves.iter().all(|m| m == "e4d3" || m.starts_with("c5")));
    }

    #[test]
    fn promotions_come_in_four() {
        let p = pos("3n3k/4P3/8/8/8/8/8/K7 w - - 0 1");
        let moves = move_strings(&p);
        for m in ["e7e8q", "e7e8r", "e7e8b", "e7e8n", "e7d8q", "e7d8n"] {
            assert!(moves.contains(&String::from(m)), "{} missing", m);
        }
        assert!(!moves.contains(&String::from("e7e8")));
    }

    #[test]
    fn castling_conditions() {
        let open = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let moves = move_strings(&open);
        assert!(moves.contains(&String::from("e1g1")) && moves.contains(&String::from("e1c1")));

        // f1 is attacked by the rook on f8, the queen side stays available
        let crossing = pos("r3kr2/8/8/8/8/8/8/R3K2R w KQq - 0 1");
        let moves = move_strings(&crossing);
        assert!(!moves.contains(&String::from("e1g1")) && moves.contains(&String::from("e1c1")));

        // b1 may be attacked, but not occupied
        let b_file = pos("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
        assert!(move_strings(&b_file).contains(&String::from("e1c1")));
        let blocked = pos("4k3/8/8/8/8/8/8/RN2K3 w Q - 0 1");
        assert!(!move_strings(&blocked).contains(&String::from("e1c1")));

        // never out of check
        let checked = pos("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!move_strings(&checked).iter().any(|m| m == "e1g1" || m == "e1c1"));
    }

    // No generated move may leave the own king attacked
    #[test]
    fn random_playouts_never_leave_the_king_in_check() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..30 {
            let mut position = Position::starting();
            for _ in 0..150 {
                let moves = legal_moves(&position);
                if moves.is_empty() {
                    break;
                }
                let (_, checker_count) = attacks::checkers(&position, position.turn());
                for m in &moves {
                    let next = position.apply_move(*m);
                    assert!(!attacks::in_check(&next, position.turn()), "{} after {}", m, position.to_fen());
                    if checker_count > 1 {
                        assert_eq!(m.origin(), position.king_square(position.turn()));
                    }
                }
                position = position.apply_move(*moves.get(rng.gen_range(0..moves.len())).unwrap());
            }
        }
    }
}
