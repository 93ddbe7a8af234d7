use criterion::{criterion_group, criterion_main, Criterion};
use remora::move_generator::legal_moves;
use remora::position::Position;

// Move generation and move application only, no node counting
fn perft(pos: &Position, depth: u64) {
    if depth == 0 {
        return;
    }
    for m in &legal_moves(pos) {
        perft(&pos.apply_move(*m), depth - 1);
    }
}

fn perft_bench(c: &mut Criterion) {
    // Positions from https://www.chessprogramming.org/Perft_Results
    let fens = [
        ("initial", "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
        ("kiwipete", "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"),
        ("alternative", "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10"),
    ];
    for (name, fen) in fens {
        let pos = Position::from_fen(fen).unwrap();
        c.bench_function(&format!("perft {} 4", name), |b| b.iter(|| perft(&pos, 4)));
    }
}

criterion_group!(benches, perft_bench);
criterion_main!(benches);
