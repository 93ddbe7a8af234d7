use rand_mt::Mt64;
use std::env;
use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

// (file, rank) steps. The index is the direction number used by `Bitboard`:
// east, west, north, south, north-west, south-east, north-east, south-west.
// Even directions go towards higher square indices.
const DIRECTIONS: [(i32, i32); 8] = [(1, 0), (-1, 0), (0, 1), (0, -1), (-1, 1), (1, -1), (1, 1), (-1, -1)];
const KNIGHT_JUMPS: [(i32, i32); 8] = [(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)];

// 12*64 piece-square keys, side to move, 4 castling rights, 8 en passant files
const ZOBRIST_KEY_COUNT: usize = 781;

fn main() -> io::Result<()> {
    let out_dir = env::var_os("OUT_DIR").ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "OUT_DIR"))?;

    let rays = rays();
    let mut lookup = BufWriter::new(File::create(Path::new(&out_dir).join("lookup.rs"))?);
    writeln!(lookup, "impl Bitboard {{")?;
    write_table(&mut lookup, "KNIGHT_ATTACKS: [Bitboard; 64]", &leaper_attacks(&KNIGHT_JUMPS))?;
    write_table(&mut lookup, "KING_ATTACKS: [Bitboard; 64]", &leaper_attacks(&DIRECTIONS))?;
    write_nested_table(&mut lookup, "RAYS: [[Bitboard; 64]; 8]", &rays)?;
    write_nested_table(&mut lookup, "ORIGIN_TARGET_RAYS: [[Bitboard; 64]; 64]", &origin_target_rays(&rays))?;
    writeln!(lookup, "}}")?;

    let mut rng = Mt64::new_unseeded();
    let keys: Vec<String> = (0..ZOBRIST_KEY_COUNT).map(|_| rng.next_u64().to_string()).collect();
    let mut zobrist = BufWriter::new(File::create(Path::new(&out_dir).join("zobrist_keys.rs"))?);
    writeln!(zobrist, "impl ZobristHasher {{")?;
    writeln!(zobrist, "pub const ZOBRIST_KEYS: [u64; {}] = [{}];", ZOBRIST_KEY_COUNT, keys.join(", "))?;
    writeln!(zobrist, "}}")?;

    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}

fn step(square: usize, (df, dr): (i32, i32)) -> Option<usize> {
    let file = (square % 8) as i32 + df;
    let rank = (square / 8) as i32 + dr;
    if (0..8).contains(&file) && (0..8).contains(&rank) {
        Some((rank * 8 + file) as usize)
    } else {
        None
    }
}

fn leaper_attacks(offsets: &[(i32, i32)]) -> Vec<u64> {
    (0..64)
        .map(|sq| {
            offsets
                .iter()
                .filter_map(|&offset| step(sq, offset))
                .fold(0u64, |acc, target| acc | 1 << target)
        })
        .collect()
}

/// Every square reachable from the origin in one direction, on an empty board
fn rays() -> Vec<Vec<u64>> {
    DIRECTIONS
        .iter()
        .map(|&direction| {
            (0..64)
                .map(|origin| {
                    let mut ray = 0u64;
                    let mut current = origin;
                    while let Some(next) = step(current, direction) {
                        ray |= 1 << next;
                        current = next;
                    }
                    ray
                })
                .collect()
        })
        .collect()
}

/// Squares strictly between origin and target, plus the target itself.
/// Empty when both squares do not share a line.
fn origin_target_rays(rays: &[Vec<u64>]) -> Vec<Vec<u64>> {
    (0..64)
        .map(|origin| {
            (0..64)
                .map(|target| {
                    rays.iter()
                        .find(|ray| ray[origin] & (1 << target) != 0)
                        .map_or(0, |ray| ray[origin] & !ray[target])
                })
                .collect()
        })
        .collect()
}

fn bitboards<T: Display>(values: &[T]) -> String {
    let items: Vec<String> = values.iter().map(|v| format!("Bitboard({})", v)).collect();
    format!("[{}]", items.join(", "))
}

fn write_table(out: &mut impl Write, declaration: &str, values: &[u64]) -> io::Result<()> {
    writeln!(out, "pub const {} = {};", declaration, bitboards(values))
}

fn write_nested_table(out: &mut impl Write, declaration: &str, values: &[Vec<u64>]) -> io::Result<()> {
    let rows: Vec<String> = values.iter().map(|row| bitboards(row)).collect();
    writeln!(out, "pub const {} = [\n{}\n];", declaration, rows.join(",\n"))
}
