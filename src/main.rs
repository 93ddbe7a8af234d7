use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() {
    println!("remora v{}, by {}", env!("CARGO_PKG_VERSION"), env!("CARGO_PKG_AUTHORS"));

    let args: Vec<String> = std::env::args().collect();

    // Launches a perft test
    if args.get(1).map(String::as_str) == Some("perft") {
        let depth = match args.get(2).and_then(|d| d.parse::<usize>().ok()) {
            Some(d) => d,
            None => {
                eprintln!("Expected : perft <depth> [<FEN>]");
                std::process::exit(2)
            }
        };
        if let Err(err) = remora::perft(depth, args.get(3).cloned()) {
            eprintln!("{}", err);
            std::process::exit(1)
        }
    } else {
        // Normal UCI
        remora::uci::UCI::run()
    }
}
