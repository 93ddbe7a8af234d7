use crate::config::EngineConfig;
use crate::error::{FenError, MoveError};
use crate::piece::Color;
use crate::position::Position;
use crate::r#move::Move;
use crate::search::{SearchLimits, SearchResult, Searcher};

use regex::Regex;
use rustyline::config::Configurer;
use rustyline::Editor;
use std::collections::HashMap;
use std::fmt::{Display, Error, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A running search, and the handle used to stop it
struct Worker {
    handle: JoinHandle<SearchResult>,
    stop_handle: Arc<AtomicBool>,
}

pub struct UCI {
    position: Position,
    config: EngineConfig,
    searcher: Arc<Mutex<Searcher>>,
    worker: Option<Worker>,
    options: Vec<UCIOption>,
    last_result: Option<SearchResult>,
}
impl Default for UCI {
    fn default() -> Self {
        let config = EngineConfig::default();
        UCI {
            position: Position::starting(),
            searcher: Arc::new(Mutex::new(Searcher::new(&config))),
            worker: None,
            options: vec![
                UCIOption::IntValue {
                    name: "Hash".to_string(),
                    value: config.hash_mb as i32,
                    default: config.hash_mb as i32,
                    min: *EngineConfig::HASH_MB_RANGE.start() as i32,
                    max: *EngineConfig::HASH_MB_RANGE.end() as i32,
                },
                UCIOption::IntValue {
                    name: "EvalMaterial".to_string(),
                    value: config.eval_material,
                    default: config.eval_material,
                    min: *EngineConfig::EVAL_MATERIAL_RANGE.start(),
                    max: *EngineConfig::EVAL_MATERIAL_RANGE.end(),
                },
                UCIOption::BoolValue {
                    name: "NullMove".to_string(),
                    value: config.null_move_pruning,
                    default: config.null_move_pruning,
                },
                UCIOption::Button {
                    name: "Clear Hash".to_string(),
                },
            ],
            config,
            last_result: None,
        }
    }
}

impl UCI {
    pub fn run() {
        let mut uci = UCI::default();
        let mut editor = Editor::<()>::new();
        editor.set_auto_add_history(true);
        editor.set_check_cursor_position(true);

        while let Ok(line) = editor.readline("") {
            match uci.handle_command(&line) {
                Ok(UCIOkCode::ShouldQuit) => break,
                Err(UCIErrCode::BadCommand(cmd)) => {
                    eprintln!("Unknown or badly formed UCI command: {}", cmd)
                }
                Err(UCIErrCode::BadMove(err)) => eprintln!("{}", err),
                Err(UCIErrCode::BadFen(err)) => eprintln!("{}", err),
                Err(UCIErrCode::MissingArg(arg)) => {
                    eprintln!("Missing an argument: {} {} <- here", line.trim(), arg)
                }
                _ => (),
            }
        }
        uci.stop_search();
    }

    fn handle_command(&mut self, line: &str) -> Result<UCIOkCode, UCIErrCode> {
        let args_regex = Self::args_regex();
        let args: Vec<&str> = args_regex.find_iter(line).map(|m| m.as_str()).collect();
        let (cmd, args) = match args.split_first() {
            Some((cmd, args)) => (*cmd, args),
            None => return Err(UCIErrCode::NoCommand),
        };
        match cmd {
            "uci" => {
                Self::send(UCICommand::Id);
                self.options
                    .iter()
                    .for_each(|o| Self::send(UCICommand::UciOption(o)));
                Self::send(UCICommand::UciOk);
            }
            "isready" => Self::send(UCICommand::ReadyOk),
            "setoption" => self.set_option(args)?,
            "ucinewgame" => {
                self.stop_search();
                self.position = Position::starting();
                self.lock_searcher().clear();
            }
            "position" => self.set_position(args)?,
            "go" => {
                let limits = self.parse_go_args(args);
                self.start_search(limits)
            }
            "stop" => self.stop_search(),
            // Commands that are not part of the UCI protocol
            "d" => println!("{}", self.position),
            "perft" => {
                let depth = args
                    .first()
                    .and_then(|d| d.parse::<usize>().ok())
                    .ok_or_else(|| UCIErrCode::MissingArg(String::from("<depth>")))?;
                crate::print_perft(&self.position, depth)
            }
            "quit" => return Ok(UCIOkCode::ShouldQuit),
            _ => return Err(UCIErrCode::BadCommand(String::from(cmd))),
        }

        Ok(UCIOkCode::OkCommand)
    }

    fn set_position(&mut self, args: &[&str]) -> Result<(), UCIErrCode> {
        let moves_index = args.iter().position(|a| *a == "moves").unwrap_or(args.len());
        let mut position = match args.first() {
            Some(&"startpos") => Position::starting(),
            Some(&"fen") => {
                let fen = args[1..moves_index].join(" ").replace('"', "");
                Position::from_fen(&fen).map_err(UCIErrCode::BadFen)?
            }
            _ => return Err(UCIErrCode::MissingArg(String::from("<startpos | fen>"))),
        };
        for mv in args.iter().skip(moves_index + 1) {
            position = position.apply_uci_move(mv).map_err(UCIErrCode::BadMove)?;
        }
        self.position = position;
        Ok(())
    }

    fn set_option(&mut self, args: &[&str]) -> Result<(), UCIErrCode> {
        // Option names may contain spaces: everything between `name` and `value`
        let value_index = args.iter().position(|a| *a == "value").unwrap_or(args.len());
        let name = match args.first() {
            Some(&"name") => args[1..value_index].join(" "),
            _ => return Err(UCIErrCode::MissingArg(String::from("name <id>"))),
        };
        let value = args.get(value_index + 1..).map(|v| v.join(" "));

        let option = self
            .options
            .iter_mut()
            .find(|o| o.name().eq_ignore_ascii_case(&name))
            .ok_or_else(|| UCIErrCode::BadCommand(format!("setoption name {}", name)))?;
        match (option, value) {
            (UCIOption::Button { .. }, _) => {}
            (option, Some(v)) => option.set_value(&v),
            (_, None) => return Err(UCIErrCode::MissingArg(String::from("value <x>"))),
        }
        self.apply_option(&name);
        Ok(())
    }

    /// Copies an option into the engine configuration.
    /// The table is only touched once the running search, which holds it, has stopped
    fn apply_option(&mut self, name: &str) {
        let option = match self.options.iter().find(|o| o.name().eq_ignore_ascii_case(name)) {
            Some(o) => o.clone(),
            None => return,
        };
        match option {
            UCIOption::IntValue { name, value, .. } if name == "Hash" => {
                let hash_mb = self.config.clone().hash_mb(value as usize).hash_mb;
                self.stop_search();
                let resized = self.lock_searcher().resize(hash_mb);
                match resized {
                    Ok(()) => self.config = self.config.clone().hash_mb(hash_mb),
                    Err(err) => {
                        eprintln!("Could not allocate a {} MB table: {}", hash_mb, err);
                        let previous = self.config.hash_mb.to_string();
                        if let Some(o) = self.options.iter_mut().find(|o| o.name() == name) {
                            o.set_value(&previous)
                        }
                    }
                }
            }
            UCIOption::IntValue { name, value, .. } if name == "EvalMaterial" => {
                self.config = self.config.clone().eval_material(value);
            }
            UCIOption::BoolValue { name, value, .. } if name == "NullMove" => {
                self.config = self.config.clone().null_move_pruning(value);
            }
            UCIOption::Button { name } if name == "Clear Hash" => {
                self.stop_search();
                self.lock_searcher().clear()
            }
            _ => (),
        }
    }

    fn lock_searcher(&self) -> std::sync::MutexGuard<'_, Searcher> {
        self.searcher.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Launches the search on its own thread, so that `stop` can still be read
    fn start_search(&mut self, limits: SearchLimits) {
        if self.worker.as_ref().map_or(false, |w| !w.handle.is_finished()) {
            return;
        }
        self.stop_search();

        let stop_handle = Arc::new(AtomicBool::new(false));
        let stop_signal = Arc::clone(&stop_handle);
        let searcher = Arc::clone(&self.searcher);
        let position = self.position.clone();
        let config = self.config.clone();
        let handle = thread::spawn(move || {
            let mut searcher = searcher.lock().unwrap_or_else(PoisonError::into_inner);
            let turn = position.turn();
            let result = searcher.search_with_reporter(&position, &limits, &config, &stop_signal, |r| {
                Self::send(UCICommand::Info(r, turn))
            });
            Self::send(UCICommand::HashFull(searcher.hashfull()));
            Self::send(UCICommand::BestMove(result.best_move));
            result
        });

        self.worker = Some(Worker {
            handle,
            stop_handle,
        });
    }

    /// Stops the running search, if any, and waits for its result
    fn stop_search(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.stop_handle.store(true, Ordering::SeqCst);
            match worker.handle.join() {
                Ok(result) => self.last_result = Some(result),
                Err(_) => eprintln!("The search thread panicked"),
            }
        }
    }

    pub fn send(command: UCICommand) {
        match command {
            UCICommand::Id => println!(
                "id name Remora {}\nid author {}",
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_AUTHORS")
            ),
            UCICommand::UciOk => println!("uciok"),
            UCICommand::ReadyOk => println!("readyok"),
            UCICommand::BestMove(Some(mv)) => println!("bestmove {}", mv),
            UCICommand::BestMove(None) => println!("bestmove 0000"),
            UCICommand::Info(result, turn) => println!("info {}", InfoLine { result, turn }),
            UCICommand::HashFull(permill) => println!("info hashfull {}", permill),
            UCICommand::UciOption(option) => println!("option {}", option),
        }
    }

    fn parse_go_args(&self, args: &[&str]) -> SearchLimits {
        let valid_args = [
            "searchmoves",
            "ponder",
            "wtime",
            "btime",
            "winc",
            "binc",
            "movestogo",
            "depth",
            "nodes",
            "mate",
            "movetime",
            "infinite",
        ];

        let mut arg_value_map: HashMap<&str, String> = HashMap::new();
        let mut current_arg = "";
        let mut current_value = String::new();
        for word in args {
            if valid_args.contains(word) {
                arg_value_map.insert(current_arg, String::from(current_value.trim()));
                current_arg = word;
                current_value = String::new();
            } else {
                current_value.push_str(word);
                current_value.push(' ');
            }
        }
        arg_value_map.insert(current_arg, String::from(current_value.trim()));

        let millis = |key: &str| {
            arg_value_map
                .get(key)
                .and_then(|d| d.parse::<u64>().ok())
                .map(Duration::from_millis)
        };

        let mut limits = SearchLimits::default();
        if arg_value_map.contains_key("infinite") {
            return limits;
        }
        limits
            .set_depth(arg_value_map.get("depth").and_then(|d| d.parse::<u8>().ok()))
            .set_nodes(arg_value_map.get("nodes").and_then(|d| d.parse::<u64>().ok()));

        if arg_value_map.contains_key("movetime") {
            limits.set_time(millis("movetime"));
        } else {
            let (clock, increment) = match self.position.turn() {
                Color::White => (millis("wtime"), millis("winc")),
                Color::Black => (millis("btime"), millis("binc")),
            };
            if let Some(c) = clock {
                limits.set_time_from_clock(c, increment);
            }
        }

        limits
    }

    fn args_regex() -> Regex {
        Regex::new(r#"(".*?"|[^"\s]+)"#).expect("the argument pattern is a valid regex")
    }
}

enum UCIOkCode {
    OkCommand,
    ShouldQuit,
}

enum UCIErrCode {
    MissingArg(String),
    NoCommand,
    BadCommand(String),
    BadMove(MoveError),
    BadFen(FenError),
}

pub enum UCICommand<'a> {
    Id,
    UciOk,
    ReadyOk,
    BestMove(Option<Move>),
    Info(&'a SearchResult, Color),
    HashFull(usize),
    UciOption(&'a UCIOption),
}

/// A search result seen from the side to move, as the protocol expects
struct InfoLine<'a> {
    result: &'a SearchResult,
    turn: Color,
}
impl Display for InfoLine<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        let sign = if self.turn == Color::White { 1 } else { -1 };
        let score = match self.result.mate_in() {
            Some(m) => format!("mate {}", m * sign),
            None => format!("cp {}", self.result.score * sign),
        };
        let pv: Vec<String> = self.result.principal_variation.iter().map(Move::to_string).collect();
        write!(
            f,
            "depth {} score {} nodes {} nps {} time {} pv {}",
            self.result.depth,
            score,
            self.result.nodes,
            self.result.nps(),
            self.result.time.as_millis(),
            pv.join(" ")
        )
    }
}

#[derive(Clone)]
pub enum UCIOption {
    BoolValue {
        name: String,
        value: bool,
        default: bool,
    },
    IntValue {
        name: String,
        value: i32,
        default: i32,
        min: i32,
        max: i32,
    },
    Button {
        name: String,
    },
}
impl UCIOption {
    pub fn name(&self) -> &str {
        match self {
            Self::BoolValue { name, .. } | Self::IntValue { name, .. } | Self::Button { name } => name,
        }
    }

    pub fn set_value(&mut self, v: &str) {
        match self {
            Self::BoolValue { value, .. } => *value = v.parse::<bool>().unwrap_or(*value),
            Self::IntValue {
                value, min, max, ..
            } => {
                let parsed = v.parse::<i32>().unwrap_or(*value);
                *value = parsed.clamp(*min, *max)
            }
            Self::Button { .. } => (),
        }
    }
}
impl Display for UCIOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            Self::BoolValue { name, default, .. } => {
                write!(f, "name {} type check default {}", name, default)
            }
            Self::IntValue {
                name,
                default,
                min,
                max,
                ..
            } => write!(
                f,
                "name {} type spin default {} min {} max {}",
                name, default, min, max
            ),
            Self::Button { name } => write!(f, "name {} type button", name),
        }
    }
}
