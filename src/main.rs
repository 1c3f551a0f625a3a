//! Self-play driver: lets the engine play full games against random tile
//! spawns, printing boards for a single game or a progress line for batches.

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use twenty48_ai::engine::kernel::MoveKernel;
use twenty48_ai::engine::Board;
use twenty48_ai::selector::{Backend, MoveSelector};

#[derive(Parser)]
#[command(about = "Play 2048 games with the expectimax engine")]
struct Args {
    /// Move kernel backend.
    #[arg(long, value_enum, default_value_t = Backend::Table)]
    backend: Backend,

    /// Number of games to play.
    #[arg(long, default_value_t = 1)]
    games: u32,

    /// RNG seed for reproducible tile spawns.
    #[arg(long)]
    seed: Option<u64>,

    /// Suppress per-move board printing.
    #[arg(long)]
    quiet: bool,
}

struct GameOutcome {
    moves: u64,
    score: u64,
    max_tile: u32,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut selector = MoveSelector::new(args.backend);
    let kernel = args.backend.kernel();
    let mut rng: StdRng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(rand::thread_rng()).expect("failed to seed RNG"),
    };
    info!("backend {:?}, {} game(s)", args.backend, args.games);

    let show_boards = args.games == 1 && !args.quiet;
    let bar = if args.games > 1 {
        let bar = ProgressBar::new(args.games as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} | {msg}")
                .expect("static template"),
        );
        Some(bar)
    } else {
        None
    };

    let mut best_score = 0u64;
    let mut best_tile = 0u32;
    for _ in 0..args.games {
        let outcome = play_game(&mut selector, kernel.as_ref(), &mut rng, show_boards);
        best_score = best_score.max(outcome.score);
        best_tile = best_tile.max(outcome.max_tile);
        if let Some(bar) = &bar {
            bar.set_message(format!(
                "last: {} pts, {} tile | best: {} pts, {} tile",
                outcome.score, outcome.max_tile, best_score, best_tile
            ));
            bar.inc(1);
        } else {
            println!(
                "Game over: {} moves, {} points, max tile {}",
                outcome.moves, outcome.score, outcome.max_tile
            );
        }
    }
    if let Some(bar) = bar {
        bar.finish();
        println!("Best over {} games: {} points, max tile {}", args.games, best_score, best_tile);
    }
}

fn play_game<R: Rng>(
    selector: &mut MoveSelector,
    kernel: &dyn MoveKernel,
    rng: &mut R,
    show_boards: bool,
) -> GameOutcome {
    let mut board = Board::EMPTY.with_random_tile(rng).with_random_tile(rng);
    let mut moves = 0u64;
    let mut score = 0u64;
    loop {
        if show_boards {
            println!("{board}");
        }
        let decision = selector.decide(board);
        let Some(dir) = decision.direction else {
            break;
        };
        let out = kernel.apply(board, dir);
        debug_assert!(out.changed);
        score += out.score as u64;
        moves += 1;
        board = out.board.with_random_tile(rng);
    }
    let (max_tile, _, _) = board.max_tile();
    GameOutcome { moves, score, max_tile }
}
