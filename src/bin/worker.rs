//! Line-delimited JSON move worker.
//!
//! Reads one request per line from stdin (`{"board": [[...], ...]}`), writes
//! one response per line to stdout, and prints `READY` once the engine is
//! warm so a supervising process knows when to start sending. Logs go to
//! stderr; stdout carries nothing but the handshake and responses.

use std::io::{self, BufRead, Write};

use clap::Parser;
use log::{info, warn};

use twenty48_ai::protocol::{parse_grid, ErrorResponse, MoveRequest, MoveResponse};
use twenty48_ai::selector::{Backend, MoveSelector};

#[derive(Parser)]
#[command(about = "One board in, one move out, over stdin/stdout")]
struct Args {
    /// Move kernel backend.
    #[arg(long, value_enum, default_value_t = Backend::Table)]
    backend: Backend,
}

fn main() -> io::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut selector = MoveSelector::new(args.backend);
    info!("engine warm, backend {:?}", args.backend);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "READY")?;
    out.flush()?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let reply = handle_request(&mut selector, line);
        writeln!(out, "{reply}")?;
        out.flush()?;
    }
    info!("stdin closed, shutting down");
    Ok(())
}

fn handle_request(selector: &mut MoveSelector, line: &str) -> String {
    let outcome = serde_json::from_str::<MoveRequest>(line)
        .map_err(|e| format!("malformed request: {e}"))
        .and_then(|request| parse_grid(&request).map_err(|e| e.to_string()))
        .and_then(|grid| selector.best_move(&grid).map_err(|e| e.to_string()));
    match outcome {
        Ok(decision) => serde_json::to_string(&MoveResponse::from_decision(&decision))
            .unwrap_or_else(|e| fallback_error(&e.to_string())),
        Err(message) => {
            warn!("rejected request: {message}");
            serde_json::to_string(&ErrorResponse::new(message))
                .unwrap_or_else(|e| fallback_error(&e.to_string()))
        }
    }
}

fn fallback_error(message: &str) -> String {
    format!("{{\"error\":{:?},\"move\":null}}", message)
}
