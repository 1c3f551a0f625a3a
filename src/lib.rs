//! twenty48-ai: an expectimax move engine for 4x4 2048 boards.
//!
//! This crate provides:
//! - A compact [`engine::Board`] type (16 rank nibbles in a `u64`) with a
//!   validating grid codec and read-only metrics
//! - Two interchangeable move kernels (table-backed and scalar) behind
//!   [`engine::kernel::MoveKernel`]
//! - A corner-normalized positional heuristic (`eval` module)
//! - Memoized expectimax search with dynamic depth (`search` module)
//! - The [`selector::MoveSelector`] façade and the serde payloads spoken by
//!   the pipe worker (`protocol` module)
//!
//! Quick start:
//! ```
//! use twenty48_ai::selector::{Backend, MoveSelector};
//!
//! let mut selector = MoveSelector::new(Backend::Table);
//! let grid = [
//!     [2, 4, 8, 16],
//!     [0, 2, 4, 8],
//!     [0, 0, 2, 4],
//!     [0, 0, 0, 2],
//! ];
//! let decision = selector.best_move(&grid).unwrap();
//! println!("{} at depth {}", decision.glyph.unwrap(), decision.depth);
//! ```
//!
//! Searches are deterministic; randomness only enters through
//! `Board::with_random_tile` when actually playing a game.

pub mod engine;
pub mod eval;
pub mod protocol;
pub mod search;
pub mod selector;
