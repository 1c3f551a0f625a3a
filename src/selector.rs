//! Move selector façade: the sole external entry point of the engine.
//!
//! Encodes a raw grid, picks a dynamic depth, runs one memoized search and
//! reports the winning direction with timing and diagnostics. Terminal
//! boards and boards with no legal move come back as `direction: None`,
//! which callers read as game over; only malformed grids are errors.

use std::time::Instant;

use crate::engine::kernel::{MoveKernel, ScalarKernel, TableKernel};
use crate::engine::{Board, BoardError, Direction};
use crate::eval::EvalWeights;
use crate::search::{dynamic_depth, Expectimax};

/// Which move kernel backs the search. The two backends are alternative
/// performance tiers of the same pure function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Backend {
    /// Precomputed line tables, fastest.
    #[default]
    Table,
    /// Direct per-call line collapse.
    Scalar,
}

impl Backend {
    pub fn kernel(self) -> Box<dyn MoveKernel> {
        match self {
            Backend::Table => Box::new(TableKernel::new()),
            Backend::Scalar => Box::new(ScalarKernel),
        }
    }
}

/// Outcome of one `best_move` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveDecision {
    /// `None` when the board is terminal or no direction changes it.
    pub direction: Option<Direction>,
    /// Arrow glyph for the chosen direction.
    pub glyph: Option<&'static str>,
    /// Search depth actually used, in plies.
    pub depth: u8,
    /// Wall time spent deciding, in milliseconds.
    pub elapsed_ms: f64,
    /// Search nodes visited.
    pub nodes: u64,
    /// Memo table hits.
    pub cache_hits: u64,
}

pub struct MoveSelector {
    engine: Expectimax,
}

impl MoveSelector {
    pub fn new(backend: Backend) -> Self {
        Self::with_weights(backend, EvalWeights::DEFAULT)
    }

    pub fn with_weights(backend: Backend, weights: EvalWeights) -> Self {
        Self {
            engine: Expectimax::new(backend.kernel(), weights),
        }
    }

    /// Best move for a raw 4x4 grid of tile face values.
    ///
    /// ```
    /// use twenty48_ai::selector::{Backend, MoveSelector};
    ///
    /// let mut selector = MoveSelector::new(Backend::Table);
    /// let grid = [
    ///     [2, 4, 8, 16],
    ///     [0, 2, 4, 8],
    ///     [0, 0, 2, 4],
    ///     [0, 0, 0, 2],
    /// ];
    /// let decision = selector.best_move(&grid).unwrap();
    /// assert!(decision.direction.is_some());
    /// ```
    pub fn best_move(&mut self, grid: &[[u32; 4]; 4]) -> Result<MoveDecision, BoardError> {
        let board = Board::from_grid(grid)?;
        Ok(self.decide(board))
    }

    /// Best move for an already-encoded board.
    pub fn decide(&mut self, board: Board) -> MoveDecision {
        let start = Instant::now();
        let (max_tile, _, _) = board.max_tile();
        let depth = dynamic_depth(board.count_empty(), max_tile);
        let result = self.engine.search(board, depth);
        let stats = self.engine.last_stats();
        MoveDecision {
            direction: result.direction,
            glyph: result.direction.map(|d| d.arrow()),
            depth,
            elapsed_ms: start.elapsed().as_secs_f64() * 1e3,
            nodes: stats.nodes,
            cache_hits: stats.cache_hits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::kernel::{MoveKernel, TableKernel};

    const EARLY: [[u32; 4]; 4] = [
        [2, 4, 8, 16],
        [0, 2, 4, 8],
        [0, 0, 2, 4],
        [0, 0, 0, 2],
    ];

    #[test]
    fn picks_a_legal_direction_on_an_open_board() {
        let mut selector = MoveSelector::new(Backend::Table);
        let decision = selector.best_move(&EARLY).unwrap();
        let dir = decision.direction.expect("open board must yield a move");
        let board = Board::from_grid(&EARLY).unwrap();
        assert!(TableKernel::new().apply(board, dir).changed);
        assert_eq!(decision.glyph, Some(dir.arrow()));
        assert_eq!(decision.depth, crate::search::BASE_DEPTH);
        assert!(decision.nodes > 0);
    }

    #[test]
    fn terminal_board_reports_no_direction() {
        let grid = [
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ];
        let mut selector = MoveSelector::new(Backend::Scalar);
        let decision = selector.best_move(&grid).unwrap();
        assert_eq!(decision.direction, None);
        assert_eq!(decision.glyph, None);
    }

    #[test]
    fn malformed_grid_is_rejected() {
        let mut grid = EARLY;
        grid[2][2] = 6;
        let mut selector = MoveSelector::new(Backend::Scalar);
        assert_eq!(
            selector.best_move(&grid),
            Err(BoardError::InvalidTile { row: 2, col: 2, value: 6 })
        );
    }

    #[test]
    fn repeated_calls_agree() {
        let mut selector = MoveSelector::new(Backend::Table);
        let first = selector.best_move(&EARLY).unwrap();
        let second = selector.best_move(&EARLY).unwrap();
        assert_eq!(first.direction, second.direction);
        assert_eq!(first.nodes, second.nodes);
    }
}
