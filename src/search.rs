//! Expectimax tree search with per-call memoization.
//!
//! Max nodes try the four directions in canonical order and keep the
//! strictly greatest total (child value plus the move's score); chance nodes
//! average over every empty cell receiving a 2 (90%) or a 4 (10%). Depth
//! counts plies and drops by one on every recursion, bottoming out at the
//! heuristic, or at the game-over penalty on terminal boards.
//!
//! The memo table is keyed by `(board, remaining depth, node kind)` and lives
//! for exactly one top-level search; a state reached twice inside one descent
//! evaluates once, and nothing leaks across calls with different depths.

use std::collections::HashMap;

use ahash::RandomState;

use crate::engine::kernel::MoveKernel;
use crate::engine::{Board, Direction};
use crate::eval::{self, EvalWeights};

/// Value of a search node; `direction` is populated at max nodes only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    pub value: f64,
    pub direction: Option<Direction>,
}

/// Counters for one top-level search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes visited, memo hits included.
    pub nodes: u64,
    /// Memo table hits.
    pub cache_hits: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum NodeKind {
    Max,
    Chance,
}

type Memo = HashMap<(Board, u8, NodeKind), SearchResult, RandomState>;

/// Base search depth in plies (one ply = one max or one chance level).
pub const BASE_DEPTH: u8 = 6;
/// Hard depth ceiling reached only on nearly full late-game boards.
pub const MAX_DEPTH: u8 = 12;

/// Depth policy: deepen exactly when the branching factor shrinks and
/// mistakes become fatal. Non-decreasing as `empty` falls for a fixed
/// `max_tile` tier.
pub fn dynamic_depth(empty: u32, max_tile: u32) -> u8 {
    if max_tile < 512 {
        BASE_DEPTH
    } else if max_tile < 2048 {
        if empty <= 4 {
            BASE_DEPTH + 1
        } else {
            BASE_DEPTH
        }
    } else {
        match empty {
            0..=2 => MAX_DEPTH,
            3..=5 => 10,
            6..=8 => 8,
            _ => BASE_DEPTH,
        }
    }
}

/// Expectimax search over a move kernel. One instance is not reentrant; run
/// concurrent searches on separate instances.
pub struct Expectimax {
    kernel: Box<dyn MoveKernel>,
    weights: EvalWeights,
    stats: SearchStats,
}

impl Expectimax {
    pub fn new(kernel: Box<dyn MoveKernel>, weights: EvalWeights) -> Self {
        Self {
            kernel,
            weights,
            stats: SearchStats::default(),
        }
    }

    /// Run a max-node search from `board` with a fresh memo table.
    pub fn search(&mut self, board: Board, depth: u8) -> SearchResult {
        let mut memo: Memo = HashMap::default();
        let mut stats = SearchStats::default();
        let result = self.node(board, depth, NodeKind::Max, &mut memo, &mut stats);
        self.stats = stats;
        result
    }

    /// Counters from the most recent [`search`](Self::search).
    #[inline]
    pub fn last_stats(&self) -> SearchStats {
        self.stats
    }

    #[inline]
    pub fn weights(&self) -> &EvalWeights {
        &self.weights
    }

    fn node(
        &self,
        board: Board,
        depth: u8,
        kind: NodeKind,
        memo: &mut Memo,
        stats: &mut SearchStats,
    ) -> SearchResult {
        stats.nodes += 1;
        if let Some(&hit) = memo.get(&(board, depth, kind)) {
            stats.cache_hits += 1;
            return hit;
        }
        let result = if board.is_terminal() {
            SearchResult {
                value: self.weights.game_over_penalty,
                direction: None,
            }
        } else if depth == 0 {
            SearchResult {
                value: eval::evaluate(board, &self.weights),
                direction: None,
            }
        } else {
            match kind {
                NodeKind::Max => self.max_node(board, depth, memo, stats),
                NodeKind::Chance => self.chance_node(board, depth, memo, stats),
            }
        };
        memo.insert((board, depth, kind), result);
        result
    }

    fn max_node(
        &self,
        board: Board,
        depth: u8,
        memo: &mut Memo,
        stats: &mut SearchStats,
    ) -> SearchResult {
        let mut best = f64::NEG_INFINITY;
        let mut best_dir = None;
        for dir in Direction::ALL {
            let out = self.kernel.apply(board, dir);
            if !out.changed {
                continue;
            }
            let child = self.node(out.board, depth - 1, NodeKind::Chance, memo, stats);
            let total = child.value + out.score as f64;
            // Strict comparison: the first direction in canonical order wins ties.
            if total > best {
                best = total;
                best_dir = Some(dir);
            }
        }
        match best_dir {
            Some(_) => SearchResult {
                value: best,
                direction: best_dir,
            },
            None => SearchResult {
                value: eval::evaluate(board, &self.weights),
                direction: None,
            },
        }
    }

    fn chance_node(
        &self,
        board: Board,
        depth: u8,
        memo: &mut Memo,
        stats: &mut SearchStats,
    ) -> SearchResult {
        let empty = board.count_empty();
        if empty == 0 {
            return SearchResult {
                value: eval::evaluate(board, &self.weights),
                direction: None,
            };
        }
        let mut acc = 0.0f64;
        let mut seen = 0;
        let mut tmp = board.raw();
        let mut tile: u64 = 1;
        while seen < empty {
            if (tmp & 0xf) == 0 {
                let with_two = Board::from_raw(board.raw() | tile);
                let with_four = Board::from_raw(board.raw() | (tile << 1));
                acc += 0.9 * self.node(with_two, depth - 1, NodeKind::Max, memo, stats).value;
                acc += 0.1 * self.node(with_four, depth - 1, NodeKind::Max, memo, stats).value;
                seen += 1;
            }
            tmp >>= 4;
            tile <<= 4;
        }
        SearchResult {
            value: acc / empty as f64,
            direction: None,
        }
    }
}
