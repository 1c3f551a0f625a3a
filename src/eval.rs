//! Corner-normalized positional heuristic for non-terminal boards.
//!
//! The static score assumes the biggest tile belongs top-left. Boards whose
//! max tile sits in another corner are reflected onto that frame first; when
//! the max tile is in no corner, all four normalizations are scored and the
//! best one wins, which rewards boards one move away from a good shape.
//!
//! Terminal boards never reach this module; the search scores them with
//! [`EvalWeights::game_over_penalty`] directly.

use crate::engine::{collapse_line, Board};

/// Fixed reward and penalty magnitudes. One immutable value, constructed
/// once and shared by reference; tuning these changes play strength, not the
/// engine contract.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalWeights {
    /// Reward when the max tile holds the top-left corner, penalty otherwise.
    pub corner_bonus: f64,
    /// Penalty when neither Up nor Left is a legal move.
    pub escape_penalty: f64,
    /// Per empty cell.
    pub empty_weight: f64,
    /// Per adjacent equal-rank pair.
    pub merge_weight: f64,
    /// Multiplier on the snake positional sum.
    pub snake_weight: f64,
    /// Per unit of rank increase read away from the top-left corner.
    pub monotonicity_weight: f64,
    /// Per unit of absolute adjacent rank difference.
    pub smoothness_weight: f64,
    /// Value of a terminal board, applied by the search.
    pub game_over_penalty: f64,
}

impl EvalWeights {
    pub const DEFAULT: EvalWeights = EvalWeights {
        corner_bonus: 20_000.0,
        escape_penalty: 10_000.0,
        empty_weight: 270.0,
        merge_weight: 700.0,
        snake_weight: 1.0,
        monotonicity_weight: 47.0,
        smoothness_weight: 11.0,
        game_over_penalty: -1_000_000.0,
    };
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Boustrophedon position weights, largest at the top-left corner. The snake
/// reward is `sum(face_value * 4^weight)` over all tiles.
const SNAKE_EXPONENTS: [[usize; 4]; 4] = [
    [15, 14, 13, 12],
    [8, 9, 10, 11],
    [7, 6, 5, 4],
    [0, 1, 2, 3],
];

const POW4: [f64; 16] = [
    1.0,
    4.0,
    16.0,
    64.0,
    256.0,
    1024.0,
    4096.0,
    16384.0,
    65536.0,
    262144.0,
    1048576.0,
    4194304.0,
    16777216.0,
    67108864.0,
    268435456.0,
    1073741824.0,
];

type Ranks = [[u8; 4]; 4];

/// Score a non-terminal board.
pub fn evaluate(board: Board, weights: &EvalWeights) -> f64 {
    let g = board.ranks();
    let max = max_rank(&g);
    if max > 0 {
        // Max tile in a corner: one reflection puts it top-left.
        if g[0][0] == max {
            return static_score(&g, weights);
        }
        if g[0][3] == max {
            return static_score(&hflip(&g), weights);
        }
        if g[3][0] == max {
            return static_score(&vflip(&g), weights);
        }
        if g[3][3] == max {
            return static_score(&rot180(&g), weights);
        }
    }
    [g, hflip(&g), vflip(&g), rot180(&g)]
        .iter()
        .map(|n| static_score(n, weights))
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Static heuristic on a normalized grid (max tile conceptually top-left).
fn static_score(g: &Ranks, w: &EvalWeights) -> f64 {
    let max = max_rank(g);
    let mut score = if max > 0 && g[0][0] == max {
        w.corner_bonus
    } else {
        -w.corner_bonus
    };

    if !any_line_movable(g, true) && !any_line_movable(g, false) {
        score -= w.escape_penalty;
    }

    let mut empty = 0u32;
    let mut merges = 0u32;
    let mut snake = 0.0f64;
    let mut monotonicity = 0.0f64;
    let mut smoothness = 0.0f64;
    for row in 0..4 {
        for col in 0..4 {
            let rank = g[row][col];
            if rank == 0 {
                empty += 1;
            } else {
                snake += (1u64 << rank) as f64 * POW4[SNAKE_EXPONENTS[row][col]];
            }
            // Horizontal neighbor, reading away from the top-left corner.
            if col < 3 {
                let next = g[row][col + 1];
                if next == rank && rank != 0 {
                    merges += 1;
                }
                if next > rank {
                    monotonicity += (next - rank) as f64;
                }
                smoothness += rank.abs_diff(next) as f64;
            }
            // Vertical neighbor.
            if row < 3 {
                let next = g[row + 1][col];
                if next == rank && rank != 0 {
                    merges += 1;
                }
                if next > rank {
                    monotonicity += (next - rank) as f64;
                }
                smoothness += rank.abs_diff(next) as f64;
            }
        }
    }

    score + empty as f64 * w.empty_weight
        + merges as f64 * w.merge_weight
        + snake * w.snake_weight
        - monotonicity * w.monotonicity_weight
        - smoothness * w.smoothness_weight
}

fn max_rank(g: &Ranks) -> u8 {
    g.iter().flatten().copied().max().unwrap_or(0)
}

/// True if collapsing any row (`horizontal`) or column toward the top-left
/// edge would change it, i.e. a Left (resp. Up) move is legal.
fn any_line_movable(g: &Ranks, horizontal: bool) -> bool {
    for i in 0..4 {
        let line = if horizontal {
            [g[i][0], g[i][1], g[i][2], g[i][3]]
        } else {
            [g[0][i], g[1][i], g[2][i], g[3][i]]
        };
        if collapse_line(line).0 != line {
            return true;
        }
    }
    false
}

fn hflip(g: &Ranks) -> Ranks {
    let mut out = [[0u8; 4]; 4];
    for row in 0..4 {
        for col in 0..4 {
            out[row][col] = g[row][3 - col];
        }
    }
    out
}

fn vflip(g: &Ranks) -> Ranks {
    let mut out = [[0u8; 4]; 4];
    for row in 0..4 {
        for col in 0..4 {
            out[row][col] = g[3 - row][col];
        }
    }
    out
}

fn rot180(g: &Ranks) -> Ranks {
    hflip(&vflip(g))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(grid: [[u32; 4]; 4]) -> f64 {
        evaluate(Board::from_grid(&grid).unwrap(), &EvalWeights::DEFAULT)
    }

    #[test]
    fn corner_normalization_makes_reflections_equivalent() {
        let base = [
            [128, 64, 8, 2],
            [32, 16, 4, 0],
            [4, 2, 0, 0],
            [2, 0, 0, 0],
        ];
        let board = Board::from_grid(&base).unwrap();
        let g = board.ranks();
        for reflected in [hflip(&g), vflip(&g), rot180(&g)] {
            let other = Board::from_ranks(&reflected);
            assert_eq!(
                evaluate(board, &EvalWeights::DEFAULT),
                evaluate(other, &EvalWeights::DEFAULT)
            );
        }
    }

    #[test]
    fn cornered_max_beats_centered_max() {
        let cornered = [
            [256, 16, 4, 0],
            [32, 8, 0, 0],
            [4, 2, 0, 0],
            [0, 0, 0, 0],
        ];
        let centered = [
            [0, 16, 4, 0],
            [32, 256, 8, 0],
            [4, 2, 0, 0],
            [0, 0, 0, 0],
        ];
        assert!(value(cornered) > value(centered));
    }

    #[test]
    fn snake_ordering_beats_scrambled_tiles() {
        let ordered = [
            [512, 256, 128, 64],
            [4, 8, 16, 32],
            [2, 0, 0, 0],
            [0, 0, 0, 0],
        ];
        let scrambled = [
            [512, 8, 128, 2],
            [4, 256, 16, 0],
            [64, 32, 0, 0],
            [0, 0, 0, 0],
        ];
        assert!(value(ordered) > value(scrambled));
    }

    #[test]
    fn empty_cells_are_rewarded() {
        let open = [
            [64, 32, 0, 0],
            [16, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ];
        let cramped = [
            [64, 32, 2, 4],
            [16, 8, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ];
        assert!(value(open) > value(cramped));
    }

    #[test]
    fn off_corner_max_scores_best_normalization() {
        // Max tile at (1,1): no corner matches, so all four reflections are
        // tried. The result must equal the best of the four static scores.
        let grid = [
            [2, 4, 0, 0],
            [8, 128, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 2],
        ];
        let g = Board::from_grid(&grid).unwrap().ranks();
        let expected = [g, hflip(&g), vflip(&g), rot180(&g)]
            .iter()
            .map(|n| static_score(n, &EvalWeights::DEFAULT))
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(value(grid), expected);
    }
}
