//! Move transform kernels: slide-and-merge for one direction.
//!
//! Two interchangeable backends implement [`MoveKernel`]:
//! - [`TableKernel`] resolves every line through tables precomputed for all
//!   65,536 16-bit lines, built once behind a `OnceLock`.
//! - [`ScalarKernel`] collapses each line on the fly.
//!
//! Both produce bit-identical [`MoveOutcome`]s and may be swapped at startup
//! without observable effect beyond latency.

use std::sync::OnceLock;

use super::{collapse_line, extract_line, transpose, Board, Direction};

/// The result of applying one direction to one board.
///
/// `changed == false` marks the direction illegal for that board (no tile
/// shifts or merges); search excludes such branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub board: Board,
    /// Sum of the face values of tiles created by merges in this move.
    pub score: u32,
    pub changed: bool,
}

/// A slide-and-merge implementation. Implementations must be pure: the same
/// `(board, dir)` pair always yields the same outcome.
pub trait MoveKernel: Send + Sync {
    fn apply(&self, board: Board, dir: Direction) -> MoveOutcome;
}

/// Direct per-call line collapse, no precomputation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarKernel;

impl MoveKernel for ScalarKernel {
    fn apply(&self, board: Board, dir: Direction) -> MoveOutcome {
        let mut g = board.ranks();
        let mut score = 0u32;
        for i in 0..4 {
            // Read the line in the direction's natural order, collapse toward
            // the leading edge, write back in the original orientation.
            let line = match dir {
                Direction::Left => [g[i][0], g[i][1], g[i][2], g[i][3]],
                Direction::Right => [g[i][3], g[i][2], g[i][1], g[i][0]],
                Direction::Up => [g[0][i], g[1][i], g[2][i], g[3][i]],
                Direction::Down => [g[3][i], g[2][i], g[1][i], g[0][i]],
            };
            let (out, line_score) = collapse_line(line);
            score += line_score;
            for (j, &rank) in out.iter().enumerate() {
                match dir {
                    Direction::Left => g[i][j] = rank,
                    Direction::Right => g[i][3 - j] = rank,
                    Direction::Up => g[j][i] = rank,
                    Direction::Down => g[3 - j][i] = rank,
                }
            }
        }
        let next = Board::from_ranks(&g);
        MoveOutcome {
            board: next,
            score,
            changed: next != board,
        }
    }
}

const LINE_TABLE_SIZE: usize = 0x1_0000;

struct Tables {
    left: Box<[u16]>,
    right: Box<[u16]>,
    /// Column results already spread into column nibble positions.
    up: Box<[u64]>,
    down: Box<[u64]>,
    /// Score gained collapsing the line as stored (high nibble first).
    score_fwd: Box<[u32]>,
    /// Score gained collapsing the reversed line.
    score_rev: Box<[u32]>,
}

static TABLES: OnceLock<Tables> = OnceLock::new();

/// Table-backed kernel. Construction warms the shared tables; subsequent
/// constructions are free.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableKernel;

impl TableKernel {
    pub fn new() -> Self {
        TABLES.get_or_init(build_tables);
        TableKernel
    }
}

impl MoveKernel for TableKernel {
    fn apply(&self, board: Board, dir: Direction) -> MoveOutcome {
        let t = TABLES.get_or_init(build_tables);
        let mut out: u64 = 0;
        let mut score = 0u32;
        match dir {
            Direction::Left | Direction::Right => {
                for i in 0..4 {
                    let row = extract_line(board.raw(), i) as usize;
                    let (new_line, line_score) = match dir {
                        Direction::Left => (t.left[row] as u64, t.score_fwd[row]),
                        _ => (t.right[row] as u64, t.score_rev[row]),
                    };
                    out |= new_line << (48 - 16 * i);
                    score += line_score;
                }
            }
            Direction::Up | Direction::Down => {
                let tr = transpose(board.raw());
                for i in 0..4 {
                    let col = extract_line(tr, i) as usize;
                    let (spread, line_score) = match dir {
                        Direction::Up => (t.up[col], t.score_fwd[col]),
                        _ => (t.down[col], t.score_rev[col]),
                    };
                    out |= spread << (12 - 4 * i);
                    score += line_score;
                }
            }
        }
        let next = Board::from_raw(out);
        MoveOutcome {
            board: next,
            score,
            changed: next != board,
        }
    }
}

fn build_tables() -> Tables {
    // Heap allocation keeps the 2.5 MB of tables off the stack.
    let mut left = vec![0u16; LINE_TABLE_SIZE];
    let mut right = vec![0u16; LINE_TABLE_SIZE];
    let mut up = vec![0u64; LINE_TABLE_SIZE];
    let mut down = vec![0u64; LINE_TABLE_SIZE];
    let mut score_fwd = vec![0u32; LINE_TABLE_SIZE];
    let mut score_rev = vec![0u32; LINE_TABLE_SIZE];

    for line_val in 0..LINE_TABLE_SIZE {
        let line = unpack_line(line_val as u16);
        let reversed = [line[3], line[2], line[1], line[0]];

        let (fwd, fwd_score) = collapse_line(line);
        let (rev, rev_score) = collapse_line(reversed);
        let rev_restored = [rev[3], rev[2], rev[1], rev[0]];

        left[line_val] = pack_line(fwd);
        right[line_val] = pack_line(rev_restored);
        up[line_val] = spread_column(fwd);
        down[line_val] = spread_column(rev_restored);
        score_fwd[line_val] = fwd_score;
        score_rev[line_val] = rev_score;
    }

    Tables {
        left: left.into_boxed_slice(),
        right: right.into_boxed_slice(),
        up: up.into_boxed_slice(),
        down: down.into_boxed_slice(),
        score_fwd: score_fwd.into_boxed_slice(),
        score_rev: score_rev.into_boxed_slice(),
    }
}

/// High nibble first, matching [`extract_line`].
fn unpack_line(line: u16) -> [u8; 4] {
    [
        ((line >> 12) & 0xf) as u8,
        ((line >> 8) & 0xf) as u8,
        ((line >> 4) & 0xf) as u8,
        (line & 0xf) as u8,
    ]
}

fn pack_line(ranks: [u8; 4]) -> u16 {
    ((ranks[0] as u16) << 12) | ((ranks[1] as u16) << 8) | ((ranks[2] as u16) << 4) | ranks[3] as u16
}

/// Place a column (top cell first) into the nibble positions of column 3;
/// callers shift it left into the target column.
fn spread_column(ranks: [u8; 4]) -> u64 {
    ((ranks[0] as u64) << 48) | ((ranks[1] as u64) << 32) | ((ranks[2] as u64) << 16) | ranks[3] as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn board(grid: [[u32; 4]; 4]) -> Board {
        Board::from_grid(&grid).unwrap()
    }

    #[test]
    fn left_merges_leading_pair_only() {
        // Row [0,2,2,4] -> [4,4,0,0] with score 4; the standing 4 stays.
        let b = board([[0, 2, 2, 4], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let table = TableKernel::new();
        for kernel in [&ScalarKernel as &dyn MoveKernel, &table] {
            let out = kernel.apply(b, Direction::Left);
            assert_eq!(
                out.board.to_grid(),
                [[4, 4, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]
            );
            assert_eq!(out.score, 4);
            assert!(out.changed);
        }
    }

    #[test]
    fn right_reads_rows_reversed() {
        let b = board([[4, 2, 2, 0], [2, 0, 0, 2], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let out = TableKernel::new().apply(b, Direction::Right);
        assert_eq!(
            out.board.to_grid(),
            [[0, 0, 4, 4], [0, 0, 0, 4], [0, 0, 0, 0], [0, 0, 0, 0]]
        );
        assert_eq!(out.score, 8);
    }

    #[test]
    fn vertical_moves_collapse_columns() {
        let b = board([[2, 0, 0, 0], [2, 4, 0, 0], [0, 4, 2, 0], [4, 0, 2, 0]]);
        let up = TableKernel::new().apply(b, Direction::Up);
        assert_eq!(
            up.board.to_grid(),
            [[4, 8, 4, 0], [4, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]
        );
        assert_eq!(up.score, 16);

        let down = TableKernel::new().apply(b, Direction::Down);
        assert_eq!(
            down.board.to_grid(),
            [[0, 0, 0, 0], [0, 0, 0, 0], [4, 0, 0, 0], [4, 8, 4, 0]]
        );
        assert_eq!(down.score, 16);
    }

    #[test]
    fn illegal_direction_reports_unchanged() {
        let b = board([[2, 4, 8, 16], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let out = TableKernel::new().apply(b, Direction::Left);
        assert_eq!(out.board, b);
        assert!(!out.changed);
        assert_eq!(out.score, 0);

        let out = TableKernel::new().apply(Board::EMPTY, Direction::Up);
        assert!(!out.changed);
    }

    #[test]
    fn score_conserves_merged_face_values() {
        // Two merges in row 0 (4+4 and 8+8 -> 8 + 16) and one in column 3.
        let b = board([[4, 4, 8, 8], [0, 0, 0, 2], [0, 0, 0, 2], [0, 0, 0, 0]]);
        let left = ScalarKernel.apply(b, Direction::Left);
        assert_eq!(left.score, 24);
        let up = ScalarKernel.apply(b, Direction::Up);
        assert_eq!(up.score, 4);
    }

    #[test]
    fn kernels_agree_on_random_boards() {
        let table = TableKernel::new();
        let mut rng = StdRng::seed_from_u64(0xc0ffee);
        let mut b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
        for _ in 0..500 {
            for dir in Direction::ALL {
                assert_eq!(table.apply(b, dir), ScalarKernel.apply(b, dir), "{b:?} {dir:?}");
            }
            let dir = Direction::ALL[rng.gen_range(0..4)];
            let out = table.apply(b, dir);
            b = if out.changed {
                out.board.with_random_tile(&mut rng)
            } else {
                Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng)
            };
        }
    }

    #[test]
    fn changed_iff_simulation_differs() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let mut b = Board::EMPTY;
            for _ in 0..rng.gen_range(2..14) {
                b = b.with_random_tile(&mut rng);
            }
            for dir in Direction::ALL {
                let out = TableKernel::new().apply(b, dir);
                assert_eq!(out.changed, out.board != b);
            }
        }
    }
}
