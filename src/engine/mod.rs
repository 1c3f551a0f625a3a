//! Board representation, codec and read-only metrics.
//!
//! A board is 16 packed 4-bit "ranks" in a `u64`, row-major with cell (0,0)
//! in the highest nibble. Rank 0 is an empty cell; rank `r` is the tile with
//! face value `2^r`. Every operation produces a new `Board`; nothing mutates
//! in place, so boards are cheap memoization keys.

pub mod kernel;

use std::fmt;

use rand::Rng;

/// A slide direction. The declaration order is the canonical order used for
/// iteration and tie-breaks everywhere in the crate: `Up`, `Right`, `Down`,
/// `Left` with indices 0..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All directions in canonical order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Canonical index, 0..=3.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    pub fn from_index(idx: usize) -> Option<Direction> {
        Direction::ALL.get(idx).copied()
    }

    /// Lowercase direction name used on the wire.
    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        }
    }

    /// Human-facing arrow glyph.
    pub fn arrow(self) -> &'static str {
        match self {
            Direction::Up => "↑",
            Direction::Right => "→",
            Direction::Down => "↓",
            Direction::Left => "←",
        }
    }
}

/// Rejection reasons for grids arriving at the codec boundary.
///
/// Invalid input always fails with one of these; it is never silently
/// truncated into a nibble.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    #[error("board must be 4x4, got {rows} rows x {cols} columns")]
    BadShape { rows: usize, cols: usize },
    #[error("cell ({row},{col}) holds {value}, expected 0 or a power of two between 2 and 32768")]
    InvalidTile { row: usize, col: usize, value: u32 },
    #[error("cell ({row},{col}) holds {value}, which exceeds the largest representable tile 32768")]
    TileTooLarge { row: usize, col: usize, value: u32 },
}

type BoardRaw = u64;

/// Packed 4x4 board as 16 4-bit ranks in a `u64`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board(BoardRaw);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board(0);

    /// Construct a `Board` from its raw packed representation.
    #[inline]
    pub fn from_raw(raw: BoardRaw) -> Self {
        Board(raw)
    }

    /// The raw packed `u64` for this `Board`.
    #[inline]
    pub fn raw(self) -> BoardRaw {
        self.0
    }

    /// Pack a 4x4 grid of tile face values. Each cell must be 0 (empty) or a
    /// power of two between 2 and 32768.
    ///
    /// ```
    /// use twenty48_ai::engine::Board;
    ///
    /// let grid = [[2, 4, 8, 16], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]];
    /// let board = Board::from_grid(&grid).unwrap();
    /// assert_eq!(board.to_grid(), grid);
    /// ```
    pub fn from_grid(grid: &[[u32; 4]; 4]) -> Result<Board, BoardError> {
        let mut raw: BoardRaw = 0;
        for (row, cells) in grid.iter().enumerate() {
            for (col, &value) in cells.iter().enumerate() {
                if value == 0 {
                    continue;
                }
                if value == 1 || !value.is_power_of_two() {
                    return Err(BoardError::InvalidTile { row, col, value });
                }
                let rank = value.trailing_zeros();
                if rank > 15 {
                    return Err(BoardError::TileTooLarge { row, col, value });
                }
                raw |= (rank as u64) << nibble_shift(row, col);
            }
        }
        Ok(Board(raw))
    }

    /// Exact inverse of [`Board::from_grid`].
    pub fn to_grid(self) -> [[u32; 4]; 4] {
        let mut grid = [[0u32; 4]; 4];
        for (row, cells) in grid.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                let rank = self.rank(row, col);
                *cell = if rank == 0 { 0 } else { 1u32 << rank };
            }
        }
        grid
    }

    /// The rank (log2 of the face value, 0 = empty) at one cell.
    #[inline]
    pub fn rank(self, row: usize, col: usize) -> u8 {
        ((self.0 >> nibble_shift(row, col)) & 0xf) as u8
    }

    /// All 16 ranks as a row-major grid.
    pub fn ranks(self) -> [[u8; 4]; 4] {
        let mut out = [[0u8; 4]; 4];
        for (row, cells) in out.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                *cell = self.rank(row, col);
            }
        }
        out
    }

    /// Pack a rank grid back into a board.
    pub fn from_ranks(ranks: &[[u8; 4]; 4]) -> Board {
        let mut raw: BoardRaw = 0;
        for (row, cells) in ranks.iter().enumerate() {
            for (col, &rank) in cells.iter().enumerate() {
                debug_assert!(rank <= 15);
                raw |= (rank as u64 & 0xf) << nibble_shift(row, col);
            }
        }
        Board(raw)
    }

    /// Count the number of empty cells.
    #[inline]
    pub fn count_empty(self) -> u32 {
        16 - self.count_non_empty()
    }

    #[inline]
    fn count_non_empty(self) -> u32 {
        let mut x = self.0;
        x |= x >> 1;
        x |= x >> 2;
        x &= 0x1111_1111_1111_1111;
        x.count_ones()
    }

    /// The largest tile's face value and its position; the first occurrence
    /// in row-major order wins ties. An empty board reports `(0, 0, 0)`.
    pub fn max_tile(self) -> (u32, usize, usize) {
        let mut best = 0u8;
        let (mut best_row, mut best_col) = (0, 0);
        for row in 0..4 {
            for col in 0..4 {
                let rank = self.rank(row, col);
                if rank > best {
                    best = rank;
                    best_row = row;
                    best_col = col;
                }
            }
        }
        let value = if best == 0 { 0 } else { 1u32 << best };
        (value, best_row, best_col)
    }

    /// True iff no empty cell remains and no two adjacent cells share a rank.
    pub fn is_terminal(self) -> bool {
        let g = self.ranks();
        for row in 0..4 {
            for col in 0..4 {
                if g[row][col] == 0 {
                    return false;
                }
                if col < 3 && g[row][col] == g[row][col + 1] {
                    return false;
                }
                if row < 3 && g[row][col] == g[row + 1][col] {
                    return false;
                }
            }
        }
        true
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a random empty cell.
    /// Returns the board unchanged if no cell is empty.
    pub fn with_random_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        let empty = self.count_empty();
        if empty == 0 {
            return self;
        }
        let mut index = rng.gen_range(0..empty);
        let rank: u64 = if rng.gen_range(0..10) < 9 { 1 } else { 2 };
        let mut tmp = self.0;
        let mut tile = rank;
        loop {
            while (tmp & 0xf) != 0 {
                tmp >>= 4;
                tile <<= 4;
            }
            if index == 0 {
                break;
            }
            index -= 1;
            tmp >>= 4;
            tile <<= 4;
        }
        Board(self.0 | tile)
    }
}

#[inline]
fn nibble_shift(row: usize, col: usize) -> u32 {
    debug_assert!(row < 4 && col < 4);
    (60 - 4 * (row * 4 + col)) as u32
}

// Credit to Nneonneo
pub(crate) fn transpose(x: BoardRaw) -> BoardRaw {
    let a1 = x & 0xF0F0_0F0F_F0F0_0F0F;
    let a2 = x & 0x0000_F0F0_0000_F0F0;
    let a3 = x & 0x0F0F_0000_0F0F_0000;
    let a = a1 | (a2 << 12) | (a3 >> 12);
    let b1 = a & 0xFF00_FF00_00FF_00FF;
    let b2 = a & 0x00FF_00FF_0000_0000;
    let b3 = a & 0x0000_0000_FF00_FF00;
    b1 | (b2 >> 24) | (b3 << 24)
}

/// Row `line_idx` (0 = top) as a 16-bit value, leftmost cell in the high
/// nibble. On a transposed board this extracts columns instead.
#[inline]
pub(crate) fn extract_line(raw: BoardRaw, line_idx: usize) -> u64 {
    (raw >> ((3 - line_idx) * 16)) & 0xffff
}

/// Collapse one line of ranks toward index 0: drop empties, merge equal
/// neighbors once each into rank+1, pad with empties. Returns the collapsed
/// line and the score gained (sum of merged tiles' face values).
///
/// A merge of two rank-15 tiles stays at rank 15; the nibble cannot hold 16.
pub(crate) fn collapse_line(line: [u8; 4]) -> ([u8; 4], u32) {
    let mut packed = [0u8; 4];
    let mut len = 0;
    for &rank in &line {
        if rank != 0 {
            packed[len] = rank;
            len += 1;
        }
    }
    let mut out = [0u8; 4];
    let mut score = 0u32;
    let mut n = 0;
    let mut i = 0;
    while i < len {
        if i + 1 < len && packed[i] == packed[i + 1] {
            let merged = if packed[i] == 15 { 15 } else { packed[i] + 1 };
            out[n] = merged;
            score += 1u32 << (packed[i] as u32 + 1);
            i += 2;
        } else {
            out[n] = packed[i];
            i += 1;
        }
        n += 1;
    }
    (out, score)
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:#018x})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grid = self.to_grid();
        for (i, row) in grid.iter().enumerate() {
            if i > 0 {
                writeln!(f, "------------------------")?;
            }
            writeln!(
                f,
                "{:>5}|{:>5}|{:>5}|{:>5}",
                row[0], row[1], row[2], row[3]
            )?;
        }
        Ok(())
    }
}

impl From<BoardRaw> for Board {
    fn from(v: BoardRaw) -> Self {
        Board::from_raw(v)
    }
}

impl From<Board> for BoardRaw {
    fn from(b: Board) -> Self {
        b.raw()
    }
}
