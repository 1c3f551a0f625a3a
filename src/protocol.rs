//! Boundary payloads for the request/response channel.
//!
//! A request is a 4x4 matrix of tile face values; a response names the
//! chosen direction (or null at game over) plus depth, elapsed time and
//! search counters. Shape is validated here so malformed boards never reach
//! the codec; the transport carrying these lines is the worker binary.

use serde::{Deserialize, Serialize};

use crate::engine::BoardError;
use crate::selector::MoveDecision;

#[derive(Debug, Clone, Deserialize)]
pub struct MoveRequest {
    pub board: Vec<Vec<u32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveResponse {
    /// Canonical direction index 0..=3, or null at game over.
    #[serde(rename = "move")]
    pub move_index: Option<u8>,
    pub move_name: Option<&'static str>,
    pub move_arrow: Option<&'static str>,
    pub depth: u8,
    pub time_ms: f64,
    pub moves_evaled: u64,
    pub cachehits: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(rename = "move")]
    pub move_index: Option<u8>,
}

impl MoveResponse {
    pub fn from_decision(decision: &MoveDecision) -> Self {
        MoveResponse {
            move_index: decision.direction.map(|d| d.index() as u8),
            move_name: decision.direction.map(|d| d.name()),
            move_arrow: decision.glyph,
            depth: decision.depth,
            time_ms: decision.elapsed_ms,
            moves_evaled: decision.nodes,
            cachehits: decision.cache_hits,
        }
    }
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorResponse {
            error: error.into(),
            move_index: None,
        }
    }
}

/// Check dimensions and copy into the fixed grid shape. Cell values are
/// validated by the codec when the grid is encoded.
pub fn parse_grid(request: &MoveRequest) -> Result<[[u32; 4]; 4], BoardError> {
    let rows = request.board.len();
    let cols = request.board.iter().map(Vec::len).max().unwrap_or(0);
    if rows != 4 || request.board.iter().any(|row| row.len() != 4) {
        return Err(BoardError::BadShape { rows, cols });
    }
    let mut grid = [[0u32; 4]; 4];
    for (row, cells) in request.board.iter().enumerate() {
        grid[row].copy_from_slice(cells);
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Direction;

    #[test]
    fn parse_grid_requires_4x4() {
        let short = MoveRequest {
            board: vec![vec![0; 4]; 3],
        };
        assert_eq!(parse_grid(&short), Err(BoardError::BadShape { rows: 3, cols: 4 }));

        let ragged = MoveRequest {
            board: vec![vec![0; 4], vec![0; 5], vec![0; 4], vec![0; 4]],
        };
        assert_eq!(parse_grid(&ragged), Err(BoardError::BadShape { rows: 4, cols: 5 }));

        let ok = MoveRequest {
            board: vec![
                vec![2, 4, 8, 16],
                vec![0, 2, 4, 8],
                vec![0, 0, 2, 4],
                vec![0, 0, 0, 2],
            ],
        };
        assert_eq!(parse_grid(&ok).unwrap()[0], [2, 4, 8, 16]);
    }

    #[test]
    fn response_serializes_direction_fields() {
        let decision = MoveDecision {
            direction: Some(Direction::Left),
            glyph: Some(Direction::Left.arrow()),
            depth: 6,
            elapsed_ms: 1.5,
            nodes: 420,
            cache_hits: 17,
        };
        let value = serde_json::to_value(MoveResponse::from_decision(&decision)).unwrap();
        assert_eq!(value["move"], 3);
        assert_eq!(value["move_name"], "left");
        assert_eq!(value["move_arrow"], "←");
        assert_eq!(value["depth"], 6);
        assert_eq!(value["moves_evaled"], 420);
        assert_eq!(value["cachehits"], 17);
    }

    #[test]
    fn game_over_serializes_null_move() {
        let decision = MoveDecision {
            direction: None,
            glyph: None,
            depth: 12,
            elapsed_ms: 0.2,
            nodes: 1,
            cache_hits: 0,
        };
        let value = serde_json::to_value(MoveResponse::from_decision(&decision)).unwrap();
        assert!(value["move"].is_null());
        assert!(value["move_name"].is_null());
    }

    #[test]
    fn request_parses_from_json_line() {
        let line = r#"{"board":[[2,4,8,16],[0,2,4,8],[0,0,2,4],[0,0,0,2]]}"#;
        let request: MoveRequest = serde_json::from_str(line).unwrap();
        assert_eq!(request.board[0], vec![2, 4, 8, 16]);
    }
}
