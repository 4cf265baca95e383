use std::fmt;

use board_engine::{Direction, GameConfig, GameState, PieceKind, Snapshot, Square};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// JS에서 사용할 게임 래퍼
#[wasm_bindgen]
pub struct Game {
    state: GameState,
}

/// JS로 전달할 좌표
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsSquare {
    pub row: i32,
    pub col: i32,
}

impl From<Square> for JsSquare {
    fn from(square: Square) -> Self {
        Self {
            row: square.row,
            col: square.col,
        }
    }
}

/// JS로 전달할 기물 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsPiece {
    pub row: i32,
    pub col: i32,
    pub kind: String,  // "king", "queen", ...
    pub color: String, // "light" | "dark"
    pub has_moved: bool,
}

/// JS로 전달할 이동 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsMove {
    pub from_row: i32,
    pub from_col: i32,
    pub to_row: i32,
    pub to_col: i32,
    pub is_capture: bool,
    pub is_castling: bool,
}

/// JS로 전달할 게임 상태 (렌더링용)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsGameState {
    pub pieces: Vec<JsPiece>,
    pub cursor: JsSquare,
    pub selected: Option<JsSquare>,
    pub highlighted: Vec<JsSquare>,
    pub move_mode: bool,
}

/// JS에서 받는 설정 (모든 필드 생략 가능)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsConfig {
    pub cursor_row: Option<i32>,
    pub cursor_col: Option<i32>,
    pub debug: bool,
}

impl JsConfig {
    pub fn into_config(self) -> GameConfig {
        let defaults = GameConfig::default();
        GameConfig {
            cursor_start: Square::new(
                self.cursor_row.unwrap_or(defaults.cursor_start.row),
                self.cursor_col.unwrap_or(defaults.cursor_start.col),
            ),
            debug: self.debug,
        }
    }
}

fn to_js_error(err: impl fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
impl Game {
    /// 새 게임 생성 (표준 배치). `config`는 생략 가능
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<Game, JsValue> {
        let config: JsConfig = if config.is_undefined() || config.is_null() {
            JsConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        let state = GameState::new(config.into_config()).map_err(to_js_error)?;
        Ok(Game { state })
    }

    /// 디버그 모드 설정 (행마 계산 추적)
    #[wasm_bindgen]
    pub fn set_debug(&mut self, enabled: bool) {
        self.state.set_debug(enabled);
    }

    /// 커서 이동 ("up" | "down" | "left" | "right"). 알 수 없는 방향이면 false
    #[wasm_bindgen]
    pub fn move_cursor(&mut self, direction: &str) -> bool {
        match Direction::from_name(direction) {
            Some(direction) => {
                self.state.move_cursor(direction);
                true
            }
            None => false,
        }
    }

    /// 선택/해제/이동 시도. 결과 이름 반환
    #[wasm_bindgen]
    pub fn confirm(&mut self) -> Result<String, JsValue> {
        let transition = self.state.confirm().map_err(to_js_error)?;
        Ok(transition.name().to_string())
    }

    /// 현재 게임 상태를 JS 객체로 반환
    #[wasm_bindgen]
    pub fn get_state(&self) -> Result<JsValue, JsValue> {
        let js_state = build_js_state(&self.state.snapshot());
        Ok(serde_wasm_bindgen::to_value(&js_state)?)
    }

    /// 특정 칸의 기물이 갈 수 있는 칸 목록
    #[wasm_bindgen]
    pub fn get_legal_moves(&self, row: i32, col: i32) -> Result<JsValue, JsValue> {
        let js_moves = build_js_moves(&self.state, Square::new(row, col)).map_err(to_js_error)?;
        Ok(serde_wasm_bindgen::to_value(&js_moves)?)
    }

    /// 커서를 거치지 않고 기물 이동
    #[wasm_bindgen]
    pub fn move_piece(&mut self, from_row: i32, from_col: i32, to_row: i32, to_col: i32) -> bool {
        let from = Square::new(from_row, from_col);
        let to = Square::new(to_row, to_col);
        self.state.move_piece(from, to).unwrap_or(false)
    }
}

fn build_js_state(snapshot: &Snapshot) -> JsGameState {
    let pieces = snapshot
        .cells
        .iter()
        .enumerate()
        .filter_map(|(index, cell)| {
            let occupant = cell.occupant()?;
            let square = Square::from_index(index)?;
            Some(JsPiece {
                row: square.row,
                col: square.col,
                kind: occupant.kind.name().to_string(),
                color: occupant.color.name().to_string(),
                has_moved: occupant.has_moved,
            })
        })
        .collect();

    JsGameState {
        pieces,
        cursor: snapshot.cursor.into(),
        selected: snapshot.selection.map(JsSquare::from),
        highlighted: snapshot.highlighted.iter().copied().map(JsSquare::from).collect(),
        move_mode: snapshot.in_move_mode(),
    }
}

/// 보드 밖 좌표나 빈 칸이면 빈 목록
fn build_js_moves(state: &GameState, from: Square) -> Result<Vec<JsMove>, board_engine::GridError> {
    if !from.is_valid() {
        return Ok(Vec::new());
    }
    let mover = match state.grid().occupant_at(from)? {
        Some(occupant) => occupant,
        None => return Ok(Vec::new()),
    };

    let mut js_moves = Vec::new();
    for to in state.legal_moves_at(from)? {
        js_moves.push(JsMove {
            from_row: from.row,
            from_col: from.col,
            to_row: to.row,
            to_col: to.col,
            is_capture: state.grid().occupant_at(to)?.is_some(),
            is_castling: mover.kind == PieceKind::King && (to.col - from.col).abs() == 2,
        });
    }
    Ok(js_moves)
}

#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "debug")]
    console_error_panic_hook::set_once();

    web_sys::console::log_1(&"Board engine WASM initialized!".into());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_js_state() {
        let state = GameState::new_default().unwrap();
        let js_state = build_js_state(&state.snapshot());

        assert_eq!(js_state.pieces.len(), 32);
        assert_eq!(js_state.cursor, JsSquare { row: 1, col: 1 });
        assert_eq!(js_state.selected, None);
        assert!(js_state.highlighted.is_empty());
        assert!(!js_state.move_mode);

        let king = js_state
            .pieces
            .iter()
            .find(|p| p.row == 1 && p.col == 5)
            .unwrap();
        assert_eq!(king.kind, "king");
        assert_eq!(king.color, "light");
        assert!(!king.has_moved);
    }

    #[test]
    fn test_js_state_after_selection() {
        let mut state = GameState::new_default().unwrap();
        state.move_cursor(Direction::Right);
        state.confirm().unwrap();

        let js_state = build_js_state(&state.snapshot());
        assert_eq!(js_state.selected, Some(JsSquare { row: 1, col: 2 }));
        assert_eq!(js_state.highlighted.len(), 2);
        assert!(js_state.move_mode);
    }

    #[test]
    fn test_js_moves_flags() {
        let grid = board_engine::Grid::from_ranks(&[
            "........",
            "........",
            "........",
            "........",
            "........",
            "........",
            "....n...",
            "....K..R",
        ])
        .unwrap();
        let state = GameState::with_grid(grid, GameConfig::default()).unwrap();

        let moves = build_js_moves(&state, Square::new(1, 5)).unwrap();
        let capture = moves.iter().find(|m| m.to_row == 2 && m.to_col == 5).unwrap();
        assert!(capture.is_capture);
        assert!(!capture.is_castling);

        let castle = moves.iter().find(|m| m.to_row == 1 && m.to_col == 7).unwrap();
        assert!(castle.is_castling);
        assert!(!castle.is_capture);

        assert!(build_js_moves(&state, Square::new(4, 4)).unwrap().is_empty());
        assert!(build_js_moves(&state, Square::new(0, 9)).unwrap().is_empty());
    }

    #[test]
    fn test_js_config_defaults() {
        let config = JsConfig::default().into_config();
        assert_eq!(config, GameConfig::default());

        let config = JsConfig {
            cursor_row: Some(4),
            cursor_col: None,
            debug: true,
        }
        .into_config();
        assert_eq!(config.cursor_start, Square::new(4, 1));
        assert!(config.debug);

        let config = JsConfig {
            cursor_row: Some(9),
            ..JsConfig::default()
        }
        .into_config();
        assert!(GameState::new(config).is_err());
    }
}
