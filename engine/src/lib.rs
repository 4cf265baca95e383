use anyhow::{bail, Result};

// 행마 계산은 movegen 크레이트 사용
use movegen::{log_debug, MoveGenerator, Offset, CELL_COUNT};

// 보드 타입을 공개적으로 재export
pub use movegen::{Cell, Color, Grid, GridError, Occupant, PieceKind, Square};

/// 커서 이동 방향
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,    // row + 1
    Down,  // row - 1
    Left,  // col - 1
    Right, // col + 1
}

impl Direction {
    pub fn offset(self) -> Offset {
        match self {
            Direction::Up => Offset::new(1, 0),
            Direction::Down => Offset::new(-1, 0),
            Direction::Left => Offset::new(0, -1),
            Direction::Right => Offset::new(0, 1),
        }
    }

    /// "up", "LEFT" 같은 이름에서 파싱
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// 입력 이벤트
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Cursor(Direction),
    Confirm,
}

/// 선택 상태
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Idle,
    Selected {
        at: Square,
        highlighted: Vec<Square>, // 선택 시점에 한 번 계산된 목적지
    },
}

/// 이벤트 처리 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    CursorMoved,
    Selected,
    Deselected,
    Moved,
    Rejected,
    Ignored,
}

impl Transition {
    pub fn name(self) -> &'static str {
        match self {
            Transition::CursorMoved => "cursor_moved",
            Transition::Selected => "selected",
            Transition::Deselected => "deselected",
            Transition::Moved => "moved",
            Transition::Rejected => "rejected",
            Transition::Ignored => "ignored",
        }
    }
}

/// 게임 설정
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub cursor_start: Square,
    pub debug: bool, // 행마 계산/상태 전이 디버그 로그
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cursor_start: Square::new(1, 1),
            debug: false,
        }
    }
}

/// 렌더러에 넘기는 읽기 전용 상태
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub cells: [Cell; CELL_COUNT],
    pub cursor: Square,
    pub selection: Option<Square>,
    pub highlighted: Vec<Square>,
}

impl Snapshot {
    pub fn cell(&self, square: Square) -> Option<Cell> {
        square.index().map(|i| self.cells[i])
    }

    pub fn is_highlighted(&self, square: Square) -> bool {
        self.highlighted.contains(&square)
    }

    /// 이동 모드 (선택이 있고 목적지가 하나 이상)
    pub fn in_move_mode(&self) -> bool {
        self.selection.is_some() && !self.highlighted.is_empty()
    }
}

/// 검증된 이동을 보드에 적용. `has_moved` 플래그는 여기서만 바뀐다
pub struct MoveExecutor;

impl MoveExecutor {
    /// `to`가 `highlighted`에 있을 때만 이동하고 true 반환.
    /// 킹이 2칸 이동하면 같은 방향의 룩을 킹 옆(출발한 쪽)으로 옮긴다.
    pub fn apply(
        grid: &mut Grid,
        from: Square,
        to: Square,
        highlighted: &[Square],
    ) -> Result<bool, GridError> {
        if !highlighted.contains(&to) {
            return Ok(false);
        }
        let mut mover = match grid.occupant_at(from)? {
            Some(occupant) => occupant,
            None => return Ok(false),
        };

        mover.has_moved = true;
        grid.set_cell(from, Cell::Empty)?;
        grid.set_cell(to, Cell::Occupied(mover))?;

        if mover.kind == PieceKind::King && (from.col - to.col).abs() == 2 {
            let dir = (to.col - from.col).signum();
            if let Some(rook_from) = Self::castling_rook(grid, to, dir, mover.color)? {
                if let Some(mut rook) = grid.occupant_at(rook_from)? {
                    rook.has_moved = true;
                    grid.set_cell(rook_from, Cell::Empty)?;
                    grid.set_cell(to.offset(Offset::new(0, -dir)), Cell::Occupied(rook))?;
                }
            }
        }

        Ok(true)
    }

    /// 킹 도착 칸에서 이동 방향으로 처음 만나는 기물이 움직이지 않은 아군 룩이면 그 위치
    fn castling_rook(
        grid: &Grid,
        king_to: Square,
        dir: i32,
        color: Color,
    ) -> Result<Option<Square>, GridError> {
        let step = Offset::new(0, dir);
        let mut scan = king_to.offset(step);
        while scan.is_valid() {
            if let Some(occupant) = grid.occupant_at(scan)? {
                let is_partner = occupant.kind == PieceKind::Rook
                    && occupant.color == color
                    && !occupant.has_moved;
                return Ok(is_partner.then_some(scan));
            }
            scan = scan.offset(step);
        }
        Ok(None)
    }
}

/// 게임 상태 (보드 + 커서 + 선택)
#[derive(Debug, Clone)]
pub struct GameState {
    grid: Grid,
    cursor: Square,
    selection: Selection,
    generator: MoveGenerator,
    pub debug_mode: bool, // 상태 전이 디버그 모드
}

impl GameState {
    /// 표준 배치로 새 게임
    pub fn new(config: GameConfig) -> Result<Self> {
        Self::with_grid(Grid::standard()?, config)
    }

    pub fn new_default() -> Result<Self> {
        Self::new(GameConfig::default())
    }

    /// 임의 배치로 게임 생성
    pub fn with_grid(grid: Grid, config: GameConfig) -> Result<Self> {
        if !config.cursor_start.is_valid() {
            bail!("커서 시작 위치 {}가 보드 밖입니다", config.cursor_start);
        }

        let mut generator = MoveGenerator::new();
        generator.set_debug(config.debug);

        Ok(Self {
            grid,
            cursor: config.cursor_start,
            selection: Selection::Idle,
            generator,
            debug_mode: config.debug,
        })
    }

    /// 디버그 모드 설정 (행마 계산 추적 포함)
    pub fn set_debug(&mut self, enabled: bool) {
        self.debug_mode = enabled;
        self.generator.set_debug(enabled);
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cursor(&self) -> Square {
        self.cursor
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected(&self) -> Option<Square> {
        match &self.selection {
            Selection::Idle => None,
            Selection::Selected { at, .. } => Some(*at),
        }
    }

    pub fn highlighted(&self) -> &[Square] {
        match &self.selection {
            Selection::Idle => &[],
            Selection::Selected { highlighted, .. } => highlighted,
        }
    }

    /// 커서 한 칸 이동 (보드 끝에서 멈춤). 선택과 목적지 목록은 그대로
    pub fn move_cursor(&mut self, direction: Direction) -> Square {
        self.cursor = self.cursor.offset(direction.offset()).clamped();
        self.cursor
    }

    /// 커서 칸에서 선택/해제/이동 시도
    pub fn confirm(&mut self) -> Result<Transition, GridError> {
        let cursor = self.cursor;

        // 이동 시도는 성공 여부와 관계없이 선택을 해제
        let transition = match std::mem::take(&mut self.selection) {
            Selection::Idle => {
                if self.grid.cell_at(cursor)?.is_empty() {
                    Transition::Ignored
                } else {
                    let highlighted = self.generator.legal_moves(&self.grid, cursor)?;
                    self.selection = Selection::Selected {
                        at: cursor,
                        highlighted,
                    };
                    Transition::Selected
                }
            }
            Selection::Selected { at, .. } if at == cursor => Transition::Deselected,
            Selection::Selected { at, highlighted } => {
                if MoveExecutor::apply(&mut self.grid, at, cursor, &highlighted)? {
                    Transition::Moved
                } else {
                    Transition::Rejected
                }
            }
        };

        if self.debug_mode {
            log_debug(&format!("[Game] confirm at {} -> {}", cursor, transition.name()));
            if transition == Transition::Moved {
                log_debug(&format!("[Game] board:\n{}", self.grid));
            }
        }

        Ok(transition)
    }

    /// 입력 이벤트 처리
    pub fn handle(&mut self, event: InputEvent) -> Result<Transition, GridError> {
        match event {
            InputEvent::Cursor(direction) => {
                self.move_cursor(direction);
                Ok(Transition::CursorMoved)
            }
            InputEvent::Confirm => self.confirm(),
        }
    }

    /// 상태를 값으로 넘겨받아 이벤트 적용 후 새 상태 반환
    pub fn update(mut self, event: InputEvent) -> Result<Self, GridError> {
        self.handle(event)?;
        Ok(self)
    }

    /// 특정 칸 기물의 목적지 목록 (선택 상태는 건드리지 않음)
    pub fn legal_moves_at(&self, square: Square) -> Result<Vec<Square>, GridError> {
        self.generator.legal_moves(&self.grid, square)
    }

    /// 커서 없이 직접 이동. 목적지 목록을 새로 계산해 검증
    pub fn move_piece(&mut self, from: Square, to: Square) -> Result<bool, GridError> {
        if !from.is_valid() || !to.is_valid() {
            return Ok(false);
        }
        let legal_moves = self.legal_moves_at(from)?;
        MoveExecutor::apply(&mut self.grid, from, to, &legal_moves)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            cells: *self.grid.cells(),
            cursor: self.cursor,
            selection: self.selected(),
            highlighted: self.highlighted().to_vec(),
        }
    }
}
