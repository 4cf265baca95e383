use std::fmt;

use anyhow::{bail, Result};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

/// 디버그 로그 출력 (WASM 환경에서는 JS console.log로 전달)
#[cfg(target_arch = "wasm32")]
pub fn log_debug(msg: &str) {
    log(msg);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn log_debug(msg: &str) {
    println!("DEBUG: {}", msg);
}

/// 보드 한 변의 칸 수
pub const BOARD_SIZE: i32 = 8;

/// 보드 전체 칸 수
pub const CELL_COUNT: usize = (BOARD_SIZE * BOARD_SIZE) as usize;

/// 표준 초기 배치 (8랭크부터 1랭크 순서, 대문자 = 밝은 색)
pub const STANDARD_RANKS: [&str; 8] = [
    "rnbqkbnr",
    "pppppppp",
    "........",
    "........",
    "........",
    "........",
    "PPPPPPPP",
    "RNBQKBNR",
];

/// 보드 좌표 (1-indexed: row=1~8, col=1~8)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    pub row: i32, // 1=밝은 색 백랭크
    pub col: i32, // 1=a, 8=h
}

impl Square {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn is_valid(&self) -> bool {
        (1..=BOARD_SIZE).contains(&self.row) && (1..=BOARD_SIZE).contains(&self.col)
    }

    /// 방향 벡터만큼 이동한 좌표 (범위 검사 없음)
    pub fn offset(self, by: Offset) -> Self {
        Self::new(self.row + by.dr, self.col + by.dc)
    }

    /// 보드 범위로 잘라낸 좌표
    pub fn clamped(self) -> Self {
        Self::new(
            self.row.clamp(1, BOARD_SIZE),
            self.col.clamp(1, BOARD_SIZE),
        )
    }

    /// 평면 배열 인덱스: (row-1)*8 + (col-1)
    pub fn index(&self) -> Option<usize> {
        if self.is_valid() {
            Some(((self.row - 1) * BOARD_SIZE + (self.col - 1)) as usize)
        } else {
            None
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        if index >= CELL_COUNT {
            return None;
        }
        let index = index as i32;
        Some(Self::new(index / BOARD_SIZE + 1, index % BOARD_SIZE + 1))
    }

    /// "e4" 같은 문자열에서 파싱
    pub fn from_notation(s: &str) -> Option<Self> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 2 {
            return None;
        }
        let col = (chars[0] as i32) - ('a' as i32) + 1;
        let row = (chars[1] as i32) - ('1' as i32) + 1;
        let square = Self::new(row, col);
        square.is_valid().then_some(square)
    }

    /// 체스 표기법으로 변환. 보드 밖 좌표면 None
    pub fn to_notation(&self) -> Option<String> {
        if !self.is_valid() {
            return None;
        }
        let file = (b'a' + (self.col - 1) as u8) as char;
        let rank = (b'1' + (self.row - 1) as u8) as char;
        Some(format!("{}{}", file, rank))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.to_notation() {
            Some(notation) => write!(f, "{}", notation),
            None => write!(f, "({}, {})", self.row, self.col),
        }
    }
}

/// 방향 벡터 (행, 열 증가량)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Offset {
    pub dr: i32,
    pub dc: i32,
}

impl Offset {
    pub const fn new(dr: i32, dc: i32) -> Self {
        Self { dr, dc }
    }
}

pub const ORTHOGONAL: [Offset; 4] = [
    Offset::new(1, 0),
    Offset::new(-1, 0),
    Offset::new(0, 1),
    Offset::new(0, -1),
];

pub const DIAGONAL: [Offset; 4] = [
    Offset::new(1, 1),
    Offset::new(1, -1),
    Offset::new(-1, 1),
    Offset::new(-1, -1),
];

pub const ALL_DIRECTIONS: [Offset; 8] = [
    Offset::new(1, 0),
    Offset::new(-1, 0),
    Offset::new(0, 1),
    Offset::new(0, -1),
    Offset::new(1, 1),
    Offset::new(1, -1),
    Offset::new(-1, 1),
    Offset::new(-1, -1),
];

pub const KNIGHT_OFFSETS: [Offset; 8] = [
    Offset::new(1, 2),
    Offset::new(2, 1),
    Offset::new(2, -1),
    Offset::new(1, -2),
    Offset::new(-1, 2),
    Offset::new(-2, 1),
    Offset::new(-2, -1),
    Offset::new(-1, -2),
];

/// 기물 색상
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Light,
    Dark,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::Light => Color::Dark,
            Color::Dark => Color::Light,
        }
    }

    /// 폰의 전진 방향 (밝은 색은 8랭크 쪽, 어두운 색은 1랭크 쪽)
    pub fn forward(self) -> i32 {
        match self {
            Color::Light => 1,
            Color::Dark => -1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Light => "light",
            Color::Dark => "dark",
        }
    }
}

/// 기물 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

/// 행마 패턴
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// 방향별 광선 (첫 기물에서 멈춤)
    Rays(&'static [Offset]),
    /// 고정 오프셋 도약 (중간 기물 무시)
    Leaps(&'static [Offset]),
    /// 전진 이동 + 대각선 잡기
    Pawn,
}

/// 기물 종류별 행마 규칙 테이블 항목
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRule {
    pub pattern: Pattern,
    pub single_step: bool,
    pub castles: bool,
}

impl PieceKind {
    pub fn rule(self) -> MoveRule {
        match self {
            PieceKind::King => MoveRule {
                pattern: Pattern::Rays(&ALL_DIRECTIONS),
                single_step: true,
                castles: true,
            },
            PieceKind::Queen => MoveRule {
                pattern: Pattern::Rays(&ALL_DIRECTIONS),
                single_step: false,
                castles: false,
            },
            PieceKind::Rook => MoveRule {
                pattern: Pattern::Rays(&ORTHOGONAL),
                single_step: false,
                castles: false,
            },
            PieceKind::Bishop => MoveRule {
                pattern: Pattern::Rays(&DIAGONAL),
                single_step: false,
                castles: false,
            },
            PieceKind::Knight => MoveRule {
                pattern: Pattern::Leaps(&KNIGHT_OFFSETS),
                single_step: true,
                castles: false,
            },
            PieceKind::Pawn => MoveRule {
                pattern: Pattern::Pawn,
                single_step: true,
                castles: false,
            },
        }
    }

    /// 중간 기물을 뛰어넘는지 (나이트만)
    pub fn can_jump(self) -> bool {
        matches!(self.rule().pattern, Pattern::Leaps(_))
    }

    /// 배치 문자열 기호 (밝은 색 기준 대문자)
    pub fn symbol(self) -> char {
        match self {
            PieceKind::King => 'K',
            PieceKind::Queen => 'Q',
            PieceKind::Rook => 'R',
            PieceKind::Bishop => 'B',
            PieceKind::Knight => 'N',
            PieceKind::Pawn => 'P',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PieceKind::King => "king",
            PieceKind::Queen => "queen",
            PieceKind::Rook => "rook",
            PieceKind::Bishop => "bishop",
            PieceKind::Knight => "knight",
            PieceKind::Pawn => "pawn",
        }
    }
}

/// 기물
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Occupant {
    pub kind: PieceKind,
    pub color: Color,
    pub has_moved: bool, // 한 번이라도 이동했는지 (캐슬링, 폰 2칸 전진 판정)
}

impl Occupant {
    pub fn new(kind: PieceKind, color: Color) -> Self {
        Self {
            kind,
            color,
            has_moved: false,
        }
    }

    pub fn can_jump(&self) -> bool {
        self.kind.can_jump()
    }

    /// 배치 기호에서 파싱 (대문자 = 밝은 색, 소문자 = 어두운 색)
    pub fn from_symbol(symbol: char) -> Result<Self> {
        let kind = match symbol.to_ascii_uppercase() {
            'K' => PieceKind::King,
            'Q' => PieceKind::Queen,
            'R' => PieceKind::Rook,
            'B' => PieceKind::Bishop,
            'N' => PieceKind::Knight,
            'P' => PieceKind::Pawn,
            _ => bail!("알 수 없는 기물 기호입니다: '{}'", symbol),
        };
        let color = if symbol.is_ascii_uppercase() {
            Color::Light
        } else {
            Color::Dark
        };
        Ok(Self::new(kind, color))
    }

    pub fn symbol(&self) -> char {
        match self.color {
            Color::Light => self.kind.symbol(),
            Color::Dark => self.kind.symbol().to_ascii_lowercase(),
        }
    }
}

/// 칸 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Occupant),
}

impl Cell {
    pub fn occupant(&self) -> Option<Occupant> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(occupant) => Some(*occupant),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn symbol(&self) -> char {
        self.occupant().map_or('.', |o| o.symbol())
    }
}

/// 보드 접근 오류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    OutOfRange { row: i32, col: i32 },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GridError::OutOfRange { row, col } => write!(
                f,
                "좌표 ({}, {})가 보드 범위(1~{})를 벗어났습니다",
                row, col, BOARD_SIZE
            ),
        }
    }
}

impl std::error::Error for GridError {}

/// 8x8 보드 (64칸 평면 배열)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: [Cell; CELL_COUNT],
}

impl Default for Grid {
    fn default() -> Self {
        Self::empty()
    }
}

impl Grid {
    pub fn empty() -> Self {
        Self {
            cells: [Cell::Empty; CELL_COUNT],
        }
    }

    /// 표준 초기 배치
    pub fn standard() -> Result<Self> {
        Self::from_ranks(&STANDARD_RANKS)
    }

    /// 랭크 문자열(8랭크부터)로 보드 생성. 모든 기물은 이동하지 않은 상태로 시작
    pub fn from_ranks(ranks: &[&str]) -> Result<Self> {
        if ranks.len() != BOARD_SIZE as usize {
            bail!("배치에는 {}개의 랭크가 필요합니다 (입력: {})", BOARD_SIZE, ranks.len());
        }

        let mut grid = Self::empty();
        for (i, rank) in ranks.iter().enumerate() {
            let row = BOARD_SIZE - i as i32;
            let symbols: Vec<char> = rank.chars().collect();
            if symbols.len() != BOARD_SIZE as usize {
                bail!(
                    "{}랭크의 칸 수가 {}개입니다 (필요: {})",
                    row,
                    symbols.len(),
                    BOARD_SIZE
                );
            }
            for (j, symbol) in symbols.into_iter().enumerate() {
                if symbol == '.' {
                    continue;
                }
                let occupant = Occupant::from_symbol(symbol)?;
                grid.set(row, j as i32 + 1, Cell::Occupied(occupant))?;
            }
        }
        Ok(grid)
    }

    fn index_of(row: i32, col: i32) -> Result<usize, GridError> {
        Square::new(row, col)
            .index()
            .ok_or(GridError::OutOfRange { row, col })
    }

    pub fn at(&self, row: i32, col: i32) -> Result<Cell, GridError> {
        Ok(self.cells[Self::index_of(row, col)?])
    }

    pub fn set(&mut self, row: i32, col: i32, cell: Cell) -> Result<(), GridError> {
        let index = Self::index_of(row, col)?;
        self.cells[index] = cell;
        Ok(())
    }

    pub fn cell_at(&self, square: Square) -> Result<Cell, GridError> {
        self.at(square.row, square.col)
    }

    pub fn set_cell(&mut self, square: Square, cell: Cell) -> Result<(), GridError> {
        self.set(square.row, square.col, cell)
    }

    pub fn occupant_at(&self, square: Square) -> Result<Option<Occupant>, GridError> {
        Ok(self.cell_at(square)?.occupant())
    }

    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.cells
    }

    /// (좌표, 칸) 순회. a1, b1, ... h8 순서
    pub fn iter(&self) -> impl Iterator<Item = (Square, Cell)> + '_ {
        self.cells.iter().enumerate().filter_map(|(index, cell)| {
            Square::from_index(index).map(|square| (square, *cell))
        })
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in (1..=BOARD_SIZE).rev() {
            for col in 1..=BOARD_SIZE {
                let index = ((row - 1) * BOARD_SIZE + (col - 1)) as usize;
                write!(f, "{}", self.cells[index].symbol())?;
            }
            if row > 1 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// 한 방향 광선 계산.
///
/// 빈 칸은 추가 후 계속 진행하고, 아군 칸에서는 추가 없이 멈추며, 적 칸은
/// 잡기 칸으로 추가한 뒤 멈춘다. `single_step`이면 첫 빈 칸 이후 멈춘다.
pub fn cast_ray(
    grid: &Grid,
    origin: Square,
    color: Color,
    direction: Offset,
    single_step: bool,
) -> Result<Vec<Square>, GridError> {
    let mut reachable = Vec::new();
    let mut current = origin.offset(direction);

    while current.is_valid() {
        match grid.cell_at(current)? {
            Cell::Empty => {
                reachable.push(current);
                if single_step {
                    break;
                }
            }
            Cell::Occupied(other) => {
                if other.color == color.opponent() {
                    reachable.push(current);
                }
                break;
            }
        }
        current = current.offset(direction);
    }

    Ok(reachable)
}

/// 기물별 이동 가능한 칸 계산기
#[derive(Debug, Clone, Default)]
pub struct MoveGenerator {
    pub debug: bool, // 디버그 모드 활성화 여부
}

impl MoveGenerator {
    pub fn new() -> Self {
        Self { debug: false }
    }

    /// 디버그 모드 설정
    pub fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
    }

    /// `from`에 있는 기물의 목적지 목록. 빈 칸이면 빈 목록
    pub fn legal_moves(&self, grid: &Grid, from: Square) -> Result<Vec<Square>, GridError> {
        let occupant = match grid.cell_at(from)? {
            Cell::Empty => return Ok(Vec::new()),
            Cell::Occupied(occupant) => occupant,
        };
        let rule = occupant.kind.rule();

        let mut moves = Vec::new();
        match rule.pattern {
            Pattern::Rays(directions) => {
                for &direction in directions {
                    moves.extend(cast_ray(grid, from, occupant.color, direction, rule.single_step)?);
                }
            }
            Pattern::Leaps(offsets) => {
                moves.extend(leap_targets(grid, from, occupant.color, offsets)?);
            }
            Pattern::Pawn => {
                moves.extend(pawn_targets(grid, from, &occupant)?);
            }
        }

        if rule.castles && !occupant.has_moved {
            moves.extend(castling_targets(grid, from, occupant.color)?);
        }

        if self.debug {
            log_debug(&format!(
                "[MoveGen] {} {} at {}: {} moves",
                occupant.color.name(),
                occupant.kind.name(),
                from,
                moves.len()
            ));
            for to in &moves {
                log_debug(&format!("    → {}", to));
            }
        }

        Ok(moves)
    }
}

/// 도약: 범위 안이고 아군이 없으면 가능
fn leap_targets(
    grid: &Grid,
    from: Square,
    color: Color,
    offsets: &[Offset],
) -> Result<Vec<Square>, GridError> {
    let mut targets = Vec::new();
    for &offset in offsets {
        let to = from.offset(offset);
        if !to.is_valid() {
            continue;
        }
        match grid.cell_at(to)? {
            Cell::Occupied(other) if other.color == color => {}
            _ => targets.push(to),
        }
    }
    Ok(targets)
}

/// 폰: 2칸 전진(첫 이동), 1칸 전진, 전방 대각선은 적이 있을 때만
fn pawn_targets(grid: &Grid, from: Square, pawn: &Occupant) -> Result<Vec<Square>, GridError> {
    let forward = pawn.color.forward();
    let one = from.offset(Offset::new(forward, 0));
    let two = from.offset(Offset::new(2 * forward, 0));

    let mut targets = Vec::new();
    let one_empty = one.is_valid() && grid.cell_at(one)?.is_empty();

    if !pawn.has_moved && one_empty && two.is_valid() && grid.cell_at(two)?.is_empty() {
        targets.push(two);
    }
    if one_empty {
        targets.push(one);
    }

    for dc in [-1, 1] {
        let diagonal = from.offset(Offset::new(forward, dc));
        if !diagonal.is_valid() {
            continue;
        }
        if let Some(other) = grid.occupant_at(diagonal)? {
            if other.color != pawn.color {
                targets.push(diagonal);
            }
        }
    }

    Ok(targets)
}

/// 캐슬링 후보: 킹 행을 양쪽으로 훑어 빈 칸을 건너뛴 뒤 처음 만나는 기물이
/// 움직이지 않은 아군 룩이면 그 방향 2칸 옆을 제공한다.
fn castling_targets(grid: &Grid, from: Square, color: Color) -> Result<Vec<Square>, GridError> {
    let mut targets = Vec::new();

    for dc in [-1, 1] {
        let step = Offset::new(0, dc);
        let mut scan = from.offset(step);
        while scan.is_valid() && grid.cell_at(scan)?.is_empty() {
            scan = scan.offset(step);
        }
        if !scan.is_valid() {
            continue;
        }

        let rook = match grid.occupant_at(scan)? {
            Some(rook) => rook,
            None => continue,
        };
        if rook.kind != PieceKind::Rook || rook.color != color || rook.has_moved {
            continue;
        }
        // 킹의 도착 칸은 킹과 룩 사이에 있어야 함
        if (scan.col - from.col).abs() < 3 {
            continue;
        }

        targets.push(from.offset(Offset::new(0, 2 * dc)));
    }

    Ok(targets)
}
