/*
 * 象棋棋盘模块（Board 与棋子表示）
 *
 * 设计要点
 * - 棋盘尺寸为 9 列 x 10 行，行号 row 0..=9，列号 col 0..=8
 * - 棋子用 Chess 枚举表示，分黑方/红方与具体棋种；Chess::None 表示空格
 * - 棋子与 0..=14 的整数编码一一对应：黑方 1..=7，红方 8..=14，0 为空
 * - Orientation 记录红方画在下方还是上方，所有走法规则都只依赖 Board 本身
 * - Move 只记录起点、终点、走的子、所在层与分数；被吃的子由 apply_move 返回，
 *   必须原样交给 undo_move，不能重新计算
 */

use std::fmt;
use std::str::FromStr;

use crate::constant::FEN_MAP;
use crate::error::{EngineError, EngineResult};

pub const BOARD_WIDTH: i32 = 9;
pub const BOARD_HEIGHT: i32 = 10;

pub type Grid<T> = [[T; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Chess {
    Black(ChessType),
    Red(ChessType),
    None,
}

impl Chess {
    /// 整数编码：0 为空，黑方 1..=7，红方 8..=14
    pub fn code(&self) -> u8 {
        match self {
            Chess::Black(ct) => ct.code(),
            Chess::Red(ct) => ct.code() + 7,
            Chess::None => 0,
        }
    }

    pub fn from_code(code: u8) -> EngineResult<Chess> {
        match code {
            0 => Ok(Chess::None),
            1..=7 => Ok(Chess::Black(ChessType::ALL[code as usize - 1])),
            8..=14 => Ok(Chess::Red(ChessType::ALL[code as usize - 8])),
            _ => Err(EngineError::InvalidPieceCode(code)),
        }
    }

    pub fn is_none(&self) -> bool {
        *self == Chess::None
    }

    pub fn belong_to(&self, player: Player) -> bool {
        Some(player) == self.player()
    }

    /// 两个子是否同色，空格和任何子都不同色
    pub fn same_side(&self, other: Chess) -> bool {
        match (self.player(), other.player()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub fn chess_type(&self) -> Option<ChessType> {
        match self {
            Chess::Black(ct) | Chess::Red(ct) => Some(*ct),
            Chess::None => None,
        }
    }

    pub fn player(&self) -> Option<Player> {
        match self {
            Chess::Black(_) => Some(Player::Black),
            Chess::Red(_) => Some(Player::Red),
            Chess::None => None,
        }
    }

    pub fn fen_char(&self) -> char {
        match self {
            Chess::Black(ct) => ct.fen_char(),
            Chess::Red(ct) => ct.fen_char().to_ascii_uppercase(),
            Chess::None => '.',
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ChessType {
    King,    // 帅
    Rook,    // 车
    Knight,  // 马
    Cannon,  // 炮
    Advisor, // 士
    Bishop,  // 相
    Pawn,    // 兵
}

impl ChessType {
    /// 按整数编码排列
    pub const ALL: [ChessType; 7] = [
        ChessType::King,
        ChessType::Rook,
        ChessType::Knight,
        ChessType::Cannon,
        ChessType::Advisor,
        ChessType::Bishop,
        ChessType::Pawn,
    ];

    pub fn code(&self) -> u8 {
        match self {
            ChessType::King => 1,
            ChessType::Rook => 2,
            ChessType::Knight => 3,
            ChessType::Cannon => 4,
            ChessType::Advisor => 5,
            ChessType::Bishop => 6,
            ChessType::Pawn => 7,
        }
    }

    /// 棋子基本价值
    pub fn material_value(&self) -> i32 {
        match self {
            ChessType::King => 10000,
            ChessType::Rook => 500,
            ChessType::Knight => 350,
            ChessType::Cannon => 350,
            ChessType::Advisor => 250,
            ChessType::Bishop => 250,
            ChessType::Pawn => 100,
        }
    }

    /// 每一个可走位置的灵活性分数
    pub fn flexibility(&self) -> i32 {
        match self {
            ChessType::King => 0,
            ChessType::Rook => 6,
            ChessType::Knight => 12,
            ChessType::Cannon => 6,
            ChessType::Advisor => 1,
            ChessType::Bishop => 1,
            ChessType::Pawn => 15,
        }
    }

    pub fn fen_char(&self) -> char {
        match self {
            ChessType::King => 'k',
            ChessType::Rook => 'r',
            ChessType::Knight => 'n',
            ChessType::Cannon => 'c',
            ChessType::Advisor => 'a',
            ChessType::Bishop => 'b',
            ChessType::Pawn => 'p',
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Player {
    Red,
    Black,
}

impl Player {
    pub fn next(&self) -> Player {
        if self == &Player::Red {
            Player::Black
        } else {
            Player::Red
        }
    }
}

/// 红方画在棋盘下方（up_red = false）还是上方（up_red = true）
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Orientation {
    #[default]
    RedBottom,
    RedTop,
}

impl Orientation {
    pub fn from_up_red(up_red: bool) -> Self {
        if up_red {
            Orientation::RedTop
        } else {
            Orientation::RedBottom
        }
    }

    /// 在棋盘下方（行号 5..=9）的一方
    pub fn bottom_player(&self) -> Player {
        match self {
            Orientation::RedBottom => Player::Red,
            Orientation::RedTop => Player::Black,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Position { row, col }
    }
    pub fn left(&self, delta: i32) -> Self {
        Position::new(self.row, self.col - delta)
    }
    pub fn right(&self, delta: i32) -> Self {
        Position::new(self.row, self.col + delta)
    }
    pub fn offset(&self, d_row: i32, d_col: i32) -> Self {
        Position::new(self.row + d_row, self.col + d_col)
    }
    pub fn flip_rows(&self) -> Self {
        Position::new(BOARD_HEIGHT - 1 - self.row, self.col)
    }

    pub fn in_board(&self) -> bool {
        self.row >= 0 && self.row < BOARD_HEIGHT && self.col >= 0 && self.col < BOARD_WIDTH
    }

    /// 越界时报 OutOfRange，供对外接口使用
    pub fn check(&self) -> EngineResult<Position> {
        if !(0..BOARD_HEIGHT).contains(&self.row) {
            return Err(EngineError::OutOfRange {
                what: "row",
                index: self.row,
                limit: BOARD_HEIGHT,
            });
        }
        if !(0..BOARD_WIDTH).contains(&self.col) {
            return Err(EngineError::OutOfRange {
                what: "col",
                index: self.col,
                limit: BOARD_WIDTH,
            });
        }
        Ok(*self)
    }
}

// ICCS 坐标：列 a..i，行 0..9，0 为棋盘最下面一行
impl FromStr for Position {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 || !(b'a'..=b'i').contains(&bytes[0]) || !bytes[1].is_ascii_digit() {
            return Err(EngineError::InvalidMove(s.to_owned()));
        }
        Ok(Position::new(
            BOARD_HEIGHT - 1 - (bytes[1] - b'0') as i32,
            (bytes[0] - b'a') as i32,
        ))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            (b'a' + self.col as u8) as char,
            BOARD_HEIGHT - 1 - self.row
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub chess: Chess,   // 走的子
    pub from: Position, // 起手位置
    pub to: Position,   // 落子位置
    pub ply: usize,     // 产生该走法时的剩余深度
    pub score: i32,
}

impl Move {
    pub fn new(chess: Chess, from: Position, to: Position, ply: usize) -> Move {
        Move {
            chess,
            from,
            to,
            ply,
            score: 0,
        }
    }

    /// (fromRow, fromCol, toRow, toCol)
    pub fn coords(&self) -> (i32, i32, i32, i32) {
        (self.from.row, self.from.col, self.to.row, self.to.col)
    }

    pub fn same_squares(&self, other: &Move) -> bool {
        self.from == other.from && self.to == other.to
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

/// 按行优先遍历全部 90 个格子
pub fn squares() -> impl Iterator<Item = Position> {
    (0..BOARD_HEIGHT).flat_map(|row| (0..BOARD_WIDTH).map(move |col| Position::new(row, col)))
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    pub chesses: Grid<Chess>,
    pub orientation: Orientation,
}

const BACK_RANK: [ChessType; 9] = [
    ChessType::Rook,
    ChessType::Knight,
    ChessType::Bishop,
    ChessType::Advisor,
    ChessType::King,
    ChessType::Advisor,
    ChessType::Bishop,
    ChessType::Knight,
    ChessType::Rook,
];

impl Board {
    pub fn empty(orientation: Orientation) -> Self {
        Board {
            chesses: [[Chess::None; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
            orientation,
        }
    }

    // 标准开局：下方一方占 6..=9 行，上方一方占 0..=3 行
    pub fn init(orientation: Orientation) -> Self {
        let mut board = Board::empty(orientation);
        let bottom = orientation.bottom_player();
        let top = bottom.next();
        let side = |player: Player, ct: ChessType| match player {
            Player::Red => Chess::Red(ct),
            Player::Black => Chess::Black(ct),
        };
        for (col, ct) in BACK_RANK.iter().enumerate() {
            let col = col as i32;
            board.set_chess(Position::new(0, col), side(top, *ct));
            board.set_chess(Position::new(9, col), side(bottom, *ct));
        }
        for col in [1, 7] {
            board.set_chess(Position::new(2, col), side(top, ChessType::Cannon));
            board.set_chess(Position::new(7, col), side(bottom, ChessType::Cannon));
        }
        for col in (0..BOARD_WIDTH).step_by(2) {
            board.set_chess(Position::new(3, col), side(top, ChessType::Pawn));
            board.set_chess(Position::new(6, col), side(bottom, ChessType::Pawn));
        }
        board
    }

    pub fn from_codes(codes: &Grid<u8>, orientation: Orientation) -> EngineResult<Self> {
        let mut board = Board::empty(orientation);
        for pos in squares() {
            board.set_chess(pos, Chess::from_code(codes[pos.row as usize][pos.col as usize])?);
        }
        Ok(board)
    }

    pub fn to_codes(&self) -> Grid<u8> {
        let mut codes = [[0; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
        for pos in squares() {
            codes[pos.row as usize][pos.col as usize] = self.chess_at(pos).code();
        }
        codes
    }

    /// 解析 FEN，返回局面与轮到走棋的一方；FEN 总是红方在下
    pub fn from_fen(fen: &str) -> EngineResult<(Self, Player)> {
        let invalid = |reason| EngineError::InvalidFen {
            fen: fen.to_owned(),
            reason,
        };
        let mut board = Board::empty(Orientation::RedBottom);
        let mut parts = fen.split_whitespace();
        let pos = parts.next().ok_or_else(|| invalid("empty"))?;

        let rows: Vec<&str> = pos.split('/').collect();
        if rows.len() != BOARD_HEIGHT as usize {
            return Err(invalid("expected 10 ranks"));
        }
        for (i, row) in rows.iter().enumerate() {
            let mut j = 0;
            for col in row.chars() {
                if let Some(n) = col.to_digit(10) {
                    j += n as i32;
                } else {
                    let chess = FEN_MAP.get(&col).ok_or_else(|| invalid("unknown piece"))?;
                    if j >= BOARD_WIDTH {
                        return Err(invalid("rank too long"));
                    }
                    board.set_chess(Position::new(i as i32, j), *chess);
                    j += 1;
                }
            }
            if j != BOARD_WIDTH {
                return Err(invalid("rank must have 9 files"));
            }
        }

        let turn = match parts.next() {
            None | Some("w") | Some("r") => Player::Red,
            Some("b") => Player::Black,
            Some(_) => return Err(invalid("unknown side to move")),
        };
        Ok((board, turn))
    }

    pub fn chess_at(&self, pos: Position) -> Chess {
        if pos.in_board() {
            self.chesses[pos.row as usize][pos.col as usize]
        } else {
            Chess::None
        }
    }

    pub fn piece(&self, pos: Position) -> EngineResult<Chess> {
        pos.check().map(|pos| self.chess_at(pos))
    }

    pub fn set_chess(&mut self, pos: Position, chess: Chess) {
        self.chesses[pos.row as usize][pos.col as usize] = chess;
    }

    // 走一步：起点的子搬到终点，返回终点原来的子（可能为空）
    pub fn apply_move(&mut self, m: &Move) -> Chess {
        let captured = self.chess_at(m.to);
        self.set_chess(m.to, self.chess_at(m.from));
        self.set_chess(m.from, Chess::None);
        captured
    }

    // 撤销走子，captured 必须是对应 apply_move 的返回值
    pub fn undo_move(&mut self, m: &Move, captured: Chess) {
        self.set_chess(m.from, self.chess_at(m.to));
        self.set_chess(m.to, captured);
    }

    /// 九宫格所在的三行
    pub fn palace_rows(&self, player: Player) -> std::ops::RangeInclusive<i32> {
        if player == self.orientation.bottom_player() {
            7..=9
        } else {
            0..=2
        }
    }

    // 棋子是否在九宫格内
    pub fn in_palace(&self, pos: Position, player: Player) -> bool {
        (3..=5).contains(&pos.col) && self.palace_rows(player).contains(&pos.row)
    }

    // 该行是否在玩家的楚河汉界以内
    pub fn in_country(&self, row: i32, player: Player) -> bool {
        if player == self.orientation.bottom_player() {
            (5..BOARD_HEIGHT).contains(&row)
        } else {
            (0..5).contains(&row)
        }
    }

    /// 兵前进一步的行增量
    pub fn forward(&self, player: Player) -> i32 {
        if player == self.orientation.bottom_player() {
            -1
        } else {
            1
        }
    }

    /// 在两个九宫格里找该方的将/帅
    pub fn king_position(&self, player: Player) -> Option<Position> {
        let king = match player {
            Player::Red => Chess::Red(ChessType::King),
            Player::Black => Chess::Black(ChessType::King),
        };
        [0..=2, 7..=9]
            .into_iter()
            .flatten()
            .flat_map(|row| (3..=5).map(move |col| Position::new(row, col)))
            .find(|pos| self.chess_at(*pos) == king)
    }

    /// 该方所有棋子，按行优先顺序
    pub fn pieces(&self, player: Player) -> impl Iterator<Item = (Position, Chess)> + '_ {
        squares()
            .map(|pos| (pos, self.chess_at(pos)))
            .filter(move |(_, chess)| chess.belong_to(player))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_HEIGHT {
            let line: String = (0..BOARD_WIDTH)
                .map(|col| self.chess_at(Position::new(row, col)).fen_char())
                .collect();
            writeln!(f, "{} {}", BOARD_HEIGHT - 1 - row, line)?;
        }
        write!(f, "  abcdefghi")
    }
}
