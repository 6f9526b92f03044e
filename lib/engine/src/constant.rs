use crate::board::*;
use std::{collections::HashMap, sync::LazyLock};

/// 比任何局面分都小/大的窗口边界
pub const MIN: i32 = -99999;
pub const MAX: i32 = 99999;

/// 某一层一个走法都没有时返回的分数
pub const NO_MOVE_SCORE: i32 = -20000;
/// 将/帅被吃掉后的基础分，实际返回 ±(MATE_SCORE + 剩余深度)
pub const MATE_SCORE: i32 = 19990;
/// 估值时发现对方的将/帅下一步就能被吃
pub const KING_THREAT_SCORE: i32 = 18888;

/// 每一层走法缓冲区的容量
pub const MAX_MOVES_PER_PLY: usize = 80;

pub const DEFAULT_DEPTH: usize = 3;

pub static FEN_MAP: LazyLock<HashMap<char, Chess>> = LazyLock::new(|| {
    HashMap::from([
        ('k', Chess::Black(ChessType::King)),
        ('a', Chess::Black(ChessType::Advisor)),
        ('b', Chess::Black(ChessType::Bishop)),
        ('n', Chess::Black(ChessType::Knight)),
        ('r', Chess::Black(ChessType::Rook)),
        ('c', Chess::Black(ChessType::Cannon)),
        ('p', Chess::Black(ChessType::Pawn)),
        ('K', Chess::Red(ChessType::King)),
        ('A', Chess::Red(ChessType::Advisor)),
        ('B', Chess::Red(ChessType::Bishop)),
        ('N', Chess::Red(ChessType::Knight)),
        ('R', Chess::Red(ChessType::Rook)),
        ('C', Chess::Red(ChessType::Cannon)),
        ('P', Chess::Red(ChessType::Pawn)),
    ])
});
