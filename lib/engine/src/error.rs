//! 引擎错误类型
//!
//! 所有可失败的引擎操作都返回 `EngineResult<T>`。
//! 局面中少了将/帅不是错误，它是搜索里的终局信号（见 `search::SearchEngine::is_game_over`）。

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// 下标越界：棋盘坐标超出 10×9，或单层走法数超过缓冲区容量
    #[error("{what} out of range: {index} (limit {limit})")]
    OutOfRange {
        what: &'static str,
        index: i32,
        limit: i32,
    },

    /// 根节点没有任何可走的棋
    #[error("no legal move at the root position")]
    NoLegalMove,

    #[error("invalid piece code {0} (expected 0..=14)")]
    InvalidPieceCode(u8),

    #[error("invalid search depth {0} (must be >= 1)")]
    InvalidDepth(usize),

    #[error("invalid fen `{fen}`: {reason}")]
    InvalidFen { fen: String, reason: &'static str },

    #[error("invalid move `{0}`")]
    InvalidMove(String),

    #[error("invalid option `{0}`")]
    InvalidOption(String),

    /// 搜索线程已退出，任务或结果通道被关闭
    #[error("search worker is gone")]
    WorkerGone,
}

pub type EngineResult<T> = Result<T, EngineError>;
