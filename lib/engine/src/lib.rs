/**
 * 引擎核心库入口
 *
 * - board / rules：棋盘、棋子编码与每种棋子的走法拓扑
 * - movegen / evaluate / search：走法产生、局面估值与负极大值搜索
 * - worker / engine：后台搜索线程与 UCCI 文本前端
 * - config / constant / error：配置、常量与错误类型
 */
pub mod board;
pub mod config;
pub mod constant;
pub mod engine;
pub mod error;
pub mod evaluate;
pub mod movegen;
pub mod rules;
pub mod search;
pub mod worker;

pub use board::{Board, Chess, ChessType, Move, Orientation, Player, Position};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use search::{search_move, SearchAlgorithm, SearchEngine};
