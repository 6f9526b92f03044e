/*
 * Search Module - 负极大值搜索
 *
 * SearchEngine 持有一份私有棋盘、走法产生器和估值器：
 * - search 把调用方的棋盘复制进来，搜索结束后私有棋盘恢复原样，只返回最佳走法
 * - 分数总是站在当前层走棋方的角度，向上一层取反
 * - 第 depth 层（剩余深度）的走棋方：(max_depth - depth) 为偶数时是根节点一方，否则是对方
 * - 走子返回被吃的子，原样传给撤销，递归出错时也先撤销再向上返回错误
 */

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use tracing::{debug, trace};

use crate::board::{Board, Chess, Grid, Move, Orientation, Player};
use crate::config::{check_depth, EngineConfig};
use crate::constant::{MATE_SCORE, MAX, MIN, NO_MOVE_SCORE};
use crate::error::{EngineError, EngineResult};
use crate::evaluate::Evaluator;
use crate::movegen::MoveGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchAlgorithm {
    /// 完整搜索到固定深度，不剪枝
    #[default]
    Negamax,
    /// fail-soft alpha-beta，走法顺序和根节点取舍与 Negamax 相同
    AlphaBeta,
}

impl FromStr for SearchAlgorithm {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "negamax" => Ok(SearchAlgorithm::Negamax),
            "alphabeta" | "alpha-beta" => Ok(SearchAlgorithm::AlphaBeta),
            _ => Err(EngineError::InvalidOption(format!("algorithm {s}"))),
        }
    }
}

impl fmt::Display for SearchAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchAlgorithm::Negamax => write!(f, "negamax"),
            SearchAlgorithm::AlphaBeta => write!(f, "alphabeta"),
        }
    }
}

/// 最近一次搜索的统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchStats {
    pub nodes: u64,
    pub leaves: u64,
    pub generations: u64,
    pub elapsed_ms: u128,
}

pub struct SearchEngine {
    board: Board,
    generator: MoveGenerator,
    evaluator: Evaluator,
    pub config: EngineConfig,
    max_depth: usize,
    root_player: Player,
    best_move: Option<Move>,
    node_count: u64,
    stats: SearchStats,
}

impl SearchEngine {
    pub fn new(config: EngineConfig) -> Self {
        SearchEngine {
            board: Board::empty(config.orientation),
            generator: MoveGenerator::new(config.depth),
            evaluator: Evaluator::new(),
            config,
            max_depth: config.depth,
            root_player: Player::Red,
            best_move: None,
            node_count: 0,
            stats: SearchStats::default(),
        }
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    // 走一步，返回目标格原来的子
    pub fn make_move(&mut self, m: &Move) -> Chess {
        self.board.apply_move(m)
    }

    // 撤销走子，captured 必须是 make_move 的返回值
    pub fn unmake_move(&mut self, m: &Move, captured: Chess) {
        self.board.undo_move(m, captured);
    }

    /// 剩余深度为 depth 时轮到哪一方
    fn side_at(&self, depth: usize) -> Player {
        if (self.max_depth - depth) % 2 == 0 {
            self.root_player
        } else {
            self.root_player.next()
        }
    }

    /// 将帅都在返回 0；否则返回 ±(MATE_SCORE + depth)，自己的将帅没了为负
    pub fn is_game_over(&self, depth: usize) -> i32 {
        let mover = self.side_at(depth);
        let mate = MATE_SCORE + depth as i32;
        for player in [Player::Red, Player::Black] {
            if self.board.king_position(player).is_none() {
                return if player == mover { -mate } else { mate };
            }
        }
        0
    }

    pub fn search(&mut self, board: &Board, side: Player) -> EngineResult<Move> {
        self.search_depth(board, side, self.config.depth)
    }

    // 搜索 side 一方的最佳走法，board 不会被修改
    pub fn search_depth(&mut self, board: &Board, side: Player, depth: usize) -> EngineResult<Move> {
        let depth = check_depth(depth)?;
        let start = Instant::now();
        self.board = board.clone();
        self.max_depth = depth;
        self.root_player = side;
        self.best_move = None;
        self.node_count = 0;
        self.evaluator.leaf_count = 0;
        self.generator.gen_counter = 0;
        self.generator.ensure_plies(depth);

        let result = match self.config.algorithm {
            SearchAlgorithm::Negamax => self.negamax(depth),
            SearchAlgorithm::AlphaBeta => self.alpha_beta(depth, MIN, MAX),
        };
        debug_assert_eq!(&self.board, board, "search must restore the board");

        self.stats = SearchStats {
            nodes: self.node_count,
            leaves: self.evaluator.leaf_count,
            generations: self.generator.gen_counter,
            elapsed_ms: start.elapsed().as_millis(),
        };
        let score = result?;
        debug!(
            "search {} depth {} side {:?}: score {}, nodes {}, leaves {}, {}ms",
            self.config.algorithm,
            depth,
            side,
            score,
            self.stats.nodes,
            self.stats.leaves,
            self.stats.elapsed_ms
        );
        self.best_move.ok_or(EngineError::NoLegalMove)
    }

    // 根节点用严格大于更新最佳走法；全部走法都不比 NO_MOVE_SCORE 好时取第一个
    fn update_best(&mut self, depth: usize, m: &Move, score: i32, best: &mut i32) {
        let at_root = depth == self.max_depth;
        if at_root {
            trace!("root move {} score {}", m, score);
        }
        if score > *best || (at_root && self.best_move.is_none()) {
            *best = score;
            if at_root {
                self.best_move = Some(Move { score, ..*m });
            }
        }
    }

    fn negamax(&mut self, depth: usize) -> EngineResult<i32> {
        self.node_count += 1;
        let over = self.is_game_over(depth);
        if over != 0 {
            return Ok(over);
        }
        let side = self.side_at(depth);
        if depth == 0 {
            return Ok(self.evaluator.evaluate(&self.board, side));
        }

        let count = self.generator.generate(&self.board, depth, side)?;
        let mut best = NO_MOVE_SCORE;
        for i in 0..count {
            let m = self.generator.moves(depth)[i];
            let captured = self.make_move(&m);
            let result = self.negamax(depth - 1);
            self.unmake_move(&m, captured);
            let score = -result?;
            self.update_best(depth, &m, score, &mut best);
        }
        Ok(best)
    }

    fn alpha_beta(&mut self, depth: usize, mut alpha: i32, beta: i32) -> EngineResult<i32> {
        self.node_count += 1;
        let over = self.is_game_over(depth);
        if over != 0 {
            return Ok(over);
        }
        let side = self.side_at(depth);
        if depth == 0 {
            return Ok(self.evaluator.evaluate(&self.board, side));
        }

        let count = self.generator.generate(&self.board, depth, side)?;
        let mut best = NO_MOVE_SCORE;
        for i in 0..count {
            let m = self.generator.moves(depth)[i];
            let captured = self.make_move(&m);
            let result = self.alpha_beta(depth - 1, -beta, -alpha);
            self.unmake_move(&m, captured);
            let score = -result?;
            self.update_best(depth, &m, score, &mut best);
            if best > alpha {
                alpha = best;
            }
            if alpha >= beta {
                break;
            }
        }
        Ok(best)
    }
}

/// 整数棋盘接口：codes 为 10×9 的棋子编码，返回 side 一方的最佳走法
pub fn search_move(codes: &Grid<u8>, max_depth: usize, up_red: bool, side: Player) -> EngineResult<Move> {
    let orientation = Orientation::from_up_red(up_red);
    let board = Board::from_codes(codes, orientation)?;
    let config = EngineConfig {
        orientation,
        ..EngineConfig::default()
    }
    .with_depth(max_depth)?;
    SearchEngine::new(config).search(&board, side)
}
