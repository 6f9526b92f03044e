/*
 * 走法产生器
 *
 * - 每一层搜索各有一个走法缓冲区，容量固定为 MAX_MOVES_PER_PLY
 * - generate 先清空该层缓冲区，再按行优先顺序枚举该方的每一个子
 * - 只做伪合法检查：走后自己被将并不过滤，交给估值和下一层搜索处理
 */

use crate::board::{squares, Board, Move, Player, Position};
use crate::constant::MAX_MOVES_PER_PLY;
use crate::error::{EngineError, EngineResult};
use crate::rules::{related_squares, MAX_RELATED};

pub struct MoveGenerator {
    move_lists: Vec<Vec<Move>>,
    related: Vec<Position>,
    /// 走法生成调用次数
    pub gen_counter: u64,
}

impl MoveGenerator {
    pub fn new(max_ply: usize) -> Self {
        let mut generator = MoveGenerator {
            move_lists: vec![],
            related: Vec::with_capacity(MAX_RELATED),
            gen_counter: 0,
        };
        generator.ensure_plies(max_ply);
        generator
    }

    /// 保证 0..=max_ply 每一层都有缓冲区
    pub fn ensure_plies(&mut self, max_ply: usize) {
        while self.move_lists.len() <= max_ply {
            self.move_lists.push(Vec::with_capacity(MAX_MOVES_PER_PLY));
        }
    }

    // 产生 player 一方在 ply 层的所有走法，返回走法数量
    pub fn generate(&mut self, board: &Board, ply: usize, player: Player) -> EngineResult<usize> {
        self.gen_counter += 1;
        self.ensure_plies(ply);
        let list = &mut self.move_lists[ply];
        list.clear();

        for from in squares() {
            let chess = board.chess_at(from);
            if !chess.belong_to(player) {
                continue;
            }
            related_squares(board, from, &mut self.related);
            for to in &self.related {
                if chess.same_side(board.chess_at(*to)) {
                    continue;
                }
                if list.len() >= MAX_MOVES_PER_PLY {
                    return Err(EngineError::OutOfRange {
                        what: "move buffer",
                        index: list.len() as i32,
                        limit: MAX_MOVES_PER_PLY as i32,
                    });
                }
                list.push(Move::new(chess, from, *to, ply));
            }
        }
        Ok(list.len())
    }

    pub fn moves(&self, ply: usize) -> &[Move] {
        self.move_lists.get(ply).map_or(&[], |list| list.as_slice())
    }
}
