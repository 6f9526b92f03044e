/*
 * 估值函数
 *
 * 局面分由三部分组成：
 * 1) 子力价值：每个子的基本价值
 * 2) 灵活性：每个可走位置（空格或可吃的子）乘以该棋种的灵活性分数；兵另有位置附加值
 * 3) 棋子关系：被威胁的子扣分，同时被保护的子再加回一部分
 *
 * 威胁扣分对双方不对称：估值一方自己被威胁的子扣得少，对方被威胁的子扣得多，
 * 使走棋方更倾向进攻。因此 evaluate(b, Red) 不一定等于 -evaluate(b, Black)。
 * 所有中间状态每次调用都从零开始重新计算。
 */

use crate::board::{squares, Board, ChessType, Grid, Player, Position, BOARD_HEIGHT, BOARD_WIDTH};
use crate::constant::KING_THREAT_SCORE;
use crate::rules::{related_squares, MAX_RELATED};

// 下方一方兵的位置附加值（行号越小越深入敌阵）
const BOTTOM_PAWN_TABLE: Grid<i32> = [
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [90, 90, 110, 120, 120, 120, 110, 90, 90],
    [90, 90, 110, 120, 120, 120, 110, 90, 90],
    [70, 90, 110, 110, 110, 110, 110, 90, 70],
    [70, 70, 70, 70, 70, 70, 70, 70, 70],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
];

// 上方一方兵的位置附加值
const TOP_PAWN_TABLE: Grid<i32> = [
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [70, 70, 70, 70, 70, 70, 70, 70, 70],
    [70, 90, 110, 110, 110, 110, 110, 90, 70],
    [90, 90, 110, 120, 120, 120, 110, 90, 90],
    [90, 90, 110, 120, 120, 120, 110, 90, 90],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
];

// 未受威胁但有保护的子
const GUARDED_BONUS: i32 = 5;
// 估值一方自己的将帅被威胁
const OWN_KING_ATTACKED_PENALTY: i32 = 20;

const EMPTY_GRID: Grid<i32> = [[0; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];

pub struct Evaluator {
    attack_pos: Grid<i32>,      // 每一个位置被威胁的信息
    guard_pos: Grid<i32>,       // 每一位置被保护的信息
    flexibility_pos: Grid<i32>, // 每一位置上棋子的可走位置数
    chess_value: Grid<i32>,     // 每一位置上的棋子的总价值
    related: Vec<Position>,
    /// 叶子节点计数
    pub leaf_count: u64,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Evaluator {
            attack_pos: EMPTY_GRID,
            guard_pos: EMPTY_GRID,
            flexibility_pos: EMPTY_GRID,
            chess_value: EMPTY_GRID,
            related: Vec::with_capacity(MAX_RELATED),
            leaf_count: 0,
        }
    }

    fn reset(&mut self) {
        self.attack_pos = EMPTY_GRID;
        self.guard_pos = EMPTY_GRID;
        self.flexibility_pos = EMPTY_GRID;
        self.chess_value = EMPTY_GRID;
    }

    fn pawn_bonus(board: &Board, pos: Position, player: Player) -> i32 {
        let table = if player == board.orientation.bottom_player() {
            &BOTTOM_PAWN_TABLE
        } else {
            &TOP_PAWN_TABLE
        };
        table[pos.row as usize][pos.col as usize]
    }

    // 参数 player: 估值的一方
    // 返回: 正数表示 player 占优；player 的子能直接吃到对方将帅时返回 KING_THREAT_SCORE
    pub fn evaluate(&mut self, board: &Board, player: Player) -> i32 {
        self.leaf_count += 1;
        self.reset();

        // 统计每个子的相关位置：空格加灵活性，己方子记保护，敌方子记威胁
        for from in squares() {
            let chess = board.chess_at(from);
            let Some(ct) = chess.chess_type() else {
                continue;
            };
            related_squares(board, from, &mut self.related);
            for to in &self.related {
                let target = board.chess_at(*to);
                let (r, c) = (to.row as usize, to.col as usize);
                match target.chess_type() {
                    None => self.flexibility_pos[from.row as usize][from.col as usize] += 1,
                    Some(_) if chess.same_side(target) => self.guard_pos[r][c] += 1,
                    Some(target_type) => {
                        self.attack_pos[r][c] += 1;
                        self.flexibility_pos[from.row as usize][from.col as usize] += 1;
                        if target_type == ChessType::King {
                            if chess.belong_to(player) {
                                return KING_THREAT_SCORE;
                            }
                        } else {
                            // 用小子威胁大子更危险
                            let gap = target_type.material_value() - ct.material_value();
                            self.attack_pos[r][c] += (30 + gap.div_euclid(10)).div_euclid(10);
                        }
                    }
                }
            }
        }

        for pos in squares() {
            let chess = board.chess_at(pos);
            let (Some(ct), Some(owner)) = (chess.chess_type(), chess.player()) else {
                continue;
            };
            let (r, c) = (pos.row as usize, pos.col as usize);
            self.chess_value[r][c] += 1 + ct.flexibility() * self.flexibility_pos[r][c];
            if ct == ChessType::Pawn {
                self.chess_value[r][c] += Self::pawn_bonus(board, pos, owner);
            }
        }

        for pos in squares() {
            let chess = board.chess_at(pos);
            let Some(ct) = chess.chess_type() else {
                continue;
            };
            let (r, c) = (pos.row as usize, pos.col as usize);
            let half_value = ct.material_value() / 16;
            self.chess_value[r][c] += ct.material_value();

            let attacked = self.attack_pos[r][c];
            let guarded = self.guard_pos[r][c] > 0;
            if attacked > 0 {
                if chess.belong_to(player) {
                    if ct == ChessType::King {
                        self.chess_value[r][c] -= OWN_KING_ATTACKED_PENALTY;
                    } else {
                        self.chess_value[r][c] -= half_value * 2;
                        if guarded {
                            self.chess_value[r][c] += half_value;
                        }
                    }
                } else {
                    if ct == ChessType::King {
                        return KING_THREAT_SCORE;
                    }
                    self.chess_value[r][c] -= half_value * 10;
                    if guarded {
                        self.chess_value[r][c] += half_value * 9;
                    }
                }
                self.chess_value[r][c] -= attacked;
            } else if guarded {
                self.chess_value[r][c] += GUARDED_BONUS;
            }
        }

        let (mut mine, mut theirs) = (0, 0);
        for pos in squares() {
            let chess = board.chess_at(pos);
            if chess.is_none() {
                continue;
            }
            let value = self.chess_value[pos.row as usize][pos.col as usize];
            if chess.belong_to(player) {
                mine += value;
            } else {
                theirs += value;
            }
        }
        mine - theirs
    }
}

#[cfg(test)]
mod tests {
    use crate::board::*;
    use crate::constant::KING_THREAT_SCORE;
    use crate::evaluate::*;

    #[test]
    fn test_evaluate_opening_is_balanced() {
        let board = Board::init(Orientation::RedBottom);
        let mut evaluator = Evaluator::new();
        for _ in 0..1_000 {
            evaluator.evaluate(&board, Player::Red);
        }
        assert_eq!(evaluator.evaluate(&board, Player::Red), 0);
        assert_eq!(evaluator.evaluate(&board, Player::Black), 0);
        assert_eq!(evaluator.leaf_count, 1_002);
    }

    #[test]
    fn test_same_value_for_both_orientations() {
        let mut evaluator = Evaluator::new();
        let (board, _) =
            Board::from_fen("2bak4/4a4/2n1b4/p1C1p1c1p/2p6/4R4/P1c1P1P1P/4C4/9/2BAKAB2 w - - 0 1")
                .unwrap();
        let mut flipped = Board::empty(Orientation::RedTop);
        for pos in squares() {
            flipped.set_chess(pos.flip_rows(), board.chess_at(pos));
        }
        for player in [Player::Red, Player::Black] {
            assert_eq!(
                evaluator.evaluate(&board, player),
                evaluator.evaluate(&flipped, player)
            );
        }
    }

    #[test]
    fn test_king_threat_short_circuit() {
        let mut evaluator = Evaluator::new();
        // 红车直接对着黑将
        let (board, _) = Board::from_fen("4k4/9/9/9/9/9/9/9/4R4/3K5 w - - 0 1").unwrap();
        assert_eq!(evaluator.evaluate(&board, Player::Red), KING_THREAT_SCORE);
        assert_eq!(evaluator.evaluate(&board, Player::Black), -624);
    }

    #[test]
    fn test_material_advantage() {
        let mut evaluator = Evaluator::new();
        let (board, _) = Board::from_fen(
            "rnbakabn1/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR w - - 0 1",
        )
        .unwrap();
        assert_eq!(evaluator.evaluate(&board, Player::Red), 707);
        assert_eq!(evaluator.evaluate(&board, Player::Black), -539);
    }

    // 被威胁的子：对方的扣得多，自己的扣得少
    #[test]
    fn test_attack_penalty_is_asymmetric() {
        let mut evaluator = Evaluator::new();
        // 黑车捉红马
        let (board, _) = Board::from_fen("3k5/9/9/9/4r4/9/9/4N4/9/5K3 w - - 0 1").unwrap();
        assert_eq!(evaluator.evaluate(&board, Player::Red), -195);
        assert_eq!(evaluator.evaluate(&board, Player::Black), 363);

        // 仕保护住马，红方视角扣分减少
        let (guarded, _) = Board::from_fen("3k5/9/9/9/4r4/9/9/4N4/4A4/5K3 w - - 0 1").unwrap();
        assert_eq!(evaluator.evaluate(&guarded, Player::Red), 47);
        assert_eq!(evaluator.evaluate(&guarded, Player::Black), 121);
    }

    #[test]
    fn test_middle_game_values() {
        let mut evaluator = Evaluator::new();
        let (board, _) =
            Board::from_fen("2bak4/4a4/2n1b4/p1C1p1c1p/2p6/4R4/P1c1P1P1P/4C4/9/2BAKAB2 w - - 0 1")
                .unwrap();
        assert_eq!(evaluator.evaluate(&board, Player::Red), 502);
        assert_eq!(evaluator.evaluate(&board, Player::Black), 170);
    }
}
