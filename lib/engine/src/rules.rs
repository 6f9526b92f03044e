//! 每种棋子的走法拓扑
//!
//! `related_squares` 给出一个子"碰得到"的全部格子：能走到的空格，以及挡住它的第一个子
//! （无论哪一方）。走法生成在此基础上去掉己方棋子所在的格子；估值直接用它统计
//! 灵活性、保护与威胁。两处共用同一张分派表，炮的"隔一子吃"规则只有这一份实现。

use crate::board::{Board, Chess, ChessType, Player, Position};
use crate::error::EngineResult;

/// 单个子的相关位置最多 17 个（车在空旷处）
pub const MAX_RELATED: usize = 20;

type ReachFn = fn(&Board, Position, Player, &mut Vec<Position>);

const ORTHOGONAL: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONAL: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

// (行增量, 列增量)，马腿在长边方向的一半处
const KNIGHT_JUMPS: [(i32, i32); 8] = [
    (1, 2),
    (-1, 2),
    (1, -2),
    (-1, -2),
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
];

// 右、左、下、上
const RAYS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

fn reach_fn(ct: ChessType) -> ReachFn {
    match ct {
        ChessType::King => king_reach,
        ChessType::Advisor => advisor_reach,
        ChessType::Bishop => bishop_reach,
        ChessType::Knight => knight_reach,
        ChessType::Rook => rook_reach,
        ChessType::Cannon => cannon_reach,
        ChessType::Pawn => pawn_reach,
    }
}

/// 把 from 上棋子的相关位置写入 out（先清空）；空格没有相关位置
pub fn related_squares(board: &Board, from: Position, out: &mut Vec<Position>) {
    out.clear();
    let chess = board.chess_at(from);
    if let (Some(ct), Some(player)) = (chess.chess_type(), chess.player()) {
        reach_fn(ct)(board, from, player, out);
    }
}

/// 判断 from 上的子能否走到 to，不考虑轮到谁走、也不考虑走后是否被将
pub fn is_valid_destination(board: &Board, from: Position, to: Position) -> EngineResult<bool> {
    let chess = board.piece(from.check()?)?;
    let target = board.piece(to.check()?)?;
    if chess.is_none() || from == to || chess.same_side(target) {
        return Ok(false);
    }
    let mut squares = Vec::with_capacity(MAX_RELATED);
    related_squares(board, from, &mut squares);
    Ok(squares.contains(&to))
}

fn king_reach(board: &Board, from: Position, player: Player, out: &mut Vec<Position>) {
    for (dr, dc) in ORTHOGONAL {
        let to = from.offset(dr, dc);
        if board.in_palace(to, player) {
            out.push(to);
        }
    }
    // 飞将：同一列上中间无子，直接吃对方将帅
    let enemy_king = match player {
        Player::Red => Chess::Black(ChessType::King),
        Player::Black => Chess::Red(ChessType::King),
    };
    for dr in [-1, 1] {
        let mut to = from.offset(dr, 0);
        while to.in_board() {
            let chess = board.chess_at(to);
            if !chess.is_none() {
                if chess == enemy_king {
                    out.push(to);
                }
                break;
            }
            to = to.offset(dr, 0);
        }
    }
}

fn advisor_reach(board: &Board, from: Position, player: Player, out: &mut Vec<Position>) {
    for (dr, dc) in DIAGONAL {
        let to = from.offset(dr, dc);
        if board.in_palace(to, player) {
            out.push(to);
        }
    }
}

fn bishop_reach(board: &Board, from: Position, player: Player, out: &mut Vec<Position>) {
    for (dr, dc) in DIAGONAL {
        let to = from.offset(2 * dr, 2 * dc);
        // 象不能过河，塞象眼不能走
        if to.in_board()
            && board.in_country(to.row, player)
            && board.chess_at(from.offset(dr, dc)).is_none()
        {
            out.push(to);
        }
    }
}

fn knight_reach(board: &Board, from: Position, _player: Player, out: &mut Vec<Position>) {
    for (dr, dc) in KNIGHT_JUMPS {
        let to = from.offset(dr, dc);
        if !to.in_board() {
            continue;
        }
        // 别马腿
        let leg = if dr.abs() == 2 {
            from.offset(dr / 2, 0)
        } else {
            from.offset(0, dc / 2)
        };
        if board.chess_at(leg).is_none() {
            out.push(to);
        }
    }
}

fn rook_reach(board: &Board, from: Position, _player: Player, out: &mut Vec<Position>) {
    for (dr, dc) in RAYS {
        let mut to = from.offset(dr, dc);
        while to.in_board() {
            out.push(to);
            if !board.chess_at(to).is_none() {
                break;
            }
            to = to.offset(dr, dc);
        }
    }
}

fn cannon_reach(board: &Board, from: Position, _player: Player, out: &mut Vec<Position>) {
    for (dr, dc) in RAYS {
        let mut to = from.offset(dr, dc);
        let mut screened = false;
        while to.in_board() {
            let occupied = !board.chess_at(to).is_none();
            if !screened {
                if occupied {
                    // 炮架
                    screened = true;
                } else {
                    out.push(to);
                }
            } else if occupied {
                out.push(to);
                break;
            }
            to = to.offset(dr, dc);
        }
    }
}

fn pawn_reach(board: &Board, from: Position, player: Player, out: &mut Vec<Position>) {
    let ahead = from.offset(board.forward(player), 0);
    if ahead.in_board() {
        out.push(ahead);
    }
    // 过河兵可以左右走
    if !board.in_country(from.row, player) {
        for side in [from.left(1), from.right(1)] {
            if side.in_board() {
                out.push(side);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::board::*;
    use crate::error::EngineError;
    use crate::rules::*;

    fn related(board: &Board, from: Position) -> Vec<Position> {
        let mut out = vec![];
        related_squares(board, from, &mut out);
        out
    }

    #[test]
    fn test_cannon_needs_one_screen() {
        let board = Board::init(Orientation::RedBottom);
        let from = Position::new(7, 1);
        // 隔着黑炮打马
        assert!(is_valid_destination(&board, from, Position::new(0, 1)).unwrap());
        // 黑炮本身没有炮架
        assert!(!is_valid_destination(&board, from, Position::new(2, 1)).unwrap());
        // 空格前面有炮架不能走
        assert!(!is_valid_destination(&board, from, Position::new(1, 1)).unwrap());
        // 炮后面只有自己的马做炮架
        assert!(!is_valid_destination(&board, from, Position::new(9, 1)).unwrap());
        assert!(is_valid_destination(&board, from, Position::new(3, 1)).unwrap());
    }

    #[test]
    fn test_knight_leg() {
        let board = Board::init(Orientation::RedBottom);
        let from = Position::new(9, 1);
        let mut targets = related(&board, from);
        targets.sort_by_key(|p| (p.row, p.col));
        // 相在 c0 别住了向 d1 的马腿
        assert_eq!(targets, vec![Position::new(7, 0), Position::new(7, 2)]);
    }

    #[test]
    fn test_bishop_eye_and_river() {
        let mut board = Board::empty(Orientation::RedBottom);
        let from = Position::new(5, 2);
        board.set_chess(from, Chess::Red(ChessType::Bishop));
        let mut targets = related(&board, from);
        targets.sort_by_key(|p| (p.row, p.col));
        assert_eq!(targets, vec![Position::new(7, 0), Position::new(7, 4)]);

        board.set_chess(Position::new(6, 3), Chess::Black(ChessType::Pawn));
        assert_eq!(related(&board, from), vec![Position::new(7, 0)]);
    }

    #[test]
    fn test_king_flying_general() {
        let (board, _) = Board::from_fen("4k4/9/9/9/9/9/9/9/9/4K4 w - - 0 1").unwrap();
        assert!(is_valid_destination(&board, Position::new(9, 4), Position::new(0, 4)).unwrap());
        assert!(is_valid_destination(&board, Position::new(0, 4), Position::new(9, 4)).unwrap());
        assert!(!is_valid_destination(&board, Position::new(9, 4), Position::new(9, 2)).unwrap());
        assert!(!is_valid_destination(&board, Position::new(9, 4), Position::new(6, 4)).unwrap());

        let (blocked, _) = Board::from_fen("4k4/9/9/9/4p4/9/9/9/9/4K4 w - - 0 1").unwrap();
        assert!(!is_valid_destination(&blocked, Position::new(9, 4), Position::new(0, 4)).unwrap());
    }

    #[test]
    fn test_pawn_river() {
        let mut board = Board::empty(Orientation::RedBottom);
        board.set_chess(Position::new(6, 4), Chess::Red(ChessType::Pawn));
        board.set_chess(Position::new(4, 0), Chess::Red(ChessType::Pawn));
        board.set_chess(Position::new(5, 8), Chess::Black(ChessType::Pawn));
        assert_eq!(related(&board, Position::new(6, 4)), vec![Position::new(5, 4)]);
        assert_eq!(
            related(&board, Position::new(4, 0)),
            vec![Position::new(3, 0), Position::new(4, 1)]
        );
        // 黑卒向下走，过河后可以横走
        assert_eq!(
            related(&board, Position::new(5, 8)),
            vec![Position::new(6, 8), Position::new(5, 7)]
        );
        assert!(!is_valid_destination(&board, Position::new(6, 4), Position::new(7, 4)).unwrap());
    }

    #[test]
    fn test_pawn_follows_orientation() {
        let mut board = Board::empty(Orientation::RedTop);
        board.set_chess(Position::new(3, 4), Chess::Red(ChessType::Pawn));
        assert_eq!(related(&board, Position::new(3, 4)), vec![Position::new(4, 4)]);
        assert!(!board.in_palace(Position::new(8, 4), Player::Red));
    }

    #[test]
    fn test_same_side_rejected() {
        let board = Board::init(Orientation::RedBottom);
        // 车前面是自己的兵
        assert!(!is_valid_destination(&board, Position::new(9, 0), Position::new(6, 0)).unwrap());
        assert!(is_valid_destination(&board, Position::new(9, 0), Position::new(7, 0)).unwrap());
        assert!(!is_valid_destination(&board, Position::new(4, 4), Position::new(3, 4)).unwrap());
    }

    #[test]
    fn test_out_of_range() {
        let board = Board::init(Orientation::RedBottom);
        assert!(matches!(
            is_valid_destination(&board, Position::new(9, 0), Position::new(9, 9)),
            Err(EngineError::OutOfRange { what: "col", index: 9, limit: 9 })
        ));
        assert!(matches!(
            is_valid_destination(&board, Position::new(-1, 0), Position::new(0, 0)),
            Err(EngineError::OutOfRange { what: "row", .. })
        ));
    }
}
