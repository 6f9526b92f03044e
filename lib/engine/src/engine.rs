/* UCCI 前端：解析文本命令，维护当前局面，把搜索交给后台线程 */
use std::io::{self, BufRead, Write};

use regex::Regex;
use tracing::{info, warn};

use crate::board::{Board, Move, Orientation, Player, Position};
use crate::config::{check_depth, EngineConfig};
use crate::error::{EngineError, EngineResult};
use crate::rules::is_valid_destination;
use crate::search::SearchAlgorithm;
use crate::worker::SearchWorker;

const POSITION_PATTERN: &str = r#"^(?:fen (?P<fen>[kabnrcpKABNRCP1-9/]+(?: [wrb])?(?: - - \d+ \d+)?)|(?P<startpos>startpos))(?: moves (?P<moves>[a-i]\d[a-i]\d(?: [a-i]\d[a-i]\d)*))?$"#;

// UCCI引擎
pub struct UcciEngine {
    pub board: Board,
    pub turn: Player,
    pub config: EngineConfig,
    position_regex: Regex,
    worker: SearchWorker,
}

impl UcciEngine {
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        let position_regex =
            Regex::new(POSITION_PATTERN).map_err(|e| EngineError::InvalidOption(e.to_string()))?;
        Ok(UcciEngine {
            board: Board::init(Orientation::RedBottom),
            turn: Player::Red,
            config,
            position_regex,
            worker: SearchWorker::spawn()?,
        })
    }

    // 从标准输入读命令，直到 quit 或输入结束
    pub fn start(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        for line in stdin.lock().lines() {
            let line = line?;
            match self.handle(&line) {
                Some(output) => {
                    for out in output {
                        writeln!(stdout, "{out}")?;
                    }
                    stdout.flush()?;
                }
                None => break,
            }
        }
        Ok(())
    }

    /// 处理一行命令，返回要输出的行；quit 返回 None
    pub fn handle(&mut self, line: &str) -> Option<Vec<String>> {
        let line = line.trim();
        let (cmd, param) = line.split_once(' ').unwrap_or((line, ""));
        let param = param.trim();
        let output = match cmd {
            "" => vec![],
            "ucci" => self.info(),
            "isready" => vec!["readyok".to_owned()],
            "position" => {
                if let Err(e) = self.position(param) {
                    warn!("position rejected: {e}");
                }
                vec![]
            }
            "setoption" => {
                if let Err(e) = self.set_option(param) {
                    warn!("setoption rejected: {e}");
                }
                vec![]
            }
            "go" => self.go(param),
            "quit" => return None,
            _ => {
                warn!("unknown command `{line}`");
                vec!["not support".to_owned()]
            }
        };
        Some(output)
    }

    pub fn info(&self) -> Vec<String> {
        vec![
            format!("id name xiangqi {}", env!("CARGO_PKG_VERSION")),
            format!(
                "option depth type spin default {} min 1 max 8",
                self.config.depth
            ),
            format!(
                "option algorithm type combo default {} var {} var {}",
                self.config.algorithm,
                SearchAlgorithm::Negamax,
                SearchAlgorithm::AlphaBeta
            ),
            "ucciok".to_owned(),
        ]
    }

    // position [fen <fen> | startpos] [moves <m1> <m2> ...]
    // 整条命令都合法才替换当前局面
    pub fn position(&mut self, param: &str) -> EngineResult<()> {
        let captures = self
            .position_regex
            .captures(param)
            .ok_or_else(|| EngineError::InvalidFen {
                fen: param.to_owned(),
                reason: "malformed position command",
            })?;

        let (mut board, mut turn) = match captures.name("fen") {
            Some(fen) => Board::from_fen(fen.as_str())?,
            None => (Board::init(Orientation::RedBottom), Player::Red),
        };
        if let Some(moves) = captures.name("moves") {
            for m_str in moves.as_str().split_whitespace() {
                let m = parse_move(&board, turn, m_str)?;
                board.apply_move(&m);
                turn = turn.next();
            }
        }
        self.board = board;
        self.turn = turn;
        Ok(())
    }

    // setoption depth 4 / setoption algorithm alphabeta
    // 也接受 setoption name depth value 4
    pub fn set_option(&mut self, param: &str) -> EngineResult<()> {
        let tokens: Vec<&str> = param.split_whitespace().collect();
        let (name, value) = match tokens.as_slice() {
            ["name", name, "value", value] => (*name, *value),
            [name, value] => (*name, *value),
            _ => return Err(EngineError::InvalidOption(param.to_owned())),
        };
        self.config.set_option(name, value)?;
        info!("option {name} set to {value}");
        Ok(())
    }

    // 执行搜索并输出最佳走子
    // go [depth N]，不指定深度时用配置里的深度
    pub fn go(&mut self, param: &str) -> Vec<String> {
        let mut config = self.config;
        let mut tokens = param.split_whitespace();
        while let Some(token) = tokens.next() {
            if token != "depth" {
                continue;
            }
            match tokens.next().map(str::parse::<usize>) {
                Some(Ok(depth)) => match check_depth(depth) {
                    Ok(depth) => config.depth = depth,
                    Err(e) => {
                        warn!("go rejected: {e}");
                        return vec!["nobestmove".to_owned()];
                    }
                },
                _ => warn!("go: missing depth value, using {}", config.depth),
            }
        }

        let outcome = match self.worker.search(&self.board, self.turn, config) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("search failed: {e}");
                return vec!["nobestmove".to_owned()];
            }
        };
        match outcome.result {
            Ok(m) => vec![
                format!(
                    "info depth {} score {} nodes {} time {}",
                    config.depth, m.score, outcome.stats.nodes, outcome.stats.elapsed_ms
                ),
                format!("bestmove {m}"),
            ],
            Err(e) => {
                warn!("no best move: {e}");
                vec!["nobestmove".to_owned()]
            }
        }
    }
}

// ICCS 走法，例如 b0c2；要求是轮到走棋一方的子，并且符合走法规则
fn parse_move(board: &Board, turn: Player, m_str: &str) -> EngineResult<Move> {
    let invalid = || EngineError::InvalidMove(m_str.to_owned());
    let (from_str, to_str) = m_str.split_at_checked(2).ok_or_else(invalid)?;
    let from: Position = from_str.parse()?;
    let to: Position = to_str.parse()?;
    let chess = board.piece(from)?;
    if !chess.belong_to(turn) || !is_valid_destination(board, from, to)? {
        return Err(invalid());
    }
    Ok(Move::new(chess, from, to, 0))
}

#[cfg(test)]
mod tests {
    use crate::board::*;
    use crate::config::EngineConfig;
    use crate::engine::UcciEngine;
    use crate::search::SearchAlgorithm;

    fn engine() -> UcciEngine {
        UcciEngine::new(EngineConfig::default().with_depth(1).unwrap()).unwrap()
    }

    #[test]
    fn test_ucci_handshake() {
        let mut engine = engine();
        let output = engine.handle("ucci").unwrap();
        assert!(output[0].starts_with("id name "));
        assert_eq!(output.last().unwrap(), "ucciok");
        assert_eq!(engine.handle("isready").unwrap(), vec!["readyok"]);
        assert_eq!(engine.handle("hello").unwrap(), vec!["not support"]);
        assert_eq!(engine.handle("quit"), None);
    }

    #[test]
    fn test_position_moves() {
        let mut engine = engine();
        engine.handle("position startpos moves b2e2 h9g7");
        assert_eq!(engine.turn, Player::Red);
        assert_eq!(
            engine.board.chess_at("e2".parse().unwrap()),
            Chess::Red(ChessType::Cannon)
        );
        assert_eq!(
            engine.board.chess_at("g7".parse().unwrap()),
            Chess::Black(ChessType::Knight)
        );

        engine.handle("position fen 4k4/9/9/9/9/9/9/9/4R4/3K5 b - - 0 1");
        assert_eq!(engine.turn, Player::Black);
        assert_eq!(engine.board.pieces(Player::Red).count(), 2);
    }

    #[test]
    fn test_position_rejects_illegal_move() {
        let mut engine = engine();
        engine.handle("position startpos moves b2e2");
        let before = engine.board.clone();
        // 第二步红方连走两步，整条命令作废
        assert!(engine.position("startpos moves b2e2 e2e6").is_err());
        // 马腿被别住
        assert!(engine.position("startpos moves b0d1").is_err());
        assert!(engine.position("fen rnbakabnr/9 w").is_err());
        assert_eq!(engine.board, before);
        assert_eq!(engine.turn, Player::Black);
    }

    #[test]
    fn test_go() {
        let mut engine = engine();
        engine.handle("position startpos");
        let output = engine.handle("go depth 1").unwrap();
        assert_eq!(output.len(), 2);
        assert!(output[0].starts_with("info depth 1 score 131 nodes 45"));
        assert_eq!(output[1], "bestmove b2b9");

        engine.handle("position fen 4k4/9/9/9/9/9/9/9/4R4/3K5 w - - 0 1");
        assert_eq!(engine.handle("go").unwrap()[1], "bestmove e1e9");

        assert_eq!(engine.handle("go depth 0").unwrap(), vec!["nobestmove"]);
        engine.handle("position fen 4k4/9/9/9/9/9/9/9/9/9 w - - 0 1");
        assert_eq!(engine.handle("go depth 2").unwrap(), vec!["nobestmove"]);
    }

    #[test]
    fn test_set_option() {
        let mut engine = engine();
        engine.handle("setoption depth 2");
        engine.handle("setoption name algorithm value alphabeta");
        assert_eq!(engine.config.depth, 2);
        assert_eq!(engine.config.algorithm, SearchAlgorithm::AlphaBeta);

        engine.handle("setoption depth 0");
        engine.handle("setoption depth");
        assert_eq!(engine.config.depth, 2);

        engine.handle("position startpos");
        assert_eq!(engine.handle("go").unwrap()[1], "bestmove b2b9");
    }
}
