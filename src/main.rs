//! 象棋引擎命令行
//!
//! 不带子命令时进入 UCCI 模式，从 stdin 读命令；其余子命令执行一次就退出。

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use engine::board::{Board, Grid, Player, BOARD_HEIGHT, BOARD_WIDTH};
use engine::constant::DEFAULT_DEPTH;
use engine::engine::UcciEngine;
use engine::evaluate::Evaluator;
use engine::movegen::MoveGenerator;
use engine::{EngineConfig, Orientation, SearchAlgorithm, SearchEngine};
use tracing::info;

#[derive(Parser)]
#[command(name = "xiangqi", version)]
#[command(about = "象棋负极大值搜索引擎", long_about = None)]
struct Cli {
    /// 搜索深度
    #[arg(long, global = true, default_value_t = DEFAULT_DEPTH)]
    depth: usize,

    /// 红方在棋盘上方（只影响 --codes 输入）
    #[arg(long, global = true)]
    up_red: bool,

    /// 使用 alpha-beta 剪枝
    #[arg(long, global = true)]
    alpha_beta: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// UCCI 协议模式（默认）
    Ucci,

    /// 选择最佳走法
    Best {
        /// FEN 字符串
        #[arg(long, conflicts_with = "codes", required_unless_present = "codes")]
        fen: Option<String>,

        /// 90 个棋子编码（0..=14），按行优先，逗号分隔
        #[arg(long)]
        codes: Option<String>,

        /// 走棋方，配合 --codes 使用 (red, black)
        #[arg(long, default_value = "red")]
        side: String,
    },

    /// 列出走棋方的所有走法
    Moves {
        /// FEN 字符串
        #[arg(long)]
        fen: String,
    },

    /// 评估局面分数（站在走棋方的角度）
    Score {
        /// FEN 字符串
        #[arg(long)]
        fen: String,
    },
}

impl Cli {
    fn config(&self) -> anyhow::Result<EngineConfig> {
        let algorithm = if self.alpha_beta {
            SearchAlgorithm::AlphaBeta
        } else {
            SearchAlgorithm::Negamax
        };
        let config = EngineConfig {
            orientation: Orientation::from_up_red(self.up_red),
            algorithm,
            ..EngineConfig::default()
        }
        .with_depth(self.depth)?;
        Ok(config)
    }
}

fn parse_side(side: &str) -> anyhow::Result<Player> {
    match side {
        "red" | "r" | "w" => Ok(Player::Red),
        "black" | "b" => Ok(Player::Black),
        _ => bail!("unknown side `{side}`"),
    }
}

fn parse_codes(text: &str) -> anyhow::Result<Grid<u8>> {
    let values = text
        .split(',')
        .map(|v| v.trim().parse::<u8>())
        .collect::<Result<Vec<_>, _>>()
        .context("piece codes must be integers")?;
    let expected = (BOARD_WIDTH * BOARD_HEIGHT) as usize;
    if values.len() != expected {
        bail!("expected {expected} piece codes, got {}", values.len());
    }
    let mut codes = [[0u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
    for (i, value) in values.into_iter().enumerate() {
        codes[i / BOARD_WIDTH as usize][i % BOARD_WIDTH as usize] = value;
    }
    Ok(codes)
}

fn best(config: EngineConfig, fen: Option<String>, codes: Option<String>, side: &str) -> anyhow::Result<()> {
    let (board, turn) = match (fen, codes) {
        (Some(fen), _) => Board::from_fen(&fen)?,
        (None, Some(codes)) => (
            Board::from_codes(&parse_codes(&codes)?, config.orientation)?,
            parse_side(side)?,
        ),
        (None, None) => bail!("either --fen or --codes is required"),
    };
    let mut search = SearchEngine::new(config);
    let m = search.search(&board, turn)?;
    let stats = search.stats();
    info!(
        "depth {} nodes {} leaves {} time {}ms",
        config.depth, stats.nodes, stats.leaves, stats.elapsed_ms
    );
    let (from_row, from_col, to_row, to_col) = m.coords();
    println!("bestmove {m}");
    println!("coords {from_row} {from_col} {to_row} {to_col}");
    println!("score {}", m.score);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    common::init_tracing();
    let cli = Cli::parse();
    let config = cli.config()?;

    match cli.command {
        None | Some(Commands::Ucci) => {
            info!("ucci mode, depth {} {}", config.depth, config.algorithm);
            UcciEngine::new(config)?.start()?;
        }
        Some(Commands::Best { fen, codes, side }) => best(config, fen, codes, &side)?,
        Some(Commands::Moves { fen }) => {
            let (board, turn) = Board::from_fen(&fen)?;
            let mut generator = MoveGenerator::new(0);
            let count = generator.generate(&board, 0, turn)?;
            let moves: Vec<String> = generator.moves(0).iter().map(|m| m.to_string()).collect();
            println!("{count}");
            println!("{}", moves.join(" "));
        }
        Some(Commands::Score { fen }) => {
            let (board, turn) = Board::from_fen(&fen)?;
            println!("{}", Evaluator::new().evaluate(&board, turn));
        }
    }
    Ok(())
}
