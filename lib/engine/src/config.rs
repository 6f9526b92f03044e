//! 引擎配置

use crate::board::Orientation;
use crate::constant::DEFAULT_DEPTH;
use crate::error::{EngineError, EngineResult};
use crate::search::SearchAlgorithm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// 搜索深度（层数），至少为 1
    pub depth: usize,
    /// 整数棋盘接口使用的摆法；FEN/UCCI 总是红方在下
    pub orientation: Orientation,
    pub algorithm: SearchAlgorithm,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            depth: DEFAULT_DEPTH,
            orientation: Orientation::RedBottom,
            algorithm: SearchAlgorithm::Negamax,
        }
    }
}

pub fn check_depth(depth: usize) -> EngineResult<usize> {
    if depth == 0 {
        Err(EngineError::InvalidDepth(depth))
    } else {
        Ok(depth)
    }
}

impl EngineConfig {
    pub fn with_depth(mut self, depth: usize) -> EngineResult<Self> {
        self.depth = check_depth(depth)?;
        Ok(self)
    }

    // 处理 `setoption <name> <value>`
    pub fn set_option(&mut self, name: &str, value: &str) -> EngineResult<()> {
        match name {
            "depth" => {
                let depth = value
                    .parse::<usize>()
                    .map_err(|_| EngineError::InvalidOption(format!("depth {value}")))?;
                self.depth = check_depth(depth)?;
            }
            "algorithm" => self.algorithm = value.parse()?,
            _ => return Err(EngineError::InvalidOption(name.to_owned())),
        }
        Ok(())
    }
}
