//! 后台搜索线程
//!
//! 一个命名线程独占一个 `SearchEngine`。调用方把棋盘副本连同配置作为任务发过去，
//! 结果从另一个通道取回，调用方自己的棋盘从不与搜索线程共享。
//! 没有取消机制：任务一旦开始就会搜索到设定深度。

use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use tracing::{debug, warn};

use crate::board::{Board, Move, Player};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::search::{SearchEngine, SearchStats};

#[derive(Debug, Clone)]
pub struct SearchJob {
    pub board: Board,
    pub side: Player,
    pub config: EngineConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub result: EngineResult<Move>,
    pub stats: SearchStats,
}

pub struct SearchWorker {
    jobs: Option<Sender<SearchJob>>,
    results: Receiver<SearchOutcome>,
    handle: Option<JoinHandle<()>>,
}

impl SearchWorker {
    pub fn spawn() -> EngineResult<Self> {
        let (job_tx, job_rx) = unbounded::<SearchJob>();
        let (result_tx, result_rx) = unbounded();

        let handle = thread::Builder::new()
            .name("xiangqi-search".to_owned())
            .spawn(move || {
                let mut engine = SearchEngine::new(EngineConfig::default());
                while let Ok(job) = job_rx.recv() {
                    engine.config = job.config;
                    let result = engine.search(&job.board, job.side);
                    let outcome = SearchOutcome {
                        result,
                        stats: engine.stats(),
                    };
                    if result_tx.send(outcome).is_err() {
                        break;
                    }
                }
                debug!("search worker stopped");
            })
            .map_err(|e| {
                warn!("failed to spawn search worker: {e}");
                EngineError::WorkerGone
            })?;

        Ok(SearchWorker {
            jobs: Some(job_tx),
            results: result_rx,
            handle: Some(handle),
        })
    }

    pub fn submit(&self, job: SearchJob) -> EngineResult<()> {
        let jobs = self.jobs.as_ref().ok_or(EngineError::WorkerGone)?;
        jobs.send(job).map_err(|_| EngineError::WorkerGone)
    }

    /// 阻塞等待下一个结果
    pub fn recv(&self) -> EngineResult<SearchOutcome> {
        self.results.recv().map_err(|_| EngineError::WorkerGone)
    }

    /// 不阻塞；搜索还没结束时返回 Ok(None)
    pub fn try_recv(&self) -> EngineResult<Option<SearchOutcome>> {
        match self.results.try_recv() {
            Ok(outcome) => Ok(Some(outcome)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(EngineError::WorkerGone),
        }
    }

    pub fn search(&self, board: &Board, side: Player, config: EngineConfig) -> EngineResult<SearchOutcome> {
        self.submit(SearchJob {
            board: board.clone(),
            side,
            config,
        })?;
        self.recv()
    }
}

impl Drop for SearchWorker {
    fn drop(&mut self) {
        // 关闭任务通道，线程搜完手上的任务后退出
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("search worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::board::*;
    use crate::config::EngineConfig;
    use crate::error::EngineError;
    use crate::worker::*;

    #[test]
    fn test_worker_search() {
        let worker = SearchWorker::spawn().unwrap();
        let board = Board::init(Orientation::RedBottom);
        let config = EngineConfig::default().with_depth(1).unwrap();

        let outcome = worker.search(&board, Player::Red, config).unwrap();
        assert_eq!(outcome.result.unwrap().to_string(), "b2b9");
        assert_eq!(outcome.stats.leaves, 44);
        // 调用方的棋盘没有变
        assert_eq!(board, Board::init(Orientation::RedBottom));
    }

    #[test]
    fn test_worker_queues_jobs() {
        let worker = SearchWorker::spawn().unwrap();
        let board = Board::init(Orientation::RedBottom);
        let config = EngineConfig::default().with_depth(1).unwrap();
        for side in [Player::Red, Player::Black] {
            worker
                .submit(SearchJob {
                    board: board.clone(),
                    side,
                    config,
                })
                .unwrap();
        }
        assert_eq!(worker.recv().unwrap().result.unwrap().to_string(), "b2b9");
        assert_eq!(worker.recv().unwrap().result.unwrap().to_string(), "b7b0");
        assert_eq!(worker.try_recv(), Ok(None));
    }

    #[test]
    fn test_worker_reports_errors() {
        let worker = SearchWorker::spawn().unwrap();
        let (board, _) = Board::from_fen("4k4/9/9/9/9/9/9/9/9/9 w - - 0 1").unwrap();
        let outcome = worker
            .search(&board, Player::Red, EngineConfig::default())
            .unwrap();
        assert_eq!(outcome.result, Err(EngineError::NoLegalMove));

        // 出错后线程仍然可用
        let outcome = worker
            .search(&Board::init(Orientation::RedBottom), Player::Red, EngineConfig::default().with_depth(1).unwrap())
            .unwrap();
        assert!(outcome.result.is_ok());
    }
}
