//! バックグラウンド分類
//!
//! 依頼ごとにスレッドを立て、結果はチャネルで受け取る。結果にはバッファの
//! 識別子が付いているので、古い結果は `Session::accept` で捨てられる。

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use tracing::debug;

use crate::session::{Classification, ClassifyRequest};

pub struct ClassifyWorker {
    tx: Sender<Classification>,
    rx: Receiver<Classification>,
    in_flight: usize,
}

impl ClassifyWorker {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx, in_flight: 0 }
    }

    /// 分類をバックグラウンドで開始する
    pub fn submit(&mut self, request: ClassifyRequest) {
        let tx = self.tx.clone();
        debug!(buffer = ?request.buffer.id(), "classification submitted");
        thread::spawn(move || {
            let result = request.run();
            let _ = tx.send(result);
        });
        self.in_flight += 1;
    }

    /// 完了した結果をすべて取り出す（ブロックしない）
    pub fn poll(&mut self) -> Vec<Classification> {
        let mut done = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(result) => done.push(result),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        self.in_flight = self.in_flight.saturating_sub(done.len());
        done
    }

    /// 実行中の依頼があるか
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }
}

impl Default for ClassifyWorker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::config::Config;
    use crate::session::Session;

    fn wait_for(worker: &mut ClassifyWorker, count: usize) -> Vec<Classification> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut results = Vec::new();
        while results.len() < count && Instant::now() < deadline {
            results.extend(worker.poll());
            thread::sleep(Duration::from_millis(5));
        }
        results
    }

    #[test]
    fn test_background_classification() {
        let mut session = Session::new(Config::default());
        let mut worker = ClassifyWorker::new();
        worker.submit(session.load("a.txt", b"hello".to_vec()).unwrap());
        assert!(worker.is_busy());

        let results = wait_for(&mut worker, 1);
        assert_eq!(results.len(), 1);
        assert!(!worker.is_busy());
        for result in results {
            assert!(session.accept(result));
        }
        assert!(session.render().is_some());
    }

    #[test]
    fn test_only_latest_buffer_applied() {
        let mut session = Session::new(Config::default());
        let mut worker = ClassifyWorker::new();
        worker.submit(session.load("a.txt", b"first".to_vec()).unwrap());
        worker.submit(session.load("b.txt", b"second".to_vec()).unwrap());

        let results = wait_for(&mut worker, 2);
        let applied = results.into_iter().filter(|r| session.accept(r.clone())).count();
        assert_eq!(applied, 1);
        assert_eq!(session.document().unwrap().name(), "b.txt");
        assert!(!session.is_pending());
    }
}
