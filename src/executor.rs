//! Background executor for per-frame capture callbacks.
//!
//! A single dedicated worker thread drains [`FrameEvent`]s so the host thread
//! is never blocked by camera I/O. Frame callbacks are diagnostic only; the
//! worker never mutates controller state.

use crate::errors::ControllerError;
use crate::types::FrameEvent;
use crossbeam_channel::{Receiver, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

pub struct BackgroundExecutor {
    sender: Option<Sender<FrameEvent>>,
    worker: Option<JoinHandle<()>>,
}

impl BackgroundExecutor {
    /// Spawn the worker thread. `verbose` gates per-frame debug logging.
    pub fn start(thread_name: &str, verbose: bool) -> Result<Self, ControllerError> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let worker = std::thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || frame_loop(rx, verbose))
            .map_err(|e| ControllerError::Platform(format!("failed to spawn frame worker: {e}")))?;

        Ok(Self {
            sender: Some(tx),
            worker: Some(worker),
        })
    }

    /// Sender handed to the platform backend when submitting a repeating
    /// request. Returns `None` after [`stop`](Self::stop).
    pub fn frame_sender(&self) -> Option<Sender<FrameEvent>> {
        self.sender.clone()
    }

    /// Disconnect the channel and join the worker, waiting at most
    /// `join_timeout`. Returns `false` when the worker is still running after
    /// the deadline (the handle is kept so a later stop can retry).
    pub fn stop(&mut self, join_timeout: Duration) -> bool {
        // Dropping our sender half disconnects the loop once the platform's
        // clones are gone too.
        self.sender = None;

        let Some(worker) = self.worker.take() else {
            return true;
        };

        let start = Instant::now();
        let mut worker = Some(worker);
        loop {
            let finished = worker.as_ref().is_some_and(|w| w.is_finished());
            if finished {
                let _ = worker.take().map(JoinHandle::join);
                return true;
            }
            if start.elapsed() >= join_timeout {
                self.worker = worker.take();
                return false;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}

impl Drop for BackgroundExecutor {
    fn drop(&mut self) {
        if !self.stop(Duration::from_millis(100)) {
            log::warn!("frame worker still running at executor drop");
        }
    }
}

fn frame_loop(rx: Receiver<FrameEvent>, verbose: bool) {
    while let Ok(event) = rx.recv() {
        if !verbose {
            continue;
        }
        match event {
            FrameEvent::Started {
                frame_number,
                timestamp_ns,
            } => log::debug!("capture started: frame {} @ {}", frame_number, timestamp_ns),
            FrameEvent::Completed { frame_number } => {
                log::debug!("capture completed: frame {}", frame_number)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_then_stop_joins_worker() {
        let mut executor = BackgroundExecutor::start("test-frames", true).unwrap();
        let tx = executor.frame_sender().unwrap();
        tx.send(FrameEvent::Started {
            frame_number: 1,
            timestamp_ns: 42,
        })
        .unwrap();
        tx.send(FrameEvent::Completed { frame_number: 1 }).unwrap();
        drop(tx);
        assert!(executor.stop(Duration::from_secs(2)));
        assert!(executor.frame_sender().is_none());
    }

    #[test]
    fn stop_is_idempotent() {
        let mut executor = BackgroundExecutor::start("test-frames", false).unwrap();
        assert!(executor.stop(Duration::from_secs(2)));
        assert!(executor.stop(Duration::from_secs(2)));
    }

    #[test]
    fn worker_exits_when_all_senders_drop() {
        let mut executor = BackgroundExecutor::start("test-frames", false).unwrap();
        let extra = executor.frame_sender().unwrap();
        extra.send(FrameEvent::Completed { frame_number: 7 }).unwrap();
        drop(extra);
        assert!(executor.stop(Duration::from_secs(2)));
    }
}
