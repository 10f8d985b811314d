//! Passive notification surface for the UI host.
//!
//! Failures inside the controller are never propagated as panics; they are
//! logged and, when user-visible, pushed through this sink (the host renders
//! them however it likes, e.g. as a toast).

use std::sync::Arc;

/// Receives short, user-visible notices from the controller.
pub trait NoticeSink: Send + Sync {
    fn notify(&self, message: &str);
}

impl<T: NoticeSink + ?Sized> NoticeSink for Arc<T> {
    fn notify(&self, message: &str) {
        (**self).notify(message);
    }
}

/// Default sink: logs the notice at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotice;

impl NoticeSink for LogNotice {
    fn notify(&self, message: &str) {
        log::warn!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder(Mutex<Vec<String>>);

    impl NoticeSink for Recorder {
        fn notify(&self, message: &str) {
            self.0.lock().expect("lock poisoned").push(message.to_string());
        }
    }

    #[test]
    fn arc_sink_forwards() {
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let sink: Box<dyn NoticeSink> = Box::new(recorder.clone());
        sink.notify("cannot set up camera");
        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec!["cannot set up camera".to_string()]
        );
    }
}
