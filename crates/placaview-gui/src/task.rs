//! Background requests
//!
//! The UI thread never blocks on the network: a request runs on its own
//! thread and hands its result back over a channel that the panel polls
//! once per frame.

use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;

use eframe::egui;
use log::warn;
use placaview_types::{Error, Result};

/// What polling a [`Task`] produced this frame
pub enum Poll<T> {
    Pending,
    Ready(T),
    /// The worker went away without answering (it panicked)
    Lost,
}

/// One request running on a worker thread
pub struct Task<T> {
    receiver: Receiver<T>,
}

impl<T: Send + 'static> Task<T> {
    /// Run `job` on a new thread; the UI is repainted when it finishes
    pub fn spawn<F>(ctx: &egui::Context, job: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let (sender, receiver) = channel();
        let ctx = ctx.clone();
        thread::spawn(move || {
            let result = job();
            // Receiver is gone when the panel was closed meanwhile
            let _ = sender.send(result);
            ctx.request_repaint();
        });
        Self { receiver }
    }

    pub fn poll(&self) -> Poll<T> {
        match self.receiver.try_recv() {
            Ok(value) => Poll::Ready(value),
            Err(TryRecvError::Empty) => Poll::Pending,
            Err(TryRecvError::Disconnected) => Poll::Lost,
        }
    }
}

/// Poll a request slot, clearing it once the request is done.
///
/// A lost worker is reported as a transport failure so the view leaves its
/// busy state.
pub fn take_result<T: Send + 'static>(slot: &mut Option<Task<Result<T>>>) -> Option<Result<T>> {
    let result = match slot.as_ref()?.poll() {
        Poll::Pending => return None,
        Poll::Ready(result) => result,
        Poll::Lost => {
            warn!("request worker stopped without a result");
            Err(Error::Transport("request worker stopped".to_string()))
        }
    };
    *slot = None;
    Some(result)
}
