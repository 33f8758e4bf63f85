//! Display refresh ticker.
//!
//! The recorder redraws the elapsed-time display on a fixed interval while
//! the clock runs. [`Ticker`] is the scheduled tick source: a background
//! thread that invokes a callback every tick until canceled. Cancellation
//! joins the thread, so once [`Ticker::cancel`] (or drop) returns no further
//! tick can fire. The callback is purely observational and must not mutate
//! session state.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Interval between display refreshes.
pub const TICK_INTERVAL: Duration = Duration::from_millis(10);

/// A cancelable periodic tick source.
#[derive(Debug)]
pub struct Ticker {
    stop: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Spawns a tick source invoking `tick` every [`TICK_INTERVAL`].
    pub fn spawn<F>(tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        Self::with_interval(TICK_INTERVAL, tick)
    }

    /// Spawns a tick source with a custom interval.
    pub fn with_interval<F>(interval: Duration, mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (stop, ticks) = mpsc::channel();
        let handle = thread::spawn(move || {
            loop {
                match ticks.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => tick(),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });
        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Cancels the tick source and waits for the thread to exit.
    pub fn cancel(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // The receiver may already be gone if the thread exited; either way
        // the join below guarantees no further tick fires.
        let _ = self.stop.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn ticks_repeatedly_while_live() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let ticker = Ticker::with_interval(Duration::from_millis(1), move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        thread::sleep(Duration::from_millis(50));
        assert!(count.load(Ordering::SeqCst) > 1);
        ticker.cancel();
    }

    #[test]
    fn cancel_stops_ticking() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let ticker = Ticker::with_interval(Duration::from_millis(1), move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        thread::sleep(Duration::from_millis(20));
        ticker.cancel();

        let after_cancel = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(count.load(Ordering::SeqCst), after_cancel);
    }

    #[test]
    fn drop_cancels_the_tick_source() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        {
            let _ticker = Ticker::with_interval(Duration::from_millis(1), move || {
                seen.fetch_add(1, Ordering::SeqCst);
            });
            thread::sleep(Duration::from_millis(20));
        }

        let after_drop = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(count.load(Ordering::SeqCst), after_drop);
    }
}
