use std::future::Future;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use tokio::sync::Notify;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);
static INTERRUPT_NOTIFY: OnceLock<Notify> = OnceLock::new();

#[derive(Debug)]
pub struct InterruptedError;

impl std::fmt::Display for InterruptedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interrupted")
    }
}

impl std::error::Error for InterruptedError {}

/// Installs the Ctrl+C handler.
///
/// The handler only sets a flag and wakes waiters; the console decides what
/// an interrupt means. A second Ctrl+C exits immediately.
///
/// # Errors
/// Returns an error if a handler is already installed.
pub fn init() -> Result<()> {
    ctrlc::set_handler(trigger_ctrl_c).context("install Ctrl+C handler")
}

fn notifier() -> &'static Notify {
    INTERRUPT_NOTIFY.get_or_init(Notify::new)
}

/// Triggers an interrupt via Ctrl+C, force-exiting on a second Ctrl+C.
pub fn trigger_ctrl_c() {
    if INTERRUPTED.swap(true, Ordering::SeqCst) {
        std::process::exit(130);
    }
    notifier().notify_waiters();
}

/// Checks if an interrupt has been requested.
pub fn is_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Resets the interrupt flag once an interrupt has been handled.
pub fn reset() {
    INTERRUPTED.store(false, Ordering::SeqCst);
}

/// Returns `InterruptedError` if an interrupt is pending.
///
/// # Errors
/// Returns [`InterruptedError`] when the flag is set.
pub fn check() -> Result<()> {
    if is_interrupted() {
        return Err(InterruptedError.into());
    }
    Ok(())
}

/// Waits until an interrupt is triggered.
pub async fn wait_for_interrupt() {
    loop {
        let notified = notifier().notified();
        tokio::pin!(notified);
        // register before reading the flag so a trigger in between is not lost
        notified.as_mut().enable();
        if is_interrupted() {
            return;
        }
        notified.await;
    }
}

/// Drives `fut` to completion unless an interrupt arrives first.
///
/// A pending interrupt wins over a ready future. The flag is left set.
///
/// # Errors
/// Returns [`InterruptedError`] if interrupted; `fut` is dropped.
pub async fn run_until_interrupted<F: Future>(fut: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        () = wait_for_interrupt() => Err(InterruptedError.into()),
        out = fut => Ok(out),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;
    use std::time::Duration;

    use tokio::sync::Mutex;

    use super::*;

    // the flag is process-wide
    static FLAG_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

    #[tokio::test]
    async fn test_completed_future_passes_through() {
        let _guard = FLAG_LOCK.lock().await;
        reset();

        let out = run_until_interrupted(async { 7 }).await.unwrap();
        assert_eq!(out, 7);
        assert!(check().is_ok());
    }

    #[tokio::test]
    async fn test_pending_interrupt_wins_and_stays_set() {
        let _guard = FLAG_LOCK.lock().await;
        reset();
        trigger_ctrl_c();

        let err = run_until_interrupted(async { 7 }).await.unwrap_err();
        assert!(err.downcast_ref::<InterruptedError>().is_some());
        assert!(check().is_err());

        reset();
        assert!(!is_interrupted());
    }

    #[tokio::test]
    async fn test_interrupt_cancels_in_flight_future() {
        let _guard = FLAG_LOCK.lock().await;
        reset();

        let trigger = std::thread::spawn(|| {
            std::thread::sleep(Duration::from_millis(50));
            trigger_ctrl_c();
        });
        let result = run_until_interrupted(tokio::time::sleep(Duration::from_secs(30))).await;
        trigger.join().unwrap();

        assert!(result.is_err());
        reset();
    }
}
