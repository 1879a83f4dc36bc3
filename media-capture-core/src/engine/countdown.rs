//! Photo countdown timer.
//!
//! Ticks once per second on a dedicated thread and fires a zero callback
//! when it reaches zero. Cancellation is generation-based: bumping the
//! generation makes any in-flight timer thread exit silently after its
//! current sleep, so a cancelled countdown can never trigger a stale grab.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::models::error::CaptureError;

/// Called after each one-second tick with the remaining seconds.
/// The final call reports 0.
pub type TickCallback = Arc<dyn Fn(u32) + Send + Sync + 'static>;

/// Called when the countdown reaches zero without being cancelled.
pub type ZeroCallback = Arc<dyn Fn() + Send + Sync + 'static>;

pub struct Countdown {
    remaining: Arc<AtomicU32>,
    generation: Arc<AtomicU64>,
}

impl Countdown {
    pub fn new() -> Self {
        Self {
            remaining: Arc::new(AtomicU32::new(0)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Seconds left on the current countdown; 0 when disarmed.
    pub fn remaining(&self) -> u32 {
        self.remaining.load(Ordering::SeqCst)
    }

    pub fn is_armed(&self) -> bool {
        self.remaining() > 0
    }

    /// Arm a countdown of `secs` seconds.
    ///
    /// Exactly `secs` one-second ticks fire before `on_zero` runs.
    pub fn arm(
        &mut self,
        secs: u32,
        on_tick: TickCallback,
        on_zero: ZeroCallback,
    ) -> Result<(), CaptureError> {
        if secs == 0 {
            return Err(CaptureError::ConfigurationFailed("countdown must be at least 1 second".into()));
        }
        if self.is_armed() {
            return Err(CaptureError::InvalidState("countdown already armed".into()));
        }

        let my_gen = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.remaining.store(secs, Ordering::SeqCst);

        let remaining = Arc::clone(&self.remaining);
        let generation = Arc::clone(&self.generation);

        thread::Builder::new()
            .name("capture-countdown".into())
            .spawn(move || {
                for left in (0..secs).rev() {
                    thread::sleep(Duration::from_secs(1));
                    if generation.load(Ordering::SeqCst) != my_gen {
                        return;
                    }
                    remaining.store(left, Ordering::SeqCst);
                    on_tick(left);
                    if left == 0 {
                        on_zero();
                    }
                }
            })
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn countdown thread: {}", e)))?;

        Ok(())
    }

    /// Cancel any armed countdown. The timer thread exits without firing.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.remaining.store(0, Ordering::SeqCst);
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recording_callbacks() -> (TickCallback, ZeroCallback, Arc<Mutex<Vec<u32>>>, Arc<AtomicU32>) {
        let ticks = Arc::new(Mutex::new(Vec::new()));
        let zeros = Arc::new(AtomicU32::new(0));

        let ticks_cb = Arc::clone(&ticks);
        let on_tick: TickCallback = Arc::new(move |left| ticks_cb.lock().push(left));

        let zeros_cb = Arc::clone(&zeros);
        let on_zero: ZeroCallback = Arc::new(move || {
            zeros_cb.fetch_add(1, Ordering::SeqCst);
        });

        (on_tick, on_zero, ticks, zeros)
    }

    #[test]
    fn ticks_down_to_zero_then_fires() {
        let (on_tick, on_zero, ticks, zeros) = recording_callbacks();
        let mut countdown = Countdown::new();

        countdown.arm(2, on_tick, on_zero).unwrap();
        assert!(countdown.is_armed());
        assert_eq!(countdown.remaining(), 2);

        thread::sleep(Duration::from_millis(2400));

        assert_eq!(*ticks.lock(), vec![1, 0]);
        assert_eq!(zeros.load(Ordering::SeqCst), 1);
        assert!(!countdown.is_armed());
    }

    #[test]
    fn cancel_suppresses_all_callbacks() {
        let (on_tick, on_zero, ticks, zeros) = recording_callbacks();
        let mut countdown = Countdown::new();

        countdown.arm(1, on_tick, on_zero).unwrap();
        countdown.cancel();

        thread::sleep(Duration::from_millis(1400));

        assert!(ticks.lock().is_empty());
        assert_eq!(zeros.load(Ordering::SeqCst), 0);
        assert_eq!(countdown.remaining(), 0);
    }

    #[test]
    fn rearming_while_armed_is_rejected() {
        let (on_tick, on_zero, _, _) = recording_callbacks();
        let mut countdown = Countdown::new();

        countdown.arm(2, Arc::clone(&on_tick), Arc::clone(&on_zero)).unwrap();
        let err = countdown.arm(2, on_tick, on_zero).unwrap_err();
        assert!(matches!(err, CaptureError::InvalidState(_)));

        countdown.cancel();
    }

    #[test]
    fn zero_seconds_is_rejected() {
        let (on_tick, on_zero, _, _) = recording_callbacks();
        let mut countdown = Countdown::new();

        let err = countdown.arm(0, on_tick, on_zero).unwrap_err();
        assert!(matches!(err, CaptureError::ConfigurationFailed(_)));
    }
}
