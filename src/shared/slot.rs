// This is free and unencumbered software released into the public domain.

use std::{
    sync::{Condvar, Mutex, MutexGuard},
    time::{Duration, Instant},
};

/// Single-slot rendezvous cell holding the most recently completed image.
///
/// One writer (the platform's image callback) swaps new values in; readers
/// inspect the current value under the same lock. Replacing a value drops
/// its predecessor while the lock is held, so at most one value is ever
/// alive in the slot. This is not a queue: intermediate values are lost.
#[derive(Debug)]
pub struct ImageSlot<T> {
    state: Mutex<SlotState<T>>,
    ready: Condvar,
}

#[derive(Debug)]
struct SlotState<T> {
    value: Option<T>,
    generation: u64,
}

impl<T> Default for SlotState<T> {
    fn default() -> Self {
        Self {
            value: None,
            generation: 0,
        }
    }
}

impl<T> Default for ImageSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ImageSlot<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::default()),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotState<T>> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Stores `value`, dropping the previous value first, and wakes waiters.
    /// Returns the new generation.
    pub fn replace(&self, value: T) -> u64 {
        let mut state = self.lock();
        drop(state.value.take());
        state.value = Some(value);
        state.generation += 1;
        let generation = state.generation;
        drop(state);
        self.ready.notify_all();
        generation
    }

    /// Runs `f` on the current value while holding the lock.
    pub fn with_latest<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let state = self.lock();
        state.value.as_ref().map(f)
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn is_empty(&self) -> bool {
        self.lock().value.is_none()
    }

    /// Blocks until a value newer than generation `seen` arrives, or until
    /// `timeout` elapses. Returns whether a newer value is present.
    pub fn wait_newer(&self, seen: u64, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.lock();
        while state.generation <= seen {
            let wait = match deadline {
                Some(deadline) => match deadline.checked_duration_since(Instant::now()) {
                    Some(left) if !left.is_zero() => left,
                    _ => return false,
                },
                None => Duration::from_secs(3600),
            };
            state = match self.ready.wait_timeout(state, wait) {
                Ok((guard, _)) => guard,
                Err(p) => p.into_inner().0,
            };
        }
        true
    }

    /// Drops the held value, if any.
    pub fn clear(&self) {
        let mut state = self.lock();
        drop(state.value.take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        thread,
    };

    struct Tracked {
        id: usize,
        drops: Arc<AtomicUsize>,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn replacing_drops_the_predecessor_once() {
        let drops = Arc::new(AtomicUsize::new(0));
        let slot = ImageSlot::new();

        assert_eq!(
            slot.replace(Tracked {
                id: 1,
                drops: drops.clone()
            }),
            1
        );
        assert_eq!(drops.load(Ordering::SeqCst), 0);

        assert_eq!(
            slot.replace(Tracked {
                id: 2,
                drops: drops.clone()
            }),
            2
        );
        assert_eq!(drops.load(Ordering::SeqCst), 1);
        assert_eq!(slot.with_latest(|t| t.id), Some(2));

        slot.clear();
        assert_eq!(drops.load(Ordering::SeqCst), 2);
        assert!(slot.is_empty());
        assert_eq!(slot.generation(), 2);
    }

    #[test]
    fn empty_slot_yields_nothing() {
        let slot: ImageSlot<u8> = ImageSlot::new();
        assert_eq!(slot.with_latest(|v| *v), None);
        assert!(!slot.wait_newer(0, Duration::from_millis(10)));
    }

    #[test]
    fn waiting_returns_once_a_newer_value_lands() {
        let slot = Arc::new(ImageSlot::new());
        slot.replace(1u32);
        let seen = slot.generation();

        let writer = {
            let slot = slot.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                slot.replace(2u32);
            })
        };

        assert!(slot.wait_newer(seen, Duration::from_secs(5)));
        assert_eq!(slot.with_latest(|v| *v), Some(2));
        writer.join().unwrap();
    }

    #[test]
    fn waiting_on_an_already_newer_value_does_not_block() {
        let slot = ImageSlot::new();
        slot.replace("a");
        assert!(slot.wait_newer(0, Duration::ZERO));
    }

    #[test]
    fn concurrent_writers_leave_exactly_one_value() {
        let drops = Arc::new(AtomicUsize::new(0));
        let slot = Arc::new(ImageSlot::new());

        let writers: Vec<_> = (0..4)
            .map(|w| {
                let slot = slot.clone();
                let drops = drops.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        slot.replace(Tracked {
                            id: w * 100 + i,
                            drops: drops.clone(),
                        });
                    }
                })
            })
            .collect();
        for w in writers {
            w.join().unwrap();
        }

        assert_eq!(slot.generation(), 200);
        assert_eq!(drops.load(Ordering::SeqCst), 199);
        assert!(!slot.is_empty());
    }
}
