//! Keypad event queue.
//!
//! Key presses are produced by the keypad scanning task and consumed by
//! the control loop, one per tick.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Keypad task  │────▶│   KeyQueue   │────▶│ Control loop │
//! │ (producer)   │     │ (64, lossy)  │     │ (consumer)   │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! The producer never blocks: when the queue is full the **oldest** key is
//! evicted to admit the newest one.  The queue is the only object shared
//! between the two contexts.

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_hal::delay::DelayNs;
use heapless::Deque;
use log::debug;

use crate::app::ports::KeySource;
use crate::drivers::task_pin::{self, Core};

/// Maximum number of pending key presses.
pub const KEY_QUEUE_DEPTH: usize = 64;

/// Granularity of the consumer-side wait in [`KeyQueue::pop_timeout`].
const POLL_SLICE_MS: u32 = 5;

/// A discrete keypad symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// `0`–`9`.
    Digit(u8),
    /// `*` — previous menu page.
    Star,
    /// `#` — next menu page.
    Hash,
    /// `A`–`D` on 4×4 pads.
    Letter(char),
}

impl Key {
    /// Decode a keypad symbol as printed on the key cap.
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '0'..='9' => c.to_digit(10).map(|d| Self::Digit(d as u8)),
            '*' => Some(Self::Star),
            '#' => Some(Self::Hash),
            'A'..='D' => Some(Self::Letter(c)),
            _ => None,
        }
    }

    /// The symbol printed on the key cap.
    pub fn symbol(self) -> char {
        match self {
            Self::Digit(d) => char::from(b'0' + d.min(9)),
            Self::Star => '*',
            Self::Hash => '#',
            Self::Letter(c) => c,
        }
    }
}

/// Bounded, drop-oldest FIFO of key presses.
pub struct KeyQueue {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Deque<Key, KEY_QUEUE_DEPTH>>>,
    /// Keys evicted because the consumer fell behind.
    evicted: AtomicU32,
}

impl Default for KeyQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyQueue {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
            evicted: AtomicU32::new(0),
        }
    }

    /// Push a key.  Never blocks; returns `true` if the oldest pending key
    /// had to be evicted to make room.
    pub fn push(&self, key: Key) -> bool {
        let evicted = self.inner.lock(|q| {
            let mut q = q.borrow_mut();
            let evicted = if q.is_full() { q.pop_front() } else { None };
            // Cannot fail: a slot was freed above if the deque was full.
            let _ = q.push_back(key);
            evicted
        });

        match evicted {
            Some(old) => {
                self.evicted.fetch_add(1, Ordering::Relaxed);
                debug!("key queue full, evicted '{}'", old.symbol());
                true
            }
            None => false,
        }
    }

    /// Pop the oldest key, if any.
    pub fn pop(&self) -> Option<Key> {
        self.inner.lock(|q| q.borrow_mut().pop_front())
    }

    /// Pop the oldest key, waiting up to `timeout_ms` for one to arrive.
    pub fn pop_timeout(&self, timeout_ms: u32, delay: &mut impl DelayNs) -> Option<Key> {
        let mut waited = 0;
        loop {
            if let Some(key) = self.pop() {
                return Some(key);
            }
            if waited >= timeout_ms {
                return None;
            }
            let slice = POLL_SLICE_MS.min(timeout_ms - waited);
            delay.delay_ms(slice);
            waited += slice;
        }
    }

    /// Discard every pending key.  Returns how many were dropped.
    pub fn drain(&self) -> usize {
        self.inner.lock(|q| {
            let mut q = q.borrow_mut();
            let n = q.len();
            q.clear();
            n
        })
    }

    /// Number of pending keys.
    pub fn len(&self) -> usize {
        self.inner.lock(|q| q.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total keys evicted on overflow since startup.
    pub fn evicted(&self) -> u32 {
        self.evicted.load(Ordering::Relaxed)
    }
}

// ── Producer task ─────────────────────────────────────────────

/// Background producer: drives a [`KeySource`] and feeds the queue.
pub struct InputEventSource<S> {
    source: S,
    queue: Arc<KeyQueue>,
}

impl<S: KeySource> InputEventSource<S> {
    pub fn new(source: S, queue: Arc<KeyQueue>) -> Self {
        Self { source, queue }
    }

    /// Scan forever (or until the source gives up), enqueuing every key.
    pub fn run(mut self) {
        let queue = self.queue;
        self.source.scan_blocking(&mut |key| {
            queue.push(key);
        });
        debug!("key source stopped scanning");
    }
}

impl<S: KeySource + Send + 'static> InputEventSource<S> {
    /// Run the producer on its own thread (application core on ESP32).
    pub fn spawn(self) -> std::io::Result<std::thread::JoinHandle<()>> {
        task_pin::spawn_on_core(Core::App, 5, 4, "keypad\0", move || self.run())
    }
}
