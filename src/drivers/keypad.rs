//! Matrix keypad scanner with sample-count debounce.
//!
//! ## Hardware
//!
//! Rows are push-pull outputs idling high; columns are inputs with
//! pull-ups.  A scan drives one row low at a time and reads every
//! column: a low column means the key at (row, col) is down.
//!
//! ## Debounce
//!
//! ```text
//!  raw   ──┐ ┌─┐ ┌──────────────────┐
//!          └─┘ └─┘                  └──────
//!  stable        ├── N samples ──┤▲
//!                                 └ key emitted once
//! ```
//!
//! A reading must repeat for `debounce_ms / scan_interval_ms` consecutive
//! scans before it becomes the stable state.  A key is reported on the
//! transition of the stable state to a new pressed key; holding a key
//! down never repeats it.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::{debug, warn};

use crate::app::ports::KeySource;
use crate::events::Key;

/// Phone-style 4×3 pad.
pub const LAYOUT_4X3: [[char; 3]; 4] = [
    ['1', '2', '3'],
    ['4', '5', '6'],
    ['7', '8', '9'],
    ['*', '0', '#'],
];

/// 4×4 pad with the `A`–`D` column.
pub const LAYOUT_4X4: [[char; 4]; 4] = [
    ['1', '2', '3', 'A'],
    ['4', '5', '6', 'B'],
    ['7', '8', '9', 'C'],
    ['*', '0', '#', 'D'],
];

/// Row settle time after driving a row low.
const ROW_SETTLE_US: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTiming {
    pub scan_interval_ms: u32,
    pub debounce_ms: u32,
}

impl Default for ScanTiming {
    fn default() -> Self {
        Self {
            scan_interval_ms: 10,
            debounce_ms: 30,
        }
    }
}

impl ScanTiming {
    fn samples(&self) -> u32 {
        self.debounce_ms
            .div_ceil(self.scan_interval_ms.max(1))
            .max(1)
    }
}

pub struct KeypadScanner<R, C, D, const ROWS: usize, const COLS: usize>
where
    R: OutputPin,
    C: InputPin,
    D: DelayNs,
{
    rows: [R; ROWS],
    cols: [C; COLS],
    layout: [[char; COLS]; ROWS],
    delay: D,
    timing: ScanTiming,
    candidate: Option<char>,
    repeats: u32,
    stable: Option<char>,
}

impl<R, C, D, const ROWS: usize, const COLS: usize> KeypadScanner<R, C, D, ROWS, COLS>
where
    R: OutputPin,
    C: InputPin,
    D: DelayNs,
{
    pub fn new(
        rows: [R; ROWS],
        cols: [C; COLS],
        layout: [[char; COLS]; ROWS],
        delay: D,
        timing: ScanTiming,
    ) -> Self {
        let mut scanner = Self {
            rows,
            cols,
            layout,
            delay,
            timing,
            candidate: None,
            repeats: 0,
            stable: None,
        };
        for row in scanner.rows.iter_mut() {
            if row.set_high().is_err() {
                warn!("keypad: row idle write failed");
            }
        }
        scanner
    }

    /// One raw pass over the matrix: the first key found down, if any.
    pub fn scan_matrix(&mut self) -> Option<char> {
        let mut found = None;
        for (r, row) in self.rows.iter_mut().enumerate() {
            if row.set_low().is_err() {
                debug!("keypad: row {r} drive failed");
                continue;
            }
            self.delay.delay_us(ROW_SETTLE_US);
            if found.is_none() {
                found = self
                    .cols
                    .iter_mut()
                    .position(|col| col.is_low().unwrap_or(false))
                    .map(|c| self.layout[r][c]);
            }
            let _ = row.set_high();
        }
        found
    }

    /// Feed one raw sample through the debouncer.  Returns a key on a
    /// debounced press.
    pub fn poll(&mut self) -> Option<Key> {
        let raw = self.scan_matrix();
        if raw == self.candidate {
            self.repeats = self.repeats.saturating_add(1);
        } else {
            self.candidate = raw;
            self.repeats = 1;
        }

        if self.repeats != self.timing.samples() || self.stable == self.candidate {
            return None;
        }
        self.stable = self.candidate;
        let key = self.stable.and_then(Key::from_symbol);
        if let Some(k) = key {
            debug!("keypad: '{}'", k.symbol());
        }
        key
    }
}

impl<R, C, D, const ROWS: usize, const COLS: usize> KeySource for KeypadScanner<R, C, D, ROWS, COLS>
where
    R: OutputPin,
    C: InputPin,
    D: DelayNs,
{
    fn scan_blocking(&mut self, on_key: &mut dyn FnMut(Key)) {
        loop {
            if let Some(key) = self.poll() {
                on_key(key);
            }
            self.delay.delay_ms(self.timing.scan_interval_ms);
        }
    }
}
