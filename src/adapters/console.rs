//! Serial-console stand-ins for the RFID reader and the 16×2 LCD.
//!
//! `ConsoleReader` takes one decimal UID per line from any [`BufRead`]
//! (stdin over the USB-CDC console on target, a `Cursor` in tests).
//! `LogDisplay` mirrors what a 16×2 character LCD would show into the log.

use std::io::BufRead;

use log::{info, warn};

use crate::app::ports::{CredentialReader, DisplayPort};
use crate::error::ReaderFault;

/// Character columns per LCD row.
pub const LCD_COLS: usize = 16;

pub struct ConsoleReader<R: BufRead> {
    input: R,
    line: String,
}

impl<R: BufRead> ConsoleReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            line: String::new(),
        }
    }
}

impl<R: BufRead> CredentialReader for ConsoleReader<R> {
    /// Blank lines are skipped; end of input means the reader is gone.
    fn read_credential(&mut self) -> Result<u64, ReaderFault> {
        loop {
            self.line.clear();
            match self.input.read_line(&mut self.line) {
                Ok(0) => return Err(ReaderFault::Disconnected),
                Ok(_) => {}
                Err(e) => {
                    warn!("Reader: console read failed ({e})");
                    return Err(ReaderFault::Disconnected);
                }
            }
            let frame = self.line.trim();
            if frame.is_empty() {
                continue;
            }
            return frame.parse().map_err(|_| {
                warn!("Reader: bad frame {:?}", frame);
                ReaderFault::BadFrame
            });
        }
    }
}

/// Two-row text buffer that logs every full redraw.
#[derive(Debug, Default)]
pub struct LogDisplay {
    rows: [String; 2],
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> (&str, &str) {
        (&self.rows[0], &self.rows[1])
    }
}

impl DisplayPort for LogDisplay {
    fn clear(&mut self) {
        for row in &mut self.rows {
            row.clear();
        }
    }

    fn write_line(&mut self, row: u8, text: &str) {
        let Some(slot) = usize::from(row)
            .checked_sub(1)
            .and_then(|i| self.rows.get_mut(i))
        else {
            warn!("LCD: row {row} out of range");
            return;
        };
        *slot = text.chars().take(LCD_COLS).collect();
        info!("LCD | {:<16} | {:<16}", self.rows[0], self.rows[1]);
    }
}
