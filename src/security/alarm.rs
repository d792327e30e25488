//! Modal intrusion alarm.
//!
//! ```text
//!   Inactive ──enter()──▶ Active ──allowed credential──▶ Inactive
//!                           │  ▲                           │
//!                           └──┘ denied / reader fault     └─▶ return-to-menu
//! ```
//!
//! While Active the alarm owns the input path: the control loop drains
//! queued keys instead of dispatching them.  The buzzer stays asserted
//! until an allow-listed credential is read.  A reader fault never clears
//! the alarm; the attempt is retried after a short pause, indefinitely.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::app::ports::{BuzzerPort, CredentialReader, DisplayPort};
use crate::error::ReaderFault;
use crate::security::access::{AccessControl, AccessError, CredentialId, Prompt};

const CLEAR_PROMPT: Prompt<'static> = Prompt::new("ALARM! Present", "RFID to clear");
const RETRY_DELAY_MS: u32 = 100;
const ENTRY_DWELL_MS: u32 = 200;
const CLEARED_DWELL_MS: u32 = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    Inactive,
    Active,
}

/// Result of a single clearing attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearOutcome {
    /// The alarm was active and an allowed credential cleared it.
    Cleared(CredentialId),
    /// The alarm stays active (denied credential or reader fault).
    StillActive(Option<ReaderFault>),
    /// The alarm was not active; nothing was read.
    NotActive,
}

pub struct AlarmModal {
    state: AlarmState,
    return_to_menu: bool,
}

impl Default for AlarmModal {
    fn default() -> Self {
        Self::new()
    }
}

impl AlarmModal {
    pub fn new() -> Self {
        Self {
            state: AlarmState::Inactive,
            return_to_menu: false,
        }
    }

    pub fn state(&self) -> AlarmState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == AlarmState::Active
    }

    /// Raise the alarm: buzzer on, alert on screen.
    pub fn enter<H>(&mut self, hw: &mut H)
    where
        H: BuzzerPort + DisplayPort + DelayNs,
    {
        if self.state != AlarmState::Active {
            info!("Alarm: {:?} -> {:?}", self.state, AlarmState::Active);
        }
        self.state = AlarmState::Active;
        Self::assert_buzzer(hw);
        hw.show("!!! ALARM !!!", "RFID required");
        hw.delay_ms(ENTRY_DWELL_MS);
    }

    /// One clearing attempt.  A denial re-shows the prompt on the next
    /// attempt; the caller decides when to retry.
    pub fn attempt_clear<H>(&mut self, access: &AccessControl, hw: &mut H) -> ClearOutcome
    where
        H: BuzzerPort + CredentialReader + DisplayPort + DelayNs,
    {
        if self.state != AlarmState::Active {
            return ClearOutcome::NotActive;
        }

        match access.authenticate_once(CLEAR_PROMPT, hw) {
            Ok(id) => {
                if let Err(e) = hw.set_buzzer(false) {
                    warn!("Alarm: buzzer release failed ({e})");
                }
                self.state = AlarmState::Inactive;
                self.return_to_menu = true;
                info!("Alarm: {:?} -> {:?} (cleared by {id})", AlarmState::Active, self.state);
                hw.show("Alarm cleared", "");
                hw.delay_ms(CLEARED_DWELL_MS);
                hw.clear();
                ClearOutcome::Cleared(id)
            }
            Err(AccessError::Denied(_)) => ClearOutcome::StillActive(None),
            Err(AccessError::ReaderFault(fault)) => {
                if fault == ReaderFault::Disconnected {
                    hw.show("RFID missing!", "Alarm locked");
                }
                ClearOutcome::StillActive(Some(fault))
            }
        }
    }

    /// Enter the alarm (if not already active) and block until an allowed
    /// credential clears it.  Returns the credential that cleared it.
    pub fn run<H>(&mut self, access: &AccessControl, hw: &mut H) -> CredentialId
    where
        H: BuzzerPort + CredentialReader + DisplayPort + DelayNs,
    {
        if !self.is_active() {
            self.enter(hw);
        }
        loop {
            match self.attempt_clear(access, hw) {
                ClearOutcome::Cleared(id) => return id,
                ClearOutcome::StillActive(_) | ClearOutcome::NotActive => {
                    Self::assert_buzzer(hw);
                    hw.delay_ms(RETRY_DELAY_MS);
                }
            }
        }
    }

    /// Read and reset the return-to-menu signal raised by a clear.
    pub fn take_return_to_menu(&mut self) -> bool {
        core::mem::take(&mut self.return_to_menu)
    }

    fn assert_buzzer(hw: &mut impl BuzzerPort) {
        if let Err(e) = hw.set_buzzer(true) {
            warn!("Alarm: buzzer assert failed ({e}), alarm stays active");
        }
    }
}
