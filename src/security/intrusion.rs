//! IR intrusion monitor.
//!
//! ```text
//!            door unlocked
//!   ┌────────────────────────────────┐
//!   ▼                                │
//! Disarmed ──door locked──▶ Armed ──edge──▶ PendingConfirm
//!                             ▲                │      │
//!                             │   not confirmed│      │confirmed
//!                             ├────────────────┘      ▼
//!                             └──alarm cleared──── Triggered
//! ```
//!
//! An edge counts only when it survives a second sample taken
//! `debounce_hold_ms` later: the re-sample must equal the candidate level
//! and still form the configured edge against the pre-edge baseline.
//! The monitor is evaluated only while the door is locked.
//!
//! A confirmed edge raises the alarm and returns [`PollOutcome::Triggered`]
//! so the caller can announce it; [`IntrusionMonitor::run_alarm`] then
//! blocks until the alarm is cleared and re-arms the monitor.

use embedded_hal::delay::DelayNs;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::app::ports::{BuzzerPort, CredentialReader, DisplayPort, MotionSensorPort};
use crate::error::SensorError;
use crate::security::access::{AccessControl, CredentialId};
use crate::security::alarm::AlarmModal;

/// Which IR transition raises the alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerEdge {
    /// `false -> true`
    Rising,
    /// `true -> false`; works even when the IR output idles high.
    #[default]
    Falling,
    /// Any change.
    Any,
}

impl TriggerEdge {
    pub fn matches(self, prev: bool, cur: bool) -> bool {
        match self {
            Self::Rising => !prev && cur,
            Self::Falling => prev && !cur,
            Self::Any => prev != cur,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntrusionState {
    Disarmed,
    Armed,
    PendingConfirm,
    Triggered,
}

/// What a single [`IntrusionMonitor::poll`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The alarm was already active; nothing evaluated.
    Skipped,
    /// Door unlocked.
    Disarmed,
    /// The door was just locked; baseline reseeded.
    Armed,
    /// Evaluated, no confirmed edge.
    Quiet,
    /// The IR read failed; no transition.
    SensorFault(SensorError),
    /// A confirmed edge raised the alarm; it is now Active.
    Triggered,
}

pub struct IntrusionMonitor {
    state: IntrusionState,
    baseline: Option<bool>,
    edge: TriggerEdge,
    hold_ms: u32,
}

impl IntrusionMonitor {
    pub fn new(edge: TriggerEdge, hold_ms: u32) -> Self {
        Self {
            state: IntrusionState::Disarmed,
            baseline: None,
            edge,
            hold_ms,
        }
    }

    pub fn state(&self) -> IntrusionState {
        self.state
    }

    pub fn baseline(&self) -> Option<bool> {
        self.baseline
    }

    pub fn edge(&self) -> TriggerEdge {
        self.edge
    }

    /// One evaluation step.  A confirmed edge enters the alarm and leaves
    /// the monitor in `Triggered` until [`run_alarm`](Self::run_alarm).
    pub fn poll<H>(&mut self, door_locked: bool, alarm: &mut AlarmModal, hw: &mut H) -> PollOutcome
    where
        H: MotionSensorPort + BuzzerPort + DisplayPort + DelayNs,
    {
        if alarm.is_active() {
            return PollOutcome::Skipped;
        }

        if !door_locked {
            if self.state != IntrusionState::Disarmed {
                self.transition(IntrusionState::Disarmed);
            }
            // Track the level while unlocked so locking never sees a stale one.
            self.baseline = hw.read_motion().ok();
            return PollOutcome::Disarmed;
        }

        if self.state == IntrusionState::Disarmed {
            self.baseline = hw.read_motion().ok();
            self.transition(IntrusionState::Armed);
            return PollOutcome::Armed;
        }

        let cur = match hw.read_motion() {
            Ok(level) => level,
            Err(e) => {
                debug!("Intrusion: IR read failed ({e})");
                return PollOutcome::SensorFault(e);
            }
        };

        let Some(prev) = self.baseline else {
            self.baseline = Some(cur);
            return PollOutcome::Quiet;
        };

        if !self.edge.matches(prev, cur) {
            self.baseline = Some(cur);
            return PollOutcome::Quiet;
        }

        self.transition(IntrusionState::PendingConfirm);
        hw.delay_ms(self.hold_ms);
        let confirmed = matches!(
            hw.read_motion(),
            Ok(confirm) if confirm == cur && self.edge.matches(prev, confirm)
        );

        if !confirmed {
            debug!("Intrusion: {:?} edge {} -> {} not confirmed", self.edge, prev, cur);
            self.baseline = Some(cur);
            self.transition(IntrusionState::Armed);
            return PollOutcome::Quiet;
        }

        info!("Intrusion: {:?} edge confirmed ({} -> {})", self.edge, prev, cur);
        self.baseline = Some(cur);
        self.transition(IntrusionState::Triggered);
        alarm.enter(hw);
        PollOutcome::Triggered
    }

    /// Block in the alarm until an allowed credential clears it, then
    /// return to `Armed` with the confirmed reading as baseline.
    pub fn run_alarm<H>(&mut self, alarm: &mut AlarmModal, access: &AccessControl, hw: &mut H) -> CredentialId
    where
        H: BuzzerPort + CredentialReader + DisplayPort + DelayNs,
    {
        let cleared_by = alarm.run(access, hw);
        if self.state == IntrusionState::Triggered {
            self.transition(IntrusionState::Armed);
        }
        cleared_by
    }

    fn transition(&mut self, next: IntrusionState) {
        info!("Intrusion: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
