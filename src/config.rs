//! System configuration parameters
//!
//! All tunable parameters for the CarGuard controller. Built once at
//! process start from the JSON document in NVS, which may override any
//! subset of fields; missing or unreadable documents mean defaults.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::security::access::CredentialId;
use crate::security::intrusion::TriggerEdge;

/// UIDs of the three project tags accepted out of the box.
pub const DEFAULT_ALLOWED_UIDS: [u64; 3] = [966_206_689_390, 470_912_245_720, 988_692_462_534];

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Access ---
    /// Credentials accepted by engine start and alarm clear.
    pub allowed_credentials: Vec<CredentialId>,
    /// Require a credential tap before every engine start.
    pub require_credential_at_start: bool,
    /// How long "Access denied" stays on screen (milliseconds).
    pub denied_dwell_ms: u32,

    // --- Door ---
    /// Servo angle for the locked position (degrees, 0–180).
    pub lock_angle_deg: f32,
    /// Servo angle for the unlocked position (degrees, 0–180).
    pub unlock_angle_deg: f32,
    /// Lock state applied at startup.
    pub start_locked: bool,
    /// Settle delay after each servo command (milliseconds).
    pub servo_settle_ms: u32,

    // --- Intrusion ---
    /// IR transition that raises the alarm.
    pub trigger_edge: TriggerEdge,
    /// Debounce/confirm hold between the two IR samples (milliseconds).
    pub debounce_hold_ms: u32,

    // --- Engine ---
    /// Slide switch polling interval while waiting (milliseconds).
    pub switch_poll_ms: u32,

    // --- Environment ---
    /// ADC channel of the light-dependent resistor (0–7).
    pub light_channel: u8,
    /// ADC level (0–1023) above which the cabin counts as dark.
    pub light_threshold: u16,
    /// Invert the dark decision (LDR wired to the other divider leg).
    pub light_invert: bool,
    /// Dwell per sensor screen (milliseconds).
    pub sensor_screen_ms: u32,

    // --- Timing ---
    /// Key dequeue timeout per control tick (milliseconds).
    pub key_poll_timeout_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Access
            allowed_credentials: DEFAULT_ALLOWED_UIDS
                .iter()
                .map(|uid| CredentialId::Numeric(*uid))
                .collect(),
            require_credential_at_start: true,
            denied_dwell_ms: 800,

            // Door
            lock_angle_deg: 0.0,
            unlock_angle_deg: 90.0,
            start_locked: true,
            servo_settle_ms: 200,

            // Intrusion — falling edge works even if the IR output idles high
            trigger_edge: TriggerEdge::Falling,
            debounce_hold_ms: 60,

            // Engine
            switch_poll_ms: 100,

            // Environment
            light_channel: 0,
            light_threshold: 500,
            light_invert: false,
            sensor_screen_ms: 2000,

            // Timing
            key_poll_timeout_ms: 100,
        }
    }
}

impl SystemConfig {
    /// Parse a JSON document. Missing fields take their defaults and
    /// out-of-range values are clamped (see [`sanitized`](Self::sanitized)).
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(raw).map_err(|e| {
            warn!("config: rejected JSON document ({e})");
            ConfigError::Malformed
        })?;
        Ok(cfg.sanitized())
    }

    /// Clamp every field into its valid range instead of rejecting it.
    pub fn sanitized(mut self) -> Self {
        self.lock_angle_deg = clamp_angle(self.lock_angle_deg);
        self.unlock_angle_deg = clamp_angle(self.unlock_angle_deg);

        if self.light_channel > 7 {
            warn!("config: light_channel {} clamped to 7", self.light_channel);
            self.light_channel = 7;
        }
        if self.light_threshold > 1023 {
            warn!("config: light_threshold {} clamped to 1023", self.light_threshold);
            self.light_threshold = 1023;
        }
        if self.switch_poll_ms == 0 {
            self.switch_poll_ms = 1;
        }
        if self.allowed_credentials.is_empty() {
            warn!("config: empty allow-list ignored, keeping the default tags");
            self.allowed_credentials = Self::default().allowed_credentials;
        }
        self
    }
}

/// Clamp a servo angle into [0, 180] degrees; non-finite input maps to 0.
pub fn clamp_angle(deg: f32) -> f32 {
    if !deg.is_finite() {
        warn!("config: non-finite angle replaced with 0");
        return 0.0;
    }
    deg.clamp(0.0, 180.0)
}
