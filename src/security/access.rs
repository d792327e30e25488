//! Credential allow-list and the blocking "wait for an authorized tap" gate.
//!
//! ```text
//!   CredentialReader ──▶ normalize ──▶ allow-list ──▶ granted / denied
//!                              │
//!                              └──▶ display feedback
//! ```
//!
//! Credentials are compared in canonical form: a purely decimal identifier
//! is numeric, anything else is trimmed text.  `"966206689390"` and
//! `966206689390` therefore match the same allow-list entry.

use core::fmt;

use embedded_hal::delay::DelayNs;
use log::{info, warn};
use serde::{Deserialize, Serialize, Serializer};

use crate::app::ports::{CredentialReader, DisplayPort};
use crate::error::{ConfigError, ReaderFault};

const GRANTED_DWELL_MS: u32 = 500;

// ── CredentialId ──────────────────────────────────────────────

/// Canonical credential identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "RawCredential")]
pub enum CredentialId {
    Numeric(u64),
    Text(String),
}

/// Either representation accepted in configuration documents.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCredential {
    Numeric(u64),
    Text(String),
}

impl From<RawCredential> for CredentialId {
    fn from(raw: RawCredential) -> Self {
        match raw {
            RawCredential::Numeric(n) => Self::Numeric(n),
            RawCredential::Text(s) => Self::normalize(&s),
        }
    }
}

impl Serialize for CredentialId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Numeric(n) => serializer.serialize_u64(*n),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl CredentialId {
    /// Canonicalize a raw identifier string.
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = trimmed.parse::<u64>() {
                return Self::Numeric(n);
            }
        }
        Self::Text(trimmed.to_owned())
    }

    /// Re-normalize text that may hold a decimal UID.
    fn canonical(self) -> Self {
        match self {
            Self::Text(s) => Self::normalize(&s),
            numeric @ Self::Numeric(_) => numeric,
        }
    }
}

impl From<u64> for CredentialId {
    fn from(uid: u64) -> Self {
        Self::Numeric(uid)
    }
}

impl From<&str> for CredentialId {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

// ── Errors ────────────────────────────────────────────────────

/// Why an authentication attempt did not grant access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// A credential was read but is not on the allow-list.
    Denied(CredentialId),
    /// The reader failed; the attempt is aborted.
    ReaderFault(ReaderFault),
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Denied(id) => write!(f, "credential {id} denied"),
            Self::ReaderFault(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for AccessError {}

impl From<ReaderFault> for AccessError {
    fn from(e: ReaderFault) -> Self {
        Self::ReaderFault(e)
    }
}

// ── AccessControl ─────────────────────────────────────────────

/// Two-line prompt shown while waiting for a tap.
#[derive(Debug, Clone, Copy)]
pub struct Prompt<'a> {
    pub line1: &'a str,
    pub line2: &'a str,
}

impl<'a> Prompt<'a> {
    pub const fn new(line1: &'a str, line2: &'a str) -> Self {
        Self { line1, line2 }
    }
}

pub struct AccessControl {
    allowed: Vec<CredentialId>,
    denied_dwell_ms: u32,
}

impl AccessControl {
    /// Build from configuration.  An empty list here means "deny everyone".
    pub fn new(allowed: impl IntoIterator<Item = CredentialId>, denied_dwell_ms: u32) -> Self {
        let mut ac = Self {
            allowed: Vec::new(),
            denied_dwell_ms,
        };
        ac.extend(allowed);
        ac
    }

    fn extend(&mut self, ids: impl IntoIterator<Item = CredentialId>) {
        for id in ids.into_iter().map(CredentialId::canonical) {
            if !self.allowed.contains(&id) {
                self.allowed.push(id);
            }
        }
    }

    pub fn is_allowed(&self, id: &CredentialId) -> bool {
        // Entries are canonical on insert, so one comparison covers both forms.
        self.allowed.contains(&id.clone().canonical())
    }

    /// Replace the allow-list.  An empty replacement is rejected and the
    /// current list kept; use [`clear`](Self::clear) to deny everyone.
    pub fn set_allowed(
        &mut self,
        ids: impl IntoIterator<Item = CredentialId>,
    ) -> Result<(), ConfigError> {
        let next = Self::new(ids, self.denied_dwell_ms);
        if next.allowed.is_empty() {
            warn!("Access: empty allow-list rejected");
            return Err(ConfigError::EmptyAllowList);
        }
        info!("Access: allow-list replaced ({} entries)", next.allowed.len());
        self.allowed = next.allowed;
        Ok(())
    }

    /// Explicitly empty the allow-list.  Every credential is then denied.
    pub fn clear(&mut self) {
        warn!("Access: allow-list cleared, all credentials will be denied");
        self.allowed.clear();
    }

    pub fn allowed(&self) -> &[CredentialId] {
        &self.allowed
    }

    /// One read: granted, denied, or reader fault.  Display feedback is
    /// shown for every outcome.
    pub fn authenticate_once<H>(&self, prompt: Prompt<'_>, hw: &mut H) -> Result<CredentialId, AccessError>
    where
        H: CredentialReader + DisplayPort + DelayNs,
    {
        hw.show(prompt.line1, prompt.line2);

        let uid = match hw.read_credential() {
            Ok(uid) => uid,
            Err(fault) => {
                warn!("Access: reader fault ({fault})");
                hw.show("RFID read error", "Try again");
                return Err(AccessError::ReaderFault(fault));
            }
        };

        let id = CredentialId::Numeric(uid);
        if self.is_allowed(&id) {
            info!("Access: granted {id}");
            hw.show("Access Granted", "");
            hw.delay_ms(GRANTED_DWELL_MS);
            Ok(id)
        } else {
            info!("Access: denied {id}");
            hw.show("Access denied", &format!("UID:{id}"));
            hw.delay_ms(self.denied_dwell_ms);
            Err(AccessError::Denied(id))
        }
    }

    /// Block until an allowed credential is read, re-prompting after each
    /// denial.  A reader fault aborts the wait.
    pub fn authenticate_blocking<H>(&self, prompt: Prompt<'_>, hw: &mut H) -> Result<CredentialId, ReaderFault>
    where
        H: CredentialReader + DisplayPort + DelayNs,
    {
        loop {
            match self.authenticate_once(prompt, hw) {
                Ok(id) => return Ok(id),
                Err(AccessError::Denied(_)) => {}
                Err(AccessError::ReaderFault(fault)) => return Err(fault),
            }
        }
    }
}
