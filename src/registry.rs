//! Persistent user registry.
//!
//! Up to [`MAX_USERS`] owner records, stored as a single postcard blob in
//! the `users` storage namespace.  Every mutation rewrites the blob, so a
//! power cut leaves either the old table or the new one.
//!
//! The registry is separate from the credential allow-list: enrolling a
//! user here does not let their card unlock anything.

use core::fmt;
use core::str::FromStr;

use heapless::Vec;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{StorageError, StoragePort};

pub const MAX_USERS: usize = 3;

const NAMESPACE: &str = "users";
const TABLE_KEY: &str = "table";
/// Upper bound on the serialized table.
const MAX_BLOB_SIZE: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub rfid: String,
    pub username: String,
    pub password: String,
    pub phone: String,
    pub name: String,
    pub lock_password: String,
}

impl UserRecord {
    fn field(&self, field: UserField) -> &str {
        match field {
            UserField::Rfid => &self.rfid,
            UserField::Username => &self.username,
            UserField::Password => &self.password,
            UserField::Phone => &self.phone,
            UserField::Name => &self.name,
            UserField::LockPassword => &self.lock_password,
        }
    }

    fn field_mut(&mut self, field: UserField) -> &mut String {
        match field {
            UserField::Rfid => &mut self.rfid,
            UserField::Username => &mut self.username,
            UserField::Password => &mut self.password,
            UserField::Phone => &mut self.phone,
            UserField::Name => &mut self.name,
            UserField::LockPassword => &mut self.lock_password,
        }
    }
}

/// Addressable record columns.  Parsed from the column names `RFID`,
/// `Username`, `Password`, `Phone`, `Name`, `LockPassword`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Rfid,
    Username,
    Password,
    Phone,
    Name,
    LockPassword,
}

impl FromStr for UserField {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RFID" => Ok(Self::Rfid),
            "Username" => Ok(Self::Username),
            "Password" => Ok(Self::Password),
            "Phone" => Ok(Self::Phone),
            "Name" => Ok(Self::Name),
            "LockPassword" => Ok(Self::LockPassword),
            _ => Err(RegistryError::InvalidField),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// Already holding [`MAX_USERS`] records.
    Full,
    /// Another record has the same RFID or username.
    Duplicate,
    /// No record with that username.
    NotFound,
    /// Unknown column name.
    InvalidField,
    /// Stored table could not be decoded.
    Corrupt,
    Storage(StorageError),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "user limit of {} reached", MAX_USERS),
            Self::Duplicate => write!(f, "user already exists"),
            Self::NotFound => write!(f, "no such user"),
            Self::InvalidField => write!(f, "invalid field"),
            Self::Corrupt => write!(f, "stored user table is corrupt"),
            Self::Storage(e) => write!(f, "storage: {e}"),
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<StorageError> for RegistryError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

pub struct UserRegistry<S: StoragePort> {
    storage: S,
    users: Vec<UserRecord, MAX_USERS>,
}

impl<S: StoragePort> UserRegistry<S> {
    /// Load the table from storage; a missing table is an empty registry.
    pub fn open(storage: S) -> Result<Self, RegistryError> {
        let mut buf = vec![0u8; MAX_BLOB_SIZE];
        let users = match storage.read(NAMESPACE, TABLE_KEY, &mut buf) {
            Ok(len) => postcard::from_bytes(&buf[..len]).map_err(|_| {
                warn!("Registry: stored table does not decode");
                RegistryError::Corrupt
            })?,
            Err(StorageError::NotFound) => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        info!("Registry: {} user(s) loaded", users.len());
        Ok(Self { storage, users })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    pub fn add(&mut self, record: UserRecord) -> Result<(), RegistryError> {
        if self.users.is_full() {
            return Err(RegistryError::Full);
        }
        if self
            .users
            .iter()
            .any(|u| u.rfid == record.rfid || u.username == record.username)
        {
            return Err(RegistryError::Duplicate);
        }

        let username = record.username.clone();
        let mut next = self.users.clone();
        next.push(record).map_err(|_| RegistryError::Full)?;
        self.commit(next)?;
        info!("Registry: added '{}'", username);
        Ok(())
    }

    pub fn find_by_username(&self, username: &str) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.username == username)
    }

    /// Change one column.  Renaming onto another record's RFID or username
    /// is refused.
    pub fn update_field(&mut self, username: &str, field: &str, value: &str) -> Result<(), RegistryError> {
        let field: UserField = field.parse()?;
        let idx = self.index_of(username)?;

        let clashes = matches!(field, UserField::Rfid | UserField::Username)
            && self
                .users
                .iter()
                .enumerate()
                .any(|(i, u)| i != idx && u.field(field) == value);
        if clashes {
            return Err(RegistryError::Duplicate);
        }

        let mut next = self.users.clone();
        *next[idx].field_mut(field) = value.to_owned();
        self.commit(next)?;
        info!("Registry: '{}' {:?} updated", username, field);
        Ok(())
    }

    pub fn get_field(&self, username: &str, field: &str) -> Result<&str, RegistryError> {
        let field: UserField = field.parse()?;
        self.find_by_username(username)
            .map(|u| u.field(field))
            .ok_or(RegistryError::NotFound)
    }

    pub fn delete(&mut self, username: &str) -> Result<(), RegistryError> {
        let idx = self.index_of(username)?;
        let mut next = self.users.clone();
        next.remove(idx);
        self.commit(next)?;
        info!("Registry: deleted '{}'", username);
        Ok(())
    }

    fn index_of(&self, username: &str) -> Result<usize, RegistryError> {
        self.users
            .iter()
            .position(|u| u.username == username)
            .ok_or(RegistryError::NotFound)
    }

    /// Persist `next`, then adopt it.  On a storage failure the in-memory
    /// table is left as it was.
    fn commit(&mut self, next: Vec<UserRecord, MAX_USERS>) -> Result<(), RegistryError> {
        let blob = postcard::to_allocvec(&next).map_err(|_| RegistryError::Corrupt)?;
        if blob.len() > MAX_BLOB_SIZE {
            return Err(RegistryError::Storage(StorageError::Full));
        }
        self.storage.write(NAMESPACE, TABLE_KEY, &blob)?;
        self.users = next;
        Ok(())
    }

    /// Give the storage back (e.g. to reopen it).
    pub fn into_storage(self) -> S {
        self.storage
    }
}
