//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`StoragePort`] for the user registry.
//!
//! - Namespace isolation: each subsystem uses its own namespace.
//! - Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`.
//! - On the host the backend is an in-memory map keyed `ns::key`, so the
//!   registry can be exercised in tests without flash.

use log::info;

use crate::app::ports::{StorageError, StoragePort};

#[cfg(not(target_os = "espidf"))]
use std::cell::RefCell;
#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::warn;

/// NVS key and namespace names are limited to 15 bytes plus the nul.
#[cfg(target_os = "espidf")]
const NVS_NAME_MAX: usize = 15;

pub struct NvsStorage {
    #[cfg(not(target_os = "espidf"))]
    store: RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsStorage {
    /// Initialise NVS flash.  On first boot or after a layout change the
    /// partition is erased and re-initialised.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called once from the main task before any other NVS use.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK || unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(StorageError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(StorageError::IoError);
            }
            info!("NvsStorage: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsStorage: in-memory backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: RefCell::new(HashMap::new()),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// Nul-terminated, truncated copy of an NVS name.
    #[cfg(target_os = "espidf")]
    fn c_name(name: &str) -> [u8; NVS_NAME_MAX + 1] {
        let mut buf = [0u8; NVS_NAME_MAX + 1];
        let len = name.len().min(NVS_NAME_MAX);
        buf[..len].copy_from_slice(&name.as_bytes()[..len]);
        buf
    }

    /// Open a namespace, run `f` with the handle, then close it.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let ns = Self::c_name(namespace);
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let mut handle: nvs_handle_t = 0;
        let ret = unsafe { nvs_open(ns.as_ptr().cast(), mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }
        let result = f(handle);
        unsafe { nvs_close(handle) };
        result
    }

    #[cfg(target_os = "espidf")]
    fn commit(handle: nvs_handle_t) -> Result<(), i32> {
        match unsafe { nvs_commit(handle) } {
            ESP_OK => Ok(()),
            e => Err(e),
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl StoragePort for NvsStorage {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let store = self.store.borrow();
        let data = store
            .get(&Self::composite_key(namespace, key))
            .ok_or(StorageError::NotFound)?;
        if data.len() > buf.len() {
            return Err(StorageError::Full);
        }
        buf[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.store
            .borrow_mut()
            .insert(Self::composite_key(namespace, key), data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.store.borrow_mut().remove(&Self::composite_key(namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.store
            .borrow()
            .contains_key(&Self::composite_key(namespace, key))
    }
}

#[cfg(target_os = "espidf")]
impl StoragePort for NvsStorage {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let key = Self::c_name(key);
        let result = Self::with_nvs_handle(namespace, false, |handle| {
            let mut size = buf.len();
            let ret = unsafe {
                nvs_get_blob(handle, key.as_ptr().cast(), buf.as_mut_ptr().cast(), &mut size)
            };
            if ret == ESP_OK { Ok(size) } else { Err(ret) }
        });
        match result {
            Ok(size) => Ok(size),
            Err(ESP_ERR_NVS_NOT_FOUND) => Err(StorageError::NotFound),
            Err(ESP_ERR_NVS_INVALID_LENGTH) => Err(StorageError::Full),
            Err(e) => {
                warn!("NvsStorage: read {} failed ({})", namespace, e);
                Err(StorageError::IoError)
            }
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let key = Self::c_name(key);
        let result = Self::with_nvs_handle(namespace, true, |handle| {
            let ret = unsafe {
                nvs_set_blob(handle, key.as_ptr().cast(), data.as_ptr().cast(), data.len())
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            Self::commit(handle)
        });
        match result {
            Ok(()) => Ok(()),
            Err(ESP_ERR_NVS_NOT_ENOUGH_SPACE) => Err(StorageError::Full),
            Err(e) => {
                warn!("NvsStorage: write {} failed ({})", namespace, e);
                Err(StorageError::IoError)
            }
        }
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        let key = Self::c_name(key);
        Self::with_nvs_handle(namespace, true, |handle| {
            let ret = unsafe { nvs_erase_key(handle, key.as_ptr().cast()) };
            if ret != ESP_OK && ret != ESP_ERR_NVS_NOT_FOUND {
                return Err(ret);
            }
            Self::commit(handle)
        })
        .or_else(|e| if e == ESP_ERR_NVS_NOT_FOUND { Ok(()) } else { Err(StorageError::IoError) })
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        let key = Self::c_name(key);
        Self::with_nvs_handle(namespace, false, |handle| {
            Ok(unsafe { nvs_find_key(handle, key.as_ptr().cast(), core::ptr::null_mut()) } == ESP_OK)
        })
        .unwrap_or(false)
    }
}
