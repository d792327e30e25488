//! User registry against the storage adapter.

use carguard::adapters::nvs::NvsStorage;
use carguard::app::ports::{StorageError, StoragePort};
use carguard::registry::{MAX_USERS, RegistryError, UserRecord, UserRegistry};

fn record(rfid: &str, username: &str) -> UserRecord {
    UserRecord {
        rfid: rfid.into(),
        username: username.into(),
        password: "hunter2".into(),
        phone: "+65 9000 0000".into(),
        name: "Test Owner".into(),
        lock_password: "0000".into(),
    }
}

/// Storage that refuses every write.
struct ReadOnlyStorage(NvsStorage);

impl StoragePort for ReadOnlyStorage {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        self.0.read(namespace, key, buf)
    }

    fn write(&mut self, _namespace: &str, _key: &str, _data: &[u8]) -> Result<(), StorageError> {
        Err(StorageError::IoError)
    }

    fn delete(&mut self, _namespace: &str, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::IoError)
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.0.exists(namespace, key)
    }
}

#[test]
fn enrol_up_to_limit_and_persist() {
    let mut reg = UserRegistry::open(NvsStorage::new().unwrap()).unwrap();
    assert!(reg.is_empty());
    for i in 0..MAX_USERS {
        reg.add(record(&format!("{}", 900 + i), &format!("user{i}"))).unwrap();
    }
    assert_eq!(reg.add(record("999", "extra")), Err(RegistryError::Full));

    let storage = reg.into_storage();
    assert!(storage.exists("users", "table"));
    let reg = UserRegistry::open(storage).unwrap();
    assert_eq!(reg.len(), MAX_USERS);
    assert_eq!(reg.get_field("user1", "RFID"), Ok("901"));
    assert_eq!(reg.get_field("user2", "LockPassword"), Ok("0000"));
}

#[test]
fn delete_frees_a_slot() {
    let mut reg = UserRegistry::open(NvsStorage::new().unwrap()).unwrap();
    for (rfid, name) in [("1", "a"), ("2", "b"), ("3", "c")] {
        reg.add(record(rfid, name)).unwrap();
    }
    reg.delete("b").unwrap();
    reg.add(record("4", "d")).unwrap();
    let names: Vec<&str> = reg.users().iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, ["a", "c", "d"]);
}

#[test]
fn failed_write_leaves_table_unchanged() {
    let mut seeded = UserRegistry::open(NvsStorage::new().unwrap()).unwrap();
    seeded.add(record("1", "a")).unwrap();

    let mut reg = UserRegistry::open(ReadOnlyStorage(seeded.into_storage())).unwrap();
    assert_eq!(reg.add(record("2", "b")), Err(RegistryError::Storage(StorageError::IoError)));
    assert_eq!(
        reg.update_field("a", "Name", "Someone"),
        Err(RegistryError::Storage(StorageError::IoError))
    );
    assert_eq!(reg.len(), 1);
    assert_eq!(reg.get_field("a", "Name"), Ok("Test Owner"));
}
