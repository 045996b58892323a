//! Durable key-value slots holding JSON text.

use std::cell::RefCell;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use dotenv::dotenv;
use tracing::debug;

use crate::error::Result;

pub const DATA_DIR_VAR: &str = "DESIGNBOARD_DATA_DIR";
static DEFAULT_DATA_DIR: &str = ".designboard";

/// A named text slot store, the stand-in for browser local storage.
pub trait Slots {
    /// Raw slot text, or `None` when the slot was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the slot text. Returns once the value is durable.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// One `<key>.json` file per slot under a data directory.
#[derive(Debug, Clone)]
pub struct FileSlots {
    dir: PathBuf,
}

impl FileSlots {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        FileSlots { dir: dir.into() }
    }

    /// Reads the data directory from the environment (after loading `.env`).
    pub fn from_env() -> Self {
        dotenv().ok();
        let dir = env::var(DATA_DIR_VAR).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        FileSlots::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Slots for FileSlots {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.slot_path(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));

        // Rename over the old slot so readers never see a partial write.
        fs::write(&tmp, value)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        debug!(slot = key, bytes = value.len(), "slot written");
        Ok(())
    }
}

/// In-memory slots. Clones share the same backing map, like two views of
/// one browser's storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySlots {
    inner: Rc<RefCell<HashMap<String, String>>>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Slots for MemorySlots {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.inner
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::distributions::Alphanumeric;
    use rand::{thread_rng, Rng};

    pub fn random_name() -> String {
        thread_rng()
            .sample_iter(&Alphanumeric)
            .take(10)
            .map(char::from)
            .collect()
    }

    /// Reads from the wrapped slots, refuses every write.
    #[derive(Debug, Clone, Default)]
    pub struct FailingSlots(pub MemorySlots);

    impl Slots for FailingSlots {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(std::io::Error::new(ErrorKind::PermissionDenied, "read-only storage").into())
        }
    }

    pub fn temp_slots() -> FileSlots {
        FileSlots::new(env::temp_dir().join(format!("designboard_{}_test", random_name())))
    }

    #[test]
    fn test_missing_slot_is_none() -> anyhow::Result<()> {
        let slots = temp_slots();
        assert_eq!(slots.get("design-work-entries")?, None);
        Ok(())
    }

    #[test]
    fn test_file_slot_write_and_read() -> anyhow::Result<()> {
        let mut slots = temp_slots();
        slots.set("companies", "[]")?;
        slots.set("companies", r#"[{"value":"tata","label":"Tata"}]"#)?;

        let reopened = FileSlots::new(slots.dir());
        assert_eq!(
            reopened.get("companies")?.as_deref(),
            Some(r#"[{"value":"tata","label":"Tata"}]"#)
        );
        assert!(!slots.dir().join(".companies.json.tmp").exists());

        fs::remove_dir_all(slots.dir())?;
        Ok(())
    }

    #[test]
    fn test_memory_slot_clones_share_state() -> anyhow::Result<()> {
        let mut slots = MemorySlots::new();
        let other = slots.clone();
        slots.set("k", "v")?;
        assert_eq!(other.get("k")?.as_deref(), Some("v"));
        Ok(())
    }

    #[test]
    fn test_failing_slot_reports_storage_error() {
        let mut slots = FailingSlots::default();
        match slots.set("k", "v") {
            Err(crate::error::DashError::Storage(e)) => {
                assert_eq!(e.kind(), ErrorKind::PermissionDenied)
            }
            other => panic!("expected Storage error, got {:?}", other),
        }
        assert!(matches!(slots.get("k"), Ok(None)));
    }
}
