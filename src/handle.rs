//! Scoped key handles.
//!
//! An [`OpenKey`] owns one engine handle and closes it exactly once: through
//! [`OpenKey::close`] on the normal path, or on drop when an error unwinds the
//! builder. Subkeys borrow the key they were created under, so the borrow
//! checker rejects closing a parent while one of its children is still open.
use crate::engine::{HiveEngine, KeyOptions, ValueType};
use anyhow::{anyhow, Context, Result};

pub struct OpenKey<'a, E: HiveEngine> {
    engine: &'a E,
    handle: Option<E::Handle>,
    path: String,
}

impl<'a, E: HiveEngine> OpenKey<'a, E> {
    /// Creates a new hive and returns its root key.
    pub fn create_hive(engine: &'a E) -> Result<Self> {
        let handle = engine.create_hive().context("create hive")?;
        Ok(Self {
            engine,
            handle: Some(handle),
            path: String::new(),
        })
    }

    pub(crate) fn handle(&self) -> Result<&E::Handle> {
        self.handle
            .as_ref()
            .ok_or_else(|| anyhow!("key {:?} already closed", self.path))
    }

    /// Creates (or opens, if it already exists) a non-volatile subkey.
    pub fn create_subkey(&self, name: &str) -> Result<OpenKey<'_, E>> {
        let path = if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}\\{name}", self.path)
        };
        let handle = self
            .engine
            .create_key(self.handle()?, name, KeyOptions::non_volatile())
            .with_context(|| format!("create key {path:?}"))?;
        tracing::debug!(key = %path, "created key");
        Ok(OpenKey {
            engine: self.engine,
            handle: Some(handle),
            path,
        })
    }

    /// Creates a subkey and closes it again right away.
    pub fn touch_subkey(&self, name: &str) -> Result<()> {
        self.create_subkey(name)?.close()
    }

    pub fn set_value(&self, name: &str, value_type: ValueType, data: &[u8]) -> Result<()> {
        self.engine
            .set_value(self.handle()?, name, value_type, data)
            .with_context(|| format!("set value {name:?} on key {:?}", self.path))?;
        tracing::debug!(
            key = %self.path,
            value = name,
            ty = ?value_type,
            len = data.len(),
            "set value"
        );
        Ok(())
    }

    /// Closes the handle and reports a failing close.
    pub fn close(mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => self
                .engine
                .close_key(handle)
                .with_context(|| format!("close key {:?}", self.path)),
            None => Ok(()),
        }
    }
}

impl<E: HiveEngine> Drop for OpenKey<'_, E> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(err) = self.engine.close_key(handle) {
                tracing::warn!(key = %self.path, error = %err, "failed to close key");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{MemoryHive, OsVersion};

    #[test]
    fn nested_keys_close_innermost_first() {
        let engine = MemoryHive::new();
        let root = OpenKey::create_hive(&engine).expect("create hive");
        {
            let outer = root.create_subkey("outer").expect("create outer");
            let inner = outer.create_subkey("inner").expect("create inner");
            inner.close().expect("close inner");
            outer.close().expect("close outer");
        }
        root.close().expect("close root");

        assert_eq!(engine.open_handles(), 0);
        assert_eq!(engine.close_log(), ["outer\\inner", "outer", ""]);
    }

    #[test]
    fn dropped_keys_are_closed() {
        let engine = MemoryHive::new();
        let root = OpenKey::create_hive(&engine).expect("create hive");
        {
            let outer = root.create_subkey("outer").expect("create outer");
            let _inner = outer.create_subkey("inner").expect("create inner");
            assert_eq!(engine.open_handles(), 3);
        }
        assert_eq!(engine.open_handles(), 1);
        assert_eq!(engine.close_log(), ["outer\\inner", "outer"]);
        drop(root);
        assert_eq!(engine.open_handles(), 0);
    }

    #[test]
    fn set_value_error_names_key_and_value() {
        let engine = MemoryHive::new();
        let root = OpenKey::create_hive(&engine).expect("create hive");
        let key = root.create_subkey("data").expect("create key");
        let err = key
            .set_value("bad\0name", ValueType::RegBinary, &[])
            .expect_err("nul in value name");
        let message = format!("{err:#}");
        assert!(message.contains("\"data\""), "{message}");
        assert!(message.contains("NUL"), "{message}");
    }

    #[test]
    fn touch_subkey_leaves_no_handle_open() {
        let engine = MemoryHive::new();
        let root = OpenKey::create_hive(&engine).expect("create hive");
        root.touch_subkey("leaf").expect("touch");
        assert_eq!(engine.open_handles(), 1);

        let snapshot = engine
            .snapshot(root.handle().expect("root handle"), OsVersion::default())
            .expect("snapshot");
        assert!(snapshot.root.subkey("LEAF").is_some());
    }
}
