//! Engine backed by the Windows Offline Registry Library.
//!
//! `offreg.dll` ships with Windows Vista and newer (and with the WDK for
//! redistribution). Its entry points are resolved once in
//! [`OffregEngine::load`] and called through typed function pointers.
use super::dl::Library;
use super::{EngineError, HiveEngine, KeyOptions, OsVersion, ValueType};
use std::ffi::CStr;
use std::os::raw::c_void;
use std::path::Path;
use std::ptr;

const OFFREG_LIBRARY: &CStr = c"offreg.dll";

const ERROR_SUCCESS: u32 = 0;
const ERROR_INVALID_PARAMETER: u32 = 87;

const REG_CREATED_NEW_KEY: u32 = 1;

type OrHkey = *mut c_void;

type FnOrCreateHive = unsafe extern "system" fn(result: *mut OrHkey) -> u32;
type FnOrCreateKey = unsafe extern "system" fn(
    handle: OrHkey,
    sub_key: *const u16,
    class: *mut u16,
    options: u32,
    security_descriptor: *mut c_void,
    result: *mut OrHkey,
    disposition: *mut u32,
) -> u32;
type FnOrSetValue = unsafe extern "system" fn(
    handle: OrHkey,
    value_name: *const u16,
    value_type: u32,
    data: *const u8,
    data_size: u32,
) -> u32;
type FnOrCloseKey = unsafe extern "system" fn(handle: OrHkey) -> u32;
type FnOrSaveHive = unsafe extern "system" fn(
    handle: OrHkey,
    hive_path: *const u16,
    os_major_version: u32,
    os_minor_version: u32,
) -> u32;

/// Open `ORHKEY` of the Offline Registry Library.
#[derive(Debug)]
pub struct OffregKey(OrHkey);

pub struct OffregEngine {
    create_hive: FnOrCreateHive,
    create_key: FnOrCreateKey,
    set_value: FnOrSetValue,
    close_key: FnOrCloseKey,
    save_hive: FnOrSaveHive,
    // Keeps the function pointers above valid.
    _library: Library,
}

impl OffregEngine {
    /// Loads `offreg.dll` and resolves every entry point the writer needs.
    pub fn load() -> Result<Self, EngineError> {
        let library = Library::open(OFFREG_LIBRARY).map_err(EngineError::Unavailable)?;

        // SAFETY: each name is paired with the signature documented for that
        // export in offreg.h.
        unsafe {
            Ok(Self {
                create_hive: entry_point::<FnOrCreateHive>(&library, c"ORCreateHive")?,
                create_key: entry_point::<FnOrCreateKey>(&library, c"ORCreateKey")?,
                set_value: entry_point::<FnOrSetValue>(&library, c"ORSetValue")?,
                close_key: entry_point::<FnOrCloseKey>(&library, c"ORCloseKey")?,
                save_hive: entry_point::<FnOrSaveHive>(&library, c"ORSaveHive")?,
                _library: library,
            })
        }
    }
}

unsafe fn entry_point<F: Copy>(library: &Library, name: &CStr) -> Result<F, EngineError> {
    let ptr = library.symbol(name).map_err(EngineError::Unavailable)?;
    Ok(std::mem::transmute_copy::<*mut c_void, F>(&ptr))
}

fn check(op: &'static str, code: u32) -> Result<(), EngineError> {
    if code == ERROR_SUCCESS {
        Ok(())
    } else {
        Err(EngineError::Call { op, code })
    }
}

/// NUL-terminated UTF-16 copy of a key or value name.
fn wide_name(name: &str) -> Result<Vec<u16>, EngineError> {
    if name.contains('\0') {
        return Err(EngineError::InvalidName(name.to_string()));
    }
    Ok(name.encode_utf16().chain(std::iter::once(0)).collect())
}

fn wide_path(path: &Path) -> Result<Vec<u16>, EngineError> {
    #[cfg(windows)]
    let units: Vec<u16> = {
        use std::os::windows::ffi::OsStrExt;
        path.as_os_str().encode_wide().collect()
    };
    #[cfg(not(windows))]
    let units: Vec<u16> = path.to_string_lossy().encode_utf16().collect();

    if units.contains(&0) {
        return Err(EngineError::InvalidName(path.display().to_string()));
    }
    Ok(units.into_iter().chain(std::iter::once(0)).collect())
}

impl HiveEngine for OffregEngine {
    type Handle = OffregKey;

    fn name(&self) -> &'static str {
        "offreg"
    }

    fn create_hive(&self) -> Result<OffregKey, EngineError> {
        let mut handle: OrHkey = ptr::null_mut();
        // SAFETY: handle is a valid out pointer.
        let code = unsafe { (self.create_hive)(&mut handle) };
        check("ORCreateHive", code)?;
        Ok(OffregKey(handle))
    }

    fn create_key(
        &self,
        parent: &OffregKey,
        name: &str,
        options: KeyOptions,
    ) -> Result<OffregKey, EngineError> {
        let wide = wide_name(name)?;
        let mut handle: OrHkey = ptr::null_mut();
        let mut disposition = 0u32;
        // SAFETY: parent is an open ORHKEY, wide is NUL-terminated and the
        // out pointers are valid for the duration of the call.
        let code = unsafe {
            (self.create_key)(
                parent.0,
                wide.as_ptr(),
                ptr::null_mut(),
                options.flags,
                ptr::null_mut(),
                &mut handle,
                &mut disposition,
            )
        };
        check("ORCreateKey", code)?;
        tracing::trace!(
            name,
            created = disposition == REG_CREATED_NEW_KEY,
            "ORCreateKey"
        );
        Ok(OffregKey(handle))
    }

    fn set_value(
        &self,
        key: &OffregKey,
        name: &str,
        value_type: ValueType,
        data: &[u8],
    ) -> Result<(), EngineError> {
        let wide = wide_name(name)?;
        let size = u32::try_from(data.len()).map_err(|_| EngineError::Call {
            op: "ORSetValue",
            code: ERROR_INVALID_PARAMETER,
        })?;
        // SAFETY: key is an open ORHKEY and data is valid for size bytes.
        let code =
            unsafe { (self.set_value)(key.0, wide.as_ptr(), value_type.tag(), data.as_ptr(), size) };
        check("ORSetValue", code)
    }

    fn close_key(&self, handle: OffregKey) -> Result<(), EngineError> {
        // SAFETY: handle is open and consumed here, so it is closed once.
        let code = unsafe { (self.close_key)(handle.0) };
        check("ORCloseKey", code)
    }

    fn save_hive(
        &self,
        root: &OffregKey,
        path: &Path,
        version: OsVersion,
    ) -> Result<(), EngineError> {
        let wide = wide_path(path)?;
        // SAFETY: root is the open hive handle and wide is NUL-terminated.
        let code = unsafe { (self.save_hive)(root.0, wide.as_ptr(), version.major, version.minor) };
        if code != ERROR_SUCCESS {
            return Err(EngineError::Persist { code });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_name_is_nul_terminated_utf16() {
        let wide = wide_name("\u{e4}\u{10410}").expect("encode");
        assert_eq!(wide, [0x00e4, 0xd801, 0xdc10, 0]);
    }

    #[test]
    fn wide_name_rejects_interior_nul() {
        assert!(matches!(
            wide_name("a\0b"),
            Err(EngineError::InvalidName(_))
        ));
    }

    #[test]
    fn wide_path_is_nul_terminated() {
        let wide = wide_path(Path::new("testhive")).expect("encode");
        assert_eq!(wide.last(), Some(&0));
        assert_eq!(wide.len(), "testhive".len() + 1);
    }

    #[cfg(not(windows))]
    #[test]
    fn load_reports_unavailable_off_windows() {
        match OffregEngine::load() {
            Err(EngineError::Unavailable(reason)) => assert!(reason.contains("offreg.dll")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("offreg.dll unexpectedly loaded"),
        }
    }
}
