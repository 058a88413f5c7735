//! Run-time loading of a shared library and its entry points.
//!
//! The Offline Registry Library is not present on every Windows installation
//! and never on other hosts, so it is resolved when the engine is created
//! rather than linked.

use std::ffi::CStr;
use std::os::raw::c_void;

/// A loaded shared library, released on drop.
pub struct Library {
    handle: *mut c_void,
}

impl Library {
    /// Loads a library by file name using the platform search order.
    pub fn open(name: &CStr) -> Result<Self, String> {
        #[cfg(windows)]
        {
            // SAFETY: name is a valid NUL-terminated string.
            let handle = unsafe { LoadLibraryA(name.as_ptr()) };
            if handle.is_null() {
                // SAFETY: no preconditions.
                let code = unsafe { GetLastError() };
                return Err(format!("could not load {name:?} (error {code})"));
            }
            Ok(Self { handle })
        }

        #[cfg(unix)]
        {
            // SAFETY: name is a valid NUL-terminated string.
            let handle = unsafe { libc::dlopen(name.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL) };
            if handle.is_null() {
                return Err(format!("could not load {name:?}: {}", last_dl_error()));
            }
            Ok(Self { handle })
        }

        #[cfg(not(any(unix, windows)))]
        {
            Err(format!(
                "could not load {name:?}: dynamic libraries are not supported on this platform"
            ))
        }
    }

    /// Resolves an exported symbol.
    ///
    /// # Safety
    ///
    /// The caller must transmute the pointer to the symbol's real signature
    /// and must not use it after this `Library` is dropped.
    pub unsafe fn symbol(&self, name: &CStr) -> Result<*mut c_void, String> {
        #[cfg(windows)]
        {
            let ptr = GetProcAddress(self.handle, name.as_ptr());
            if ptr.is_null() {
                return Err(format!("missing entry point {name:?}"));
            }
            Ok(ptr)
        }

        #[cfg(unix)]
        {
            libc::dlerror();
            let ptr = libc::dlsym(self.handle, name.as_ptr());
            if ptr.is_null() {
                return Err(format!("missing entry point {name:?}: {}", last_dl_error()));
            }
            Ok(ptr)
        }

        #[cfg(not(any(unix, windows)))]
        {
            Err(format!("missing entry point {name:?}"))
        }
    }
}

impl Drop for Library {
    fn drop(&mut self) {
        if self.handle.is_null() {
            return;
        }

        #[cfg(windows)]
        // SAFETY: handle came from LoadLibraryA and is released once.
        unsafe {
            FreeLibrary(self.handle);
        }

        #[cfg(unix)]
        // SAFETY: handle came from dlopen and is released once.
        unsafe {
            libc::dlclose(self.handle);
        }
    }
}

#[cfg(unix)]
fn last_dl_error() -> String {
    // SAFETY: dlerror returns either NULL or a NUL-terminated string owned by
    // the loader, which is copied before any further dl* call.
    unsafe {
        let err = libc::dlerror();
        if err.is_null() {
            "unknown error".to_string()
        } else {
            CStr::from_ptr(err).to_string_lossy().into_owned()
        }
    }
}

#[cfg(windows)]
extern "system" {
    fn LoadLibraryA(name: *const std::os::raw::c_char) -> *mut c_void;
    fn GetProcAddress(module: *mut c_void, name: *const std::os::raw::c_char) -> *mut c_void;
    fn FreeLibrary(module: *mut c_void) -> i32;
    fn GetLastError() -> u32;
}
