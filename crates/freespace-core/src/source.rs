//! Directory metadata sources
//!
//! [`DirectorySource`] is the seam between the traversal and the OS:
//! open a directory strictly for metadata access, then pull batches of
//! packed records out of it until exhaustion. The one native
//! implementation, [`WindowsSource`], drives
//! `GetFileInformationByHandleEx(FileIdExtdDirectoryInfo)`; the record
//! layout it returns is decoded by [`crate::record`]. Other sources can
//! implement the same traits with their own record supply.
//!
//! Errors at this level are raw OS codes; the traversal wraps them into
//! [`crate::DirError`] values for reporting.

/// Batch buffer length handed to the source per query, in bytes.
///
/// Directories with more entries than fit are read across multiple
/// queries; enumeration state lives in the handle.
pub const BATCH_BUFFER_LEN: usize = 16 * 1024;

/// Opens directories for metadata-only enumeration.
pub trait DirectorySource {
    type Handle: DirectoryHandle;

    /// Opens `path` for metadata read. Must tolerate the directory being
    /// open elsewhere for read, write, or delete, and must not require
    /// data-content access rights. `Err` carries the OS error code.
    fn open(&self, path: &str) -> Result<Self::Handle, i32>;
}

/// One opened directory; yields packed record batches.
pub trait DirectoryHandle {
    /// Fills `buf` with the next batch of packed records.
    ///
    /// Returns `Ok(true)` when `buf` holds at least one record,
    /// `Ok(false)` when the directory is exhausted, and `Err(code)` on
    /// any other failure. Call repeatedly until exhaustion.
    fn read_batch(&mut self, buf: &mut [u8]) -> Result<bool, i32>;
}

#[cfg(windows)]
pub use windows::WindowsSource;

#[cfg(windows)]
mod windows {
    use super::{DirectoryHandle, DirectorySource};

    use windows_sys::Win32::Foundation::{
        CloseHandle, GetLastError, ERROR_NO_MORE_FILES, GENERIC_READ, HANDLE,
        INVALID_HANDLE_VALUE,
    };
    use windows_sys::Win32::Storage::FileSystem::{
        CreateFileW, GetFileInformationByHandleEx, FileIdExtdDirectoryInfo,
        FILE_FLAG_BACKUP_SEMANTICS, FILE_SHARE_DELETE, FILE_SHARE_READ, FILE_SHARE_WRITE,
        OPEN_EXISTING,
    };

    /// Extended-length path prefix; lifts the MAX_PATH limit.
    const WIN32_PREFIX: &str = r"\\?\";

    /// The native Windows metadata source.
    pub struct WindowsSource;

    pub struct WindowsDirHandle {
        handle: HANDLE,
    }

    // The handle is used from one thread at a time; Win32 file handles
    // are safe to move across threads.
    unsafe impl Send for WindowsDirHandle {}

    impl DirectorySource for WindowsSource {
        type Handle = WindowsDirHandle;

        fn open(&self, path: &str) -> Result<WindowsDirHandle, i32> {
            let wide: Vec<u16> = WIN32_PREFIX
                .encode_utf16()
                .chain(path.encode_utf16())
                .chain(std::iter::once(0))
                .collect();

            // FILE_FLAG_BACKUP_SEMANTICS is required to open a directory;
            // full share mode tolerates concurrent readers and deleters.
            let handle = unsafe {
                CreateFileW(
                    wide.as_ptr(),
                    GENERIC_READ,
                    FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE,
                    std::ptr::null(),
                    OPEN_EXISTING,
                    FILE_FLAG_BACKUP_SEMANTICS,
                    std::ptr::null_mut(),
                )
            };

            if handle == INVALID_HANDLE_VALUE {
                return Err(unsafe { GetLastError() } as i32);
            }
            Ok(WindowsDirHandle { handle })
        }
    }

    impl DirectoryHandle for WindowsDirHandle {
        fn read_batch(&mut self, buf: &mut [u8]) -> Result<bool, i32> {
            let ok = unsafe {
                GetFileInformationByHandleEx(
                    self.handle,
                    FileIdExtdDirectoryInfo,
                    buf.as_mut_ptr().cast(),
                    buf.len() as u32,
                )
            };
            if ok != 0 {
                return Ok(true);
            }
            match unsafe { GetLastError() } {
                ERROR_NO_MORE_FILES => Ok(false),
                code => Err(code as i32),
            }
        }
    }

    impl Drop for WindowsDirHandle {
        fn drop(&mut self) {
            unsafe {
                CloseHandle(self.handle);
            }
        }
    }
}
