#[cfg(target_os = "windows")]
mod windows_sys;

#[cfg(target_os = "windows")]
pub use windows_sys::*;

#[cfg(not(target_os = "windows"))]
mod unix_sys;

#[cfg(not(target_os = "windows"))]
pub use unix_sys::*;
