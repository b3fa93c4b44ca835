//! FsBinding - synchronous file helpers exposed to running scripts.
//!
//! Mirrors the internal `fs` binding table: `open`, `close` and `fstat`,
//! each taking loosely typed script arguments (`serde_json::Value`, with
//! `null` standing in for `undefined`). Only the synchronous form of each
//! call is supported, so the trailing request/context arguments are counted
//! but otherwise ignored.

use std::ffi::CString;
use std::io;
use std::mem::MaybeUninit;
use std::os::raw::{c_int, c_uint};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::runtime::path::canonicalize_path;

/// Binding functions and the argument count each expects.
pub const FS_FUNCTIONS: &[(&str, usize)] = &[("open", 5), ("close", 3), ("fstat", 4)];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsBindingError {
    #[error("Not enough arguments being passed into synchronous {call} call.")]
    NotEnoughArguments {
        call: &'static str,
        expected: usize,
        received: usize,
    },
    #[error("Incorrectly typed objects passed into synchronous {call} call.")]
    IncorrectlyTyped { call: &'static str },
    #[error("{operation} failed on {target} with errno {errno}: {description}")]
    Os {
        operation: &'static str,
        target: String,
        errno: i32,
        description: String,
    },
    #[error("Unknown fs binding function: {name}")]
    UnknownFunction { name: String },
}

impl FsBindingError {
    /// OS errno for `Os` failures.
    pub fn errno(&self) -> Option<i32> {
        match self {
            FsBindingError::Os { errno, .. } => Some(*errno),
            _ => None,
        }
    }
}

fn os_error(operation: &'static str, target: String, err: io::Error) -> FsBindingError {
    let errno = err.raw_os_error().unwrap_or(0);
    FsBindingError::Os {
        operation,
        target,
        errno,
        description: err.to_string(),
    }
}

/// Result of `fstat`. Time fields are intentionally absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileStat {
    pub dev: u64,
    pub mode: u32,
    pub nlink: u64,
    pub uid: u32,
    pub gid: u32,
    pub rdev: u64,
    pub blksize: u64,
    pub ino: u64,
    pub size: u64,
    pub blocks: u64,
}

impl From<FileStat> for Value {
    fn from(stat: FileStat) -> Self {
        serde_json::json!({
            "dev": stat.dev,
            "mode": stat.mode,
            "nlink": stat.nlink,
            "uid": stat.uid,
            "gid": stat.gid,
            "rdev": stat.rdev,
            "blksize": stat.blksize,
            "ino": stat.ino,
            "size": stat.size,
            "blocks": stat.blocks,
        })
    }
}

/// File helpers scoped to the directory of the calling script.
#[derive(Debug, Clone)]
pub struct FsBinding {
    dirname: String,
}

impl FsBinding {
    /// Create a binding resolving relative paths against `dirname`.
    pub fn new(dirname: impl Into<String>) -> Self {
        Self {
            dirname: dirname.into(),
        }
    }

    pub fn dirname(&self) -> &str {
        &self.dirname
    }

    /// Invoke a binding function by name, as a script would.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, FsBindingError> {
        match name {
            "open" => self.open(args).map(Value::from),
            "close" => self.close(args).map(|()| Value::Null),
            "fstat" => self.fstat(args).map(Value::from),
            _ => Err(FsBindingError::UnknownFunction {
                name: name.to_string(),
            }),
        }
    }

    /// `open(path, flags, mode, req, ctx)` → file descriptor.
    pub fn open(&self, args: &[Value]) -> Result<i32, FsBindingError> {
        const CALL: &str = "open";
        expect_args(CALL, args, 5)?;

        let (Some(path), Some(flags), Some(mode)) =
            (args[0].as_str(), as_c_int(&args[1]), as_c_uint(&args[2]))
        else {
            return Err(FsBindingError::IncorrectlyTyped { call: CALL });
        };

        let full_path = canonicalize_path(&self.dirname, path);
        let target = format!("file '{path}'");
        let c_path = CString::new(full_path.as_str()).map_err(|_| {
            os_error("OpenSync", target.clone(), io::Error::from_raw_os_error(libc::EINVAL))
        })?;

        // SAFETY: `c_path` is a valid NUL-terminated string for the duration of the call.
        let fd = unsafe { libc::open(c_path.as_ptr(), flags, mode) };
        if fd < 0 {
            let err = os_error("OpenSync", target, io::Error::last_os_error());
            log::debug!("fs.open failed: path={full_path}, {err}");
            return Err(err);
        }

        log::debug!("fs.open: path={full_path}, fd={fd}");
        Ok(fd)
    }

    /// `close(fd, req, ctx)`.
    pub fn close(&self, args: &[Value]) -> Result<(), FsBindingError> {
        const CALL: &str = "close";
        expect_args(CALL, args, 3)?;

        let fd = as_c_int(&args[0]).ok_or(FsBindingError::IncorrectlyTyped { call: CALL })?;

        // SAFETY: closing an arbitrary descriptor is memory safe; a bad fd yields EBADF.
        let res = unsafe { libc::close(fd) };
        if res < 0 {
            return Err(os_error("Close", format!("fd {fd}"), io::Error::last_os_error()));
        }

        log::debug!("fs.close: fd={fd}");
        Ok(())
    }

    /// `fstat(fd, use_bigint, req, ctx)` → stat object.
    #[allow(clippy::unnecessary_cast)]
    pub fn fstat(&self, args: &[Value]) -> Result<FileStat, FsBindingError> {
        const CALL: &str = "fstat";
        expect_args(CALL, args, 4)?;

        let fd = as_c_int(&args[0]).ok_or(FsBindingError::IncorrectlyTyped { call: CALL })?;

        let mut buf = MaybeUninit::<libc::stat>::uninit();
        // SAFETY: `buf` points to writable memory large enough for `struct stat`.
        let res = unsafe { libc::fstat(fd, buf.as_mut_ptr()) };
        if res < 0 {
            return Err(os_error("Fstat", format!("fd {fd}"), io::Error::last_os_error()));
        }
        // SAFETY: fstat succeeded, so the kernel filled in `buf`.
        let st = unsafe { buf.assume_init() };

        Ok(FileStat {
            dev: st.st_dev as u64,
            mode: st.st_mode as u32,
            nlink: st.st_nlink as u64,
            uid: st.st_uid as u32,
            gid: st.st_gid as u32,
            rdev: st.st_rdev as u64,
            blksize: st.st_blksize as u64,
            ino: st.st_ino as u64,
            size: st.st_size as u64,
            blocks: st.st_blocks as u64,
        })
    }
}

fn expect_args(call: &'static str, args: &[Value], expected: usize) -> Result<(), FsBindingError> {
    if args.len() < expected {
        return Err(FsBindingError::NotEnoughArguments {
            call,
            expected,
            received: args.len(),
        });
    }
    Ok(())
}

/// Script numbers arrive as JSON numbers, integral or not; fractions are
/// truncated toward zero. Anything else is a type error.
fn as_int(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|number| number as i64))
}

/// Descriptors and flags must fit a C `int`; out-of-range values are rejected.
fn as_c_int(value: &Value) -> Option<c_int> {
    as_int(value).and_then(|number| c_int::try_from(number).ok())
}

fn as_c_uint(value: &Value) -> Option<c_uint> {
    as_int(value).and_then(|number| c_uint::try_from(number).ok())
}
