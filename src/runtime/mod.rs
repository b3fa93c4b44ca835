//! Runtime-side services exposed to running scripts.
//!
//! These are internal bindings a script calls directly (not protocol
//! domains): path resolution and the synchronous `fs` helpers.

#[cfg(unix)]
pub mod fs;
pub mod path;
