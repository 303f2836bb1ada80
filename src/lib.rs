//! InContext launcher
//!
//! Runs the InContext site generator inside a container image built from
//! a content-fingerprinted toolchain directory, mounting just the host
//! paths the command needs.

pub mod cli;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod image;
pub mod launcher;
pub mod mounts;
pub mod orchestration;
pub mod preflight;

pub use error::{LauncherError, LauncherResult};
pub use launcher::Launcher;
