//! Shell integration.
//!
//! The binary talks to the calling shell through **stdout**: every host
//! effect (cd, select, edit, run) is a prefixed payload line that the shell
//! wrapper applies once the binary exits.  The selector and editor draw on the
//! terminal through the tty and stderr, and log output goes to stderr, so
//! stdout carries nothing else.

pub mod integration;
