//! Core machinery – tool probing, subprocess pipelines, the picker, and the
//! pure helpers behind archive extraction and bulk rename.
//!
//! Nothing in this module knows about the host file manager.

pub mod archive;
pub mod fs;
pub mod picker;
pub mod process;
pub mod rename;
pub mod selector;
pub mod tool;
