//! `council` binary internals: command parsing, the shared boot path and
//! terminal rendering.

pub mod bootstrap;
pub mod cli;
pub mod render;
