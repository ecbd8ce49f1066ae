//! # tiny-rts
//!
//! Game entry point for Tiny RTS. The binary opens a 320×200 window at
//! 3× scale and drives the tiny-core frame loop; this library half holds
//! the pieces the binary is configured with.

pub mod config;
