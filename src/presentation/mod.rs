//! Presentation Layer
//!
//! Console rendering of channel state for the command-line client.

pub mod console;
