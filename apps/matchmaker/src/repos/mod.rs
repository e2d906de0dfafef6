//! Repository functions for the domain layer.
//!
//! Every function runs on a caller-supplied connection or transaction and
//! never opens a transaction of its own.

pub mod games;
pub mod players;
