//! Test support utilities shared by the matchmaker's unit and integration tests.

pub mod logging;
