//! Process exit codes returned by [`crate::run`].

/// Command finished, every hand verified.
pub const SUCCESS: i32 = 0;

/// Bad arguments, bad configuration, I/O failure or a record that failed
/// verification.
pub const ERROR: i32 = 2;

/// A simulation stopped before all matches were played (128 + SIGINT).
pub const INTERRUPTED: i32 = 130;
