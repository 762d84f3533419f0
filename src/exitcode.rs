//! Process exit codes

/// Success, or the user declined gracefully
pub const OK: i32 = 0;

/// Fatal validation, build or publish failure
pub const FAILURE: i32 = 1;

/// Command line usage error (clap's own status)
pub const USAGE: i32 = 2;
