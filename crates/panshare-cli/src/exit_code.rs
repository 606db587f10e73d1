//! Process exit codes.
//!
//! Scripts can tell a missing path from a remote outage without parsing
//! stderr.

/// Success.
pub const SUCCESS: u8 = 0;

/// Any failure not covered below.
pub const GENERAL_ERROR: u8 = 1;

/// Bad arguments or missing credentials.
pub const USAGE: u8 = 2;

/// The path does not exist in the namespace.
pub const NOT_FOUND: u8 = 3;

/// Login was rejected or the token is no longer valid.
pub const AUTH_FAILED: u8 = 4;

/// The remote could not be reached or answered with an error.
pub const REMOTE_UNAVAILABLE: u8 = 5;

/// Interrupted by the user.
pub const CANCELLED: u8 = 130;
