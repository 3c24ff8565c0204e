//! Process exit codes.
//!
//! Library failures map through `CryptoError::exit_code`; the constants here
//! cover outcomes that are not errors.

pub const SUCCESS: i32 = 0;
pub const USAGE_ERROR: i32 = 1; // Unreadable input file, bad metadata
pub const SIGNATURE_INVALID: i32 = 4; // Well-formed signature that does not match
