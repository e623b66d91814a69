//! Data models.
//!
//! Public surface:
//! - AppError, ErrorCode, Sentinel: error values and their classification codes.
//! - User and its request payloads.

pub mod error;
pub mod user;
pub use self::error::{AppError, ErrorCode, Sentinel};
pub use self::user::{CreateUser, PatchUser, UpdateUser, User};
