//! HTTP surface: error classification, response writing and user routes.

pub mod error;
pub mod respond;
pub mod users;

pub use error::{Classification, Classify, ClassifiedError, HandlerError, classification_of, classify};
pub use respond::{ResponseWriter, fallible};
