#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod outcome;
mod request;

pub use error::{RequestError, Result};
pub use outcome::{GenerationOutcome, OutcomeStatus};
pub use request::{GenerationRequest, RawRequest, storage_key};
