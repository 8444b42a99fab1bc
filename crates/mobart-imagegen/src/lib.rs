#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod error;
mod factory;
mod provider;

pub use error::{ImageGenError, Result};
pub use factory::build_provider;
pub use provider::{ImageGenProvider, augment_prompt, mock::MockImageGenProvider};
