#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod channel;
mod health;
mod listener;
mod pipeline;
#[cfg(test)]
mod testing;
mod worker;

pub use channel::RedisChannel;
pub use health::run_health_checks;
pub use listener::listen;
pub use pipeline::{GENERATION_FAILED, Pipeline, STORAGE_FAILED, Timeouts};
pub use worker::Worker;
