//! Crawl state tracking
//!
//! Page tasks and per-card extraction attempts, both modeled as explicit
//! forward-only state machines.

mod card_attempt;
mod page_task;

pub use card_attempt::{CardAttempt, CardState};
pub use page_task::{PageStatus, PageTask};
