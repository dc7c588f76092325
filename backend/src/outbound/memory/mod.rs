//! In-process repository adapters.
//!
//! State lives behind a `std::sync::Mutex` and is lost on restart. Each
//! adapter performs its check-then-write under a single lock acquisition, so
//! uniqueness holds under concurrent requests just as a database constraint
//! would.

mod account_repository;
mod record_repository;
mod token_repository;

pub use account_repository::InMemoryAccountRepository;
pub use record_repository::InMemoryRecordRepository;
pub use token_repository::InMemoryTokenRepository;

use std::sync::{Mutex, MutexGuard};

/// Lock `mutex`, reporting poisoning through `on_poison`.
fn lock<'a, T, E>(mutex: &'a Mutex<T>, on_poison: impl FnOnce(String) -> E) -> Result<MutexGuard<'a, T>, E> {
    mutex.lock().map_err(|err| on_poison(err.to_string()))
}
