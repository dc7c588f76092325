//! Request-scoped trace identifier.
//!
//! The identifier lives in task-local storage so errors and log events can
//! pick it up without threading it through every call. Task locals do not
//! follow work onto other tasks or blocking threads; use
//! [`TraceId::spawn_blocking`] for CPU-bound work such as password hashing.

use std::future::Future;

use tokio::task::JoinError;
use tokio::task_local;
use uuid::Uuid;

task_local! {
    static TRACE_ID: TraceId;
}

thread_local! {
    static BLOCKING_TRACE_ID: std::cell::Cell<Option<TraceId>> = const { std::cell::Cell::new(None) };
}

/// Per-request correlation identifier.
///
/// # Examples
/// ```
/// use recipe_backend::domain::TraceId;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let trace_id: TraceId = "00000000-0000-0000-0000-000000000000"
///     .parse()
///     .expect("valid UUID");
/// let observed = TraceId::scope(trace_id, async move { TraceId::current() }).await;
/// assert_eq!(observed, Some(trace_id));
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Generate a new random trace identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the identifier in scope for this task or blocking closure.
    #[must_use]
    pub fn current() -> Option<Self> {
        TRACE_ID
            .try_with(|id| *id)
            .ok()
            .or_else(|| BLOCKING_TRACE_ID.with(std::cell::Cell::get))
    }

    /// Access the inner UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Run `fut` with `trace_id` in scope.
    pub async fn scope<Fut>(trace_id: TraceId, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        TRACE_ID.scope(trace_id, fut).await
    }

    /// Run `work` on the blocking pool, carrying the current identifier along.
    ///
    /// # Errors
    /// Returns the [`JoinError`] when the closure panics or is cancelled.
    pub async fn spawn_blocking<F, T>(work: F) -> Result<T, JoinError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let trace_id = Self::current();
        tokio::task::spawn_blocking(move || {
            BLOCKING_TRACE_ID.with(|slot| slot.set(trace_id));
            let output = work();
            BLOCKING_TRACE_ID.with(|slot| slot.set(None));
            output
        })
        .await
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}
