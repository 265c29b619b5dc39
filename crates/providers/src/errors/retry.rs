/// Classification for retry policy.
///
/// Used by the fetch primitive to decide how to respond to a failed attempt.
///
/// # Behavior Summary
///
/// | Class | Retry? | Wait before next attempt |
/// |-------|--------|--------------------------|
/// | `Never` | No | - |
/// | `Backoff` | Yes | `retry_delay * attempt` |
/// | `AfterDelay` | Yes | `retry_delay` |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - a definitive answer from the upstream or a bad request.
    Never,

    /// Rate limited (HTTP 429). Wait a growing delay and try again.
    ///
    /// This is "try again", not a failure: it only becomes one once every
    /// attempt has been rate limited.
    Backoff,

    /// Transient transport failure (timeout, connection error, garbled body).
    /// Wait a fixed delay and try again.
    AfterDelay,
}
