use std::time::Duration;

/// RPC method name the host exposes for bridged fetches.
pub const FETCH_METHOD: &str = "znFetch";

/// Protocol version sent with every bridged fetch.
pub const FETCH_API_VERSION: &str = "1";

/// Delay between abort-signal checks while a fetch is in flight.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long the abort watcher waits before yielding once it sees the fetch
/// has completed. It must lose any race against the real result.
pub const COMPLETION_GRACE: Duration = Duration::from_millis(10);

/// Tuning for [`zn_fetch`](crate::zn_fetch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub api_version: String,
    pub poll_interval: Duration,
    pub completion_grace: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            api_version: FETCH_API_VERSION.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            completion_grace: COMPLETION_GRACE,
        }
    }
}
