//! Optional per-operation I/O deadlines.
//!
//! Neither side has a deadline unless `io_timeout_ms` is configured.  When it
//! is, each connect / read / write is wrapped in `tokio::time::timeout`, and
//! expiry surfaces as an `io::Error` of kind [`io::ErrorKind::TimedOut`] so
//! callers map it through their usual `From<io::Error>` impls.

use std::future::Future;
use std::io;
use std::time::Duration;

/// Await `fut`, failing with `TimedOut` if `limit` elapses first.
pub async fn deadline<T, F>(limit: Option<Duration>, fut: F) -> io::Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    match limit {
        None => fut.await,
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(res) => res,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("no progress within {limit:?}"),
            )),
        },
    }
}
