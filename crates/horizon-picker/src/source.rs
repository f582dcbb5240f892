//! Asynchronous search sources.
//!
//! When a [`SearchSource`] is configured, the coordinator switches from
//! local filtering to remote search: every keystroke's query is handed to
//! the source, which answers either with one complete result set
//! ([`SourceReply::Batch`]) or with a stream of result chunks
//! ([`SourceReply::Chunks`]) that the coordinator accumulates and publishes
//! progressively.
//!
//! Sources are usually built from closures:
//!
//! ```
//! use horizon_picker::source::{source_fn, SourceError};
//!
//! let source = source_fn(|query: String, _max_items: usize| async move {
//!     // Normally an HTTP round trip; any async lookup works.
//!     Ok(vec![format!("{query}-1"), format!("{query}-2")])
//! });
//! # let _ = source;
//! ```
//!
//! A failed lookup is not fatal to the widget: the coordinator logs the
//! error and publishes an empty result set (batch) or stops consuming the
//! stream (chunked).

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;
use thiserror::Error;

/// Error surfaced by a search source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The lookup failed with a message.
    #[error("search source failed: {0}")]
    Failed(String),
    /// The lookup failed with an underlying error.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl SourceError {
    /// Convenience constructor for message-only failures.
    pub fn message(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

/// Future resolving to one complete result set.
pub type SourceFuture<T> = BoxFuture<'static, Result<Vec<T>, SourceError>>;

/// Stream of result chunks for one query.
pub type SourceStream<T> = BoxStream<'static, Result<Vec<T>, SourceError>>;

/// A search source's answer to one query.
pub enum SourceReply<T> {
    /// One complete result set.
    Batch(SourceFuture<T>),
    /// Incremental result chunks, published progressively as they arrive.
    Chunks(SourceStream<T>),
}

impl<T> std::fmt::Debug for SourceReply<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Batch(_) => f.write_str("SourceReply::Batch"),
            Self::Chunks(_) => f.write_str("SourceReply::Chunks"),
        }
    }
}

/// An asynchronous candidate lookup.
///
/// `max_items` forwards the widget's list-size hint (`0` means no limit);
/// sources are free to ignore it.
pub trait SearchSource<T>: Send + Sync {
    /// Start a lookup for `query`.
    fn search(&self, query: &str, max_items: usize) -> SourceReply<T>;
}

struct FnSource<F> {
    f: F,
}

impl<T, F, Fut> SearchSource<T> for FnSource<F>
where
    F: Fn(String, usize) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<T>, SourceError>> + Send + 'static,
{
    fn search(&self, query: &str, max_items: usize) -> SourceReply<T> {
        SourceReply::Batch(Box::pin((self.f)(query.to_string(), max_items)))
    }
}

/// Build a batch source from an async closure.
pub fn source_fn<T, F, Fut>(f: F) -> Arc<dyn SearchSource<T>>
where
    T: Send + Sync + 'static,
    F: Fn(String, usize) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>, SourceError>> + Send + 'static,
{
    Arc::new(FnSource { f })
}

struct ChunkedFnSource<F> {
    f: F,
}

impl<T, F> SearchSource<T> for ChunkedFnSource<F>
where
    F: Fn(String, usize) -> SourceStream<T> + Send + Sync,
{
    fn search(&self, query: &str, max_items: usize) -> SourceReply<T> {
        SourceReply::Chunks((self.f)(query.to_string(), max_items))
    }
}

/// Build a chunked source from a closure returning a stream of chunks.
pub fn chunked_source_fn<T, F>(f: F) -> Arc<dyn SearchSource<T>>
where
    T: Send + Sync + 'static,
    F: Fn(String, usize) -> SourceStream<T> + Send + Sync + 'static,
{
    Arc::new(ChunkedFnSource { f })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn test_source_fn_batch() {
        let source = source_fn(|query: String, max_items: usize| async move {
            assert_eq!(max_items, 10);
            Ok(vec![format!("{query}!")])
        });

        match source.search("hi", 10) {
            SourceReply::Batch(fut) => {
                assert_eq!(fut.await.unwrap(), vec!["hi!".to_string()]);
            }
            SourceReply::Chunks(_) => panic!("expected batch reply"),
        }
    }

    #[tokio::test]
    async fn test_chunked_source_fn() {
        let source = chunked_source_fn(|query: String, _max| {
            Box::pin(async_stream::stream! {
                yield Ok(vec![format!("{query}-a")]);
                yield Ok(vec![format!("{query}-b")]);
            }) as SourceStream<String>
        });

        match source.search("x", 0) {
            SourceReply::Chunks(mut stream) => {
                assert_eq!(stream.next().await.unwrap().unwrap(), vec!["x-a"]);
                assert_eq!(stream.next().await.unwrap().unwrap(), vec!["x-b"]);
                assert!(stream.next().await.is_none());
            }
            SourceReply::Batch(_) => panic!("expected chunked reply"),
        }
    }

    #[test]
    fn test_source_error_display() {
        let err = SourceError::message("backend unreachable");
        assert_eq!(err.to_string(), "search source failed: backend unreachable");
    }
}
