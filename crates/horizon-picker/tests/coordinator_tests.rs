//! Integration tests for the search coordinator: request/response fencing,
//! streamed responses, debounced input, and source failure handling.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use horizon_picker::accessor::ItemAccessors;
use horizon_picker::source::{SourceError, SourceStream, chunked_source_fn, source_fn};
use horizon_picker::{Autocomplete, AutocompleteOptions, MatchPolicy, SearchCoordinator};

fn coordinator(
    options: AutocompleteOptions,
    source: Option<Arc<dyn horizon_picker::SearchSource<String>>>,
) -> SearchCoordinator<String> {
    SearchCoordinator::new(
        Arc::new(options),
        Arc::new(ItemAccessors::<String>::display()),
        MatchPolicy::default(),
        source,
    )
}

/// Remote results are published as-is when local filtering is off.
fn remote_options() -> AutocompleteOptions {
    AutocompleteOptions::default().with_local_filtering(false)
}

fn labels(coord: &SearchCoordinator<String>) -> Vec<String> {
    coord
        .filtered_items()
        .iter()
        .map(|entry| entry.label.clone())
        .collect()
}

#[tokio::test]
async fn test_stale_batch_response_is_dropped() {
    // The "slow" query answers long after the "fast" one. The slow response
    // belongs to an older request id and must never reach the published
    // list.
    let source = source_fn(|query: String, _max| async move {
        if query == "slow" {
            tokio::time::sleep(Duration::from_millis(80)).await;
            Ok(vec!["stale result".to_string()])
        } else {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(vec!["fresh result".to_string()])
        }
    });
    let coord = coordinator(remote_options(), Some(source));

    let (first, second) = tokio::join!(coord.search("slow"), coord.search("fast"));
    assert!(!first.should_close);
    assert!(!second.should_close);

    assert_eq!(labels(&coord), vec!["fresh result"]);
    assert!(!coord.loading());
}

#[tokio::test]
async fn test_streamed_chunks_accumulate_and_publish_progressively() {
    let source = chunked_source_fn(|query: String, _max| {
        Box::pin(async_stream::stream! {
            yield Ok(vec![format!("{query} 1")]);
            yield Ok(vec![format!("{query} 2"), format!("{query} 3")]);
        }) as SourceStream<String>
    });
    let coord = coordinator(remote_options(), Some(source));

    let publishes = Arc::new(AtomicUsize::new(0));
    let publishes_clone = publishes.clone();
    coord.list_updated.connect(move |_| {
        publishes_clone.fetch_add(1, Ordering::SeqCst);
    });

    coord.search("row").await;

    assert_eq!(labels(&coord), vec!["row 1", "row 2", "row 3"]);
    // One publish per accepted chunk.
    assert_eq!(publishes.load(Ordering::SeqCst), 2);
    assert!(!coord.loading());
}

#[tokio::test]
async fn test_stale_stream_chunks_are_abandoned() {
    // The slow stream produces its chunks only after the fast request has
    // already completed; every one of them must be discarded.
    let source = chunked_source_fn(|query: String, _max| {
        if query == "slow" {
            Box::pin(async_stream::stream! {
                tokio::time::sleep(Duration::from_millis(60)).await;
                yield Ok(vec!["stale 1".to_string()]);
                yield Ok(vec!["stale 2".to_string()]);
            }) as SourceStream<String>
        } else {
            Box::pin(async_stream::stream! {
                yield Ok(vec!["fresh".to_string()]);
            }) as SourceStream<String>
        }
    });
    let coord = coordinator(remote_options(), Some(source));

    tokio::join!(coord.search("slow"), coord.search("fast"));

    assert_eq!(labels(&coord), vec!["fresh"]);
}

#[tokio::test]
async fn test_empty_stream_publishes_empty_once() {
    let source = chunked_source_fn(|_query: String, _max| {
        let chunks: Vec<Result<Vec<String>, SourceError>> = Vec::new();
        Box::pin(tokio_stream::iter(chunks)) as SourceStream<String>
    });
    let coord = coordinator(remote_options(), Some(source));

    let publishes = Arc::new(AtomicUsize::new(0));
    let publishes_clone = publishes.clone();
    coord.list_updated.connect(move |_| {
        publishes_clone.fetch_add(1, Ordering::SeqCst);
    });

    coord.search("nothing").await;

    assert!(labels(&coord).is_empty());
    assert_eq!(publishes.load(Ordering::SeqCst), 1);
    assert!(!coord.loading());
}

#[tokio::test]
async fn test_failed_batch_publishes_empty_result() {
    let source = source_fn(|_query: String, _max| async move {
        Err::<Vec<String>, _>(SourceError::message("backend down"))
    });
    let coord = coordinator(remote_options(), Some(source));

    let outcome = coord.search("anything").await;
    assert!(!outcome.should_close);
    assert!(labels(&coord).is_empty());
    assert!(!coord.loading());
}

#[tokio::test]
async fn test_stream_error_ends_stream_keeping_accepted_chunks() {
    let source = chunked_source_fn(|_query: String, _max| {
        Box::pin(tokio_stream::iter(vec![
            Ok(vec!["kept".to_string()]),
            Err(SourceError::message("connection reset")),
            Ok(vec!["never seen".to_string()]),
        ])) as SourceStream<String>
    });
    let coord = coordinator(remote_options(), Some(source));

    coord.search("q").await;

    assert_eq!(labels(&coord), vec!["kept"]);
    assert!(!coord.loading());
}

#[tokio::test]
async fn test_empty_query_with_source_clears_candidates() {
    let source = source_fn(|query: String, _max| async move { Ok(vec![query]) });
    let coord = coordinator(remote_options(), Some(source));

    coord.search("abc").await;
    assert_eq!(coord.items_len(), 1);

    // Below the one-character threshold: candidates dropped, close requested.
    let outcome = coord.search("").await;
    assert!(outcome.should_close);
    assert_eq!(coord.items_len(), 0);
    assert!(labels(&coord).is_empty());
}

#[tokio::test]
async fn test_remote_results_pass_through_local_filtering() {
    // With local filtering on (the default), remote results still run the
    // match pipeline against the query.
    let source = source_fn(|_query: String, _max| async move {
        Ok(vec!["alpha".to_string(), "beta".to_string()])
    });
    let coord = coordinator(AutocompleteOptions::default(), Some(source));

    coord.search("alp").await;
    assert_eq!(labels(&coord), vec!["alpha"]);
}

#[tokio::test]
async fn test_debounced_input_runs_only_newest_search() {
    let searches = Arc::new(AtomicUsize::new(0));
    let searches_clone = searches.clone();
    let source = source_fn(move |query: String, _max| {
        searches_clone.fetch_add(1, Ordering::SeqCst);
        async move { Ok(vec![query]) }
    });

    let picker = Autocomplete::new(
        remote_options().with_delay(Duration::from_millis(30)),
        ItemAccessors::<String>::display(),
    )
    .with_source(source);

    tokio::join!(picker.on_input("a"), picker.on_input("ab"));

    assert_eq!(searches.load(Ordering::SeqCst), 1);
    let filtered = picker.filtered_items();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].label, "ab");
}

#[tokio::test]
async fn test_zero_delay_searches_every_keystroke() {
    let searches = Arc::new(AtomicUsize::new(0));
    let searches_clone = searches.clone();
    let source = source_fn(move |query: String, _max| {
        searches_clone.fetch_add(1, Ordering::SeqCst);
        async move { Ok(vec![query]) }
    });

    let picker = Autocomplete::new(remote_options(), ItemAccessors::<String>::display())
        .with_source(source);

    picker.on_input("a").await;
    picker.on_input("ab").await;

    assert_eq!(searches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_max_items_hint_reaches_source() {
    let seen = Arc::new(AtomicUsize::new(0));
    let seen_clone = seen.clone();
    let source = source_fn(move |_query: String, max| {
        seen_clone.store(max, Ordering::SeqCst);
        async move { Ok(Vec::<String>::new()) }
    });
    let coord = coordinator(
        remote_options().with_max_items_to_show_in_list(25),
        Some(source),
    );

    coord.search("q").await;
    assert_eq!(seen.load(Ordering::SeqCst), 25);
}
