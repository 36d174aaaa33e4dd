use super::*;
use crate::testing::{result, ScriptedSource};
use popcorn_sources::omdb::api::SEARCH_FAILED_MESSAGE;
use popcorn_sources::SourceError;

fn coordinator() -> (Arc<ScriptedSource>, SearchCoordinator) {
    let source = Arc::new(ScriptedSource::new());
    let coordinator = SearchCoordinator::new(source.clone());
    (source, coordinator)
}

#[tokio::test]
async fn test_short_query_is_empty_without_request() {
    let (source, coordinator) = coordinator();

    for query in ["", "a", "ab"] {
        assert!(coordinator.search(query).is_none());
        assert_eq!(coordinator.outcome(), SearchOutcome::Empty);
    }

    tokio::task::yield_now().await;
    assert_eq!(source.search_calls(), 0);
}

#[tokio::test]
async fn test_min_length_counts_characters() {
    let (source, coordinator) = coordinator();

    // Three characters, five bytes.
    let handle = coordinator.search("été").expect("three characters is long enough");
    handle.await.unwrap();
    assert_eq!(source.search_calls(), 1);
    assert_eq!(coordinator.outcome(), SearchOutcome::Success(Vec::new()));
}

#[tokio::test]
async fn test_success_goes_through_loading() {
    let (source, coordinator) = coordinator();
    let results = vec![result("tt1375666", "Inception"), result("tt5295894", "Inception: The Cobol Job")];
    source.answer_search("inception", Ok(results.clone()));

    let handle = coordinator.search("inception").unwrap();
    assert_eq!(coordinator.outcome(), SearchOutcome::Loading);

    handle.await.unwrap();
    assert_eq!(coordinator.outcome(), SearchOutcome::Success(results));
    assert_eq!(source.search_calls(), 1);
}

#[tokio::test]
async fn test_newer_query_supersedes_older() {
    let (source, coordinator) = coordinator();
    let first_reply = source.hold_search("matrix");
    let second_reply = source.hold_search("matrix reloaded");

    let first = coordinator.search("matrix").unwrap();
    tokio::task::yield_now().await;
    let second = coordinator.search("matrix reloaded").unwrap();

    // The first request is cancelled before its answer arrives.
    first.await.unwrap();
    assert_eq!(coordinator.outcome(), SearchOutcome::Loading);

    let _ = first_reply.send(Ok(vec![result("tt0133093", "The Matrix")]));
    tokio::task::yield_now().await;
    assert_eq!(coordinator.outcome(), SearchOutcome::Loading);

    let reloaded = vec![result("tt0234215", "The Matrix Reloaded")];
    second_reply.send(Ok(reloaded.clone())).unwrap();
    second.await.unwrap();
    assert_eq!(coordinator.outcome(), SearchOutcome::Success(reloaded.clone()));

    // Nothing that arrives later for the old query changes the outcome.
    tokio::task::yield_now().await;
    assert_eq!(coordinator.outcome(), SearchOutcome::Success(reloaded));
}

#[tokio::test]
async fn test_cancelled_request_is_not_a_failure() {
    let (source, coordinator) = coordinator();
    let reply = source.hold_search("alien");

    let handle = coordinator.search("alien").unwrap();
    tokio::task::yield_now().await;
    assert!(coordinator.search("al").is_none());

    handle.await.unwrap();
    drop(reply);
    tokio::task::yield_now().await;
    assert_eq!(coordinator.outcome(), SearchOutcome::Empty);
}

#[tokio::test]
async fn test_not_found_message_is_surfaced() {
    let (source, coordinator) = coordinator();
    source.answer_search("qwertyuiop", Err(SourceError::NotFound("Movie not found!".to_string())));

    coordinator.search("qwertyuiop").unwrap().await.unwrap();
    assert_eq!(coordinator.outcome(), SearchOutcome::Failure("Movie not found!".to_string()));
}

#[tokio::test]
async fn test_transport_failure_uses_generic_message() {
    let (source, coordinator) = coordinator();
    source.answer_search("heat", Err(SourceError::Transport(SEARCH_FAILED_MESSAGE.to_string())));

    coordinator.search("heat").unwrap().await.unwrap();
    assert_eq!(coordinator.outcome(), SearchOutcome::Failure(SEARCH_FAILED_MESSAGE.to_string()));
}

#[tokio::test]
async fn test_new_search_clears_previous_error() {
    let (source, coordinator) = coordinator();
    source.answer_search("nope", Err(SourceError::NotFound("Movie not found!".to_string())));
    coordinator.search("nope").unwrap().await.unwrap();
    assert!(coordinator.outcome().error().is_some());

    let _pending = source.hold_search("nope2");
    let _handle = coordinator.search("nope2").unwrap();
    assert_eq!(coordinator.outcome(), SearchOutcome::Loading);
    assert_eq!(coordinator.outcome().error(), None);
}

#[tokio::test]
async fn test_settled_waits_for_result() {
    let (source, coordinator) = coordinator();
    let reply = source.hold_search("dune");
    let _handle = coordinator.search("dune").unwrap();

    let dune = vec![result("tt1160419", "Dune")];
    let expected = dune.clone();
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        let _ = reply.send(Ok(dune));
    });

    assert_eq!(coordinator.settled().await, SearchOutcome::Success(expected));
}

#[tokio::test]
async fn test_subscriber_sees_latest_outcome() {
    let (source, coordinator) = coordinator();
    let mut rx = coordinator.subscribe();
    assert_eq!(*rx.borrow_and_update(), SearchOutcome::Empty);

    source.answer_search("jaws", Ok(vec![result("tt0073195", "Jaws")]));
    coordinator.search("jaws").unwrap().await.unwrap();

    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().results().len(), 1);
}

#[tokio::test]
async fn test_reset_and_drop_cancel_in_flight() {
    let (source, coordinator) = coordinator();
    let _reply = source.hold_search("batman");
    let handle = coordinator.search("batman").unwrap();
    coordinator.reset();
    handle.await.unwrap();
    assert_eq!(coordinator.outcome(), SearchOutcome::Empty);

    let _reply = source.hold_search("superman");
    let handle = coordinator.search("superman").unwrap();
    drop(coordinator);
    // The fetch task finishes promptly instead of waiting on the reply.
    handle.await.unwrap();
}
