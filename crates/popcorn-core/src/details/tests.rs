use super::*;
use crate::testing::{detail, ScriptedSource};
use std::sync::Mutex;

fn recording_hook() -> (SelectionHook, Arc<Mutex<Vec<Option<String>>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let hook: SelectionHook = Arc::new(move |title: Option<&str>| {
        sink.lock().unwrap().push(title.map(str::to_string));
    });
    (hook, seen)
}

#[tokio::test]
async fn test_open_loads_and_notifies_hook() {
    let source = Arc::new(ScriptedSource::new());
    let (hook, seen) = recording_hook();
    let details = DetailCoordinator::new(source.clone()).with_selection_hook(hook);

    source.answer_details("tt1375666", Ok(detail("tt1375666", "Inception")));
    let handle = details.open("tt1375666");
    assert!(details.state().is_loading());
    assert_eq!(details.selected_id().as_deref(), Some("tt1375666"));

    handle.await.unwrap();
    match details.state() {
        DetailState::Loaded(loaded) => assert_eq!(loaded.title, "Inception"),
        other => panic!("unexpected state: {:?}", other),
    }
    assert_eq!(*seen.lock().unwrap(), vec![Some("Inception".to_string())]);

    details.close();
    assert_eq!(details.state(), DetailState::Closed);
    assert_eq!(*seen.lock().unwrap(), vec![Some("Inception".to_string()), None]);
}

#[tokio::test]
async fn test_toggle_same_id_closes() {
    let source = Arc::new(ScriptedSource::new());
    let details = DetailCoordinator::new(source.clone());

    source.answer_details("tt0133093", Ok(detail("tt0133093", "The Matrix")));
    details.toggle("tt0133093").unwrap().await.unwrap();
    assert_eq!(details.selected_id().as_deref(), Some("tt0133093"));

    assert!(details.toggle("tt0133093").is_none());
    assert_eq!(details.state(), DetailState::Closed);
    assert_eq!(source.detail_calls(), 1);
}

#[tokio::test]
async fn test_switching_selection_discards_older_detail() {
    let source = Arc::new(ScriptedSource::new());
    let (hook, seen) = recording_hook();
    let details = DetailCoordinator::new(source.clone()).with_selection_hook(hook);

    let slow = source.hold_details("tt0078748");
    let first = details.open("tt0078748");
    tokio::task::yield_now().await;

    source.answer_details("tt0090605", Ok(detail("tt0090605", "Aliens")));
    let second = details.open("tt0090605");

    let _ = slow.send(Ok(detail("tt0078748", "Alien")));
    first.await.unwrap();
    second.await.unwrap();

    assert_eq!(details.selected_id().as_deref(), Some("tt0090605"));
    assert_eq!(*seen.lock().unwrap(), vec![Some("Aliens".to_string())]);
}

#[tokio::test]
async fn test_failure_keeps_selection_and_message() {
    let source = Arc::new(ScriptedSource::new());
    let (hook, seen) = recording_hook();
    let details = DetailCoordinator::new(source.clone()).with_selection_hook(hook);

    // Unscripted ids answer "Incorrect IMDb ID."
    let _handle = details.open("tt0000000");
    let state = details.settled().await;
    assert_eq!(
        state,
        DetailState::Failed {
            imdb_id: "tt0000000".to_string(),
            message: "Incorrect IMDb ID.".to_string(),
        }
    );

    details.close();
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_close_while_loading_drops_response() {
    let source = Arc::new(ScriptedSource::new());
    let details = DetailCoordinator::new(source.clone());

    let reply = source.hold_details("tt0110912");
    let handle = details.open("tt0110912");
    tokio::task::yield_now().await;
    details.close();

    let _ = reply.send(Ok(detail("tt0110912", "Pulp Fiction")));
    handle.await.unwrap();
    assert_eq!(details.state(), DetailState::Closed);
}

#[tokio::test]
async fn test_close_after_failed_switch_clears_selection() {
    let source = Arc::new(ScriptedSource::new());
    let (hook, seen) = recording_hook();
    let details = DetailCoordinator::new(source.clone()).with_selection_hook(hook);

    source.answer_details("tt0078748", Ok(detail("tt0078748", "Alien")));
    details.open("tt0078748").await.unwrap();

    // Unscripted id fails
    details.open("tt0000404").await.unwrap();
    assert!(matches!(details.state(), DetailState::Failed { .. }));

    details.close();
    assert_eq!(details.state(), DetailState::Closed);
    assert_eq!(*seen.lock().unwrap(), vec![Some("Alien".to_string()), None]);
}

#[tokio::test]
async fn test_opening_another_title_withdraws_loaded_one() {
    let source = Arc::new(ScriptedSource::new());
    let (hook, seen) = recording_hook();
    let details = DetailCoordinator::new(source.clone()).with_selection_hook(hook);

    source.answer_details("tt0078748", Ok(detail("tt0078748", "Alien")));
    source.answer_details("tt0090605", Ok(detail("tt0090605", "Aliens")));
    details.open("tt0078748").await.unwrap();
    details.open("tt0090605").await.unwrap();

    details.close();
    details.close();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![Some("Alien".to_string()), None, Some("Aliens".to_string()), None]
    );
}
