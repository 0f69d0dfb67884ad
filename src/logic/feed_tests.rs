use super::*;
use futures::SinkExt;
use tokio::net::TcpListener;

fn new_state() -> SharedState {
    Arc::new(Mutex::new(AppState::default()))
}

fn item_text(state: &SharedState, target: &str) -> Option<String> {
    let s = state.lock().unwrap();
    s.page.element_by_id(&element_id(target)).map(|i| i.text.clone())
}

fn list_len(state: &SharedState) -> usize {
    state.lock().unwrap().page.update_list().unwrap().len()
}

/// Serves a single WebSocket client: sends `messages` as text frames, then closes.
async fn serve_once(messages: Vec<&'static str>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        for m in messages {
            if ws.send(Message::text(m)).await.is_err() {
                return;
            }
        }
        let _ = ws.close(None).await;
        while let Some(Ok(_)) = ws.next().await {}
    });
    format!("ws://{addr}/monitor")
}

// --- Update handler ---

#[test]
fn test_distinct_targets_get_own_items() {
    let state = new_state();
    handle_message(&state, r#"{"target":"T1","up":true}"#).unwrap();
    handle_message(&state, r#"{"target":"T2","up":false}"#).unwrap();
    handle_message(&state, r#"{"target":"T1","up":false}"#).unwrap();

    assert_eq!(list_len(&state), 2);
    assert_eq!(item_text(&state, "T1").unwrap(), "T1 is DOWN");
    assert_eq!(item_text(&state, "T2").unwrap(), "T2 is DOWN");
}

#[test]
fn test_repeated_event_is_idempotent() {
    let state = new_state();
    for _ in 0..2 {
        handle_message(&state, r#"{"target":"A","up":true}"#).unwrap();
        assert_eq!(item_text(&state, "A").unwrap(), "A is UP");
    }
    assert_eq!(list_len(&state), 1);
}

#[test]
fn test_toggle_overwrites_text() {
    let mut page = Page::new();
    let mut event = StatusEvent {
        target: "X".to_string(),
        up: true,
    };
    apply_update(&mut page, &event).unwrap();
    assert_eq!(page.element_by_id("target-X").unwrap().text, "X is UP");

    event.up = false;
    apply_update(&mut page, &event).unwrap();
    let item = page.element_by_id("target-X").unwrap();
    assert_eq!(item.text, "X is DOWN");
    assert_eq!(item.up, Some(false));
    assert_eq!(page.update_list().unwrap().len(), 1);
}

#[test]
fn test_malformed_message_is_counted_and_skipped() {
    let state = new_state();
    let err = handle_message(&state, "not-json").unwrap_err();
    assert!(matches!(err, FeedError::MalformedPayload(_)));
    assert_eq!(state.lock().unwrap().malformed, 1);
    assert_eq!(list_len(&state), 0);

    handle_message(&state, r#"{"target":"A","up":true}"#).unwrap();
    assert_eq!(item_text(&state, "A").unwrap(), "A is UP");
}

#[test]
fn test_malformed_counter_saturates() {
    let state = new_state();
    state.lock().unwrap().malformed = u32::MAX;

    assert!(handle_message(&state, "not-json").is_err());
    assert_eq!(state.lock().unwrap().malformed, u32::MAX);

    // The lock is still usable afterwards.
    handle_message(&state, r#"{"target":"A","up":true}"#).unwrap();
}

#[test]
fn test_missing_container_is_reported() {
    let state = new_state();
    state.lock().unwrap().page = Page::blank();

    let err = handle_message(&state, r#"{"target":"A","up":true}"#).unwrap_err();
    assert!(matches!(err, FeedError::ContainerMissing(_)));
    assert_eq!(state.lock().unwrap().malformed, 0);
}

// --- Connection ---

#[tokio::test]
async fn test_feed_applies_messages_until_close() {
    let url = serve_once(vec![
        r#"{"target":"A","up":true}"#,
        "not-json",
        r#"{"target":"B","up":false}"#,
        r#"{"target":"A","up":false}"#,
    ])
    .await;
    let state = new_state();

    feed_task(url, state.clone()).await.unwrap();

    assert_eq!(item_text(&state, "A").unwrap(), "A is DOWN");
    assert_eq!(item_text(&state, "B").unwrap(), "B is DOWN");
    assert_eq!(list_len(&state), 2);

    let s = state.lock().unwrap();
    assert_eq!(s.malformed, 1);
    assert!(matches!(s.connection, ConnectionState::Closed { .. }));
}

#[tokio::test]
async fn test_feed_stops_when_container_missing() {
    let url = serve_once(vec![
        r#"{"target":"A","up":true}"#,
        r#"{"target":"B","up":true}"#,
    ])
    .await;
    let state = new_state();
    state.lock().unwrap().page = Page::blank();

    let err = feed_task(url, state.clone()).await.unwrap_err();

    assert!(matches!(err, FeedError::ContainerMissing(_)));
    match &state.lock().unwrap().connection {
        ConnectionState::Failed { error } => assert!(error.contains("update-list")),
        other => panic!("unexpected state {other:?}"),
    }
}

#[tokio::test]
async fn test_feed_connect_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let state = new_state();

    let err = feed_task(format!("ws://{addr}/monitor"), state.clone())
        .await
        .unwrap_err();

    assert!(matches!(err, FeedError::Transport(_)));
    assert!(matches!(
        state.lock().unwrap().connection,
        ConnectionState::Failed { .. }
    ));
}

#[tokio::test]
async fn test_spawn_feed_runs_in_background() {
    let url = serve_once(vec![r#"{"target":"bg","up":true}"#]).await;
    let state = new_state();

    let handle = spawn_feed(url.clone(), state.clone()).unwrap();
    assert_eq!(handle.url(), url);

    for _ in 0..200 {
        if handle.is_finished() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    assert!(handle.is_finished());
    assert_eq!(item_text(&state, "bg").unwrap(), "bg is UP");
    assert!(!state.lock().unwrap().connection.is_active());
}

#[tokio::test]
async fn test_feed_task_marks_connecting_during_handshake() {
    // Accepts the TCP connection but never answers the upgrade request.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        drop(stream);
    });
    let url = format!("ws://{addr}/monitor");
    let state = new_state();
    assert_eq!(state.lock().unwrap().connection, ConnectionState::Idle);

    let task = tokio::spawn(feed_task(url.clone(), state.clone()));
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    assert_eq!(
        state.lock().unwrap().connection,
        ConnectionState::Connecting { url }
    );
    task.abort();
    server.abort();
}

#[tokio::test]
async fn test_secure_feed_goes_through_tls() {
    // A plain TCP peer that hangs up: the TLS handshake for wss:// must fail.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            drop(stream);
        }
    });
    let state = new_state();

    let err = feed_task(format!("wss://{addr}/monitor"), state.clone())
        .await
        .unwrap_err();

    assert!(matches!(err, FeedError::Transport(_)));
    assert!(matches!(
        state.lock().unwrap().connection,
        ConnectionState::Failed { .. }
    ));
}
