use std::time::Duration;

use recollector_core::{
    ChatSession, EditGateway, EmailGateway, MessageRole, RequestError, SendOutcome, SessionEvent,
};
use recollector_edit::{ClientConfig, HttpGateway};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway_for(server: &MockServer) -> HttpGateway {
    let config = ClientConfig::new(Some(server.uri()), Some(5));
    match HttpGateway::new(&config) {
        Ok(gateway) => gateway,
        Err(e) => panic!("failed to build gateway: {e}"),
    }
}

#[tokio::test]
async fn edit_posts_message_and_decodes_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/task-1/edit"))
        .and(body_json(json!({ "message": "모델을 더 부드럽게 만들어줘" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "완료했습니다",
            "tools_used": [{ "tool": "apply_smooth", "arguments": {}, "result": { "ok": true }, "success": true }],
            "model_url": "/static/models/task-1_edited.glb"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = gateway_for(&server)
        .edit_with_chat("task-1", "모델을 더 부드럽게 만들어줘")
        .await
        .unwrap();

    assert!(resp.success);
    assert_eq!(resp.message, "완료했습니다");
    assert_eq!(resp.tools_used.len(), 1);
    assert_eq!(resp.tools_used[0].tool, "apply_smooth");
    assert_eq!(resp.model_url.as_deref(), Some("/static/models/task-1_edited.glb"));
}

#[tokio::test]
async fn server_detail_is_extracted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/nope/edit"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "detail": "Model not found" })),
        )
        .mount(&server)
        .await;

    let err = gateway_for(&server).edit_with_chat("nope", "hi").await.unwrap_err();

    assert_eq!(err, RequestError::Rejected { status: 404, detail: "Model not found".into() });
}

#[tokio::test]
async fn status_without_detail_is_generic() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/t/edit"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = gateway_for(&server).edit_with_chat("t", "hi").await.unwrap_err();

    assert_eq!(err, RequestError::Status { status: 500 });
    assert_eq!(err.to_string(), "Request failed with status code 500");
}

#[tokio::test]
async fn malformed_reply_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/t/edit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })))
        .mount(&server)
        .await;

    let err = gateway_for(&server).edit_with_chat("t", "hi").await.unwrap_err();

    assert!(matches!(err, RequestError::Decode(_)));
}

#[tokio::test]
async fn reset_succeeds_on_any_2xx_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/t/reset-edit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "대화 히스토리가 초기화되었습니다.",
            "task_id": "t"
        })))
        .expect(1)
        .mount(&server)
        .await;

    gateway_for(&server).reset_conversation("t").await.unwrap();
}

#[tokio::test]
async fn download_returns_raw_bytes() {
    let server = MockServer::start().await;
    let glb = b"glTF\x02\x00\x00\x00binary".to_vec();
    Mock::given(method("GET"))
        .and(path("/api/tasks/t/download-edited"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(glb.clone(), "model/gltf-binary"))
        .mount(&server)
        .await;

    let bytes = gateway_for(&server).download_edited_model("t").await.unwrap();

    assert_eq!(bytes, glb);
}

#[tokio::test]
async fn email_uses_recipient_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/t/set-email"))
        .and(body_json(json!({ "recipient_email": "me@example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "이메일이 등록되었습니다.",
            "task_id": "t",
            "email": "me@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = gateway_for(&server).submit_email("t", "me@example.com").await.unwrap();

    assert_eq!(resp.task_id, "t");
    assert_eq!(resp.email, "me@example.com");
}

#[tokio::test]
async fn invalid_email_reports_validation_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/t/set-email"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{
                "loc": ["body", "recipient_email"],
                "msg": "value is not a valid email address",
                "type": "value_error"
            }]
        })))
        .mount(&server)
        .await;

    let err = gateway_for(&server).submit_email("t", "not-an-email").await.unwrap_err();

    assert_eq!(err.status(), Some(422));
    assert_eq!(err.detail(), Some("value is not a valid email address"));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    // Bind then drop a listener so the port is very likely closed.
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };
    let gateway = HttpGateway::new(&ClientConfig::new(Some(uri), Some(5))).unwrap();

    let err = gateway.reset_conversation("t").await.unwrap_err();

    assert!(err.is_transport(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/t/edit"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "message": "late", "tools_used": [] }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    let config = ClientConfig::new(Some(server.uri()), None).with_timeout(Duration::from_millis(200));
    let gateway = HttpGateway::new(&config).unwrap();

    let err = gateway.edit_with_chat("t", "hi").await.unwrap_err();

    assert_eq!(err, RequestError::Timeout(Duration::from_millis(200)));
}

#[tokio::test]
async fn session_over_http_reports_model_update_and_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/t/edit"))
        .and(body_json(json!({ "message": "색상을 파란색으로 바꿔줘" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "파란색으로 변경했습니다",
            "tools_used": [{ "tool": "change_color", "arguments": { "r": 0.0, "g": 0.0, "b": 1.0 }, "success": true }],
            "model_url": "/static/models/t_edited.glb"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/t/edit"))
        .and(body_json(json!({ "message": "모델 크기를 2배로 키워줘" })))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "detail": "편집 실패" })),
        )
        .mount(&server)
        .await;

    let session = ChatSession::new("t", gateway_for(&server));
    let updates = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let sink = updates.clone();
    session.subscribe(move |event| {
        if let SessionEvent::ModelUpdated(url) = event {
            sink.borrow_mut().push(url.clone());
        }
    });

    assert_eq!(session.send_user_message("색상을 파란색으로 바꿔줘").await, SendOutcome::Answered);
    assert_eq!(session.send_user_message("모델 크기를 2배로 키워줘").await, SendOutcome::Failed);

    let messages = session.messages();
    assert_eq!(messages.len(), 5);
    assert_eq!(messages[2].content, "파란색으로 변경했습니다");
    assert_eq!(messages[4].role, MessageRole::Assistant);
    assert_eq!(messages[4].content, "오류가 발생했습니다: 편집 실패");
    assert_eq!(*updates.borrow(), vec!["/static/models/t_edited.glb".to_string()]);
    assert!(!session.is_busy());
}
