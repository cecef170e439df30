use curalink_events::{Delivery, ProductEvent, WebhookNotifier};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn event_envelope_is_posted_to_the_webhook_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/curalink"))
        .and(body_partial_json(json!({
            "eventType": "trial_favorited",
            "payload": { "trialId": "NCT05123456", "trialTitle": "DBS" },
            "userId": "user-42"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("Workflow was started"))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(&format!("{}/webhook/curalink", server.uri())).unwrap();
    let delivery = notifier
        .notify(&ProductEvent::trial_favorited("NCT05123456", "DBS"), Some("user-42"))
        .await;
    assert_eq!(delivery, Delivery::Sent);

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let stamp = body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
}

#[tokio::test]
async fn missing_user_id_is_reported_as_anonymous() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "userId": "anonymous", "eventType": "search_performed" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(&format!("{}/hook", server.uri())).unwrap();
    let delivery = notifier
        .notify(&ProductEvent::search_performed("trials", "parkinson", 2), None)
        .await;
    assert_eq!(delivery, Delivery::Sent);
}

#[tokio::test]
async fn webhook_failure_is_swallowed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_string("webhook not registered"))
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(&format!("{}/webhook-test/x", server.uri())).unwrap();
    let delivery = notifier
        .notify(&ProductEvent::ai_chat_message("hi", "hello"), None)
        .await;
    assert_eq!(delivery, Delivery::Failed);
}

#[tokio::test]
async fn disabled_notifier_skips() {
    let delivery = WebhookNotifier::disabled()
        .notify(&ProductEvent::account_type_changed("patient", "researcher"), None)
        .await;
    assert_eq!(delivery, Delivery::Skipped);
}
