mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn eligibility_is_checked_before_content() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;

    let reply = app
        .post("/Message/SendMessage", Some(&bob.token), json!({ "receiverId": alice.user_id, "content": "" }))
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    // a pending request is not a friendship
    app.post("/Profile/SendFriendRequest", Some(&bob.token), json!({ "receiverId": alice.user_id }))
        .await;
    let reply = app
        .post("/Message/SendMessage", Some(&bob.token), json!({ "receiverId": alice.user_id, "content": "hi" }))
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = app
        .post(
            "/Message/SendMessage",
            Some(&bob.token),
            json!({ "receiverId": "0190a0c1-0000-7000-8000-000000000000", "content": "hi" }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_message_between_friends_is_bad_request() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;
    app.befriend(&bob, &alice).await;

    let reply = app
        .post("/Message/SendMessage", Some(&bob.token), json!({ "receiverId": alice.user_id, "content": "  " }))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reading_a_conversation_marks_it_read() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;
    app.befriend(&bob, &alice).await;

    for content in ["one", "two"] {
        app.post("/Message/SendMessage", Some(&bob.token), json!({ "receiverId": alice.user_id, "content": content }))
            .await;
    }

    let inbox = app.get("/Message/Index", Some(&alice.token)).await;
    assert_eq!(inbox.body[0]["userId"], bob.user_id.as_str());
    assert_eq!(inbox.body[0]["name"], "bob");
    assert_eq!(inbox.body[0]["unread"], 2);
    assert_eq!(inbox.body[0]["lastMessage"]["content"], "two");

    let conversation = app.get(&format!("/Message/Conversation/{}", bob.user_id), Some(&alice.token)).await;
    assert_eq!(conversation.status, StatusCode::OK);
    assert_eq!(conversation.body.as_array().unwrap().len(), 2);
    assert_eq!(conversation.body[0]["content"], "one");

    let inbox = app.get("/Message/Index", Some(&alice.token)).await;
    assert_eq!(inbox.body[0]["unread"], 0);
}

#[tokio::test]
async fn only_sender_or_moderator_deletes_a_message() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;
    app.befriend(&bob, &alice).await;

    let sent = app
        .post("/Message/SendMessage", Some(&bob.token), json!({ "receiverId": alice.user_id, "content": "oops" }))
        .await;
    let id = json!({ "messageId": sent.body["id"] });

    let reply = app.post("/Message/DeleteMessage", Some(&alice.token), id.clone()).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    let reply = app.post("/Message/DeleteMessage", Some(&bob.token), id).await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn group_chat_is_for_members() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;

    let group = app.post("/Group/Create", Some(&alice.token), json!({ "name": "Rustaceans" })).await;
    assert_eq!(group.status, StatusCode::OK);
    let group_id = group.body["id"].as_str().unwrap().to_owned();

    let view = app.get(&format!("/Group/View/{group_id}"), None).await;
    assert_eq!(view.status, StatusCode::OK);
    assert!(view.body["members"].as_array().unwrap().is_empty());

    let joined = app.post("/Group/Join", Some(&alice.token), json!({ "groupId": group_id })).await;
    assert_eq!(joined.body["changed"], true);
    let joined = app.post("/Group/Join", Some(&alice.token), json!({ "groupId": group_id })).await;
    assert_eq!(joined.status, StatusCode::OK);
    assert_eq!(joined.body["changed"], false);

    let message = json!({ "groupId": group_id, "content": "hello group" });
    let reply = app.post("/Group/SendMessage", Some(&bob.token), message.clone()).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    let reply = app.post("/Group/SendMessage", Some(&alice.token), message).await;
    assert_eq!(reply.status, StatusCode::OK);

    let chat = app.get(&format!("/Group/Chat/{group_id}"), Some(&bob.token)).await;
    assert_eq!(chat.status, StatusCode::FORBIDDEN);
    let chat = app.get(&format!("/Group/Chat/{group_id}"), Some(&alice.token)).await;
    assert_eq!(chat.body[0]["content"], "hello group");

    let left = app.post("/Group/Leave", Some(&alice.token), json!({ "groupId": group_id })).await;
    assert_eq!(left.body["changed"], true);
    let left = app.post("/Group/Leave", Some(&alice.token), json!({ "groupId": group_id })).await;
    assert_eq!(left.body["changed"], false);

    let list = app.get("/Group/Index", None).await;
    assert_eq!(list.body[0]["name"], "Rustaceans");
}
