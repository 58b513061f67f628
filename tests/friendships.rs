mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn friends_can_message_and_strangers_cannot() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;
    let carol = app.signup("carol").await;

    let sent = app
        .post("/Profile/SendFriendRequest", Some(&bob.token), json!({ "receiverId": alice.user_id }))
        .await;
    assert_eq!(sent.status, StatusCode::OK);
    assert_eq!(sent.body["status"], "Pending");

    let accepted = app
        .post("/Profile/AcceptFriendRequest", Some(&alice.token), json!({ "friendshipId": sent.body["id"] }))
        .await;
    assert_eq!(accepted.status, StatusCode::OK);
    assert_eq!(accepted.body["status"], "Accepted");

    let message = json!({ "receiverId": alice.user_id, "content": "hi alice" });
    let reply = app.post("/Message/SendMessage", Some(&bob.token), message.clone()).await;
    assert_eq!(reply.status, StatusCode::OK);

    let reply = app.post("/Message/SendMessage", Some(&carol.token), message).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn second_request_between_a_pair_conflicts() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;

    let first = app
        .post("/Profile/SendFriendRequest", Some(&bob.token), json!({ "receiverId": alice.user_id }))
        .await;
    assert_eq!(first.status, StatusCode::OK);

    let again = app
        .post("/Profile/SendFriendRequest", Some(&bob.token), json!({ "receiverId": alice.user_id }))
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    let reverse = app
        .post("/Profile/SendFriendRequest", Some(&alice.token), json!({ "receiverId": bob.user_id }))
        .await;
    assert_eq!(reverse.status, StatusCode::CONFLICT);

    // still conflicts once the request is settled
    app.post("/Profile/RejectFriendRequest", Some(&alice.token), json!({ "friendshipId": first.body["id"] }))
        .await;
    let after = app
        .post("/Profile/SendFriendRequest", Some(&bob.token), json!({ "receiverId": alice.user_id }))
        .await;
    assert_eq!(after.status, StatusCode::CONFLICT);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM friendships")
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn friendship_leaves_pending_once() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;

    let sent = app
        .post("/Profile/SendFriendRequest", Some(&bob.token), json!({ "receiverId": alice.user_id }))
        .await;
    let id = json!({ "friendshipId": sent.body["id"] });

    let own = app.post("/Profile/AcceptFriendRequest", Some(&bob.token), id.clone()).await;
    assert_eq!(own.status, StatusCode::FORBIDDEN);

    let accepted = app.post("/Profile/AcceptFriendRequest", Some(&alice.token), id.clone()).await;
    assert_eq!(accepted.status, StatusCode::OK);

    let again = app.post("/Profile/AcceptFriendRequest", Some(&alice.token), id.clone()).await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    let reject = app.post("/Profile/RejectFriendRequest", Some(&alice.token), id).await;
    assert_eq!(reject.status, StatusCode::BAD_REQUEST);

    let friends = app.get("/Profile/Friends", Some(&bob.token)).await;
    assert_eq!(friends.body[0]["name"], "alice");
}

#[tokio::test]
async fn pending_requests_are_listed_for_the_receiver() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;

    app.post("/Profile/SendFriendRequest", Some(&bob.token), json!({ "receiverId": alice.user_id }))
        .await;

    let pending = app.get("/Profile/FriendRequests", Some(&alice.token)).await;
    assert_eq!(pending.body.as_array().unwrap().len(), 1);
    assert_eq!(pending.body[0]["senderId"], bob.user_id.as_str());

    let none = app.get("/Profile/FriendRequests", Some(&bob.token)).await;
    assert!(none.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn requests_to_self_or_nobody_fail() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;

    let own = app
        .post("/Profile/SendFriendRequest", Some(&alice.token), json!({ "receiverId": alice.user_id }))
        .await;
    assert_eq!(own.status, StatusCode::BAD_REQUEST);

    let nobody = app
        .post(
            "/Profile/SendFriendRequest",
            Some(&alice.token),
            json!({ "receiverId": "0190a0c1-0000-7000-8000-000000000000" }),
        )
        .await;
    assert_eq!(nobody.status, StatusCode::NOT_FOUND);
}
