use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;

use crate::integration::common::{authed_request, json_body, json_request, setup_test_app};

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app().await;

    let response = app
        .send(Request::get("/health").body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "ok");
}

#[tokio::test]
async fn create_and_get_service() {
    let app = setup_test_app().await;
    let cookie = app.login("ops@riderelay.test").await;

    let response = app
        .send(json_request(
            "POST",
            "/api/v1/add-new-service",
            &cookie,
            json!({ "name": "Airport Transfer", "price": 40 }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let ack = json_body(response).await;
    assert_eq!(ack["acknowledged"], true);
    let id = ack["insertedId"].as_str().unwrap().to_string();

    let response = app
        .send(
            Request::get(format!("/api/v1/services/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let service = json_body(response).await;
    assert_eq!(
        service,
        json!({ "_id": id, "name": "Airport Transfer", "price": 40 })
    );
}

#[tokio::test]
async fn identical_creates_yield_distinct_documents() {
    let app = setup_test_app().await;
    let cookie = app.login("ops@riderelay.test").await;
    let body = json!({ "name": "City Tour", "price": 25 });

    let mut ids = Vec::new();
    for _ in 0..2 {
        let response = app
            .send(json_request("POST", "/api/v1/add-new-service", &cookie, body.clone()))
            .await;
        ids.push(json_body(response).await["insertedId"].clone());
    }
    assert_ne!(ids[0], ids[1]);

    let response = app
        .send(Request::get("/api/v1/services").body(Body::empty()).unwrap())
        .await;
    assert_eq!(json_body(response).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn create_requires_token() {
    let app = setup_test_app().await;

    let response = app
        .send(
            Request::post("/api/v1/add-new-service")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"name":"Airport Transfer"}"#))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .send(Request::get("/api/v1/services").body(Body::empty()).unwrap())
        .await;
    assert_eq!(json_body(response).await, json!([]));
}

#[tokio::test]
async fn tampered_token_returns_401() {
    let app = setup_test_app().await;
    let cookie = app.login("rider@riderelay.test").await;
    let tampered = format!("{cookie}x");

    let response = app
        .send(authed_request(
            "GET",
            "/api/v1/bookings?email=rider@riderelay.test",
            &tampered,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn update_merges_fields() {
    let app = setup_test_app().await;
    let cookie = app.login("ops@riderelay.test").await;

    let response = app
        .send(json_request(
            "POST",
            "/api/v1/add-new-service",
            &cookie,
            json!({ "a": 1, "b": 2 }),
        ))
        .await;
    let id = json_body(response).await["insertedId"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .send(json_request(
            "PUT",
            &format!("/api/v1/update-service/{id}"),
            &cookie,
            json!({ "b": 3, "c": 4 }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let ack = json_body(response).await;
    assert_eq!(ack["matchedCount"], 1);
    assert_eq!(ack["modifiedCount"], 1);

    let response = app
        .send(
            Request::get(format!("/api/v1/services/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(
        json_body(response).await,
        json!({ "_id": id, "a": 1, "b": 3, "c": 4 })
    );

    let response = app
        .send(json_request(
            "PUT",
            &format!("/api/v1/update-service/{id}"),
            &cookie,
            json!({ "b": null, "price": null }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["modifiedCount"], 1);

    let response = app
        .send(
            Request::get(format!("/api/v1/services/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(
        json_body(response).await,
        json!({ "_id": id, "a": 1, "b": null, "c": 4, "price": null })
    );
}

#[tokio::test]
async fn service_fields_are_stored_without_shape_checks() {
    let app = setup_test_app().await;
    let cookie = app.login("ops@riderelay.test").await;

    let response = app
        .send(json_request(
            "POST",
            "/api/v1/add-new-service",
            &cookie,
            json!({ "name": 5, "price": "40" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = json_body(response).await["insertedId"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .send(json_request(
            "PUT",
            &format!("/api/v1/update-service/{id}"),
            &cookie,
            json!({ "price": -5 }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .send(
            Request::get(format!("/api/v1/services/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(
        json_body(response).await,
        json!({ "_id": id, "name": 5, "price": -5 })
    );
}

#[tokio::test]
async fn update_of_unknown_id_matches_nothing() {
    let app = setup_test_app().await;
    let cookie = app.login("ops@riderelay.test").await;

    let response = app
        .send(json_request(
            "PUT",
            "/api/v1/update-service/6f1c1c52-3a43-4b4e-9a43-0d5c2f6b9a10",
            &cookie,
            json!({ "price": 10 }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let ack = json_body(response).await;
    assert_eq!(ack["matchedCount"], 0);
    assert_eq!(ack["modifiedCount"], 0);
}

#[tokio::test]
async fn delete_then_get_returns_404() {
    let app = setup_test_app().await;
    let cookie = app.login("ops@riderelay.test").await;

    let response = app
        .send(json_request(
            "POST",
            "/api/v1/add-new-service",
            &cookie,
            json!({ "name": "Shuttle", "price": 12 }),
        ))
        .await;
    let id = json_body(response).await["insertedId"]
        .as_str()
        .unwrap()
        .to_string();

    let delete_uri = format!("/api/v1/delete-service/{id}");
    let response = app.send(authed_request("DELETE", &delete_uri, &cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["deletedCount"], 1);

    let response = app
        .send(
            Request::get(format!("/api/v1/services/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "not_found");

    let response = app.send(authed_request("DELETE", &delete_uri, &cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["deletedCount"], 0);
}

#[tokio::test]
async fn malformed_id_returns_400() {
    let app = setup_test_app().await;
    let cookie = app.login("ops@riderelay.test").await;

    let response = app
        .send(authed_request("DELETE", "/api/v1/delete-booking/abc", &cookie))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "invalid_identifier");
}

#[tokio::test]
async fn services_sort_by_price() {
    let app = setup_test_app().await;
    let cookie = app.login("ops@riderelay.test").await;

    for (name, price) in [("Mid", json!(20)), ("High", json!(35.5)), ("Low", json!(5))] {
        app.send(json_request(
            "POST",
            "/api/v1/add-new-service",
            &cookie,
            json!({ "name": name, "price": price }),
        ))
        .await;
    }
    app.send(json_request(
        "POST",
        "/api/v1/add-new-service",
        &cookie,
        json!({ "name": "Unpriced" }),
    ))
    .await;

    let names = |json: serde_json::Value| -> Vec<String> {
        json.as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap().to_string())
            .collect()
    };

    let response = app
        .send(Request::get("/api/v1/services").body(Body::empty()).unwrap())
        .await;
    assert_eq!(
        names(json_body(response).await),
        ["Mid", "High", "Low", "Unpriced"]
    );

    let response = app
        .send(
            Request::get("/api/v1/services?sortBy=price&sortOrder=asc")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(
        names(json_body(response).await),
        ["Low", "Mid", "High", "Unpriced"]
    );

    let response = app
        .send(
            Request::get("/api/v1/services?sortBy=price&sortOrder=DESC")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(
        names(json_body(response).await),
        ["High", "Mid", "Low", "Unpriced"]
    );
}

#[tokio::test]
async fn bookings_are_scoped_to_caller() {
    let app = setup_test_app().await;
    let alice = app.login("alice@riderelay.test").await;
    let bob = app.login("bob@riderelay.test").await;

    for (cookie, email) in [(&alice, "alice@riderelay.test"), (&bob, "bob@riderelay.test")] {
        let response = app
            .send(json_request(
                "POST",
                "/api/v1/book-a-service",
                cookie,
                json!({ "email": email, "serviceId": "svc-1", "date": "2026-11-02" }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .send(authed_request(
            "GET",
            "/api/v1/bookings?email=alice@riderelay.test",
            &alice,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let bookings = json_body(response).await;
    let bookings = bookings.as_array().unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["email"], "alice@riderelay.test");
    assert_eq!(bookings[0]["serviceId"], "svc-1");

    let id = bookings[0]["_id"].as_str().unwrap();
    let response = app
        .send(authed_request("GET", &format!("/api/v1/bookings/{id}"), &alice))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["date"], "2026-11-02");
}

#[tokio::test]
async fn listing_other_callers_bookings_is_forbidden() {
    let app = setup_test_app().await;
    let alice = app.login("alice@riderelay.test").await;

    let response = app
        .send(authed_request(
            "GET",
            "/api/v1/bookings?email=bob@riderelay.test",
            &alice,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .send(authed_request("GET", "/api/v1/bookings", &alice))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn booking_update_and_delete() {
    let app = setup_test_app().await;
    let cookie = app.login("rider@riderelay.test").await;

    let response = app
        .send(json_request(
            "POST",
            "/api/v1/book-a-service",
            &cookie,
            json!({ "email": "rider@riderelay.test", "status": "pending" }),
        ))
        .await;
    let id = json_body(response).await["insertedId"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .send(json_request(
            "PUT",
            &format!("/api/v1/update-booking/{id}"),
            &cookie,
            json!({ "status": "confirmed" }),
        ))
        .await;
    assert_eq!(json_body(response).await["modifiedCount"], 1);

    let response = app
        .send(authed_request(
            "DELETE",
            &format!("/api/v1/delete-booking/{id}"),
            &cookie,
        ))
        .await;
    assert_eq!(json_body(response).await["deletedCount"], 1);

    let response = app
        .send(authed_request("GET", &format!("/api/v1/bookings/{id}"), &cookie))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_expires_cookie() {
    let app = setup_test_app().await;
    let cookie = app.login("rider@riderelay.test").await;

    let response = app
        .send(authed_request("POST", "/api/v1/auth/logout", &cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("token=;"));
    assert!(set_cookie.contains("Max-Age=0"));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, json!({ "type": "logout", "success": true }));
}

#[tokio::test]
async fn swagger_document_is_served() {
    let app = setup_test_app().await;

    let response = app
        .send(
            Request::get("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["info"]["title"], "RideRelay API");
}
