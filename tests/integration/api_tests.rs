//! API integration tests
//!
//! These run against a live server seeded with an admin account
//! (admin/Admin123!).

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an authenticated admin token
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "Admin123!"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Create a throwaway book, returning its id
async fn create_test_book(client: &Client, token: &str, title: &str) -> String {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "title": title,
            "author": "Test Author",
            "publisher": "Test Publisher",
            "isbn": "978-0-00-000000-0",
            "genre": "fiction",
            "published_date": "2020-01-01",
            "edition": 1,
            "price": "9.99"
        }))
        .send()
        .await
        .expect("Failed to create book");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse book response");
    body["book_id"].as_str().expect("No book_id").to_string()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "Admin123!"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["username"], "admin");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_register_rejects_weak_password() {
    let client = Client::new();

    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({
            "username": "weakling",
            "email": "weakling@example.com",
            "password": "short",
            "first_name": "Weak",
            "last_name": "Password"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_book_crud() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_test_book(&client, &token, "CRUD Book").await;

    // New books start unrated
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to get book");
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["rating"], 0);

    // Partial update leaves other fields alone
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&token)
        .json(&json!({ "price": "12.50" }))
        .send()
        .await
        .expect("Failed to update book");
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["title"], "CRUD Book");
    assert_eq!(body["price"], "12.50");

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to delete book");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to get book");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_book_create_requires_admin() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "No Auth",
            "author": "Nobody",
            "publisher": "Nowhere",
            "isbn": "978-0-00-000000-0",
            "genre": "fiction",
            "published_date": "2020-01-01",
            "edition": 1,
            "price": "9.99"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_review_updates_rating() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let book_id = create_test_book(&client, &token, "Reviewed Book").await;

    let response = client
        .post(format!("{}/books/{}/reviews", BASE_URL, book_id))
        .bearer_auth(&token)
        .json(&json!({ "rating": 5, "description": "Excellent" }))
        .send()
        .await
        .expect("Failed to submit review");
    assert_eq!(response.status(), 201);

    let body: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["rating"], 5);

    // Resubmitting replaces the previous review instead of adding one
    let response = client
        .post(format!("{}/books/{}/reviews", BASE_URL, book_id))
        .bearer_auth(&token)
        .json(&json!({ "rating": 2, "description": "On reflection" }))
        .send()
        .await
        .expect("Failed to resubmit review");
    assert_eq!(response.status(), 201);

    let reviews: Value = client
        .get(format!("{}/books/{}/reviews", BASE_URL, book_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reviews.as_array().unwrap().len(), 1);

    let body: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["rating"], 2);
}

#[tokio::test]
#[ignore]
async fn test_review_rejects_out_of_range_rating() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let book_id = create_test_book(&client, &token, "Badly Rated Book").await;

    let response = client
        .post(format!("{}/books/{}/reviews", BASE_URL, book_id))
        .bearer_auth(&token)
        .json(&json!({ "rating": 6 }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_return_lifecycle() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let book_id = create_test_book(&client, &token, "Borrowed Book").await;

    // Borrow
    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to borrow");
    assert_eq!(response.status(), 201);
    let record: Value = response.json().await.unwrap();
    assert_eq!(record["status"], "borrowed");
    let borrow_id = record["borrow_id"].as_str().unwrap().to_string();

    // The book no longer shows as available
    let available: Value = client
        .get(format!("{}/books/available", BASE_URL))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(available
        .as_array()
        .unwrap()
        .iter()
        .all(|b| b["book_id"] != book_id.as_str()));

    // Return on time: no fine
    let response = client
        .post(format!("{}/borrows/{}/return", BASE_URL, borrow_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to return");
    assert!(response.status().is_success());
    let record: Value = response.json().await.unwrap();
    assert_eq!(record["status"], "returned");
    assert_eq!(record["fine_amount"], "0");

    // Returning again is rejected
    let response = client
        .post(format!("{}/borrows/{}/return", BASE_URL, borrow_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_borrow_conflict_for_second_user() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let book_id = create_test_book(&client, &token, "Contested Book").await;

    // Second account
    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({
            "username": "contender",
            "email": "contender@example.com",
            "password": "Contend3r!",
            "first_name": "Con",
            "last_name": "Tender"
        }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(response.status(), 201);

    let body: Value = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": "contender", "password": "Contend3r!" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let other_token = body["token"].as_str().unwrap().to_string();

    // First borrower wins
    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to borrow");
    assert_eq!(response.status(), 201);

    // Second borrower is refused while the book is out
    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .bearer_auth(&other_token)
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}
