//! API integration tests
//!
//! These run against a live server and database. Start the server with the
//! default config, then: cargo test -- --ignored

use chrono::{Duration, NaiveDate, Utc};
use reqwest::Client;
use serde_json::{json, Value};

use biblion_server::models::principal::{Claims, Role};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Secret the server verifies bearer tokens with
fn jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| "change-this-secret-in-production".to_string())
}

/// Mint a token the way the identity provider would
fn token_for(user_id: i32, email: &str, roles: Vec<Role>) -> String {
    Claims::new(user_id, email, roles, 3600)
        .create_token(&jwt_secret())
        .expect("Failed to sign token")
}

fn librarian_token() -> String {
    token_for(9001, "librarian@biblion.example", vec![Role::Librarian])
}

fn moderator_token() -> String {
    token_for(9002, "moderator@biblion.example", vec![Role::Moderator])
}

fn reader_token(user_id: i32) -> String {
    token_for(
        user_id,
        &format!("reader{}@biblion.example", user_id),
        vec![Role::Reader],
    )
}

/// Suffix for unique columns so reruns do not collide
fn unique_suffix() -> String {
    format!("{}", Utc::now().timestamp_micros())
}

fn parse_date(value: &Value) -> NaiveDate {
    NaiveDate::parse_from_str(value.as_str().expect("expected a date string"), "%Y-%m-%d")
        .expect("Failed to parse date")
}

/// Register a borrower profile through the directory endpoint
async fn seed_user(client: &Client, user_id: i32) {
    let response = client
        .put(format!("{}/users/{}", BASE_URL, user_id))
        .header("Authorization", format!("Bearer {}", moderator_token()))
        .json(&json!({
            "email": format!("reader{}@biblion.example", user_id),
            "first_name": "Test",
            "last_name": format!("Reader{}", user_id)
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(
        response.status().is_success(),
        "seeding user {} failed: {}",
        user_id,
        response.status()
    );
}

/// Create an author and return its id
async fn create_author(client: &Client, token: &str) -> i64 {
    let response = client
        .post(format!("{}/authors", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "first_name": "Test",
            "last_name": format!("Author{}", unique_suffix()),
            "birthday": "1970-01-01",
            "country": "Testland"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No author ID")
}

/// Create a book with the given copy count and return its id
async fn create_book(client: &Client, token: &str, copies: i32) -> i64 {
    let author_id = create_author(client, token).await;
    let isbn = format!("978{:010}", Utc::now().timestamp_micros() % 10_000_000_000);

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Integration Test Book",
            "isbn": isbn,
            "author_id": author_id,
            "published_year": 2020,
            "total_copies": copies,
            "available_copies": copies
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No book ID")
}

async fn post_loan(client: &Client, token: &str, user_id: i32, book_id: i64) -> reqwest::Response {
    client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "user_id": user_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request")
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
async fn test_missing_token_is_unauthorized() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_catalog_roundtrip() {
    let client = Client::new();
    let librarian = librarian_token();

    let author_id = create_author(&client, &librarian).await;

    let genre_name = format!("Genre {}", unique_suffix());
    let response = client
        .post(format!("{}/genres", BASE_URL))
        .header("Authorization", format!("Bearer {}", librarian))
        .json(&json!({ "name": genre_name, "description": "Created by tests" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let genre: Value = response.json().await.expect("Failed to parse response");
    let genre_id = genre["id"].as_i64().expect("No genre ID");

    let isbn = format!("978{:010}", Utc::now().timestamp_micros() % 10_000_000_000);
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", librarian))
        .json(&json!({
            "title": "Catalog Roundtrip",
            "isbn": isbn,
            "author_id": author_id,
            "published_year": 1999,
            "genre_ids": [genre_id]
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let book: Value = response.json().await.expect("Failed to parse response");
    let book_id = book["id"].as_i64().expect("No book ID");

    // Copy counts default to one when omitted
    assert_eq!(book["total_copies"], 1);
    assert_eq!(book["available_copies"], 1);

    // Any authenticated principal may read the catalog
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", reader_token(9190)))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["author_name"].is_string());
    let genres = body["genres"].as_array().expect("No genres array");
    assert!(genres.iter().any(|g| g == &json!(genre_name)));

    let response = client
        .patch(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", librarian))
        .json(&json!({ "title": "Catalog Roundtrip, 2nd ed." }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["title"], "Catalog Roundtrip, 2nd ed.");

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_catalog_writes_require_librarian() {
    let client = Client::new();

    let response = client
        .post(format!("{}/authors", BASE_URL))
        .header("Authorization", format!("Bearer {}", reader_token(9191)))
        .json(&json!({ "first_name": "Not", "last_name": "Allowed" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .post(format!("{}/genres", BASE_URL))
        .header("Authorization", format!("Bearer {}", moderator_token()))
        .json(&json!({ "name": "Not allowed either" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_book_validation_rejected_at_boundary() {
    let client = Client::new();
    let librarian = librarian_token();
    let author_id = create_author(&client, &librarian).await;

    // Wrong ISBN prefix
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", librarian))
        .json(&json!({
            "title": "Bad ISBN",
            "isbn": "1234567890123",
            "author_id": author_id,
            "published_year": 2001
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["details"]["isbn"].is_array());

    // Too short
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", librarian))
        .json(&json!({
            "title": "Short ISBN",
            "isbn": "97851709051",
            "author_id": author_id,
            "published_year": 2001
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // More copies on the shelf than exist
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", librarian))
        .json(&json!({
            "title": "Impossible Stock",
            "isbn": format!("979{:010}", Utc::now().timestamp_micros() % 10_000_000_000),
            "author_id": author_id,
            "published_year": 2001,
            "total_copies": 2,
            "available_copies": 5
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_book_search_matches_author_last_name() {
    let client = Client::new();
    let librarian = librarian_token();

    let last_name = format!("Gogol{}", unique_suffix());
    let response = client
        .post(format!("{}/authors", BASE_URL))
        .header("Authorization", format!("Bearer {}", librarian))
        .json(&json!({
            "first_name": "Nikolai",
            "last_name": last_name,
            "birthday": "1809-04-01",
            "country": "Russia"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let author: Value = response.json().await.expect("Failed to parse response");
    let author_id = author["id"].as_i64().expect("No author ID");

    let title = format!("Dead Souls {}", unique_suffix());
    let isbn = format!("978{:010}", Utc::now().timestamp_micros() % 10_000_000_000);
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", librarian))
        .json(&json!({
            "title": title,
            "isbn": isbn,
            "author_id": author_id,
            "published_year": 1842
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let book: Value = response.json().await.expect("Failed to parse response");
    let book_id = book["id"].as_i64().expect("No book ID");

    // Search reaches the author column, case-insensitively
    let response = client
        .get(format!(
            "{}/books?search={}",
            BASE_URL,
            last_name.to_lowercase()
        ))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["id"].as_i64(), Some(book_id));

    // And still matches titles
    let response = client
        .get(format!(
            "{}/books?search={}",
            BASE_URL,
            title.replace(' ', "%20")
        ))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["id"].as_i64(), Some(book_id));
}

#[tokio::test]
#[ignore]
async fn test_book_stock_filter() {
    let client = Client::new();
    let librarian = librarian_token();

    seed_user(&client, 9109).await;
    let book_id = create_book(&client, &librarian, 1).await;

    // Pin the list queries to this book via its ISBN
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let isbn = body["isbn"].as_str().expect("No ISBN").to_string();

    let response = client
        .get(format!("{}/books?isbn={}&available=true", BASE_URL, isbn))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total"], 1);

    assert_eq!(
        post_loan(&client, &librarian, 9109, book_id).await.status(),
        201
    );

    // The last copy is lent out, so the stock filters swap sides
    let response = client
        .get(format!("{}/books?isbn={}&available=true", BASE_URL, isbn))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total"], 0);

    let response = client
        .get(format!("{}/books?isbn={}&available=false", BASE_URL, isbn))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["id"].as_i64(), Some(book_id));
}

#[tokio::test]
#[ignore]
async fn test_loan_lifecycle_and_stock() {
    let client = Client::new();
    let librarian = librarian_token();

    seed_user(&client, 9101).await;
    seed_user(&client, 9102).await;
    let book_id = create_book(&client, &librarian, 1).await;

    // Checkout takes the only copy
    let response = post_loan(&client, &librarian, 9101, book_id).await;
    assert_eq!(response.status(), 201);
    let loan: Value = response.json().await.expect("Failed to parse response");
    let loan_id = loan["id"].as_i64().expect("No loan ID");
    assert_eq!(loan["renewals_count"], 0);
    assert!(loan["return_date"].is_null());

    // Due two weeks after checkout
    let loan_date = parse_date(&loan["loan_date"]);
    let due_date = parse_date(&loan["due_date"]);
    assert_eq!(due_date - loan_date, Duration::days(14));

    // The shelf is now empty
    let response = post_loan(&client, &librarian, 9102, book_id).await;
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "OutOfStock");

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["available_copies"], 0);

    // Return puts the copy back
    let response = client
        .patch(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["return_date"].is_string());
    let return_date = body["return_date"].clone();

    // Returning again changes nothing
    let response = client
        .patch(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["return_date"], return_date);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["available_copies"], 1);

    // Now the second borrower can take it
    let response = post_loan(&client, &librarian, 9102, book_id).await;
    assert_eq!(response.status(), 201);
}

#[tokio::test]
#[ignore]
async fn test_return_tolerates_administrative_restock() {
    let client = Client::new();
    let librarian = librarian_token();

    seed_user(&client, 9108).await;
    let book_id = create_book(&client, &librarian, 1).await;

    let response = post_loan(&client, &librarian, 9108, book_id).await;
    assert_eq!(response.status(), 201);
    let loan: Value = response.json().await.expect("Failed to parse response");
    let loan_id = loan["id"].as_i64().expect("No loan ID");

    // A manual catalog edit puts the lent copy back on the shelf
    let response = client
        .patch(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", librarian))
        .json(&json!({ "available_copies": 1 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    // The return completes anyway and the counter stays at the cap
    let response = client
        .patch(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["return_date"].is_string());

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["available_copies"], 1);
    assert_eq!(body["total_copies"], 1);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_active_loan_rejected() {
    let client = Client::new();
    let librarian = librarian_token();

    seed_user(&client, 9101).await;
    let book_id = create_book(&client, &librarian, 3).await;

    let response = post_loan(&client, &librarian, 9101, book_id).await;
    assert_eq!(response.status(), 201);

    let response = post_loan(&client, &librarian, 9101, book_id).await;
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "DuplicateActiveLoan");

    // The failed attempt must not touch availability
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["available_copies"], 2);
}

#[tokio::test]
#[ignore]
async fn test_renewal_extends_until_cap() {
    let client = Client::new();
    let librarian = librarian_token();
    let reader = reader_token(9103);

    seed_user(&client, 9103).await;
    let book_id = create_book(&client, &librarian, 1).await;

    let response = post_loan(&client, &librarian, 9103, book_id).await;
    assert_eq!(response.status(), 201);
    let loan: Value = response.json().await.expect("Failed to parse response");
    let loan_id = loan["id"].as_i64().expect("No loan ID");
    let mut due = parse_date(&loan["due_date"]);

    for renewal in 1..=3 {
        let response = client
            .patch(format!("{}/loans/{}/renew", BASE_URL, loan_id))
            .header("Authorization", format!("Bearer {}", reader))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["renewals_count"], renewal);

        let new_due = parse_date(&body["due_date"]);
        assert_eq!(new_due - due, Duration::days(14));
        due = new_due;
    }

    // The fourth attempt hits the ceiling
    let response = client
        .patch(format!("{}/loans/{}/renew", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", reader))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "RenewalLimitExceeded");

    // The refused attempt leaves the loan untouched
    let response = client
        .get(format!("{}/loans/{}", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", reader))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["renewals_count"], 3);
    assert_eq!(parse_date(&body["due_date"]), due);
}

#[tokio::test]
#[ignore]
async fn test_renewal_role_and_ownership() {
    let client = Client::new();
    let librarian = librarian_token();

    seed_user(&client, 9103).await;
    let book_id = create_book(&client, &librarian, 1).await;

    let response = post_loan(&client, &librarian, 9103, book_id).await;
    assert_eq!(response.status(), 201);
    let loan: Value = response.json().await.expect("Failed to parse response");
    let loan_id = loan["id"].as_i64().expect("No loan ID");

    // Renewals are the borrower's move, not the desk's
    let response = client
        .patch(format!("{}/loans/{}/renew", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    // Another reader cannot even see this loan
    let foreign = reader_token(9104);
    let response = client
        .patch(format!("{}/loans/{}/renew", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", foreign))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    let response = client
        .get(format!("{}/loans/{}", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", foreign))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_reader_sees_only_own_loans() {
    let client = Client::new();
    let librarian = librarian_token();

    seed_user(&client, 9105).await;
    seed_user(&client, 9106).await;

    let first_book = create_book(&client, &librarian, 1).await;
    let second_book = create_book(&client, &librarian, 1).await;
    assert_eq!(
        post_loan(&client, &librarian, 9105, first_book).await.status(),
        201
    );
    assert_eq!(
        post_loan(&client, &librarian, 9106, second_book).await.status(),
        201
    );

    // The reader's list is scoped to their own loans
    let response = client
        .get(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", reader_token(9105)))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    let items = body["items"].as_array().expect("No items array");
    assert!(!items.is_empty());
    assert!(items.iter().all(|loan| loan["user_id"] == 9105));

    // The librarian can filter across all borrowers
    let response = client
        .get(format!("{}/loans?user_id=9106&active=true", BASE_URL))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    let items = body["items"].as_array().expect("No items array");
    assert!(!items.is_empty());
    assert!(items.iter().all(|loan| loan["user_id"] == 9106));
}

#[tokio::test]
#[ignore]
async fn test_reader_cannot_operate_the_desk() {
    let client = Client::new();
    let librarian = librarian_token();
    let reader = reader_token(9101);

    seed_user(&client, 9101).await;
    let book_id = create_book(&client, &librarian, 1).await;

    // Borrowing is requested at the desk, not self-service
    let response = post_loan(&client, &reader, 9101, book_id).await;
    assert_eq!(response.status(), 403);

    let response = post_loan(&client, &librarian, 9101, book_id).await;
    assert_eq!(response.status(), 201);
    let loan: Value = response.json().await.expect("Failed to parse response");
    let loan_id = loan["id"].as_i64().expect("No loan ID");

    // Returns and deletions are desk work too, even on the reader's own loan
    let response = client
        .patch(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", reader))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .delete(format!("{}/loans/{}", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", reader))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_user_directory_access() {
    let client = Client::new();
    let librarian = librarian_token();

    let response = client
        .get(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", reader_token(9101)))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .get(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());

    // Profile writes belong to moderators
    let payload = json!({ "email": "reader9107@biblion.example" });
    let response = client
        .put(format!("{}/users/9107", BASE_URL))
        .header("Authorization", format!("Bearer {}", librarian))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .put(format!("{}/users/9107", BASE_URL))
        .header("Authorization", format!("Bearer {}", moderator_token()))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], "reader9107@biblion.example");
    assert_eq!(body["is_active"], true);

    // Deactivation flags the profile instead of deleting it
    let response = client
        .delete(format!("{}/users/9107", BASE_URL))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .delete(format!("{}/users/9107", BASE_URL))
        .header("Authorization", format!("Bearer {}", moderator_token()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/users/9107", BASE_URL))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["is_active"], false);
}

#[tokio::test]
#[ignore]
async fn test_pagination_caps_page_size() {
    let client = Client::new();
    let librarian = librarian_token();

    for _ in 0..3 {
        create_author(&client, &librarian).await;
    }

    let response = client
        .get(format!("{}/authors?page=1&page_size=2", BASE_URL))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 2);
    assert!(body["items"].as_array().expect("No items array").len() <= 2);
    assert!(body["total"].as_i64().expect("No total") >= 3);

    // Oversized requests are clamped to the maximum
    let response = client
        .get(format!("{}/authors?page_size=500", BASE_URL))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["page_size"], 50);
}
