// tests/api_tests.rs

use reqwest::{Client, StatusCode, header, redirect};
use social_network::{config::Config, db, routes, state::AppState, store::UserRepository};

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    // 1. Create an in-memory database with the schema applied
    let pool = db::connect_in_memory()
        .await
        .expect("Failed to open in-memory database");

    db::migrate(&pool).await.expect("Failed to migrate database");

    // 2. Create test configuration and state
    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        session_key: "test_secret_for_integration_tests".to_string(),
        session_ttl: 600,
        rust_log: "error".to_string(),
    };

    let state = AppState {
        repo: UserRepository::new(pool),
        config,
    };

    // 3. Create the router with the app state
    let app = routes::create_router(state);

    // 4. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 5. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// Client that reports redirects instead of following them.
fn client() -> Client {
    Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .unwrap()
}

async fn signup(client: &Client, address: &str, email: &str, name: &str) -> reqwest::Response {
    client
        .post(format!("{}/signup", address))
        .form(&[
            ("email", email),
            ("password", "password123"),
            ("name", name),
            ("surname", "Tester"),
            ("age", "30"),
            ("sex", "f"),
            ("interests", "hiking"),
            ("city", "Berlin"),
        ])
        .send()
        .await
        .expect("Failed to execute request")
}

/// Logs in and returns (user id, `Cookie` header value).
async fn login(client: &Client, address: &str, email: &str) -> (i64, String) {
    let response = client
        .post(format!("{}/login", address))
        .form(&[("email", email), ("password", "password123")])
        .send()
        .await
        .expect("Login failed");

    assert_eq!(response.status(), StatusCode::FOUND);

    let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();
    let id = location
        .strip_prefix("/users/")
        .and_then(|id| id.parse::<i64>().ok())
        .expect("login should redirect to the user page");

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    (id, cookie)
}

async fn register_and_login(client: &Client, address: &str, email: &str, name: &str) -> (i64, String) {
    let response = signup(client, address, email, name).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    login(client, address, email).await
}

#[tokio::test]
async fn unknown_path_404() {
    let address = spawn_app().await;

    let response = client()
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let address = spawn_app().await;

    let response = client().get(&address).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let request_id = response.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(request_id).is_ok());
}

#[tokio::test]
async fn signup_redirects_to_login() {
    let address = spawn_app().await;

    let response = signup(&client(), &address, "ann@x.com", "Ann").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn signup_rejects_non_numeric_age() {
    let address = spawn_app().await;

    let response = client()
        .post(format!("{}/signup", address))
        .form(&[
            ("email", "ann@x.com"),
            ("password", "password123"),
            ("age", "thirty"),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "wrong age format, must be number");
}

#[tokio::test]
async fn signup_rejects_invalid_email_and_duplicates() {
    let address = spawn_app().await;
    let client = client();

    let response = signup(&client, &address, "not-an-email", "Ann").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    signup(&client, &address, "ann@x.com", "Ann").await;
    let response = signup(&client, &address, "ann@x.com", "Ann again").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("ann@x.com"));
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let address = spawn_app().await;
    let client = client();
    signup(&client, &address, "ann@x.com", "Ann").await;

    for (email, password) in [("ann@x.com", "wrong"), ("ghost@x.com", "password123")] {
        let response = client
            .post(format!("{}/login", address))
            .form(&[("email", email), ("password", password)])
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Incorrect email or password");
    }
}

#[tokio::test]
async fn profile_never_exposes_credentials() {
    let address = spawn_app().await;
    let client = client();
    let (id, _) = register_and_login(&client, &address, "ann@x.com", "<b onclick=\"x()\">Ann</b>").await;

    let user: serde_json::Value = client
        .get(format!("{}/users/{}", address, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(user["id"], id);
    assert_eq!(user["email"], "ann@x.com");
    assert_eq!(user["name"], "<b>Ann</b>");
    assert!(user.get("password").is_none());
    assert!(user.get("encrypted_password").is_none());
    assert!(user["friendship"].is_null());

    let response = client
        .get(format!("{}/users/{}", address, id + 100))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn main_page_lists_users_by_name() {
    let address = spawn_app().await;
    let client = client();
    for (email, name) in [("c@x.com", "Cid"), ("a@x.com", "Ann"), ("b@x.com", "Bob")] {
        signup(&client, &address, email, name).await;
    }

    let users: Vec<serde_json::Value> = client
        .get(format!("{}/?limit=2", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let names: Vec<&str> = users.iter().map(|u| u["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["Ann", "Bob"]);
    assert!(users[0].get("email").is_none());
}

#[tokio::test]
async fn private_routes_require_session() {
    let address = spawn_app().await;
    let client = client();

    for path in ["/users/1/friend_request", "/users/1/accept_friend_request", "/users/1/edit"] {
        let response = client
            .post(format!("{}{}", address, path))
            .header(header::COOKIE, "social_session=forged.token.value")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{path}");
    }

    let response = client
        .get(format!("{}/users/1/requests", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Not authenticated");
}

#[tokio::test]
async fn friend_request_flow() {
    let address = spawn_app().await;
    let client = client();
    let (ann, ann_cookie) = register_and_login(&client, &address, "ann@x.com", "Ann").await;
    let (bob, bob_cookie) = register_and_login(&client, &address, "bob@x.com", "Bob").await;

    // 1. Ann sends a request to Bob
    let response = client
        .post(format!("{}/users/{}/friend_request", address, bob))
        .header(header::COOKIE, &ann_cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // 2. Sending it again conflicts
    let response = client
        .post(format!("{}/users/{}/friend_request", address, bob))
        .header(header::COOKIE, &ann_cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // 3. Bob sees the pending request; Ann may not read Bob's requests
    let requests: Vec<serde_json::Value> = client
        .get(format!("{}/users/{}/requests", address, bob))
        .header(header::COOKIE, &bob_cookie)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["id"], ann);

    let response = client
        .get(format!("{}/users/{}/requests", address, bob))
        .header(header::COOKIE, &ann_cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // 4. Bob's profile shows the pending state to Ann
    let profile: serde_json::Value = client
        .get(format!("{}/users/{}", address, bob))
        .header(header::COOKIE, &ann_cookie)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["friendship"], "pending");

    // 5. Bob accepts
    let response = client
        .post(format!("{}/users/{}/accept_friend_request", address, ann))
        .header(header::COOKIE, &bob_cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], format!("/users/{}", bob));

    // 6. Both friend lists are updated
    for (user, friend) in [(ann, bob), (bob, ann)] {
        let friends: Vec<serde_json::Value> = client
            .get(format!("{}/users/{}/friends", address, user))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0]["id"], friend);
    }
}

#[tokio::test]
async fn sender_also_sees_and_may_accept_pending_pair() {
    let address = spawn_app().await;
    let client = client();
    let (ann, ann_cookie) = register_and_login(&client, &address, "ann@x.com", "Ann").await;
    let (bob, _) = register_and_login(&client, &address, "bob@x.com", "Bob").await;

    client
        .post(format!("{}/users/{}/friend_request", address, bob))
        .header(header::COOKIE, &ann_cookie)
        .send()
        .await
        .unwrap();

    let requests: Vec<serde_json::Value> = client
        .get(format!("{}/users/{}/requests", address, ann))
        .header(header::COOKIE, &ann_cookie)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["id"], bob);

    let response = client
        .post(format!("{}/users/{}/accept_friend_request", address, bob))
        .header(header::COOKIE, &ann_cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);

    let friends: Vec<serde_json::Value> = client
        .get(format!("{}/users/{}/friends", address, bob))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(friends.len(), 1);
    assert_eq!(friends[0]["id"], ann);
}

#[tokio::test]
async fn accept_without_request_is_not_found() {
    let address = spawn_app().await;
    let client = client();
    let (ann, _) = register_and_login(&client, &address, "ann@x.com", "Ann").await;
    let (_, bob_cookie) = register_and_login(&client, &address, "bob@x.com", "Bob").await;

    let response = client
        .post(format!("{}/users/{}/accept_friend_request", address, ann))
        .header(header::COOKIE, &bob_cookie)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn edit_profile_is_owner_only() {
    let address = spawn_app().await;
    let client = client();
    let (ann, ann_cookie) = register_and_login(&client, &address, "ann@x.com", "Ann").await;
    let (bob, _) = register_and_login(&client, &address, "bob@x.com", "Bob").await;

    let form = [
        ("name", "Annie"),
        ("surname", "Smith"),
        ("age", "31"),
        ("sex", "f"),
        ("interests", "chess"),
        ("city", "Oslo"),
    ];

    let response = client
        .post(format!("{}/users/{}/edit", address, bob))
        .header(header::COOKIE, &ann_cookie)
        .form(&form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .post(format!("{}/users/{}/edit", address, ann))
        .header(header::COOKIE, &ann_cookie)
        .form(&form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);

    let user: serde_json::Value = client
        .get(format!("{}/users/{}", address, ann))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(user["name"], "Annie");
    assert_eq!(user["age"], 31);
    assert_eq!(user["city"], "Oslo");
    assert_eq!(user["email"], "ann@x.com");

    // The old password still works since none was supplied
    login(&client, &address, "ann@x.com").await;
}

#[tokio::test]
async fn logout_clears_cookie() {
    let address = spawn_app().await;

    let response = client()
        .post(format!("{}/logout", address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("social_session=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}
