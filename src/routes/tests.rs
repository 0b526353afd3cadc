use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::{Value, json};
use tower::ServiceExt;

use super::router;
use crate::{
    AppState,
    auth::{self, TokenKind},
    config::Config,
    db,
    entities::{film, film_rating, user},
    models::Role,
    store::{
        accounts::{self, NewAccount},
        authors::{self, AuthorProfile},
        films::{self, FilmFields},
    },
};

struct Harness {
    app: Router,
    state: Arc<AppState>,
}

impl Harness {
    async fn new() -> Self {
        let config = Config {
            addr: "127.0.0.1:0".parse().unwrap(),
            database_url: "sqlite::memory:".to_string(),
            tmdb_access_token: None,
            tmdb_base_url: "http://tmdb.invalid".to_string(),
            tmdb_rps: 4,
            jwt_secret: "router-test-secret".to_string(),
            access_token_ttl_minutes: 5,
            refresh_token_ttl_days: 1,
        };
        let state = Arc::new(AppState::new(Arc::new(config), db::memory().await));
        Self { app: router(state.clone()), state }
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    async fn register(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.call(
            Method::POST,
            "/register",
            None,
            Some(json!({
                "first_name": "Agnes",
                "last_name": "Varda",
                "email": email,
                "password": password,
            })),
        )
        .await
    }

    /// Registers and logs in a spectator, returning the login payload.
    async fn spectator(&self, email: &str) -> Value {
        let (status, _) = self.register(email, "cleo5a7").await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "seven characters are too short");

        let (status, _) = self.register(email, "cleo5a7pm").await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .call(
                Method::POST,
                "/login",
                None,
                Some(json!({ "email": email, "password": "cleo5a7pm" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    async fn staff_token(&self) -> String {
        let admin = accounts::create(
            &self.state.db,
            NewAccount {
                email: "admin@example.com".to_string(),
                username: "admin@example.com".to_string(),
                first_name: "Admin".to_string(),
                last_name: String::new(),
                role: Role::Author,
                password_hash: auth::hash_password("admin1234").unwrap(),
                date_of_birth: None,
                is_staff: true,
            },
        )
        .await
        .unwrap();
        self.state.tokens.issue(&admin, TokenKind::Access).unwrap()
    }

    async fn film(&self, tmdb_id: i32, title: &str, release_date: &str) -> film::Model {
        let fields = FilmFields {
            title: title.to_string(),
            description: String::new(),
            release_date: Some(release_date.to_string()),
            budget: None,
            revenue: None,
        };
        films::upsert_by_tmdb_id(&self.state.db, tmdb_id, fields).await.unwrap().0
    }

    async fn author(&self, tmdb_id: i32, username: &str) -> i32 {
        let account = accounts::create(
            &self.state.db,
            NewAccount {
                email: format!("{username}@authors.example.com"),
                username: username.to_string(),
                first_name: "Jacques".to_string(),
                last_name: "Demy".to_string(),
                role: Role::Author,
                password_hash: accounts::UNUSABLE_PASSWORD.to_string(),
                date_of_birth: None,
                is_staff: false,
            },
        )
        .await
        .unwrap();
        let profile = AuthorProfile {
            popularity: 3.5,
            website: None,
            death_date: None,
            gender: 2,
            department: Some("Directing".to_string()),
        };
        authors::upsert_by_tmdb_id(&self.state.db, tmdb_id, account.id, profile)
            .await
            .unwrap()
            .0
            .user_id
    }
}

fn access(login: &Value) -> String {
    login["access"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn registered_spectator_can_rate_a_film_and_re_rating_overwrites() {
    let h = Harness::new().await;
    let login = h.spectator("cleo@example.com").await;
    assert_eq!(login["user"]["role"], "SPECTATOR");
    let token = access(&login);
    let film = h.film(550, "Fight Club", "1999-10-15").await;
    let uri = format!("/films/{}/rate", film.id);

    let (status, first) =
        h.call(Method::POST, &uri, Some(&token), Some(json!({ "note": 3 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["rating"]["note"], 3);
    assert_eq!(first["rating"]["film"], film.id);

    let (status, second) =
        h.call(Method::POST, &uri, Some(&token), Some(json!({ "note": 5 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["rating"]["note"], 5);
    assert_eq!(second["rating"]["id"], first["rating"]["id"]);

    let (status, body) =
        h.call(Method::POST, &uri, Some(&token), Some(json!({ "note": 6 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["note"].is_array());

    assert_eq!(film_rating::Entity::find().count(&h.state.db).await.unwrap(), 1);
}

#[tokio::test]
async fn duplicate_email_and_missing_fields_are_reported_per_field() {
    let h = Harness::new().await;
    h.spectator("cleo@example.com").await;

    let (status, body) = h.register("Cleo@Example.com", "another1pass").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"]["email"][0], "Email already exists.");

    let (status, body) =
        h.call(Method::POST, "/register", None, Some(json!({ "password": "abc" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["first_name"].is_array());
    assert!(body["errors"]["email"].is_array());
    assert!(body["errors"]["password"].is_array());
}

#[tokio::test]
async fn wrong_password_is_unauthorized_and_staff_cannot_use_login() {
    let h = Harness::new().await;
    h.spectator("cleo@example.com").await;

    let (status, _) = h
        .call(
            Method::POST,
            "/login",
            None,
            Some(json!({ "email": "cleo@example.com", "password": "wrong1pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    h.staff_token().await;
    let (status, body) = h
        .call(
            Method::POST,
            "/login",
            None,
            Some(json!({ "email": "admin@example.com", "password": "admin1234" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Only spectators can login for now");
}

#[tokio::test]
async fn films_by_year_is_staff_only() {
    let h = Harness::new().await;
    h.film(550, "Fight Club", "1999-10-15").await;
    h.film(603, "The Matrix", "1999-03-30").await;
    h.film(13, "Forrest Gump", "1994-06-23").await;

    let (status, _) = h.call(Method::GET, "/films/year/1999", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let spectator = access(&h.spectator("cleo@example.com").await);
    let (status, _) = h.call(Method::GET, "/films/year/1999", Some(&spectator), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let staff = h.staff_token().await;
    let (status, body) = h.call(Method::GET, "/films/year/1999", Some(&staff), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = h.call(Method::GET, "/films", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn staff_can_patch_a_film() {
    let h = Harness::new().await;
    let film = h.film(550, "Fight Club", "1999-10-15").await;
    let staff = h.staff_token().await;
    let uri = format!("/films/{}", film.id);

    let (status, body) = h
        .call(Method::PATCH, &uri, Some(&staff), Some(json!({ "status": "ARCHIVED", "budget": 63 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ARCHIVED");
    assert_eq!(body["budget"], 63);
    assert_eq!(body["title"], "Fight Club");

    let (status, _) = h.call(Method::GET, "/films/9999", Some(&staff), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn author_with_films_cannot_be_deleted() {
    let h = Harness::new().await;
    let staff = h.staff_token().await;
    let film = h.film(550, "Fight Club", "1999-10-15").await;
    let credited = h.author(7, "tmdb_7").await;
    let idle = h.author(8, "tmdb_8").await;
    films::link_author(&h.state.db, film.id, credited).await.unwrap();

    let (status, body) =
        h.call(Method::DELETE, &format!("/authors/{credited}"), Some(&staff), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Cannot delete the author, they have 1 films");

    let (status, _) = h.call(Method::DELETE, &format!("/authors/{idle}"), Some(&staff), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(user::Entity::find_by_id(idle).one(&h.state.db).await.unwrap().is_none());
    assert!(authors::find_by_id(&h.state.db, credited).await.unwrap().is_some());

    let (status, body) = h.call(Method::GET, "/authors", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["films_count"], 1);
}

#[tokio::test]
async fn favorites_are_idempotent() {
    let h = Harness::new().await;
    let token = access(&h.spectator("cleo@example.com").await);
    let film = h.film(550, "Fight Club", "1999-10-15").await;
    let add = format!("/favorites/films/{}/add", film.id);

    for _ in 0..2 {
        let (status, _) = h.call(Method::POST, &add, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (_, body) = h.call(Method::GET, "/favorites/films", Some(&token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let remove = format!("/favorites/films/{}/remove", film.id);
    let (status, _) = h.call(Method::DELETE, &remove, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = h.call(Method::GET, "/favorites/films", Some(&token), None).await;
    assert!(body.as_array().unwrap().is_empty());

    let (status, _) = h.call(Method::POST, "/favorites/films/9999/add", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_revokes_the_refresh_token() {
    let h = Harness::new().await;
    let login = h.spectator("cleo@example.com").await;
    let token = access(&login);
    let refresh = login["refresh"].as_str().unwrap().to_string();

    let (status, body) =
        h.call(Method::POST, "/refresh", None, Some(json!({ "refresh": refresh }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access"].is_string());

    let (status, body) =
        h.call(Method::POST, "/logout", Some(&token), Some(json!({ "refresh": refresh }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "Successfully logged out.");

    let (status, _) =
        h.call(Method::POST, "/logout", Some(&token), Some(json!({ "refresh": refresh }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
        h.call(Method::POST, "/refresh", None, Some(json!({ "refresh": refresh }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
