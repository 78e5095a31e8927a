use api::Config;
use payloads::requests::CustomerEmail;
use payloads::{ClientError, PageRequest};
use query::hooks::{use_login, use_logout, use_register, use_rentals};
use query::{AuthState, QueryError};
use reqwest::StatusCode;

use test_helpers::{assert_query_status_code, spawn_app, spawn_app_with};

#[tokio::test]
async fn register_logs_the_client_in() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let auth = use_register(&app.query)
        .mutate(CustomerEmail::new("a@b.com"))
        .await?;
    assert_eq!(auth.email, "a@b.com");
    assert!(!auth.token.is_empty());
    assert_eq!(
        app.query.auth_state(),
        AuthState::LoggedIn {
            email: "a@b.com".into()
        }
    );
    assert_eq!(app.query.current_email().as_deref(), Some("a@b.com"));

    // the token is sent with later requests
    use_rentals(&app.query, PageRequest::first(5)).fetch().await?;

    Ok(())
}

#[tokio::test]
async fn register_without_auth_header_fails() -> anyhow::Result<()> {
    let app = spawn_app_with(Config {
        issue_auth_header: false,
        ..Config::default()
    })
    .await;

    let register = use_register(&app.query);
    let result = register.mutate(CustomerEmail::new("a@b.com")).await;
    let Err(e) = result else {
        panic!("registration should fail without a token");
    };
    assert!(matches!(
        e.client_error(),
        Some(ClientError::AuthHeaderMissing)
    ));
    assert_eq!(app.query.auth_state(), AuthState::LoggedOut);
    assert!(register.state().error().is_some());

    Ok(())
}

#[tokio::test]
async fn duplicate_registration_message() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.register_customer("a@b.com").await?;

    let result = use_register(&app.query)
        .mutate(CustomerEmail::new("a@b.com"))
        .await;
    assert_query_status_code(result.clone(), StatusCode::CONFLICT);
    assert_eq!(
        result.unwrap_err().user_message(),
        "Email already exists or invalid credentials."
    );

    Ok(())
}

#[tokio::test]
async fn invalid_email_is_not_sent() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let result = use_login(&app.query)
        .mutate(CustomerEmail::new("not-an-email"))
        .await;
    assert!(matches!(result, Err(QueryError::InvalidInput(_))));
    assert!(app.request_log.requests().is_empty());

    Ok(())
}

#[tokio::test]
async fn switching_user_drops_their_cached_rentals() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.register_customer("a@b.com").await?;
    app.register_customer("b@b.com").await?;

    use_login(&app.query)
        .mutate(CustomerEmail::new("a@b.com"))
        .await?;
    let rentals = use_rentals(&app.query, PageRequest::first(5));
    rentals.fetch().await?;
    assert!(rentals.data().is_some());

    use_login(&app.query)
        .mutate(CustomerEmail::new("b@b.com"))
        .await?;
    assert!(rentals.data().is_none());

    rentals.fetch().await?;
    use_logout(&app.query).mutate(()).await?;
    assert!(rentals.data().is_none());
    assert_eq!(app.query.auth_state(), AuthState::LoggedOut);
    assert!(!app.client.session.is_authenticated());

    let result = rentals.fetch().await;
    assert_query_status_code(result, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn unknown_login_is_not_found() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let result = use_login(&app.query)
        .mutate(CustomerEmail::new("nobody@b.com"))
        .await;
    assert_query_status_code(result, StatusCode::NOT_FOUND);
    assert_eq!(app.query.auth_state(), AuthState::LoggedOut);

    Ok(())
}
