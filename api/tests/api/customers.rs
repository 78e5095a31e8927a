use api::Config;
use payloads::requests::CustomerEmail;
use payloads::{ClientError, PageRequest};
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;

use test_helpers::{assert_status_code, spawn_app, spawn_app_with};

#[tokio::test]
async fn register_returns_a_bearer_token() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let response = reqwest::Client::new()
        .post(format!("{}/customers", app.address))
        .json(&CustomerEmail::new("a@b.com"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let header = response
        .headers()
        .get(AUTHORIZATION)
        .expect("authorization header")
        .to_str()?
        .to_string();
    assert!(header.starts_with("Bearer "));
    let customer: payloads::Customer = response.json().await?;
    assert_eq!(customer.email, "a@b.com");

    Ok(())
}

#[tokio::test]
async fn register_then_login() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let registered = app.register_customer("a@b.com").await?;
    assert_eq!(registered.email, "a@b.com");
    assert!(app.client.session.is_authenticated());

    // the token from registration is usable straight away
    app.client.get_rentals(PageRequest::first(5)).await?;

    let other = app.new_client();
    let logged_in = other.login(&CustomerEmail::new("a@b.com")).await?;
    assert_eq!(logged_in.email, "a@b.com");
    assert_ne!(logged_in.token, registered.token);
    other.get_rentals(PageRequest::first(5)).await?;

    Ok(())
}

#[tokio::test]
async fn duplicate_email_conflicts() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.register_customer("a@b.com").await?;

    let result = app
        .new_client()
        .register(&CustomerEmail::new("A@B.com"))
        .await;
    assert_status_code(result, StatusCode::CONFLICT);

    Ok(())
}

#[tokio::test]
async fn unknown_login_is_not_found() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let result = app.client.login(&CustomerEmail::new("nobody@b.com")).await;
    assert_status_code(result, StatusCode::NOT_FOUND);
    assert!(!app.client.session.is_authenticated());

    Ok(())
}

#[tokio::test]
async fn invalid_email_is_rejected() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let response = reqwest::Client::new()
        .post(format!("{}/customers", app.address))
        .json(&CustomerEmail::new("not-an-email"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn missing_auth_header_is_an_error() -> anyhow::Result<()> {
    let app = spawn_app_with(Config {
        issue_auth_header: false,
        ..Config::default()
    })
    .await;

    let result = app.client.register(&CustomerEmail::new("a@b.com")).await;
    assert!(matches!(result, Err(ClientError::AuthHeaderMissing)));
    assert!(!app.client.session.is_authenticated());

    Ok(())
}

#[tokio::test]
async fn logout_forgets_the_token() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.register_alice().await?;

    app.client.logout();
    assert!(!app.client.session.is_authenticated());
    let result = app.client.get_rentals(PageRequest::first(5)).await;
    assert_status_code(result, StatusCode::UNAUTHORIZED);

    Ok(())
}
