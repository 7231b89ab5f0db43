//! Login, registration and session commands.

use anyhow::{Context, Result};
use chrono::Local;
use lms_core::api;
use lms_core::http::AuthClient;
use lms_types::{LoginCredentials, RegisterData, User};

use super::Output;

pub async fn login(
    client: &AuthClient,
    out: Output,
    admin: bool,
    username: String,
    password: String,
) -> Result<()> {
    let credentials = LoginCredentials { username, password };
    let user = if admin {
        api::auth::admin_login(client, &credentials).await
    } else {
        api::auth::login(client, &credentials).await
    }
    .context("login failed")?;

    out.emit(&user, |user| {
        println!("Logged in as {} ({})", user.display_name(), user.username);
    })
}

pub async fn register(
    client: &AuthClient,
    out: Output,
    admin: bool,
    data: RegisterData,
) -> Result<()> {
    let user = if admin {
        api::auth::admin_register(client, &data).await
    } else {
        api::auth::register(client, &data).await
    }
    .context("registration failed")?;

    out.emit(&user, |user| {
        println!("Account created. Logged in as {}", user.username);
    })
}

pub async fn logout(client: &AuthClient, all: bool) -> Result<()> {
    if all {
        let ack = api::auth::logout_all(client)
            .await
            .context("logout from all devices failed")?;
        if ack.message.is_empty() {
            println!("Logged out from all devices.");
        } else {
            println!("{}", ack.message);
        }
    } else {
        api::auth::logout(client).await.context("logout failed")?;
        println!("Logged out.");
    }
    Ok(())
}

pub async fn whoami(client: &AuthClient, out: Output) -> Result<()> {
    let Some(user) = api::auth::restore_session(client)
        .await
        .context("check session")?
    else {
        println!("Not logged in.");
        return Ok(());
    };

    let expires = client
        .session()
        .access_expires_at()
        .map(|at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string());

    out.emit(&user, |user| print_user(user, expires.as_deref()))
}

fn print_user(user: &User, expires: Option<&str>) {
    println!("{} ({})", user.display_name(), user.username);
    if !user.email.is_empty() {
        println!("  email:      {}", user.email);
    }
    if let Some(department) = user.department.as_deref().filter(|d| !d.is_empty()) {
        println!("  department: {department}");
    }
    println!("  role:       {}", if user.is_admin { "admin" } else { "learner" });
    if let Some(expires) = expires {
        println!("  token until {expires}");
    }
}
