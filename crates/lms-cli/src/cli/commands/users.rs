//! `lms admin users` handlers.

use anyhow::{Context, Result};
use lms_core::api;
use lms_core::http::AuthClient;
use lms_types::{NewUser, PasswordChange, User, UserQuery};

use super::{Output, date_part};

pub async fn list(client: &AuthClient, out: Output, query: &UserQuery) -> Result<()> {
    let page = api::users::list(client, query)
        .await
        .context("list users")?;

    out.emit(&page, |page| {
        if page.results.is_empty() {
            println!("No users found.");
            return;
        }
        for user in &page.results {
            println!("{}", user_line(user));
        }
        println!("{} users", page.count);
    })
}

pub async fn show(client: &AuthClient, out: Output, id: u64) -> Result<()> {
    let user = api::users::get(client, id)
        .await
        .with_context(|| format!("load user {id}"))?;

    out.emit(&user, |user| {
        println!("{}", user_line(user));
        if !user.email.is_empty() {
            println!("  email: {}", user.email);
        }
        if let Some(department) = user.department.as_deref().filter(|d| !d.is_empty()) {
            println!("  department: {department}");
        }
        if !user.date_joined.is_empty() {
            println!("  joined: {}", date_part(&user.date_joined));
        }
    })
}

pub async fn create(client: &AuthClient, out: Output, user: &NewUser) -> Result<()> {
    let created = api::users::create(client, user)
        .await
        .with_context(|| format!("create user {}", user.username))?;

    out.emit(&created, |created| {
        println!("Created user {} (id {})", created.username, created.id);
    })
}

pub async fn delete(client: &AuthClient, id: u64) -> Result<()> {
    api::users::delete(client, id)
        .await
        .with_context(|| format!("delete user {id}"))?;
    println!("Deleted user {id}.");
    Ok(())
}

pub async fn set_active(client: &AuthClient, out: Output, id: u64, active: bool) -> Result<()> {
    let user = api::users::set_active(client, id, active)
        .await
        .with_context(|| format!("update status of user {id}"))?;

    out.emit(&user, |user| {
        let state = if active { "activated" } else { "deactivated" };
        println!("User {} {state}.", user.username);
    })
}

pub async fn change_password(
    client: &AuthClient,
    id: u64,
    current_password: String,
    new_password: String,
) -> Result<()> {
    let change = PasswordChange {
        current_password,
        new_password,
    };
    let response = api::users::change_password(client, id, &change)
        .await
        .with_context(|| format!("change password of user {id}"))?;
    if response.message.is_empty() {
        println!("Password changed.");
    } else {
        println!("{}", response.message);
    }
    Ok(())
}

fn user_line(user: &User) -> String {
    let mut line = format!("{:>4}  {} ({})", user.id, user.display_name(), user.username);
    if user.is_admin {
        line.push_str("  [admin]");
    }
    if user.is_active == Some(false) {
        line.push_str("  [inactive]");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_line_flags_admin_and_inactive() {
        let user: User = serde_json::from_str(
            r#"{"id": 5, "username": "grace", "first_name": "Grace", "last_name": "Hopper",
                "is_admin": true, "is_active": false}"#,
        )
        .unwrap();
        assert_eq!(
            user_line(&user),
            "   5  Grace Hopper (grace)  [admin]  [inactive]"
        );
    }
}
