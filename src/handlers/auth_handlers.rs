// src/handlers/auth_handlers.rs
use log::info;

use super::{HandlerResult, print_json};
use crate::dtos::{NewUser, SignInIn};
use crate::queries::Queries;

pub async fn signup(
    queries: &Queries,
    name: &str,
    username: &str,
    credentials: SignInIn,
) -> HandlerResult {
    let user = queries
        .create_user_account(NewUser {
            name: name.to_string(),
            username: username.to_string(),
            email: credentials.email.clone(),
            password: credentials.password.clone(),
        })
        .await?;
    info!("created user {} for account {}", user.id, user.account_id);

    queries.sign_in_account(credentials).await?;
    print_json(&user)
}

pub async fn whoami(queries: &Queries) -> HandlerResult {
    let user = queries.current_user().await?;
    print_json(&user)
}

pub async fn signout(queries: &Queries) -> HandlerResult {
    queries.sign_out_account().await?;
    info!("signed out");
    Ok(())
}
