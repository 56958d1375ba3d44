// src/handlers/user_handlers.rs
use super::cli::UserCmd;
use super::{HandlerError, HandlerResult, load_file, print_json};
use crate::dtos::UpdateUser;
use crate::models::User;
use crate::queries::Queries;

pub async fn handle(queries: &Queries, cmd: UserCmd) -> HandlerResult {
    match cmd {
        UserCmd::Show { id } => show(queries, &id).await,
        UserCmd::Update {
            id,
            name,
            bio,
            file,
        } => update(queries, id.as_deref(), name, bio, file.as_deref()).await,
    }
}

pub async fn list(queries: &Queries, limit: Option<u32>) -> HandlerResult {
    let users = queries.users(limit).await?;
    print_json(&users)
}

async fn show(queries: &Queries, user_id: &str) -> HandlerResult {
    let user = require_user(queries, user_id).await?;
    print_json(&user)
}

async fn update(
    queries: &Queries,
    user_id: Option<&str>,
    name: Option<String>,
    bio: Option<String>,
    file: Option<&str>,
) -> HandlerResult {
    let current = match user_id {
        Some(id) => require_user(queries, id).await?,
        None => queries.current_user().await?,
    };
    let file = match file {
        Some(source) => Some(load_file(source).await?),
        None => None,
    };
    let user = queries
        .update_user(UpdateUser {
            user_id: current.id,
            name: name.unwrap_or(current.name),
            bio: bio.or(current.bio).unwrap_or_default(),
            image_id: current.image_id,
            image_url: current.image_url,
            file,
        })
        .await?;
    print_json(&user)
}

async fn require_user(queries: &Queries, user_id: &str) -> Result<User, HandlerError> {
    queries
        .user_by_id(user_id)
        .await?
        .ok_or_else(|| HandlerError::NotFound(format!("user {user_id:?}")))
}
