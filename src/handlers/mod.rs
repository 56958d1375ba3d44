// src/handlers/mod.rs - command dispatch for the CLI view layer
pub mod auth_handlers;
pub mod cli;
pub mod post_handlers;
pub mod user_handlers;

use log::info;
use serde::Serialize;
use thiserror::Error;

use crate::cache::QueryError;
use crate::dtos::{FileError, FileUpload, SignInIn};
use crate::queries::Queries;
use cli::{Cli, Commands};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    File(#[from] FileError),
    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
    #[error("{0} not found")]
    NotFound(String),
}

pub type HandlerResult = Result<(), HandlerError>;

pub fn print_json<T: Serialize>(value: &T) -> HandlerResult {
    let out = serde_json::to_string_pretty(value)?;
    println!("{out}");
    Ok(())
}

/// Reads an upload from a `data:` URL or a path on disk.
pub async fn load_file(source: &str) -> Result<FileUpload, FileError> {
    if source.starts_with("data:") {
        FileUpload::from_data_url("upload", source)
    } else {
        FileUpload::from_path(source).await
    }
}

fn credentials(cli: &Cli) -> Option<SignInIn> {
    match (&cli.email, &cli.password) {
        (Some(email), Some(password)) => Some(SignInIn {
            email: email.clone(),
            password: password.clone(),
        }),
        _ => None,
    }
}

pub async fn run(queries: &Queries, cli: Cli) -> HandlerResult {
    let credentials = credentials(&cli);

    if let Commands::Signup { name, username } = &cli.command {
        let credentials = credentials
            .ok_or_else(|| HandlerError::Usage("signup needs --email and --password".into()))?;
        return auth_handlers::signup(queries, name, username, credentials).await;
    }

    if let Some(credentials) = credentials {
        let session = queries.sign_in_account(credentials).await?;
        info!("signed in, session {}", session.id);
    }

    match cli.command {
        Commands::Signup { .. } => Ok(()),
        Commands::Whoami => auth_handlers::whoami(queries).await,
        Commands::Signout => auth_handlers::signout(queries).await,
        Commands::Recent => post_handlers::recent(queries).await,
        Commands::Feed { pages } => post_handlers::feed(queries, pages).await,
        Commands::Search { term } => post_handlers::search(queries, &term).await,
        Commands::Post(cmd) => post_handlers::handle(queries, cmd.action).await,
        Commands::Users { limit } => user_handlers::list(queries, limit).await,
        Commands::User(cmd) => user_handlers::handle(queries, cmd.action).await,
    }
}
