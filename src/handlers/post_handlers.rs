// src/handlers/post_handlers.rs
use log::{debug, info};
use serde::Deserialize;

use super::cli::PostCmd;
use super::{HandlerError, HandlerResult, load_file, print_json};
use crate::dtos::{NewPost, UpdatePost};
use crate::models::{Post, Related, User};
use crate::queries::Queries;

pub async fn handle(queries: &Queries, cmd: PostCmd) -> HandlerResult {
    match cmd {
        PostCmd::Show { id } => show(queries, &id).await,
        PostCmd::Create {
            caption,
            file,
            location,
            tags,
        } => create(queries, caption, &file, location, tags).await,
        PostCmd::Update {
            id,
            caption,
            file,
            location,
            tags,
        } => update(queries, &id, caption, file.as_deref(), location, tags).await,
        PostCmd::Delete { id } => delete(queries, &id).await,
        PostCmd::Like { id } => like(queries, &id).await,
        PostCmd::Save { id } => save(queries, &id).await,
    }
}

pub async fn recent(queries: &Queries) -> HandlerResult {
    let posts = queries.recent_posts().await?;
    print_json(&posts)
}

pub async fn feed(queries: &Queries, pages: u32) -> HandlerResult {
    let mut feed = queries.post_feed().await?;
    for _ in 1..pages {
        if !feed.has_next_page() {
            break;
        }
        feed = queries.fetch_next_feed_page().await?;
    }
    debug!("feed holds {} pages", feed.pages().len());
    let posts: Vec<&Post> = feed.posts().collect();
    print_json(&posts)
}

pub async fn search(queries: &Queries, term: &str) -> HandlerResult {
    let found = queries
        .search_posts(term)
        .await?
        .ok_or_else(|| HandlerError::Usage("search term must not be blank".into()))?;
    print_json(&found)
}

async fn show(queries: &Queries, post_id: &str) -> HandlerResult {
    let post = require_post(queries, post_id).await?;
    print_json(&post)
}

async fn create(
    queries: &Queries,
    caption: String,
    file: &str,
    location: Option<String>,
    tags: Option<String>,
) -> HandlerResult {
    let user = queries.current_user().await?;
    let file = load_file(file).await?;
    let post = queries
        .create_post(NewPost {
            user_id: user.id,
            caption,
            file: Some(file),
            location,
            tags,
        })
        .await?;
    info!("created post {}", post.id);
    print_json(&post)
}

async fn update(
    queries: &Queries,
    post_id: &str,
    caption: Option<String>,
    file: Option<&str>,
    location: Option<String>,
    tags: Option<String>,
) -> HandlerResult {
    let current = require_post(queries, post_id).await?;
    let file = match file {
        Some(source) => Some(load_file(source).await?),
        None => None,
    };
    let post = queries
        .update_post(UpdatePost {
            post_id: current.id,
            caption: caption.unwrap_or(current.caption),
            image_id: current.image_id,
            image_url: current.image_url,
            file,
            location: location.or(current.location),
            tags: tags.or_else(|| Some(current.tags.join(","))),
        })
        .await?;
    print_json(&post)
}

async fn delete(queries: &Queries, post_id: &str) -> HandlerResult {
    let post = require_post(queries, post_id).await?;
    queries.delete_post(&post.id, &post.image_id).await?;
    info!("deleted post {}", post.id);
    Ok(())
}

async fn like(queries: &Queries, post_id: &str) -> HandlerResult {
    let user = queries.current_user().await?;
    let post = require_post(queries, post_id).await?;
    let likes = toggle_like(&post.like_ids(), &user.id);
    let post = queries.like_post(&post.id, &likes).await?;
    print_json(&post)
}

async fn save(queries: &Queries, post_id: &str) -> HandlerResult {
    let user = queries.current_user().await?;
    match saved_record_for(&user, post_id) {
        Some(record_id) => {
            queries.delete_saved_post(&record_id).await?;
            info!("removed save {record_id} of post {post_id}");
            Ok(())
        }
        None => {
            let saved = queries.save_post(&user.id, post_id).await?;
            print_json(&saved)
        }
    }
}

async fn require_post(queries: &Queries, post_id: &str) -> Result<Post, HandlerError> {
    queries
        .post_by_id(post_id)
        .await?
        .ok_or_else(|| HandlerError::Usage("post id must not be blank".into()))
}

/// The like list after `user_id` toggles their like.
pub fn toggle_like(likes: &[String], user_id: &str) -> Vec<String> {
    if likes.iter().any(|id| id == user_id) {
        likes.iter().filter(|id| *id != user_id).cloned().collect()
    } else {
        let mut likes = likes.to_vec();
        likes.push(user_id.to_string());
        likes
    }
}

/// Id of the user's save record for `post_id`, when the user document came
/// back with its saves expanded.
pub fn saved_record_for(user: &User, post_id: &str) -> Option<String> {
    user.save
        .iter()
        .filter_map(Related::document)
        .find(|doc| {
            doc.field("post")
                .and_then(|post| Related::deserialize(post).ok())
                .is_some_and(|post| post.id() == post_id)
        })
        .map(|doc| doc.id.clone())
}
