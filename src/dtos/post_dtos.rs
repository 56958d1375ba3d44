use serde::Serialize;

use super::file_dtos::FileUpload;

#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: String,
    pub caption: String,
    pub file: Option<FileUpload>,
    pub location: Option<String>,
    /// Comma separated, as typed into the form.
    pub tags: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdatePost {
    pub post_id: String,
    pub caption: String,
    pub image_id: String,
    pub image_url: String,
    /// A replacement image; `None` keeps the current one.
    pub file: Option<FileUpload>,
    pub location: Option<String>,
    pub tags: Option<String>,
}

/// Document fields written for a post.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostFields<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<&'a str>,
    pub caption: &'a str,
    pub image_url: &'a str,
    pub image_id: &'a str,
    pub location: Option<&'a str>,
    pub tags: Vec<String>,
}

/// Splits the comma separated tag field, dropping every space.
pub fn parse_tags(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let compact: String = raw.chars().filter(|c| *c != ' ').collect();
    if compact.is_empty() {
        return Vec::new();
    }
    compact.split(',').map(str::to_string).collect()
}
