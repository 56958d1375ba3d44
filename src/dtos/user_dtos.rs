use serde::Serialize;

use super::file_dtos::FileUpload;

#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub user_id: String,
    pub name: String,
    pub bio: String,
    pub image_id: Option<String>,
    pub image_url: Option<String>,
    pub file: Option<FileUpload>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserFields<'a> {
    pub name: &'a str,
    pub bio: &'a str,
    pub image_url: Option<&'a str>,
    pub image_id: Option<&'a str>,
}
