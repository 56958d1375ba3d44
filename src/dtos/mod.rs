pub mod auth_dtos;
pub mod file_dtos;
pub mod post_dtos;
pub mod user_dtos;

pub use auth_dtos::{NewUser, NewUserDocument, SignInIn};
pub use file_dtos::{FileError, FileUpload};
pub use post_dtos::{NewPost, UpdatePost, parse_tags};
pub use user_dtos::UpdateUser;
