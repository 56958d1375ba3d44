pub mod document;
pub mod post;
pub mod save;
pub mod user;

pub use document::{Document, DocumentList, Related};
pub use post::Post;
pub use save::{Save, StoredFile};
pub use user::{Account, Session, User};
