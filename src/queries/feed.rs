use crate::models::{DocumentList, Post};

/// Pages of the infinite post feed, in load order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFeed {
    pages: Vec<DocumentList<Post>>,
}

impl PostFeed {
    pub fn first(page: DocumentList<Post>) -> Self {
        Self { pages: vec![page] }
    }

    pub fn pages(&self) -> &[DocumentList<Post>] {
        &self.pages
    }

    pub fn posts(&self) -> impl Iterator<Item = &Post> {
        self.pages.iter().flat_map(|page| page.documents.iter())
    }

    pub fn push(&mut self, page: DocumentList<Post>) {
        self.pages.push(page);
    }

    /// Cursor for the page after the last loaded one.
    pub fn next_cursor(&self) -> Option<String> {
        self.pages.last().and_then(next_cursor)
    }

    pub fn has_next_page(&self) -> bool {
        self.next_cursor().is_some()
    }
}

/// An empty page ends the feed; otherwise the next page starts after the
/// page's last post.
pub fn next_cursor(page: &DocumentList<Post>) -> Option<String> {
    page.last().map(|post| post.id.clone())
}
