//! Post and comment sync state.
//!
//! Targets of the re-fetch actions for `like-updated`, `new-comment` and
//! `update-comment`.  Only `delete-comment` is applied as a local patch:
//! deletion is unambiguous, while like counts and reply nesting need the
//! authoritative payload.

use std::collections::HashMap;

use tracing::debug;

use inkstream_shared::{Comment, CommentId, Post, PostId};

/// Watched posts and their comment lists.
#[derive(Debug, Clone, Default)]
pub struct CommentState {
    posts: HashMap<PostId, Post>,
    comments: HashMap<PostId, Vec<Comment>>,
}

impl CommentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a post's detail with an authoritative payload.
    pub fn apply_post(&mut self, post: Post) {
        self.posts.insert(post.id, post);
    }

    /// Replace a post's comment list with an authoritative payload.
    pub fn apply_comments(&mut self, post: PostId, comments: Vec<Comment>) {
        debug!(post = %post, count = comments.len(), "Applied comment list");
        self.comments.insert(post, comments);
    }

    /// Remove one comment locally.  Idempotent: a duplicate delivery finds
    /// nothing left to remove.
    pub fn remove_comment(&mut self, post: PostId, comment: CommentId) {
        if let Some(comments) = self.comments.get_mut(&post) {
            comments.retain(|c| c.id != comment);
        }
    }

    /// The post owning a comment, resolved from the watched lists.
    pub fn post_of(&self, comment: CommentId) -> Option<PostId> {
        self.comments
            .iter()
            .find(|(_, comments)| comments.iter().any(|c| c.id == comment))
            .map(|(post, _)| *post)
    }

    pub fn post(&self, id: PostId) -> Option<&Post> {
        self.posts.get(&id)
    }

    pub fn comments_for(&self, post: PostId) -> &[Comment] {
        self.comments.get(&post).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ids of the comments currently held for a post.
    pub fn comment_ids(&self, post: PostId) -> Vec<CommentId> {
        self.comments_for(post).iter().map(|c| c.id).collect()
    }

    /// Stop tracking a post entirely.
    pub fn forget_post(&mut self, post: PostId) {
        self.posts.remove(&post);
        self.comments.remove(&post);
    }

    /// Drop everything (logout).
    pub fn clear(&mut self) {
        self.posts.clear();
        self.comments.clear();
    }
}
