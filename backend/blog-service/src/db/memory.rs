//! In-memory content store.
//!
//! Implements the same store traits as the PostgreSQL repositories, with
//! every mutation applied under a single write lock. Used by the test suite
//! and by `STORE_BACKEND=memory` for local development.

use super::{CommentStore, PostFilter, PostStore, UserDirectory};
use crate::error::{AppError, Result};
use crate::models::{AuthorSummary, Comment, NewComment, NewPost, Post, PostChanges};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

struct Entry<T> {
    seq: u64,
    value: T,
}

#[derive(Default)]
struct MemoryState {
    posts: HashMap<Uuid, Entry<Post>>,
    comments: HashMap<Uuid, Entry<Comment>>,
    users: HashMap<Uuid, AuthorSummary>,
    next_seq: u64,
}

impl MemoryState {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn post_mut(&mut self, post_id: Uuid) -> Option<&mut Post> {
        self.posts.get_mut(&post_id).map(|e| &mut e.value)
    }

    fn comment_mut(&mut self, comment_id: Uuid) -> Option<&mut Comment> {
        self.comments.get_mut(&comment_id).map(|e| &mut e.value)
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register display fields for a user
    pub async fn insert_user(&self, author: AuthorSummary) {
        self.state.write().await.users.insert(author.id, author);
    }

    pub async fn post_count(&self) -> usize {
        self.state.read().await.posts.len()
    }

    pub async fn comment_count(&self) -> usize {
        self.state.read().await.comments.len()
    }
}

fn foreign_key_violation(what: &str, id: Uuid) -> AppError {
    AppError::DatabaseError(format!(
        "insert on table \"comments\" violates foreign key constraint: {} {} does not exist",
        what, id
    ))
}

#[async_trait]
impl PostStore for InMemoryStore {
    async fn insert_post(&self, new_post: NewPost) -> Result<Post> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            title: new_post.title,
            subtitle: None,
            description: None,
            category: new_post.category,
            thumbnail: None,
            author_id: new_post.author_id,
            is_published: true,
            likes: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let seq = state.next_seq();
        state.posts.insert(
            post.id,
            Entry {
                seq,
                value: post.clone(),
            },
        );

        Ok(post)
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        Ok(self
            .state
            .read()
            .await
            .posts
            .get(&post_id)
            .map(|e| e.value.clone()))
    }

    async fn list_posts(&self, filter: PostFilter) -> Result<Vec<Post>> {
        let state = self.state.read().await;
        let mut entries: Vec<&Entry<Post>> = state
            .posts
            .values()
            .filter(|e| filter.matches(&e.value))
            .collect();
        entries.sort_by(|a, b| (b.value.created_at, b.seq).cmp(&(a.value.created_at, a.seq)));

        Ok(entries.into_iter().map(|e| e.value.clone()).collect())
    }

    async fn update_post(&self, post_id: Uuid, changes: PostChanges) -> Result<Option<Post>> {
        let mut state = self.state.write().await;
        let Some(post) = state.post_mut(post_id) else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            post.title = title;
        }
        if let Some(subtitle) = changes.subtitle {
            post.subtitle = Some(subtitle);
        }
        if let Some(description) = changes.description {
            post.description = Some(description);
        }
        if let Some(category) = changes.category {
            post.category = category;
        }
        if let Some(thumbnail) = changes.thumbnail {
            post.thumbnail = Some(thumbnail);
        }
        post.updated_at = Utc::now();

        Ok(Some(post.clone()))
    }

    async fn toggle_published(&self, post_id: Uuid) -> Result<Option<Post>> {
        let mut state = self.state.write().await;
        Ok(state.post_mut(post_id).map(|post| {
            post.is_published = !post.is_published;
            post.updated_at = Utc::now();
            post.clone()
        }))
    }

    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Post>> {
        let mut state = self.state.write().await;
        Ok(state.post_mut(post_id).map(|post| {
            if !post.likes.contains(&user_id) {
                post.likes.push(user_id);
            }
            post.clone()
        }))
    }

    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Post>> {
        let mut state = self.state.write().await;
        Ok(state.post_mut(post_id).map(|post| {
            post.likes.retain(|id| *id != user_id);
            post.clone()
        }))
    }

    async fn delete_post_with_comments(&self, post_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.posts.remove(&post_id).is_none() {
            return Ok(false);
        }
        state.comments.retain(|_, e| e.value.post_id != post_id);
        Ok(true)
    }
}

#[async_trait]
impl CommentStore for InMemoryStore {
    async fn insert_comment(&self, new_comment: NewComment) -> Result<Comment> {
        let mut state = self.state.write().await;

        if !state.posts.contains_key(&new_comment.post_id) {
            return Err(foreign_key_violation("post", new_comment.post_id));
        }
        if let Some(parent_id) = new_comment.parent_comment_id {
            if !state.comments.contains_key(&parent_id) {
                return Err(foreign_key_violation("comment", parent_id));
            }
        }

        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: new_comment.post_id,
            user_id: new_comment.user_id,
            content: new_comment.content,
            parent_comment_id: new_comment.parent_comment_id,
            likes: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let seq = state.next_seq();
        state.comments.insert(
            comment.id,
            Entry {
                seq,
                value: comment.clone(),
            },
        );

        Ok(comment)
    }

    async fn find_comment(&self, comment_id: Uuid) -> Result<Option<Comment>> {
        Ok(self
            .state
            .read()
            .await
            .comments
            .get(&comment_id)
            .map(|e| e.value.clone()))
    }

    async fn list_comments_for_posts(&self, post_ids: &[Uuid]) -> Result<Vec<Comment>> {
        let state = self.state.read().await;
        let mut entries: Vec<&Entry<Comment>> = state
            .comments
            .values()
            .filter(|e| post_ids.contains(&e.value.post_id))
            .collect();
        entries.sort_by(|a, b| (a.value.created_at, a.seq).cmp(&(b.value.created_at, b.seq)));

        Ok(entries.into_iter().map(|e| e.value.clone()).collect())
    }

    async fn update_comment_content(
        &self,
        comment_id: Uuid,
        content: &str,
    ) -> Result<Option<Comment>> {
        let mut state = self.state.write().await;
        Ok(state.comment_mut(comment_id).map(|comment| {
            comment.content = content.to_string();
            comment.updated_at = Utc::now();
            comment.clone()
        }))
    }

    async fn delete_comment_with_replies(&self, comment_id: Uuid) -> Result<u64> {
        let mut state = self.state.write().await;
        let before = state.comments.len();
        state.comments.retain(|id, e| {
            *id != comment_id && e.value.parent_comment_id != Some(comment_id)
        });
        Ok((before - state.comments.len()) as u64)
    }

    async fn toggle_comment_like(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Comment>> {
        let mut state = self.state.write().await;
        Ok(state.comment_mut(comment_id).map(|comment| {
            if comment.likes.contains(&user_id) {
                comment.likes.retain(|id| *id != user_id);
            } else {
                comment.likes.push(user_id);
            }
            comment.clone()
        }))
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn find_authors(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, AuthorSummary>> {
        let state = self.state.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| state.users.get(id).map(|a| (*id, a.clone())))
            .collect())
    }
}
