/// Read-side assembly of posts and comment threads
///
/// Posts and comments are fetched in bulk, the distinct author ids are
/// resolved with one directory lookup, and the views are stitched together
/// in memory. A user missing from the directory renders as `author: None`.
use crate::db::{CommentStore, UserDirectory};
use crate::error::Result;
use crate::models::{AuthorSummary, Comment, CommentThread, CommentView, Post, PostView};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

type Authors = HashMap<Uuid, AuthorSummary>;

fn distinct_author_ids(posts: &[Post], comments: &[Comment]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    posts
        .iter()
        .map(|p| p.author_id)
        .chain(comments.iter().map(|c| c.user_id))
        .filter(|id| seen.insert(*id))
        .collect()
}

pub fn comment_view(comment: Comment, authors: &Authors) -> CommentView {
    CommentView {
        author: authors.get(&comment.user_id).cloned(),
        number_of_likes: comment.likes.len(),
        comment,
    }
}

/// Attach authors and comments to posts. `comments` must be oldest first;
/// each post lists its comments newest first.
pub fn build_post_views(
    posts: Vec<Post>,
    comments: Vec<Comment>,
    authors: &Authors,
) -> Vec<PostView> {
    let mut by_post: HashMap<Uuid, Vec<CommentView>> = HashMap::new();
    for comment in comments.into_iter().rev() {
        by_post
            .entry(comment.post_id)
            .or_default()
            .push(comment_view(comment, authors));
    }

    posts
        .into_iter()
        .map(|post| PostView {
            author: authors.get(&post.author_id).cloned(),
            like_count: post.like_count(),
            comments: by_post.remove(&post.id).unwrap_or_default(),
            post,
        })
        .collect()
}

/// Group the comments of one post into threads: roots newest first, replies
/// oldest first. `comments` must be oldest first. Replies whose root is
/// gone are dropped.
pub fn build_threads(comments: Vec<Comment>, authors: &Authors) -> Vec<CommentThread> {
    let (roots, replies): (Vec<Comment>, Vec<Comment>) =
        comments.into_iter().partition(|c| !c.is_reply());

    let mut replies_by_root: HashMap<Uuid, Vec<CommentView>> = HashMap::new();
    for reply in replies {
        if let Some(parent_id) = reply.parent_comment_id {
            replies_by_root
                .entry(parent_id)
                .or_default()
                .push(comment_view(reply, authors));
        }
    }

    roots
        .into_iter()
        .rev()
        .map(|root| {
            let replies = replies_by_root.remove(&root.id).unwrap_or_default();
            CommentThread {
                comment: comment_view(root, authors),
                replies,
            }
        })
        .collect()
}

/// Load comments and authors for `posts` and assemble their views
pub async fn load_post_views(
    comments: &dyn CommentStore,
    users: &dyn UserDirectory,
    posts: Vec<Post>,
) -> Result<Vec<PostView>> {
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
    let post_comments = comments.list_comments_for_posts(&post_ids).await?;
    let authors = users
        .find_authors(&distinct_author_ids(&posts, &post_comments))
        .await?;

    Ok(build_post_views(posts, post_comments, &authors))
}

/// Load the threads of one post
pub async fn load_threads(
    comments: &dyn CommentStore,
    users: &dyn UserDirectory,
    post_id: Uuid,
) -> Result<Vec<CommentThread>> {
    let post_comments = comments.list_comments_for_posts(&[post_id]).await?;
    let authors = users
        .find_authors(&distinct_author_ids(&[], &post_comments))
        .await?;

    Ok(build_threads(post_comments, &authors))
}

/// Resolve the author of a single comment
pub async fn load_comment_view(users: &dyn UserDirectory, comment: Comment) -> Result<CommentView> {
    let authors = users.find_authors(&[comment.user_id]).await?;
    Ok(comment_view(comment, &authors))
}
