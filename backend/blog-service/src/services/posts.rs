/// Post service - handles post creation, publishing, likes and deletion
use crate::db::{CommentStore, PostFilter, PostStore, UserDirectory};
use crate::error::{AppError, Result};
use crate::media::{MediaStore, MediaUpload};
use crate::metrics::record_post_operation;
use crate::middleware::permissions::check_post_ownership;
use crate::models::{Category, LikeSummary, NewPost, Post, PostChanges, PostView};
use crate::services::threads;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Fields a post update may carry. Blank values are treated as omitted.
#[derive(Debug, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub thumbnail: Option<MediaUpload>,
}

fn not_found() -> AppError {
    AppError::NotFound("Blog not found".to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub struct PostService {
    posts: Arc<dyn PostStore>,
    comments: Arc<dyn CommentStore>,
    users: Arc<dyn UserDirectory>,
    media: Option<Arc<dyn MediaStore>>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostStore>,
        comments: Arc<dyn CommentStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            posts,
            comments,
            users,
            media: None,
        }
    }

    pub fn with_media(mut self, media: Arc<dyn MediaStore>) -> Self {
        self.media = Some(media);
        self
    }

    async fn find_existing(&self, post_id: Uuid) -> Result<Post> {
        self.posts.find_post(post_id).await?.ok_or_else(not_found)
    }

    /// Create a published post with no likes and no thumbnail
    pub async fn create(&self, author_id: Uuid, title: &str, category: &str) -> Result<Post> {
        let result: Result<Post> = async {
            let title = title.trim();
            if title.is_empty() {
                return Err(AppError::ValidationError("Title is required".to_string()));
            }
            let category = Category::parse(category)
                .ok_or_else(|| AppError::ValidationError("Category is required".to_string()))?;

            let post = self
                .posts
                .insert_post(NewPost {
                    title: title.to_string(),
                    category,
                    author_id,
                })
                .await?;

            info!(post_id = %post.id, %author_id, "blog created");
            Ok(post)
        }
        .await;

        record_post_operation("create", &result);
        result
    }

    /// Overwrite the non-blank fields of a post owned by `requester_id`.
    ///
    /// A new thumbnail is uploaded before the write. If the write then fails
    /// the uploaded object is left behind.
    pub async fn update(
        &self,
        post_id: Uuid,
        requester_id: Uuid,
        update: PostUpdate,
    ) -> Result<Post> {
        let result: Result<Post> = async {
            let post = self.find_existing(post_id).await?;
            check_post_ownership(requester_id, &post)?;

            let mut changes = PostChanges {
                title: non_blank(update.title).map(|t| t.trim().to_string()),
                subtitle: non_blank(update.subtitle),
                description: non_blank(update.description),
                category: update.category.as_deref().and_then(Category::parse),
                thumbnail: None,
            };

            if let Some(upload) = update.thumbnail {
                let media = self.media.as_ref().ok_or_else(|| {
                    AppError::BadRequest("Thumbnail uploads are not configured".to_string())
                })?;
                changes.thumbnail = Some(media.store_thumbnail(post_id, upload).await?);
            }

            let uploaded = changes.thumbnail.clone();
            let written = match self.posts.update_post(post_id, changes).await {
                Ok(Some(post)) => Ok(post),
                Ok(None) => Err(not_found()),
                Err(e) => Err(e),
            };

            if let (Err(e), Some(url)) = (&written, &uploaded) {
                warn!(
                    %post_id,
                    %url,
                    error = %e,
                    "post write failed after thumbnail upload; media object orphaned"
                );
            }

            let post = written?;
            info!(%post_id, "blog updated");
            Ok(post)
        }
        .await;

        record_post_operation("update", &result);
        result
    }

    /// Flip `is_published` on a post owned by `requester_id`
    pub async fn toggle_publish(&self, post_id: Uuid, requester_id: Uuid) -> Result<Post> {
        let result: Result<Post> = async {
            let post = self.find_existing(post_id).await?;
            check_post_ownership(requester_id, &post)?;

            let post = self
                .posts
                .toggle_published(post_id)
                .await?
                .ok_or_else(not_found)?;

            info!(%post_id, is_published = post.is_published, "blog publish state toggled");
            Ok(post)
        }
        .await;

        record_post_operation("toggle_publish", &result);
        result
    }

    /// Delete a post owned by `requester_id` together with all of its comments
    pub async fn delete(&self, post_id: Uuid, requester_id: Uuid) -> Result<()> {
        let result: Result<()> = async {
            let post = self.find_existing(post_id).await?;
            check_post_ownership(requester_id, &post)?;

            if !self.posts.delete_post_with_comments(post_id).await? {
                return Err(not_found());
            }

            info!(%post_id, "blog deleted");
            Ok(())
        }
        .await;

        record_post_operation("delete", &result);
        result
    }

    /// Add `user_id` to the like set. Repeated likes have no further effect.
    pub async fn like(&self, post_id: Uuid, user_id: Uuid) -> Result<Post> {
        let result = self
            .posts
            .add_like(post_id, user_id)
            .await
            .and_then(|post| post.ok_or_else(not_found));

        record_post_operation("like", &result);
        result
    }

    /// Remove `user_id` from the like set if present
    pub async fn dislike(&self, post_id: Uuid, user_id: Uuid) -> Result<Post> {
        let result = self
            .posts
            .remove_like(post_id, user_id)
            .await
            .and_then(|post| post.ok_or_else(not_found));

        record_post_operation("dislike", &result);
        result
    }

    async fn list(&self, filter: PostFilter) -> Result<Vec<PostView>> {
        let posts = self.posts.list_posts(filter).await?;
        threads::load_post_views(self.comments.as_ref(), self.users.as_ref(), posts).await
    }

    pub async fn list_published(&self) -> Result<Vec<PostView>> {
        self.list(PostFilter::Published).await
    }

    pub async fn list_all(&self) -> Result<Vec<PostView>> {
        self.list(PostFilter::All).await
    }

    /// Every post by `author_id`, published or not
    pub async fn list_owned_by(&self, author_id: Uuid) -> Result<Vec<PostView>> {
        if author_id.is_nil() {
            return Err(AppError::ValidationError("Author id is required".to_string()));
        }
        self.list(PostFilter::AuthoredBy(author_id)).await
    }

    pub async fn get_by_id(&self, post_id: Uuid) -> Result<PostView> {
        let post = self.find_existing(post_id).await?;
        threads::load_post_views(self.comments.as_ref(), self.users.as_ref(), vec![post])
            .await?
            .into_iter()
            .next()
            .ok_or_else(not_found)
    }

    /// Post count and total likes across every post by `author_id`
    pub async fn aggregate_likes(&self, author_id: Uuid) -> Result<LikeSummary> {
        if author_id.is_nil() {
            return Err(AppError::ValidationError("Author id is required".to_string()));
        }

        let posts = self.posts.list_posts(PostFilter::AuthoredBy(author_id)).await?;
        Ok(LikeSummary {
            total_blogs: posts.len(),
            total_likes: posts.iter().map(Post::like_count).sum(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;
    use crate::media::MockMediaStore;
    use crate::models::NewComment;

    fn service() -> (PostService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (
            PostService::new(store.clone(), store.clone(), store.clone()),
            store,
        )
    }

    fn png() -> MediaUpload {
        MediaUpload {
            filename: Some("cover.png".to_string()),
            content_type: "image/png".to_string(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        }
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let (service, _) = service();
        let author = Uuid::new_v4();

        let post = service.create(author, "  My trip  ", "travel").await.unwrap();

        assert_eq!(post.title, "My trip");
        assert_eq!(post.category, Category::Travel);
        assert_eq!(post.author_id, author);
        assert!(post.is_published);
        assert!(post.likes.is_empty());
        assert!(post.thumbnail.is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_fields() {
        let (service, store) = service();
        let author = Uuid::new_v4();

        assert!(matches!(
            service.create(author, "   ", "Travel").await,
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            service.create(author, "Title", "").await,
            Err(AppError::ValidationError(_))
        ));
        assert_eq!(store.post_count().await, 0);
    }

    #[tokio::test]
    async fn test_like_is_idempotent_and_dislike_reverts() {
        let (service, _) = service();
        let post = service.create(Uuid::new_v4(), "Title", "Sports").await.unwrap();
        let fan = Uuid::new_v4();

        service.like(post.id, fan).await.unwrap();
        let liked = service.like(post.id, fan).await.unwrap();
        assert_eq!(liked.likes, vec![fan]);

        let disliked = service.dislike(post.id, fan).await.unwrap();
        assert!(disliked.likes.is_empty());

        let again = service.dislike(post.id, fan).await.unwrap();
        assert!(again.likes.is_empty());
    }

    #[tokio::test]
    async fn test_like_missing_post() {
        let (service, _) = service();
        assert!(matches!(
            service.like(Uuid::new_v4(), Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.dislike(Uuid::new_v4(), Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_toggle_publish_twice_restores_state() {
        let (service, _) = service();
        let author = Uuid::new_v4();
        let post = service.create(author, "Title", "Cooking").await.unwrap();

        let once = service.toggle_publish(post.id, author).await.unwrap();
        assert!(!once.is_published);
        let twice = service.toggle_publish(post.id, author).await.unwrap();
        assert!(twice.is_published);
    }

    #[tokio::test]
    async fn test_non_author_cannot_update_or_toggle() {
        let (service, _) = service();
        let author = Uuid::new_v4();
        let post = service.create(author, "Title", "Cooking").await.unwrap();
        let intruder = Uuid::new_v4();

        let update = PostUpdate {
            title: Some("Hijacked".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            service.update(post.id, intruder, update).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            service.toggle_publish(post.id, intruder).await,
            Err(AppError::Forbidden(_))
        ));

        let stored = service.get_by_id(post.id).await.unwrap();
        assert_eq!(stored.post.title, "Title");
        assert!(stored.post.is_published);
    }

    #[tokio::test]
    async fn test_update_keeps_author_thumbnail_and_blank_fields() {
        let (service, _) = service();
        let author = Uuid::new_v4();
        let post = service.create(author, "Title", "Cooking").await.unwrap();

        let updated = service
            .update(
                post.id,
                author,
                PostUpdate {
                    title: Some("  ".to_string()),
                    subtitle: Some("A subtitle".to_string()),
                    description: Some("<p>Body</p>".to_string()),
                    category: Some("Lifestyle".to_string()),
                    thumbnail: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Title");
        assert_eq!(updated.subtitle.as_deref(), Some("A subtitle"));
        assert_eq!(updated.description.as_deref(), Some("<p>Body</p>"));
        assert_eq!(updated.category, Category::Lifestyle);
        assert_eq!(updated.author_id, author);
        assert!(updated.thumbnail.is_none());
    }

    #[tokio::test]
    async fn test_update_uploads_thumbnail() {
        let store = Arc::new(InMemoryStore::new());
        let mut media = MockMediaStore::new();
        media
            .expect_store_thumbnail()
            .times(1)
            .returning(|post_id, _| Ok(format!("https://cdn.test/thumbnails/{}.png", post_id)));
        let service = PostService::new(store.clone(), store.clone(), store.clone())
            .with_media(Arc::new(media));

        let author = Uuid::new_v4();
        let post = service.create(author, "Title", "Photography").await.unwrap();

        let updated = service
            .update(
                post.id,
                author,
                PostUpdate {
                    thumbnail: Some(png()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            updated.thumbnail,
            Some(format!("https://cdn.test/thumbnails/{}.png", post.id))
        );

        // A later update without a file keeps the URL
        let renamed = service
            .update(
                post.id,
                author,
                PostUpdate {
                    title: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.thumbnail, updated.thumbnail);
    }

    #[tokio::test]
    async fn test_media_failure_aborts_update() {
        let store = Arc::new(InMemoryStore::new());
        let mut media = MockMediaStore::new();
        media
            .expect_store_thumbnail()
            .returning(|_, _| Err(AppError::MediaError("bucket unavailable".to_string())));
        let service = PostService::new(store.clone(), store.clone(), store.clone())
            .with_media(Arc::new(media));

        let author = Uuid::new_v4();
        let post = service.create(author, "Title", "Photography").await.unwrap();

        let err = service
            .update(
                post.id,
                author,
                PostUpdate {
                    title: Some("New title".to_string()),
                    thumbnail: Some(png()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MediaError(_)));

        let stored = service.get_by_id(post.id).await.unwrap();
        assert_eq!(stored.post.title, "Title");
    }

    /// Post store whose writes fail after the media upload has happened
    struct UnwritablePosts(Arc<InMemoryStore>);

    #[async_trait::async_trait]
    impl PostStore for UnwritablePosts {
        async fn insert_post(&self, new_post: NewPost) -> Result<Post> {
            self.0.insert_post(new_post).await
        }

        async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>> {
            self.0.find_post(post_id).await
        }

        async fn list_posts(&self, filter: PostFilter) -> Result<Vec<Post>> {
            self.0.list_posts(filter).await
        }

        async fn update_post(
            &self,
            _post_id: Uuid,
            _changes: PostChanges,
        ) -> Result<Option<Post>> {
            Err(AppError::DatabaseError("connection reset".to_string()))
        }

        async fn toggle_published(&self, post_id: Uuid) -> Result<Option<Post>> {
            self.0.toggle_published(post_id).await
        }

        async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Post>> {
            self.0.add_like(post_id, user_id).await
        }

        async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Post>> {
            self.0.remove_like(post_id, user_id).await
        }

        async fn delete_post_with_comments(&self, post_id: Uuid) -> Result<bool> {
            self.0.delete_post_with_comments(post_id).await
        }
    }

    #[tokio::test]
    async fn test_write_failure_after_upload_leaves_post_unchanged() {
        let store = Arc::new(InMemoryStore::new());
        let mut media = MockMediaStore::new();
        media
            .expect_store_thumbnail()
            .times(1)
            .returning(|post_id, _| {
                Ok(format!("https://cdn.test/thumbnails/{}/new.png", post_id))
            });
        let service = PostService::new(
            Arc::new(UnwritablePosts(store.clone())),
            store.clone(),
            store.clone(),
        )
        .with_media(Arc::new(media));

        let author = Uuid::new_v4();
        let post = service.create(author, "Title", "Photography").await.unwrap();

        let err = service
            .update(
                post.id,
                author,
                PostUpdate {
                    title: Some("New title".to_string()),
                    thumbnail: Some(png()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DatabaseError(_)));

        let stored = store.find_post(post.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Title");
        assert!(stored.thumbnail.is_none());
        assert_eq!(stored.updated_at, post.updated_at);
    }

    #[tokio::test]
    async fn test_thumbnail_without_media_store() {
        let (service, _) = service();
        let author = Uuid::new_v4();
        let post = service.create(author, "Title", "Photography").await.unwrap();

        let err = service
            .update(
                post.id,
                author,
                PostUpdate {
                    thumbnail: Some(png()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_owner_delete_cascades_to_comments() {
        let (service, store) = service();
        let author = Uuid::new_v4();
        let post = service.create(author, "Title", "Blogging").await.unwrap();
        let root = store
            .insert_comment(NewComment {
                post_id: post.id,
                user_id: Uuid::new_v4(),
                content: "root".to_string(),
                parent_comment_id: None,
            })
            .await
            .unwrap();
        store
            .insert_comment(NewComment {
                post_id: post.id,
                user_id: Uuid::new_v4(),
                content: "reply".to_string(),
                parent_comment_id: Some(root.id),
            })
            .await
            .unwrap();

        service.delete(post.id, author).await.unwrap();

        assert!(matches!(
            service.get_by_id(post.id).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(store.comment_count().await, 0);
    }

    #[tokio::test]
    async fn test_non_owner_delete_is_forbidden() {
        let (service, store) = service();
        let post = service.create(Uuid::new_v4(), "Title", "Blogging").await.unwrap();
        store
            .insert_comment(NewComment {
                post_id: post.id,
                user_id: Uuid::new_v4(),
                content: "root".to_string(),
                parent_comment_id: None,
            })
            .await
            .unwrap();

        assert!(matches!(
            service.delete(post.id, Uuid::new_v4()).await,
            Err(AppError::Forbidden(_))
        ));
        assert_eq!(store.post_count().await, 1);
        assert_eq!(store.comment_count().await, 1);
    }

    #[tokio::test]
    async fn test_listings_and_aggregate() {
        let (service, _) = service();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let a1 = service.create(alice, "A1", "Travel").await.unwrap();
        let a2 = service.create(alice, "A2", "Travel").await.unwrap();
        let b1 = service.create(bob, "B1", "Sports").await.unwrap();
        service.toggle_publish(a2.id, alice).await.unwrap();

        service.like(a1.id, bob).await.unwrap();
        service.like(a1.id, alice).await.unwrap();
        service.like(a2.id, bob).await.unwrap();

        let all: Vec<Uuid> = service
            .list_all()
            .await
            .unwrap()
            .iter()
            .map(|v| v.post.id)
            .collect();
        assert_eq!(all, vec![b1.id, a2.id, a1.id]);

        let published: Vec<Uuid> = service
            .list_published()
            .await
            .unwrap()
            .iter()
            .map(|v| v.post.id)
            .collect();
        assert_eq!(published, vec![b1.id, a1.id]);

        let own = service.list_owned_by(alice).await.unwrap();
        assert_eq!(own.len(), 2);

        let summary = service.aggregate_likes(alice).await.unwrap();
        assert_eq!(
            summary,
            LikeSummary {
                total_blogs: 2,
                total_likes: 3
            }
        );

        assert!(matches!(
            service.list_owned_by(Uuid::nil()).await,
            Err(AppError::ValidationError(_))
        ));
    }
}
