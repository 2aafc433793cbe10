use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{self, StoreError};
use crate::posts::repo_types::{NewPost, Post, PostFilter, PostPage};

const POST_COLUMNS: &str = "id, title, content, author, published, created_at, updated_at";

#[async_trait]
pub trait PostRepo: Send + Sync {
    /// Published posts matching the filter, newest first, plus the total match count.
    async fn list_published(&self, filter: &PostFilter) -> Result<PostPage, StoreError>;
    async fn create(&self, post: NewPost) -> Result<Post, StoreError>;
    /// Round-trip to the backing store.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Escapes LIKE metacharacters and wraps the term for a substring match.
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[derive(Clone)]
pub struct PgPostRepo {
    db: PgPool,
}

impl PgPostRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostRepo for PgPostRepo {
    async fn list_published(&self, filter: &PostFilter) -> Result<PostPage, StoreError> {
        let pattern = filter.query.as_deref().map(like_pattern);

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM posts
            WHERE published = TRUE
              AND ($1::text IS NULL OR title ILIKE $1 OR content ILIKE $1)
            "#,
        )
        .bind(pattern.as_deref())
        .fetch_one(&self.db)
        .await?;

        let items = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE published = TRUE
              AND ($1::text IS NULL OR title ILIKE $1 OR content ILIKE $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(pattern.as_deref())
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.db)
        .await?;

        Ok(PostPage { items, total })
    }

    async fn create(&self, post: NewPost) -> Result<Post, StoreError> {
        let created = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (id, title, content, author, published)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.author)
        .bind(post.published)
        .fetch_one(&self.db)
        .await?;
        Ok(created)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        db::ping(&self.db).await
    }
}
