use tracing::{error, info, warn};

use crate::{
    error::AppError,
    moderation::{ContentFilter, Verdict},
    posts::{
        dto::{CreatePostRequest, ListPostsQuery, ListPostsResponse},
        repo::PostRepo,
        repo_types::{NewPost, Post, PostFilter},
    },
};

const TITLE_MIN: usize = 3;
const TITLE_MAX: usize = 200;

pub async fn list(
    posts: &dyn PostRepo,
    query: &ListPostsQuery,
) -> Result<ListPostsResponse, AppError> {
    let page = query.page();
    let page_size = query.page_size();
    let filter = PostFilter {
        query: query.query(),
        limit: page_size,
        offset: (page - 1).saturating_mul(page_size),
    };

    let found = posts.list_published(&filter).await?;
    Ok(ListPostsResponse {
        items: found.items,
        total: found.total,
        page,
        page_size,
    })
}

fn validate_post(req: &CreatePostRequest) -> Result<(), AppError> {
    let title_len = req.title.chars().count();
    if !(TITLE_MIN..=TITLE_MAX).contains(&title_len) {
        return Err(AppError::Validation(format!(
            "title must be between {TITLE_MIN} and {TITLE_MAX} characters"
        )));
    }
    if req.content.is_empty() {
        return Err(AppError::Validation("content is required".into()));
    }
    if req.author.is_empty() {
        return Err(AppError::Validation("author is required".into()));
    }
    Ok(())
}

/// Validates, runs the content filter, and stores the post as published.
///
/// Nothing is written unless the filter returns [`Verdict::Clean`].
pub async fn create(
    posts: &dyn PostRepo,
    filter: &dyn ContentFilter,
    mut req: CreatePostRequest,
) -> Result<Post, AppError> {
    req.title = req.title.trim().to_owned();
    req.content = req.content.trim().to_owned();
    req.author = req.author.trim().to_owned();
    validate_post(&req)?;

    match filter.check(&req.title, &req.content).await {
        Ok(Verdict::Clean) => {}
        Ok(Verdict::Inappropriate) => {
            warn!(author = %req.author, "post rejected by moderation");
            return Err(AppError::RejectedContent);
        }
        Err(e) => {
            error!(error = %e, "content filter unavailable");
            return Err(AppError::ModerationUnavailable(e));
        }
    }

    let post = posts
        .create(NewPost {
            title: req.title,
            content: req.content,
            author: req.author,
            published: true,
        })
        .await?;

    info!(post_id = %post.id, author = %post.author, "post created");
    Ok(post)
}
