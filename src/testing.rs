//! In-memory repositories and a scripted content filter for tests.

use std::sync::{
    atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::{
        jwt::SessionKeys,
        repo::UserRepo,
        repo_types::{NewUser, User},
    },
    config::{AppConfig, JwtConfig, ModerationConfig, DEFAULT_MODERATION_URL},
    db::StoreError,
    moderation::{ContentFilter, ModerationError, Verdict},
    posts::{
        repo::PostRepo,
        repo_types::{NewPost, Post, PostFilter, PostPage},
    },
    state::AppState,
};

fn injected_failure(slot: &Mutex<Option<String>>) -> Result<(), StoreError> {
    match slot.lock().map(|g| g.clone()) {
        Ok(Some(msg)) => Err(StoreError::Backend(msg)),
        _ => Ok(()),
    }
}

#[derive(Default)]
pub struct MemoryUserRepo {
    users: RwLock<Vec<User>>,
    skip_precheck: AtomicBool,
    fail: Mutex<Option<String>>,
}

impl MemoryUserRepo {
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Makes the up-front duplicate count always report zero, so duplicates
    /// are only caught by the insert.
    pub fn skip_precheck(&self, skip: bool) {
        self.skip_precheck.store(skip, Ordering::SeqCst);
    }

    pub fn fail_with(&self, msg: &str) {
        *self.fail.lock().unwrap() = Some(msg.to_owned());
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        injected_failure(&self.fail)?;
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.email == email && u.deleted_at.is_none())
            .cloned())
    }

    async fn count_with_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<i64, StoreError> {
        injected_failure(&self.fail)?;
        if self.skip_precheck.load(Ordering::SeqCst) {
            return Ok(0);
        }
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|u| u.deleted_at.is_none() && (u.username == username || u.email == email))
            .count() as i64)
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        injected_failure(&self.fail)?;
        let mut users = self.users.write().await;
        let live = users.iter().filter(|u| u.deleted_at.is_none());
        for existing in live {
            if existing.username == user.username {
                return Err(StoreError::UniqueViolation(Some("users_username_key".into())));
            }
            if existing.email == user.email {
                return Err(StoreError::UniqueViolation(Some("users_email_key".into())));
            }
        }
        let now = OffsetDateTime::now_utc();
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            full_name: user.full_name,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        users.push(created.clone());
        Ok(created)
    }
}

/// Hands out strictly increasing `created_at` values so ordering is deterministic.
#[derive(Default)]
pub struct MemoryPostRepo {
    posts: RwLock<Vec<Post>>,
    clock: AtomicI64,
    fail: Mutex<Option<String>>,
}

impl MemoryPostRepo {
    pub async fn len(&self) -> usize {
        self.posts.read().await.len()
    }

    pub fn fail_with(&self, msg: &str) {
        *self.fail.lock().unwrap() = Some(msg.to_owned());
    }

    pub async fn insert_draft(&self, title: &str) {
        self.insert(NewPost {
            title: title.into(),
            content: "draft body".into(),
            author: "editor".into(),
            published: false,
        })
        .await;
    }

    async fn insert(&self, post: NewPost) -> Post {
        let tick = self.clock.fetch_add(1, Ordering::SeqCst);
        let at = OffsetDateTime::UNIX_EPOCH + Duration::days(20_000) + Duration::seconds(tick);
        let created = Post {
            id: Uuid::new_v4(),
            title: post.title,
            content: post.content,
            author: post.author,
            published: post.published,
            created_at: at,
            updated_at: at,
        };
        self.posts.write().await.push(created.clone());
        created
    }
}

#[async_trait]
impl PostRepo for MemoryPostRepo {
    async fn list_published(&self, filter: &PostFilter) -> Result<PostPage, StoreError> {
        injected_failure(&self.fail)?;
        let needle = filter.query.as_deref().map(str::to_lowercase);
        let mut matching: Vec<Post> = self
            .posts
            .read()
            .await
            .iter()
            .filter(|p| p.published)
            .filter(|p| match &needle {
                Some(n) => {
                    p.title.to_lowercase().contains(n) || p.content.to_lowercase().contains(n)
                }
                None => true,
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect();
        Ok(PostPage { items, total })
    }

    async fn create(&self, post: NewPost) -> Result<Post, StoreError> {
        injected_failure(&self.fail)?;
        Ok(self.insert(post).await)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        injected_failure(&self.fail)
    }
}

enum Script {
    Clean,
    Inappropriate,
    Unavailable,
}

/// Content filter returning a fixed outcome and counting calls.
pub struct ScriptedFilter {
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedFilter {
    fn with(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn clean() -> Self {
        Self::with(Script::Clean)
    }

    pub fn inappropriate() -> Self {
        Self::with(Script::Inappropriate)
    }

    pub fn unavailable() -> Self {
        Self::with(Script::Unavailable)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentFilter for ScriptedFilter {
    async fn check(&self, _title: &str, _content: &str) -> Result<Verdict, ModerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script {
            Script::Clean => Ok(Verdict::Clean),
            Script::Inappropriate => Ok(Verdict::Inappropriate),
            Script::Unavailable => Err(ModerationError::Api("scripted outage".into())),
        }
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        database_max_connections: 1,
        jwt: JwtConfig {
            secret: "test-secret".into(),
            issuer: "blog-api".into(),
            audience: "blog-api-users".into(),
            ttl_minutes: 60 * 24,
        },
        moderation: ModerationConfig {
            api_key: None,
            api_url: DEFAULT_MODERATION_URL.into(),
            model: "deepseek-chat".into(),
            timeout_secs: 30,
        },
        cors_allowed_origin: "http://localhost:3000".into(),
    }
}

pub fn test_keys() -> SessionKeys {
    SessionKeys::new(&test_config().jwt)
}

pub struct TestApp {
    pub state: AppState,
    pub users: Arc<MemoryUserRepo>,
    pub posts: Arc<MemoryPostRepo>,
    pub filter: Arc<ScriptedFilter>,
    pub keys: SessionKeys,
}

pub fn test_state(filter: ScriptedFilter) -> TestApp {
    let users = Arc::new(MemoryUserRepo::default());
    let posts = Arc::new(MemoryPostRepo::default());
    let filter = Arc::new(filter);
    let state = AppState::from_parts(
        Arc::new(test_config()),
        users.clone(),
        posts.clone(),
        filter.clone(),
    );
    let keys = state.keys.clone();
    TestApp {
        state,
        users,
        posts,
        filter,
        keys,
    }
}
