// ABOUTME: Persistence layer for searches, transcripts, results, themes and property chats
// ABOUTME: Defines the store traits consumed by the engine and their SQLite implementation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! The search engine and the chat service only see the [`SearchStore`] and
//! [`ChatStore`] traits. [`Database`] implements both on top of a `SQLite`
//! pool and bootstraps its own tables on connect.
//!
//! Each table family has a small manager holding a pool handle; the trait
//! implementations delegate to them.

mod homes;
mod results;
mod searches;
mod themes;

pub use homes::HomeManager;
pub use results::ResultManager;
pub use searches::SearchManager;
pub use themes::ThemeManager;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use honing_core::errors::{AppError, AppResult};
use honing_core::models::{
    Chat, ChatType, ConversationMessage, Home, NewChat, NewChatType, NewConversationMessage,
    NewHome, NewResultGroup, NewResultPoint, NewSearchQuery, NewTheme, ResultGroup, ResultPoint,
    SearchQuery, Theme,
};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite, SqlitePool};
use tracing::{debug, info};

/// Timestamp format shared by every table; fixed width so text ordering is chronological
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ============================================================================
// Store Traits
// ============================================================================

/// Persistence consumed by the search engine
///
/// Every write is independent; a round that fails half way leaves the writes
/// it already made in place.
#[async_trait]
pub trait SearchStore: Send + Sync {
    /// Create a theme
    async fn create_theme(&self, theme: &NewTheme) -> AppResult<Theme>;

    /// Get a theme by ID
    async fn get_theme(&self, theme_id: &str) -> AppResult<Option<Theme>>;

    /// Create a search with unset status
    async fn create_search(&self, search: &NewSearchQuery) -> AppResult<SearchQuery>;

    /// Get a search by ID
    async fn get_search(&self, search_id: &str) -> AppResult<Option<SearchQuery>>;

    /// List the searches of a theme, oldest first
    async fn list_searches(&self, theme_id: &str) -> AppResult<Vec<SearchQuery>>;

    /// Persist a search's mutable fields and return it with a fresh `updated_at`
    async fn save_search(&self, search: &SearchQuery) -> AppResult<SearchQuery>;

    /// Delete a search with its messages, groups and points
    async fn delete_search(&self, search_id: &str) -> AppResult<bool>;

    /// Transcript of a search ordered by creation
    async fn list_messages(&self, search_id: &str) -> AppResult<Vec<ConversationMessage>>;

    /// Append a message to a transcript
    async fn create_message(
        &self,
        message: &NewConversationMessage,
    ) -> AppResult<ConversationMessage>;

    /// Create a result group
    async fn create_result_group(&self, group: &NewResultGroup) -> AppResult<ResultGroup>;

    /// Groups of a search in creation order
    async fn list_result_groups(&self, search_id: &str) -> AppResult<Vec<ResultGroup>>;

    /// Create a result point
    async fn create_result_point(&self, point: &NewResultPoint) -> AppResult<ResultPoint>;

    /// Points of a search in creation order
    async fn list_result_points(&self, search_id: &str) -> AppResult<Vec<ResultPoint>>;

    /// Record the outcome of placement for one point
    async fn update_point_location(
        &self,
        point_id: &str,
        lat: Option<f64>,
        lng: Option<f64>,
        warning_message: &str,
    ) -> AppResult<()>;
}

/// Persistence consumed by the property chat service
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Register a home
    async fn create_home(&self, home: &NewHome) -> AppResult<Home>;

    /// Get a home by ID
    async fn get_home(&self, home_id: &str) -> AppResult<Option<Home>>;

    /// Define a chat type
    async fn create_chat_type(&self, chat_type: &NewChatType) -> AppResult<ChatType>;

    /// Chat types of a theme in creation order
    async fn list_chat_types(&self, theme_id: &str) -> AppResult<Vec<ChatType>>;

    /// Persist a generated chat with its results
    async fn create_chat(&self, chat: &NewChat) -> AppResult<Chat>;

    /// Chats generated for a home, oldest first
    async fn list_chats(&self, home_id: &str) -> AppResult<Vec<Chat>>;
}

// ============================================================================
// SQLite Implementation
// ============================================================================

/// `SQLite`-backed store
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Connect and bootstrap the schema
    ///
    /// In-memory URLs get a single connection so every query sees the same
    /// database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let in_memory = database_url.contains(":memory:");

        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if in_memory || database_url.contains("mode=") {
            database_url.to_owned()
        } else {
            format!("{database_url}?mode=rwc")
        };

        let mut pool_options = SqlitePoolOptions::new().max_connections(if in_memory { 1 } else { 5 });
        if in_memory {
            // Dropping the only connection would drop the database with it
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options
            .connect(&connection_options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to database: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;

        info!(in_memory, "Database ready");
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if a statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_themes().await?;
        self.migrate_searches().await?;
        self.migrate_results().await?;
        self.migrate_homes().await?;

        debug!("Database migrations applied");
        Ok(())
    }

    async fn execute_all(&self, statements: &[&str], context: &str) -> AppResult<()> {
        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to migrate {context}: {e}")))?;
        }
        Ok(())
    }

    async fn migrate_themes(&self) -> AppResult<()> {
        self.execute_all(
            &[r"
            CREATE TABLE IF NOT EXISTS themes (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                start_geo_system_prompt TEXT,
                start_system_prompt TEXT,
                created_at TEXT NOT NULL
            )
            "],
            "themes",
        )
        .await
    }

    async fn migrate_searches(&self) -> AppResult<()> {
        self.execute_all(
            &[
                r"
                CREATE TABLE IF NOT EXISTS searches (
                    id TEXT PRIMARY KEY,
                    theme_id TEXT NOT NULL,
                    display_name TEXT NOT NULL,
                    query TEXT NOT NULL,
                    status TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                )
                ",
                r"
                CREATE TABLE IF NOT EXISTS search_messages (
                    id TEXT PRIMARY KEY,
                    search_id TEXT NOT NULL REFERENCES searches(id) ON DELETE CASCADE,
                    role TEXT NOT NULL CHECK (role IN ('system', 'user', 'assistant')),
                    content TEXT NOT NULL,
                    created_at TEXT NOT NULL
                )
                ",
                "CREATE INDEX IF NOT EXISTS idx_searches_theme ON searches(theme_id)",
                "CREATE INDEX IF NOT EXISTS idx_search_messages_search ON search_messages(search_id, created_at)",
            ],
            "searches",
        )
        .await
    }

    async fn migrate_results(&self) -> AppResult<()> {
        self.execute_all(
            &[
                r"
                CREATE TABLE IF NOT EXISTS result_groups (
                    id TEXT PRIMARY KEY,
                    search_id TEXT NOT NULL REFERENCES searches(id) ON DELETE CASCADE,
                    display_name TEXT NOT NULL,
                    point_type_name TEXT NOT NULL,
                    created_at TEXT NOT NULL
                )
                ",
                r"
                CREATE TABLE IF NOT EXISTS result_points (
                    id TEXT PRIMARY KEY,
                    theme_id TEXT NOT NULL,
                    search_id TEXT NOT NULL REFERENCES searches(id) ON DELETE CASCADE,
                    group_id TEXT NOT NULL REFERENCES result_groups(id) ON DELETE CASCADE,
                    title TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    point_type TEXT NOT NULL,
                    lat REAL,
                    lng REAL,
                    warning_message TEXT NOT NULL DEFAULT '',
                    created_at TEXT NOT NULL
                )
                ",
                "CREATE INDEX IF NOT EXISTS idx_result_groups_search ON result_groups(search_id)",
                "CREATE INDEX IF NOT EXISTS idx_result_points_search ON result_points(search_id)",
                "CREATE INDEX IF NOT EXISTS idx_result_points_group ON result_points(group_id)",
            ],
            "results",
        )
        .await
    }

    async fn migrate_homes(&self) -> AppResult<()> {
        self.execute_all(
            &[
                r"
                CREATE TABLE IF NOT EXISTS homes (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    url TEXT,
                    clean_address TEXT NOT NULL,
                    clean_suburb TEXT NOT NULL,
                    lat REAL NOT NULL,
                    lng REAL NOT NULL,
                    created_at TEXT NOT NULL
                )
                ",
                r"
                CREATE TABLE IF NOT EXISTS chat_types (
                    id TEXT PRIMARY KEY,
                    theme_id TEXT NOT NULL,
                    name TEXT NOT NULL,
                    prompt TEXT NOT NULL,
                    address_type TEXT NOT NULL,
                    start_system_prompt_override TEXT,
                    created_at TEXT NOT NULL
                )
                ",
                r"
                CREATE TABLE IF NOT EXISTS chats (
                    id TEXT PRIMARY KEY,
                    home_id TEXT NOT NULL REFERENCES homes(id) ON DELETE CASCADE,
                    chat_type_id TEXT NOT NULL,
                    chat_type_title TEXT NOT NULL,
                    theme_id TEXT NOT NULL,
                    prompt TEXT NOT NULL,
                    rating INTEGER NOT NULL,
                    created_at TEXT NOT NULL
                )
                ",
                r"
                CREATE TABLE IF NOT EXISTS chat_results (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    chat_id TEXT NOT NULL REFERENCES chats(id) ON DELETE CASCADE,
                    role TEXT NOT NULL,
                    content TEXT NOT NULL
                )
                ",
                "CREATE INDEX IF NOT EXISTS idx_chat_types_theme ON chat_types(theme_id)",
                "CREATE INDEX IF NOT EXISTS idx_chats_home ON chats(home_id)",
                "CREATE INDEX IF NOT EXISTS idx_chat_results_chat ON chat_results(chat_id)",
            ],
            "homes",
        )
        .await
    }

    fn searches(&self) -> SearchManager {
        SearchManager::new(self.pool.clone())
    }

    fn results(&self) -> ResultManager {
        ResultManager::new(self.pool.clone())
    }

    fn themes(&self) -> ThemeManager {
        ThemeManager::new(self.pool.clone())
    }

    fn homes(&self) -> HomeManager {
        HomeManager::new(self.pool.clone())
    }
}

#[async_trait]
impl SearchStore for Database {
    async fn create_theme(&self, theme: &NewTheme) -> AppResult<Theme> {
        self.themes().create(theme).await
    }

    async fn get_theme(&self, theme_id: &str) -> AppResult<Option<Theme>> {
        self.themes().get(theme_id).await
    }

    async fn create_search(&self, search: &NewSearchQuery) -> AppResult<SearchQuery> {
        self.searches().create(search).await
    }

    async fn get_search(&self, search_id: &str) -> AppResult<Option<SearchQuery>> {
        self.searches().get(search_id).await
    }

    async fn list_searches(&self, theme_id: &str) -> AppResult<Vec<SearchQuery>> {
        self.searches().list_for_theme(theme_id).await
    }

    async fn save_search(&self, search: &SearchQuery) -> AppResult<SearchQuery> {
        self.searches().save(search).await
    }

    async fn delete_search(&self, search_id: &str) -> AppResult<bool> {
        self.searches().delete(search_id).await
    }

    async fn list_messages(&self, search_id: &str) -> AppResult<Vec<ConversationMessage>> {
        self.searches().list_messages(search_id).await
    }

    async fn create_message(
        &self,
        message: &NewConversationMessage,
    ) -> AppResult<ConversationMessage> {
        self.searches().create_message(message).await
    }

    async fn create_result_group(&self, group: &NewResultGroup) -> AppResult<ResultGroup> {
        self.results().create_group(group).await
    }

    async fn list_result_groups(&self, search_id: &str) -> AppResult<Vec<ResultGroup>> {
        self.results().list_groups(search_id).await
    }

    async fn create_result_point(&self, point: &NewResultPoint) -> AppResult<ResultPoint> {
        self.results().create_point(point).await
    }

    async fn list_result_points(&self, search_id: &str) -> AppResult<Vec<ResultPoint>> {
        self.results().list_points(search_id).await
    }

    async fn update_point_location(
        &self,
        point_id: &str,
        lat: Option<f64>,
        lng: Option<f64>,
        warning_message: &str,
    ) -> AppResult<()> {
        self.results()
            .update_location(point_id, lat, lng, warning_message)
            .await
    }
}

#[async_trait]
impl ChatStore for Database {
    async fn create_home(&self, home: &NewHome) -> AppResult<Home> {
        self.homes().create_home(home).await
    }

    async fn get_home(&self, home_id: &str) -> AppResult<Option<Home>> {
        self.homes().get_home(home_id).await
    }

    async fn create_chat_type(&self, chat_type: &NewChatType) -> AppResult<ChatType> {
        self.homes().create_chat_type(chat_type).await
    }

    async fn list_chat_types(&self, theme_id: &str) -> AppResult<Vec<ChatType>> {
        self.homes().list_chat_types(theme_id).await
    }

    async fn create_chat(&self, chat: &NewChat) -> AppResult<Chat> {
        self.homes().create_chat(chat).await
    }

    async fn list_chats(&self, home_id: &str) -> AppResult<Vec<Chat>> {
        self.homes().list_chats(home_id).await
    }
}
