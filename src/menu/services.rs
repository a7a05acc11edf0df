//! Capabilities the interactive session depends on.
//!
//! The session only sees these traits, so a scripted session can run against
//! an in-memory database and a canned news source.
use anyhow::Result;
use async_trait::async_trait;

use crate::news::{Article, NewsClient, NewsError, Source, SourceSelection};
use crate::storage::{CredentialError, Database, SavedArticle, UserId};

/// Registration and login.
#[async_trait]
pub trait Accounts {
    async fn register(&self, username: &str, password: &str) -> Result<UserId, CredentialError>;
    async fn login(&self, username: &str, password: &str) -> Result<UserId, CredentialError>;
}

/// Per-user saved articles.
#[async_trait]
pub trait SavedArticles {
    async fn saved(&self, user: UserId) -> Result<Vec<SavedArticle>>;
    async fn save(&self, user: UserId, article: &Article) -> Result<i64>;
    async fn remove(&self, user: UserId, saved_id: i64) -> Result<bool>;
}

/// Remote source listing and headline search.
#[async_trait]
pub trait NewsSearch {
    async fn sources(&self) -> Result<Vec<Source>, NewsError>;
    async fn headlines(
        &self,
        term: &str,
        selection: &SourceSelection,
    ) -> Result<Vec<Article>, NewsError>;
}

#[async_trait]
impl Accounts for Database {
    async fn register(&self, username: &str, password: &str) -> Result<UserId, CredentialError> {
        self.create_user(username, password).await
    }

    async fn login(&self, username: &str, password: &str) -> Result<UserId, CredentialError> {
        self.authenticate(username, password).await
    }
}

#[async_trait]
impl SavedArticles for Database {
    async fn saved(&self, user: UserId) -> Result<Vec<SavedArticle>> {
        self.list_saved(user).await
    }

    async fn save(&self, user: UserId, article: &Article) -> Result<i64> {
        self.save_article(user, article).await
    }

    async fn remove(&self, user: UserId, saved_id: i64) -> Result<bool> {
        self.delete_saved(user, saved_id).await
    }
}

#[async_trait]
impl NewsSearch for NewsClient {
    async fn sources(&self) -> Result<Vec<Source>, NewsError> {
        self.list_sources().await
    }

    async fn headlines(
        &self,
        term: &str,
        selection: &SourceSelection,
    ) -> Result<Vec<Article>, NewsError> {
        self.search(term, selection).await
    }
}
