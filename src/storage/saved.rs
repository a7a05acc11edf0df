use anyhow::Result;

use super::schema::Database;
use super::types::{SavedArticle, UserId};
use crate::news::Article;

impl Database {
    // ========================================================================
    // Saved Article Operations
    // ========================================================================

    /// All articles saved by `user_id`, in the order they were saved.
    pub async fn list_saved(&self, user_id: UserId) -> Result<Vec<SavedArticle>> {
        let rows = sqlx::query_as::<_, SavedArticle>(
            "SELECT id, article FROM user_articles WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(user_id = user_id.0, count = rows.len(), "Loaded saved articles");
        Ok(rows)
    }

    /// Store an opaque article payload for `user_id` and return the new row id.
    ///
    /// No duplicate detection: saving the same payload twice yields two rows.
    pub async fn save_payload(&self, user_id: UserId, payload: &[u8]) -> Result<i64> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO user_articles (user_id, article) VALUES (?, ?) RETURNING id",
        )
        .bind(user_id)
        .bind(payload)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(user_id = user_id.0, article_id = id, "Saved article");
        Ok(id)
    }

    /// Serialize `article` as JSON and store it for `user_id`.
    pub async fn save_article(&self, user_id: UserId, article: &Article) -> Result<i64> {
        let payload = serde_json::to_vec(article)?;
        self.save_payload(user_id, &payload).await
    }

    /// Remove one of `user_id`'s saved articles.
    ///
    /// Returns `false` without error when no such row exists for this user,
    /// including when the id belongs to a different user.
    pub async fn delete_saved(&self, user_id: UserId, article_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM user_articles WHERE id = ? AND user_id = ?")
            .bind(article_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        if !removed {
            tracing::debug!(user_id = user_id.0, article_id, "Delete matched no saved article");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use crate::news::{Article, ArticleSource};
    use crate::storage::{Database, UserId};
    use pretty_assertions::assert_eq;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    fn test_article(title: &str) -> Article {
        Article {
            source: ArticleSource {
                id: Some("bbc-news".to_string()),
                name: "BBC News".to_string(),
            },
            title: title.to_string(),
            description: Some("A description".to_string()),
            url: format!("https://example.com/{}", title.replace(' ', "-")),
            published_at: Some("2024-01-15T10:30:00Z".to_string()),
            content: None,
            extra: Default::default(),
        }
    }

    async fn user(db: &Database, name: &str) -> UserId {
        sqlx::query_as::<_, (i64,)>(
            "INSERT INTO users (username, password, salt) VALUES (?, 'x', 'y') RETURNING id",
        )
        .bind(name)
        .fetch_one(&db.pool)
        .await
        .map(|(id,)| UserId(id))
        .unwrap()
    }

    #[tokio::test]
    async fn test_save_then_list_round_trips() {
        let db = test_db().await;
        let alice = user(&db, "alice").await;
        let article = test_article("Rust 2.0 released");

        let id = db.save_article(alice, &article).await.unwrap();

        let saved = db.list_saved(alice).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, id);
        assert_eq!(saved[0].article().unwrap(), article);
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let db = test_db().await;
        let alice = user(&db, "alice").await;
        for title in ["first", "second", "third"] {
            db.save_article(alice, &test_article(title)).await.unwrap();
        }

        let titles: Vec<String> = db
            .list_saved(alice)
            .await
            .unwrap()
            .iter()
            .map(|s| s.article().unwrap().title)
            .collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_duplicates_are_kept() {
        let db = test_db().await;
        let alice = user(&db, "alice").await;
        let article = test_article("same");
        db.save_article(alice, &article).await.unwrap();
        db.save_article(alice, &article).await.unwrap();
        assert_eq!(db.list_saved(alice).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_lists_are_scoped_to_user() {
        let db = test_db().await;
        let alice = user(&db, "alice").await;
        let bob = user(&db, "bob").await;
        db.save_article(alice, &test_article("alice's")).await.unwrap();

        assert_eq!(db.list_saved(alice).await.unwrap().len(), 1);
        assert!(db.list_saved(bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_opaque_payload_stored_verbatim() {
        let db = test_db().await;
        let alice = user(&db, "alice").await;
        let payload = b"\x00\x01opaque\xff".to_vec();
        db.save_payload(alice, &payload).await.unwrap();

        let saved = db.list_saved(alice).await.unwrap();
        assert_eq!(saved[0].payload, payload);
    }

    #[tokio::test]
    async fn test_delete_removes_from_listing() {
        let db = test_db().await;
        let alice = user(&db, "alice").await;
        let keep = db.save_article(alice, &test_article("keep")).await.unwrap();
        let gone = db.save_article(alice, &test_article("drop")).await.unwrap();

        assert!(db.delete_saved(alice, gone).await.unwrap());

        let ids: Vec<i64> = db.list_saved(alice).await.unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![keep]);
    }

    #[tokio::test]
    async fn test_delete_missing_id_is_noop() {
        let db = test_db().await;
        let alice = user(&db, "alice").await;
        assert!(!db.delete_saved(alice, 9999).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_other_users_article_is_noop() {
        let db = test_db().await;
        let alice = user(&db, "alice").await;
        let mallory = user(&db, "mallory").await;
        let id = db.save_article(alice, &test_article("private")).await.unwrap();

        assert!(!db.delete_saved(mallory, id).await.unwrap());
        assert_eq!(db.list_saved(alice).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_for_unknown_user_fails() {
        let db = test_db().await;
        let result = db.save_article(UserId(424242), &test_article("orphan")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let db = test_db().await;
        let alice = user(&db, "alice").await;
        let first = db.save_article(alice, &test_article("a")).await.unwrap();
        db.delete_saved(alice, first).await.unwrap();
        let second = db.save_article(alice, &test_article("b")).await.unwrap();
        assert!(second > first);
    }
}
