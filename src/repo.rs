//! Note repository — all persistence operations over the SQLite store.
//!
//! Each public method maps 1:1 to a store call. Handlers load a note per
//! request and discard it after responding; nothing is cached in-process.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{CreateNote, Note, UpdateNote};

#[derive(Clone)]
pub struct NoteRepository {
    pool: SqlitePool,
}

/// Raw row shape; `tags` is a JSON array and timestamps are Unix millis.
#[derive(sqlx::FromRow)]
struct NoteRow {
    id: String,
    title: String,
    body: String,
    summary: String,
    elaboration: String,
    tags: String,
    created_at: i64,
    updated_at: i64,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Note {
            id: row.id,
            title: row.title,
            body: row.body,
            summary: row.summary,
            elaboration: row.elaboration,
            tags: serde_json::from_str(&row.tags).unwrap_or_default(),
            created_at: millis_to_datetime(row.created_at),
            updated_at: millis_to_datetime(row.updated_at),
        }
    }
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

const SELECT_NOTE: &str =
    "SELECT id, title, body, summary, elaboration, tags, created_at, updated_at FROM notes";

impl NoteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a note. At least one of title or body must be non-empty.
    pub async fn create(&self, fields: CreateNote) -> Result<Note> {
        let title = fields.title.unwrap_or_default();
        let body = fields.body.unwrap_or_default();
        if title.is_empty() && body.is_empty() {
            return Err(Error::Validation(
                "Either title or body is required.".to_string(),
            ));
        }

        let id = Uuid::new_v4().to_string();
        let tags = fields.tags.unwrap_or_default();
        let tags_json = serde_json::to_string(&tags).map_err(|e| Error::Validation(e.to_string()))?;
        let now = Utc::now().timestamp_millis();

        sqlx::query(
            "INSERT INTO notes (id, title, body, tags, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&title)
        .bind(&body)
        .bind(&tags_json)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(&id).await
    }

    /// All notes, newest first. Ties on `created_at` fall back to insertion
    /// order (also newest first).
    pub async fn list(&self) -> Result<Vec<Note>> {
        let rows: Vec<NoteRow> =
            sqlx::query_as(&format!("{} ORDER BY created_at DESC, rowid DESC", SELECT_NOTE))
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Note::from).collect())
    }

    pub async fn get(&self, id: &str) -> Result<Note> {
        let row: Option<NoteRow> = sqlx::query_as(&format!("{} WHERE id = ?", SELECT_NOTE))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Note::from)
            .ok_or_else(|| Error::NotFound("Note not found.".to_string()))
    }

    /// Partial update of title/body/tags. Absent fields are left unchanged;
    /// a present tags array replaces the full set.
    pub async fn update(&self, id: &str, fields: UpdateNote) -> Result<Note> {
        let mut note = self.get(id).await?;

        if let Some(title) = fields.title {
            note.title = title;
        }
        if let Some(body) = fields.body {
            note.body = body;
        }
        if let Some(tags) = fields.tags {
            note.tags = tags;
        }

        let tags_json =
            serde_json::to_string(&note.tags).map_err(|e| Error::Validation(e.to_string()))?;

        sqlx::query(
            "UPDATE notes SET title = ?, body = ?, tags = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&note.title)
        .bind(&note.body)
        .bind(&tags_json)
        .bind(Utc::now().timestamp_millis())
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Note not found.".to_string()));
        }
        Ok(())
    }

    /// Store the summarize result.
    pub async fn set_summary(&self, id: &str, text: &str) -> Result<()> {
        self.set_field("summary", id, text).await
    }

    /// Store the generated title.
    pub async fn set_title(&self, id: &str, text: &str) -> Result<()> {
        self.set_field("title", id, text).await
    }

    /// Store the elaborate result.
    pub async fn set_elaboration(&self, id: &str, text: &str) -> Result<()> {
        self.set_field("elaboration", id, text).await
    }

    async fn set_field(&self, column: &'static str, id: &str, text: &str) -> Result<()> {
        // column is a fixed identifier from the three callers above
        let result = sqlx::query(&format!(
            "UPDATE notes SET {} = ?, updated_at = ? WHERE id = ?",
            column
        ))
        .bind(text)
        .bind(Utc::now().timestamp_millis())
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Note not found.".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::{db, migrate};
    use tempfile::TempDir;

    async fn test_repo() -> (TempDir, NoteRepository) {
        let tmp = TempDir::new().unwrap();
        let config = Config {
            db: crate::config::DbConfig {
                path: tmp.path().join("notes.sqlite"),
            },
            ..Config::default()
        };
        let pool = db::connect(&config).await.unwrap();
        migrate::apply(&pool).await.unwrap();
        (tmp, NoteRepository::new(pool))
    }

    fn fields(title: &str, body: &str) -> CreateNote {
        CreateNote {
            title: Some(title.to_string()),
            body: Some(body.to_string()),
            tags: None,
        }
    }

    #[tokio::test]
    async fn create_requires_title_or_body() {
        let (_tmp, repo) = test_repo().await;
        let err = repo.create(CreateNote::default()).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        // Either field alone is enough
        assert!(repo.create(fields("only title", "")).await.is_ok());
        assert!(repo.create(fields("", "only body")).await.is_ok());
    }

    #[tokio::test]
    async fn create_roundtrip_defaults() {
        let (_tmp, repo) = test_repo().await;
        let created = repo.create(fields("A", "hello")).await.unwrap();

        let fetched = repo.get(&created.id).await.unwrap();
        assert_eq!(fetched.title, "A");
        assert_eq!(fetched.body, "hello");
        assert!(fetched.tags.is_empty());
        assert!(fetched.summary.is_empty());
        assert!(fetched.elaboration.is_empty());
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let (_tmp, repo) = test_repo().await;
        let a = repo.create(fields("A", "first")).await.unwrap();
        let b = repo.create(fields("B", "second")).await.unwrap();

        let notes = repo.list().await.unwrap();
        let ids: Vec<&str> = notes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec![b.id.as_str(), a.id.as_str()]);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let (_tmp, repo) = test_repo().await;
        let err = repo.get("no-such-id").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn update_touches_only_supplied_fields() {
        let (_tmp, repo) = test_repo().await;
        let note = repo
            .create(CreateNote {
                title: Some("original".to_string()),
                body: Some("body".to_string()),
                tags: Some(vec!["one".to_string(), "two".to_string()]),
            })
            .await
            .unwrap();

        let updated = repo
            .update(
                &note.id,
                UpdateNote {
                    title: Some("renamed".to_string()),
                    ..UpdateNote::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.body, "body");
        assert_eq!(updated.tags, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn update_replaces_tag_set() {
        let (_tmp, repo) = test_repo().await;
        let note = repo
            .create(CreateNote {
                title: Some("t".to_string()),
                body: None,
                tags: Some(vec!["keep".to_string(), "drop".to_string()]),
            })
            .await
            .unwrap();

        // An empty supplied array clears the set, not merges
        let updated = repo
            .update(
                &note.id,
                UpdateNote {
                    tags: Some(vec![]),
                    ..UpdateNote::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.tags.is_empty());
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let (_tmp, repo) = test_repo().await;
        let err = repo
            .update("no-such-id", UpdateNote::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_note() {
        let (_tmp, repo) = test_repo().await;
        let note = repo.create(fields("gone", "")).await.unwrap();

        repo.delete(&note.id).await.unwrap();
        assert!(matches!(
            repo.get(&note.id).await.unwrap_err(),
            Error::NotFound(_)
        ));
        // Second delete reports not found
        assert!(matches!(
            repo.delete(&note.id).await.unwrap_err(),
            Error::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn ai_field_writes_persist() {
        let (_tmp, repo) = test_repo().await;
        let note = repo.create(fields("t", "b")).await.unwrap();

        repo.set_summary(&note.id, "a summary").await.unwrap();
        repo.set_elaboration(&note.id, "longer text").await.unwrap();
        repo.set_title(&note.id, "Generated Title").await.unwrap();

        let fetched = repo.get(&note.id).await.unwrap();
        assert_eq!(fetched.summary, "a summary");
        assert_eq!(fetched.elaboration, "longer text");
        assert_eq!(fetched.title, "Generated Title");
        assert!(fetched.updated_at >= fetched.created_at);
    }

    #[tokio::test]
    async fn tags_preserve_insertion_order() {
        let (_tmp, repo) = test_repo().await;
        let tags: Vec<String> = ["zebra", "alpha", "middle"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let note = repo
            .create(CreateNote {
                title: Some("t".to_string()),
                body: None,
                tags: Some(tags.clone()),
            })
            .await
            .unwrap();
        assert_eq!(repo.get(&note.id).await.unwrap().tags, tags);
    }
}
