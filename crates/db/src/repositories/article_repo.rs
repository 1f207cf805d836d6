//! Repository for the `articles` table.

use quill_core::types::DbId;
use sqlx::PgPool;

use crate::models::article::{Article, CreateArticle};

const COLUMNS: &str = "id, title, status, allow_comments, created_at, updated_at";

pub struct ArticleRepo;

impl ArticleRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Article>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM articles WHERE id = $1");
        sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, input: &CreateArticle) -> Result<Article, sqlx::Error> {
        let query = format!(
            "INSERT INTO articles (title, status, allow_comments)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(&input.title)
            .bind(&input.status)
            .bind(input.allow_comments)
            .fetch_one(pool)
            .await
    }
}
