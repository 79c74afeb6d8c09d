use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;
use uuid::Uuid;

use shared::domain::{Student, StudentFields, StudentId};

const IN_MEMORY_URL: &str = "sqlite::memory:";

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct StoredStudent {
    pub student: Student,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid sqlite url '{database_url}'"))?
            .create_if_missing(true);
        // Every connection to an in-memory url opens its own empty database.
        let max_connections = if database_url.starts_with(IN_MEMORY_URL) {
            1
        } else {
            5
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn create_student(&self, fields: &StudentFields) -> Result<StudentId> {
        let student_id = StudentId::new(Uuid::new_v4().simple().to_string());
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO students
                (id, name, date_of_birth, sex, languages, country, hobbies, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(student_id.as_str())
        .bind(&fields.name)
        .bind(&fields.date_of_birth)
        .bind(&fields.sex)
        .bind(&fields.languages)
        .bind(&fields.country)
        .bind(&fields.hobbies)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("failed to insert student")?;
        debug!("storage: inserted student id={student_id}");
        Ok(student_id)
    }

    pub async fn get_student(&self, student_id: &StudentId) -> Result<Option<StoredStudent>> {
        let row = sqlx::query(
            "SELECT id, name, date_of_birth, sex, languages, country, hobbies, created_at, updated_at
             FROM students WHERE id = ?",
        )
        .bind(student_id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(StoredStudent {
            student: student_from_row(&row)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }

    /// Most recently created first.
    pub async fn list_students(&self) -> Result<Vec<Student>> {
        let rows = sqlx::query(
            "SELECT id, name, date_of_birth, sex, languages, country, hobbies
             FROM students ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list students")?;
        rows.iter().map(student_from_row).collect()
    }

    /// Returns `false` when no row carries the student's id.
    pub async fn update_student(&self, student: &Student) -> Result<bool> {
        let fields = &student.fields;
        let result = sqlx::query(
            "UPDATE students
             SET name = ?, date_of_birth = ?, sex = ?, languages = ?, country = ?, hobbies = ?,
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(&fields.name)
        .bind(&fields.date_of_birth)
        .bind(&fields.sex)
        .bind(&fields.languages)
        .bind(&fields.country)
        .bind(&fields.hobbies)
        .bind(Utc::now())
        .bind(student.id().as_str())
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to update student {}", student.id()))?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns `false` when no row carries the id.
    pub async fn delete_student(&self, student_id: &StudentId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(student_id.as_str())
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete student {student_id}"))?;
        Ok(result.rows_affected() > 0)
    }
}

fn student_from_row(row: &SqliteRow) -> Result<Student> {
    let id: String = row.try_get("id")?;
    let fields = StudentFields {
        name: row.try_get("name")?,
        date_of_birth: row.try_get("date_of_birth")?,
        sex: row.try_get("sex")?,
        languages: row.try_get("languages")?,
        country: row.try_get("country")?,
        hobbies: row.try_get("hobbies")?,
    };
    Ok(Student::new(StudentId::new(id), fields))
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with(IN_MEMORY_URL) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
