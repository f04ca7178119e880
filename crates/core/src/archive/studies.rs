//! Study record operations.
//!
//! Lookup, insert-if-absent, and listing for the memoization table. Records
//! are write-once: there is no update or delete path.

use super::connection::ArchiveDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A persisted market study.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyRecord {
    /// Surrogate id, monotonically assigned by the store.
    pub id: i64,
    /// Canonical activity name, unique across the archive.
    pub activity_name: String,
    /// Generated study body (constrained HTML subset).
    pub content: String,
    /// RFC3339 creation timestamp.
    pub created_at: String,
}

const STUDY_COLUMNS: &str = "id, activity_name, content, created_at";

fn row_to_record(row: &rusqlite::Row<'_>) -> Result<StudyRecord, rusqlite::Error> {
    Ok(StudyRecord {
        id: row.get(0)?,
        activity_name: row.get(1)?,
        content: row.get(2)?,
        created_at: row.get(3)?,
    })
}

impl ArchiveDb {
    /// Get a study by canonical activity name.
    ///
    /// Returns None if no study exists for that name.
    pub async fn lookup_study(&self, activity_name: &str) -> Result<Option<StudyRecord>, Error> {
        let activity_name = activity_name.to_string();
        self.conn
            .call(move |conn| -> Result<Option<StudyRecord>, Error> {
                let mut stmt =
                    conn.prepare(&format!("SELECT {STUDY_COLUMNS} FROM studies WHERE activity_name = ?1"))?;

                let result = stmt.query_row(params![activity_name], row_to_record);

                match result {
                    Ok(record) => Ok(Some(record)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert a study if no record exists for the name yet.
    ///
    /// Uses `ON CONFLICT DO NOTHING`: racing duplicate generations and
    /// re-submissions under a classifier-fallback key both land here, and
    /// the first write wins. Existing records are never overwritten.
    pub async fn insert_study(&self, activity_name: &str, content: &str) -> Result<(), Error> {
        let activity_name = activity_name.to_string();
        let content = content.to_string();
        let created_at = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO studies (activity_name, content, created_at)
                     VALUES (?1, ?2, ?3)
                     ON CONFLICT(activity_name) DO NOTHING",
                    params![activity_name, content, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// List every archived study, most recent first.
    ///
    /// Full scan with no pagination; acceptable for the archive's intended
    /// scale and recorded as a known limit.
    pub async fn list_studies(&self) -> Result<Vec<StudyRecord>, Error> {
        self.conn
            .call(move |conn| -> Result<Vec<StudyRecord>, Error> {
                let mut stmt =
                    conn.prepare(&format!("SELECT {STUDY_COLUMNS} FROM studies ORDER BY id DESC"))?;

                let records = stmt
                    .query_map([], row_to_record)?
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(records)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = ArchiveDb::open_in_memory().await.unwrap();

        db.insert_study("تجارة الملابس الجاهزة", "<h3>دراسة</h3>").await.unwrap();

        let record = db.lookup_study("تجارة الملابس الجاهزة").await.unwrap().unwrap();
        assert_eq!(record.activity_name, "تجارة الملابس الجاهزة");
        assert_eq!(record.content, "<h3>دراسة</h3>");
        assert!(!record.created_at.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_missing() {
        let db = ArchiveDb::open_in_memory().await.unwrap();
        let result = db.lookup_study("nonexistent").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_keeps_first() {
        let db = ArchiveDb::open_in_memory().await.unwrap();

        db.insert_study("تربية المواشي", "first").await.unwrap();
        db.insert_study("تربية المواشي", "second").await.unwrap();

        let record = db.lookup_study("تربية المواشي").await.unwrap().unwrap();
        assert_eq!(record.content, "first");

        let all = db.list_studies().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = ArchiveDb::open_in_memory().await.unwrap();

        db.insert_study("نشاط أول", "a").await.unwrap();
        db.insert_study("نشاط ثاني", "b").await.unwrap();
        db.insert_study("نشاط ثالث", "c").await.unwrap();

        let all = db.list_studies().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].activity_name, "نشاط ثالث");
        assert_eq!(all[2].activity_name, "نشاط أول");
        assert!(all[0].id > all[1].id);
    }

    #[tokio::test]
    async fn test_list_empty_archive() {
        let db = ArchiveDb::open_in_memory().await.unwrap();
        assert!(db.list_studies().await.unwrap().is_empty());
    }
}
