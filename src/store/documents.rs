use super::{Db, serialize_vector};
use crate::document::Document;
use rusqlite::{OptionalExtension, Result, params};

impl Db {
    /// Insert a document with its embedding under the given identity key.
    ///
    /// Returns `true` if the document was inserted, `false` if an entry with
    /// the same key already existed. The conflict check happens inside the
    /// insert itself, so concurrent writers with overlapping keys still
    /// converge to exactly one entry per key.
    pub fn insert_document(
        &mut self,
        doc_key: &str,
        document: &Document,
        embedding: &[f32],
    ) -> Result<bool> {
        let tx = self.conn.transaction()?;

        let inserted = tx.execute(
            r#"
            INSERT INTO documents (doc_key, title, url, domain, content)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(doc_key) DO NOTHING
            "#,
            params![
                doc_key,
                document.title,
                document.url,
                document.domain,
                document.content
            ],
        )?;

        if inserted > 0 {
            let doc_id = tx.last_insert_rowid();
            let vector_blob = serialize_vector(embedding);
            tx.execute(
                "INSERT INTO vec_documents (rowid, embedding) VALUES (?, ?)",
                params![doc_id, vector_blob],
            )?;
        }

        tx.commit()?;
        Ok(inserted > 0)
    }

    /// Whether a document with the given identity key is already stored.
    pub fn contains_document(&self, doc_key: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM documents WHERE doc_key = ?",
                params![doc_key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Total number of stored documents.
    pub fn count_documents(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Most recently stored document titles, newest first.
    pub fn recent_titles(&self, limit: usize) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT title FROM documents ORDER BY id DESC LIMIT ?")?;
        let rows = stmt.query_map(params![limit as i64], |row| row.get(0))?;

        let mut titles = Vec::new();
        for row in rows {
            titles.push(row?);
        }
        Ok(titles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_doc(url: &str) -> Document {
        Document {
            title: "Sample".to_string(),
            content: "Some reasonably long sample content for testing.".to_string(),
            url: url.to_string(),
            domain: "example.com".to_string(),
        }
    }

    #[test]
    fn test_insert_and_count() {
        let mut db = Db::open_in_memory().unwrap();
        assert_eq!(db.count_documents().unwrap(), 0);

        let doc = sample_doc("https://example.com/a");
        let inserted = db
            .insert_document("key-a", &doc, &vec![0.1; 384])
            .unwrap();
        assert!(inserted);
        assert_eq!(db.count_documents().unwrap(), 1);
        assert!(db.contains_document("key-a").unwrap());
        assert!(!db.contains_document("key-b").unwrap());
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut db = Db::open_in_memory().unwrap();
        let doc = sample_doc("https://example.com/a");

        assert!(db.insert_document("key-a", &doc, &vec![0.1; 384]).unwrap());
        assert!(!db.insert_document("key-a", &doc, &vec![0.1; 384]).unwrap());
        assert_eq!(db.count_documents().unwrap(), 1);

        // The vector side must not accumulate orphan rows either
        let vec_count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM vec_documents", [], |row| row.get(0))
            .unwrap();
        assert_eq!(vec_count, 1);
    }

    #[test]
    fn test_recent_titles_newest_first() {
        let mut db = Db::open_in_memory().unwrap();
        for (key, title) in [("k1", "First"), ("k2", "Second"), ("k3", "Third")] {
            let mut doc = sample_doc(&format!("https://example.com/{key}"));
            doc.title = title.to_string();
            db.insert_document(key, &doc, &vec![0.1; 384]).unwrap();
        }

        let titles = db.recent_titles(2).unwrap();
        assert_eq!(titles, vec!["Third".to_string(), "Second".to_string()]);
    }
}
