use super::models::DocumentMatch;
use super::{Db, serialize_vector};
use rusqlite::{Result, params};

fn map_match_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DocumentMatch> {
    Ok(DocumentMatch {
        title: row.get(0)?,
        content: row.get(1)?,
        url: row.get(2)?,
        domain: row.get(3)?,
        distance: row.get(4)?,
    })
}

impl Db {
    /// Nearest-neighbor search by cosine distance, ascending.
    ///
    /// An empty store yields an empty list, not an error.
    pub fn nearest(&self, query_vector: &[f32], k: usize) -> Result<Vec<DocumentMatch>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                d.title,
                d.content,
                d.url,
                d.domain,
                vec_distance_cosine(v.embedding, ?) as distance
            FROM vec_documents v
            JOIN documents d ON v.rowid = d.id
            ORDER BY distance ASC
            LIMIT ?
            "#,
        )?;

        let rows = stmt.query_map(
            params![serialize_vector(query_vector), k as i64],
            map_match_row,
        )?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }
}
