//! SQLite implementation of the `KnowledgeStore` port.
//!
//! Schema (created by `init_schema`, for fixtures and tests only — production
//! databases are managed elsewhere):
//!
//! ```text
//! paper(id, year)                 author(id, name)
//! chemical(id, formula)           affiliation(id, name)
//! paper_author(paper_id, author_id)
//! paper_chemical(paper_id, chemical_id)
//! paper_affiliation(paper_id, affiliation_id)
//! paper_keyword(paper_id, keyword)
//! ```
//!
//! Entity ids are the local per-class indices the engine maps into column
//! blocks. Every rusqlite failure surfaces as
//! `GraphError::StoreUnavailable` on the port methods.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use std::ops::Range;
use std::path::Path;
use tracing::debug;

use litgraph_core::{EntityClass, GraphError, KeywordHit, KnowledgeStore, PaperMembership};

use crate::error::Result;

pub struct SqliteKnowledgeStore {
    conn: Connection,
}

fn unavailable(err: rusqlite::Error) -> GraphError {
    GraphError::StoreUnavailable(err.to_string())
}

impl SqliteKnowledgeStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Create the schema. Fixture/test helper; production stores are managed
    /// by the ingestion side.
    pub fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS paper (
                 id   INTEGER PRIMARY KEY,
                 year INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS author (
                 id   INTEGER PRIMARY KEY,
                 name TEXT
             );
             CREATE TABLE IF NOT EXISTS chemical (
                 id      INTEGER PRIMARY KEY,
                 formula TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS affiliation (
                 id   INTEGER PRIMARY KEY,
                 name TEXT
             );
             CREATE TABLE IF NOT EXISTS paper_author (
                 paper_id  INTEGER NOT NULL,
                 author_id INTEGER NOT NULL,
                 PRIMARY KEY (paper_id, author_id)
             );
             CREATE TABLE IF NOT EXISTS paper_chemical (
                 paper_id    INTEGER NOT NULL,
                 chemical_id INTEGER NOT NULL,
                 PRIMARY KEY (paper_id, chemical_id)
             );
             CREATE TABLE IF NOT EXISTS paper_affiliation (
                 paper_id       INTEGER NOT NULL,
                 affiliation_id INTEGER NOT NULL,
                 PRIMARY KEY (paper_id, affiliation_id)
             );
             CREATE TABLE IF NOT EXISTS paper_keyword (
                 paper_id INTEGER NOT NULL,
                 keyword  TEXT NOT NULL,
                 PRIMARY KEY (paper_id, keyword)
             );",
        )?;
        Ok(())
    }

    // ── fixture helpers ──────────────────────────

    pub fn add_paper(&self, id: u32, year: i32) -> Result<()> {
        self.conn
            .execute("INSERT INTO paper (id, year) VALUES (?1, ?2)", params![id, year])?;
        Ok(())
    }

    pub fn add_author(&self, id: u32, name: &str) -> Result<()> {
        self.conn
            .execute("INSERT INTO author (id, name) VALUES (?1, ?2)", params![id, name])?;
        Ok(())
    }

    pub fn add_chemical(&self, id: u32, formula: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO chemical (id, formula) VALUES (?1, ?2)",
            params![id, formula],
        )?;
        Ok(())
    }

    pub fn add_affiliation(&self, id: u32, name: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO affiliation (id, name) VALUES (?1, ?2)",
            params![id, name],
        )?;
        Ok(())
    }

    pub fn link_author(&self, paper_id: u32, author_id: u32) -> Result<()> {
        self.conn.execute(
            "INSERT INTO paper_author VALUES (?1, ?2)",
            params![paper_id, author_id],
        )?;
        Ok(())
    }

    pub fn link_chemical(&self, paper_id: u32, chemical_id: u32) -> Result<()> {
        self.conn.execute(
            "INSERT INTO paper_chemical VALUES (?1, ?2)",
            params![paper_id, chemical_id],
        )?;
        Ok(())
    }

    pub fn link_affiliation(&self, paper_id: u32, affiliation_id: u32) -> Result<()> {
        self.conn.execute(
            "INSERT INTO paper_affiliation VALUES (?1, ?2)",
            params![paper_id, affiliation_id],
        )?;
        Ok(())
    }

    pub fn add_keyword(&self, paper_id: u32, keyword: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO paper_keyword (paper_id, keyword) VALUES (?1, ?2)",
            params![paper_id, keyword],
        )?;
        Ok(())
    }

    // ── read helpers beyond the port ─────────────

    /// Chemical formulas in local-id order, for token rendering.
    pub fn chemical_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT formula FROM chemical ORDER BY id")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<std::result::Result<_, _>>()?)
    }

    /// Publication years in paper-id order, the row-year annotation vector.
    pub fn paper_years(&self) -> Result<Vec<i32>> {
        let mut stmt = self.conn.prepare("SELECT year FROM paper ORDER BY id")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<std::result::Result<_, _>>()?)
    }

    fn membership_table(class: EntityClass) -> Option<(&'static str, &'static str)> {
        match class {
            EntityClass::Author => Some(("paper_author", "author_id")),
            EntityClass::Chemical => Some(("paper_chemical", "chemical_id")),
            EntityClass::Affiliation => Some(("paper_affiliation", "affiliation_id")),
            EntityClass::Paper => None,
        }
    }
}

impl KnowledgeStore for SqliteKnowledgeStore {
    fn count(&self, class: EntityClass) -> litgraph_core::Result<usize> {
        let table = match class {
            EntityClass::Paper => "paper",
            EntityClass::Author => "author",
            EntityClass::Chemical => "chemical",
            EntityClass::Affiliation => "affiliation",
        };
        let n: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })
            .map_err(unavailable)?;
        Ok(n as usize)
    }

    fn memberships(
        &self,
        class: EntityClass,
        papers: Range<u32>,
    ) -> litgraph_core::Result<Vec<PaperMembership>> {
        let (table, column) = Self::membership_table(class)
            .ok_or_else(|| GraphError::invalid("papers have no membership table"))?;
        let sql = format!(
            "SELECT paper_id, {column} FROM {table}
             WHERE paper_id >= ?1 AND paper_id < ?2
             ORDER BY paper_id, {column}"
        );
        let mut stmt = self.conn.prepare(&sql).map_err(unavailable)?;
        let rows = stmt
            .query_map(params![papers.start, papers.end], |row| {
                Ok((row.get::<_, u32>(0)?, row.get::<_, u32>(1)?))
            })
            .map_err(unavailable)?;

        let mut out: Vec<PaperMembership> = Vec::new();
        for row in rows {
            let (paper_id, member_id) = row.map_err(unavailable)?;
            match out.last_mut() {
                Some(m) if m.paper_id == paper_id => m.member_ids.push(member_id),
                _ => out.push(PaperMembership {
                    paper_id,
                    member_ids: vec![member_id],
                }),
            }
        }
        debug!(?class, papers = out.len(), "membership batch fetched");
        Ok(out)
    }

    fn papers_by_keyword_set(
        &self,
        keywords: &[String],
        years: Option<&[i32]>,
        case_sensitive: &[String],
    ) -> litgraph_core::Result<Vec<KeywordHit>> {
        if keywords.is_empty() {
            return Ok(Vec::new());
        }

        let mut clauses = Vec::with_capacity(keywords.len());
        let mut values: Vec<Value> = Vec::new();
        for kw in keywords {
            if case_sensitive.contains(kw) {
                clauses.push("pk.keyword = ?".to_string());
            } else {
                clauses.push("pk.keyword = ? COLLATE NOCASE".to_string());
            }
            values.push(Value::Text(kw.clone()));
        }
        let mut sql = format!(
            "SELECT DISTINCT pk.paper_id, pa.author_id
             FROM paper_keyword pk
             JOIN paper p ON p.id = pk.paper_id
             LEFT JOIN paper_author pa ON pa.paper_id = pk.paper_id
             WHERE ({})",
            clauses.join(" OR ")
        );
        if let Some(years) = years {
            let marks = vec!["?"; years.len()].join(", ");
            sql.push_str(&format!(" AND p.year IN ({})", marks));
            values.extend(years.iter().map(|&y| Value::Integer(y as i64)));
        }
        sql.push_str(" ORDER BY pk.paper_id, pa.author_id");

        let mut stmt = self.conn.prepare(&sql).map_err(unavailable)?;
        let rows = stmt
            .query_map(params_from_iter(values), |row| {
                Ok((row.get::<_, u32>(0)?, row.get::<_, Option<u32>>(1)?))
            })
            .map_err(unavailable)?;

        let mut out: Vec<KeywordHit> = Vec::new();
        for row in rows {
            let (paper_id, author_id) = row.map_err(unavailable)?;
            match out.last_mut() {
                Some(hit) if hit.paper_id == paper_id => {
                    hit.author_ids.extend(author_id);
                }
                _ => out.push(KeywordHit {
                    paper_id,
                    author_ids: author_id.into_iter().collect(),
                }),
            }
        }
        Ok(out)
    }

    fn paper_year(&self, paper_id: u32) -> litgraph_core::Result<i32> {
        self.conn
            .query_row(
                "SELECT year FROM paper WHERE id = ?1",
                params![paper_id],
                |row| row.get(0),
            )
            .map_err(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => {
                    GraphError::invalid(format!("unknown paper id {}", paper_id))
                }
                other => unavailable(other),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> SqliteKnowledgeStore {
        let store = SqliteKnowledgeStore::open_in_memory().unwrap();
        store.init_schema().unwrap();

        for (id, year) in [(0, 2001), (1, 2001), (2, 2002)] {
            store.add_paper(id, year).unwrap();
        }
        store.add_author(0, "Asimov").unwrap();
        store.add_author(1, "Banks").unwrap();
        store.add_chemical(0, "Bi2Te3").unwrap();
        store.add_chemical(1, "PbTe").unwrap();

        store.link_author(0, 0).unwrap();
        store.link_author(1, 0).unwrap();
        store.link_author(2, 1).unwrap();
        store.link_chemical(0, 0).unwrap();
        store.link_chemical(1, 1).unwrap();
        store.link_chemical(2, 0).unwrap();
        store.add_keyword(2, "Thermoelectric").unwrap();
        store
    }

    #[test]
    fn test_counts() {
        let store = fixture();
        assert_eq!(store.count(EntityClass::Paper).unwrap(), 3);
        assert_eq!(store.count(EntityClass::Author).unwrap(), 2);
        assert_eq!(store.count(EntityClass::Chemical).unwrap(), 2);
        assert_eq!(store.count(EntityClass::Affiliation).unwrap(), 0);
    }

    #[test]
    fn test_membership_batches() {
        let store = fixture();
        let batch = store.memberships(EntityClass::Author, 0..2).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].paper_id, 0);
        assert_eq!(batch[0].member_ids, vec![0]);

        let empty = store.memberships(EntityClass::Affiliation, 0..3).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_membership_of_papers_is_invalid() {
        let store = fixture();
        assert!(matches!(
            store.memberships(EntityClass::Paper, 0..1),
            Err(GraphError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_keyword_search_case_insensitive_by_default() {
        let store = fixture();
        let hits = store
            .papers_by_keyword_set(&["thermoelectric".into()], None, &[])
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].paper_id, 2);
        assert_eq!(hits[0].author_ids, vec![1]);
    }

    #[test]
    fn test_keyword_search_case_sensitive() {
        let store = fixture();
        let miss = store
            .papers_by_keyword_set(
                &["thermoelectric".into()],
                None,
                &["thermoelectric".into()],
            )
            .unwrap();
        assert!(miss.is_empty());

        let hit = store
            .papers_by_keyword_set(
                &["Thermoelectric".into()],
                None,
                &["Thermoelectric".into()],
            )
            .unwrap();
        assert_eq!(hit.len(), 1);
    }

    #[test]
    fn test_keyword_search_year_filter() {
        let store = fixture();
        let miss = store
            .papers_by_keyword_set(&["thermoelectric".into()], Some(&[2001]), &[])
            .unwrap();
        assert!(miss.is_empty());

        let hit = store
            .papers_by_keyword_set(&["thermoelectric".into()], Some(&[2001, 2002]), &[])
            .unwrap();
        assert_eq!(hit.len(), 1);
    }

    #[test]
    fn test_paper_year() {
        let store = fixture();
        assert_eq!(store.paper_year(2).unwrap(), 2002);
        assert!(matches!(
            store.paper_year(99),
            Err(GraphError::InvalidArgument(_))
        ));
        assert_eq!(store.paper_years().unwrap(), vec![2001, 2001, 2002]);
    }

    #[test]
    fn test_chemical_names_in_id_order() {
        let store = fixture();
        assert_eq!(store.chemical_names().unwrap(), vec!["Bi2Te3", "PbTe"]);
    }
}
