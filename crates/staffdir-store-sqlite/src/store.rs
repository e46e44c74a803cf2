//! [`SqliteStore`], the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use staffdir_core::store::{
  Collection, DocQuery, Direction, Document, DocumentStore, Fields,
};

use crate::{
  Error, Result,
  encode::{RawDocument, encode_fields, encode_value, field_path, new_doc_id},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A document store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `sql` once per id inside one transaction. Rolls back and reports
  /// the first id that matched no row.
  async fn batch_by_id(
    &self,
    collection: Collection,
    ids: &[String],
    sql: &'static str,
    patch: Option<String>,
  ) -> Result<()> {
    let table = collection.as_str();
    let ids = ids.to_vec();

    let missing: Option<String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(sql)?;
          for id in ids {
            let changed = match &patch {
              Some(patch) => stmt.execute(rusqlite::params![table, id, patch])?,
              None => stmt.execute(rusqlite::params![table, id])?,
            };
            if changed == 0 {
              return Ok(Some(id));
            }
          }
        }
        tx.commit()?;
        Ok(None)
      })
      .await?;

    match missing {
      Some(id) => {
        tracing::debug!(collection = table, %id, "batch rolled back");
        Err(Error::MissingDocument { collection: table, id })
      }
      None => Ok(()),
    }
  }
}

const UPDATE_SQL: &str =
  "UPDATE documents SET data = json_patch(data, ?3) WHERE collection = ?1 AND doc_id = ?2";

const DELETE_SQL: &str = "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2";

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn create(&self, collection: Collection, fields: Fields) -> Result<String> {
    let id = new_doc_id();
    let data = encode_fields(fields, Utc::now())?;
    let table = collection.as_str();
    let id_for_insert = id.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO documents (collection, doc_id, data) VALUES (?1, ?2, ?3)",
          rusqlite::params![table, id_for_insert, data],
        )?;
        Ok(())
      })
      .await?;

    Ok(id)
  }

  async fn batch_create(&self, collection: Collection, docs: Vec<Fields>) -> Result<Vec<String>> {
    let now = Utc::now();
    let rows = docs
      .into_iter()
      .map(|fields| Ok((new_doc_id(), encode_fields(fields, now)?)))
      .collect::<Result<Vec<_>>>()?;
    let ids = rows.iter().map(|(id, _)| id.clone()).collect();
    let table = collection.as_str();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO documents (collection, doc_id, data) VALUES (?1, ?2, ?3)",
          )?;
          for (id, data) in &rows {
            stmt.execute(rusqlite::params![table, id, data])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(ids)
  }

  /// Merged with SQLite's `json_patch`, so a `null` in `patch` removes the
  /// field.
  async fn update_by_id<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
    patch: Fields,
  ) -> Result<bool> {
    let patch = encode_fields(patch, Utc::now())?;
    let table = collection.as_str();
    let id = id.to_owned();

    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(UPDATE_SQL, rusqlite::params![table, id, patch])?))
      .await?;
    Ok(changed > 0)
  }

  async fn delete_by_id<'a>(&'a self, collection: Collection, id: &'a str) -> Result<bool> {
    let table = collection.as_str();
    let id = id.to_owned();

    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(DELETE_SQL, rusqlite::params![table, id])?))
      .await?;
    Ok(changed > 0)
  }

  async fn batch_update<'a>(
    &'a self,
    collection: Collection,
    ids: &'a [String],
    patch: Fields,
  ) -> Result<()> {
    let patch = encode_fields(patch, Utc::now())?;
    self.batch_by_id(collection, ids, UPDATE_SQL, Some(patch)).await
  }

  async fn batch_delete<'a>(&'a self, collection: Collection, ids: &'a [String]) -> Result<()> {
    self.batch_by_id(collection, ids, DELETE_SQL, None).await
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get<'a>(&'a self, collection: Collection, id: &'a str) -> Result<Option<Document>> {
    let table = collection.as_str();
    let id = id.to_owned();

    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT doc_id, data FROM documents WHERE collection = ?1 AND doc_id = ?2",
              rusqlite::params![table, id],
              RawDocument::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDocument::into_document).transpose()
  }

  async fn query<'a>(&'a self, collection: Collection, query: &'a DocQuery) -> Result<Vec<Document>> {
    let mut params = vec![collection.as_str().to_owned()];
    let mut sql = String::from("SELECT doc_id, data FROM documents WHERE collection = ?1");

    if let Some((field, value)) = &query.where_equals {
      params.push(field_path(field)?);
      params.push(encode_value(value)?);
      sql.push_str(&format!(
        " AND json_extract(data, ?{}) = json_extract(?{}, '$')",
        params.len() - 1,
        params.len(),
      ));
    }

    match &query.order_by {
      Some(order) => {
        params.push(field_path(&order.field)?);
        let direction = match order.direction {
          Direction::Ascending => "ASC",
          Direction::Descending => "DESC",
        };
        sql.push_str(&format!(
          " ORDER BY json_extract(data, ?{}) {direction}, seq",
          params.len(),
        ));
      }
      None => sql.push_str(" ORDER BY seq"),
    }

    let raws: Vec<RawDocument> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawDocument::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDocument::into_document).collect()
  }
}
