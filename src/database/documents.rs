use serde_json::{Map, Value};
use rusqlite::params;
use tracing::debug;

use super::{Database, DatabaseError};
use crate::models::{Document, DocumentId, Email};

/// Tables holding schemaless documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Profiles,
    Allergens,
    MealPlans,
}

impl Collection {
    fn table(self) -> &'static str {
        match self {
            Collection::Profiles => "profiles",
            Collection::Allergens => "allergens",
            Collection::MealPlans => "meal_plans",
        }
    }
}

type DocumentRow = (String, String, String);

fn decode(row: DocumentRow) -> Result<Document, DatabaseError> {
    let (id, email, body) = row;
    let corrupt = |reason: String| DatabaseError::Corrupt {
        id: id.clone(),
        reason,
    };

    let parsed_id: DocumentId = id.parse().map_err(|e| corrupt(format!("{}", e)))?;
    let email = Email::parse(&email).map_err(|e| corrupt(e.to_string()))?;
    let fields: Map<String, Value> =
        serde_json::from_str(&body).map_err(|e| corrupt(e.to_string()))?;

    Ok(Document {
        id: Some(parsed_id),
        email,
        fields,
    })
}

fn encode(doc: &Document) -> Result<String, DatabaseError> {
    serde_json::to_string(&doc.fields).map_err(|e| DatabaseError::Corrupt {
        id: doc.id.map(|id| id.to_string()).unwrap_or_default(),
        reason: e.to_string(),
    })
}

impl Database {
    /// Insert a new document and return it with its assigned identifier.
    pub async fn insert_document(
        &self,
        collection: Collection,
        doc: Document,
    ) -> Result<Document, DatabaseError> {
        let doc = doc.with_id(DocumentId::new());
        let id = doc.id.map(|id| id.to_string()).unwrap_or_default();
        let email = doc.email.to_string();
        let body = encode(&doc)?;
        let sql = format!(
            "INSERT INTO {} (id, email, body) VALUES (?1, ?2, ?3)",
            collection.table()
        );

        self.conn
            .call(move |conn| {
                conn.execute(&sql, params![id, email, body])?;
                Ok(())
            })
            .await?;

        debug!("Inserted document into {}", collection.table());
        Ok(doc)
    }

    /// All documents owned by `email`, in insertion order.
    pub async fn documents_for(
        &self,
        collection: Collection,
        email: &Email,
    ) -> Result<Vec<Document>, DatabaseError> {
        let email = email.to_string();
        let sql = format!(
            "SELECT id, email, body FROM {} WHERE email = ?1 ORDER BY rowid",
            collection.table()
        );

        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([&email], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })?;

                let mut documents: Vec<DocumentRow> = Vec::new();
                for row in rows {
                    documents.push(row?);
                }

                Ok(documents)
            })
            .await?;

        rows.into_iter().map(decode).collect()
    }

    /// Returns `false` when no document carries that identifier.
    pub async fn delete_document(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> Result<bool, DatabaseError> {
        let id = id.to_string();
        let sql = format!("DELETE FROM {} WHERE id = ?1", collection.table());

        let deleted = self
            .conn
            .call(move |conn| Ok(conn.execute(&sql, [&id])?))
            .await?;

        Ok(deleted == 1)
    }

    pub async fn find_profile(&self, email: &Email) -> Result<Option<Document>, DatabaseError> {
        let email = email.to_string();

        let row: Option<DocumentRow> = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare("SELECT id, email, body FROM profiles WHERE email = ?1")?;
                let mut rows = stmt.query([&email])?;

                if let Some(row) = rows.next()? {
                    Ok(Some((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    )))
                } else {
                    Ok(None)
                }
            })
            .await?;

        row.map(decode).transpose()
    }

    pub async fn profile_exists(&self, email: &Email) -> Result<bool, DatabaseError> {
        let email = email.to_string();

        let exists = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare("SELECT EXISTS(SELECT 1 FROM profiles WHERE email = ?1)")?;
                Ok(stmt.query_row([&email], |row| row.get::<_, bool>(0))?)
            })
            .await?;

        Ok(exists)
    }

    /// Insert the profile, or replace every field of the existing profile with
    /// the same email. The stored identifier survives a replace.
    pub async fn upsert_profile(&self, doc: Document) -> Result<Document, DatabaseError> {
        let candidate = DocumentId::new().to_string();
        let email = doc.email.to_string();
        let body = encode(&doc)?;

        let id = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT INTO profiles (id, email, body) VALUES (?1, ?2, ?3)
                     ON CONFLICT (email) DO UPDATE SET body = excluded.body",
                    params![candidate, email, body],
                )?;
                let id: String =
                    tx.query_row("SELECT id FROM profiles WHERE email = ?1", [&email], |row| {
                        row.get(0)
                    })?;
                tx.commit()?;
                Ok(id)
            })
            .await?;

        let id: DocumentId = id.parse().map_err(|e| DatabaseError::Corrupt {
            id: id.clone(),
            reason: format!("{}", e),
        })?;
        Ok(doc.with_id(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn db() -> Database {
        let db = Database::connect(":memory:").await.unwrap();
        db.ensure_indexes().await.unwrap();
        db
    }

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => Document::from_body(map).unwrap(),
            _ => unreachable!(),
        }
    }

    fn email(raw: &str) -> Email {
        Email::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn documents_are_filtered_by_owner() {
        let db = db().await;
        db.insert_document(Collection::Allergens, doc(json!({ "email": "a@b.com", "name": "peanut" })))
            .await
            .unwrap();
        db.insert_document(Collection::Allergens, doc(json!({ "email": "a@b.com", "name": "milk" })))
            .await
            .unwrap();
        db.insert_document(Collection::Allergens, doc(json!({ "email": "c@d.com", "name": "soy" })))
            .await
            .unwrap();

        let mine = db.documents_for(Collection::Allergens, &email("a@b.com")).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].fields["name"], json!("peanut"));
        assert_eq!(mine[1].fields["name"], json!("milk"));

        let plans = db.documents_for(Collection::MealPlans, &email("a@b.com")).await.unwrap();
        assert!(plans.is_empty());
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_matched() {
        let db = db().await;
        let stored = db
            .insert_document(Collection::Allergens, doc(json!({ "email": "a@b.com" })))
            .await
            .unwrap();
        let id = stored.id.unwrap();

        assert!(db.delete_document(Collection::Allergens, id).await.unwrap());
        assert!(!db.delete_document(Collection::Allergens, id).await.unwrap());
    }

    #[tokio::test]
    async fn upsert_replaces_whole_profile() {
        let db = db().await;
        let first = db
            .upsert_profile(doc(json!({ "email": "a@b.com", "name": "Ann", "age": 30 })))
            .await
            .unwrap();
        let second = db
            .upsert_profile(doc(json!({ "email": "a@b.com", "name": "Anna" })))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);

        let stored = db.find_profile(&email("a@b.com")).await.unwrap().unwrap();
        assert_eq!(stored.fields["name"], json!("Anna"));
        assert!(!stored.fields.contains_key("age"));

        let count = db.documents_for(Collection::Profiles, &email("a@b.com")).await.unwrap();
        assert_eq!(count.len(), 1);
    }

    #[tokio::test]
    async fn profile_existence_ignores_contents() {
        let db = db().await;
        assert!(!db.profile_exists(&email("a@b.com")).await.unwrap());

        db.upsert_profile(doc(json!({ "email": "a@b.com" }))).await.unwrap();
        assert!(db.profile_exists(&email("a@b.com")).await.unwrap());
        assert!(db.find_profile(&email("x@y.com")).await.unwrap().is_none());
    }
}
