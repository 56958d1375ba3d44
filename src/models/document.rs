// src/models/document.rs - raw backend documents and list envelopes

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A document as the backend returns it: system attributes prefixed with `$`
/// plus whatever fields the collection defines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$collectionId", default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    #[serde(rename = "$databaseId", default, skip_serializing_if = "Option::is_none")]
    pub database_id: Option<String>,
    #[serde(rename = "$createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "$updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            collection_id: None,
            database_id: None,
            created_at: None,
            updated_at: None,
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Re-reads this document as one of the typed models.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(serde_json::to_value(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentList<T> {
    pub total: u64,
    pub documents: Vec<T>,
}

impl<T> DocumentList<T> {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn last(&self) -> Option<&T> {
        self.documents.last()
    }
}

impl DocumentList<Document> {
    pub fn decode<T: DeserializeOwned>(&self) -> Result<DocumentList<T>, serde_json::Error> {
        let documents = self
            .documents
            .iter()
            .map(Document::decode)
            .collect::<Result<Vec<T>, _>>()?;
        Ok(DocumentList {
            total: self.total,
            documents,
        })
    }
}

/// A relationship attribute. Depending on the query the backend either
/// expands the related document or returns its bare id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Related {
    Id(String),
    Document(Box<Document>),
}

impl Related {
    pub fn id(&self) -> &str {
        match self {
            Related::Id(id) => id,
            Related::Document(doc) => &doc.id,
        }
    }

    pub fn document(&self) -> Option<&Document> {
        match self {
            Related::Id(_) => None,
            Related::Document(doc) => Some(doc),
        }
    }
}
