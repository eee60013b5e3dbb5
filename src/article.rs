//! The article record and the delete payload.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::store::Document;

/// One catalog item.
///
/// Deserialization is lenient the way storefront clients expect: unknown
/// fields are ignored, and missing or `null` fields take their zero value.
/// `id` is the storage key; an empty one is rejected by the handlers, not
/// here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Article {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub price: f64,
    /// Category tag.
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub kind: String,
    #[serde(deserialize_with = "nullable")]
    pub year: String,
    /// Image URL.
    #[serde(deserialize_with = "nullable")]
    pub image: String,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    /// URL-safe identifier.
    #[serde(deserialize_with = "nullable")]
    pub slug: String,
}

/// Body of a `DELETE` request.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeleteRequest {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
}

impl Article {
    /// Decodes a stored document. Fields the schema does not know are
    /// dropped.
    pub fn from_document(document: Document) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(document))
    }
}

impl From<Article> for Document {
    /// Every field is written, zero values included, so an upsert leaves no
    /// stale field behind.
    fn from(article: Article) -> Self {
        let mut document = Document::new();
        document.insert("id".to_owned(), article.id.into());
        document.insert("name".to_owned(), article.name.into());
        document.insert("price".to_owned(), article.price.into());
        document.insert("type".to_owned(), article.kind.into());
        document.insert("year".to_owned(), article.year.into());
        document.insert("image".to_owned(), article.image.into());
        document.insert("description".to_owned(), article.description.into());
        document.insert("slug".to_owned(), article.slug.into());
        document
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
