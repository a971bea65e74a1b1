//! Raw project submissions as posted by the admin forms

use cw_core::traits::Id;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Project fields plus nested children, before any validation.
///
/// Scalar fields are kept as raw JSON so that strings, numbers and nulls can
/// all be coerced (and reported) by the contracts instead of failing
/// deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectSubmission {
    pub name: Value,
    pub code: Value,
    pub department: Value,
    pub location: Value,
    #[serde(alias = "startDate")]
    pub start_date: Value,
    #[serde(alias = "endDate")]
    pub end_date: Value,
    pub objective: Value,
    pub category: Value,
    pub budget: Value,
    #[serde(alias = "responsiblePerson")]
    pub responsible_person: Value,
    pub contact: Value,
    pub status: Value,
    #[serde(deserialize_with = "null_as_default")]
    pub activities: Vec<ActivitySubmission>,
    #[serde(deserialize_with = "null_as_default")]
    pub documents: Vec<DocumentSubmission>,
    #[serde(alias = "removedActivityIds", deserialize_with = "null_as_default")]
    pub removed_activity_ids: Vec<Id>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ActivitySubmission {
    pub id: Option<Id>,
    pub description: Value,
    #[serde(alias = "start", alias = "startDate")]
    pub start_date: Value,
    #[serde(alias = "end", alias = "endDate")]
    pub end_date: Value,
}

impl ActivitySubmission {
    /// Rows with no description are incomplete form rows
    pub fn is_blank(&self) -> bool {
        match &self.description {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocumentSubmission {
    /// Existing document to edit
    pub id: Option<Id>,
    pub name: Value,
    /// Base64 file content, optionally as a data URL
    pub content: Option<String>,
    #[serde(alias = "contentType", alias = "type")]
    pub content_type: Option<String>,
    /// Previously uploaded file
    pub url: Option<String>,
    #[serde(alias = "public", alias = "isPublic")]
    pub is_public: Value,
}

impl DocumentSubmission {
    pub fn content(&self) -> Option<&str> {
        non_blank(self.content.as_deref())
    }

    pub fn url(&self) -> Option<&str> {
        non_blank(self.url.as_deref())
    }

    /// An untouched form row: nothing to store or edit
    pub fn is_blank(&self) -> bool {
        let unnamed = match &self.name {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        };
        self.id.is_none() && unnamed && self.content().is_none() && self.url().is_none()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
