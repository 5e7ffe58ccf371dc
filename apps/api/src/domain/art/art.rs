use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored art piece
#[derive(Debug, Clone, Serialize, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct Art {
    pub id: i64,
    pub author_id: i64,
    pub description: Option<String>,
    pub img_id: i64,
    pub is_showcase: bool,
    pub created_at: i64,
}

/// Tag attached to an art piece, either existing (by id) or new (by name)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagToAdd {
    pub id: Option<i64>,
    pub name: Option<String>,
}

/// Reference a tag resolves to before it is attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTag<'a> {
    Existing(i64),
    Create(&'a str),
}

impl TagToAdd {
    /// Decides whether the tag is an existing one or must be created
    ///
    /// # Returns
    /// * `Err(String)` - If neither an id nor a name is provided
    ///
    /// # Example
    /// ```
    /// use turfhub_api::domain::art::art::{ResolvedTag, TagToAdd};
    ///
    /// let tag = TagToAdd { id: None, name: Some("fanart".to_string()) };
    /// assert_eq!(tag.resolve(), Ok(ResolvedTag::Create("fanart")));
    /// ```
    pub fn resolve(&self) -> Result<ResolvedTag<'_>, String> {
        if let Some(id) = self.id {
            return Ok(ResolvedTag::Existing(id));
        }

        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(ResolvedTag::Create(name)),
            _ => Err("tag name must be provided if no id".to_string()),
        }
    }
}

/// Input for submitting a new art piece
#[derive(Debug, Clone, Deserialize)]
pub struct NewArt {
    pub author_id: i64,
    pub description: Option<String>,
    pub url: String,
    /// Unix seconds; `None` leaves the image pending validation
    pub validated_at: Option<i64>,
    #[serde(default)]
    pub linked_users: Vec<i64>,
    #[serde(default)]
    pub tags: Vec<TagToAdd>,
}

/// Input for editing an existing art piece
#[derive(Debug, Clone, Deserialize)]
pub struct ArtEdit {
    pub art_id: i64,
    pub author_id: i64,
    pub description: Option<String>,
    pub is_showcase: bool,
    #[serde(default)]
    pub linked_users: Vec<i64>,
    #[serde(default)]
    pub tags: Vec<TagToAdd>,
}
