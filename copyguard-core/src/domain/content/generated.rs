// copyguard-core/src/domain/content/generated.rs

use crate::domain::content::text::strip_markup;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One candidate of marketing copy, as produced by a generator attempt.
/// Corrections never mutate a value seen by the caller: they build a new one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedContent {
    #[serde(default)]
    pub meta_title: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub bullet_points: Vec<String>,
    /// Rich text (HTML headings, paragraphs, lists).
    #[serde(default)]
    pub long_description: String,
    #[serde(default)]
    pub why_worth_it: String,
    #[serde(default)]
    pub seo_tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentField {
    MetaTitle,
    MetaDescription,
    Bullets,
    Body,
    WhyWorthIt,
    Tags,
}

impl ContentField {
    pub const ALL: [ContentField; 6] = [
        ContentField::MetaTitle,
        ContentField::MetaDescription,
        ContentField::Bullets,
        ContentField::Body,
        ContentField::WhyWorthIt,
        ContentField::Tags,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MetaTitle => "meta_title",
            Self::MetaDescription => "meta_description",
            Self::Bullets => "bullets",
            Self::Body => "body",
            Self::WhyWorthIt => "why_worth_it",
            Self::Tags => "tags",
        }
    }

    /// Fields that must read as complete sentences.
    pub fn is_prose(&self) -> bool {
        matches!(
            self,
            Self::MetaDescription | Self::Body | Self::WhyWorthIt
        )
    }
}

impl fmt::Display for ContentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GeneratedContent {
    /// Plain text of a field. Bullets and tags are joined one per line.
    pub fn plain_text(&self, field: ContentField) -> String {
        match field {
            ContentField::MetaTitle => self.meta_title.clone(),
            ContentField::MetaDescription => self.meta_description.clone(),
            ContentField::Bullets => self.bullet_points.join("\n"),
            ContentField::Body => strip_markup(&self.long_description),
            ContentField::WhyWorthIt => strip_markup(&self.why_worth_it),
            ContentField::Tags => self.seo_tags.join("\n"),
        }
    }

    /// Every text the reader sees, markup stripped.
    pub fn all_text(&self) -> String {
        ContentField::ALL
            .iter()
            .map(|f| self.plain_text(*f))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.meta_title.trim().is_empty()
            && self.meta_description.trim().is_empty()
            && self.bullet_points.is_empty()
            && self.long_description.trim().is_empty()
            && self.why_worth_it.trim().is_empty()
    }

    /// Applies `f` to every single-string field (bullets one by one, tags excluded).
    pub fn map_strings(&self, mut f: impl FnMut(ContentField, &str) -> String) -> Self {
        Self {
            meta_title: f(ContentField::MetaTitle, &self.meta_title),
            meta_description: f(ContentField::MetaDescription, &self.meta_description),
            bullet_points: self
                .bullet_points
                .iter()
                .map(|b| f(ContentField::Bullets, b))
                .filter(|b| !b.trim().is_empty())
                .collect(),
            long_description: f(ContentField::Body, &self.long_description),
            why_worth_it: f(ContentField::WhyWorthIt, &self.why_worth_it),
            seo_tags: self.seo_tags.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_deserialize_camel_case_with_missing_fields() -> Result<()> {
        let content: GeneratedContent = serde_json::from_str(
            r#"{"metaTitle": "Socket set", "bulletPoints": ["a", "b"]}"#,
        )?;
        assert_eq!(content.meta_title, "Socket set");
        assert_eq!(content.bullet_points.len(), 2);
        assert!(content.long_description.is_empty());
        Ok(())
    }

    #[test]
    fn test_map_strings_drops_emptied_bullets() {
        let content = GeneratedContent {
            bullet_points: vec!["keep".into(), "drop".into()],
            ..Default::default()
        };
        let mapped = content.map_strings(|field, s| {
            if field == ContentField::Bullets && s == "drop" {
                String::new()
            } else {
                s.to_string()
            }
        });
        assert_eq!(mapped.bullet_points, vec!["keep".to_string()]);
    }
}
