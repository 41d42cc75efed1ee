//! Free-text tag entry.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Extra per-tag check supplied by the host. `Err` carries the message shown
/// to the user.
pub type TagValidator = Arc<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// Why a candidate tag was not added.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagRejection {
    #[error("tag is empty")]
    Blank,

    #[error("at most {max} tags allowed")]
    LimitReached { max: usize },

    #[error("'{0}' is already present")]
    Duplicate(String),

    #[error("{0}")]
    Invalid(String),
}

/// Acceptance rules for new tags.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TagPolicy {
    pub allow_duplicates: bool,
    pub max_tags: Option<usize>,
    #[serde(skip)]
    validator: Option<TagValidator>,
}

impl TagPolicy {
    pub fn with_max(mut self, max: usize) -> Self {
        self.max_tags = Some(max);
        self
    }

    pub fn allowing_duplicates(mut self) -> Self {
        self.allow_duplicates = true;
        self
    }

    pub fn with_validator(
        mut self,
        validator: impl Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Decide whether `raw` may join `existing`.
    ///
    /// The candidate is trimmed first. Checks run in order: blank, limit,
    /// duplicate (exact match), then the host validator.
    pub fn check(&self, existing: &[String], raw: &str) -> Result<String, TagRejection> {
        let tag = raw.trim();
        if tag.is_empty() {
            return Err(TagRejection::Blank);
        }
        if let Some(max) = self.max_tags
            && existing.len() >= max
        {
            return Err(TagRejection::LimitReached { max });
        }
        if !self.allow_duplicates && existing.iter().any(|t| t == tag) {
            return Err(TagRejection::Duplicate(tag.to_string()));
        }
        if let Some(validator) = &self.validator {
            validator(tag).map_err(TagRejection::Invalid)?;
        }
        Ok(tag.to_string())
    }
}

impl fmt::Debug for TagPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagPolicy")
            .field("allow_duplicates", &self.allow_duplicates)
            .field("max_tags", &self.max_tags)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

/// An ordered list of accepted tags.
#[derive(Debug, Clone, Default)]
pub struct TagCollection {
    tags: Vec<String>,
    policy: TagPolicy,
}

impl TagCollection {
    pub fn new(policy: TagPolicy) -> Self {
        Self {
            tags: Vec::new(),
            policy,
        }
    }

    /// Seed with tags the host already holds. These are not re-checked.
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn policy(&self) -> &TagPolicy {
        &self.policy
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Replace the contents, e.g. from a controlled value.
    pub fn sync(&mut self, tags: &[String]) {
        self.tags = tags.to_vec();
    }

    /// Check and append `raw`. Returns the stored (trimmed) tag.
    pub fn insert(&mut self, raw: &str) -> Result<&str, TagRejection> {
        let tag = self.policy.check(&self.tags, raw)?;
        self.tags.push(tag);
        Ok(self.tags.last().map(String::as_str).unwrap_or_default())
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.tags.len()).then(|| self.tags.remove(index))
    }

    /// Remove the last tag (Backspace in an empty entry field).
    pub fn pop(&mut self) -> Option<String> {
        self.tags.pop()
    }
}
