//! Submitted plugin moderation
//!
//! Users submit plugins through a form; moderators list what is pending,
//! then approve or delete each entry. A second submission of the same
//! external link is turned away.

use crate::store::SubmissionStore;
use crate::types::{SubmissionId, SubmittedPlugin};
use crate::{PlugdirError, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Form field carrying the JSON-encoded tag list
pub const TAGS_FIELD: &str = "tags";

/// Form field used to detect duplicate submissions
pub const LINK_FIELD: &str = "vimorg-link";

/// A plugin submission as received from the submit form
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PluginSubmission {
    pub name: String,
    pub author: Option<String>,
    pub github_link: Option<String>,
    pub vimorg_link: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub submitted_at: Option<i64>,
    pub extra: Map<String, Value>,
}

impl PluginSubmission {
    /// Build a submission from url-encoded form fields
    ///
    /// `tags` must be a JSON array of strings when present. Empty strings
    /// for the optional fields are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `PlugdirError::Validation` when `name` is missing or `tags`
    /// is not a JSON string array
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use plugdir_core::moderation::PluginSubmission;
    ///
    /// let mut form = HashMap::new();
    /// form.insert("name".to_string(), "vim-surround".to_string());
    /// form.insert("tags".to_string(), r#"["editing"]"#.to_string());
    ///
    /// let submission = PluginSubmission::from_form(form).unwrap();
    /// assert_eq!(submission.tags, vec!["editing"]);
    /// ```
    pub fn from_form(mut form: HashMap<String, String>) -> Result<Self> {
        let name = form
            .remove("name")
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| PlugdirError::validation("Plugin name is required"))?;

        let tags = match form.remove(TAGS_FIELD) {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str::<Vec<String>>(&raw)
                .map_err(|e| PlugdirError::validation(format!("Invalid tags: {}", e)))?,
            _ => Vec::new(),
        };

        let submitted_at = match form.remove("submitted_at") {
            Some(raw) if !raw.is_empty() => Some(raw.parse::<i64>().map_err(|e| {
                PlugdirError::validation(format!("Invalid submitted_at: {}", e))
            })?),
            _ => None,
        };

        let mut take = |key: &str| form.remove(key).filter(|v| !v.trim().is_empty());
        let author = take("author");
        let github_link = take("github-link");
        let vimorg_link = take(LINK_FIELD);
        let category = take("category");

        let extra = form
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();

        Ok(Self {
            name,
            author,
            github_link,
            vimorg_link,
            category,
            tags,
            submitted_at,
            extra,
        })
    }

    fn into_record(self, now: i64) -> SubmittedPlugin {
        SubmittedPlugin {
            id: SubmissionId::new(),
            name: self.name,
            author: self.author,
            github_link: self.github_link,
            vimorg_link: self.vimorg_link,
            category: self.category,
            tags: self.tags,
            submitted_at: Some(self.submitted_at.unwrap_or(now)),
            approved: false,
            extra: self.extra,
        }
    }
}

/// Result of a submission attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Stored and pending moderation
    Accepted(SubmittedPlugin),
    /// The external link was already submitted
    Duplicate,
}

/// Moderation queue over a submission store
#[derive(Clone)]
pub struct ModerationQueue {
    store: Arc<dyn SubmissionStore>,
}

impl ModerationQueue {
    pub fn new(store: Arc<dyn SubmissionStore>) -> Self {
        Self { store }
    }

    /// Whether a submission with the same external link already exists
    ///
    /// Submissions without a link are never considered duplicates.
    pub async fn is_duplicate(&self, submission: &PluginSubmission) -> Result<bool> {
        match &submission.vimorg_link {
            Some(link) => Ok(self.store.count_with_link(link).await? > 0),
            None => Ok(false),
        }
    }

    /// Insert a submission unless its external link was already submitted
    ///
    /// The submission time is stamped with the current time when absent.
    pub async fn submit(&self, submission: PluginSubmission) -> Result<SubmitOutcome> {
        if self.is_duplicate(&submission).await? {
            warn!(
                "Rejected duplicate submission for link {:?}",
                submission.vimorg_link
            );
            return Ok(SubmitOutcome::Duplicate);
        }

        let record = submission.into_record(chrono::Utc::now().timestamp());
        self.store.insert_submission(record.clone()).await?;
        info!("Accepted plugin submission {} ({})", record.id, record.name);
        Ok(SubmitOutcome::Accepted(record))
    }

    pub async fn list_pending(&self) -> Result<Vec<SubmittedPlugin>> {
        self.store.list_pending().await
    }

    /// # Errors
    ///
    /// Returns `PlugdirError::NotFound` for an unknown id
    pub async fn get(&self, id: SubmissionId) -> Result<SubmittedPlugin> {
        self.store
            .get_submission(id)
            .await?
            .ok_or_else(|| PlugdirError::not_found(format!("submitted plugin {}", id)))
    }

    /// # Errors
    ///
    /// Returns `PlugdirError::NotFound` for an unknown id
    pub async fn approve(&self, id: SubmissionId) -> Result<()> {
        if !self.store.approve_submission(id).await? {
            return Err(PlugdirError::not_found(format!("submitted plugin {}", id)));
        }
        info!("Approved submission {}", id);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `PlugdirError::NotFound` for an unknown id
    pub async fn delete(&self, id: SubmissionId) -> Result<()> {
        if !self.store.delete_submission(id).await? {
            return Err(PlugdirError::not_found(format!("submitted plugin {}", id)));
        }
        info!("Deleted submission {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use assert_matches::assert_matches;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn queue() -> ModerationQueue {
        ModerationQueue::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_from_form_collects_extra_fields() {
        let submission = PluginSubmission::from_form(form(&[
            ("name", "vim-sneak"),
            ("author", "justinmk"),
            ("vimorg-link", ""),
            ("tags", r#"["motion", "jump"]"#),
            ("notes", "great plugin"),
        ]))
        .unwrap();

        assert_eq!(submission.author.as_deref(), Some("justinmk"));
        assert!(submission.vimorg_link.is_none());
        assert_eq!(submission.tags, vec!["motion", "jump"]);
        assert_eq!(submission.extra.get("notes"), Some(&Value::from("great plugin")));
    }

    #[test]
    fn test_from_form_rejects_bad_tags() {
        let err = PluginSubmission::from_form(form(&[("name", "x"), ("tags", "motion")]))
            .unwrap_err();
        assert_matches!(err, PlugdirError::Validation { .. });
    }

    #[test]
    fn test_from_form_requires_name() {
        let err = PluginSubmission::from_form(form(&[("tags", "[]")])).unwrap_err();
        assert_matches!(err, PlugdirError::Validation { .. });
    }

    #[tokio::test]
    async fn test_submit_stamps_time() {
        let queue = queue();
        let outcome = queue
            .submit(PluginSubmission {
                name: "vim-sneak".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let record = match outcome {
            SubmitOutcome::Accepted(record) => record,
            SubmitOutcome::Duplicate => panic!("expected acceptance"),
        };
        assert!(record.submitted_at.unwrap() > 0);
        assert!(record.is_pending());
    }

    #[tokio::test]
    async fn test_submit_keeps_given_time() {
        let queue = queue();
        let outcome = queue
            .submit(PluginSubmission {
                name: "vim-sneak".to_string(),
                submitted_at: Some(42),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_matches!(outcome, SubmitOutcome::Accepted(record) if record.submitted_at == Some(42));
    }

    #[tokio::test]
    async fn test_duplicate_link_rejected() {
        let queue = queue();
        let submission = PluginSubmission {
            name: "vim-sneak".to_string(),
            vimorg_link: Some("http://www.vim.org/scripts/script.php?script_id=4809".to_string()),
            ..Default::default()
        };

        assert_matches!(queue.submit(submission.clone()).await.unwrap(), SubmitOutcome::Accepted(_));
        assert_eq!(queue.submit(submission).await.unwrap(), SubmitOutcome::Duplicate);
        assert_eq!(queue.list_pending().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_submissions_without_link_are_not_duplicates() {
        let queue = queue();
        let submission = PluginSubmission {
            name: "no-link".to_string(),
            ..Default::default()
        };
        queue.submit(submission.clone()).await.unwrap();
        assert_matches!(queue.submit(submission).await.unwrap(), SubmitOutcome::Accepted(_));
    }

    #[tokio::test]
    async fn test_approve_and_delete_unknown() {
        let queue = queue();
        let id = SubmissionId::new();
        assert_matches!(queue.approve(id).await, Err(PlugdirError::NotFound { .. }));
        assert_matches!(queue.delete(id).await, Err(PlugdirError::NotFound { .. }));
        assert_matches!(queue.get(id).await, Err(PlugdirError::NotFound { .. }));
    }
}
