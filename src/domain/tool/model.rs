//! Tool entity and its validated inputs.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::foundation::{ToolId, ValidationError, ValidationErrors};

/// A named external-link record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub id: ToolId,
    pub name: String,
    pub description: String,
    pub url: String,
}

impl Tool {
    /// Builds the stored form of `fields` under an assigned id.
    pub fn from_new(id: ToolId, fields: NewTool) -> Self {
        Self {
            id,
            name: fields.name,
            description: fields.description,
            url: fields.url,
        }
    }

    /// Field-by-field overwrite; fields absent from the patch are retained.
    pub fn apply(&mut self, patch: &ToolPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(url) = &patch.url {
            self.url = url.clone();
        }
    }
}

/// Raw create-form input, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDraft {
    pub name: String,
    pub description: String,
    pub url: String,
}

impl ToolDraft {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            url: url.into(),
        }
    }

    pub fn validate(&self) -> Result<NewTool, ValidationErrors> {
        NewTool::new(&self.name, &self.description, &self.url)
    }
}

/// Validated input for creating a tool.
///
/// Values are trimmed. Construction fails with every offending field listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTool {
    name: String,
    description: String,
    url: String,
}

impl NewTool {
    pub fn new(
        name: impl AsRef<str>,
        description: impl AsRef<str>,
        url: impl AsRef<str>,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = Vec::new();

        let name = collect(&mut errors, required_text("name", name.as_ref()));
        let description = collect(&mut errors, required_text("description", description.as_ref()));
        let url = collect(&mut errors, absolute_url("url", url.as_ref()));

        match (name, description, url) {
            (Some(name), Some(description), Some(url)) if errors.is_empty() => Ok(Self {
                name,
                description,
                url,
            }),
            _ => Err(ValidationErrors::new(errors)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Partial update. `None` fields are left untouched on the target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ToolPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.url.is_none()
    }

    /// Applies the same rules as `NewTool` to every present field and
    /// returns the trimmed patch.
    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let mut errors = Vec::new();

        let name = self
            .name
            .and_then(|v| collect(&mut errors, required_text("name", &v)));
        let description = self
            .description
            .and_then(|v| collect(&mut errors, required_text("description", &v)));
        let url = self
            .url
            .and_then(|v| collect(&mut errors, absolute_url("url", &v)));

        if !errors.is_empty() {
            return Err(ValidationErrors::new(errors));
        }
        Ok(Self {
            name,
            description,
            url,
        })
    }
}

impl From<NewTool> for ToolPatch {
    fn from(fields: NewTool) -> Self {
        Self {
            name: Some(fields.name),
            description: Some(fields.description),
            url: Some(fields.url),
        }
    }
}

fn collect<T>(errors: &mut Vec<ValidationError>, result: Result<T, ValidationError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            errors.push(e);
            None
        }
    }
}

fn required_text(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    Ok(trimmed.to_string())
}

fn absolute_url(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = required_text(field, value)?;
    Url::parse(&trimmed).map_err(|e| ValidationError::invalid_format(field, e.to_string()))?;
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tool() -> Tool {
        Tool::from_new(
            ToolId::new("t-1").unwrap(),
            NewTool::new("X", "Y", "https://e.com").unwrap(),
        )
    }

    #[test]
    fn new_tool_trims_fields() {
        let fields = NewTool::new("  Search  ", " Finds things ", " https://search.example ").unwrap();
        assert_eq!(fields.name(), "Search");
        assert_eq!(fields.description(), "Finds things");
        assert_eq!(fields.url(), "https://search.example");
    }

    #[test]
    fn new_tool_reports_every_bad_field() {
        let err = NewTool::new("", "  ", "not-a-url").unwrap_err();
        assert_eq!(err.len(), 3);
        assert!(err.has_field("name"));
        assert!(err.has_field("description"));
        assert!(matches!(
            err.for_field("url"),
            Some(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn new_tool_rejects_blank_url_as_empty() {
        let err = NewTool::new("a", "b", "   ").unwrap_err();
        assert!(matches!(
            err.for_field("url"),
            Some(ValidationError::EmptyField { .. })
        ));
    }

    #[test]
    fn draft_validates_into_new_tool() {
        let fields = ToolDraft::new("X", "Y", "https://e.com").validate().unwrap();
        assert_eq!(fields.name(), "X");

        let err = ToolDraft::default().validate().unwrap_err();
        assert_eq!(err.len(), 3);
    }

    #[test]
    fn new_tool_rejects_relative_url() {
        assert!(NewTool::new("a", "b", "/tools/search").is_err());
        assert!(NewTool::new("a", "b", "example.com").is_err());
    }

    #[test]
    fn apply_overwrites_only_present_fields() {
        let mut t = tool();
        t.apply(&ToolPatch::new().with_name("Z"));

        assert_eq!(t.name, "Z");
        assert_eq!(t.description, "Y");
        assert_eq!(t.url, "https://e.com");
    }

    #[test]
    fn patch_validate_trims_and_checks_present_fields() {
        let patch = ToolPatch::new().with_name("  Z ").validate().unwrap();
        assert_eq!(patch.name.as_deref(), Some("Z"));
        assert!(patch.description.is_none());

        let err = ToolPatch::new()
            .with_description("")
            .with_url("nope")
            .validate()
            .unwrap_err();
        assert!(err.has_field("description"));
        assert!(err.has_field("url"));
        assert!(!err.has_field("name"));
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        let json = serde_json::to_value(ToolPatch::new().with_url("https://a.b")).unwrap();
        assert_eq!(json, serde_json::json!({ "url": "https://a.b" }));
    }

    #[test]
    fn patch_from_new_tool_sets_every_field() {
        let patch = ToolPatch::from(NewTool::new("a", "b", "https://c.d").unwrap());
        assert!(!patch.is_empty());
        assert_eq!(patch.url.as_deref(), Some("https://c.d"));
    }

    #[test]
    fn tool_deserializes_ignoring_extra_columns() {
        let json = r#"{"id":"abc","name":"n","description":"d","url":"https://u.v","created_at":"2024-01-01T00:00:00Z"}"#;
        let tool: Tool = serde_json::from_str(json).unwrap();
        assert_eq!(tool.id.as_str(), "abc");
    }

    proptest! {
        #[test]
        fn whitespace_only_name_is_always_rejected(ws in "[ \t\n]{0,8}") {
            let result = NewTool::new(&ws, "desc", "https://example.com");
            prop_assert!(result.unwrap_err().has_field("name"));
        }

        #[test]
        fn https_urls_with_simple_hosts_are_accepted(host in "[a-z]{1,12}", tld in "[a-z]{2,4}") {
            let url = format!("https://{}.{}", host, tld);
            prop_assert!(NewTool::new("n", "d", &url).is_ok());
        }
    }
}
