use std::{borrow::Cow, collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use super::{
    blogs::{BlogDetail, BlogId},
    html,
};

#[derive(Validate, Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    /// Present only when editing an existing post.
    #[serde(skip)]
    pub id: Option<BlogId>,
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[validate(custom(function = "has_visible_text"))]
    pub content: String,
    #[serde(default)]
    pub image: String,
}

impl Draft {
    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    pub fn payload(&self) -> DraftPayload<'_> {
        DraftPayload {
            title: &self.title,
            content: &self.content,
            image: &self.image,
        }
    }

    /// Field rules plus, when `image_required`, a non-empty image.
    pub fn check(&self, image_required: bool) -> Result<(), FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if image_required && self.image.trim().is_empty() {
            errors.add(
                "image",
                ValidationError::new("required").with_message(Cow::Borrowed("Image is required")),
            );
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(FieldErrors::from(&errors))
        }
    }
}

impl From<BlogDetail> for Draft {
    fn from(detail: BlogDetail) -> Self {
        let blog = detail.blog;
        Self {
            id: Some(blog.id),
            title: blog.title,
            content: blog.content,
            image: blog.image.unwrap_or_default(),
        }
    }
}

/// Exact body of the create and edit calls.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DraftPayload<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub image: &'a str,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("Title is required")));
    }
    Ok(())
}

fn has_visible_text(value: &str) -> Result<(), ValidationError> {
    if html::is_blank_html(value) {
        return Err(
            ValidationError::new("blank").with_message(Cow::Borrowed("Content is required"))
        );
    }
    Ok(())
}

/// First message per offending field, keyed by field name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let map = errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, errs)| {
                errs.first().map(|err| {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    (field.to_string(), message)
                })
            })
            .collect();
        Self(map)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.values().map(String::as_str).collect();
        f.write_str(&messages.join(", "))
    }
}
