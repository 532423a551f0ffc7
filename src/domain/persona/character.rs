//! Character and user profile value objects.
//!
//! Both are supplied by the client on every request and are never persisted
//! here. Optional fields degrade to placeholders when rendered.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::expertise::ExpertiseTag;

/// How a character relates to the user.
///
/// Any label other than `Friend` selects the professional register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum ActLike {
    Friend,
    #[default]
    Professional,
}

impl From<String> for ActLike {
    fn from(label: String) -> Self {
        if label == "Friend" {
            ActLike::Friend
        } else {
            ActLike::Professional
        }
    }
}

impl fmt::Display for ActLike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActLike::Friend => f.write_str("Friend"),
            ActLike::Professional => f.write_str("Professional"),
        }
    }
}

/// Age as the client stored it: a number, or free text from a form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Age {
    Years(u32),
    Text(String),
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Age::Years(years) => write!(f, "{}", years),
            Age::Text(text) => f.write_str(text),
        }
    }
}

/// The person chatting with the characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    #[serde(default)]
    pub age: Option<Age>,
    #[serde(default)]
    pub gender: Option<String>,
}

impl UserProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: None,
            gender: None,
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(Age::Years(age));
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    /// Age or `placeholder` when absent or blank.
    pub fn age_or(&self, placeholder: &str) -> String {
        non_blank(self.age.as_ref().map(Age::to_string)).unwrap_or_else(|| placeholder.to_string())
    }

    /// Gender or `placeholder` when absent or blank.
    pub fn gender_or(&self, placeholder: &str) -> String {
        non_blank(self.gender.clone()).unwrap_or_else(|| placeholder.to_string())
    }
}

/// A configured persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub name: String,
    #[serde(default)]
    pub age: Option<Age>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub act_like: ActLike,
    /// Expertise labels as the client sent them. Labels that are not a known
    /// [`ExpertiseTag`] still show up in the behavior line.
    #[serde(default)]
    pub expertise: Vec<String>,
    /// Free-text personality; overrides `expertise` in the behavior line.
    #[serde(default)]
    pub custom_personality: Option<String>,
}

impl Character {
    pub fn new(name: impl Into<String>, act_like: ActLike) -> Self {
        Self {
            name: name.into(),
            age: None,
            gender: None,
            act_like,
            expertise: Vec::new(),
            custom_personality: None,
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(Age::Years(age));
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn with_expertise(mut self, tag: ExpertiseTag) -> Self {
        self.expertise.push(tag.label().to_string());
        self
    }

    pub fn with_custom_personality(mut self, personality: impl Into<String>) -> Self {
        self.custom_personality = Some(personality.into());
        self
    }

    /// True when one of the expertise labels is exactly `tag`.
    pub fn has_expertise(&self, tag: ExpertiseTag) -> bool {
        self.expertise.iter().any(|label| label == tag.label())
    }

    /// Known tags this character holds, in evaluation order.
    pub fn expertise_tags(&self) -> impl Iterator<Item = ExpertiseTag> + '_ {
        ExpertiseTag::ALL
            .into_iter()
            .filter(move |tag| self.has_expertise(*tag))
    }

    /// The custom personality, if set to something other than whitespace.
    pub fn custom_personality(&self) -> Option<&str> {
        self.custom_personality
            .as_deref()
            .filter(|p| !p.trim().is_empty())
    }

    pub fn age_display(&self) -> Option<String> {
        non_blank(self.age.as_ref().map(Age::to_string))
    }

    pub fn gender_display(&self) -> Option<String> {
        non_blank(self.gender.clone())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
