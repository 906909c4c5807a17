use std::fmt;

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque contact identifier as handed out by the contacts service.
///
/// The service may send ids as JSON strings or numbers; both are kept as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ContactId(String);

impl ContactId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A contact record as served by `GET /contacts`.
///
/// Records are never validated: a missing or non-scalar field is simply absent
/// and renders blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
}

impl Contact {
    pub fn from_value(value: &Value) -> Self {
        let field = |key: &str| value.get(key).and_then(scalar_text);
        Self {
            id: ContactId(field("id").unwrap_or_default()),
            name: field("name"),
            mobile: field("mobile"),
            email: field("email"),
            image_url: field("imageUrl"),
        }
    }

    pub fn name_or_blank(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn mobile_or_blank(&self) -> &str {
        self.mobile.as_deref().unwrap_or("")
    }

    pub fn email_or_blank(&self) -> &str {
        self.email.as_deref().unwrap_or("")
    }

    pub fn image_or_blank(&self) -> &str {
        self.image_url.as_deref().unwrap_or("")
    }
}

impl<'de> Deserialize<'de> for Contact {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Contact::from_value(&value))
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
