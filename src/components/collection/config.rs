use crate::Result;
use serde::{Deserialize, Serialize};

/// How scalar values are treated when an element type is configured.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScalarPolicy {
    /// Scalars bypass the element type check. Allows mixing scalars with typed objects.
    #[default]
    Allow,
    /// Scalars are rejected like objects of a wrong class.
    Reject,
}

/// Configuration of a `Collection`'s type constraint.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CollectionConfig {
    /// Class or interface every object element has to be an instance of.
    pub element_type: Option<String>,
    pub scalars: ScalarPolicy,
}

impl CollectionConfig {
    #[inline]
    pub fn typed(element_type: impl Into<String>) -> Self {
        Self {
            element_type: Some(element_type.into()),
            ..Self::default()
        }
    }

    #[inline]
    pub fn with_scalars(mut self, scalars: ScalarPolicy) -> Self {
        self.scalars = scalars;
        self
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
