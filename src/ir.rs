use crate::error::FieldSpecError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Presentation-only style selector for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleCode(pub u8);

impl fmt::Display for StyleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One contiguous bit range of a message. A field without a name is reserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub bits: u32,
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleCode>,
}

impl FieldSpec {
    pub fn named(name: impl Into<String>, bits: u32) -> Self {
        Self {
            name: Some(name.into()),
            bits,
            style: None,
        }
    }

    pub fn reserved(bits: u32) -> Self {
        Self {
            name: None,
            bits,
            style: None,
        }
    }

    pub fn with_style(mut self, code: u8) -> Self {
        self.style = Some(StyleCode(code));
        self
    }

    pub fn is_reserved(&self) -> bool {
        self.name.is_none()
    }
}

/// Ordered field list, most significant field first.
///
/// Every field is guaranteed to be at least one bit wide.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldSpec>", into = "Vec<FieldSpec>")]
pub struct RegisterLayout {
    fields: Vec<FieldSpec>,
}

impl RegisterLayout {
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, FieldSpecError> {
        if let Some((index, field)) = fields.iter().enumerate().find(|(_, f)| f.bits == 0) {
            return Err(FieldSpecError::NonPositiveWidth {
                index,
                name: field.name.clone(),
            });
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<Vec<FieldSpec>> for RegisterLayout {
    type Error = FieldSpecError;

    fn try_from(fields: Vec<FieldSpec>) -> Result<Self, Self::Error> {
        Self::new(fields)
    }
}

impl From<RegisterLayout> for Vec<FieldSpec> {
    fn from(layout: RegisterLayout) -> Self {
        layout.fields
    }
}
