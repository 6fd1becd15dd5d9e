//! Filter expressions for server-side lookup.
//!
//! A filter is a conjunction of equality predicates, `k1==v1 and k2=='v2'`.
//! Values made only of decimal digits are emitted bare, everything else is
//! single-quoted. Embedded quotes are not escaped.

use crate::error::{Error, Result};
use crate::resource::Resource;
use crate::types::{DesiredState, Object};
use serde_json::Value;

/// One filter of a query: structured fields, a raw expression, or nothing.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FilterSpec {
    /// No filter
    #[default]
    None,
    /// Field/value pairs rendered by [`build`]
    Fields(Object),
    /// Pre-built expression passed through verbatim
    Raw(String),
}

impl FilterSpec {
    /// Combine the structured and raw forms of one filter kind.
    ///
    /// Supplying both is a selector error. Empty inputs count as absent.
    pub fn from_parts(fields: Option<Object>, raw: Option<String>) -> Result<Self> {
        let fields = fields.filter(|fields| !fields.is_empty());
        let raw = raw.filter(|raw| !raw.is_empty());
        match (fields, raw) {
            (Some(_), Some(_)) => Err(Error::Selector(
                "structured filters and a raw filter query are mutually exclusive".to_string(),
            )),
            (Some(fields), None) => Ok(Self::Fields(fields)),
            (None, Some(raw)) => Ok(Self::Raw(raw)),
            (None, None) => Ok(Self::None),
        }
    }

    /// Check if this filter narrows anything
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Render to the expression sent to the remote store
    pub fn render(&self) -> Result<Option<String>> {
        match self {
            Self::None => Ok(None),
            Self::Fields(fields) => build(fields).map(Some),
            Self::Raw(raw) => Ok(Some(raw.clone())),
        }
    }
}

/// Build a filter expression from field/value pairs, in map order.
///
/// Values must be scalars; objects, arrays and nulls are rejected.
pub fn build(fields: &Object) -> Result<String> {
    let predicates = fields
        .iter()
        .map(|(name, value)| predicate(name, value))
        .collect::<Result<Vec<_>>>()?;
    Ok(predicates.join(" and "))
}

fn predicate(name: &str, value: &Value) -> Result<String> {
    let text = match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => {
            return Err(Error::InvalidInput(format!(
                "filter value for `{name}` must be a string, number or boolean"
            )));
        }
    };

    if is_decimal(&text) {
        Ok(format!("{name}=={text}"))
    } else {
        Ok(format!("{name}=='{text}'"))
    }
}

fn is_decimal(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|byte| byte.is_ascii_digit())
}

/// Collect the natural-key fields of a desired state, in key order.
///
/// Every natural-key field must carry a value.
pub fn natural_key_fields(resource: &dyn Resource, desired: &DesiredState) -> Result<Object> {
    let mut fields = Object::new();
    for name in resource.natural_key() {
        let Some(value) = desired.get(name).value() else {
            return Err(Error::Selector(format!(
                "{} lookup needs `{}` (natural key: {}) or an id",
                resource.kind(),
                name,
                resource.natural_key().join(", ")
            )));
        };
        fields.insert((*name).to_string(), value.clone());
    }
    Ok(fields)
}
