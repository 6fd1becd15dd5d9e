//! Readonly field guard for the update path.

use crate::error::{Error, Result};
use crate::resource::Resource;
use crate::types::{DesiredState, Object};
use serde_json::Value;

/// Reject changes to fields fixed at creation.
///
/// A readonly field the caller left unset or null is not checked.
pub fn check_readonly(
    resource: &dyn Resource,
    desired: &DesiredState,
    existing: &Object,
) -> Result<()> {
    for field in resource.readonly_fields() {
        let Some(wanted) = desired.get(field).value() else {
            continue;
        };
        let current = existing.get(*field).unwrap_or(&Value::Null);
        if wanted != current {
            return Err(Error::ReadonlyViolation {
                kind: resource.kind().to_string(),
                field: (*field).to_string(),
                existing: current.clone(),
                desired: wanted.clone(),
            });
        }
    }
    Ok(())
}

/// Build the update payload: checked desired fields without readonly ones.
pub fn update_payload(
    resource: &dyn Resource,
    desired: &DesiredState,
    existing: &Object,
) -> Result<Object> {
    check_readonly(resource, desired, existing)?;
    Ok(strip_readonly(resource, desired))
}

/// Desired fields without readonly ones, unchecked.
pub fn strip_readonly(resource: &dyn Resource, desired: &DesiredState) -> Object {
    let readonly = resource.readonly_fields();
    let mut payload = desired.payload();
    payload.retain(|name, _| !readonly.contains(&name.as_str()));
    payload
}
