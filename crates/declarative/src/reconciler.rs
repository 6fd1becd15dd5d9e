//! Reconciler - picks and performs the single action that converges an object
//!
//! | existing | desired state | action                          |
//! |----------|---------------|---------------------------------|
//! | none     | present       | create                          |
//! | none     | absent        | no-op                           |
//! | some     | present       | no-op, or update when changed   |
//! | some     | absent        | delete (no-op if retired)       |

use crate::context::ResourceClient;
use crate::diff::first_difference;
use crate::error::{Error, Result};
use crate::guard::{strip_readonly, update_payload};
use crate::outcome::{Outcome, identifier};
use crate::request::{LifecycleState, ReconcileRequest};
use crate::resolver::Resolver;
use crate::resource::Resource;
use crate::types::{DesiredState, Object};
use serde_json::Value;

/// The action decided for one reconciliation
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Create { payload: Object },
    Update { id: String, payload: Object },
    Delete { id: String },
    NoOp,
}

impl Action {
    /// Check if this action mutates the remote store
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::NoOp)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::NoOp => "no-op",
        }
    }
}

/// Decide the action for a desired state against what exists.
///
/// Pure: issues no calls. The readonly guard runs here, so an update that
/// would touch a readonly field fails before anything is sent. A dry run
/// skips the guard since no update is sent.
pub fn plan(
    resource: &dyn Resource,
    request: &ReconcileRequest,
    desired: &DesiredState,
    existing: Option<&Object>,
) -> Result<Action> {
    let kind = resource.kind();
    match (existing, request.state()) {
        (None, LifecycleState::Present) => Ok(Action::Create {
            payload: create_payload(resource, request, desired),
        }),
        (None, LifecycleState::Absent) => Ok(Action::NoOp),
        (Some(existing), LifecycleState::Present) => match first_difference(desired, Some(existing))
        {
            Some(difference) => {
                log::debug!("{kind}: {difference}");
                let payload = if request.is_dry_run() {
                    strip_readonly(resource, desired)
                } else {
                    update_payload(resource, desired, existing)?
                };
                Ok(Action::Update {
                    id: require_id(resource, existing)?,
                    payload,
                })
            }
            None => Ok(Action::NoOp),
        },
        (Some(existing), LifecycleState::Absent) => {
            if is_retired(resource, existing) {
                log::debug!("{kind}: already {}", resource.absent_state());
                Ok(Action::NoOp)
            } else {
                Ok(Action::Delete {
                    id: require_id(resource, existing)?,
                })
            }
        }
    }
}

fn create_payload(resource: &dyn Resource, request: &ReconcileRequest, desired: &DesiredState) -> Object {
    let mut payload = desired.payload();
    if let (Some(suffix), Some(parent)) =
        (resource.next_available_suffix(), request.next_available_id())
        && !payload.contains_key("address")
    {
        payload.insert(
            "address".to_string(),
            Value::String(format!("{parent}/{suffix}")),
        );
    }
    payload
}

fn is_retired(resource: &dyn Resource, existing: &Object) -> bool {
    resource
        .retired_marker()
        .is_some_and(|(field, value)| existing.get(field).and_then(Value::as_str) == Some(value))
}

fn require_id(resource: &dyn Resource, existing: &Object) -> Result<String> {
    identifier(existing, resource.id_field()).ok_or_else(|| Error::MissingIdentifier {
        kind: resource.kind().to_string(),
        field: resource.id_field().to_string(),
    })
}

/// Reconciles objects of one resource type through a client
pub struct Reconciler<'a, C: ResourceClient + ?Sized> {
    client: &'a C,
    resource: &'a dyn Resource,
}

impl<'a, C: ResourceClient + ?Sized> Reconciler<'a, C> {
    pub fn new(client: &'a C, resource: &'a dyn Resource) -> Self {
        Self { client, resource }
    }

    /// Resolve the existing object, then converge it.
    pub fn run(&self, request: &ReconcileRequest) -> Result<Outcome> {
        let desired = self.prepare(request)?;
        let existing = Resolver::new(self.client, self.resource).find(request, &desired)?;
        self.converge(request, &desired, existing)
    }

    /// Converge against an existing state the caller already holds.
    pub fn reconcile(&self, request: &ReconcileRequest, existing: Option<Object>) -> Result<Outcome> {
        let desired = self.prepare(request)?;
        self.converge(request, &desired, existing)
    }

    /// Validate the desired state and normalise CIDR notation.
    pub fn prepare(&self, request: &ReconcileRequest) -> Result<DesiredState> {
        let resource = self.resource;
        let kind = resource.kind();
        let mut desired = request.desired().clone();

        let accepted = resource.fields();
        if !accepted.is_empty()
            && let Some((name, _)) = desired.iter().find(|(name, _)| !accepted.contains(name))
        {
            return Err(Error::InvalidInput(format!(
                "unsupported field `{name}` for {kind}"
            )));
        }

        if resource.cidr_notation() {
            split_cidr(kind, &mut desired)?;
        }

        let allocating =
            resource.next_available_suffix().is_some() && request.next_available_id().is_some();
        if allocating {
            if desired.get("address").is_set() {
                return Err(Error::InvalidInput(format!(
                    "{kind} takes either `address` or `next_available_id`, not both"
                )));
            }
            if !desired.get("cidr").is_set() {
                return Err(Error::InvalidInput(format!(
                    "{kind} needs `cidr` together with `next_available_id`"
                )));
            }
        }

        if request.state().is_present() {
            for field in resource.required_on_present() {
                if *field == "address" && allocating {
                    continue;
                }
                if !desired.get(field).is_set() {
                    return Err(Error::InvalidInput(format!(
                        "{kind} requires `{field}` when present"
                    )));
                }
            }
        }

        Ok(desired)
    }

    fn converge(
        &self,
        request: &ReconcileRequest,
        desired: &DesiredState,
        existing: Option<Object>,
    ) -> Result<Outcome> {
        let resource = self.resource;
        let kind = resource.kind();
        let id_field = resource.id_field();
        let action = plan(resource, request, desired, existing.as_ref())?;
        let msg = message(resource, &action, request.state());
        let before = existing.unwrap_or_default();

        if request.is_dry_run() {
            log::debug!("{kind}: dry run, would {}", action.name());
            return Ok(Outcome::dry_run(action.is_change(), id_field, before, msg));
        }

        match action {
            Action::Create { payload } => {
                let created = self
                    .client
                    .create(&payload)
                    .map_err(|e| Error::client(kind, e))?;
                log::info!("{kind}: created {}", identifier(&created, id_field).unwrap_or_default());
                Ok(Outcome::assemble(true, id_field, before, created, msg))
            }
            Action::Update { id, payload } => {
                let updated = self
                    .client
                    .update(&id, &payload)
                    .map_err(|e| Error::client(kind, e))?;
                log::info!("{kind}: updated {id}");
                Ok(Outcome::assemble(true, id_field, before, updated, msg))
            }
            Action::Delete { id } => {
                self.client.delete(&id).map_err(|e| Error::client(kind, e))?;
                log::info!("{kind}: deleted {id}");
                Ok(Outcome::assemble(true, id_field, before, Object::new(), msg))
            }
            Action::NoOp => {
                let after = before.clone();
                Ok(Outcome::assemble(false, id_field, before, after, msg))
            }
        }
    }
}

fn message(resource: &dyn Resource, action: &Action, state: LifecycleState) -> String {
    let kind = resource.kind();
    match (action, state) {
        (Action::Create { .. }, _) => format!("{kind} created"),
        (Action::Update { .. }, _) => format!("{kind} updated"),
        (Action::Delete { .. }, _) => format!("{kind} deleted"),
        (Action::NoOp, LifecycleState::Present) => format!("{kind} unchanged"),
        (Action::NoOp, LifecycleState::Absent) => {
            format!("{kind} already {}", resource.absent_state())
        }
    }
}

/// Split `address = "a.b.c.d/n"` into `address` and a numeric `cidr`
fn split_cidr(kind: &str, desired: &mut DesiredState) -> Result<()> {
    let Some(Value::String(address)) = desired.get("address").value() else {
        return Ok(());
    };
    let Some((address, prefix)) = address.split_once('/') else {
        return Ok(());
    };
    let cidr: u8 = prefix.parse().map_err(|_| {
        Error::InvalidInput(format!("{kind} address has an invalid prefix length `{prefix}`"))
    })?;
    let address = address.to_string();
    desired.set("address", address);
    desired.set("cidr", i64::from(cidr));
    Ok(())
}
