//! Resource trait for declarative state management
//!
//! A Resource describes one kind of object held by a remote store: how it is
//! identified, which fields are fixed after creation, and which words the
//! caller uses for its lifecycle states.

use std::fmt;

/// Page size used when a resource type does not choose its own.
pub const DEFAULT_PAGE_LIMIT: usize = 1000;

/// Core trait for declarative resource types
///
/// Every resource type reconciled by the engine implements this trait, which
/// provides:
/// - Identity (type name, display kind, identifier field)
/// - Lookup (natural key, page size)
/// - Validation (readonly and required fields, accepted field names)
/// - Lifecycle vocabulary (absent word, retired marker)
///
/// # Example
///
/// ```ignore
/// use declarative::Resource;
///
/// #[derive(Debug)]
/// struct View;
///
/// impl Resource for View {
///     fn resource_type(&self) -> &str {
///         "dns_view"
///     }
///
///     fn kind(&self) -> &str {
///         "View"
///     }
///
///     fn natural_key(&self) -> &[&str] {
///         &["name"]
///     }
/// }
/// ```
pub trait Resource: Send + Sync + fmt::Debug {
    /// Resource type name, unique within a catalog (e.g. "dns_auth_zone")
    fn resource_type(&self) -> &str;

    /// Human-readable kind used in messages (e.g. "AuthZone")
    fn kind(&self) -> &str;

    /// Fields that together identify an object when no id is given
    fn natural_key(&self) -> &[&str];

    /// Fields fixed at creation
    fn readonly_fields(&self) -> &[&str] {
        &[]
    }

    /// Fields that must carry a value when the object should be present
    fn required_on_present(&self) -> &[&str] {
        self.natural_key()
    }

    /// Field holding the store-assigned identifier
    fn id_field(&self) -> &str {
        "id"
    }

    /// Accepted field names; empty accepts anything
    fn fields(&self) -> &[&str] {
        &[]
    }

    /// Page size for list calls
    fn page_limit(&self) -> usize {
        DEFAULT_PAGE_LIMIT
    }

    /// Word the caller uses for the absent state
    fn absent_state(&self) -> &str {
        "absent"
    }

    /// Field and value marking an object that is retired but still listed
    ///
    /// Such an object already satisfies the absent state.
    fn retired_marker(&self) -> Option<(&str, &str)> {
        None
    }

    /// Whether `address` may be given in CIDR notation (`10.0.0.0/24`)
    fn cidr_notation(&self) -> bool {
        false
    }

    /// Path suffix appended to a parent id to request the next free range
    fn next_available_suffix(&self) -> Option<&str> {
        None
    }

    /// Human-readable description of this resource type
    fn description(&self) -> String {
        format!("{} (by {})", self.kind(), self.natural_key().join(", "))
    }
}

/// Static description of a resource type.
///
/// Besides the engine's view of the type it carries where the type lives on
/// the wire, so one table can drive both the engine and a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Resource type name
    pub resource_type: &'static str,
    /// Display kind
    pub kind: &'static str,
    /// API path prefix (e.g. "/api/ddi/v1")
    pub api_prefix: &'static str,
    /// Collection path below the prefix (e.g. "dns/auth_zone")
    pub collection: &'static str,
    /// Natural key fields
    pub natural_key: &'static [&'static str],
    /// Readonly fields
    pub readonly: &'static [&'static str],
    /// Required fields for the present state; `None` means the natural key
    pub required: Option<&'static [&'static str]>,
    /// Accepted fields; empty accepts anything
    pub fields: &'static [&'static str],
    /// List page size
    pub page_limit: usize,
    /// Absent word
    pub absent_state: &'static str,
    /// Retired marker
    pub retired_marker: Option<(&'static str, &'static str)>,
    /// CIDR notation accepted in `address`
    pub cidr_notation: bool,
    /// Next-available path suffix
    pub next_available_suffix: Option<&'static str>,
    /// Ask the store for inherited settings on reads
    pub inherit: bool,
}

impl ResourceDescriptor {
    /// Create a descriptor with defaults for everything but identity
    pub const fn new(
        resource_type: &'static str,
        kind: &'static str,
        api_prefix: &'static str,
        collection: &'static str,
    ) -> Self {
        Self {
            resource_type,
            kind,
            api_prefix,
            collection,
            natural_key: &[],
            readonly: &[],
            required: None,
            fields: &[],
            page_limit: DEFAULT_PAGE_LIMIT,
            absent_state: "absent",
            retired_marker: None,
            cidr_notation: false,
            next_available_suffix: None,
            inherit: false,
        }
    }

    /// Set the natural key
    pub const fn with_natural_key(mut self, fields: &'static [&'static str]) -> Self {
        self.natural_key = fields;
        self
    }

    /// Set the readonly fields
    pub const fn with_readonly(mut self, fields: &'static [&'static str]) -> Self {
        self.readonly = fields;
        self
    }

    /// Set the fields required for the present state
    pub const fn with_required(mut self, fields: &'static [&'static str]) -> Self {
        self.required = Some(fields);
        self
    }

    /// Restrict the accepted field names
    pub const fn with_fields(mut self, fields: &'static [&'static str]) -> Self {
        self.fields = fields;
        self
    }

    /// Set the list page size
    pub const fn with_page_limit(mut self, limit: usize) -> Self {
        self.page_limit = limit;
        self
    }

    /// Set the absent word and retired marker
    pub const fn with_retirement(
        mut self,
        absent_state: &'static str,
        marker: (&'static str, &'static str),
    ) -> Self {
        self.absent_state = absent_state;
        self.retired_marker = Some(marker);
        self
    }

    /// Accept CIDR notation in `address`
    pub const fn with_cidr_notation(mut self) -> Self {
        self.cidr_notation = true;
        self
    }

    /// Enable next-available creation with the given path suffix
    pub const fn with_next_available(mut self, suffix: &'static str) -> Self {
        self.next_available_suffix = Some(suffix);
        self
    }

    /// Request inherited settings on reads
    pub const fn with_inherit(mut self) -> Self {
        self.inherit = true;
        self
    }
}

impl Resource for ResourceDescriptor {
    fn resource_type(&self) -> &str {
        self.resource_type
    }

    fn kind(&self) -> &str {
        self.kind
    }

    fn natural_key(&self) -> &[&str] {
        self.natural_key
    }

    fn readonly_fields(&self) -> &[&str] {
        self.readonly
    }

    fn required_on_present(&self) -> &[&str] {
        self.required.unwrap_or(self.natural_key)
    }

    fn fields(&self) -> &[&str] {
        self.fields
    }

    fn page_limit(&self) -> usize {
        self.page_limit
    }

    fn absent_state(&self) -> &str {
        self.absent_state
    }

    fn retired_marker(&self) -> Option<(&str, &str)> {
        self.retired_marker
    }

    fn cidr_notation(&self) -> bool {
        self.cidr_notation
    }

    fn next_available_suffix(&self) -> Option<&str> {
        self.next_available_suffix
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resource_type)
    }
}
