//! Resource types served by the DDI API.

use declarative::ResourceDescriptor;

const DDI: &str = "/api/ddi/v1";
const INFRA: &str = "/api/infra/v1";

/// DNS view.
pub const DNS_VIEW: ResourceDescriptor =
    ResourceDescriptor::new("dns_view", "View", DDI, "dns/view")
        .with_natural_key(&["name"])
        .with_inherit();

/// Authoritative DNS zone.
pub const DNS_AUTH_ZONE: ResourceDescriptor =
    ResourceDescriptor::new("dns_auth_zone", "AuthZone", DDI, "dns/auth_zone")
        .with_natural_key(&["fqdn"])
        .with_readonly(&["fqdn", "primary_type"])
        .with_required(&["fqdn", "primary_type"])
        .with_inherit();

/// Forward DNS zone.
pub const DNS_FORWARD_ZONE: ResourceDescriptor =
    ResourceDescriptor::new("dns_forward_zone", "ForwardZone", DDI, "dns/forward_zone")
        .with_natural_key(&["fqdn"])
        .with_readonly(&["fqdn"]);

/// Zone delegation.
pub const DNS_DELEGATION: ResourceDescriptor =
    ResourceDescriptor::new("dns_delegation", "Delegation", DDI, "dns/delegation")
        .with_natural_key(&["fqdn"])
        .with_readonly(&["fqdn", "view"])
        .with_required(&["fqdn", "delegation_servers"])
        .with_inherit();

/// Authoritative name server group.
pub const DNS_AUTH_NSG: ResourceDescriptor =
    ResourceDescriptor::new("dns_auth_nsg", "AuthNSG", DDI, "dns/auth_nsg")
        .with_natural_key(&["name"]);

/// IP space.
pub const IPAM_IP_SPACE: ResourceDescriptor =
    ResourceDescriptor::new("ipam_ip_space", "IPSpace", DDI, "ipam/ip_space")
        .with_natural_key(&["name"])
        .with_inherit();

/// Address block, optionally allocated from a parent's free ranges.
pub const IPAM_ADDRESS_BLOCK: ResourceDescriptor =
    ResourceDescriptor::new("ipam_address_block", "AddressBlock", DDI, "ipam/address_block")
        .with_natural_key(&["address", "space", "cidr"])
        .with_readonly(&["address", "space", "cidr"])
        .with_required(&["address", "space"])
        .with_cidr_notation()
        .with_next_available("nextavailableaddressblock")
        .with_inherit();

/// Subnet.
pub const IPAM_SUBNET: ResourceDescriptor =
    ResourceDescriptor::new("ipam_subnet", "Subnet", DDI, "ipam/subnet")
        .with_natural_key(&["address", "space", "cidr"])
        .with_required(&["address", "space"])
        .with_cidr_notation()
        .with_inherit();

/// Single IP address.
pub const IPAM_ADDRESS: ResourceDescriptor =
    ResourceDescriptor::new("ipam_address", "Address", DDI, "ipam/address")
        .with_natural_key(&["address", "space"]);

/// IPAM host.
pub const IPAM_HOST: ResourceDescriptor =
    ResourceDescriptor::new("ipam_host", "IpamHost", DDI, "ipam/host").with_natural_key(&["name"]);

/// Infrastructure join token; revoked tokens stay listed.
pub const INFRA_JOIN_TOKEN: ResourceDescriptor =
    ResourceDescriptor::new("infra_join_token", "JoinToken", INFRA, "jointoken")
        .with_natural_key(&["name"])
        .with_readonly(&["name", "description"])
        .with_retirement("revoked", ("status", "REVOKED"));

static CATALOG: [&ResourceDescriptor; 11] = [
    &DNS_VIEW,
    &DNS_AUTH_ZONE,
    &DNS_FORWARD_ZONE,
    &DNS_DELEGATION,
    &DNS_AUTH_NSG,
    &IPAM_IP_SPACE,
    &IPAM_ADDRESS_BLOCK,
    &IPAM_SUBNET,
    &IPAM_ADDRESS,
    &IPAM_HOST,
    &INFRA_JOIN_TOKEN,
];

/// Every known resource type.
#[must_use]
pub fn all() -> &'static [&'static ResourceDescriptor] {
    &CATALOG
}

/// Find a resource type by name.
#[must_use]
pub fn lookup(resource_type: &str) -> Option<&'static ResourceDescriptor> {
    CATALOG
        .iter()
        .copied()
        .find(|descriptor| descriptor.resource_type == resource_type)
}
