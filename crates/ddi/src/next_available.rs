//! Next-available queries against IPAM containers.

use crate::client::{HttpClient, decode_results};
use crate::error::{Error, Result};
use declarative::Object;

const IP_PARENTS: &[&str] = &["ipam/address_block", "ipam/subnet", "ipam/range"];
const RANGE_PARENTS: &[&str] = &["ipam/address_block"];

/// Ensure `id` names an object of one of `parents`.
fn check_parent(id: &str, parents: &[&str]) -> Result<()> {
    let kind = id.trim_matches('/').rsplit_once('/').map(|(kind, _)| kind);
    match kind {
        Some(kind) if parents.contains(&kind) => Ok(()),
        _ => Err(Error::InvalidInput(format!(
            "`{id}` is not an identifier of {}",
            parents.join(", ")
        ))),
    }
}

fn suffix_url(client: &HttpClient, id: &str, suffix: &str) -> String {
    client.url("/api/ddi/v1", &format!("{}/{suffix}", id.trim_matches('/')))
}

fn count_param(params: &mut Vec<(&'static str, String)>, count: Option<u32>) {
    if let Some(count) = count {
        params.push(("count", count.to_string()));
    }
}

impl HttpClient {
    /// Free addresses inside an address block, subnet or range.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` when `id` names another kind of object,
    /// or the request error.
    pub fn next_available_ips(
        &self,
        id: &str,
        contiguous: Option<bool>,
        count: Option<u32>,
    ) -> Result<Vec<Object>> {
        check_parent(id, IP_PARENTS)?;
        let mut params = Vec::new();
        if let Some(contiguous) = contiguous {
            params.push(("contiguous", contiguous.to_string()));
        }
        count_param(&mut params, count);
        let body = self.get(&suffix_url(self, id, "nextavailableip"), &params)?;
        decode_results(&body)
    }

    /// Free subnets of the given size inside an address block.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` when `id` is not an address block, or
    /// the request error.
    pub fn next_available_subnets(
        &self,
        id: &str,
        cidr: Option<u8>,
        count: Option<u32>,
    ) -> Result<Vec<Object>> {
        check_parent(id, RANGE_PARENTS)?;
        let body = self.get(
            &suffix_url(self, id, "nextavailablesubnet"),
            &range_params(cidr, count),
        )?;
        decode_results(&body)
    }

    /// Free address blocks of the given size inside an address block.
    ///
    /// Only the `address` of each result is returned.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` when `id` is not an address block, or
    /// the request error.
    pub fn next_available_address_blocks(
        &self,
        id: &str,
        cidr: Option<u8>,
        count: Option<u32>,
    ) -> Result<Vec<String>> {
        check_parent(id, RANGE_PARENTS)?;
        let body = self.get(
            &suffix_url(self, id, "nextavailableaddressblock"),
            &range_params(cidr, count),
        )?;
        let results: Vec<Object> = decode_results(&body)?;
        Ok(addresses(results))
    }
}

fn range_params(cidr: Option<u8>, count: Option<u32>) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(cidr) = cidr {
        params.push(("cidr", cidr.to_string()));
    }
    count_param(&mut params, count);
    params
}

fn addresses(results: Vec<Object>) -> Vec<String> {
    results
        .into_iter()
        .filter_map(|mut item| match item.remove("address") {
            Some(serde_json::Value::String(address)) => Some(address),
            _ => None,
        })
        .collect()
}
