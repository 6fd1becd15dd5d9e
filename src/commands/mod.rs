//! Command implementations

pub mod apply;
pub mod info;
pub mod next_available;
pub mod resources;

use anyhow::{Result, bail};
use declarative::ResourceDescriptor;

/// Look up a resource type, applying the page size override
pub(crate) fn descriptor(resource: &str, page_limit: Option<usize>) -> Result<ResourceDescriptor> {
    let Some(found) = ddi::catalog::lookup(resource) else {
        bail!("unknown resource type `{resource}` (run `ddictl resources` for the list)");
    };
    let descriptor = match page_limit {
        Some(limit) => found.with_page_limit(limit),
        None => *found,
    };
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::Resource;

    #[test]
    fn test_descriptor_override() {
        let view = descriptor("dns_view", Some(50)).unwrap();
        assert_eq!(view.page_limit(), 50);
        assert_eq!(ddi::catalog::DNS_VIEW.page_limit(), 1000);
    }

    #[test]
    fn test_descriptor_unknown() {
        let err = descriptor("dns_record", None).unwrap_err();
        assert!(err.to_string().contains("ddictl resources"));
    }
}
