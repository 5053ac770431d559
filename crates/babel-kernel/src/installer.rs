//! Single-next-hop route installer.
//!
//! One installer serves both families; the [`FamilyParams`] it is built with
//! decides the native address width, the prefix-length offset and whether
//! delete requests carry a metric.

use crate::error::Result;
use crate::family::FamilyParams;
use crate::rib::{KernelRibClient, NextHop, RouteAction, RouteRequest, RouteSource};
use crate::route::RouteKey;
use tracing::debug;

pub struct RouteInstaller<'a, C: ?Sized> {
    client: &'a C,
    params: &'static FamilyParams,
    source: RouteSource,
}

impl<'a, C: KernelRibClient + ?Sized> RouteInstaller<'a, C> {
    pub fn new(client: &'a C, params: &'static FamilyParams, source: RouteSource) -> Self {
        Self {
            client,
            params,
            source,
        }
    }

    pub fn params(&self) -> &'static FamilyParams {
        self.params
    }

    /// Builds the kernel request for `key` without submitting it.
    ///
    /// The prefix is narrowed to the native family and its host bits are
    /// cleared.
    pub fn build_request(&self, action: RouteAction, key: &RouteKey) -> Result<RouteRequest> {
        let prefix = self.params.native_prefix(&key.prefix, key.prefix_len)?;
        let metric = match action {
            RouteAction::Add => Some(key.metric),
            RouteAction::Delete if self.params.delete_carries_metric => Some(key.metric),
            RouteAction::Delete => None,
        };

        Ok(RouteRequest {
            action,
            source: self.source,
            prefix,
            next_hop: NextHop {
                gateway: self.params.native_address(&key.gateway),
                ifindex: key.ifindex,
            },
            metric,
        })
    }

    /// Installs `key` in the kernel.
    pub fn add(&self, key: &RouteKey) -> Result<()> {
        let request = self.build_request(RouteAction::Add, key)?;
        debug!(route = %request, "adding route ({})", self.params.family);
        self.client.submit_route(&request)?;
        Ok(())
    }

    /// Removes `key` from the kernel.
    pub fn delete(&self, key: &RouteKey) -> Result<()> {
        let request = self.build_request(RouteAction::Delete, key)?;
        debug!(route = %request, "removing route ({})", self.params.family);
        self.client.submit_route(&request)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{KernelError, RouteError};
    use crate::rib::MockKernelRibClient;
    use babel_types::{AddressFamily, IpPrefix};
    use pretty_assertions::assert_eq;

    fn v4_key() -> RouteKey {
        RouteKey {
            prefix: "10.1.2.3".parse().unwrap(),
            prefix_len: 120,
            gateway: "192.168.1.1".parse().unwrap(),
            ifindex: 4,
            metric: 256,
        }
    }

    fn v6_key() -> RouteKey {
        RouteKey {
            prefix: "2001:db8:0:1::5".parse().unwrap(),
            prefix_len: 64,
            gateway: "fe80::1".parse().unwrap(),
            ifindex: 7,
            metric: 96,
        }
    }

    #[test]
    fn test_ipv4_add_request() {
        let client = MockKernelRibClient::new();
        let installer = RouteInstaller::new(&client, &FamilyParams::IPV4, RouteSource::BABEL);

        let request = installer.build_request(RouteAction::Add, &v4_key()).unwrap();
        assert_eq!(request.family(), AddressFamily::V4);
        assert_eq!(request.prefix, "10.1.2.0/24".parse::<IpPrefix>().unwrap());
        assert_eq!(request.next_hop.gateway.to_string(), "192.168.1.1");
        assert_eq!(request.next_hop.ifindex, 4);
        assert_eq!(request.metric, Some(256));
        assert_eq!(request.source, RouteSource::BABEL);
    }

    #[test]
    fn test_ipv6_add_request() {
        let client = MockKernelRibClient::new();
        let installer = RouteInstaller::new(&client, &FamilyParams::IPV6, RouteSource::BABEL);

        let request = installer.build_request(RouteAction::Add, &v6_key()).unwrap();
        assert_eq!(request.family(), AddressFamily::V6);
        assert_eq!(request.prefix, "2001:db8:0:1::/64".parse::<IpPrefix>().unwrap());
        assert_eq!(request.next_hop.gateway.to_string(), "fe80::1");
        assert_eq!(request.metric, Some(96));
    }

    #[test]
    fn test_delete_metric_depends_on_family() {
        let client = MockKernelRibClient::new();

        let v4 = RouteInstaller::new(&client, &FamilyParams::IPV4, RouteSource::BABEL);
        let request = v4.build_request(RouteAction::Delete, &v4_key()).unwrap();
        assert_eq!(request.metric, Some(256));

        let v6 = RouteInstaller::new(&client, &FamilyParams::IPV6, RouteSource::BABEL);
        let request = v6.build_request(RouteAction::Delete, &v6_key()).unwrap();
        assert_eq!(request.metric, None);
    }

    #[test]
    fn test_add_submits_exactly_once() {
        let mut client = MockKernelRibClient::new();
        client
            .expect_submit_route()
            .withf(|req| req.action == RouteAction::Add && req.prefix.is_normalized())
            .times(1)
            .returning(|_| Ok(()));

        let installer = RouteInstaller::new(&client, &FamilyParams::IPV4, RouteSource::BABEL);
        assert_eq!(installer.add(&v4_key()), Ok(()));
    }

    #[test]
    fn test_kernel_error_returned_unchanged() {
        let mut client = MockKernelRibClient::new();
        client
            .expect_submit_route()
            .times(1)
            .returning(|_| Err(KernelError::Os(libc::ENETUNREACH)));

        let installer = RouteInstaller::new(&client, &FamilyParams::IPV6, RouteSource::BABEL);
        assert_eq!(
            installer.delete(&v6_key()),
            Err(RouteError::Kernel(KernelError::Os(libc::ENETUNREACH)))
        );
    }

    #[test]
    fn test_custom_source_is_stamped() {
        let source = RouteSource {
            protocol: 99,
            table: 100,
            ..RouteSource::BABEL
        };
        let client = MockKernelRibClient::new();
        let installer = RouteInstaller::new(&client, &FamilyParams::IPV6, source);

        let request = installer.build_request(RouteAction::Add, &v6_key()).unwrap();
        assert_eq!(request.source.protocol, 99);
        assert_eq!(request.source.table, 100);
    }
}
