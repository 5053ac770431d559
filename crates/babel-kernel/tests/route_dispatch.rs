//! Integration tests for route dispatch against an in-memory kernel table.
//!
//! The table keys routes by (prefix, gateway, ifindex) the way the kernel
//! does, so adding the same route twice fails with EEXIST and deleting an
//! absent route fails with ESRCH.

use babel_kernel::{
    KernelError, KernelRibClient, KernelRoutes, NextHopUpdate, Operation, RouteAction,
    RouteChange, RouteError, RouteKey, RouteOutcome, RouteRequest, RouteSource,
};
use babel_types::{canonical_prefix, CanonicalAddress, IpPrefix};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::collections::HashMap;

type TableKey = (IpPrefix, String, u32);

#[derive(Default)]
struct FakeKernel {
    routes: Mutex<HashMap<TableKey, Option<u32>>>,
    requests: Mutex<Vec<RouteRequest>>,
    fail_adds_with: Mutex<Option<KernelError>>,
}

impl FakeKernel {
    fn installed(&self) -> Vec<(String, Option<u32>)> {
        let mut routes: Vec<_> = self
            .routes
            .lock()
            .iter()
            .map(|((prefix, gw, ifindex), metric)| {
                (format!("{} via {}@{}", prefix, gw, ifindex), *metric)
            })
            .collect();
        routes.sort();
        routes
    }

    fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl KernelRibClient for FakeKernel {
    fn submit_route(&self, request: &RouteRequest) -> Result<(), KernelError> {
        self.requests.lock().push(request.clone());

        let key = (
            request.prefix,
            request.next_hop.gateway.to_string(),
            request.next_hop.ifindex,
        );
        let mut routes = self.routes.lock();
        match request.action {
            RouteAction::Add => {
                if let Some(err) = *self.fail_adds_with.lock() {
                    return Err(err);
                }
                if routes.contains_key(&key) {
                    return Err(KernelError::AlreadyExists);
                }
                routes.insert(key, request.metric);
                Ok(())
            }
            RouteAction::Delete => routes.remove(&key).map(|_| ()).ok_or(KernelError::NotFound),
        }
    }
}

fn key(prefix: &str, gateway: &str, ifindex: u32, metric: u32) -> RouteKey {
    let (prefix, prefix_len) = canonical_prefix(&prefix.parse().unwrap());
    RouteKey {
        prefix,
        prefix_len,
        gateway: gateway.parse().unwrap(),
        ifindex,
        metric,
    }
}

fn update(gateway: &str, ifindex: u32, metric: u32) -> NextHopUpdate {
    NextHopUpdate {
        gateway: gateway.parse::<CanonicalAddress>().unwrap(),
        ifindex,
        metric,
    }
}

#[test]
fn test_add_then_flush_round_trip() {
    let kernel = FakeKernel::default();
    let routes = KernelRoutes::new(&kernel);
    let route = RouteChange::new(key("10.0.0.0/24", "192.168.1.1", 2, 100));

    assert_eq!(
        routes.install_or_update_route(Operation::Add, &route),
        Ok(RouteOutcome::Applied)
    );
    assert_eq!(
        kernel.installed(),
        vec![("10.0.0.0/24 via 192.168.1.1@2".to_string(), Some(100))]
    );

    assert_eq!(
        routes.install_or_update_route(Operation::Flush, &route),
        Ok(RouteOutcome::Applied)
    );
    assert!(kernel.installed().is_empty());
}

#[test]
fn test_plain_add_is_not_idempotent() {
    let kernel = FakeKernel::default();
    let routes = KernelRoutes::new(&kernel);
    let route = RouteChange::new(key("2001:db8::/32", "fe80::1", 3, 256));

    assert!(routes.install_or_update_route(Operation::Add, &route).is_ok());
    assert_eq!(
        routes.install_or_update_route(Operation::Add, &route),
        Err(RouteError::Kernel(KernelError::AlreadyExists))
    );
    assert_eq!(kernel.request_count(), 2);
}

#[test]
fn test_modify_to_same_next_hop_is_idempotent() {
    let kernel = FakeKernel::default();
    let routes = KernelRoutes::new(&kernel);
    let old = key("2001:db8::/32", "fe80::1", 3, 256);

    routes
        .install_or_update_route(Operation::Add, &RouteChange::new(old))
        .unwrap();
    let before = kernel.request_count();

    let same = RouteChange::with_update(old, update("fe80::1", 3, 256));
    assert_eq!(
        routes.install_or_update_route(Operation::Modify, &same),
        Ok(RouteOutcome::Unchanged)
    );
    assert_eq!(kernel.request_count(), before);
}

#[test]
fn test_modify_moves_route_to_new_next_hop() {
    let kernel = FakeKernel::default();
    let routes = KernelRoutes::new(&kernel);
    let old = key("10.0.0.0/24", "192.168.1.1", 2, 100);

    routes
        .install_or_update_route(Operation::Add, &RouteChange::new(old))
        .unwrap();

    let change = RouteChange::with_update(old, update("192.168.2.1", 4, 150));
    assert_eq!(
        routes.install_or_update_route(Operation::Modify, &change),
        Ok(RouteOutcome::Applied)
    );
    assert_eq!(
        kernel.installed(),
        vec![("10.0.0.0/24 via 192.168.2.1@4".to_string(), Some(150))]
    );
}

#[test]
fn test_modify_of_absent_route_still_adds() {
    let kernel = FakeKernel::default();
    let routes = KernelRoutes::new(&kernel);
    let old = key("10.9.0.0/16", "192.168.1.1", 2, 100);

    let change = RouteChange::with_update(old, update("192.168.1.5", 2, 100));
    assert_eq!(
        routes.install_or_update_route(Operation::Modify, &change),
        Ok(RouteOutcome::Applied)
    );
    assert_eq!(kernel.installed().len(), 1);
}

#[test]
fn test_modify_onto_existing_route_is_soft_success() {
    let kernel = FakeKernel::default();
    let routes = KernelRoutes::new(&kernel);
    let old = key("10.0.0.0/24", "192.168.1.1", 2, 100);
    let target = key("10.0.0.0/24", "192.168.1.2", 2, 100);

    routes
        .install_or_update_route(Operation::Add, &RouteChange::new(old))
        .unwrap();
    routes
        .install_or_update_route(Operation::Add, &RouteChange::new(target))
        .unwrap();

    let change = RouteChange::with_update(old, update("192.168.1.2", 2, 100));
    assert_eq!(
        routes.install_or_update_route(Operation::Modify, &change),
        Ok(RouteOutcome::AlreadyPresent)
    );
    assert_eq!(
        kernel.installed(),
        vec![("10.0.0.0/24 via 192.168.1.2@2".to_string(), Some(100))]
    );
}

#[test]
fn test_failed_modify_leaves_route_absent() {
    let kernel = FakeKernel::default();
    let routes = KernelRoutes::new(&kernel);
    let old = key("10.0.0.0/24", "192.168.1.1", 2, 100);

    routes
        .install_or_update_route(Operation::Add, &RouteChange::new(old))
        .unwrap();
    *kernel.fail_adds_with.lock() = Some(KernelError::Os(libc::ENETUNREACH));

    let change = RouteChange::with_update(old, update("192.168.1.2", 2, 100));
    let err = routes
        .install_or_update_route(Operation::Modify, &change)
        .unwrap_err();
    assert_eq!(err, RouteError::Kernel(KernelError::Os(libc::ENETUNREACH)));
    assert!(kernel.installed().is_empty());
}

#[test]
fn test_submitted_prefix_is_normalized() {
    let kernel = FakeKernel::default();
    let routes = KernelRoutes::new(&kernel);

    routes
        .install_or_update_route(
            Operation::Add,
            &RouteChange::new(key("10.1.2.3/16", "192.168.1.1", 2, 100)),
        )
        .unwrap();
    routes
        .install_or_update_route(
            Operation::Add,
            &RouteChange::new(key("2001:db8:aaaa:bbbb::1/48", "fe80::1", 2, 100)),
        )
        .unwrap();

    let requests = kernel.requests.lock();
    assert_eq!(requests[0].prefix.to_string(), "10.1.0.0/16");
    assert_eq!(requests[1].prefix.to_string(), "2001:db8:aaaa::/48");
    assert!(requests.iter().all(|req| req.prefix.is_normalized()));
}

#[test]
fn test_requests_carry_configured_source() {
    let kernel = FakeKernel::default();
    let source = RouteSource {
        table: 100,
        ..RouteSource::BABEL
    };
    let routes = KernelRoutes::with_source(&kernel, source);

    routes
        .install_or_update_route(
            Operation::Add,
            &RouteChange::new(key("10.0.0.0/8", "192.168.1.1", 2, 1)),
        )
        .unwrap();

    assert_eq!(kernel.requests.lock()[0].source, source);
}

#[test]
fn test_family_mismatch_touches_nothing() {
    let kernel = FakeKernel::default();
    let routes = KernelRoutes::new(&kernel);

    let err = routes
        .install_or_update_route(
            Operation::Add,
            &RouteChange::new(key("10.0.0.0/24", "fe80::1", 2, 100)),
        )
        .unwrap_err();
    assert!(matches!(err, RouteError::FamilyMismatch { .. }));
    assert_eq!(kernel.request_count(), 0);
}
