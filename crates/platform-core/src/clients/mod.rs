//! Outbound client traits (ports) for the cluster control plane and billing.

pub mod cluster;
pub mod billing;

pub use cluster::ClusterControlPlane;
pub use billing::BillingClient;

#[cfg(test)]
pub use cluster::MockClusterControlPlane;
#[cfg(test)]
pub use billing::MockBillingClient;
