//! Kubernetes control-plane adapter

pub mod kube_client;

pub use kube_client::{ClusterSetupError, KubeControlPlane};
