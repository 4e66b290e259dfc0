//! hostgather-kube: Kubernetes inventory worker
//!
//! Gathers one inventory record per cluster node over the Kubernetes REST
//! API, using either an explicit endpoint with inline credentials or a
//! kubeconfig file with a named context.

pub mod error;
pub mod kubeconfig;
pub mod nodes;
pub mod session;
pub mod worker;

pub use error::GatherError;
pub use session::{Credential, Session};
pub use worker::KubernetesWorker;
