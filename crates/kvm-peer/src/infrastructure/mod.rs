//! Infrastructure layer of a KVM Mesh peer.
//!
//! Contains the adapters behind the application ports: local input, the
//! peer network, and file-system storage.
//!
//! **Dependency rule**: this layer may depend on `application` and `kvm_core`,
//! but MUST NOT be imported by the `application` or domain layers.

pub mod input;
pub mod network;
pub mod storage;
