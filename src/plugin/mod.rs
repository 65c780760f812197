//! Lifecycle operations and the host collaborators they rely on

pub mod api;
pub mod manager;
pub mod pruner;

#[cfg(test)]
pub(crate) mod test_support;
