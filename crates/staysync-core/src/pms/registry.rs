//! Vendor name -> adapter lookup.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::mews::PmsMews;
use super::traits::PmsAdapter;
use crate::error::RegistryError;

type Factory = fn() -> Box<dyn PmsAdapter>;

fn factory<A: PmsAdapter + Default + 'static>() -> Box<dyn PmsAdapter> {
    Box::new(A::default())
}

fn register<A: PmsAdapter + Default + 'static>(table: &mut BTreeMap<String, Factory>) {
    let name = A::default().name();
    table.insert(name, factory::<A>);
}

static ADAPTERS: LazyLock<BTreeMap<String, Factory>> = LazyLock::new(|| {
    let mut table = BTreeMap::new();
    register::<PmsMews>(&mut table);
    table
});

/// Adapter registered under `name` (case-insensitive), if any.
pub fn resolve(name: &str) -> Option<Box<dyn PmsAdapter>> {
    ADAPTERS
        .get(&name.trim().to_lowercase())
        .map(|make| make())
}

/// Like [`resolve`], for callers that need an error.
pub fn require(name: &str) -> Result<Box<dyn PmsAdapter>, RegistryError> {
    resolve(name).ok_or_else(|| RegistryError::UnknownVendor {
        name: name.to_string(),
    })
}

/// Registered vendor names, sorted.
pub fn vendors() -> Vec<&'static str> {
    ADAPTERS.keys().map(String::as_str).collect()
}
