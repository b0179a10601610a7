// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "credentials/mod.rs"]
pub mod credentials;

#[path = "google/mod.rs"]
pub mod google;

#[cfg(test)]
#[path = "records/mod.rs"]
pub mod records;
