// Service layer
pub mod match_lifecycle_service;

#[cfg(test)]
mod match_lifecycle_service_test;

pub use match_lifecycle_service::MatchLifecycleService;
