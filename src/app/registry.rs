//! Service registry populated through the AddServices extension point.

use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Registered services plus logging-related contributions.
///
/// Services are keyed by type; registering a second value of the same type
/// replaces the first. Logging contributions are collected here and applied
/// when the runtime logger is configured during builder finalization.
#[derive(Default)]
pub struct ServiceRegistry {
    entries: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    log_fields: Vec<(String, String)>,
    log_directives: Vec<String>,
}

impl ServiceRegistry {
    /// Register a service instance.
    pub fn register<T: Send + Sync + 'static>(&mut self, service: T) {
        self.entries.insert(TypeId::of::<T>(), Box::new(service));
    }

    /// Look up a registered service by type.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref())
    }

    /// Whether a service of the given type is registered.
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no services are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attach an extra field to every runtime log record.
    pub fn contribute_log_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.log_fields.push((key.into(), value.into()));
    }

    /// Add a filter directive layered after the configured level.
    pub fn contribute_log_directive(&mut self, directive: impl Into<String>) {
        self.log_directives.push(directive.into());
    }

    /// Fields contributed by registered services.
    pub fn log_fields(&self) -> &[(String, String)] {
        &self.log_fields
    }

    /// Filter directives contributed by registered services.
    pub fn log_directives(&self) -> &[String] {
        &self.log_directives
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.entries.len())
            .field("log_fields", &self.log_fields)
            .field("log_directives", &self.log_directives)
            .finish()
    }
}
