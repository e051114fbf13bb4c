//! Live connection tracking: which squad, if any, each connection is in.
//!
//! The registry is the O(1) lookup the fan-out path and the position relay
//! use to resolve a connection's current room without scanning the squad
//! store. It is updated in step with store mutations: create/join set the
//! association, leave and disconnect clear it.

use dashmap::DashMap;

/// Thread-safe, DashMap-backed connection registry.
pub struct ConnectionRegistry {
    inner: DashMap<String, Option<String>>,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    /// Register a freshly connected, unassociated connection.
    pub fn connect(&self, connection_id: &str) {
        self.inner.insert(connection_id.to_string(), None);
    }

    /// Associate a connection with a squad code.
    pub fn associate(&self, connection_id: &str, code: &str) {
        self.inner
            .insert(connection_id.to_string(), Some(code.to_string()));
    }

    /// Clear a connection's squad association, keeping the connection live.
    pub fn clear(&self, connection_id: &str) {
        if let Some(mut entry) = self.inner.get_mut(connection_id) {
            *entry = None;
        }
    }

    /// The squad code a connection is currently associated with.
    pub fn squad_of(&self, connection_id: &str) -> Option<String> {
        self.inner
            .get(connection_id)
            .and_then(|entry| entry.clone())
    }

    /// Drop a connection entirely. Safe to call for ids that were never
    /// registered or were already dropped.
    pub fn disconnect(&self, connection_id: &str) {
        self.inner.remove(connection_id);
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_starts_unassociated() {
        let registry = ConnectionRegistry::new();
        registry.connect("conn_a");
        assert!(registry.squad_of("conn_a").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn associate_and_clear() {
        let registry = ConnectionRegistry::new();
        registry.connect("conn_a");

        registry.associate("conn_a", "AB1Z");
        assert_eq!(registry.squad_of("conn_a").as_deref(), Some("AB1Z"));

        registry.clear("conn_a");
        assert!(registry.squad_of("conn_a").is_none());
        // The connection itself stays live.
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn disconnect_removes_entry() {
        let registry = ConnectionRegistry::new();
        registry.connect("conn_a");
        registry.associate("conn_a", "AB1Z");

        registry.disconnect("conn_a");
        assert!(registry.squad_of("conn_a").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn disconnect_unknown_is_noop() {
        let registry = ConnectionRegistry::new();
        registry.disconnect("conn_ghost");
        registry.disconnect("conn_ghost");
        assert!(registry.is_empty());
    }

    #[test]
    fn squad_of_unknown_is_none() {
        let registry = ConnectionRegistry::new();
        assert!(registry.squad_of("conn_ghost").is_none());
    }
}
