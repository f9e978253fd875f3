//! Handler registry implementation
//!
//! The one piece of state shared by every connection: a map from hash to
//! handler. Entries are added at startup or by the registrar while the server
//! runs, and are never removed.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::handler::Handler;
use super::key::Hash;

/// A (hash, handler) pair from [`HandlerRegistry::registrations`]
#[derive(Debug, Clone)]
pub struct Registration {
    /// Dispatch key
    pub hash: Hash,
    /// Handler bound to the key when the snapshot was taken
    pub handler: Handler,
}

/// Concurrent hash → handler table
///
/// Thread-safe via `RwLock`. Lookups happen once per accepted connection and
/// can proceed in parallel; registrations take the write lock.
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<Hash, Handler>>,
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry pre-populated with `entries`
    ///
    /// Later duplicates win, as with [`register`](Self::register).
    pub fn with_handlers<I, H>(entries: I) -> Self
    where
        I: IntoIterator<Item = (H, Handler)>,
        H: Into<Hash>,
    {
        let handlers = entries
            .into_iter()
            .map(|(hash, handler)| (hash.into(), handler))
            .collect();

        Self {
            handlers: RwLock::new(handlers),
        }
    }

    /// Bind `handler` to `hash`
    ///
    /// An existing binding is overwritten (last write wins). Returns `true` if
    /// a previous handler was replaced.
    pub async fn register(&self, hash: impl Into<Hash>, handler: Handler) -> bool {
        let hash = hash.into();
        let kind = handler.kind();
        let replaced = self.handlers.write().await.insert(hash.clone(), handler);

        tracing::debug!(
            hash = %hash,
            handler = kind,
            replaced = replaced.is_some(),
            "Handler registered"
        );

        replaced.is_some()
    }

    /// Handler currently bound to `hash`, if any
    pub async fn lookup(&self, hash: &Hash) -> Option<Handler> {
        self.handlers.read().await.get(hash).cloned()
    }

    /// Whether `hash` has a handler
    pub async fn contains(&self, hash: &Hash) -> bool {
        self.handlers.read().await.contains_key(hash)
    }

    /// Snapshot of all bindings
    ///
    /// Order is unspecified. Later registrations are not reflected in a
    /// snapshot already taken.
    pub async fn registrations(&self) -> Vec<Registration> {
        self.handlers
            .read()
            .await
            .iter()
            .map(|(hash, handler)| Registration {
                hash: hash.clone(),
                handler: handler.clone(),
            })
            .collect()
    }

    /// Number of bound hashes
    pub async fn len(&self) -> usize {
        self.handlers.read().await.len()
    }

    /// True if nothing is registered
    pub async fn is_empty(&self) -> bool {
        self.handlers.read().await.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn test_register_lookup() {
        let registry = HandlerRegistry::new();
        assert!(registry.is_empty().await);

        let replaced = registry.register("somehash", Handler::EchoContent).await;
        assert!(!replaced);

        let handler = registry.lookup(&Hash::from("somehash")).await;
        assert!(matches!(handler, Some(Handler::EchoContent)));
        assert!(registry.contains(&Hash::from("somehash")).await);
    }

    #[tokio::test]
    async fn test_lookup_unknown() {
        let registry = HandlerRegistry::new();
        registry.register("somehash", Handler::EchoContent).await;

        assert!(registry.lookup(&Hash::from("otherhash")).await.is_none());
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let registry = HandlerRegistry::new();
        registry.register("somehash", Handler::EchoContent).await;

        let replaced = registry.register("somehash", Handler::EchoHash).await;
        assert!(replaced);

        let handler = registry.lookup(&Hash::from("somehash")).await;
        assert!(matches!(handler, Some(Handler::EchoHash)));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_with_handlers() {
        let registry = HandlerRegistry::with_handlers([
            ("a", Handler::EchoContent),
            ("b", Handler::EchoHash),
            ("a", Handler::Registrar),
        ]);

        assert_eq!(registry.len().await, 2);
        assert!(matches!(
            registry.lookup(&Hash::from("a")).await,
            Some(Handler::Registrar)
        ));
    }

    #[tokio::test]
    async fn test_registrations_snapshot() {
        let registry = HandlerRegistry::new();
        registry.register("one", Handler::EchoContent).await;
        registry.register("two", Handler::EchoHash).await;

        let snapshot = registry.registrations().await;
        registry.register("three", Handler::EchoContent).await;
        registry.register("one", Handler::EchoHash).await;

        assert_eq!(snapshot.len(), 2);
        let mut hashes: Vec<String> = snapshot.iter().map(|r| r.hash.to_string()).collect();
        hashes.sort();
        assert_eq!(hashes, vec!["one", "two"]);

        let one = snapshot
            .iter()
            .find(|r| r.hash == Hash::from("one"))
            .unwrap();
        assert!(matches!(one.handler, Handler::EchoContent));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_register_lookup() {
        let registry = Arc::new(HandlerRegistry::new());
        for i in 0..50 {
            registry.register(format!("pre-{i}"), Handler::EchoContent).await;
        }

        let mut tasks = Vec::new();
        for i in 0..200 {
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                registry.register(format!("new-{i}"), Handler::EchoHash).await;
                let hit = registry.lookup(&Hash::from(format!("pre-{}", i % 50))).await;
                assert!(matches!(hit, Some(Handler::EchoContent)));
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(registry.len().await, 250);
        for i in 0..200 {
            assert!(registry.contains(&Hash::from(format!("new-{i}"))).await);
        }
    }
}
