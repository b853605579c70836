//! On-demand cache for child objects
//!
//! The first access runs the loader once; later accesses return the cached
//! value until it is invalidated or a refetch is forced. A failed load
//! leaves the cache empty so the next access tries again.

use std::future::Future;

use crate::error::Result;

/// A value loaded at most once until invalidated
#[derive(Debug, Clone)]
pub struct Lazy<T> {
    value: Option<T>,
}

/// Cached child collection
pub type LazyList<T> = Lazy<Vec<T>>;

impl<T> Default for Lazy<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T> Lazy<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.value.is_some()
    }

    /// Drop the cached value; the next `load` fetches again
    pub fn invalidate(&mut self) {
        self.value = None;
    }

    /// Cached value without triggering a load
    pub fn cached(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Return the cached value, running `fetch` first if there is none or
    /// `force_refetch` is set.
    pub async fn load<F, Fut>(&mut self, force_refetch: bool, fetch: F) -> Result<&mut T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let value = match self.value.take() {
            Some(value) if !force_refetch => value,
            _ => fetch().await?,
        };
        Ok(self.value.insert(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_loads_once_until_forced() {
        let calls = AtomicUsize::new(0);
        let mut lazy: LazyList<u32> = LazyList::new();

        for _ in 0..3 {
            let items = lazy
                .load(false, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![1, 2, 3])
                })
                .await
                .unwrap();
            assert_eq!(items.len(), 3);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        lazy.load(true, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![4])
        })
        .await
        .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(lazy.cached(), Some(&vec![4]));
    }

    #[tokio::test]
    async fn test_failed_load_leaves_cache_empty() {
        let mut lazy: LazyList<u32> = LazyList::new();
        lazy.load(false, || async { Ok(vec![1]) }).await.unwrap();

        let result = lazy
            .load(true, || async { Err(Error::transport("connection reset")) })
            .await;
        assert!(result.is_err());
        assert!(!lazy.is_loaded());

        lazy.invalidate();
        assert!(lazy.cached().is_none());
    }
}
