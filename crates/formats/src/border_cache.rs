use std::future::Future;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::border::{BorderError, BorderOverlay};

/// Loads the border overlay at most once for the owner's lifetime.
///
/// Concurrent callers wait on the same load. A failed load is not cached,
/// so the next caller tries again.
#[derive(Debug)]
pub struct BorderCache {
    radius: f64,
    cell: OnceCell<Arc<BorderOverlay>>,
}

impl BorderCache {
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            cell: OnceCell::new(),
        }
    }

    pub fn get(&self) -> Option<Arc<BorderOverlay>> {
        self.cell.get().cloned()
    }

    /// Return the cached overlay, or run `load` for the GeoJSON text and parse it.
    pub async fn get_or_load<F, Fut>(&self, load: F) -> Result<Arc<BorderOverlay>, BorderError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, BorderError>>,
    {
        let radius = self.radius;
        self.cell
            .get_or_try_init(|| async move {
                let text = load().await?;
                let overlay = BorderOverlay::from_geojson(&text, radius)?;
                tracing::info!(rings = overlay.rings.len(), "border overlay loaded");
                Ok(Arc::new(overlay))
            })
            .await
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::BorderCache;
    use crate::border::BorderError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SQUARE: &str =
        r#"{"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]]}"#;

    #[tokio::test]
    async fn loads_once_and_shares_the_result() {
        let cache = BorderCache::new(1.012);
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let load = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(SQUARE.to_string())
        };

        let a = cache.get_or_load(load).await.expect("first load");
        let b = cache.get_or_load(load).await.expect("cached");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(cache.get().is_some());
    }

    #[tokio::test]
    async fn failures_are_retried() {
        let cache = BorderCache::new(1.0);
        let err = cache
            .get_or_load(|| async { Err(BorderError::Load("offline".into())) })
            .await
            .expect_err("loader failed");
        assert!(matches!(err, BorderError::Load(_)));
        assert!(cache.get().is_none());

        let ok = cache
            .get_or_load(|| async { Ok(SQUARE.to_string()) })
            .await
            .expect("second attempt");
        assert_eq!(ok.rings.len(), 1);
    }
}
