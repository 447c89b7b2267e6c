//! Backing data store reachability.
//!
//! The gateway never reads or writes domain data; its only store concern
//! is the reachability probe consumed by `/api/health` and by startup
//! gating. The [`DataStore`] seam keeps the pipeline testable without a
//! live database.

pub mod postgres;

use futures_util::future::BoxFuture;

use crate::error::GatewayError;

/// Reachability probe over the backing data store.
pub trait DataStore: std::fmt::Debug + Send + Sync {
    /// Probes the store once; the result is never cached.
    ///
    /// `Ok(true)` means reachable, `Ok(false)` means the store did not
    /// answer (reported as `Disconnected`, not an error).
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] only when the probe itself faults.
    fn ping(&self) -> BoxFuture<'_, Result<bool, GatewayError>>;
}
