//! State store port: persistence for device snapshots.

use std::future::Future;

use homehub_domain::device::Statefile;
use homehub_domain::error::HubError;

/// Loads and saves the [`Statefile`].
pub trait StateStore {
    /// Read the last saved state. A store that was never written yields an
    /// empty [`Statefile`].
    fn load(&self) -> impl Future<Output = Result<Statefile, HubError>> + Send;

    /// Replace the saved state. Readers never observe a partial write.
    fn save(&self, statefile: Statefile) -> impl Future<Output = Result<(), HubError>> + Send;
}

impl<T: StateStore + Send + Sync> StateStore for std::sync::Arc<T> {
    fn load(&self) -> impl Future<Output = Result<Statefile, HubError>> + Send {
        (**self).load()
    }

    fn save(&self, statefile: Statefile) -> impl Future<Output = Result<(), HubError>> + Send {
        (**self).save(statefile)
    }
}
