use super::Result;
use crate::store::HostValueStore;

pub trait StorePersister {
    /// Loads the stored state; a store that was never persisted loads as empty.
    fn load(&self) -> Result<HostValueStore>;

    fn persist(&self, store: &HostValueStore) -> Result<()>;
}
