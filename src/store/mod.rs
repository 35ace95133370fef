pub mod json_file;

use crate::app::Result;

pub use json_file::JsonFileStore;
pub(crate) use json_file::write_atomic;

/// Small key-value abstraction over the flat-file caches.
///
/// `put` is write-through: implementations persist before returning and
/// swallow (but log) persistence failures, since a cache miss on the next
/// run is the worst outcome.
pub trait KvStore<V> {
    fn get(&self, key: &str) -> Option<V>;
    fn put(&self, key: &str, value: V);
    fn contains(&self, key: &str) -> bool;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Write the current contents, reporting failures to the caller.
    fn flush(&self) -> Result<()>;
}
