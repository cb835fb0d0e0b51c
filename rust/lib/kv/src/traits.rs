use crate::error::KVError;

/// KVStore is the durable home of every JSON document the service keeps.
///
/// Keys are namespaced strings: `derma:accounts`, `derma:reports:{uid}`, etc.
/// Each key holds one whole document; there is no partial update, so two
/// writers racing on the same key resolve as last-write-wins.
pub trait KVStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Set a key-value pair, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError>;

    /// Delete a key. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), KVError>;

    /// Scan all keys matching a prefix. Returns sorted (key, value) pairs.
    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError>;
}
