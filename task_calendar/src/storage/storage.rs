use anyhow::Result;

/// A named-slot key-value store, shaped like browser local storage.
///
/// Values are opaque strings; the todo store keeps one JSON document per slot.
pub trait SlotStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}
