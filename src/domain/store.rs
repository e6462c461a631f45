use super::error::StoreError;

/// Persisted per-device settings the credential manager reads and writes.
pub trait LocalConfigStore: Send + Sync {
    /// Opaque device/account identifier sent with every server call.
    fn id(&self) -> String;

    fn pin(&self) -> Option<String>;

    /// `None` clears the stored PIN.
    fn set_pin(&self, pin: Option<&str>) -> Result<(), StoreError>;

    fn is_fido_touch_id_enabled(&self) -> bool;

    fn set_fido_touch_id_enabled(&self, enabled: bool) -> Result<(), StoreError>;
}
