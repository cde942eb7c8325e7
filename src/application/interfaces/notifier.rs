use crate::domain::Notice;

/// Surfaces notices about degraded functionality to the person at the
/// keyboard.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}
