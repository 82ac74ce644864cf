/// A named lifecycle notification.
///
/// Events are:
/// - **immutable** once triggered (listeners get a shared reference)
/// - **cloneable**, so channel subscribers each get their own copy
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name (e.g. "pre.login").
    fn name(&self) -> &'static str;
}
