//! Session terminator port

/// Invoked when the session cannot be renewed.
///
/// Implementations discard stored credentials and send the user to the
/// login surface. The gateway fires this and moves on; it neither awaits
/// nor inspects the outcome.
pub trait SessionTerminator: Send + Sync {
    /// Ends the current session.
    fn terminate(&self);
}
