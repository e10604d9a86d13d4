//! Book observer trait

use super::BookEvent;

/// Trait for components that react to book transitions.
///
/// Observers are held weakly and called on the UI thread, so
/// implementations use interior mutability and need not be `Send`.
pub trait BookObserver {
    fn on_book_event(&self, event: &BookEvent);
}
