//! User interface for the storybook
//!
//! This crate provides the egui painters for the book spread, the star
//! field and the fireworks overlay, plus the mapping from raw input to
//! book operations.

pub mod book_view;
pub mod fireworks_layer;
pub mod input;
pub mod star_layer;
pub mod theme;

/// Re-export commonly used types
pub use book_view::BookView;
pub use fireworks_layer::paint_fireworks;
pub use input::{bind, gestures, BookInput, Gesture};
pub use star_layer::paint_stars;
pub use theme::{Theme, apply_theme};
