mod controller;
mod observer;
mod page;

pub use controller::{BookController, BookTask};
pub use observer::BookObserver;
pub use page::{Curl, CurlDirection, PageRole, PageView};

/// Cover position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverState {
    /// Resting shut over the first page
    Closed,
    /// Folded back, pages visible
    Open,
    /// Swinging shut; becomes `Closed` once the transition has played
    Closing,
}

/// Who currently drives the page index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    /// The reader
    Idle,
    /// The automated flip back to the first page
    Reversing,
}

/// Notifications emitted by the controller
#[derive(Debug, Clone, PartialEq)]
pub enum BookEvent {
    CoverOpened,
    CoverClosing,
    CoverClosed,
    PageTurned {
        from: usize,
        to: usize,
        direction: CurlDirection,
    },
    ReverseStarted,
    ReverseFinished,
    FireworksStarted,
    FireworksStopped,
}
