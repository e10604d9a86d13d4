//! Book controller implementation

use std::rc::{Rc, Weak};
use rand::rngs::StdRng;
use tracing::debug;

use super::{BookEvent, BookObserver, CoverState, Curl, CurlDirection, PageView, Sequence};
use crate::config::{BookConfig, TimingConfig};
use crate::error::Result;
use crate::fireworks::{FireworkTrigger, ParticleEngine};
use crate::schedule::{Scheduler, TimerId};

/// Deferred work the controller schedules for itself
#[derive(Debug, Clone, PartialEq)]
pub enum BookTask {
    /// Drop the curl a page was given at `started_ms`
    ClearCurl { page: usize, started_ms: u64 },
    /// Let a closing cover come to rest
    FinishClosing,
    /// Next flip of the reverse-and-close sequence
    ReverseStep,
    /// A fireworks burst timer fired
    Fireworks(FireworkTrigger),
}

impl From<FireworkTrigger> for BookTask {
    fn from(trigger: FireworkTrigger) -> Self {
        BookTask::Fireworks(trigger)
    }
}

/// Owns all book state: page index, cover, the reverse sequence, the
/// timers, and the fireworks engine.
pub struct BookController {
    timing: TimingConfig,
    pages: Vec<PageView>,
    index: usize,
    cover: CoverState,
    sequence: Sequence,
    timers: Scheduler<BookTask>,
    /// Pending `FinishClosing`, if the cover is mid-close
    close_timer: Option<TimerId>,
    fireworks: ParticleEngine,
    observers: Vec<Weak<dyn BookObserver>>,
}

impl BookController {
    /// Create a closed book on its first page
    pub fn new(config: &BookConfig, rng: StdRng) -> Result<Self> {
        config.validate()?;

        let mut book = Self {
            timing: config.timing.clone(),
            pages: (0..config.pages.len()).map(PageView::new).collect(),
            index: 0,
            cover: CoverState::Closed,
            sequence: Sequence::Idle,
            timers: Scheduler::new(),
            close_timer: None,
            fireworks: ParticleEngine::new(config.fireworks.clone(), rng),
            observers: Vec::new(),
        };
        book.render_state(None);

        debug!("Book created with {} pages", book.page_count());
        Ok(book)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn last_index(&self) -> usize {
        self.pages.len().saturating_sub(1)
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn cover(&self) -> CoverState {
        self.cover
    }

    pub fn is_open(&self) -> bool {
        self.cover == CoverState::Open
    }

    pub fn sequence(&self) -> Sequence {
        self.sequence
    }

    pub fn is_reversing(&self) -> bool {
        self.sequence == Sequence::Reversing
    }

    pub fn pages(&self) -> &[PageView] {
        &self.pages
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub fn fireworks(&self) -> &ParticleEngine {
        &self.fireworks
    }

    /// Scheduler clock, ms
    pub fn now_ms(&self) -> u64 {
        self.timers.now()
    }

    /// Register an observer. Only a weak reference is kept.
    pub fn add_observer(&mut self, observer: Rc<dyn BookObserver>) {
        self.observers.push(Rc::downgrade(&observer));
    }

    /// Open the cover. Returns false if it was already open.
    pub fn open_cover(&mut self) -> bool {
        if self.is_open() {
            return false;
        }

        self.cancel_close_timer();
        self.cover = CoverState::Open;
        self.emit(BookEvent::CoverOpened);
        true
    }

    /// Start closing the cover; it comes to rest after `cover_close_ms`
    pub fn close_cover(&mut self) {
        if self.cover == CoverState::Closed {
            return;
        }

        self.cancel_close_timer();
        self.cover = CoverState::Closing;
        self.close_timer = Some(self.timers.schedule_after(self.timing.cover_close_ms, BookTask::FinishClosing));
        self.emit(BookEvent::CoverClosing);
    }

    /// Tap, click or `ArrowRight`.
    ///
    /// Opens a closed cover without turning a page, turns forward while
    /// pages remain, and on the last page flips back to the start and
    /// closes.
    pub fn advance(&mut self) {
        if !self.is_open() {
            self.open_cover();
            return;
        }
        if self.is_reversing() {
            debug!("Ignoring advance while reversing");
            return;
        }

        if self.index < self.last_index() {
            let turning = self.index;
            self.index += 1;
            self.emit(BookEvent::PageTurned {
                from: turning,
                to: self.index,
                direction: CurlDirection::Forward,
            });
            self.render_state(Some((turning, CurlDirection::Forward)));
        } else {
            self.start_reverse();
        }
    }

    /// `ArrowLeft`: turn back one page when the cover is open
    pub fn retreat(&mut self) {
        if !self.is_open() {
            return;
        }
        if self.is_reversing() {
            debug!("Ignoring retreat while reversing");
            return;
        }

        if self.index > 0 {
            self.turn_back();
        }
    }

    /// Recompute every page from the current index, apply an optional
    /// curl to one page, and run the fireworks only on the last page.
    pub fn render_state(&mut self, curl: Option<(usize, CurlDirection)>) {
        let index = self.index;
        for page in &mut self.pages {
            page.project(index);
        }

        if let Some((which, direction)) = curl {
            if let Some(page) = self.pages.get_mut(which) {
                let started_ms = self.timers.now();
                page.curl = Some(Curl { direction, started_ms });
                self.timers.schedule_after(
                    self.timing.curl_ms,
                    BookTask::ClearCurl { page: which, started_ms },
                );
            }
        }

        if index == self.last_index() {
            if self.fireworks.start(&mut self.timers) {
                self.emit(BookEvent::FireworksStarted);
            }
        } else {
            self.stop_fireworks();
        }
    }

    /// Run every timer due by `now_ms`, in due order
    pub fn update(&mut self, now_ms: u64) {
        while let Some(task) = self.timers.pop_due(now_ms) {
            self.run(task);
        }
        self.timers.settle(now_ms);
    }

    /// One frame of spark simulation
    pub fn tick_frame(&mut self) {
        self.fireworks.tick();
    }

    /// Track the viewport size for firework placement
    pub fn resize_surface(&mut self, width: f32, height: f32) {
        self.fireworks.resize(width, height);
    }

    /// Cancel all pending work and stop the fireworks
    pub fn shutdown(&mut self) {
        self.stop_fireworks();
        self.timers.cancel_all();
        self.close_timer = None;
        self.sequence = Sequence::Idle;
        debug!("Book controller shut down");
    }

    fn run(&mut self, task: BookTask) {
        match task {
            BookTask::ClearCurl { page, started_ms } => {
                if let Some(page) = self.pages.get_mut(page) {
                    if page.curl.map_or(false, |curl| curl.started_ms == started_ms) {
                        page.curl = None;
                    }
                }
            }
            BookTask::FinishClosing => {
                self.close_timer = None;
                if self.cover == CoverState::Closing {
                    self.cover = CoverState::Closed;
                    self.emit(BookEvent::CoverClosed);
                }
            }
            BookTask::ReverseStep => self.reverse_step(),
            BookTask::Fireworks(trigger) => self.fireworks.trigger(trigger),
        }
    }

    fn start_reverse(&mut self) {
        if self.is_reversing() {
            return;
        }

        self.sequence = Sequence::Reversing;
        self.emit(BookEvent::ReverseStarted);
        self.timers.schedule_after(self.timing.reverse_step_ms, BookTask::ReverseStep);
    }

    fn reverse_step(&mut self) {
        if !self.is_reversing() {
            return;
        }

        if self.index > 0 {
            self.turn_back();
            self.timers.schedule_after(self.timing.reverse_step_ms, BookTask::ReverseStep);
        } else {
            self.sequence = Sequence::Idle;
            self.render_state(None);
            self.stop_fireworks();
            self.emit(BookEvent::ReverseFinished);
            self.close_cover();
        }
    }

    fn turn_back(&mut self) {
        let from = self.index;
        self.index -= 1;
        self.emit(BookEvent::PageTurned {
            from,
            to: self.index,
            direction: CurlDirection::Back,
        });
        self.render_state(Some((self.index, CurlDirection::Back)));
    }

    fn cancel_close_timer(&mut self) {
        if let Some(id) = self.close_timer.take() {
            self.timers.cancel(id);
        }
    }

    fn stop_fireworks(&mut self) {
        if self.fireworks.stop(&mut self.timers) {
            self.emit(BookEvent::FireworksStopped);
        }
    }

    fn emit(&mut self, event: BookEvent) {
        debug!("Book event: {:?}", event);

        // Remove any dead weak references
        self.observers.retain(|weak| weak.strong_count() > 0);

        for weak in &self.observers {
            if let Some(observer) = weak.upgrade() {
                observer.on_book_event(&event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use rand::SeedableRng;
    use crate::book::PageRole;
    use crate::config::{FireworksConfig, PageContent};

    fn book(pages: usize) -> BookController {
        let config = BookConfig {
            pages: (0..pages).map(|i| PageContent::new(format!("Page {}", i), "")).collect(),
            ..BookConfig::default()
        };
        let mut book = BookController::new(&config, StdRng::seed_from_u64(5)).unwrap();
        book.resize_surface(800.0, 600.0);
        book
    }

    /// Open the cover and turn to `index`
    fn open_at(book: &mut BookController, index: usize) {
        book.advance();
        for _ in 0..index {
            book.advance();
        }
        assert_eq!(book.current_index(), index);
    }

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<BookEvent>>,
    }

    impl BookObserver for Recorder {
        fn on_book_event(&self, event: &BookEvent) {
            self.events.borrow_mut().push(event.clone());
        }
    }

    impl Recorder {
        fn count(&self, event: &BookEvent) -> usize {
            self.events.borrow().iter().filter(|e| *e == event).count()
        }
    }

    #[test]
    fn test_starts_closed_on_first_page() {
        let book = book(5);
        assert_eq!(book.cover(), CoverState::Closed);
        assert_eq!(book.current_index(), 0);
        assert_eq!(book.pages()[0].role, PageRole::Current);
        assert!(!book.fireworks().is_running());
    }

    #[test]
    fn test_first_advance_only_opens() {
        let mut book = book(5);
        let recorder = Rc::new(Recorder::default());
        book.add_observer(recorder.clone());

        book.advance();
        assert!(book.is_open());
        assert_eq!(book.current_index(), 0);

        assert!(!book.open_cover());
        assert!(!book.open_cover());
        assert_eq!(recorder.count(&BookEvent::CoverOpened), 1);
    }

    #[test]
    fn test_advance_turns_and_curls_forward() {
        let mut book = book(5);
        book.advance();

        for n in 0..4 {
            book.advance();
            assert_eq!(book.current_index(), n + 1);
            let curl = book.pages()[n].curl.expect("turned page should curl");
            assert_eq!(curl.direction, CurlDirection::Forward);
            assert_eq!(book.pages()[n].role, PageRole::Left);
        }
    }

    #[test]
    fn test_curl_clears_after_duration() {
        let mut book = book(5);
        book.advance();
        book.update(100);
        book.advance();

        book.update(849);
        assert!(book.pages()[0].curl.is_some());
        book.update(850);
        assert!(book.pages()[0].curl.is_none());
    }

    #[test]
    fn test_stale_curl_timer_leaves_newer_curl() {
        let mut book = book(5);
        book.advance();
        book.advance(); // page 0 curls forward at t=0

        book.update(500);
        book.retreat(); // page 0 curls back at t=500
        book.update(750);

        let curl = book.pages()[0].curl.expect("newer curl should survive");
        assert_eq!(curl.direction, CurlDirection::Back);
        book.update(1250);
        assert!(book.pages()[0].curl.is_none());
    }

    #[test]
    fn test_retreat() {
        let mut book = book(5);

        book.retreat();
        assert_eq!(book.current_index(), 0);
        assert!(!book.is_open());

        open_at(&mut book, 0);
        book.retreat();
        assert_eq!(book.current_index(), 0);

        book.advance();
        book.advance();
        book.retreat();
        assert_eq!(book.current_index(), 1);
        let curl = book.pages()[1].curl.expect("uncovered page should curl");
        assert_eq!(curl.direction, CurlDirection::Back);
    }

    #[test]
    fn test_stack_depth_and_z_index_follow_index() {
        let mut book = book(5);
        open_at(&mut book, 2);

        let depths: Vec<usize> = book.pages().iter().map(|p| p.stack_depth).collect();
        assert_eq!(depths, vec![2, 1, 0, 0, 0]);
        let z: Vec<i32> = book.pages().iter().map(|p| p.z_index).collect();
        assert_eq!(z, vec![198, 199, 200, 199, 198]);
    }

    #[test]
    fn test_last_page_starts_fireworks() {
        let mut book = book(5);
        open_at(&mut book, 3);
        assert!(!book.fireworks().is_running());

        book.advance();
        assert_eq!(book.current_index(), 4);
        assert!(book.fireworks().is_running());

        book.retreat();
        assert!(!book.fireworks().is_running());
        assert!(book.fireworks().sparks().is_empty());
    }

    #[test]
    fn test_fireworks_burst_on_timers() {
        let mut book = book(3);
        open_at(&mut book, 2);
        assert!(book.fireworks().sparks().is_empty());

        book.update(700);
        assert!(!book.fireworks().sparks().is_empty());
    }

    #[test]
    fn test_reverse_and_close_sequence() {
        let mut book = book(5);
        let recorder = Rc::new(Recorder::default());
        book.add_observer(recorder.clone());

        open_at(&mut book, 4);
        assert!(!book.is_reversing());

        book.advance();
        assert!(book.is_reversing());
        assert_eq!(book.current_index(), 4);

        book.update(359);
        assert_eq!(book.current_index(), 4);

        book.update(360);
        assert_eq!(book.current_index(), 3);
        assert!(book.is_reversing());
        assert!(!book.fireworks().is_running());
        assert_eq!(book.pages()[3].curl.map(|c| c.direction), Some(CurlDirection::Back));

        for (t, expected) in [(720, 2), (1080, 1), (1440, 0)] {
            book.update(t);
            assert_eq!(book.current_index(), expected);
            assert!(book.is_reversing());
            assert!(book.is_open());
        }

        book.update(1800);
        assert!(!book.is_reversing());
        assert_eq!(book.cover(), CoverState::Closing);

        book.update(2899);
        assert_eq!(book.cover(), CoverState::Closing);
        book.update(2900);
        assert_eq!(book.cover(), CoverState::Closed);
        assert_eq!(book.current_index(), 0);

        assert_eq!(recorder.count(&BookEvent::ReverseStarted), 1);
        assert_eq!(recorder.count(&BookEvent::ReverseFinished), 1);
        assert_eq!(recorder.count(&BookEvent::CoverClosed), 1);
    }

    #[test]
    fn test_reverse_runs_in_one_long_update() {
        let mut book = book(5);
        open_at(&mut book, 4);
        book.advance();

        book.update(10_000);
        assert_eq!(book.current_index(), 0);
        assert_eq!(book.cover(), CoverState::Closed);
        assert!(!book.is_reversing());
    }

    #[test]
    fn test_reverse_is_not_reentrant_and_ignores_input() {
        let mut book = book(5);
        let recorder = Rc::new(Recorder::default());
        book.add_observer(recorder.clone());

        open_at(&mut book, 4);
        book.advance();
        book.update(360);
        assert_eq!(book.current_index(), 3);

        book.advance();
        book.retreat();
        assert_eq!(book.current_index(), 3);

        book.update(720);
        assert_eq!(book.current_index(), 2);
        assert_eq!(recorder.count(&BookEvent::ReverseStarted), 1);
    }

    #[test]
    fn test_six_advances_on_five_pages() {
        let mut book = book(5);

        book.advance();
        assert!(book.is_open());
        assert_eq!(book.current_index(), 0);

        for _ in 0..4 {
            book.advance();
        }
        assert_eq!(book.current_index(), 4);
        assert!(book.fireworks().is_running());

        book.advance();
        assert!(book.is_reversing());

        book.update(5_000);
        assert_eq!(book.current_index(), 0);
        assert_eq!(book.cover(), CoverState::Closed);
        assert!(!book.fireworks().is_running());
    }

    #[test]
    fn test_reopen_while_closing_stays_open() {
        let mut book = book(2);
        open_at(&mut book, 1);
        book.advance();
        book.update(720);
        assert_eq!(book.cover(), CoverState::Closing);

        book.advance();
        assert!(book.is_open());

        book.update(5_000);
        assert_eq!(book.cover(), CoverState::Open);
    }

    #[test]
    fn test_reclose_gets_full_close_delay() {
        let mut book = book(1);
        let recorder = Rc::new(Recorder::default());
        book.add_observer(recorder.clone());

        book.advance();
        book.advance();
        book.update(360);
        assert_eq!(book.cover(), CoverState::Closing);

        book.update(400);
        book.advance();
        assert!(book.is_open());
        book.advance();
        book.update(770);
        assert_eq!(book.cover(), CoverState::Closing);

        // The first close would have finished at 1460
        book.update(1460);
        assert_eq!(book.cover(), CoverState::Closing);
        assert_eq!(recorder.count(&BookEvent::CoverClosed), 0);

        book.update(1859);
        assert_eq!(book.cover(), CoverState::Closing);
        book.update(1860);
        assert_eq!(book.cover(), CoverState::Closed);
        assert_eq!(recorder.count(&BookEvent::CoverClosed), 1);
    }

    #[test]
    fn test_stalled_update_bounds_sparks() {
        let mut book = book(5);
        open_at(&mut book, 4);

        book.update(700);
        let one_tick = book.fireworks().sparks().len();
        assert!(one_tick > 0);

        book.update(700 + 600_000);
        let config = FireworksConfig::default();
        let per_trigger = config.big_amount.max(config.small_amount) * config.spark_count[1];
        assert!(book.fireworks().sparks().len() <= one_tick + 2 * per_trigger);
    }

    #[test]
    fn test_close_when_closed_is_noop() {
        let mut book = book(3);
        book.close_cover();
        assert_eq!(book.cover(), CoverState::Closed);
        book.update(2_000);
        assert_eq!(book.cover(), CoverState::Closed);
    }

    #[test]
    fn test_single_page_book() {
        let mut book = book(1);
        assert!(book.fireworks().is_running());

        book.advance();
        book.advance();
        assert!(book.is_reversing());

        book.update(360);
        assert!(!book.is_reversing());
        assert!(!book.fireworks().is_running());
        assert_eq!(book.cover(), CoverState::Closing);
    }

    #[test]
    fn test_dropped_observer_is_pruned() {
        let mut book = book(3);
        let recorder = Rc::new(Recorder::default());
        book.add_observer(recorder.clone());
        drop(recorder);

        book.advance();
        assert!(book.is_open());
    }

    #[test]
    fn test_shutdown_cancels_everything() {
        let mut book = book(3);
        open_at(&mut book, 2);
        book.advance();
        assert!(book.is_reversing());

        book.shutdown();
        assert!(!book.is_reversing());
        assert!(!book.fireworks().is_running());

        book.update(10_000);
        assert_eq!(book.current_index(), 2);
    }

    #[test]
    fn test_empty_book_rejected() {
        let config = BookConfig {
            pages: Vec::new(),
            ..BookConfig::default()
        };
        assert!(BookController::new(&config, StdRng::seed_from_u64(1)).is_err());
    }
}
