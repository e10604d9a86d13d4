//! Main application entry point

use std::rc::Rc;
use anyhow::{Context as _, Result};
use eframe::egui::{self, Context, LayerId, Order};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use book_core::{BookConfig, BookController, RenderLoop, StarField};
use book_ui::{BookInput, BookView, Theme};

mod music;

use music::MusicPlayer;

/// Main application state
struct StorybookApp {
    /// Page, cover and fireworks state
    book: BookController,

    /// Cover title and page text
    config: BookConfig,

    /// Background stars, generated once
    stars: StarField,

    /// Spread painter
    book_view: BookView,

    /// Kept alive here; the controller only holds a weak reference
    _music: Rc<MusicPlayer>,

    /// Fixed-step clock for the spark simulation
    render_loop: RenderLoop,

    /// Last viewport size handed to the particle engine
    surface_size: egui::Vec2,
}

impl StorybookApp {
    fn new(config: BookConfig) -> Result<Self> {
        let mut rng = StdRng::from_entropy();
        let stars = StarField::generate(&config.stars, &mut rng);
        let mut book = BookController::new(&config, StdRng::from_rng(&mut rng)?)?;

        let music = Rc::new(MusicPlayer::new(config.music.clone()));
        book.add_observer(music.clone());

        info!("Book ready: {} pages, {} stars", book.page_count(), stars.star_count());

        Ok(Self {
            book,
            config,
            stars,
            book_view: BookView::new(),
            _music: music,
            render_loop: RenderLoop::new(),
            surface_size: egui::Vec2::ZERO,
        })
    }

    /// Keep the fireworks surface matched to the window
    fn track_viewport(&mut self, ctx: &Context) {
        let size = ctx.screen_rect().size();
        if size != self.surface_size {
            debug!("Viewport resized to {:?}", size);
            self.surface_size = size;
            self.book.resize_surface(size.x, size.y);
        }
    }

    /// Route this frame's input to the book
    fn handle_input(&mut self, ctx: &Context) {
        let gestures = ctx.input(book_ui::gestures);
        for input in book_ui::bind(&gestures) {
            match input {
                BookInput::Advance => self.book.advance(),
                BookInput::Retreat => self.book.retreat(),
            }
        }
    }
}

impl eframe::App for StorybookApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let (time, dt) = ctx.input(|i| (i.time, i.stable_dt));

        self.track_viewport(ctx);
        self.book.update((time * 1000.0) as u64);
        self.handle_input(ctx);

        for _ in 0..self.render_loop.frame(dt) {
            self.book.tick_frame();
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(book_ui::theme::night_color()))
            .show(ctx, |ui| {
                book_ui::paint_stars(ui.painter(), ui.max_rect(), &self.stars, time);
                self.book_view.ui(ui, &self.book, &self.config.title, &self.config.pages);
            });

        let overlay = ctx.layer_painter(LayerId::new(Order::Foreground, egui::Id::new("fireworks")));
        book_ui::paint_fireworks(&overlay, ctx.screen_rect().min.to_vec2(), self.book.fireworks());

        // The frame loop lives as long as the window
        if self.render_loop.is_running() {
            ctx.request_repaint();
        }
    }
}

impl Drop for StorybookApp {
    fn drop(&mut self) {
        self.render_loop.teardown();
        self.book.shutdown();
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let (config, source) = BookConfig::discover().context("Failed to load book config")?;
    match &source {
        Some(path) => info!("Loaded book config from {:?}", path),
        None => info!("Using built-in book config"),
    }

    info!("Starting storybook \"{}\"", config.title);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([640.0, 480.0])
            .with_title(config.title.clone()),
        default_theme: eframe::Theme::Dark,
        persist_window: false,
        ..Default::default()
    };

    let title = config.title.clone();
    let app = StorybookApp::new(config)?;

    // Run the app
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            // Setup custom theme
            book_ui::apply_theme(&cc.egui_ctx, &Theme::default());
            Box::new(app)
        }),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}
