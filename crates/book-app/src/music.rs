//! Background music
//!
//! A single shared track, started the first time the cover opens. The
//! attempt happens at most once per session; when it fails (no output
//! device, missing or undecodable file) the book simply stays silent.

use std::cell::{Cell, RefCell};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, Sink, Source};
use thiserror::Error;
use tracing::{debug, info};

use book_core::{BookEvent, BookObserver, MusicConfig};

/// Errors that can occur while starting playback
#[derive(Error, Debug)]
pub enum MusicError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Audio output error: {0}")]
    Stream(#[from] rodio::StreamError),

    #[error("Playback error: {0}")]
    Play(#[from] rodio::PlayError),

    #[error("Decode error: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
}

/// Output stream and sink; the stream must outlive the sink
struct Playback {
    _stream: OutputStream,
    sink: Sink,
}

/// Plays the background track once the book is first opened
pub struct MusicPlayer {
    config: MusicConfig,

    /// Set on the first enable attempt, successful or not
    enabled: Cell<bool>,

    playback: RefCell<Option<Playback>>,
}

impl MusicPlayer {
    pub fn new(config: MusicConfig) -> Self {
        Self {
            config,
            enabled: Cell::new(false),
            playback: RefCell::new(None),
        }
    }

    /// Whether the one enable attempt has been spent
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn is_playing(&self) -> bool {
        self.playback
            .borrow()
            .as_ref()
            .map_or(false, |playback| !playback.sink.empty() && !playback.sink.is_paused())
    }

    /// Start the track from the beginning, once per session
    pub fn enable_once(&self) {
        if self.enabled.replace(true) {
            return;
        }
        let Some(path) = self.config.path.as_deref() else {
            return;
        };

        match self.start(path) {
            Ok(playback) => {
                info!("Playing background music from {:?}", path);
                *self.playback.borrow_mut() = Some(playback);
            }
            Err(e) => {
                debug!("Background music unavailable: {}", e);
            }
        }
    }

    fn start(&self, path: &Path) -> Result<Playback, MusicError> {
        let (stream, handle) = OutputStream::try_default()?;
        let sink = Sink::try_new(&handle)?;
        let source = Decoder::new(BufReader::new(File::open(path)?))?;

        sink.set_volume(self.config.volume);
        if self.config.looped {
            sink.append(source.repeat_infinite());
        } else {
            sink.append(source);
        }

        Ok(Playback { _stream: stream, sink })
    }
}

impl BookObserver for MusicPlayer {
    fn on_book_event(&self, event: &BookEvent) {
        if let BookEvent::CoverOpened = event {
            self.enable_once();
        }
    }
}
