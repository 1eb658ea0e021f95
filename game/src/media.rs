use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use runtime::audio::{AudioSink, NullSink, Transport};

use crate::board::{Cell, CellId, audio_filename};

/// `data-audio` is asymmetric: audio is enabled unless the attribute is
/// exactly `"false"`, so an absent attribute means enabled. Kept exactly
/// as shipped.
pub fn audio_enabled_from_attr(attr: Option<&str>) -> bool {
    attr != Some("false")
}

/// `data-image` has the opposite default: enabled only when exactly
/// `"true"`.
pub fn image_enabled_from_attr(attr: Option<&str>) -> bool {
    attr == Some("true")
}

/// The process-wide audio output. `None` when no device is available;
/// playback then degrades to silent no-op sinks.
pub struct AudioDevice {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl AudioDevice {
    pub fn open_default() -> Option<Self> {
        OutputStream::try_default()
            .ok()
            .map(|(stream, handle)| Self {
                _stream: stream,
                handle,
            })
    }
}

struct RodioSink {
    sink: Sink,
    path: PathBuf,
}

impl RodioSink {
    fn attach(handle: &OutputStreamHandle, path: &Path) -> Option<Self> {
        let sink = Sink::try_new(handle).ok()?;
        let source = Decoder::new(BufReader::new(File::open(path).ok()?)).ok()?;
        sink.append(source);
        sink.pause();
        Some(Self {
            sink,
            path: path.to_path_buf(),
        })
    }

    fn requeue(&mut self) {
        self.sink.stop();
        if let Ok(file) = File::open(&self.path) {
            if let Ok(source) = Decoder::new(BufReader::new(file)) {
                self.sink.append(source);
                self.sink.pause();
            }
        }
    }
}

impl AudioSink for RodioSink {
    fn play(&mut self) {
        if self.sink.empty() {
            self.requeue();
        }
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn seek_start(&mut self) {
        // Sources that cannot seek get their queue rebuilt instead.
        if self.sink.try_seek(Duration::ZERO).is_err() {
            let was_paused = self.sink.is_paused();
            self.requeue();
            if !was_paused {
                self.sink.play();
            }
        }
    }

    fn finished(&self) -> bool {
        self.sink.empty()
    }
}

struct ActiveAudio {
    cell: CellId,
    filename: String,
    transport: Transport,
    sink: Box<dyn AudioSink>,
}

/// Owns the lifecycle of at most one audio attachment, matching the
/// currently open question.
pub struct MediaController {
    device: Option<AudioDevice>,
    base_dir: PathBuf,
    active: Option<ActiveAudio>,
}

impl MediaController {
    pub fn new(device: Option<AudioDevice>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            device,
            base_dir: base_dir.into(),
            active: None,
        }
    }

    /// A controller without a device; every sink is a no-op. Used by
    /// tests and by hosts that only need the state machine.
    pub fn silent() -> Self {
        Self::new(None, ".")
    }

    pub fn attached_cell(&self) -> Option<CellId> {
        self.active.as_ref().map(|a| a.cell)
    }

    pub fn attached_filename(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.filename.as_str())
    }

    /// Attaches the cell's track, first stopping and rewinding whatever
    /// was attached before. Cells without audio leave the controller
    /// empty. Returns the attached filename.
    pub fn attach(&mut self, cell: &Cell) -> Option<&str> {
        self.detach();
        if !cell.audio_enabled {
            return None;
        }
        let filename = audio_filename(cell.id);
        let sink: Box<dyn AudioSink> = match &self.device {
            Some(device) => match RodioSink::attach(&device.handle, &self.base_dir.join(&filename))
            {
                Some(sink) => Box::new(sink),
                // Missing file or undecodable track: stay silent rather
                // than fail the question.
                None => Box::new(NullSink),
            },
            None => Box::new(NullSink),
        };
        self.active = Some(ActiveAudio {
            cell: cell.id,
            filename,
            transport: Transport::new(),
            sink,
        });
        self.attached_filename()
    }

    /// Stops and rewinds the current attachment, leaving nothing playing.
    pub fn detach(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.transport.stop(active.sink.as_mut());
        }
    }

    pub fn toggle(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.transport.toggle(active.sink.as_mut());
        }
    }

    pub fn restart(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.transport.restart(active.sink.as_mut());
        }
    }

    pub fn is_playing(&self) -> bool {
        self.active
            .as_ref()
            .map(|a| a.transport.is_playing())
            .unwrap_or(false)
    }

    pub fn label(&self) -> &'static str {
        self.active
            .as_ref()
            .map(|a| a.transport.label())
            .unwrap_or(runtime::audio::PLAY_LABEL)
    }

    /// Polls for natural end-of-track; the label resets, the position
    /// does not. Returns whether the track just ended.
    pub fn poll_ended(&mut self) -> bool {
        if let Some(active) = self.active.as_mut() {
            if active.transport.is_playing() && active.sink.finished() {
                active.transport.on_ended();
                return true;
            }
        }
        false
    }
}
