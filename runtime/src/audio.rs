//! Playback transport: the pure state machine behind a play/pause toggle.
//!
//! The transport owns no device; it drives whatever [`AudioSink`] the host
//! attached, and is fully testable against [`NullSink`].

/// Minimal control surface over an attached audio element.
pub trait AudioSink {
    fn play(&mut self);
    fn pause(&mut self);
    fn seek_start(&mut self);
    /// Whether the underlying source has drained (natural end-of-track).
    fn finished(&self) -> bool {
        false
    }
}

/// A sink for hosts without an audio device. Every control is a no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&mut self) {}
    fn pause(&mut self) {}
    fn seek_start(&mut self) {}
}

pub const PLAY_LABEL: &str = "\u{25b6} Play";
pub const PAUSE_LABEL: &str = "\u{275a}\u{275a} Pause";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transport {
    playing: bool,
}

impl Transport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// The toggle control's label reflects what pressing it would do next.
    pub fn label(&self) -> &'static str {
        if self.playing { PAUSE_LABEL } else { PLAY_LABEL }
    }

    pub fn toggle(&mut self, sink: &mut dyn AudioSink) {
        if self.playing {
            sink.pause();
        } else {
            sink.play();
        }
        self.playing = !self.playing;
    }

    /// Rewinds to the start and plays.
    pub fn restart(&mut self, sink: &mut dyn AudioSink) {
        sink.seek_start();
        sink.play();
        self.playing = true;
    }

    /// Natural end-of-track: the label resets, the position does not.
    pub fn on_ended(&mut self) {
        self.playing = false;
    }

    /// Detach path: stop and rewind so the next attachment starts clean.
    pub fn stop(&mut self, sink: &mut dyn AudioSink) {
        sink.pause();
        sink.seek_start();
        self.playing = false;
    }
}
