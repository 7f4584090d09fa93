//! Sound cues emitted by the core
//!
//! Playback lives outside the crate; the host plugs a `SoundSink` in.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sfx {
    /// A piece landed
    Lock,
    Single,
    Double,
    Triple,
    Quad,
    /// A submission was refused (queue full, paused...)
    Rejected,
    GameOver,
}

impl Sfx {
    /// Cue for clearing `lines` rows at once
    pub fn for_lines(lines: usize) -> Option<Sfx> {
        match lines {
            0 => None,
            1 => Some(Sfx::Single),
            2 => Some(Sfx::Double),
            3 => Some(Sfx::Triple),
            _ => Some(Sfx::Quad),
        }
    }

    pub fn filename(&self) -> &'static str {
        match self {
            Sfx::Lock => "lock.wav",
            Sfx::Single => "single.wav",
            Sfx::Double => "double.wav",
            Sfx::Triple => "triple.wav",
            Sfx::Quad => "quad.wav",
            Sfx::Rejected => "select_back.wav",
            Sfx::GameOver => "game_over.wav",
        }
    }
}

/// Sound-trigger service provided by the host
pub trait SoundSink: Send + Sync {
    fn play(&self, sfx: Sfx);
}

/// Sink that drops every cue
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl SoundSink for Silent {
    fn play(&self, _sfx: Sfx) {}
}
