/// Sound effects: short procedural chiptune cues played via rodio.
///
/// Every cue is rendered once at start-up into an in-memory WAV buffer;
/// playback appends that buffer to a detached `Sink`, so it never blocks
/// the frame loop.
///
/// Built without the `sound` feature, `SoundEngine` is a silent stub with
/// the same API.

use crate::sim::event::GameEvent;

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    pub(super) const SAMPLE_RATE: u32 = 22050;

    #[derive(Clone, Copy, Debug)]
    pub enum Cue {
        Jump,
        Dash,
        Hazard,
        Clear,
        Win,
    }

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        jump: Arc<Vec<u8>>,
        dash: Arc<Vec<u8>>,
        hazard: Arc<Vec<u8>>,
        clear: Arc<Vec<u8>>,
        win: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        /// `None` if no audio output device is available.
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("audio output unavailable: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                jump: Arc::new(encode_wav(&gen_jump())),
                dash: Arc::new(encode_wav(&gen_dash())),
                hazard: Arc::new(encode_wav(&gen_hazard())),
                clear: Arc::new(encode_wav(&gen_clear())),
                win: Arc::new(encode_wav(&gen_win())),
            })
        }

        pub fn play(&self, cue: Cue) {
            let buf = match cue {
                Cue::Jump => &self.jump,
                Cue::Dash => &self.dash,
                Cue::Hazard => &self.hazard,
                Cue::Clear => &self.clear,
                Cue::Win => &self.win,
            };
            let sink = match Sink::try_new(&self.handle) {
                Ok(s) => s,
                Err(e) => {
                    log::debug!("no sink for {cue:?}: {e}");
                    return;
                }
            };
            if let Ok(src) = rodio::Decoder::new(Cursor::new(buf.as_ref().clone())) {
                sink.append(src);
                sink.detach();
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Generators (mono f32 samples in [-1, 1])
    // ════════════════════════════════════════════════════════════

    /// Square-ish voice whose pitch glides from `f0` to `f1`.
    fn glide(f0: f32, f1: f32, secs: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * secs) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = f0 + (f1 - f0) * t;
                phase = (phase + freq / SAMPLE_RATE as f32).fract();
                let wave = (phase * TAU).sin() * 0.75 + (phase * 3.0 * TAU).sin() * 0.25;
                wave * (1.0 - t) * volume
            })
            .collect()
    }

    fn notes(freqs: &[f32], note_secs: f32, volume: f32) -> Vec<f32> {
        freqs.iter().flat_map(|&f| glide(f, f, note_secs, volume)).collect()
    }

    /// Jump: quick upward chirp.
    fn gen_jump() -> Vec<f32> {
        glide(320.0, 760.0, 0.09, 0.25)
    }

    /// Dash: filtered noise whoosh over a falling tone.
    fn gen_dash() -> Vec<f32> {
        let tone = glide(900.0, 300.0, 0.14, 0.15);
        let n = tone.len();
        let mut rng: u32 = 0x2545_f491;
        let mut smooth = 0.0_f32;
        tone.into_iter()
            .enumerate()
            .map(|(i, s)| {
                rng ^= rng << 13;
                rng ^= rng >> 17;
                rng ^= rng << 5;
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                smooth += (noise - smooth) * 0.35;
                let env = 1.0 - i as f32 / n as f32;
                s + smooth * env * 0.3
            })
            .collect()
    }

    /// Hazard: low descending buzz.
    fn gen_hazard() -> Vec<f32> {
        let mut s = glide(220.0, 80.0, 0.25, 0.3);
        for (i, v) in s.iter_mut().enumerate() {
            if (i / 60) % 2 == 1 {
                *v *= 0.4; // tremolo
            }
        }
        s
    }

    /// Level clear: rising major triad.
    fn gen_clear() -> Vec<f32> {
        notes(&[523.0, 659.0, 784.0], 0.08, 0.25)
    }

    /// Win: triad, octave, held top note.
    fn gen_win() -> Vec<f32> {
        let mut s = notes(&[523.0, 659.0, 784.0, 1047.0], 0.1, 0.28);
        s.extend(glide(1047.0, 1047.0, 0.35, 0.28));
        s
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder (16-bit PCM mono)
    // ════════════════════════════════════════════════════════════

    pub(super) fn encode_wav(samples: &[f32]) -> Vec<u8> {
        const CHANNELS: u16 = 1;
        const BITS: u16 = 16;
        let block_align = CHANNELS * BITS / 8;
        let byte_rate = SAMPLE_RATE * block_align as u32;
        let data_size = samples.len() as u32 * block_align as u32;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&CHANNELS.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&BITS.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Public API
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(feature = "sound")]
use inner::Cue;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
#[derive(Clone, Copy, Debug)]
enum Cue {
    Jump,
    Dash,
    Hazard,
    Clear,
    Win,
}

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    fn play(&self, _cue: Cue) {}
}

/// Which cue, if any, an event should make.
fn cue_for(event: &GameEvent) -> Option<Cue> {
    match event {
        GameEvent::Jumped => Some(Cue::Jump),
        GameEvent::Dashed => Some(Cue::Dash),
        GameEvent::HazardHit => Some(Cue::Hazard),
        GameEvent::LevelCleared { .. } => Some(Cue::Clear),
        GameEvent::GameWon => Some(Cue::Win),
        GameEvent::Landed
        | GameEvent::LevelLoaded { .. }
        | GameEvent::Recovered => None,
    }
}

impl SoundEngine {
    pub fn play_events(&self, events: &[GameEvent]) {
        for cue in events.iter().filter_map(cue_for) {
            self.play(cue);
        }
    }
}
