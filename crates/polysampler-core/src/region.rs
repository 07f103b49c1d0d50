//! Sample regions: immutable, de-interleaved audio plus mapping metadata.

use crate::error::{Error, Result};
use crate::tuning::note_to_hz;

/// Descriptive metadata for one sample, supplied by the loader.
///
/// Loop and playback points are frame indices. Loop points in `0.0..=1.0`
/// are fractions of `end_point` instead. Zero start/end points select the
/// whole buffer, and a zero `loop_end_point` means "unset".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleDescriptor {
    /// Native MIDI note of the recording
    pub note_number: u8,
    /// Detune applied on playback, in cents
    pub note_detune: f32,
    /// Native frequency of the recording (Hz)
    pub note_frequency: f32,
    /// Lowest note of the key range
    pub min_note: u8,
    /// Highest note of the key range
    pub max_note: u8,
    /// Lowest velocity of the layer (negative = unrestricted)
    pub min_velocity: i32,
    /// Highest velocity of the layer (negative = unrestricted)
    pub max_velocity: i32,
    pub is_looping: bool,
    pub loop_start_point: f32,
    pub loop_end_point: f32,
    pub start_point: f32,
    pub end_point: f32,
    /// Per-region gain in dB, forwarded to the voice
    pub gain: f32,
    /// Per-region pan (-1..1), forwarded to the voice
    pub pan: f32,
}

impl Default for SampleDescriptor {
    fn default() -> Self {
        Self {
            note_number: 48,
            note_detune: 0.0,
            note_frequency: note_to_hz(48),
            min_note: 0,
            max_note: 127,
            min_velocity: 0,
            max_velocity: 127,
            is_looping: false,
            loop_start_point: 0.0,
            loop_end_point: 0.0,
            start_point: 0.0,
            end_point: 0.0,
            gain: 0.0,
            pan: 0.0,
        }
    }
}

/// Already-decoded audio handed to [`SampleRepository::load`].
///
/// [`SampleRepository::load`]: crate::SampleRepository::load
#[derive(Debug, Clone, Copy)]
pub struct SampleDataDescriptor<'a> {
    pub descriptor: SampleDescriptor,
    pub sample_rate: f32,
    pub channel_count: u32,
    pub frame_count: usize,
    /// `true` for LRLR... layout, `false` for all-left-then-all-right
    pub is_interleaved: bool,
    pub data: &'a [f32],
}

/// One loaded sample. Never mutated after load.
#[derive(Debug, Clone)]
pub struct SampleRegion {
    note_number: u8,
    note_detune: f32,
    note_frequency: f32,
    min_note: u8,
    max_note: u8,
    min_velocity: i32,
    max_velocity: i32,
    gain: f32,
    pan: f32,

    sample_rate: f32,
    channel_count: usize,
    frame_count: usize,
    /// Planar storage: channel `c` occupies `c * frame_count..(c + 1) * frame_count`
    data: Box<[f32]>,

    start_point: f32,
    end_point: f32,
    is_looping: bool,
    loop_start_point: f32,
    loop_end_point: f32,
}

impl SampleRegion {
    /// Validate a descriptor, de-interleave its data and resolve playback
    /// geometry.
    pub fn from_descriptor(sdd: &SampleDataDescriptor<'_>) -> Result<Self> {
        if sdd.frame_count == 0 {
            return Err(Error::ZeroFrameCount);
        }
        if !(1..=2).contains(&sdd.channel_count) {
            return Err(Error::UnsupportedChannelCount(sdd.channel_count));
        }
        if !sdd.sample_rate.is_finite() || sdd.sample_rate <= 0.0 {
            return Err(Error::InvalidSampleRate(sdd.sample_rate as f64));
        }
        let channels = sdd.channel_count as usize;
        let frames = sdd.frame_count;
        let expected = channels * frames;
        if sdd.data.len() < expected {
            return Err(Error::DataTooShort {
                expected,
                actual: sdd.data.len(),
            });
        }

        let data: Box<[f32]> = if sdd.is_interleaved && channels > 1 {
            let mut planar = vec![0.0; expected];
            for (i, frame) in sdd.data[..expected].chunks_exact(channels).enumerate() {
                for (c, &value) in frame.iter().enumerate() {
                    planar[c * frames + i] = value;
                }
            }
            planar.into_boxed_slice()
        } else {
            sdd.data[..expected].into()
        };

        let desc = &sdd.descriptor;
        let last_frame = (frames - 1) as f32;

        let end_point = if desc.end_point > 0.0 {
            desc.end_point.min(last_frame)
        } else {
            last_frame
        };
        let start_point = if desc.start_point > 0.0 {
            desc.start_point.min(end_point)
        } else {
            0.0
        };

        let loop_end_raw = if desc.loop_end_point == 0.0 {
            last_frame
        } else {
            desc.loop_end_point
        };
        let loop_start_point =
            resolve_loop_point(desc.loop_start_point, end_point).clamp(start_point, end_point);
        let loop_end_point =
            resolve_loop_point(loop_end_raw, end_point).clamp(loop_start_point, end_point);

        Ok(Self {
            note_number: desc.note_number.min(127),
            note_detune: desc.note_detune,
            note_frequency: desc.note_frequency,
            min_note: desc.min_note.min(127),
            max_note: desc.max_note.min(127),
            min_velocity: desc.min_velocity,
            max_velocity: desc.max_velocity,
            gain: desc.gain,
            pan: desc.pan,
            sample_rate: sdd.sample_rate,
            channel_count: channels,
            frame_count: frames,
            data,
            start_point,
            end_point,
            is_looping: desc.is_looping,
            loop_start_point,
            loop_end_point,
        })
    }

    pub fn note_number(&self) -> u8 {
        self.note_number
    }

    /// Playback detune in cents.
    pub fn note_detune(&self) -> f32 {
        self.note_detune
    }

    pub fn note_frequency(&self) -> f32 {
        self.note_frequency
    }

    /// 12-TET pitch of the native note, used by nearest-pitch mapping.
    #[inline]
    pub fn native_pitch_hz(&self) -> f32 {
        note_to_hz(self.note_number)
    }

    /// Key range as 12-TET frequency bounds.
    #[inline]
    pub fn key_range_hz(&self) -> (f32, f32) {
        (note_to_hz(self.min_note), note_to_hz(self.max_note))
    }

    pub fn min_note(&self) -> u8 {
        self.min_note
    }

    pub fn max_note(&self) -> u8 {
        self.max_note
    }

    pub fn min_velocity(&self) -> i32 {
        self.min_velocity
    }

    pub fn max_velocity(&self) -> i32 {
        self.max_velocity
    }

    /// A negative bound on either side lifts the velocity restriction.
    #[inline]
    pub fn has_velocity_restriction(&self) -> bool {
        self.min_velocity >= 0 && self.max_velocity >= 0
    }

    #[inline]
    pub fn accepts_velocity(&self, velocity: u8) -> bool {
        if !self.has_velocity_restriction() {
            return true;
        }
        let v = velocity as i32;
        v >= self.min_velocity && v <= self.max_velocity
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn pan(&self) -> f32 {
        self.pan
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Samples of one channel, or `None` past the last channel.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        if index >= self.channel_count {
            return None;
        }
        let start = index * self.frame_count;
        Some(&self.data[start..start + self.frame_count])
    }

    pub fn start_point(&self) -> f32 {
        self.start_point
    }

    pub fn end_point(&self) -> f32 {
        self.end_point
    }

    pub fn is_looping(&self) -> bool {
        self.is_looping
    }

    pub fn loop_start_point(&self) -> f32 {
        self.loop_start_point
    }

    pub fn loop_end_point(&self) -> f32 {
        self.loop_end_point
    }
}

/// Values above 1.0 are frame indices; `0.0..=1.0` is a fraction of `end_point`.
#[inline]
fn resolve_loop_point(value: f32, end_point: f32) -> f32 {
    if !value.is_finite() {
        0.0
    } else if value > 1.0 {
        value
    } else {
        end_point * value
    }
}
