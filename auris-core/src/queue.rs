//! Lock-free SPSC queue of radar beep events.
//!
//! Uses `ringbuf::HeapRb<RadarBeep>` whose `try_push`/`try_pop` are wait-free
//! and allocation-free, safe on both the command thread and the real-time
//! audio callback. Overflow drops the newest beep; the producer cannot clear
//! the ring, so queue reset is expressed through the generation counter in
//! [`SharedParams::radar_epoch`](crate::params::SharedParams).

use ringbuf::{traits::Split, HeapRb};

pub use ringbuf::traits::{Consumer, Producer};

/// Surface material category carried by a radar beep.
///
/// Selects both the waveform and the base frequency of the beep. The host
/// sends free-form material names; [`Material::from_name`] folds them into
/// these categories, with `"none"` meaning "do not beep at all".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Material {
    Default,
    Grass,
    Concrete,
    Wood,
    Metal,
    Water,
    Man,
    Glass,
}

impl Material {
    /// Fold a host material name into a category.
    ///
    /// Returns `None` for `"none"` — the caller must drop the beep silently.
    /// Unrecognised names fold to [`Material::Default`].
    pub fn from_name(name: &str) -> Option<Self> {
        let folded = name.trim().to_ascii_lowercase();
        Some(match folded.as_str() {
            "none" => return None,
            "grass" | "soil" | "sand" | "dirt" => Material::Grass,
            "concrete" | "asphalt" | "rock" | "stone" => Material::Concrete,
            "wood" | "wood_planks" => Material::Wood,
            "metal" | "metal_plate" => Material::Metal,
            "water" => Material::Water,
            "man" => Material::Man,
            "glass" => Material::Glass,
            _ => Material::Default,
        })
    }

    /// The integer category code used in host-facing logs.
    pub fn code(self) -> i32 {
        match self {
            Material::Default => 0,
            Material::Grass => 1,
            Material::Concrete => 2,
            Material::Wood => 3,
            Material::Metal => 4,
            Material::Water => 5,
            Material::Man => 6,
            Material::Glass => 7,
        }
    }
}

/// One queued radar event, fully resolved at enqueue time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarBeep {
    /// Stereo position in [-1, +1].
    pub pan: f32,
    /// Linear gain in [0, 1], derived from distance on the command side.
    pub volume: f32,
    pub material: Material,
    /// Queue generation this beep belongs to; stale beeps are discarded.
    pub epoch: u32,
}

/// Ring capacity. The host enqueues at most one beep per scanned object per
/// sweep, well under 64 between callback ticks.
pub const BEEP_QUEUE_CAPACITY: usize = 64;

/// Producer half — held by the command thread.
pub type BeepProducer = ringbuf::HeapProd<RadarBeep>;

/// Consumer half — held by the audio callback.
pub type BeepConsumer = ringbuf::HeapCons<RadarBeep>;

/// Create a matched producer/consumer pair for radar beeps.
pub fn create_beep_ring() -> (BeepProducer, BeepConsumer) {
    HeapRb::<RadarBeep>::new(BEEP_QUEUE_CAPACITY).split()
}
