//! CLAP feature tags to AAX plug-in categories

/// AAX plug-in category bits (`AAX_ePlugInCategory`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum AaxCategory {
    Eq = 0x0000_0001,
    Dynamics = 0x0000_0002,
    PitchShift = 0x0000_0004,
    Reverb = 0x0000_0008,
    Delay = 0x0000_0010,
    Modulation = 0x0000_0020,
    Harmonic = 0x0000_0040,
    NoiseReduction = 0x0000_0080,
    Dither = 0x0000_0100,
    SoundField = 0x0000_0200,
    HwGenerators = 0x0000_0400,
    SwGenerators = 0x0000_0800,
    WrappedPlugin = 0x0000_1000,
    Effect = 0x0000_2000,
    MidiEffect = 0x0001_0000,
}

impl AaxCategory {
    pub const fn bits(self) -> u32 {
        self as u32
    }
}

/// Every translated mask carries this bit.
pub const BASE_CATEGORY: AaxCategory = AaxCategory::WrappedPlugin;

/// Known CLAP feature tags. Each tag appears once; several tags share a bit.
pub const CATEGORY_TABLE: &[(&str, AaxCategory)] = &[
    // main categories
    ("instrument", AaxCategory::SwGenerators),
    ("audio-effect", AaxCategory::Effect),
    ("note-effect", AaxCategory::MidiEffect),
    ("drum", AaxCategory::MidiEffect),
    ("analyzer", AaxCategory::NoiseReduction),
    // instruments
    ("synthesizer", AaxCategory::SwGenerators),
    ("sampler", AaxCategory::SwGenerators),
    ("drum-machine", AaxCategory::SwGenerators),
    ("granular", AaxCategory::SwGenerators),
    // effects
    ("filter", AaxCategory::Modulation),
    ("phaser", AaxCategory::Modulation),
    ("equalizer", AaxCategory::Eq),
    ("de-esser", AaxCategory::NoiseReduction),
    ("phase-vocoder", AaxCategory::Harmonic),
    ("frequency-shifter", AaxCategory::Dynamics),
    ("pitch-shifter", AaxCategory::PitchShift),
    ("distortion", AaxCategory::Harmonic),
    ("transient-shaper", AaxCategory::Harmonic),
    ("compressor", AaxCategory::Dynamics),
    ("limiter", AaxCategory::Dynamics),
    ("flanger", AaxCategory::Modulation),
    ("chorus", AaxCategory::Modulation),
    ("delay", AaxCategory::Delay),
    ("reverb", AaxCategory::Reverb),
    ("tremolo", AaxCategory::Modulation),
    ("glitch", AaxCategory::Modulation),
    ("utility", AaxCategory::Effect),
    ("pitch-correction", AaxCategory::PitchShift),
    ("restoration", AaxCategory::NoiseReduction),
    ("multi-effects", AaxCategory::Effect),
    ("mixing", AaxCategory::SoundField),
    ("mastering", AaxCategory::SoundField),
    ("external", AaxCategory::HwGenerators),
];

fn lookup(tag: &str) -> Option<AaxCategory> {
    CATEGORY_TABLE
        .iter()
        .find(|(known, _)| *known == tag)
        .map(|(_, category)| *category)
}

/// OR-fold the category bits of every known tag onto the base bit.
///
/// Unknown tags are ignored; the result does not depend on tag order.
pub fn translate_features<I, S>(features: I) -> u32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    features
        .into_iter()
        .fold(BASE_CATEGORY.bits(), |mask, tag| match lookup(tag.as_ref()) {
            Some(category) => {
                tracing::trace!(tag = tag.as_ref(), ?category, "matched plugin category");
                mask | category.bits()
            }
            None => mask,
        })
}
