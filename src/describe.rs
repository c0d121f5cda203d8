//! Descriptor synthesis
//!
//! At scan time the host hands over an [`EffectCollection`]; every CLAP
//! plugin of the bound library becomes one effect descriptor with one
//! processing component per supported bus configuration.
//!
//! Synthesis is best effort. Each host call's result is folded into a
//! [`CheckedResult`]: the first failure is what the host gets back, but the
//! remaining steps still run, and one plugin failing never keeps the others
//! from being described.

use crate::aax::result::AAX_SUCCESS;
use crate::aax::{
    CheckedResult, ComponentDescriptor, EffectCollection, EffectDescriptor, MidiNodeType, ProcPtr,
    Property, ResultCode, StemFormat,
};
use crate::error::AaxError;
use crate::factory;
use crate::process::{algorithm_process, field, PrivateData};
use crate::source::{PluginSource, ScanInfo};
use crate::state::ChunkIds;
use clap_aax_core::{four_char_code, four_char_code_to_string, short_names, translate_features};
use clap_aax_host::{AaxPluginInfo, PluginDescriptor};
use parking_lot::{const_mutex, Mutex};
use std::collections::BTreeMap;
use std::mem::size_of;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Package version reported when the library does not say.
pub const DEFAULT_PACKAGE_VERSION: u32 = 1;

const GLOBAL_MIDI_MASK: u32 = 1;
const TRANSPORT_MIDI_MASK: u32 = 0xffff;

/// Remembers which string every issued 4-byte code came from.
pub struct CodeRegistry {
    issued: Mutex<BTreeMap<u32, String>>,
    collisions: AtomicUsize,
}

impl CodeRegistry {
    pub const fn new() -> Self {
        Self {
            issued: const_mutex(BTreeMap::new()),
            collisions: AtomicUsize::new(0),
        }
    }

    /// 4-byte code of `source`, warning when another string already owns it.
    pub fn issue(&self, source: &str) -> u32 {
        let code = four_char_code(source);
        let mut issued = self.issued.lock();
        match issued.get(&code) {
            Some(owner) if owner != source => {
                tracing::warn!(
                    code = %four_char_code_to_string(code),
                    "4-byte code collision between '{}' and '{}'",
                    owner,
                    source
                );
                self.collisions.fetch_add(1, Ordering::Relaxed);
            }
            Some(_) => {}
            None => {
                issued.insert(code, source.to_string());
            }
        }
        code
    }

    pub fn collisions(&self) -> usize {
        self.collisions.load(Ordering::Relaxed)
    }
}

impl Default for CodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide registry behind every id this adapter hands out.
pub static CODES: CodeRegistry = CodeRegistry::new();

/// Plug-in id source string for one bus configuration.
pub fn native_plugin_id(plugin_id: &str, stem: StemFormat) -> String {
    format!("{}-{}", plugin_id, stem.suffix())
}

/// Manufacturer, product and native plug-in ids of one configuration.
pub fn synthesized_ids(vendor: &str, plugin_id: &str, stem: StemFormat) -> ChunkIds {
    ChunkIds {
        manufacturer: CODES.issue(vendor),
        product: CODES.issue(plugin_id),
        plugin: CODES.issue(&native_plugin_id(plugin_id, stem)),
    }
}

/// Bus configurations announced by the channel feature tags.
///
/// `mono` adds mono and `stereo` adds stereo. Without either tag the main
/// output port decides: one channel is mono, anything else stereo.
pub fn bus_configurations<S: AsRef<str>>(
    features: &[S],
    main_channels: Option<u32>,
) -> Vec<StemFormat> {
    let has = |tag: &str| features.iter().any(|f| f.as_ref() == tag);
    let (mono, stereo) = match (has("mono"), has("stereo")) {
        (false, false) => {
            let mono = main_channels == Some(1);
            (mono, !mono)
        }
        tagged => tagged,
    };
    let mut configurations = Vec::with_capacity(2);
    if mono {
        configurations.push(StemFormat::Mono);
    }
    if stereo {
        configurations.push(StemFormat::Stereo);
    }
    configurations
}

/// Channel mask with the low `channels` bits set, 1 to 16 channels.
pub fn midi_channel_mask(channels: u32) -> u32 {
    (1u32 << channels.clamp(1, 16)) - 1
}

/// Describe one processing component for `stem`.
pub fn describe_component(
    component: &mut dyn ComponentDescriptor,
    vendor: &str,
    plugin_id: &str,
    stem: StemFormat,
    midi_channels: u32,
) -> ResultCode {
    let mut result = CheckedResult::new();

    result.check(component.clear());
    result.check(component.add_audio_in(field::AUDIO_INPUTS));
    result.check(component.add_audio_out(field::AUDIO_OUTPUTS));
    result.check(component.add_audio_buffer_length(field::NUM_SAMPLES));
    result.check(component.add_clock(field::CLOCK));
    // meters are not wired up; the slot still has to be filled
    result.check(component.add_private_data(field::METERS, size_of::<f32>() as u32));

    result.check(component.add_midi_node(
        field::GLOBAL_NODE,
        MidiNodeType::Global,
        "MIDI Global",
        GLOBAL_MIDI_MASK,
    ));
    result.check(component.add_midi_node(
        field::INPUT_NODE,
        MidiNodeType::LocalInput,
        "MIDI IN",
        midi_channel_mask(midi_channels),
    ));
    result.check(component.add_midi_node(
        field::TRANSPORT_NODE,
        MidiNodeType::Transport,
        "Transport",
        TRANSPORT_MIDI_MASK,
    ));

    result.check(
        component.add_private_data(field::PRIVATE_DATA, size_of::<PrivateData>() as u32),
    );
    result.check(component.add_data_in_port(field::CURRENT_STATE_NUM, size_of::<u64>() as u32));

    let Some(mut properties) = component.new_property_map() else {
        result.fail(&AaxError::NullObject("property map"));
        return result.code();
    };
    let ids = synthesized_ids(vendor, plugin_id, stem);
    result.check(properties.add_property(Property::ManufacturerId, ids.manufacturer as i32));
    result.check(properties.add_property(Property::ProductId, ids.product as i32));
    result.check(properties.add_property(Property::CanBypass, 1));
    result.check(properties.add_property(Property::UsesClientGui, 1));
    result.check(properties.add_property(Property::InputStemFormat, stem.code()));
    result.check(properties.add_property(Property::OutputStemFormat, stem.code()));
    result.check(properties.add_property(Property::PlugInIdNative, ids.plugin as i32));

    result.check(component.add_process_proc_native(algorithm_process, properties));
    result.code()
}

/// Describe one CLAP plugin as an AAX effect.
pub fn describe_effect(
    effect: &mut dyn EffectDescriptor,
    plugin: &PluginDescriptor,
    overrides: &AaxPluginInfo,
    scan: ScanInfo,
) -> ResultCode {
    let mut result = CheckedResult::new();
    let vendor = overrides.vendor.as_deref().unwrap_or(&plugin.vendor);
    let features: &[String] = overrides.features.as_deref().unwrap_or(&plugin.features);

    for name in short_names(&plugin.name) {
        result.check(effect.add_name(&name));
    }
    result.check(effect.add_category(translate_features(features)));

    for stem in bus_configurations(features, scan.main_channels) {
        let Some(mut component) = effect.new_component_descriptor() else {
            result.fail(&AaxError::NullObject("component descriptor"));
            continue;
        };
        result.check(describe_component(
            component.as_mut(),
            vendor,
            &plugin.id,
            stem,
            scan.midi_channels,
        ));
        result.check(effect.add_component(component));
    }

    result.check(effect.add_proc_ptr(ProcPtr::CreateEffectParameters(
        factory::create_effect_parameters,
    )));
    result.check(effect.add_proc_ptr(ProcPtr::CreateEffectGui(factory::create_effect_gui)));
    result.code()
}

/// Describe every plugin of `source` into `collection`.
pub fn describe_collection(
    collection: &mut dyn EffectCollection,
    source: Arc<dyn PluginSource>,
) -> ResultCode {
    let plugins = source.plugins().to_vec();
    let Some(first) = plugins.first() else {
        tracing::warn!("bound CLAP library exposes no plugins");
        return AaxError::NoComponents.result_code();
    };

    let mut result = CheckedResult::new();
    for (index, plugin) in plugins.iter().enumerate() {
        let overrides = source.aax_plugin_info(index);
        let scan = Arc::clone(&source).inspect(&plugin.id);
        let Some(mut effect) = collection.new_descriptor() else {
            result.fail(&AaxError::NullObject("effect descriptor"));
            continue;
        };

        let code = describe_effect(effect.as_mut(), plugin, &overrides, scan);
        if code != AAX_SUCCESS {
            tracing::warn!(id = %plugin.id, code, "plugin only partially described");
        }
        result.check(code);
        result.check(collection.add_effect(&plugin.id, effect));
        tracing::debug!(id = %plugin.id, name = %plugin.name, "described plugin");
    }

    let package = source.package_info();
    let manufacturer = source
        .aax_plugin_info(0)
        .vendor
        .unwrap_or_else(|| first.vendor.clone());
    result.check(collection.set_manufacturer_name(&manufacturer));
    result.check(collection.add_package_name(package.name.as_deref().unwrap_or(&first.name)));
    result.check(
        collection.set_package_version(package.version.unwrap_or(DEFAULT_PACKAGE_VERSION)),
    );

    tracing::info!(count = plugins.len(), "described CLAP plugins");
    result.code()
}
