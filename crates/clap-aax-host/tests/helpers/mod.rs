//! In-process fake CLAP plugin for binding tests
//!
//! `FAKE_ENTRY` behaves like the `clap_entry` of a small gain plugin with two
//! parameters and a 16 byte state. Variants with an incompatible CLAP version
//! and with an empty factory exercise the failure paths.

#![allow(dead_code)]

use clap_aax_host::ext::{
    clap_plugin_factory_as_aax, clap_plugin_info_as_aax, CLAP_PLUGIN_FACTORY_INFO_AAX,
};
use clap_aax_host::{ClapLibrary, HostCallbacks};
use clap_sys::entry::clap_plugin_entry;
use clap_sys::events::{
    clap_event_header, clap_event_param_gesture, clap_event_param_value, clap_input_events,
    clap_output_events, CLAP_CORE_EVENT_SPACE_ID, CLAP_EVENT_PARAM_GESTURE_BEGIN,
    CLAP_EVENT_PARAM_GESTURE_END, CLAP_EVENT_PARAM_VALUE,
};
use clap_sys::ext::params::{
    clap_param_info, clap_plugin_params, CLAP_EXT_PARAMS, CLAP_PARAM_IS_AUTOMATABLE,
    CLAP_PARAM_IS_STEPPED,
};
use clap_sys::ext::state::{clap_plugin_state, CLAP_EXT_STATE};
use clap_sys::factory::plugin_factory::{clap_plugin_factory, CLAP_PLUGIN_FACTORY_ID};
use clap_sys::host::clap_host;
use clap_sys::plugin::{clap_plugin, clap_plugin_descriptor};
use clap_sys::process::{clap_process, clap_process_status, CLAP_PROCESS_CONTINUE};
use clap_sys::stream::{clap_istream, clap_ostream};
use clap_sys::version::{clap_version, CLAP_VERSION};
use parking_lot::Mutex;
use std::ffi::{c_char, c_void, CStr};
use std::path::Path;
use std::ptr;
use std::sync::Arc;

pub const FAKE_ID: &str = "com.example.fake-gain";
pub const GAIN_ID: u32 = 1;
pub const MODE_ID: u32 = 2;
pub const MODE_NAMES: [&str; 4] = ["Clean", "Warm", "Hot", "Broken"];
pub const STATE_LEN: usize = 16;

struct SyncPtrs<const N: usize>([*const c_char; N]);
unsafe impl<const N: usize> Sync for SyncPtrs<N> {}

struct SyncDescriptor(clap_plugin_descriptor);
unsafe impl Sync for SyncDescriptor {}

struct SyncAaxFactory(clap_plugin_factory_as_aax);
unsafe impl Sync for SyncAaxFactory {}

struct SyncAaxInfo(clap_plugin_info_as_aax);
unsafe impl Sync for SyncAaxInfo {}

static FEATURES: SyncPtrs<4> = SyncPtrs([
    c"audio-effect".as_ptr(),
    c"utility".as_ptr(),
    c"stereo".as_ptr(),
    ptr::null(),
]);

const fn descriptor(version: clap_version) -> clap_plugin_descriptor {
    clap_plugin_descriptor {
        clap_version: version,
        id: c"com.example.fake-gain".as_ptr(),
        name: c"Fake Gain".as_ptr(),
        vendor: c"Example Audio".as_ptr(),
        url: c"https://example.com".as_ptr(),
        manual_url: c"".as_ptr(),
        support_url: c"".as_ptr(),
        version: c"1.2.0".as_ptr(),
        description: c"Gain stage used by the binding tests".as_ptr(),
        features: FEATURES.0.as_ptr(),
    }
}

static DESCRIPTOR: SyncDescriptor = SyncDescriptor(descriptor(CLAP_VERSION));
static OLD_DESCRIPTOR: SyncDescriptor = SyncDescriptor(descriptor(clap_version {
    major: 0,
    minor: 9,
    revision: 0,
}));

// ---------------------------------------------------------------------------
// Plugin instance
// ---------------------------------------------------------------------------

#[repr(C)]
struct FakePlugin {
    clap: clap_plugin,
    host: *const clap_host,
    gain: f64,
    mode: f64,
}

unsafe fn fake<'a>(plugin: *const clap_plugin) -> &'a mut FakePlugin {
    &mut *((*plugin).plugin_data as *mut FakePlugin)
}

unsafe extern "C" fn plugin_init(_plugin: *const clap_plugin) -> bool {
    true
}

unsafe extern "C" fn plugin_destroy(plugin: *const clap_plugin) {
    drop(Box::from_raw((*plugin).plugin_data as *mut FakePlugin));
}

unsafe extern "C" fn plugin_activate(
    _plugin: *const clap_plugin,
    _sample_rate: f64,
    _min_frames: u32,
    _max_frames: u32,
) -> bool {
    true
}

unsafe extern "C" fn plugin_deactivate(_plugin: *const clap_plugin) {}

unsafe extern "C" fn plugin_start_processing(_plugin: *const clap_plugin) -> bool {
    true
}

unsafe extern "C" fn plugin_stop_processing(_plugin: *const clap_plugin) {}

unsafe extern "C" fn plugin_reset(_plugin: *const clap_plugin) {}

unsafe fn apply_events(
    plugin: &mut FakePlugin,
    in_events: *const clap_input_events,
    out_events: *const clap_output_events,
) {
    if in_events.is_null() {
        return;
    }
    let list = &*in_events;
    let (Some(size), Some(get)) = (list.size, list.get) else {
        return;
    };
    for index in 0..size(in_events) {
        let header = get(in_events, index);
        if header.is_null() || (*header).type_ != CLAP_EVENT_PARAM_VALUE {
            continue;
        }
        let event = &*(header as *const clap_event_param_value);
        match event.param_id {
            GAIN_ID => plugin.gain = event.value,
            MODE_ID => plugin.mode = event.value,
            _ => continue,
        }
        echo_edit(out_events, event.param_id, event.value);
    }
}

/// Report an applied change back as a full gesture, like an editor would.
unsafe fn echo_edit(out_events: *const clap_output_events, param_id: u32, value: f64) {
    if out_events.is_null() {
        return;
    }
    let Some(push) = (*out_events).try_push else {
        return;
    };
    let header = |type_, size| clap_event_header {
        size,
        time: 0,
        space_id: CLAP_CORE_EVENT_SPACE_ID,
        type_,
        flags: 0,
    };
    let gesture_size = std::mem::size_of::<clap_event_param_gesture>() as u32;
    let begin = clap_event_param_gesture {
        header: header(CLAP_EVENT_PARAM_GESTURE_BEGIN, gesture_size),
        param_id,
    };
    let change = clap_event_param_value {
        header: header(
            CLAP_EVENT_PARAM_VALUE,
            std::mem::size_of::<clap_event_param_value>() as u32,
        ),
        param_id,
        cookie: ptr::null_mut(),
        note_id: -1,
        port_index: -1,
        channel: -1,
        key: -1,
        value,
    };
    let end = clap_event_param_gesture {
        header: header(CLAP_EVENT_PARAM_GESTURE_END, gesture_size),
        param_id,
    };
    push(out_events, &begin.header);
    push(out_events, &change.header);
    push(out_events, &end.header);
}

unsafe extern "C" fn plugin_process(
    plugin: *const clap_plugin,
    process: *const clap_process,
) -> clap_process_status {
    let this = fake(plugin);
    let process = &*process;
    apply_events(this, process.in_events, ptr::null());

    let frames = process.frames_count as usize;
    if process.audio_inputs_count == 0 || process.audio_outputs_count == 0 {
        return CLAP_PROCESS_CONTINUE;
    }
    let input = &*process.audio_inputs;
    let output = &*process.audio_outputs;
    let channels = input.channel_count.min(output.channel_count) as usize;
    for channel in 0..channels {
        let src = std::slice::from_raw_parts(*input.data32.add(channel), frames);
        let dst = std::slice::from_raw_parts_mut(*output.data32.add(channel), frames);
        for (out, sample) in dst.iter_mut().zip(src) {
            *out = sample * this.gain as f32;
        }
    }
    CLAP_PROCESS_CONTINUE
}

unsafe extern "C" fn plugin_get_extension(
    _plugin: *const clap_plugin,
    id: *const c_char,
) -> *const c_void {
    let id = CStr::from_ptr(id);
    if id == CLAP_EXT_PARAMS {
        &PARAMS as *const clap_plugin_params as *const c_void
    } else if id == CLAP_EXT_STATE {
        &STATE as *const clap_plugin_state as *const c_void
    } else {
        ptr::null()
    }
}

unsafe extern "C" fn plugin_on_main_thread(_plugin: *const clap_plugin) {}

// ---------------------------------------------------------------------------
// Params
// ---------------------------------------------------------------------------

static PARAMS: clap_plugin_params = clap_plugin_params {
    count: Some(params_count),
    get_info: Some(params_get_info),
    get_value: Some(params_get_value),
    value_to_text: Some(params_value_to_text),
    text_to_value: Some(params_text_to_value),
    flush: Some(params_flush),
};

unsafe extern "C" fn params_count(_plugin: *const clap_plugin) -> u32 {
    2
}

fn write_c_string(dst: &mut [c_char], text: &str) {
    let len = text.len().min(dst.len().saturating_sub(1));
    for (slot, byte) in dst.iter_mut().zip(text.as_bytes()[..len].iter()) {
        *slot = *byte as c_char;
    }
    if let Some(terminator) = dst.get_mut(len) {
        *terminator = 0;
    }
}

unsafe extern "C" fn params_get_info(
    _plugin: *const clap_plugin,
    index: u32,
    info: *mut clap_param_info,
) -> bool {
    let info = &mut *info;
    match index {
        0 => {
            info.id = GAIN_ID;
            info.flags = CLAP_PARAM_IS_AUTOMATABLE;
            info.min_value = 0.0;
            info.max_value = 2.0;
            info.default_value = 1.0;
            write_c_string(&mut info.name, "Gain");
            write_c_string(&mut info.module, "");
        }
        1 => {
            info.id = MODE_ID;
            info.flags = CLAP_PARAM_IS_AUTOMATABLE | CLAP_PARAM_IS_STEPPED;
            info.min_value = 0.0;
            info.max_value = 3.0;
            info.default_value = 0.0;
            write_c_string(&mut info.name, "Mode");
            write_c_string(&mut info.module, "Character");
        }
        _ => return false,
    }
    info.cookie = ptr::null_mut();
    true
}

unsafe extern "C" fn params_get_value(plugin: *const clap_plugin, id: u32, value: *mut f64) -> bool {
    let this = fake(plugin);
    match id {
        GAIN_ID => *value = this.gain,
        MODE_ID => *value = this.mode,
        _ => return false,
    }
    true
}

unsafe extern "C" fn params_value_to_text(
    _plugin: *const clap_plugin,
    id: u32,
    value: f64,
    display: *mut c_char,
    size: u32,
) -> bool {
    let text = match id {
        GAIN_ID => format!("{:.2} x", value),
        MODE_ID => match MODE_NAMES.get(value.round() as usize) {
            Some(name) => name.to_string(),
            None => return false,
        },
        _ => return false,
    };
    let dst = std::slice::from_raw_parts_mut(display, size as usize);
    write_c_string(dst, &text);
    true
}

unsafe extern "C" fn params_text_to_value(
    _plugin: *const clap_plugin,
    id: u32,
    display: *const c_char,
    value: *mut f64,
) -> bool {
    let text = CStr::from_ptr(display).to_string_lossy();
    let parsed = match id {
        GAIN_ID => text.trim().trim_end_matches('x').trim().parse::<f64>().ok(),
        MODE_ID => MODE_NAMES.iter().position(|name| *name == text).map(|i| i as f64),
        _ => None,
    };
    match parsed {
        Some(v) => {
            *value = v;
            true
        }
        None => false,
    }
}

unsafe extern "C" fn params_flush(
    plugin: *const clap_plugin,
    in_events: *const clap_input_events,
    out_events: *const clap_output_events,
) {
    apply_events(fake(plugin), in_events, out_events);
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

static STATE: clap_plugin_state = clap_plugin_state {
    save: Some(state_save),
    load: Some(state_load),
};

unsafe extern "C" fn state_save(plugin: *const clap_plugin, stream: *const clap_ostream) -> bool {
    let this = fake(plugin);
    let mut bytes = [0u8; STATE_LEN];
    bytes[..8].copy_from_slice(&this.gain.to_le_bytes());
    bytes[8..].copy_from_slice(&this.mode.to_le_bytes());

    let Some(write) = (*stream).write else {
        return false;
    };
    let mut written = 0;
    while written < STATE_LEN {
        let n = write(
            stream,
            bytes[written..].as_ptr() as *const c_void,
            (STATE_LEN - written) as u64,
        );
        if n <= 0 {
            return false;
        }
        written += n as usize;
    }
    true
}

unsafe extern "C" fn state_load(plugin: *const clap_plugin, stream: *const clap_istream) -> bool {
    let Some(read) = (*stream).read else {
        return false;
    };
    let mut bytes = [0u8; STATE_LEN];
    let mut filled = 0;
    while filled < STATE_LEN {
        let n = read(
            stream,
            bytes[filled..].as_mut_ptr() as *mut c_void,
            (STATE_LEN - filled) as u64,
        );
        if n <= 0 {
            return false;
        }
        filled += n as usize;
    }

    let this = fake(plugin);
    let mut half = [0u8; 8];
    half.copy_from_slice(&bytes[..8]);
    this.gain = f64::from_le_bytes(half);
    half.copy_from_slice(&bytes[8..]);
    this.mode = f64::from_le_bytes(half);
    true
}

// ---------------------------------------------------------------------------
// Factories and entries
// ---------------------------------------------------------------------------

unsafe fn create_fake(
    host: *const clap_host,
    descriptor: &'static SyncDescriptor,
    plugin_id: *const c_char,
) -> *const clap_plugin {
    if CStr::from_ptr(plugin_id).to_bytes() != FAKE_ID.as_bytes() {
        return ptr::null();
    }
    let raw = Box::into_raw(Box::new(FakePlugin {
        clap: clap_plugin {
            desc: &descriptor.0,
            plugin_data: ptr::null_mut(),
            init: Some(plugin_init),
            destroy: Some(plugin_destroy),
            activate: Some(plugin_activate),
            deactivate: Some(plugin_deactivate),
            start_processing: Some(plugin_start_processing),
            stop_processing: Some(plugin_stop_processing),
            reset: Some(plugin_reset),
            process: Some(plugin_process),
            get_extension: Some(plugin_get_extension),
            on_main_thread: Some(plugin_on_main_thread),
        },
        host,
        gain: 1.0,
        mode: 0.0,
    }));
    (*raw).clap.plugin_data = raw as *mut c_void;
    &(*raw).clap
}

unsafe extern "C" fn factory_count_one(_factory: *const clap_plugin_factory) -> u32 {
    1
}

unsafe extern "C" fn factory_count_zero(_factory: *const clap_plugin_factory) -> u32 {
    0
}

unsafe extern "C" fn factory_descriptor(
    _factory: *const clap_plugin_factory,
    index: u32,
) -> *const clap_plugin_descriptor {
    if index == 0 {
        &DESCRIPTOR.0
    } else {
        ptr::null()
    }
}

unsafe extern "C" fn factory_old_descriptor(
    _factory: *const clap_plugin_factory,
    index: u32,
) -> *const clap_plugin_descriptor {
    if index == 0 {
        &OLD_DESCRIPTOR.0
    } else {
        ptr::null()
    }
}

unsafe extern "C" fn factory_create(
    _factory: *const clap_plugin_factory,
    host: *const clap_host,
    plugin_id: *const c_char,
) -> *const clap_plugin {
    create_fake(host, &DESCRIPTOR, plugin_id)
}

static FACTORY: clap_plugin_factory = clap_plugin_factory {
    get_plugin_count: Some(factory_count_one),
    get_plugin_descriptor: Some(factory_descriptor),
    create_plugin: Some(factory_create),
};

static OLD_FACTORY: clap_plugin_factory = clap_plugin_factory {
    get_plugin_count: Some(factory_count_one),
    get_plugin_descriptor: Some(factory_old_descriptor),
    create_plugin: Some(factory_create),
};

static EMPTY_FACTORY: clap_plugin_factory = clap_plugin_factory {
    get_plugin_count: Some(factory_count_zero),
    get_plugin_descriptor: Some(factory_descriptor),
    create_plugin: Some(factory_create),
};

static AAX_INFO: SyncAaxInfo = SyncAaxInfo(clap_plugin_info_as_aax {
    vendor: c"Example Audio GmbH".as_ptr(),
    features: c"audio-effect|compressor".as_ptr(),
});

unsafe extern "C" fn aax_info(
    _factory: *const clap_plugin_factory_as_aax,
    index: u32,
) -> *const clap_plugin_info_as_aax {
    if index == 0 {
        &AAX_INFO.0
    } else {
        ptr::null()
    }
}

static AAX_FACTORY: SyncAaxFactory = SyncAaxFactory(clap_plugin_factory_as_aax {
    package_name: c"Fake Bundle".as_ptr(),
    package_version: 3,
    get_aax_info: Some(aax_info),
    can_apply_configuration: None,
});

unsafe extern "C" fn entry_init(_path: *const c_char) -> bool {
    true
}

unsafe extern "C" fn entry_deinit() {}

unsafe extern "C" fn entry_get_factory(id: *const c_char) -> *const c_void {
    let id = CStr::from_ptr(id);
    if id == CLAP_PLUGIN_FACTORY_ID {
        &FACTORY as *const clap_plugin_factory as *const c_void
    } else if id == CLAP_PLUGIN_FACTORY_INFO_AAX {
        &AAX_FACTORY.0 as *const clap_plugin_factory_as_aax as *const c_void
    } else {
        ptr::null()
    }
}

unsafe extern "C" fn old_entry_get_factory(id: *const c_char) -> *const c_void {
    if CStr::from_ptr(id) == CLAP_PLUGIN_FACTORY_ID {
        &OLD_FACTORY as *const clap_plugin_factory as *const c_void
    } else {
        ptr::null()
    }
}

unsafe extern "C" fn empty_entry_get_factory(id: *const c_char) -> *const c_void {
    if CStr::from_ptr(id) == CLAP_PLUGIN_FACTORY_ID {
        &EMPTY_FACTORY as *const clap_plugin_factory as *const c_void
    } else {
        ptr::null()
    }
}

unsafe extern "C" fn failing_entry_init(_path: *const c_char) -> bool {
    false
}

pub static FAKE_ENTRY: clap_plugin_entry = clap_plugin_entry {
    clap_version: CLAP_VERSION,
    init: Some(entry_init),
    deinit: Some(entry_deinit),
    get_factory: Some(entry_get_factory),
};

pub static OLD_ENTRY: clap_plugin_entry = clap_plugin_entry {
    clap_version: CLAP_VERSION,
    init: Some(entry_init),
    deinit: Some(entry_deinit),
    get_factory: Some(old_entry_get_factory),
};

pub static EMPTY_ENTRY: clap_plugin_entry = clap_plugin_entry {
    clap_version: CLAP_VERSION,
    init: Some(entry_init),
    deinit: Some(entry_deinit),
    get_factory: Some(empty_entry_get_factory),
};

pub static FAILING_ENTRY: clap_plugin_entry = clap_plugin_entry {
    clap_version: CLAP_VERSION,
    init: Some(failing_entry_init),
    deinit: Some(entry_deinit),
    get_factory: Some(entry_get_factory),
};

pub fn bind(entry: &'static clap_plugin_entry) -> clap_aax_host::Result<ClapLibrary> {
    unsafe { ClapLibrary::from_entry(entry, Path::new("/virtual/FakeGain.clap")) }
}

pub fn fake_library() -> Arc<ClapLibrary> {
    Arc::new(bind(&FAKE_ENTRY).expect("fake entry binds"))
}

// ---------------------------------------------------------------------------
// Host callbacks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    Begin(u32),
    Perform(u32, f64),
    End(u32),
}

/// Records automation callbacks in arrival order.
#[derive(Default)]
pub struct RecordingHost {
    pub edits: Mutex<Vec<Edit>>,
}

impl HostCallbacks for RecordingHost {
    fn host_name(&self) -> String {
        "Binding Test Host".to_string()
    }

    fn begin_edit(&self, id: u32) {
        self.edits.lock().push(Edit::Begin(id));
    }

    fn perform_edit(&self, id: u32, value: f64) {
        self.edits.lock().push(Edit::Perform(id, value));
    }

    fn end_edit(&self, id: u32) {
        self.edits.lock().push(Edit::End(id));
    }
}
