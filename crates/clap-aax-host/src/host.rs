//! `clap_host` handed to plugin instances.
//!
//! The host struct lives in a box so its address is stable; `host_data`
//! points back at the box so the C callbacks can reach the
//! [`HostCallbacks`] implementation.

use crate::instance::HostCallbacks;
use clap_sys::ext::gui::{clap_host_gui, CLAP_EXT_GUI};
use clap_sys::ext::latency::{clap_host_latency, CLAP_EXT_LATENCY};
use clap_sys::ext::params::{
    clap_host_params, clap_param_clear_flags, clap_param_rescan_flags, CLAP_EXT_PARAMS,
};
use clap_sys::ext::state::{clap_host_state, CLAP_EXT_STATE};
use clap_sys::host::clap_host;
use clap_sys::id::clap_id;
use clap_sys::version::CLAP_VERSION;
use std::ffi::{c_char, c_void, CStr, CString};
use std::ptr;
use std::sync::Arc;

pub(crate) struct HostShim {
    clap_host: clap_host,
    callbacks: Arc<dyn HostCallbacks>,
    _name: CString,
}

impl HostShim {
    pub(crate) fn new(callbacks: Arc<dyn HostCallbacks>) -> Box<Self> {
        let name = CString::new(callbacks.host_name())
            .unwrap_or_else(|_| CString::from(c"CLAP host"));

        let mut shim = Box::new(Self {
            clap_host: clap_host {
                clap_version: CLAP_VERSION,
                host_data: ptr::null_mut(),
                name: name.as_ptr(),
                vendor: c"clap-aax-wrapper".as_ptr(),
                url: c"".as_ptr(),
                version: c"0.0.1".as_ptr(),
                get_extension: Some(host_get_extension),
                request_restart: Some(host_request_restart),
                request_process: Some(host_request_process),
                request_callback: Some(host_request_callback),
            },
            callbacks,
            _name: name,
        });
        shim.clap_host.host_data = &*shim as *const Self as *mut c_void;
        shim
    }

    pub(crate) fn as_ptr(&self) -> *const clap_host {
        &self.clap_host
    }

    pub(crate) fn callbacks(&self) -> &dyn HostCallbacks {
        &*self.callbacks
    }
}

unsafe fn callbacks<'a>(host: *const clap_host) -> Option<&'a dyn HostCallbacks> {
    if host.is_null() {
        return None;
    }
    let shim = (*host).host_data as *const HostShim;
    if shim.is_null() {
        None
    } else {
        Some(&*(*shim).callbacks)
    }
}

static HOST_STATE: clap_host_state = clap_host_state {
    mark_dirty: Some(host_state_mark_dirty),
};

static HOST_LATENCY: clap_host_latency = clap_host_latency {
    changed: Some(host_latency_changed),
};

static HOST_PARAMS: clap_host_params = clap_host_params {
    rescan: Some(host_params_rescan),
    clear: Some(host_params_clear),
    request_flush: Some(host_params_request_flush),
};

static HOST_GUI: clap_host_gui = clap_host_gui {
    resize_hints_changed: Some(host_gui_resize_hints_changed),
    request_resize: Some(host_gui_request_resize),
    request_show: Some(host_gui_request_show),
    request_hide: Some(host_gui_request_hide),
    closed: Some(host_gui_closed),
};

unsafe extern "C" fn host_get_extension(
    _host: *const clap_host,
    extension_id: *const c_char,
) -> *const c_void {
    if extension_id.is_null() {
        return ptr::null();
    }
    let id = CStr::from_ptr(extension_id);
    if id == CLAP_EXT_STATE {
        &HOST_STATE as *const clap_host_state as *const c_void
    } else if id == CLAP_EXT_LATENCY {
        &HOST_LATENCY as *const clap_host_latency as *const c_void
    } else if id == CLAP_EXT_PARAMS {
        &HOST_PARAMS as *const clap_host_params as *const c_void
    } else if id == CLAP_EXT_GUI {
        &HOST_GUI as *const clap_host_gui as *const c_void
    } else {
        tracing::trace!(extension = ?id, "plugin asked for unsupported host extension");
        ptr::null()
    }
}

unsafe extern "C" fn host_request_restart(host: *const clap_host) {
    if let Some(cb) = callbacks(host) {
        cb.request_restart();
    }
}

unsafe extern "C" fn host_request_process(host: *const clap_host) {
    if let Some(cb) = callbacks(host) {
        cb.request_process();
    }
}

unsafe extern "C" fn host_request_callback(host: *const clap_host) {
    if let Some(cb) = callbacks(host) {
        cb.request_callback();
    }
}

unsafe extern "C" fn host_state_mark_dirty(host: *const clap_host) {
    if let Some(cb) = callbacks(host) {
        cb.mark_dirty();
    }
}

unsafe extern "C" fn host_latency_changed(host: *const clap_host) {
    if let Some(cb) = callbacks(host) {
        cb.latency_changed();
    }
}

unsafe extern "C" fn host_params_rescan(host: *const clap_host, flags: clap_param_rescan_flags) {
    if let Some(cb) = callbacks(host) {
        cb.params_rescan(flags);
    }
}

unsafe extern "C" fn host_params_clear(
    host: *const clap_host,
    param_id: clap_id,
    flags: clap_param_clear_flags,
) {
    if let Some(cb) = callbacks(host) {
        cb.params_clear(param_id, flags);
    }
}

unsafe extern "C" fn host_params_request_flush(host: *const clap_host) {
    if let Some(cb) = callbacks(host) {
        cb.params_request_flush();
    }
}

unsafe extern "C" fn host_gui_resize_hints_changed(host: *const clap_host) {
    if let Some(cb) = callbacks(host) {
        cb.gui_resize_hints_changed();
    }
}

unsafe extern "C" fn host_gui_request_resize(host: *const clap_host, width: u32, height: u32) -> bool {
    callbacks(host).is_some_and(|cb| cb.gui_request_resize(width, height))
}

unsafe extern "C" fn host_gui_request_show(host: *const clap_host) -> bool {
    callbacks(host).is_some_and(|cb| cb.gui_request_show())
}

unsafe extern "C" fn host_gui_request_hide(host: *const clap_host) -> bool {
    callbacks(host).is_some_and(|cb| cb.gui_request_hide())
}

unsafe extern "C" fn host_gui_closed(host: *const clap_host, was_destroyed: bool) {
    if let Some(cb) = callbacks(host) {
        cb.gui_closed(was_destroyed);
    }
}
