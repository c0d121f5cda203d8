//! The CLAP host side of an instance
//!
//! [`HostBridge`] is what the plugin sees as its host. Automation gestures
//! are translated to AAX identifiers and normalized values on the spot;
//! anything that needs the main thread only raises a flag that
//! [`ClapAsAax::timer_wakeup`](crate::ClapAsAax) services later.

use crate::aax::result::AAX_SUCCESS;
use crate::aax::{AutomationDelegate, ResultCode, ViewContainer};
use crate::config::DEFAULT_HOST_NAME;
use crate::parameter::{ParameterBinding, ParameterTable};
use arc_swap::ArcSwapOption;
use clap_aax_host::HostCallbacks;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

pub struct HostBridge {
    host_name: RwLock<String>,
    parameters: ArcSwapOption<ParameterTable>,
    automation: RwLock<Option<Arc<dyn AutomationDelegate>>>,
    view: Mutex<Option<Arc<dyn ViewContainer>>>,
    latency_changed: AtomicBool,
    restart_requested: AtomicBool,
    callback_requested: AtomicBool,
    rescan_requested: AtomicBool,
    flush_requested: AtomicBool,
    state_revision: AtomicU64,
}

impl Default for HostBridge {
    fn default() -> Self {
        Self {
            host_name: RwLock::new(DEFAULT_HOST_NAME.to_string()),
            parameters: ArcSwapOption::empty(),
            automation: RwLock::new(None),
            view: Mutex::new(None),
            latency_changed: AtomicBool::new(false),
            restart_requested: AtomicBool::new(false),
            callback_requested: AtomicBool::new(false),
            rescan_requested: AtomicBool::new(false),
            flush_requested: AtomicBool::new(false),
            state_revision: AtomicU64::new(0),
        }
    }
}

impl HostBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_host_name(&self, name: String) {
        *self.host_name.write() = name;
    }

    pub fn parameters(&self) -> Option<Arc<ParameterTable>> {
        self.parameters.load_full()
    }

    /// Replace the published table and re-register it with automation.
    pub fn publish(&self, table: ParameterTable) -> Arc<ParameterTable> {
        let table = Arc::new(table);
        let previous = self.parameters.swap(Some(Arc::clone(&table)));
        if let Some(delegate) = self.automation.read().as_ref() {
            if let Some(previous) = previous {
                unregister(delegate.as_ref(), &previous);
            }
            register(delegate.as_ref(), &table);
        }
        tracing::debug!(count = table.len(), "published parameter table");
        table
    }

    pub fn clear_parameters(&self) {
        let previous = self.parameters.swap(None);
        if let (Some(delegate), Some(previous)) = (self.automation.read().as_ref(), previous) {
            unregister(delegate.as_ref(), &previous);
        }
    }

    /// Attach the host's automation delegate and register every binding.
    pub fn attach_automation(&self, delegate: Arc<dyn AutomationDelegate>) {
        if let Some(table) = self.parameters.load_full() {
            register(delegate.as_ref(), &table);
        }
        *self.automation.write() = Some(delegate);
    }

    pub fn detach_automation(&self) {
        let Some(delegate) = self.automation.write().take() else {
            return;
        };
        if let Some(table) = self.parameters.load_full() {
            unregister(delegate.as_ref(), &table);
        }
    }

    pub fn attach_view(&self, view: Arc<dyn ViewContainer>) {
        *self.view.lock() = Some(view);
    }

    pub fn detach_view(&self) {
        self.view.lock().take();
    }

    pub fn take_latency_changed(&self) -> bool {
        self.latency_changed.swap(false, Ordering::AcqRel)
    }

    pub fn take_restart(&self) -> bool {
        self.restart_requested.swap(false, Ordering::AcqRel)
    }

    pub fn take_callback(&self) -> bool {
        self.callback_requested.swap(false, Ordering::AcqRel)
    }

    pub fn take_rescan(&self) -> bool {
        self.rescan_requested.swap(false, Ordering::AcqRel)
    }

    pub fn take_flush(&self) -> bool {
        self.flush_requested.swap(false, Ordering::AcqRel)
    }

    /// Bumped every time the plugin marks its state dirty.
    pub fn state_revision(&self) -> u64 {
        self.state_revision.load(Ordering::Acquire)
    }

    fn post<F>(&self, clap_id: u32, what: &str, post: F)
    where
        F: FnOnce(&dyn AutomationDelegate, &ParameterBinding) -> ResultCode,
    {
        let Some(table) = self.parameters.load_full() else {
            return;
        };
        let Some(binding) = table.by_clap_id(clap_id) else {
            tracing::trace!(clap_id, "{} for unbound parameter", what);
            return;
        };
        let automation = self.automation.read();
        let Some(delegate) = automation.as_ref() else {
            return;
        };
        let code = post(delegate.as_ref(), binding);
        if code != AAX_SUCCESS {
            tracing::warn!(id = %binding.identifier(), code, "{} refused by host", what);
        }
    }
}

fn register(delegate: &dyn AutomationDelegate, table: &ParameterTable) {
    for binding in table.iter() {
        let code = delegate.register_parameter(binding.identifier());
        if code != AAX_SUCCESS {
            tracing::warn!(id = %binding.identifier(), code, "parameter registration refused");
        }
    }
}

fn unregister(delegate: &dyn AutomationDelegate, table: &ParameterTable) {
    for binding in table.iter() {
        delegate.unregister_parameter(binding.identifier());
    }
}

impl HostCallbacks for HostBridge {
    fn host_name(&self) -> String {
        self.host_name.read().clone()
    }

    fn request_restart(&self) {
        self.restart_requested.store(true, Ordering::Release);
    }

    fn request_callback(&self) {
        self.callback_requested.store(true, Ordering::Release);
    }

    fn mark_dirty(&self) {
        self.state_revision.fetch_add(1, Ordering::AcqRel);
    }

    fn latency_changed(&self) {
        self.latency_changed.store(true, Ordering::Release);
    }

    fn params_rescan(&self, flags: u32) {
        tracing::debug!(flags, "plugin requested parameter rescan");
        self.rescan_requested.store(true, Ordering::Release);
    }

    fn params_clear(&self, id: u32, flags: u32) {
        tracing::trace!(id, flags, "plugin cleared parameter references");
    }

    fn params_request_flush(&self) {
        self.flush_requested.store(true, Ordering::Release);
    }

    fn begin_edit(&self, id: u32) {
        self.post(id, "touch", |delegate, binding| {
            delegate.post_touch_request(binding.identifier())
        });
    }

    fn perform_edit(&self, id: u32, value: f64) {
        self.post(id, "set value", |delegate, binding| {
            delegate.post_set_value_request(binding.identifier(), binding.to_normalized(value))
        });
    }

    fn end_edit(&self, id: u32) {
        self.post(id, "release", |delegate, binding| {
            delegate.post_release_request(binding.identifier())
        });
    }

    fn gui_request_resize(&self, width: u32, height: u32) -> bool {
        match self.view.lock().as_ref() {
            Some(view) => view.set_view_size(width as f32, height as f32) == AAX_SUCCESS,
            None => false,
        }
    }

    fn gui_closed(&self, was_destroyed: bool) {
        tracing::debug!(was_destroyed, "plugin editor closed");
    }
}
