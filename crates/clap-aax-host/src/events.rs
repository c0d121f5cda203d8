//! Parameter event lists handed to `process` and `params.flush`

use crate::instance::{HostCallbacks, ParamChange};
use clap_sys::events::{
    clap_event_header, clap_event_param_gesture, clap_event_param_value, clap_input_events,
    clap_output_events, CLAP_CORE_EVENT_SPACE_ID, CLAP_EVENT_PARAM_GESTURE_BEGIN,
    CLAP_EVENT_PARAM_GESTURE_END, CLAP_EVENT_PARAM_VALUE,
};
use std::ffi::c_void;
use std::ptr;

/// Parameter value events built from queued changes.
pub(crate) struct InputEventList {
    events: Vec<clap_event_param_value>,
}

impl InputEventList {
    pub(crate) fn new(changes: &[ParamChange]) -> Self {
        let events = changes
            .iter()
            .map(|change| clap_event_param_value {
                header: clap_event_header {
                    size: std::mem::size_of::<clap_event_param_value>() as u32,
                    time: 0,
                    space_id: CLAP_CORE_EVENT_SPACE_ID,
                    type_: CLAP_EVENT_PARAM_VALUE,
                    flags: 0,
                },
                param_id: change.id,
                cookie: ptr::null_mut(),
                note_id: -1,
                port_index: -1,
                channel: -1,
                key: -1,
                value: change.value,
            })
            .collect();
        Self { events }
    }

    /// The returned list borrows `self` through its context pointer.
    pub(crate) fn as_clap(&self) -> clap_input_events {
        clap_input_events {
            ctx: self as *const Self as *mut c_void,
            size: Some(input_events_size),
            get: Some(input_events_get),
        }
    }
}

unsafe extern "C" fn input_events_size(list: *const clap_input_events) -> u32 {
    if list.is_null() {
        return 0;
    }
    let events = &*((*list).ctx as *const InputEventList);
    events.events.len() as u32
}

unsafe extern "C" fn input_events_get(
    list: *const clap_input_events,
    index: u32,
) -> *const clap_event_header {
    if list.is_null() {
        return ptr::null();
    }
    let events = &*((*list).ctx as *const InputEventList);
    match events.events.get(index as usize) {
        Some(event) => &event.header,
        None => ptr::null(),
    }
}

/// Parameter events a plugin pushed during `process` or `flush`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum OutputEvent {
    GestureBegin(u32),
    Value(u32, f64),
    GestureEnd(u32),
}

#[derive(Default)]
pub(crate) struct OutputEventList {
    events: Vec<OutputEvent>,
}

impl OutputEventList {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.events.clear();
    }

    /// The returned list borrows `self` mutably through its context pointer.
    pub(crate) fn as_clap(&mut self) -> clap_output_events {
        clap_output_events {
            ctx: self as *mut Self as *mut c_void,
            try_push: Some(output_events_try_push),
        }
    }

    /// Forward collected events to the host in the order they were pushed.
    pub(crate) fn dispatch(&self, host: &dyn HostCallbacks) {
        for event in &self.events {
            match *event {
                OutputEvent::GestureBegin(id) => host.begin_edit(id),
                OutputEvent::Value(id, value) => host.perform_edit(id, value),
                OutputEvent::GestureEnd(id) => host.end_edit(id),
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn events(&self) -> &[OutputEvent] {
        &self.events
    }
}

unsafe extern "C" fn output_events_try_push(
    list: *const clap_output_events,
    event: *const clap_event_header,
) -> bool {
    if list.is_null() || event.is_null() {
        return false;
    }
    let output = &mut *((*list).ctx as *mut OutputEventList);
    let header = &*event;
    if header.space_id != CLAP_CORE_EVENT_SPACE_ID {
        return false;
    }

    match header.type_ {
        CLAP_EVENT_PARAM_GESTURE_BEGIN => {
            let e = &*(event as *const clap_event_param_gesture);
            output.events.push(OutputEvent::GestureBegin(e.param_id));
            true
        }
        CLAP_EVENT_PARAM_GESTURE_END => {
            let e = &*(event as *const clap_event_param_gesture);
            output.events.push(OutputEvent::GestureEnd(e.param_id));
            true
        }
        CLAP_EVENT_PARAM_VALUE => {
            let e = &*(event as *const clap_event_param_value);
            output.events.push(OutputEvent::Value(e.param_id, e.value));
            true
        }
        _ => false,
    }
}
