//! Host callbacks: automation, deferred requests and instance lifecycle

use crate::helpers::*;
use clap_aax_wrapper::aax::result::{AAX_ERROR_NOT_INITIALIZED, AAX_ERROR_NO_COMPONENTS};
use clap_aax_wrapper::aax::{AutomationDelegate, EffectParameters};
use clap_aax_wrapper::process::field;
use clap_aax_wrapper::{ClapAsAax, WrapperConfig};
use std::sync::Arc;

#[test]
fn test_parameters_are_registered_on_initialize() {
    let fx = fixture();
    assert_eq!(
        fx.delegate.lines(),
        vec![
            format!("register {}", GAIN),
            format!("register {}", MODE),
            format!("register {}", BYPASS),
        ]
    );
}

#[test]
fn test_plugin_edits_become_host_requests() {
    let fx = fixture();
    fx.delegate.log.lock().clear();

    let host = plugin_host(&fx.recorder);
    host.begin_edit(GAIN_ID);
    host.perform_edit(GAIN_ID, 1.5);
    host.end_edit(GAIN_ID);

    assert_eq!(
        fx.delegate.lines(),
        vec![
            format!("touch {}", GAIN),
            format!("set {} 0.750", GAIN),
            format!("release {}", GAIN),
        ]
    );
}

#[test]
fn test_edits_of_unknown_parameters_are_dropped() {
    let fx = fixture();
    fx.delegate.log.lock().clear();

    let host = plugin_host(&fx.recorder);
    host.begin_edit(99);
    host.perform_edit(99, 0.5);
    host.end_edit(99);
    assert!(fx.delegate.lines().is_empty());
}

#[test]
fn test_host_name() {
    let fx = fixture();
    assert_eq!(plugin_host(&fx.recorder).host_name(), "Pro Tools (CLAP-as-AAX)");

    let mut controller = MockController::new(PLUGIN_ID);
    controller.host_name = None;
    let fx = fixture_with(MockSource::new(), controller);
    assert_eq!(plugin_host(&fx.recorder).host_name(), "CLAP-as-AAX wrapper");
}

#[test]
fn test_initialize_activates_and_reports_latency() {
    let source = MockSource::new();
    source.recorder.lock().latency = 64;
    let fx = fixture_with(source, MockController::new(PLUGIN_ID));

    let config = WrapperConfig::default();
    assert_eq!(
        fx.recorder.lock().activations,
        vec![(TEST_SAMPLE_RATE, config.max_block_size)]
    );
    assert_eq!(*fx.controller.latencies.lock(), vec![64]);
    assert!(fx.wrapper.is_initialized());
    assert_eq!(fx.wrapper.effect_id().as_deref(), Some(PLUGIN_ID));
    assert_eq!(fx.wrapper.channel_counts(), (2, 2));
}

#[test]
fn test_missing_sample_rate_falls_back() {
    let mut controller = MockController::new(PLUGIN_ID);
    controller.sample_rate = None;
    let fx = fixture_with(MockSource::new(), controller);

    let config = WrapperConfig::default();
    assert_eq!(
        fx.recorder.lock().activations,
        vec![(config.fallback_sample_rate, config.max_block_size)]
    );
}

#[test]
fn test_main_thread_callback_runs_on_timer() {
    let fx = fixture();
    plugin_host(&fx.recorder).request_callback();
    assert_eq!(fx.recorder.lock().main_thread_calls, 0);

    fx.wrapper.timer_wakeup().unwrap();
    assert_eq!(fx.recorder.lock().main_thread_calls, 1);

    fx.wrapper.timer_wakeup().unwrap();
    assert_eq!(fx.recorder.lock().main_thread_calls, 1);
}

#[test]
fn test_latency_change_reaches_the_host() {
    let fx = fixture();
    fx.recorder.lock().latency = 128;
    plugin_host(&fx.recorder).latency_changed();

    fx.wrapper.timer_wakeup().unwrap();
    assert_eq!(*fx.controller.latencies.lock(), vec![0, 128]);
}

#[test]
fn test_restart_reactivates() {
    let fx = fixture();
    plugin_host(&fx.recorder).request_restart();
    fx.wrapper.timer_wakeup().unwrap();

    let activations = fx.recorder.lock().activations.clone();
    assert_eq!(activations.len(), 2);
    assert_eq!(activations[0], activations[1]);
    // a restart re-reports latency
    assert_eq!(fx.controller.latencies.lock().len(), 2);
}

#[test]
fn test_dirty_state_is_posted_once() {
    let fx = fixture();
    let host = plugin_host(&fx.recorder);

    fx.wrapper.timer_wakeup().unwrap();
    assert!(fx.controller.packets.lock().is_empty());

    host.mark_dirty();
    host.mark_dirty();
    assert_eq!(fx.wrapper.state_revision(), 2);

    fx.wrapper.timer_wakeup().unwrap();
    fx.wrapper.timer_wakeup().unwrap();
    let packets = fx.controller.packets.lock().clone();
    assert_eq!(packets, vec![(field::CURRENT_STATE_NUM, 2i64.to_le_bytes().to_vec())]);
}

#[test]
fn test_rescan_reregisters_parameters() {
    let fx = fixture();
    fx.delegate.log.lock().clear();

    plugin_host(&fx.recorder).params_rescan(1);
    fx.wrapper.timer_wakeup().unwrap();

    let lines = fx.delegate.lines();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], format!("unregister {}", GAIN));
    assert_eq!(lines[3], format!("register {}", GAIN));
    assert_eq!(fx.wrapper.number_of_parameters(), 3);
}

#[test]
fn test_flush_request_on_inactive_plugin() {
    let fx = fixture_with(MockSource::new().inactive(), MockController::new(PLUGIN_ID));
    plugin_host(&fx.recorder).params_request_flush();
    fx.wrapper.timer_wakeup().unwrap();
    // nothing was queued
    assert!(fx.recorder.lock().flushed.is_empty());
    assert_eq!(fx.wrapper.number_of_parameters(), 3);
}

#[test]
fn test_uninitialize_releases_everything() {
    let fx = fixture();
    fx.delegate.log.lock().clear();

    fx.wrapper.uninitialize().unwrap();
    assert_eq!(
        fx.delegate.lines(),
        vec![
            format!("unregister {}", GAIN),
            format!("unregister {}", MODE),
            format!("unregister {}", BYPASS),
        ]
    );
    assert!(!fx.wrapper.is_initialized());
    assert!(fx.wrapper.parameters().is_none());
    assert_eq!(fx.wrapper.number_of_parameters(), 0);
    assert_eq!(fx.wrapper.channel_counts(), (0, 0));

    // edits after teardown go nowhere
    plugin_host(&fx.recorder).begin_edit(GAIN_ID);
    assert_eq!(fx.delegate.lines().len(), 3);

    // a second uninitialize is harmless
    fx.wrapper.uninitialize().unwrap();
}

#[test]
fn test_unknown_effect_id() {
    let wrapper = ClapAsAax::with_source(WrapperConfig::default(), MockSource::new().shared());
    let controller = Arc::new(MockController::new("com.example.missing"));
    let delegate = Arc::new(MockDelegate::default());

    assert_eq!(
        wrapper.initialize(controller, Some(delegate.clone() as Arc<dyn AutomationDelegate>)),
        Err(AAX_ERROR_NO_COMPONENTS)
    );
    assert!(!wrapper.is_initialized());
    assert!(delegate.lines().is_empty());
}

#[test]
fn test_missing_effect_id() {
    let wrapper = ClapAsAax::with_source(WrapperConfig::default(), MockSource::new().shared());
    let mut controller = MockController::new(PLUGIN_ID);
    controller.effect_id = None;

    assert_eq!(
        wrapper.initialize(Arc::new(controller), None),
        Err(AAX_ERROR_NOT_INITIALIZED)
    );
    assert_eq!(wrapper.number_of_parameters(), 0);
}

#[test]
fn test_reinitialize_replaces_the_plugin() {
    let source = MockSource::new();
    let recorder = Arc::clone(&source.recorder);
    let wrapper = ClapAsAax::with_source(WrapperConfig::default(), source.shared());

    wrapper
        .initialize(Arc::new(MockController::new(PLUGIN_ID)), None)
        .unwrap();
    wrapper
        .initialize(Arc::new(MockController::new(PLUGIN_ID).mono()), None)
        .unwrap();

    assert_eq!(recorder.lock().created, 2);
    assert_eq!(wrapper.channel_counts(), (1, 1));
}
