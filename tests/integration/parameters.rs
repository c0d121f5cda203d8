//! Parameter surface of an initialized instance

use crate::helpers::*;
use approx::assert_relative_eq;
use clap_aax_host::ParamChange;
use clap_aax_wrapper::aax::result::{
    AAX_ERROR_INVALID_PARAMETER_ID, AAX_ERROR_INVALID_STRING_CONVERSION,
};
use clap_aax_wrapper::aax::EffectParameters;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

#[test]
fn test_parameters_are_enumerated_in_order() {
    let fx = fixture();
    let wrapper = &fx.wrapper;

    assert_eq!(wrapper.number_of_parameters(), 3);
    assert_eq!(wrapper.parameter_id_from_index(0).unwrap(), GAIN);
    assert_eq!(wrapper.parameter_id_from_index(2).unwrap(), BYPASS);
    assert_eq!(
        wrapper.parameter_id_from_index(3),
        Err(AAX_ERROR_INVALID_PARAMETER_ID)
    );
    assert_eq!(
        wrapper.parameter_id_from_index(-1),
        Err(AAX_ERROR_INVALID_PARAMETER_ID)
    );
    assert_eq!(wrapper.parameter_index(MODE).unwrap(), 1);
}

#[test]
fn test_names() {
    let fx = fixture();
    let wrapper = &fx.wrapper;

    assert_eq!(wrapper.parameter_name(MODE).unwrap(), "Character/Mode");
    assert_eq!(wrapper.parameter_name(GAIN).unwrap(), "Output Gain");
    assert_eq!(wrapper.parameter_name_of_length(GAIN, 31).unwrap(), "Output Gain");

    assert_eq!(wrapper.parameter_name_of_length(GAIN, 6).unwrap(), "OutGai");
    assert_eq!(wrapper.parameter_name_of_length(GAIN, 4).unwrap(), "OtGn");
    // nothing fits, shortest wins
    assert_eq!(wrapper.parameter_name_of_length(GAIN, 1).unwrap(), "OG");
}

#[test]
fn test_automation_and_steps() {
    let fx = fixture();
    let wrapper = &fx.wrapper;

    assert!(wrapper.parameter_is_automatable(GAIN).unwrap());
    assert!(!wrapper.parameter_is_automatable(BYPASS).unwrap());
    assert_eq!(wrapper.parameter_number_of_steps(GAIN).unwrap(), 0);
    assert_eq!(wrapper.parameter_number_of_steps(MODE).unwrap(), 4);
    assert_eq!(wrapper.parameter_number_of_steps(BYPASS).unwrap(), 2);
}

#[test]
fn test_value_strings() {
    let fx = fixture();
    let wrapper = &fx.wrapper;

    assert_eq!(wrapper.parameter_value_string(GAIN, 0).unwrap(), "1.00 x");
    assert_eq!(wrapper.parameter_value_string(MODE, 0).unwrap(), "Clean");
    assert_eq!(
        wrapper.parameter_string_from_value(GAIN, 0.25, 0).unwrap(),
        "0.50 x"
    );
    assert_eq!(
        wrapper.parameter_string_from_value(GAIN, 0.25, 3).unwrap(),
        "0.5"
    );
    assert_eq!(
        wrapper.parameter_string_from_value(MODE, 2.0 / 3.0, 0).unwrap(),
        "Hot"
    );
    assert_eq!(
        wrapper.parameter_string_from_value(BYPASS, 1.0, 0),
        Err(AAX_ERROR_INVALID_STRING_CONVERSION)
    );
}

#[test]
fn test_values_from_strings() {
    let fx = fixture();
    let wrapper = &fx.wrapper;

    assert_relative_eq!(wrapper.parameter_value_from_string(GAIN, "1.5 x").unwrap(), 0.75);
    assert_relative_eq!(
        wrapper.parameter_value_from_string(MODE, "warm").unwrap(),
        1.0 / 3.0
    );
    assert_eq!(
        wrapper.parameter_value_from_string(GAIN, "loud"),
        Err(AAX_ERROR_INVALID_STRING_CONVERSION)
    );
}

#[test]
fn test_default_values() {
    let fx = fixture();
    let wrapper = &fx.wrapper;

    assert_relative_eq!(wrapper.parameter_default_normalized_value(GAIN).unwrap(), 0.5);
    assert_relative_eq!(wrapper.parameter_default_normalized_value(MODE).unwrap(), 0.0);
    assert_relative_eq!(wrapper.parameter_normalized_value(GAIN).unwrap(), 0.5);
}

#[test]
fn test_unknown_identifier_everywhere() {
    let fx = fixture();
    let wrapper = &fx.wrapper;
    let unknown = "0000beef";

    assert_eq!(wrapper.parameter_index(unknown), Err(AAX_ERROR_INVALID_PARAMETER_ID));
    assert_eq!(wrapper.parameter_name(unknown), Err(AAX_ERROR_INVALID_PARAMETER_ID));
    assert_eq!(
        wrapper.parameter_number_of_steps(unknown),
        Err(AAX_ERROR_INVALID_PARAMETER_ID)
    );
    assert_eq!(
        wrapper.parameter_value_string(unknown, 0),
        Err(AAX_ERROR_INVALID_PARAMETER_ID)
    );
    assert_eq!(
        wrapper.parameter_value_from_string(unknown, "1"),
        Err(AAX_ERROR_INVALID_PARAMETER_ID)
    );
    assert_eq!(
        wrapper.set_parameter_normalized_value(unknown, 0.5),
        Err(AAX_ERROR_INVALID_PARAMETER_ID)
    );
    assert!(fx.recorder.lock().flushed.is_empty());
}

#[test]
fn test_set_value_reaches_the_next_block() {
    let fx = fixture();
    let wrapper = &fx.wrapper;

    wrapper.set_parameter_normalized_value(GAIN, 0.25).unwrap();
    // queued, not yet seen by the plugin
    assert!(fx.recorder.lock().processed.is_empty());
    assert_relative_eq!(wrapper.parameter_normalized_value(GAIN).unwrap(), 0.25);

    let (left, right) = render_stereo(wrapper, &[1.0; 16]);
    assert_eq!(
        fx.recorder.lock().processed,
        vec![ParamChange {
            id: GAIN_ID,
            value: 0.5
        }]
    );
    assert!(left.iter().chain(right.iter()).all(|&s| s == 0.5));
    assert_relative_eq!(wrapper.parameter_normalized_value(GAIN).unwrap(), 0.25);

    // delivered once
    render_stereo(wrapper, &[1.0; 16]);
    assert_eq!(fx.recorder.lock().processed.len(), 1);
}

#[test]
fn test_stepped_values_snap() {
    let fx = fixture();
    let wrapper = &fx.wrapper;

    wrapper.set_parameter_normalized_value(MODE, 0.6).unwrap();
    render_stereo(wrapper, &[0.0; 4]);
    assert_eq!(
        fx.recorder.lock().processed,
        vec![ParamChange {
            id: MODE_ID,
            value: 2.0
        }]
    );
    assert_eq!(wrapper.parameter_value_string(MODE, 0).unwrap(), "Hot");
}

#[test]
fn test_set_value_flushes_when_not_processing() {
    let fx = fixture_with(MockSource::new().inactive(), MockController::new(PLUGIN_ID));
    let wrapper = &fx.wrapper;

    wrapper.set_parameter_normalized_value(GAIN, 1.0).unwrap();
    assert_eq!(
        fx.recorder.lock().flushed,
        vec![ParamChange {
            id: GAIN_ID,
            value: 2.0
        }]
    );
    assert_eq!(wrapper.parameter_value_string(GAIN, 0).unwrap(), "2.00 x");

    // an inactive plugin renders silence
    let (left, _) = render_stereo(wrapper, &[1.0; 8]);
    assert!(left.iter().all(|&s| s == 0.0));
}

#[test]
fn test_repeated_sets_are_coalesced() {
    let fx = fixture();
    let wrapper = &fx.wrapper;

    for normalized in [0.1, 0.2, 0.25] {
        wrapper.set_parameter_normalized_value(GAIN, normalized).unwrap();
    }
    wrapper.set_parameter_normalized_value(MODE, 1.0).unwrap();
    assert_relative_eq!(wrapper.parameter_normalized_value(GAIN).unwrap(), 0.25);

    render_stereo(wrapper, &[0.0; 4]);
    assert_eq!(
        fx.recorder.lock().processed,
        vec![
            ParamChange {
                id: GAIN_ID,
                value: 0.5
            },
            ParamChange {
                id: MODE_ID,
                value: 3.0
            },
        ]
    );
}

#[test]
fn test_parameter_queries_do_not_interrupt_rendering() {
    let fx = fixture();
    let wrapper = &fx.wrapper;
    let done = AtomicBool::new(false);

    let silent = thread::scope(|scope| {
        scope.spawn(|| {
            while !done.load(Ordering::Acquire) {
                wrapper.parameter_value_string(GAIN, 8).unwrap();
                wrapper.parameter_normalized_value(GAIN).unwrap();
                wrapper.parameter_string_from_value(MODE, 1.0, 0).unwrap();
                wrapper.parameter_value_from_string(GAIN, "0.5 x").unwrap();
                wrapper.timer_wakeup().unwrap();
            }
        });

        let silent = (0..5_000)
            .filter(|_| {
                let (left, right) = render_stereo(wrapper, &[1.0; 64]);
                left.iter().chain(right.iter()).any(|&s| s != 1.0)
            })
            .count();
        done.store(true, Ordering::Release);
        silent
    });
    assert_eq!(silent, 0);
}
