//! The process-wide library and the host entry points

use crate::helpers::*;
use clap_aax_wrapper::aax::result::{
    AAX_ERROR_NOT_INITIALIZED, AAX_ERROR_NO_COMPONENTS, AAX_SUCCESS,
};
use clap_aax_wrapper::aax::{AutomationDelegate, EffectParameters};
use clap_aax_wrapper::factory::{self, get_effect_descriptions_with};
use clap_aax_wrapper::{aax_shutdown, aax_startup, create_effect_parameters, WrapperConfig};
use std::sync::Arc;

#[test]
fn test_first_install_wins() {
    let _serial = SERIAL.lock();
    factory::shutdown();

    let first = MockSource::new().shared();
    let second = MockSource::new().descriptors(vec![synth_descriptor()]).shared();
    factory::install(first.clone());
    let bound = factory::install(second);

    assert_eq!(bound.plugins()[0].id, PLUGIN_ID);
    assert_eq!(factory::bound().map(|s| s.plugins().len()), Some(1));

    assert_eq!(aax_shutdown(), AAX_SUCCESS);
    assert!(factory::bound().is_none());
}

#[test]
fn test_descriptions_use_the_bound_library() {
    let _serial = SERIAL.lock();
    factory::shutdown();
    assert_eq!(aax_startup(), AAX_SUCCESS);

    factory::install(
        MockSource::new()
            .descriptors(vec![gain_descriptor(), synth_descriptor()])
            .shared(),
    );
    let mut collection = MockCollection::default();
    let code = get_effect_descriptions_with(&mut collection, &WrapperConfig::default());

    assert_eq!(code, AAX_SUCCESS);
    assert_eq!(collection.effects.len(), 2);
    factory::shutdown();
}

#[test]
fn test_registered_factory_creates_working_instances() {
    let _serial = SERIAL.lock();
    factory::shutdown();

    let source = MockSource::new();
    let recorder = Arc::clone(&source.recorder);
    factory::install(source.shared());

    let mut collection = MockCollection::default();
    get_effect_descriptions_with(&mut collection, &WrapperConfig::default());
    let parameters = collection
        .effect(PLUGIN_ID)
        .creates_parameters()
        .unwrap();

    // the scan inspects each plugin with a throwaway instance
    let scanned = recorder.lock().created;

    let delegate = Arc::new(MockDelegate::default());
    parameters
        .initialize(
            Arc::new(MockController::new(PLUGIN_ID)),
            Some(delegate.clone() as Arc<dyn AutomationDelegate>),
        )
        .unwrap();
    assert_eq!(parameters.number_of_parameters(), 3);
    assert_eq!(recorder.lock().created, scanned + 1);
    assert_eq!(delegate.lines().len(), 3);

    // live instances outlive the shutdown
    factory::shutdown();
    assert_eq!(parameters.parameter_name(GAIN).unwrap(), "Output Gain");
    parameters.uninitialize().unwrap();
}

#[test]
fn test_created_instance_binds_lazily() {
    let _serial = SERIAL.lock();
    factory::shutdown();

    let parameters = create_effect_parameters();
    factory::install(MockSource::new().shared());

    parameters
        .initialize(Arc::new(MockController::new(PLUGIN_ID)), None)
        .unwrap();
    assert_eq!(parameters.number_of_parameters(), 3);
    factory::shutdown();
}

#[test]
fn test_invalid_config_binds_nothing() {
    let _serial = SERIAL.lock();
    factory::shutdown();

    let config = WrapperConfig::default().max_block_size(0);
    let mut collection = MockCollection::default();
    assert_eq!(
        get_effect_descriptions_with(&mut collection, &config),
        AAX_ERROR_NOT_INITIALIZED
    );
    assert!(collection.effects.is_empty());
    assert!(factory::bound().is_none());
}

#[test]
fn test_missing_library_has_no_components() {
    let _serial = SERIAL.lock();
    factory::shutdown();

    let missing = std::env::temp_dir().join("clap-aax-wrapper-no-such-folder");
    let config = WrapperConfig::default()
        .search_paths([missing])
        .binary_name("NoSuchPlugin");
    let mut collection = MockCollection::default();

    assert_eq!(
        get_effect_descriptions_with(&mut collection, &config),
        AAX_ERROR_NO_COMPONENTS
    );
    assert!(factory::bound().is_none());
}
