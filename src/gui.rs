//! Editor embedding
//!
//! The CLAP plugin draws its own editor. [`WrappedGui`] only parents it into
//! the native view the host provides and reports its size.

use crate::aax::{
    EffectGui, EffectParameters, NativeResult, ViewContainer, ViewContainerKind,
};
use crate::error::{AaxError, AaxResult};
use crate::wrapper::ClapAsAax;
use clap_aax_host::WindowApi;
use std::sync::Arc;

#[derive(Default)]
pub struct WrappedGui {
    wrapper: Option<Arc<ClapAsAax>>,
    container: Option<Arc<dyn ViewContainer>>,
}

impl WrappedGui {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.container.is_some()
    }

    fn wrapper(&self) -> AaxResult<&Arc<ClapAsAax>> {
        self.wrapper.as_ref().ok_or(AaxError::NotInitialized)
    }

    fn open(&self, wrapper: &ClapAsAax, container: &Arc<dyn ViewContainer>) -> AaxResult<()> {
        let api = match container.kind() {
            ViewContainerKind::Hwnd => WindowApi::Win32,
            ViewContainerKind::NsView => WindowApi::Cocoa,
            ViewContainerKind::Unknown => return Err(AaxError::Unimplemented("view container kind")),
        };
        let parent = container.native_handle();
        if parent.is_null() {
            return Err(AaxError::NullObject("native view"));
        }

        wrapper.with_gui(|gui| {
            if !gui.is_api_supported(api) {
                return Err(AaxError::Unimplemented("window api"));
            }
            gui.create(api)?;
            if let Err(e) = unsafe { gui.set_parent(api, parent) } {
                gui.destroy();
                return Err(e.into());
            }
            gui.set_scale(1.0);
            gui.show();
            Ok(())
        })
    }

    fn close(&mut self) {
        let Some(_container) = self.container.take() else {
            return;
        };
        if let Some(wrapper) = self.wrapper.as_ref() {
            let closed = wrapper.with_gui(|gui| {
                gui.hide();
                gui.destroy();
                Ok(())
            });
            if let Err(e) = closed {
                tracing::debug!("editor already gone: {}", e);
            }
            wrapper.host().detach_view();
        }
    }
}

impl EffectGui for WrappedGui {
    fn initialize(&mut self, parameters: Arc<dyn EffectParameters>) -> NativeResult<()> {
        match parameters.into_any().downcast::<ClapAsAax>() {
            Ok(wrapper) => {
                self.wrapper = Some(wrapper);
                Ok(())
            }
            Err(_) => Err(AaxError::NullObject("effect parameters").result_code()),
        }
    }

    fn create_view_container(&mut self, container: Arc<dyn ViewContainer>) -> NativeResult<()> {
        self.close();
        let wrapper = self.wrapper().map_err(|e| e.result_code())?.clone();

        // attached first so resize requests during create reach the host
        wrapper.host().attach_view(Arc::clone(&container));
        match self.open(&wrapper, &container) {
            Ok(()) => {
                self.container = Some(container);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("cannot open plugin editor: {}", e);
                wrapper.host().detach_view();
                Err(e.result_code())
            }
        }
    }

    fn delete_view_container(&mut self) {
        self.close();
    }

    fn view_size(&self) -> (f32, f32) {
        let size = self
            .wrapper()
            .and_then(|wrapper| wrapper.with_gui(|gui| Ok(gui.size())))
            .ok()
            .flatten();
        let (width, height) = match (size, self.wrapper.as_ref()) {
            (Some(size), _) => size,
            (None, Some(wrapper)) => wrapper.config().default_view_size,
            (None, None) => crate::config::WrapperConfig::default().default_view_size,
        };
        (width as f32, height as f32)
    }
}

impl Drop for WrappedGui {
    fn drop(&mut self) {
        self.close();
    }
}
