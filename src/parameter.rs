//! Parameter proxy table
//!
//! One [`ParameterBinding`] per CLAP parameter, keyed by the 8 character
//! identifier AAX sees. The table is built once per instance (and again on a
//! rescan) and never mutated after it is published.

use crate::error::{AaxError, AaxResult};
use clap_aax_core::{fit_name, param_identifier, short_names};
use clap_aax_host::{ParamInfo, PluginParams};
use std::collections::HashMap;

/// A CLAP parameter as AAX sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterBinding {
    info: ParamInfo,
    identifier: String,
    name: String,
    short_names: Vec<String>,
}

impl ParameterBinding {
    pub fn new(info: ParamInfo) -> Self {
        let name = info.qualified_name();
        Self {
            identifier: param_identifier(info.id),
            short_names: short_names(&name),
            name,
            info,
        }
    }

    pub fn info(&self) -> &ParamInfo {
        &self.info
    }

    pub fn clap_id(&self) -> u32 {
        self.info.id
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Module-qualified display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_names(&self) -> &[String] {
        &self.short_names
    }

    pub fn is_automatable(&self) -> bool {
        self.info.flags.automatable
    }

    pub fn is_stepped(&self) -> bool {
        self.info.flags.stepped
    }

    fn span(&self) -> f64 {
        self.info.max_value - self.info.min_value
    }

    /// Discrete positions for stepped parameters, 0 for continuous ones.
    pub fn step_count(&self) -> i32 {
        if self.is_stepped() {
            (self.span().max(0.0).round() + 1.0).min(i32::MAX as f64) as i32
        } else {
            0
        }
    }

    pub fn to_normalized(&self, value: f64) -> f64 {
        let span = self.span();
        if span <= 0.0 {
            return 0.0;
        }
        let offset = value - self.info.min_value;
        let offset = if self.is_stepped() { offset.round() } else { offset };
        (offset / span).clamp(0.0, 1.0)
    }

    pub fn from_normalized(&self, normalized: f64) -> f64 {
        let span = self.span();
        if span <= 0.0 {
            return self.info.min_value;
        }
        let offset = normalized.clamp(0.0, 1.0) * span;
        let offset = if self.is_stepped() { offset.round() } else { offset };
        self.info.min_value + offset
    }

    pub fn default_normalized(&self) -> f64 {
        self.to_normalized(self.info.default_value)
    }

    /// Longest name variant within `max_chars`, else the shortest.
    pub fn name_of_length(&self, max_chars: usize) -> &str {
        fit_name(&self.short_names, max_chars)
    }
}

/// Bindings of one instance, in CLAP enumeration order.
#[derive(Debug, Clone, Default)]
pub struct ParameterTable {
    bindings: Vec<ParameterBinding>,
    index: HashMap<String, usize>,
}

impl ParameterTable {
    pub fn from_infos(infos: impl IntoIterator<Item = ParamInfo>) -> Self {
        let mut table = Self::default();
        for info in infos {
            let binding = ParameterBinding::new(info);
            if let Some(&existing) = table.index.get(binding.identifier()) {
                tracing::warn!(
                    id = binding.clap_id(),
                    "duplicate CLAP parameter id; keeping '{}', dropping '{}'",
                    table.bindings[existing].name(),
                    binding.name()
                );
                continue;
            }
            tracing::trace!(id = %binding.identifier(), name = %binding.name(), "bound parameter");
            table
                .index
                .insert(binding.identifier().to_string(), table.bindings.len());
            table.bindings.push(binding);
        }
        table
    }

    pub fn from_plugin(params: &dyn PluginParams) -> Self {
        Self::from_infos(params.infos())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterBinding> {
        self.bindings.iter()
    }

    pub fn get(&self, identifier: &str) -> AaxResult<&ParameterBinding> {
        self.index
            .get(identifier)
            .map(|&i| &self.bindings[i])
            .ok_or_else(|| AaxError::InvalidParameterId(identifier.to_string()))
    }

    pub fn by_clap_id(&self, id: u32) -> Option<&ParameterBinding> {
        self.get(&param_identifier(id)).ok()
    }

    pub fn at(&self, index: usize) -> Option<&ParameterBinding> {
        self.bindings.get(index)
    }

    pub fn index_of(&self, identifier: &str) -> AaxResult<usize> {
        self.index
            .get(identifier)
            .copied()
            .ok_or_else(|| AaxError::InvalidParameterId(identifier.to_string()))
    }

    /// Render a normalized value through the plugin's own formatter.
    pub fn value_to_string(
        &self,
        params: &dyn PluginParams,
        identifier: &str,
        normalized: f64,
        max_chars: Option<usize>,
    ) -> AaxResult<String> {
        let binding = self.get(identifier)?;
        let value = binding.from_normalized(normalized);
        let text = params
            .value_to_text(binding.clap_id(), value)
            .ok_or_else(|| AaxError::InvalidStringConversion(identifier.to_string()))?;
        Ok(match max_chars {
            Some(max) => text.chars().take(max).collect(),
            None => text,
        })
    }

    /// Parse `text` with the plugin's own parser and normalize the result.
    pub fn string_to_value(
        &self,
        params: &dyn PluginParams,
        identifier: &str,
        text: &str,
    ) -> AaxResult<f64> {
        let binding = self.get(identifier)?;
        params
            .text_to_value(binding.clap_id(), text)
            .map(|value| binding.to_normalized(value))
            .ok_or_else(|| AaxError::InvalidStringConversion(identifier.to_string()))
    }

    /// Current plugin value of `identifier`, normalized.
    pub fn normalized_value(&self, params: &dyn PluginParams, identifier: &str) -> AaxResult<f64> {
        let binding = self.get(identifier)?;
        let value = params
            .value(binding.clap_id())
            .unwrap_or(binding.info().default_value);
        Ok(binding.to_normalized(value))
    }
}
