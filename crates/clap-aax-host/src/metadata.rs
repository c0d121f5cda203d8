//! Plugin, parameter and port metadata read from a CLAP library
//!
//! These are owned copies of the C descriptors, so they stay valid after the
//! strings behind the original pointers go away.

use serde::{Deserialize, Serialize};

/// CLAP ABI version a plugin was built against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiVersion {
    pub major: u32,
    pub minor: u32,
    pub revision: u32,
}

impl AbiVersion {
    pub const fn new(major: u32, minor: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            revision,
        }
    }

    /// CLAP 1.x plugins are compatible with every 1.x host.
    pub fn is_compatible(&self) -> bool {
        clap_sys::version::clap_version_is_compatible(clap_sys::version::clap_version {
            major: self.major,
            minor: self.minor,
            revision: self.revision,
        })
    }
}

impl std::fmt::Display for AbiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.revision)
    }
}

/// Descriptor of one plugin enumerated from a CLAP factory.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Reverse-domain plugin id, e.g. `com.example.gain`
    pub id: String,

    pub name: String,

    pub vendor: String,

    pub version: String,

    pub description: String,

    pub url: String,

    /// CLAP feature tags in declaration order
    pub features: Vec<String>,

    pub clap_version: AbiVersion,
}

impl PluginDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            clap_version: AbiVersion::new(1, 0, 0),
            ..Self::default()
        }
    }

    pub fn vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    pub fn clap_version(mut self, version: AbiVersion) -> Self {
        self.clap_version = version;
        self
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamFlags {
    pub automatable: bool,
    pub stepped: bool,
    pub read_only: bool,
    pub hidden: bool,
    pub is_bypass: bool,
}

impl ParamFlags {
    pub fn from_clap(flags: u32) -> Self {
        use clap_sys::ext::params::{
            CLAP_PARAM_IS_AUTOMATABLE, CLAP_PARAM_IS_BYPASS, CLAP_PARAM_IS_HIDDEN,
            CLAP_PARAM_IS_READONLY, CLAP_PARAM_IS_STEPPED,
        };
        Self {
            automatable: flags & CLAP_PARAM_IS_AUTOMATABLE != 0,
            stepped: flags & CLAP_PARAM_IS_STEPPED != 0,
            read_only: flags & CLAP_PARAM_IS_READONLY != 0,
            hidden: flags & CLAP_PARAM_IS_HIDDEN != 0,
            is_bypass: flags & CLAP_PARAM_IS_BYPASS != 0,
        }
    }
}

/// Parameter metadata.
///
/// `id` is the plugin's `clap_id`; values are in the plugin's plain range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamInfo {
    pub id: u32,
    pub name: String,
    /// Slash-separated module path, empty for top-level parameters
    pub module: String,
    pub min_value: f64,
    pub max_value: f64,
    pub default_value: f64,
    pub flags: ParamFlags,
}

impl ParamInfo {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            module: String::new(),
            min_value: 0.0,
            max_value: 1.0,
            default_value: 0.0,
            flags: ParamFlags {
                automatable: true,
                ..ParamFlags::default()
            },
        }
    }

    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    pub fn range(mut self, min: f64, max: f64, default: f64) -> Self {
        self.min_value = min;
        self.max_value = max;
        self.default_value = default;
        self
    }

    pub fn stepped(mut self, stepped: bool) -> Self {
        self.flags.stepped = stepped;
        self
    }

    pub fn automatable(mut self, automatable: bool) -> Self {
        self.flags.automatable = automatable;
        self
    }

    /// `module/name`, or just `name` at the top level.
    pub fn qualified_name(&self) -> String {
        if self.module.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.module, self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioPortInfo {
    pub id: u32,
    pub name: String,
    pub channel_count: u32,
    pub is_main: bool,
    /// `mono`, `stereo`, or empty when the plugin did not say
    pub port_type: String,
}

/// Package-level information from the optional AAX factory extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: Option<String>,
    pub version: Option<u32>,
}

/// Per-plugin overrides from the optional AAX factory extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AaxPluginInfo {
    pub vendor: Option<String>,
    pub features: Option<Vec<String>>,
}
