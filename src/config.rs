//! Declarative options of a [`Loader`](crate::loader::Loader).
//!
//! Everything in here is plain data and can be described in JSON. The key
//! names of the classic widget loader options (`url`, `property`, `dataType`,
//! `ajaxOptions`, `params`, `loadMask`) are accepted as aliases.
//!
//! ```rust
//! use widget_loader::config::LoaderConfig;
//!
//! let config: LoaderConfig = serde_json::from_str(
//!     r#"{ "url": "data/children.json", "property": "children", "dataType": "json" }"#,
//! )
//! .unwrap();
//! assert_eq!(config.result_property, "children");
//! assert!(!config.auto_load);
//! ```

use serde::{Deserialize, Deserializer, Serialize};

use crate::{error::ConfigError, mask::MaskConfig, params::Params};

/// The request kind used when none is configured.
pub const DEFAULT_REQUEST_KIND: &str = "text";
/// The target property written when none is configured.
pub const DEFAULT_RESULT_PROPERTY: &str = "content";

/// What a loader fetches, where it writes it and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoaderConfig {
    /// Where the content is loaded from. Unset (or empty) disables loading.
    #[serde(alias = "url", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// The target attribute receiving the rendered result
    #[serde(alias = "property")]
    pub result_property: String,
    /// Load once, immediately, when the loader is built
    pub auto_load: bool,
    /// Load when an event fires on the target. Ignored when `auto_load` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lazy_load: Option<LazyLoad>,
    /// Busy indicator shown while a request is outstanding
    #[serde(alias = "loadMask")]
    pub mask: MaskConfig,
    /// Expected shape of the response, handed to the transport
    #[serde(alias = "dataType")]
    pub request_kind: String,
    #[serde(alias = "ajaxOptions", deserialize_with = "null_as_default")]
    pub request_options: RequestOptions,
    /// Parameters of the first load
    #[serde(alias = "params", deserialize_with = "null_as_default")]
    pub initial_params: Params,
    /// Parameters re-applied to every load
    #[serde(deserialize_with = "null_as_default")]
    pub append_params: Params,
    /// Hide the mask when a request fails. Off by default: the mask then stays
    /// visible until the next successful load.
    pub hide_mask_on_failure: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            address: None,
            result_property: DEFAULT_RESULT_PROPERTY.to_owned(),
            auto_load: false,
            lazy_load: None,
            mask: MaskConfig::Disabled,
            request_kind: DEFAULT_REQUEST_KIND.to_owned(),
            request_options: RequestOptions::default(),
            initial_params: Params::new(),
            append_params: Params::new(),
            hide_mask_on_failure: false,
        }
    }
}

impl LoaderConfig {
    /// The default loader of a widget: loads `address` into `content` at construction.
    pub fn content(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            auto_load: true,
            ..Default::default()
        }
    }

    /// The configured address, treating an empty string as unset.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref().filter(|address| !address.is_empty())
    }

    /// Rejects empty names the loader could not act on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.result_property.is_empty() {
            return Err(ConfigError::EmptyResultProperty);
        }
        if self.request_kind.is_empty() {
            return Err(ConfigError::EmptyRequestKind);
        }
        if let Some(lazy_load) = &self.lazy_load {
            if lazy_load.trigger_event.is_empty() {
                return Err(ConfigError::EmptyTriggerEvent);
            }
        }
        Ok(())
    }
}

/// Reads an explicit `null` as the default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deferred loading on a target event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LazyLoad {
    #[serde(alias = "event")]
    pub trigger_event: String,
    /// Reload on every firing instead of only the first one
    #[serde(default)]
    pub repeat: bool,
}

impl LazyLoad {
    /// Loads on the first firing only.
    pub fn once(trigger_event: impl Into<String>) -> Self {
        Self {
            trigger_event: trigger_event.into(),
            repeat: false,
        }
    }

    /// Loads on every firing.
    pub fn repeat(trigger_event: impl Into<String>) -> Self {
        Self {
            trigger_event: trigger_event.into(),
            repeat: true,
        }
    }
}

/// HTTP-style request method, read from lower or upper case names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    #[default]
    #[serde(alias = "GET")]
    Get,
    #[serde(alias = "POST")]
    Post,
    #[serde(alias = "PUT")]
    Put,
    #[serde(alias = "PATCH")]
    Patch,
    #[serde(alias = "DELETE")]
    Delete,
    #[serde(alias = "HEAD")]
    Head,
}

impl core::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
        })
    }
}

/// Transport overrides. `address` and `kind`, when set, win over the loader's own.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestOptions {
    pub method: Method,
    /// Whether the transport may answer from a cache
    pub cache: bool,
    #[serde(alias = "url", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(alias = "dataType", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(alias = "timeout", skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Anything else, passed through to the transport untouched
    #[serde(flatten)]
    pub extra: Params,
}
