use std::cell::Cell;

use serde::{Deserialize, Serialize};

use crate::params::Params;

/// A busy indicator displayed over the target while a request is outstanding.
///
/// The loader only drives visibility. Creating and tearing down whatever the
/// indicator draws is left to the implementation.
pub trait Mask {
    fn show(&self);
    fn hide(&self);
}

/// Builds the [`Mask`] of a loader, once, when the loader is constructed.
pub trait MaskFactory {
    fn create(&self, options: MaskOptions) -> Box<dyn Mask>;
}

impl<F> MaskFactory for F
where
    F: Fn(MaskOptions) -> Box<dyn Mask>,
{
    fn create(&self, options: MaskOptions) -> Box<dyn Mask> {
        self(options)
    }
}

/// Construction options of a [`Mask`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaskOptions {
    /// The rendered element the mask covers. Filled from the target when left unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub el: Option<String>,
    /// Text displayed while loading
    #[serde(alias = "msg", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Implementation specific options, passed through untouched
    #[serde(flatten)]
    pub extra: Params,
}

/// Whether, and how, a loader displays a [`Mask`].
///
/// Serialized as `false`, `true` or an options object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "MaskConfigRepr", into = "MaskConfigRepr")]
pub enum MaskConfig {
    #[default]
    Disabled,
    /// A mask built from [`MaskOptions::default`]
    Default,
    Options(MaskOptions),
}

impl MaskConfig {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, MaskConfig::Disabled)
    }

    /// Options for the mask covering `element`, `None` when disabled.
    ///
    /// An `el` given explicitly in the options wins over `element`.
    pub fn options_for(&self, element: Option<String>) -> Option<MaskOptions> {
        let mut options = match self {
            MaskConfig::Disabled => return None,
            MaskConfig::Default => MaskOptions::default(),
            MaskConfig::Options(options) => options.clone(),
        };
        if options.el.is_none() {
            options.el = element;
        }
        Some(options)
    }
}

impl From<bool> for MaskConfig {
    fn from(enabled: bool) -> Self {
        if enabled {
            MaskConfig::Default
        } else {
            MaskConfig::Disabled
        }
    }
}

impl From<MaskOptions> for MaskConfig {
    fn from(options: MaskOptions) -> Self {
        MaskConfig::Options(options)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum MaskConfigRepr {
    Flag(bool),
    Options(MaskOptions),
    Unset,
}

impl From<MaskConfigRepr> for MaskConfig {
    fn from(repr: MaskConfigRepr) -> Self {
        match repr {
            MaskConfigRepr::Flag(enabled) => enabled.into(),
            MaskConfigRepr::Options(options) => options.into(),
            MaskConfigRepr::Unset => MaskConfig::Disabled,
        }
    }
}

impl From<MaskConfig> for MaskConfigRepr {
    fn from(config: MaskConfig) -> Self {
        match config {
            MaskConfig::Disabled => MaskConfigRepr::Flag(false),
            MaskConfig::Default => MaskConfigRepr::Flag(true),
            MaskConfig::Options(options) => MaskConfigRepr::Options(options),
        }
    }
}

/// A [`Mask`] that only reports its visibility changes through the log.
#[derive(Debug)]
pub struct LogMask {
    options: MaskOptions,
    visible: Cell<bool>,
}

impl LogMask {
    pub fn new(options: MaskOptions) -> Self {
        Self {
            options,
            visible: Cell::new(false),
        }
    }
    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }
}

impl Mask for LogMask {
    fn show(&self) {
        self.visible.set(true);
        log::info!(
            "mask ({}) - {}",
            self.options.el.as_deref().unwrap_or("<detached>"),
            self.options.message.as_deref().unwrap_or("Loading...")
        );
    }
    fn hide(&self) {
        self.visible.set(false);
        log::info!(
            "mask ({}) - hidden",
            self.options.el.as_deref().unwrap_or("<detached>")
        );
    }
}

/// Builds [`LogMask`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMaskFactory;

impl MaskFactory for LogMaskFactory {
    fn create(&self, options: MaskOptions) -> Box<dyn Mask> {
        Box::new(LogMask::new(options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_from_bool_or_options() {
        let disabled: MaskConfig = serde_json::from_value(json!(false)).unwrap();
        let default: MaskConfig = serde_json::from_value(json!(true)).unwrap();
        let options: MaskConfig =
            serde_json::from_value(json!({"msg": "Please wait", "shadow": true})).unwrap();

        assert_eq!(disabled, MaskConfig::Disabled);
        assert_eq!(default, MaskConfig::Default);
        let MaskConfig::Options(options) = options else {
            panic!("expected options, got {options:?}");
        };
        assert_eq!(options.message.as_deref(), Some("Please wait"));
        assert_eq!(options.extra.get("shadow"), Some(&json!(true)));
    }

    #[test]
    fn null_disables_the_mask() {
        let config: MaskConfig = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(config, MaskConfig::Disabled);
    }

    #[test]
    fn serializes_back_to_bool() {
        assert_eq!(
            serde_json::to_value(MaskConfig::Default).unwrap(),
            json!(true)
        );
        assert_eq!(
            serde_json::to_value(MaskConfig::Disabled).unwrap(),
            json!(false)
        );
    }

    #[test]
    fn options_for_binds_target_element() {
        assert_eq!(MaskConfig::Disabled.options_for(Some("#a".into())), None);

        let options = MaskConfig::Default.options_for(Some("#a".into())).unwrap();
        assert_eq!(options.el.as_deref(), Some("#a"));

        let explicit = MaskConfig::Options(MaskOptions {
            el: Some("#b".into()),
            ..Default::default()
        });
        let options = explicit.options_for(Some("#a".into())).unwrap();
        assert_eq!(options.el.as_deref(), Some("#b"));
    }

    #[test]
    fn log_mask_tracks_visibility() {
        let mask = LogMask::new(MaskOptions::default());
        assert!(!mask.is_visible());
        mask.show();
        assert!(mask.is_visible());
        mask.hide();
        assert!(!mask.is_visible());
    }
}
