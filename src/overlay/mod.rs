use std::str::FromStr;

use thiserror::Error;

use crate::settings::UserId;

mod registry;
mod selector;
#[cfg(test)]
pub(crate) mod testing;

pub use registry::OverlayRegistry;
pub use selector::{CategorySelector, PlatformOutcome, SelectOutcome};

/// Package overlays are enumerated against unless a caller names another.
pub const DEFAULT_TARGET: &str = "android";
/// Literal some callers pass instead of the target package to mean "no overlay".
pub const DEFAULT_PACKAGE_ALIAS: &str = "default";
pub const DEFAULT_LABEL: &str = "Default";

/// Immutable snapshot of one installed overlay, as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayInfo {
    pub package_name: String,
    pub category: String,
    pub target_package: String,
    pub priority: i32,
    pub enabled: bool,
}

impl OverlayInfo {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn in_category(&self, category: Category) -> bool {
        self.category == category.key()
    }
}

/// Overlay categories the helper knows how to select between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Accent,
    Font,
    IconShape,
    SystemIconPack,
    ThemeStyle,
    SignalIcon,
    WifiIcon,
    Navbar,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Accent,
        Category::Font,
        Category::IconShape,
        Category::SystemIconPack,
        Category::ThemeStyle,
        Category::SignalIcon,
        Category::WifiIcon,
        Category::Navbar,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Self::Accent => "android.theme.customization.accent_color",
            Self::Font => "android.theme.customization.font",
            Self::IconShape => "android.theme.customization.adaptive_icon_shape",
            Self::SystemIconPack => "android.theme.customization.icon_pack.android",
            Self::ThemeStyle => "android.theme.customization.theme_style",
            Self::SignalIcon => "android.theme.customization.signal_icon",
            Self::WifiIcon => "android.theme.customization.wifi_icon",
            Self::Navbar => "android.theme.customization.navbar",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown overlay category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.key() == value)
            .ok_or_else(|| UnknownCategory(value.to_string()))
    }
}

/// What a caller asked a category to hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// No overlay; the target's own resources apply.
    Default,
    Overlay(String),
}

impl Selection {
    /// Both the target package itself and the `"default"` alias mean
    /// [`Selection::Default`].
    pub fn resolve(package: &str, target: &str) -> Self {
        if package == target || package == DEFAULT_PACKAGE_ALIAS {
            Self::Default
        } else {
            Self::Overlay(package.to_string())
        }
    }

    pub fn package(&self) -> Option<&str> {
        match self {
            Self::Default => None,
            Self::Overlay(package) => Some(package),
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    /// The overlay service could not be reached or threw.
    #[error("overlay service call {operation} failed: {message}")]
    RemoteFailure {
        operation: &'static str,
        message: String,
    },
}

impl OverlayError {
    pub fn remote(operation: &'static str, message: impl Into<String>) -> Self {
        Self::RemoteFailure {
            operation,
            message: message.into(),
        }
    }
}

pub type OverlayResult<T> = std::result::Result<T, OverlayError>;

/// The four calls consumed from the platform overlay service. Each one is a
/// blocking round-trip; keep them off the UI thread.
pub trait OverlayService: Send + Sync {
    fn overlay_infos_for_target(
        &self,
        target: &str,
        user: UserId,
    ) -> OverlayResult<Vec<OverlayInfo>>;

    fn overlay_info(&self, package: &str, user: UserId) -> OverlayResult<Option<OverlayInfo>>;

    /// Enables `package` and disables every peer in its category. Returns
    /// whether the platform accepted the request.
    fn set_enabled_exclusive_in_category(&self, package: &str, user: UserId)
        -> OverlayResult<bool>;

    fn set_enabled(&self, package: &str, enable: bool, user: UserId) -> OverlayResult<bool>;
}
