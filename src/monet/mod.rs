use std::sync::Arc;

use crate::resources::ResourceTable;
use crate::settings::{SettingsResult, SettingsStore, UserId};

pub const KEY_COLOR_TYPE: &str = "monet_engine_color_type";
pub const KEY_COLOR_OVERRIDE: &str = "monet_engine_color_override";
pub const KEY_COLOR_ACCENT: &str = "monet_engine_color_accent";
pub const KEY_TINT_SURFACE: &str = "monet_engine_tint_surface";
pub const KEY_CHROMA_FACTOR: &str = "monet_engine_chroma_factor";
pub const KEY_ACCURATE_SHADES: &str = "monet_engine_accurate_shades";
pub const KEY_LINEAR_LIGHTNESS: &str = "monet_engine_linear_lightness";
pub const KEY_WHITE_LUMINANCE: &str = "monet_engine_white_luminance_user";

/// Platform color the accent resets to.
pub const SYSTEM_ACCENT1_500: &str = "system_accent1_500";

/// Marks the override and accent colors as not set.
pub const COLOR_UNSET: i32 = -1;
pub const CHROMA_FACTOR_DEFAULT: i32 = 100;
pub const WHITE_LUMINANCE_DEFAULT: i32 = 425;

/// Where the Monet engine takes its seed color from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorType {
    #[default]
    Default = 0,
    Custom = 1,
    Internal = 2,
}

impl ColorType {
    /// Anything outside the known values collapses to [`ColorType::Default`].
    pub fn from_raw(value: i32) -> Self {
        match value {
            1 => Self::Custom,
            2 => Self::Internal,
            _ => Self::Default,
        }
    }

    pub fn as_raw(self) -> i32 {
        self as i32
    }
}

/// Typed view over the Monet keys of the shared settings store. Booleans are
/// stored as `0`/`1`.
#[derive(Clone)]
pub struct MonetPreferences {
    settings: Arc<dyn SettingsStore>,
    user: UserId,
}

impl std::fmt::Debug for MonetPreferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonetPreferences")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl MonetPreferences {
    pub fn new(settings: Arc<dyn SettingsStore>, user: UserId) -> Self {
        Self { settings, user }
    }

    fn get_int(&self, key: &str, default: i32) -> SettingsResult<i32> {
        self.settings.get_int(key, default, self.user)
    }

    fn put_int(&self, key: &str, value: i32) -> SettingsResult<()> {
        self.settings.put_int(key, value, self.user)
    }

    fn get_bool(&self, key: &str, default: bool) -> SettingsResult<bool> {
        Ok(self.get_int(key, i32::from(default))? != 0)
    }

    fn put_bool(&self, key: &str, value: bool) -> SettingsResult<()> {
        self.put_int(key, i32::from(value))
    }

    /// Raw stored values outside the known set read back as `Default`.
    pub fn color_type(&self) -> SettingsResult<ColorType> {
        Ok(ColorType::from_raw(
            self.get_int(KEY_COLOR_TYPE, ColorType::Default.as_raw())?,
        ))
    }

    /// Unknown values are stored as `Default` (0).
    pub fn set_color_type(&self, value: i32) -> SettingsResult<()> {
        self.put_int(KEY_COLOR_TYPE, ColorType::from_raw(value).as_raw())
    }

    pub fn override_color(&self) -> SettingsResult<i32> {
        self.get_int(KEY_COLOR_OVERRIDE, COLOR_UNSET)
    }

    pub fn set_override_color(&self, color: i32) -> SettingsResult<()> {
        self.put_int(KEY_COLOR_OVERRIDE, color)
    }

    pub fn accent_color(&self) -> SettingsResult<i32> {
        self.get_int(KEY_COLOR_ACCENT, COLOR_UNSET)
    }

    pub fn set_accent_color(&self, color: i32) -> SettingsResult<()> {
        self.put_int(KEY_COLOR_ACCENT, color)
    }

    /// Put the accent back to the platform's `system_accent1_500`, or to
    /// unset when the platform doesn't define it.
    pub fn reset_accent_color(&self, system: &dyn ResourceTable) -> SettingsResult<()> {
        let color = system.color(SYSTEM_ACCENT1_500).unwrap_or_else(|err| {
            tracing::warn!(%err, "platform accent unavailable; clearing accent color");
            COLOR_UNSET
        });
        self.set_accent_color(color)
    }

    pub fn is_surface_tint_enabled(&self) -> SettingsResult<bool> {
        self.get_bool(KEY_TINT_SURFACE, true)
    }

    pub fn set_surface_tint_enabled(&self, enable: bool) -> SettingsResult<()> {
        self.put_bool(KEY_TINT_SURFACE, enable)
    }

    pub fn is_accurate_shades_enabled(&self) -> SettingsResult<bool> {
        self.get_bool(KEY_ACCURATE_SHADES, true)
    }

    pub fn set_accurate_shades_enabled(&self, enable: bool) -> SettingsResult<()> {
        self.put_bool(KEY_ACCURATE_SHADES, enable)
    }

    pub fn is_linear_lightness_enabled(&self) -> SettingsResult<bool> {
        self.get_bool(KEY_LINEAR_LIGHTNESS, false)
    }

    pub fn set_linear_lightness_enabled(&self, enable: bool) -> SettingsResult<()> {
        self.put_bool(KEY_LINEAR_LIGHTNESS, enable)
    }

    pub fn chroma_factor(&self) -> SettingsResult<i32> {
        self.get_int(KEY_CHROMA_FACTOR, CHROMA_FACTOR_DEFAULT)
    }

    pub fn set_chroma_factor(&self, factor: i32) -> SettingsResult<()> {
        self.put_int(KEY_CHROMA_FACTOR, factor)
    }

    pub fn white_luminance(&self) -> SettingsResult<i32> {
        self.get_int(KEY_WHITE_LUMINANCE, WHITE_LUMINANCE_DEFAULT)
    }

    pub fn set_white_luminance(&self, luminance: i32) -> SettingsResult<()> {
        self.put_int(KEY_WHITE_LUMINANCE, luminance)
    }
}
