use std::sync::Arc;

use crate::overlay::{Category, OverlayRegistry, OverlayResult, Selection};
use crate::resources::{PackageCatalog, ResourceError, ResourceResult, ResourceTable};

mod path;

pub use path::{IconPath, PathCommand, PathDataError};

pub const ACCENT_LIGHT_COLOR: &str = "accent_device_default_light";
pub const ACCENT_DARK_COLOR: &str = "accent_device_default_dark";
pub const PRIMARY_DARK_COLOR: &str = "primary_device_default_dark";
pub const BODY_FONT_FAMILY: &str = "config_bodyFontFamily";
pub const ICON_MASK: &str = "config_icon_mask";

pub const ICON_VIEWPORT_SIZE: f32 = 100.0;
pub const THUMB_SIZE_DP: f32 = 72.0;
const WHITE: i32 = -1;

const LIGHT_THEME_LABEL: &str = "Light Theme";
const DARK_THEME_LABEL: &str = "Dark Theme";
pub const LIGHT_THEME_PACKAGE: &str = "light.theme";
pub const DARK_THEME_PACKAGE: &str = "dark.theme";

/// Typeface request for a font preview, always at the regular style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFace {
    pub family: String,
}

/// Icon-shape thumbnail: the mask outline plus the size to draw it at.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDrawable {
    /// `None` when the package declares an empty mask.
    pub path: Option<IconPath>,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub intrinsic_width: i32,
    pub intrinsic_height: i32,
}

/// Builds preview data for the overlays of a category by reading one named
/// resource out of each package.
///
/// Packages that are missing or lack the resource are left out of the
/// result. Only a registry failure fails the call.
#[derive(Debug, Clone)]
pub struct ResourceProbe {
    registry: OverlayRegistry,
    density: f32,
}

impl ResourceProbe {
    pub fn new(registry: OverlayRegistry, density: f32) -> Self {
        Self { registry, density }
    }

    fn packages(&self) -> &Arc<dyn PackageCatalog> {
        self.registry.packages()
    }

    /// Resources of `package`, or the platform's own for the default entry.
    fn resources(&self, package: &str, target: &str) -> ResourceResult<Box<dyn ResourceTable>> {
        match Selection::resolve(package, target) {
            Selection::Default => Ok(self.packages().system_resources()),
            Selection::Overlay(package) => self.packages().resources_for(&package),
        }
    }

    fn collect<T>(
        &self,
        category: Category,
        target: &str,
        mut extract: impl FnMut(&dyn ResourceTable) -> ResourceResult<T>,
    ) -> OverlayResult<Vec<T>> {
        let packages = self.registry.packages_for_category(category, target)?;
        Ok(packages
            .iter()
            .filter_map(|package| {
                let value = self
                    .resources(package, target)
                    .and_then(|table| extract(&*table));
                skip_failed(category, package, value)
            })
            .collect())
    }

    /// Accent color of the default and each accent overlay.
    pub fn accent_colors(&self, night_mode: bool, target: &str) -> OverlayResult<Vec<i32>> {
        let name = if night_mode {
            ACCENT_DARK_COLOR
        } else {
            ACCENT_LIGHT_COLOR
        };
        self.collect(Category::Accent, target, |table| table.color(name))
    }

    /// White for the light theme, the platform's dark primary, then each
    /// theme-style overlay's dark primary.
    pub fn theme_colors(&self, target: &str) -> OverlayResult<Vec<i32>> {
        let mut colors = vec![WHITE];
        let system = self.packages().system_resources();
        if let Some(color) = skip_failed(
            Category::ThemeStyle,
            target,
            system.color(PRIMARY_DARK_COLOR),
        ) {
            colors.push(color);
        }
        let packages = self.registry.packages_for_category(Category::ThemeStyle, target)?;
        colors.extend(packages.iter().skip(1).filter_map(|package| {
            let value = self
                .packages()
                .resources_for(package)
                .and_then(|table| table.color(PRIMARY_DARK_COLOR));
            skip_failed(Category::ThemeStyle, package, value)
        }));
        Ok(colors)
    }

    pub fn theme_labels(&self, target: &str) -> OverlayResult<Vec<String>> {
        let infos = self.registry.overlay_infos(Category::ThemeStyle, target)?;
        let mut labels = vec![LIGHT_THEME_LABEL.to_string(), DARK_THEME_LABEL.to_string()];
        labels.extend(
            infos
                .iter()
                .map(|info| self.registry.label_for(&info.package_name)),
        );
        Ok(labels)
    }

    pub fn theme_packages(&self, target: &str) -> OverlayResult<Vec<String>> {
        let packages = self.registry.packages_for_category(Category::ThemeStyle, target)?;
        let mut result = vec![
            LIGHT_THEME_PACKAGE.to_string(),
            DARK_THEME_PACKAGE.to_string(),
        ];
        result.extend(packages.into_iter().skip(1));
        Ok(result)
    }

    pub fn fonts(&self, target: &str) -> OverlayResult<Vec<FontFace>> {
        self.collect(Category::Font, target, |table| {
            Ok(FontFace {
                family: table.string(BODY_FONT_FAMILY)?,
            })
        })
    }

    pub fn shape_drawables(&self, target: &str) -> OverlayResult<Vec<ShapeDrawable>> {
        self.collect(Category::IconShape, target, |table| self.shape_from(table))
    }

    /// Thumbnail for a single icon-shape package. `"default"` and the target
    /// both resolve to the platform's mask.
    pub fn shape_drawable(&self, package: &str, target: &str) -> ResourceResult<ShapeDrawable> {
        let table = self.resources(package, target)?;
        self.shape_from(&*table)
    }

    fn shape_from(&self, table: &dyn ResourceTable) -> ResourceResult<ShapeDrawable> {
        let mask = table.string(ICON_MASK)?;
        let path = if mask.trim().is_empty() {
            None
        } else {
            let path = IconPath::parse(&mask).map_err(|err| ResourceError::InvalidValue {
                name: ICON_MASK.to_string(),
                message: err.to_string(),
            })?;
            Some(path)
        };
        let thumb_size = (self.density * THUMB_SIZE_DP) as i32;
        Ok(ShapeDrawable {
            path,
            viewport_width: ICON_VIEWPORT_SIZE,
            viewport_height: ICON_VIEWPORT_SIZE,
            intrinsic_width: thumb_size,
            intrinsic_height: thumb_size,
        })
    }
}

fn skip_failed<T>(category: Category, package: &str, value: ResourceResult<T>) -> Option<T> {
    value
        .inspect_err(|err| {
            tracing::debug!(%category, package, %err, "omitting package from preview");
        })
        .ok()
}
