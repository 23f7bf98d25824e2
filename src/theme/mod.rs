use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::monet::MonetPreferences;
use crate::overlay::{
    Category, CategorySelector, OverlayInfo, OverlayRegistry, OverlayResult, OverlayService,
    SelectOutcome,
};
use crate::probe::{FontFace, ResourceProbe, ShapeDrawable};
use crate::resources::{PackageCatalog, ResourceResult};
use crate::selection::{read_selection, SelectionDocument, SelectionResult};
use crate::settings::{FileSettingsStore, SettingsStore};

/// One handle over the whole theme helper: overlay listing and selection,
/// preview data and Monet preferences, all bound to the configured target,
/// user and display.
///
/// Every call blocks on the overlay service or the settings store.
#[derive(Debug, Clone)]
pub struct ThemeManager {
    config: AppConfig,
    selector: CategorySelector,
    probe: ResourceProbe,
    monet: MonetPreferences,
}

impl ThemeManager {
    pub fn new(
        service: Arc<dyn OverlayService>,
        packages: Arc<dyn PackageCatalog>,
        settings: Arc<dyn SettingsStore>,
        config: AppConfig,
    ) -> Self {
        let registry = OverlayRegistry::new(service, packages);
        let selector = CategorySelector::new(registry.clone(), settings.clone(), config.user_id);
        let probe = ResourceProbe::new(registry, config.density);
        let monet = MonetPreferences::new(settings, config.user_id);
        Self {
            config,
            selector,
            probe,
            monet,
        }
    }

    /// Backs the settings with the JSON file named by `config`.
    pub fn with_file_settings(
        service: Arc<dyn OverlayService>,
        packages: Arc<dyn PackageCatalog>,
        config: AppConfig,
    ) -> AppResult<Self> {
        let path = config.settings_path()?;
        tracing::info!(path = %path.display(), user = %config.user_id, "using file settings store");
        let settings = Arc::new(FileSettingsStore::new(path));
        Ok(Self::new(service, packages, settings, config))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn target(&self) -> &str {
        &self.config.default_target
    }

    pub fn monet(&self) -> &MonetPreferences {
        &self.monet
    }

    pub fn overlay_infos(&self, category: Category) -> OverlayResult<Vec<OverlayInfo>> {
        self.selector.registry().overlay_infos(category, self.target())
    }

    pub fn overlay_packages(&self, category: Category) -> OverlayResult<Vec<String>> {
        self.selector
            .registry()
            .packages_for_category(category, self.target())
    }

    pub fn labels(&self, category: Category) -> OverlayResult<Vec<String>> {
        self.selector.registry().labels(category, self.target())
    }

    pub fn current_enabled(&self, category: Category) -> OverlayResult<Option<String>> {
        self.selector.current_enabled(category, self.target())
    }

    pub fn select(&self, category: Category, package: &str) -> SelectionResult<SelectOutcome> {
        self.selector.select(category, package, self.target())
    }

    /// Selection against a target other than the configured one, e.g.
    /// status-bar icon overlays.
    pub fn select_for_target(
        &self,
        category: Category,
        package: &str,
        target: &str,
    ) -> SelectionResult<SelectOutcome> {
        self.selector.select(category, package, target)
    }

    pub fn is_default(&self, category: Category) -> OverlayResult<bool> {
        self.selector.is_default(category, self.target())
    }

    pub fn is_enabled(&self, package: &str) -> bool {
        self.selector.is_enabled(package)
    }

    pub fn selections(&self) -> SelectionResult<SelectionDocument> {
        read_selection(self.selector.settings(), self.config.user_id)
    }

    pub fn accent_colors(&self) -> OverlayResult<Vec<i32>> {
        self.probe.accent_colors(self.config.night_mode, self.target())
    }

    pub fn theme_colors(&self) -> OverlayResult<Vec<i32>> {
        self.probe.theme_colors(self.target())
    }

    pub fn theme_labels(&self) -> OverlayResult<Vec<String>> {
        self.probe.theme_labels(self.target())
    }

    pub fn theme_packages(&self) -> OverlayResult<Vec<String>> {
        self.probe.theme_packages(self.target())
    }

    pub fn fonts(&self) -> OverlayResult<Vec<FontFace>> {
        self.probe.fonts(self.target())
    }

    pub fn shape_drawables(&self) -> OverlayResult<Vec<ShapeDrawable>> {
        self.probe.shape_drawables(self.target())
    }

    pub fn shape_drawable(&self, package: &str) -> ResourceResult<ShapeDrawable> {
        self.probe.shape_drawable(package, self.target())
    }
}
