use std::sync::Arc;

use super::{Category, OverlayInfo, OverlayResult, OverlayService, DEFAULT_LABEL};
use crate::resources::PackageCatalog;
use crate::settings::UserId;

/// Read side of the overlay service: enumerate, filter and label overlays.
///
/// Nothing is cached; every call is a fresh query. Registry failures are
/// returned to the caller since no selection can be computed without them.
#[derive(Clone)]
pub struct OverlayRegistry {
    service: Arc<dyn OverlayService>,
    packages: Arc<dyn PackageCatalog>,
}

impl std::fmt::Debug for OverlayRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayRegistry").finish_non_exhaustive()
    }
}

impl OverlayRegistry {
    pub fn new(service: Arc<dyn OverlayService>, packages: Arc<dyn PackageCatalog>) -> Self {
        Self { service, packages }
    }

    pub(crate) fn service(&self) -> &Arc<dyn OverlayService> {
        &self.service
    }

    pub(crate) fn packages(&self) -> &Arc<dyn PackageCatalog> {
        &self.packages
    }

    /// Overlays on `target` in `category`, ordered by package name.
    pub fn overlay_infos(&self, category: Category, target: &str) -> OverlayResult<Vec<OverlayInfo>> {
        let mut infos: Vec<OverlayInfo> = self
            .service
            .overlay_infos_for_target(target, UserId::SYSTEM)
            .inspect_err(|err| {
                tracing::warn!(%category, target_package = target, %err, "failed to list overlays");
            })?
            .into_iter()
            .filter(|info| info.in_category(category))
            .collect();
        infos.sort_by(|a, b| a.package_name.cmp(&b.package_name));
        Ok(infos)
    }

    /// `target` first, standing in for the default entry, then every overlay
    /// package of the category in alphabetical order.
    pub fn packages_for_category(&self, category: Category, target: &str) -> OverlayResult<Vec<String>> {
        let infos = self.overlay_infos(category, target)?;
        let mut packages = Vec::with_capacity(infos.len() + 1);
        packages.push(target.to_string());
        packages.extend(infos.into_iter().map(|info| info.package_name));
        Ok(packages)
    }

    /// `"Default"` followed by one human label per overlay, aligned with
    /// [`Self::overlay_infos`].
    pub fn labels(&self, category: Category, target: &str) -> OverlayResult<Vec<String>> {
        let infos = self.overlay_infos(category, target)?;
        let mut labels = Vec::with_capacity(infos.len() + 1);
        labels.push(DEFAULT_LABEL.to_string());
        labels.extend(infos.iter().map(|info| self.label_for(&info.package_name)));
        Ok(labels)
    }

    /// Application label, or the package name when it can't be resolved.
    pub fn label_for(&self, package: &str) -> String {
        match self.packages.application_label(package) {
            Ok(label) => label,
            Err(err) => {
                tracing::debug!(package, %err, "falling back to package name for label");
                package.to_string()
            }
        }
    }
}
