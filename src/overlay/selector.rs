use std::sync::Arc;

use super::{Category, OverlayRegistry, OverlayResult, Selection};
use crate::selection::{write_selection, SelectionResult, WriteOutcome};
use crate::settings::{SettingsStore, UserId};

/// What happened to the platform half of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformOutcome {
    Applied,
    /// The service answered but refused, e.g. the package isn't an overlay.
    Rejected,
    /// Default requested while nothing in the category was enabled.
    Unchanged,
    /// The service call failed; the platform reconciles from the document.
    RemoteFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectOutcome {
    pub platform: PlatformOutcome,
    pub persistence: WriteOutcome,
}

/// Switches a category between its overlays, keeping the platform and the
/// persisted selection document in step.
#[derive(Clone)]
pub struct CategorySelector {
    registry: OverlayRegistry,
    settings: Arc<dyn SettingsStore>,
    user: UserId,
}

impl std::fmt::Debug for CategorySelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategorySelector")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl CategorySelector {
    pub fn new(registry: OverlayRegistry, settings: Arc<dyn SettingsStore>, user: UserId) -> Self {
        Self {
            registry,
            settings,
            user,
        }
    }

    pub fn registry(&self) -> &OverlayRegistry {
        &self.registry
    }

    pub(crate) fn settings(&self) -> &dyn SettingsStore {
        &*self.settings
    }

    /// Package of the enabled overlay in `category`, if any.
    pub fn current_enabled(&self, category: Category, target: &str) -> OverlayResult<Option<String>> {
        Ok(self
            .registry
            .overlay_infos(category, target)?
            .into_iter()
            .find(|info| info.is_enabled())
            .map(|info| info.package_name))
    }

    /// Make `package` the only active overlay of `category`, or clear the
    /// category when `package` is the target (or `"default"`).
    ///
    /// Overlay-service failures are logged and don't stop the document
    /// update. Only settings-store failures are returned.
    pub fn select(
        &self,
        category: Category,
        package: &str,
        target: &str,
    ) -> SelectionResult<SelectOutcome> {
        let selection = Selection::resolve(package, target);
        let platform = match &selection {
            Selection::Default => self.disable_current(category, target),
            Selection::Overlay(package) => self.enable_exclusive(category, package),
        };
        let persistence = write_selection(&*self.settings, self.user, category, &selection)?;
        tracing::debug!(
            %category,
            package = ?selection.package(),
            ?platform,
            ?persistence,
            "overlay selection applied"
        );
        Ok(SelectOutcome {
            platform,
            persistence,
        })
    }

    fn enable_exclusive(&self, category: Category, package: &str) -> PlatformOutcome {
        let service = self.registry.service();
        match service.set_enabled_exclusive_in_category(package, UserId::SYSTEM) {
            Ok(true) => PlatformOutcome::Applied,
            Ok(false) => {
                tracing::warn!(%category, package, "overlay service refused exclusive enable");
                PlatformOutcome::Rejected
            }
            Err(err) => {
                tracing::warn!(%category, package, %err, "failed to enable overlay");
                PlatformOutcome::RemoteFailed
            }
        }
    }

    fn disable_current(&self, category: Category, target: &str) -> PlatformOutcome {
        let current = match self.current_enabled(category, target) {
            Ok(Some(current)) => current,
            Ok(None) => return PlatformOutcome::Unchanged,
            Err(err) => {
                tracing::warn!(%category, %err, "failed to look up enabled overlay");
                return PlatformOutcome::RemoteFailed;
            }
        };
        match self
            .registry
            .service()
            .set_enabled(&current, false, UserId::SYSTEM)
        {
            Ok(true) => PlatformOutcome::Applied,
            Ok(false) => {
                tracing::warn!(%category, package = %current, "overlay service refused disable");
                PlatformOutcome::Rejected
            }
            Err(err) => {
                tracing::warn!(%category, package = %current, %err, "failed to disable overlay");
                PlatformOutcome::RemoteFailed
            }
        }
    }

    /// `true` when no overlay of `category` is enabled. Packages whose info
    /// can't be fetched are skipped.
    pub fn is_default(&self, category: Category, target: &str) -> OverlayResult<bool> {
        let service = self.registry.service();
        for info in self.registry.overlay_infos(category, target)? {
            match service.overlay_info(&info.package_name, UserId::SYSTEM) {
                Ok(Some(info)) if info.is_enabled() => return Ok(false),
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(%category, package = %info.package_name, %err, "failed to query overlay");
                }
            }
        }
        Ok(true)
    }

    /// Unknown packages and service failures both read as disabled.
    pub fn is_enabled(&self, package: &str) -> bool {
        match self.registry.service().overlay_info(package, UserId::SYSTEM) {
            Ok(info) => info.is_some_and(|info| info.is_enabled()),
            Err(err) => {
                tracing::warn!(package, %err, "failed to query overlay");
                false
            }
        }
    }
}
