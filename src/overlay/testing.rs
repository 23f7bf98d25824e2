use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::{Category, OverlayError, OverlayInfo, OverlayResult, OverlayService};
use crate::resources::{PackageCatalog, ResourceError, ResourceMap, ResourceResult, ResourceTable};
use crate::settings::UserId;

pub(crate) fn overlay(package: &str, category: Category, enabled: bool) -> OverlayInfo {
    OverlayInfo {
        package_name: package.to_string(),
        category: category.key().to_string(),
        target_package: "android".to_string(),
        priority: 1,
        enabled,
    }
}

/// Overlay service fake that applies enable requests to its own table and
/// records every call.
#[derive(Debug, Default)]
pub(crate) struct FakeOverlayService {
    overlays: Mutex<Vec<OverlayInfo>>,
    calls: Mutex<Vec<String>>,
    fail_listing: AtomicBool,
    fail_writes: AtomicBool,
    fail_info: AtomicBool,
}

impl FakeOverlayService {
    pub(crate) fn new(overlays: Vec<OverlayInfo>) -> Self {
        Self {
            overlays: Mutex::new(overlays),
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn enabled_in(&self, category: Category) -> Vec<String> {
        self.overlays
            .lock()
            .unwrap()
            .iter()
            .filter(|info| info.in_category(category) && info.enabled)
            .map(|info| info.package_name.clone())
            .collect()
    }

    pub(crate) fn fail_listing(&self) {
        self.fail_listing.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_info(&self) {
        self.fail_info.store(true, Ordering::SeqCst);
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl OverlayService for FakeOverlayService {
    fn overlay_infos_for_target(
        &self,
        target: &str,
        _user: UserId,
    ) -> OverlayResult<Vec<OverlayInfo>> {
        self.record(format!("list {target}"));
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(OverlayError::remote(
                "getOverlayInfosForTarget",
                "simulated registry failure",
            ));
        }
        Ok(self
            .overlays
            .lock()
            .unwrap()
            .iter()
            .filter(|info| info.target_package == target)
            .cloned()
            .collect())
    }

    fn overlay_info(&self, package: &str, _user: UserId) -> OverlayResult<Option<OverlayInfo>> {
        self.record(format!("info {package}"));
        if self.fail_info.load(Ordering::SeqCst) {
            return Err(OverlayError::remote(
                "getOverlayInfo",
                "simulated info failure",
            ));
        }
        Ok(self
            .overlays
            .lock()
            .unwrap()
            .iter()
            .find(|info| info.package_name == package)
            .cloned())
    }

    fn set_enabled_exclusive_in_category(
        &self,
        package: &str,
        _user: UserId,
    ) -> OverlayResult<bool> {
        self.record(format!("exclusive {package}"));
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(OverlayError::remote(
                "setEnabledExclusiveInCategory",
                "simulated enable failure",
            ));
        }
        let mut overlays = self.overlays.lock().unwrap();
        let Some((category, target)) = overlays
            .iter()
            .find(|info| info.package_name == package)
            .map(|info| (info.category.clone(), info.target_package.clone()))
        else {
            return Ok(false);
        };
        for info in overlays.iter_mut() {
            if info.category == category && info.target_package == target {
                info.enabled = info.package_name == package;
            }
        }
        Ok(true)
    }

    fn set_enabled(&self, package: &str, enable: bool, _user: UserId) -> OverlayResult<bool> {
        self.record(format!("set_enabled {package} {enable}"));
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(OverlayError::remote(
                "setEnabled",
                "simulated disable failure",
            ));
        }
        let mut overlays = self.overlays.lock().unwrap();
        match overlays.iter_mut().find(|info| info.package_name == package) {
            Some(info) => {
                info.enabled = enable;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Package catalog fake keyed by package name.
#[derive(Debug, Default)]
pub(crate) struct FakePackageCatalog {
    labels: HashMap<String, String>,
    tables: HashMap<String, ResourceMap>,
    system: ResourceMap,
}

impl FakePackageCatalog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_label(mut self, package: &str, label: &str) -> Self {
        self.labels.insert(package.to_string(), label.to_string());
        self
    }

    pub(crate) fn with_resources(mut self, package: &str, table: ResourceMap) -> Self {
        self.tables.insert(package.to_string(), table);
        self
    }

    pub(crate) fn with_system(mut self, table: ResourceMap) -> Self {
        self.system = table;
        self
    }
}

impl PackageCatalog for FakePackageCatalog {
    fn application_label(&self, package: &str) -> ResourceResult<String> {
        self.labels
            .get(package)
            .cloned()
            .ok_or_else(|| ResourceError::PackageNotFound {
                package: package.to_string(),
            })
    }

    fn resources_for(&self, package: &str) -> ResourceResult<Box<dyn ResourceTable>> {
        self.tables
            .get(package)
            .cloned()
            .map(|table| Box::new(table) as Box<dyn ResourceTable>)
            .ok_or_else(|| ResourceError::PackageNotFound {
                package: package.to_string(),
            })
    }

    fn system_resources(&self) -> Box<dyn ResourceTable> {
        Box::new(self.system.clone())
    }
}
