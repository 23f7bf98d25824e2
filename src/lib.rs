//! Theme overlay coordination for system UI hosts.
//!
//! Lists resource overlays per category, switches a category to exactly one
//! overlay through the platform overlay service, and keeps the category ->
//! package selection document in the shared settings store in step. Also
//! exposes preview data read from overlay resources and the Monet color
//! preferences stored next to the selection.

pub mod config;
pub mod error;
pub mod logging;
pub mod monet;
pub mod overlay;
pub mod probe;
pub mod resources;
pub mod selection;
pub mod settings;
pub mod theme;

pub use config::{load_app_config, AppConfig};
pub use error::{AppError, AppResult};
pub use monet::{ColorType, MonetPreferences};
pub use overlay::{
    Category, CategorySelector, OverlayError, OverlayInfo, OverlayRegistry, OverlayService,
    Selection,
};
pub use probe::ResourceProbe;
pub use resources::{PackageCatalog, ResourceTable};
pub use selection::{SelectionDocument, WriteOutcome};
pub use settings::{FileSettingsStore, MemorySettings, SettingsStore, UserId};
pub use theme::ThemeManager;
