//! Layered UUID column settings
//!
//! - `patch.rs` - settings layers and the resolved settings record
//! - `registry.rs` - entity descriptors, the startup registry and the
//!   table -> entity cache
//! - `config.rs` - configuration document (code builder or JSON)
//! - `resolver.rs` - merges the layers for a column

pub mod config;
pub mod patch;
pub mod registry;
pub mod resolver;

pub use config::UuidConfig;
pub use patch::{SettingsPatch, UuidSettings, UuidVersion};
pub use registry::{
    DEFAULT_PRIMARY_KEY, EntityDescriptor, EntityKind, EntityRegistry, EntityUuidSettings,
    TableEntityCache,
};
pub use resolver::SettingsResolver;
