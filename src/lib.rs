// ============================================================================
// binary_uuid Library
// ============================================================================
//
// Stores UUID columns as BINARY(16) while application code keeps working
// with dashed UUID text.

pub mod core;
pub mod codec;
pub mod settings;
pub mod transcoder;

// Re-export main types for convenience
pub use crate::core::{Record, Result, UuidError, Value};
pub use crate::codec::BinaryLayout;
pub use crate::settings::{
    EntityDescriptor, EntityKind, EntityRegistry, EntityUuidSettings, SettingsPatch,
    SettingsResolver, TableEntityCache, UuidConfig, UuidSettings, UuidVersion,
};
pub use crate::transcoder::{DefaultUuidGenerator, UuidGenerator, ValueTranscoder};
