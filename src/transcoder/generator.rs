use crate::core::{Result, UuidError};
use crate::settings::UuidVersion;
use uuid::Uuid;

/// Source of fresh primary-key values
pub trait UuidGenerator: Send + Sync {
    /// Returns canonical UUID text of the requested version
    fn generate(&self, version: UuidVersion) -> Result<String>;
}

/// Generator backed by the `uuid` crate
///
/// Name-based versions (3, 5) hash a random name under the OID namespace,
/// since a primary key has no natural name to hash. Version 2 (DCE
/// security) cannot be minted.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultUuidGenerator;

impl UuidGenerator for DefaultUuidGenerator {
    fn generate(&self, version: UuidVersion) -> Result<String> {
        let id = match version.get() {
            1 => {
                let random = Uuid::new_v4().into_bytes();
                let mut node = [0u8; 6];
                node.copy_from_slice(&random[10..]);
                // multicast bit marks a random node id
                node[0] |= 0x01;
                Uuid::now_v1(&node)
            }
            3 => Uuid::new_v3(&Uuid::NAMESPACE_OID, Uuid::new_v4().as_bytes()),
            4 => Uuid::new_v4(),
            5 => Uuid::new_v5(&Uuid::NAMESPACE_OID, Uuid::new_v4().as_bytes()),
            other => return Err(UuidError::UnsupportedVersion(other)),
        };

        Ok(id.hyphenated().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::is_uuid_text;

    #[test]
    fn test_generates_requested_versions() {
        let generator = DefaultUuidGenerator;

        for version in [1u8, 3, 4, 5] {
            let id = generator.generate(UuidVersion::new(version).unwrap()).unwrap();
            assert!(is_uuid_text(&id), "{} is not canonical", id);
            let parsed = Uuid::parse_str(&id).unwrap();
            assert_eq!(parsed.get_version_num(), version as usize);
        }
    }

    #[test]
    fn test_version_two_is_unsupported() {
        let err = DefaultUuidGenerator.generate(UuidVersion::new(2).unwrap()).unwrap_err();
        assert!(matches!(err, UuidError::UnsupportedVersion(2)));
    }

    #[test]
    fn test_generated_ids_differ() {
        let generator = DefaultUuidGenerator;
        let a = generator.generate(UuidVersion::V4).unwrap();
        let b = generator.generate(UuidVersion::V4).unwrap();
        assert_ne!(a, b);
    }
}
