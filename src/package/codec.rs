//! Descriptor serialization used by the repository.

use super::PackageDescriptor;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Converts descriptors to and from their stored byte form.
pub trait DescriptorCodec: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> Result<PackageDescriptor, BoxError>;
    fn serialize(&self, descriptor: &PackageDescriptor) -> Result<Vec<u8>, BoxError>;
}

/// Pretty-printed JSON, the format of `shelf.json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl DescriptorCodec for JsonCodec {
    fn parse(&self, bytes: &[u8]) -> Result<PackageDescriptor, BoxError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn serialize(&self, descriptor: &PackageDescriptor) -> Result<Vec<u8>, BoxError> {
        let mut bytes = serde_json::to_vec_pretty(descriptor)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::PackageSignature;

    #[test]
    fn test_json_codec_output_is_stable() {
        let descriptor = PackageDescriptor::new(PackageSignature::new("me", "a", "1"))
            .with_entry_point("Main")
            .with_dependency(PackageSignature::new("me", "b", "5"));

        let bytes = JsonCodec.serialize(&descriptor).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();

        assert!(text.ends_with("}\n"));
        assert!(text.contains("\"entry_point\": \"Main\""));
        assert_eq!(JsonCodec.parse(&bytes).unwrap(), descriptor);
        assert_eq!(JsonCodec.serialize(&descriptor).unwrap(), bytes);
    }

    #[test]
    fn test_json_codec_rejects_garbage() {
        assert!(JsonCodec.parse(b"not json").is_err());
        assert!(JsonCodec.parse(br#"{"publisher":"me"}"#).is_err());
    }
}
