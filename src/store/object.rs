//! Object type - the unit of content-addressed storage

use crate::model::{ObjectId, ObjectKind};
use crate::store::codec::{encode_header, ObjectHeader};

/// A typed chunk of content, uncompressed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Object {
    /// Type of content
    pub kind: ObjectKind,
    /// Raw content, without header
    pub content: Vec<u8>,
}

impl Object {
    pub fn new(kind: ObjectKind, content: Vec<u8>) -> Self {
        Object { kind, content }
    }

    pub fn blob(content: impl Into<Vec<u8>>) -> Self {
        Object::new(ObjectKind::Blob, content.into())
    }

    pub fn header(&self) -> ObjectHeader {
        ObjectHeader {
            kind: self.kind.clone(),
            size: self.content.len() as u64,
        }
    }

    /// Header followed by content; this is what gets hashed and compressed
    pub fn encode(&self) -> Vec<u8> {
        let mut out = encode_header(&self.kind, self.content.len() as u64);
        out.extend_from_slice(&self.content);
        out
    }

    /// Compute the content id over the encoded form
    pub fn id(&self) -> ObjectId {
        ObjectId::digest(&self.encode())
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let obj = Object::blob(b"hello world".to_vec());
        assert_eq!(obj.encode(), b"blob 11\0hello world");
        assert_eq!(obj.header().size, 11);
    }

    #[test]
    fn test_id_includes_type() {
        let blob = Object::new(ObjectKind::Blob, b"data".to_vec());
        let tree = Object::new(ObjectKind::Tree, b"data".to_vec());

        // Same content, different types, different ids
        assert_ne!(blob.id(), tree.id());
    }

    #[test]
    fn test_git_compatible_id() {
        let obj = Object::blob("hello world");
        assert_eq!(
            obj.id().to_hex(),
            "95d09f2b10159347eece71399a7e2e907ea3df4f"
        );
    }
}
