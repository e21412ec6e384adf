use crc32fast::Hasher;

/// Derive a stable document id from an arbitrary document key (path, slug)
pub fn get_document_id(key: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential id generator for block ids within a document
///
/// Ids are `<seed>-<n>`; the seed is the CRC32 of the document key, so ids
/// from different documents never collide while staying short and readable.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    pub fn new(document_key: &str) -> Self {
        Self {
            seed: get_document_id(document_key),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate the next sequential id
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}
