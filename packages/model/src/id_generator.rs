use crc32fast::Hasher;

/// Generate a document id from a file path using CRC32.
pub fn get_document_id(path: &str) -> String {
    let mut buff = String::from(path);
    if !path.starts_with("file://") {
        buff = format!("file://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential id generator for component-tree nodes within one document.
///
/// Ids are assigned once at parse time and remain stable across edits so the
/// editor can track node identity.
#[derive(Clone)]
pub struct IdGenerator {
    seed: String, // Document id (CRC32)
    count: u32,   // Sequential counter
}

impl IdGenerator {
    pub fn new(path: &str) -> Self {
        Self {
            seed: get_document_id(path),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate the next sequential id.
    pub fn next_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_generation() {
        let id1 = get_document_id("/src/pages/index.tsx");
        let id2 = get_document_id("/src/pages/index.tsx");

        // Same path always generates same id
        assert_eq!(id1, id2);

        // Different paths generate different ids
        let id3 = get_document_id("/src/pages/about.tsx");
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_sequential_ids() {
        let mut gen = IdGenerator::new("/src/pages/index.tsx");

        let id1 = gen.next_id();
        let id2 = gen.next_id();
        let id3 = gen.next_id();

        assert!(id1.ends_with("-1"));
        assert!(id2.ends_with("-2"));
        assert!(id3.ends_with("-3"));

        let seed = gen.seed();
        assert!(id1.starts_with(seed));
        assert!(id2.starts_with(seed));
        assert!(id3.starts_with(seed));
    }
}
