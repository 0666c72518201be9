pub mod error;
pub mod filesystem;
pub mod result;

pub use error::*;
pub use filesystem::*;
pub use result::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_mock_filesystem_read_write_remove() {
        let fs = MockFileSystem::new();
        let path = Path::new("/project/src/pages/Universal.tsx");
        assert!(!fs.exists(path));

        fs.write(path, "export default {};").unwrap();
        assert!(fs.exists(path));
        assert_eq!(fs.read_to_string(path).unwrap(), "export default {};");

        fs.remove(path).unwrap();
        assert!(!fs.exists(path));
        assert!(fs.read_to_string(path).is_err());
    }
}
