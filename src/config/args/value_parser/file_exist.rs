use std::path::PathBuf;

pub fn check_file_exist(file_path: &str) -> Result<String, String> {
    let path = PathBuf::from(file_path);

    if path.is_file() {
        Ok(path.to_string_lossy().to_string())
    } else {
        Err(format!("keys file does not exist: {}", path.display()))
    }
}
