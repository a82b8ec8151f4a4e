mod options;

#[test]
fn default_constants() {
    use super::*;

    assert_eq!(DEFAULT_WORKER_SIZE, 200);
    assert_eq!(DEFAULT_CACHE_CONTROL, "public, max-age=31536000");
    assert_eq!(DEFAULT_FAILED_KEYS_FILE, "error_keys.txt");
}
