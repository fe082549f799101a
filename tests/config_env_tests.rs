//! Environment overrides for the launcher configuration
//!
//! Kept in its own test binary so the process environment it sets cannot
//! leak into the other configuration tests.

use camino::Utf8PathBuf;
use hyperion::ConfigManager;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_environment_overrides_launcher_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    let manager = ConfigManager::new(&config_path).unwrap();
    fs::write(
        manager.launcher_config_path(),
        "installer_jar: from-file.jar\nreserved_memory_mb: 1536\nmemory_step_mb: 512\n",
    )
    .unwrap();

    // SAFETY: this is the only test in this binary, so no other thread reads the environment.
    unsafe {
        std::env::set_var("HYPERION_RESERVED_MEMORY_MB", "2048");
        std::env::set_var("HYPERION_INSTALLER_JAR", "from-env.jar");
    }

    let config = manager.load_launcher_config().unwrap();

    assert_eq!(config.reserved_memory_mb, 2048);
    assert_eq!(config.installer_jar, "from-env.jar");
    assert_eq!(config.memory_step_mb, 512);
}
