//! Integration tests for the incontext launcher

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn incontext() -> Command {
        cargo_bin_cmd!("incontext")
    }

    #[test]
    fn help_displays() {
        incontext()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("run the site generator in its toolchain container"))
            .stdout(predicate::str::contains("--force-rebuild"));
    }

    #[test]
    fn version_displays() {
        incontext()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("incontext"));
    }

    #[test]
    fn invalid_config_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[runtime\n").unwrap();

        incontext()
            .env("INCONTEXT_CONFIG", &path)
            .arg("build")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn conflicting_declared_plugin_fails_before_launch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[[preflight]]\ncommand = \"serve\"\nports = [9000]\n").unwrap();

        incontext()
            .env("INCONTEXT_CONFIG", &path)
            .arg("serve")
            .assert()
            .code(5)
            .stderr(predicate::str::contains("already registered for 'serve'"));
    }

    #[test]
    fn config_source_is_logged_when_verbose() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[[preflight]]\ncommand = \"shell\"\n").unwrap();

        incontext()
            .env("INCONTEXT_CONFIG", &path)
            .env_remove("RUST_LOG")
            .args(["-vv", "shell"])
            .assert()
            .code(5)
            .stderr(predicate::str::contains("Loaded configuration from"));
    }
}
