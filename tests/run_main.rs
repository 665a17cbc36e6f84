use std::time::Duration;

use assert_cmd::Command;

const TIMEOUT_DURATION: Duration = Duration::from_secs(30);

#[test]
fn headless_run_succeeds() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    Command::cargo_bin(env!("CARGO_PKG_NAME"))?
        .env("HEADLESS", "true")
        .env("CUBE_SCENE_HEADLESS_FRAMES", "90")
        .env("CUBE_SCENE_SETTINGS", dir.path().join("settings.json"))
        .timeout(TIMEOUT_DURATION)
        .assert()
        .success();
    Ok(())
}

#[test]
fn headless_run_survives_malformed_settings() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let settings = dir.path().join("settings.json");
    std::fs::write(&settings, "{ not json")?;
    Command::cargo_bin(env!("CARGO_PKG_NAME"))?
        .env("HEADLESS", "true")
        .env("CUBE_SCENE_HEADLESS_FRAMES", "10")
        .env("CUBE_SCENE_SETTINGS", &settings)
        .timeout(TIMEOUT_DURATION)
        .assert()
        .success();
    Ok(())
}
