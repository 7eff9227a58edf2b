mod support;

use std::process::Command;

#[test]
fn wrapper_reprints_the_report() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let data = support::write_dataset(dir.path(), &support::synthetic_rows(100, 9));
    let config = dir.path().join("logistic.toml");
    std::fs::write(
        &config,
        format!("[data]\npath = {:?}\n", data.to_string_lossy()),
    )?;

    let output = Command::new(env!("CARGO_BIN_EXE_run"))
        .env("LOGISTIC_CONFIG", &config)
        .env("RUST_LOG", "off")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(output.status.success(), "{stdout}");
    assert!(stdout.contains("The Accuracy predicted by the test data is ="));
    assert!(stdout.contains("The breast cancer is "));
    assert!(!stdout.contains("Errors:"));
    Ok(())
}

#[test]
fn wrapper_reports_child_errors() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = dir.path().join("logistic.toml");
    std::fs::write(&config, "[data]\npath = \"missing/breast-cancer.csv\"\n")?;

    let output = Command::new(env!("CARGO_BIN_EXE_run"))
        .env("LOGISTIC_CONFIG", &config)
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(!output.status.success());
    assert!(stdout.contains("Errors:"));
    assert!(stdout.contains("Unavailable"));
    Ok(())
}
