use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "wealth-overlay"])
        .status()
        .expect("failed to invoke cargo check for wealth-overlay CLI binary");

    assert!(
        status.success(),
        "cargo check --bin wealth-overlay should succeed"
    );
}

#[test]
fn cli_reports_a_drawn_frame() {
    let output = Command::new(env!("CARGO_BIN_EXE_wealth-overlay"))
        .args([
            "--width",
            "40",
            "--height",
            "30",
            "--frames",
            "2",
            "--zoom-out",
            "2",
        ])
        .output()
        .expect("failed to run wealth-overlay binary");

    assert!(
        output.status.success(),
        "wealth-overlay should exit cleanly"
    );
    let stdout = String::from_utf8(output.stdout).expect("stdout is utf-8");
    assert!(
        stdout.contains("frame 0: zoom 1"),
        "unexpected output: {stdout}"
    );
    assert!(
        stdout.contains("frame 1: zoom 3"),
        "unexpected output: {stdout}"
    );
    assert!(
        stdout.contains("overlay wealth"),
        "unexpected output: {stdout}"
    );
}
