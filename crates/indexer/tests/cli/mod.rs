use std::process::Command;

use crate::common::Fixture;

fn cdom_index() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cdom-index"))
}

#[test]
fn test_clean_files_exit_successfully() {
    let fixture = Fixture::new();
    fixture.add_file("cdom.toml", "[diagnostics]\ncolor = false\n");
    let lib = fixture.add_file("lib.c", "int twice(int v) { return v + v; }\n");
    let user = fixture.add_file("user.c", "int run(void) { return twice(2); }\n");

    let output = cdom_index()
        .current_dir(fixture.root_path())
        .arg(&lib)
        .arg(&user)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stdout));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_errors_are_reported_and_fail_the_run() {
    let fixture = Fixture::new();
    let config = fixture.add_file("settings.toml", "jobs = 1\n[diagnostics]\ncolor = false\n");
    let source = fixture.add_file("broken.cc", "namespace n { int x; }\nint y = n::x + z;\n");

    let output = cdom_index()
        .current_dir(fixture.root_path())
        .arg("--config")
        .arg(&config)
        .arg("--lang")
        .arg("cpp")
        .arg(&source)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("variable-resolution-failure"), "{stdout}");
}

#[test]
fn test_bad_config_is_reported() {
    let fixture = Fixture::new();
    fixture.add_file("cdom.toml", "jobs = -1\n");
    let source = fixture.add_file("a.c", "int a;\n");

    let output = cdom_index()
        .current_dir(fixture.root_path())
        .arg(&source)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cdom.toml"), "{stderr}");
}
