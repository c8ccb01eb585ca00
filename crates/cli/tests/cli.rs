use assert_cmd::Command;

#[test]
fn help_lists_every_view() {
    let output = Command::cargo_bin("bookstore")
        .unwrap()
        .arg("--help")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["list", "show", "create", "edit", "delete", "--api-url"] {
        assert!(stdout.contains(command), "missing {command} in\n{stdout}");
    }
}

#[test]
fn empty_fields_are_rejected_before_any_request() {
    // Nothing listens on port 9; reaching the network would print an error
    // notice instead of the warning.
    let output = Command::cargo_bin("bookstore")
        .unwrap()
        .args([
            "--api-url",
            "http://127.0.0.1:9",
            "create",
            "--title",
            "",
            "--author",
            "Herbert",
            "--publish-year",
            "1965",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[warning] All fields are required"));
    assert!(!stderr.contains("[error]"));
}

#[test]
fn unknown_view_is_a_usage_error() {
    let output = Command::cargo_bin("bookstore")
        .unwrap()
        .args(["list", "--view", "grid"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
}
