// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use mailer_core::{MailerError, Recipient};
use mailer_template::{load_template, DEFAULT_SUBJECT};

const WELCOME: &str = "---\nsubject: Welcome, {{ name }}\n---\n<h1>Hello {{ name }}</h1>\n";

#[test]
fn loads_by_name_from_templates_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("welcome.html"), WELCOME).unwrap();

    let template = load_template("welcome", dir.path()).unwrap();
    assert_eq!(template.subject, "Welcome, {{ name }}");

    let rendered = template
        .render(&Recipient::new("bob@example.com").with_name("Bob"))
        .unwrap();
    assert_eq!(rendered.subject, "Welcome, Bob");
    assert_eq!(rendered.html, "<h1>Hello Bob</h1>\n");
}

#[test]
fn loads_by_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.htm");
    std::fs::write(&path, "<p>no front matter</p>").unwrap();

    let other_dir = tempfile::tempdir().unwrap();
    let template = load_template(path.to_str().unwrap(), other_dir.path()).unwrap();
    assert_eq!(template.subject, DEFAULT_SUBJECT);
    assert_eq!(template.body, "<p>no front matter</p>");
}

#[test]
fn missing_template_reports_the_resolved_path() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_template("nope", dir.path()).unwrap_err();

    assert!(matches!(err, MailerError::Template { .. }));
    assert!(err.to_string().contains("nope.html"), "got: {err}");
}
