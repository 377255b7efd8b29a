use anyhow::{Context, Result};
use std::process::ExitCode;
use wsync_reconcile::{validate_workspace, ConfigDir, ValidationReport};
use wsync_state::Settings;

/// Handle the `validate` command. Never contacts Slack.
pub(crate) fn handle_validate_command(settings: &Settings) -> Result<ExitCode> {
    println!("Validating workspace configuration...\n");
    let report = validate_workspace(&ConfigDir::new(&settings.workspace_dir))
        .context("Configuration error")?;
    print!("{}", render_validation(&report));
    Ok(ExitCode::SUCCESS)
}

fn render_validation(report: &ValidationReport) -> String {
    let mut out = String::new();
    for line in report.lines() {
        out.push_str(&line);
        out.push('\n');
    }
    if !report.warnings.is_empty() {
        out.push('\n');
        for warning in &report.warnings {
            out.push_str(&format!("Warning: {warning}\n"));
        }
    }
    out.push_str("\nConfiguration is valid!\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsync_test_utils::WorkspaceFixture;

    fn settings(fixture: &WorkspaceFixture) -> Settings {
        Settings::new(&fixture.workspace, "http://127.0.0.1:9/api", None)
    }

    #[test]
    fn valid_workspace_passes() {
        let fixture = WorkspaceFixture::new().unwrap();
        fixture
            .write_channels("channels:\n  - name: general\narchive: [old]\n")
            .unwrap();
        let code = handle_validate_command(&settings(&fixture)).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn broken_document_is_a_configuration_error() {
        let fixture = WorkspaceFixture::new().unwrap();
        fixture.write_bookmarks("bookmarks: nope\n").unwrap();
        let err = handle_validate_command(&settings(&fixture)).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.starts_with("Configuration error"), "{msg}");
        assert!(msg.contains("bookmarks.yaml"), "{msg}");
    }

    #[test]
    fn warnings_are_listed_before_the_verdict() {
        let report = ValidationReport {
            channels: 2,
            warnings: vec!["channel #a is defined more than once".to_string()],
            ..Default::default()
        };
        let out = render_validation(&report);
        assert!(out.contains("  Found 2 channel definitions\n"));
        let warning = out.find("Warning: channel #a").unwrap();
        let verdict = out.find("Configuration is valid!").unwrap();
        assert!(warning < verdict);
    }
}
