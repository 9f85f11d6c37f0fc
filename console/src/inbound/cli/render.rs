//! Plain-text rendering of view state for the terminal.

use pagination::PageButton;

use crate::domain::certificate_workflow::{GenerateState, VerifyState};
use crate::domain::dashboard::{ConnectionEntry, DashboardView};
use crate::domain::list::ListPage;
use crate::domain::status::{StatusBoard, StatusTone};
use crate::domain::{
    ActionOutcome, CertType, CertificateWorkflow, ConnectOutcome, FieldErrors, PayerRecord,
    Session,
};

/// Text printed for a command plus whether it counts as success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub success: bool,
}

impl Rendered {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            success: true,
        }
    }

    pub fn failed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            success: false,
        }
    }
}

/// Message printed when a protected command runs without a session.
pub const SIGNED_OUT: &str = "Not signed in. Run `portal-console login` first.";

pub fn session(session: &Session) -> String {
    format!(
        "{} <{}> payer {}",
        session.display_name(),
        session.email(),
        session.payer_id()
    )
}

pub fn field_errors(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|error| format!("{}: {}", error.field.as_str(), error.message))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn outcome(outcome: ActionOutcome) -> Rendered {
    match outcome {
        ActionOutcome::Disabled => Rendered::failed("That action is not available right now."),
        ActionOutcome::InFlight => Rendered::failed("Another request is still running."),
        ActionOutcome::Invalid(errors) => Rendered::failed(field_errors(&errors)),
        ActionOutcome::Succeeded(text) => Rendered::ok(text),
        ActionOutcome::Failed(text) => Rendered::failed(text),
    }
}

pub fn connect(outcome: ConnectOutcome) -> Rendered {
    match outcome {
        ConnectOutcome::Blocked { reason } => Rendered::failed(reason),
        ConnectOutcome::Connected { progress } => Rendered::ok(progress.join("\n")),
        ConnectOutcome::Failed {
            mut progress,
            message,
        } => {
            progress.push(message);
            Rendered::failed(progress.join("\n"))
        }
    }
}

fn push_line(out: &mut String, text: impl AsRef<str>) {
    out.push_str(text.as_ref());
    out.push('\n');
}

fn status_line(out: &mut String, status: &StatusBoard) {
    if let Some(message) = status.current() {
        let marker = match message.tone {
            StatusTone::Info => "",
            StatusTone::Success => "ok: ",
            StatusTone::Error => "error: ",
        };
        push_line(out, format!("{marker}{}", message.text));
    }
}

fn footer<T>(out: &mut String, page: &ListPage<T>) {
    if !page.show_controls {
        return;
    }
    let buttons = page
        .buttons
        .iter()
        .map(|button| match button {
            PageButton::Page(number) if *number == page.number => format!("[{number}]"),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ");
    push_line(
        out,
        format!(
            "page {} of {} ({} rows)  {buttons}",
            page.number, page.total_pages, page.total_items
        ),
    );
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

pub fn payers(page: &ListPage<PayerRecord>, status: &StatusBoard) -> String {
    let mut out = String::new();
    status_line(&mut out, status);
    if let Some(empty) = &page.empty_message {
        push_line(&mut out, empty);
        return out;
    }
    for payer in &page.rows {
        push_line(
            &mut out,
            format!(
                "{:<10} {:<28} {:<28} {}, {} verified={}",
                payer.payer_id,
                payer.payer_name,
                payer.admin_email,
                payer.city,
                payer.state,
                yes_no(payer.is_fully_verified()),
            ),
        );
    }
    footer(&mut out, page);
    out
}

fn generate_label(state: GenerateState) -> &'static str {
    match state {
        GenerateState::Idle => "",
        GenerateState::Generating => " (generating)",
        GenerateState::Generated => " (generated)",
        GenerateState::Failed => " (generation failed)",
    }
}

fn verify_label(state: VerifyState) -> &'static str {
    match state {
        VerifyState::Idle | VerifyState::Verified => "",
        VerifyState::VerifyPending => " (verifying)",
        VerifyState::VerifyFailed => " (verification failed)",
    }
}

pub fn certificates(workflow: &CertificateWorkflow) -> String {
    let mut out = String::new();
    status_line(&mut out, workflow.status());
    let summary = workflow.summary();
    push_line(
        &mut out,
        format!(
            "verified types: {} of 2{}",
            summary.verified_types(),
            if summary.is_fully_verified() { " (ready to connect)" } else { "" }
        ),
    );
    if let Some(endpoint) = workflow.endpoint() {
        push_line(&mut out, format!("endpoint: {endpoint}"));
    }
    for cert_type in CertType::ALL {
        let row = match workflow.record(cert_type) {
            Some(record) => {
                let validity = match (record.valid_from, record.valid_until) {
                    (Some(from), Some(until)) => format!(
                        " valid {} to {}",
                        from.format("%Y-%m-%d"),
                        until.format("%Y-%m-%d")
                    ),
                    _ => String::new(),
                };
                format!(
                    "{cert_type:<6} present verified={}{validity}{}",
                    yes_no(record.certificate_verified),
                    verify_label(workflow.verify_state(cert_type)),
                )
            }
            None => format!(
                "{cert_type:<6} missing{}",
                generate_label(workflow.generate_state(cert_type))
            ),
        };
        push_line(&mut out, row);
    }
    out
}

pub fn connections(page: &ListPage<ConnectionEntry>) -> String {
    let mut out = String::new();
    if let Some(empty) = &page.empty_message {
        push_line(&mut out, empty);
        return out;
    }
    for entry in &page.rows {
        push_line(
            &mut out,
            format!(
                "{:<10} {:<28} {:<10} {:<12} {}",
                entry.payer_id,
                entry.payer_name,
                entry.status,
                entry.trust_framework,
                entry.connected_on
            ),
        );
    }
    footer(&mut out, page);
    out
}

pub fn dashboard(view: &DashboardView) -> String {
    let mut out = String::new();
    status_line(&mut out, view.status());
    push_line(&mut out, format!("signed in as {}", session(view.session())));
    if let Some(stats) = view.stats() {
        push_line(
            &mut out,
            format!(
                "payers {}  connections {}  pending {}  verified certificates {}",
                stats.total_payers,
                stats.active_connections,
                stats.pending_requests,
                stats.verified_certificates
            ),
        );
    }
    out.push_str("\nconnections\n");
    out.push_str(&connections(&view.connection_page()));
    out.push_str("\nrecent activity\n");
    for entry in view.activity() {
        push_line(
            &mut out,
            format!(
                "{} {} ({})",
                entry.occurred_at.format("%Y-%m-%d %H:%M"),
                entry.description,
                entry.actor
            ),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ActionOutcome::Succeeded("done".to_owned()), true)]
    #[case(ActionOutcome::Disabled, false)]
    #[case(ActionOutcome::Failed("nope".to_owned()), false)]
    fn outcomes_map_to_exit_status(#[case] input: ActionOutcome, #[case] success: bool) {
        assert_eq!(outcome(input).success, success);
    }

    #[test]
    fn failed_connects_list_progress_then_the_error() {
        let rendered = connect(ConnectOutcome::Failed {
            progress: vec!["Connecting...".to_owned()],
            message: "refused".to_owned(),
        });
        assert_eq!(rendered, Rendered::failed("Connecting...\nrefused"));
    }

    #[test]
    fn single_page_lists_have_no_footer() {
        let page = ListPage::<ConnectionEntry> {
            rows: Vec::new(),
            number: 1,
            total_pages: 1,
            total_items: 0,
            buttons: Vec::new(),
            show_controls: false,
            empty_message: Some("No results found for 'zz'".to_owned()),
        };
        assert_eq!(connections(&page), "No results found for 'zz'\n");
    }

    #[test]
    fn status_and_empty_row_print_on_separate_lines() {
        let mut status = StatusBoard::new(
            std::sync::Arc::new(crate::domain::status::test_clock::MutableClock::new()),
            std::time::Duration::from_secs(1),
        );
        status.show(StatusTone::Error, "portal unreachable");
        let page = ListPage::<PayerRecord> {
            rows: Vec::new(),
            number: 1,
            total_pages: 0,
            total_items: 0,
            buttons: Vec::new(),
            show_controls: false,
            empty_message: Some("No results found for ''".to_owned()),
        };
        assert_eq!(
            payers(&page, &status),
            "error: portal unreachable\nNo results found for ''\n"
        );
    }

    #[test]
    fn current_page_is_bracketed() {
        let page = ListPage::<ConnectionEntry> {
            rows: Vec::new(),
            number: 2,
            total_pages: 3,
            total_items: 25,
            buttons: vec![PageButton::Page(1), PageButton::Page(2), PageButton::Page(3)],
            show_controls: true,
            empty_message: None,
        };
        let mut out = String::new();
        footer(&mut out, &page);
        assert_eq!(out, "page 2 of 3 (25 rows)  1 [2] 3\n");
    }
}
