//! Behaviour tests for guarded views, form validation and inert actions.
//!
//! The portal is a `MockPortalApi` rebuilt from the world's seeded rows each
//! time a view opens; every mutating call bumps a counter so scenarios can
//! assert that nothing was sent.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use portal_console::domain::auth::PASSWORD_FIELD;
use portal_console::domain::directory::UNVERIFIED_REASON;
use portal_console::domain::ports::{
    ConnectKind, InMemorySessionStore, LoginIdentity, MockDownloadSink, MockPortalApi,
    VerificationReply,
};
use portal_console::domain::{
    ActionOutcome, CertType, CertificateDetails, CertificateRecord, CertificateWorkflow,
    ConnectOutcome, ConsoleContext, DirectoryView, LoginFlow, LoginForm, LoginOutcome,
    Navigation, PayerId, PayerRecord, Session, UploadForm,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tokio::runtime::Runtime;

struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2026, 2, 2, 8, 30, 0)
            .single()
            .expect("valid start time");
        Self(Mutex::new(start))
    }

    fn advance(&self, by: TimeDelta) {
        *self.0.lock().expect("clock mutex") += by;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock mutex")
    }
}

#[derive(Default)]
struct Calls(Mutex<HashMap<&'static str, Arc<AtomicUsize>>>);

impl Calls {
    fn counter(&self, kind: &'static str) -> Arc<AtomicUsize> {
        self.0
            .lock()
            .expect("calls mutex")
            .entry(kind)
            .or_default()
            .clone()
    }

    fn count(&self, kind: &str) -> usize {
        self.0
            .lock()
            .expect("calls mutex")
            .get(kind)
            .map_or(0, |counter| counter.load(Ordering::SeqCst))
    }
}

struct ConsoleWorld {
    runtime: Runtime,
    clock: Arc<MutableClock>,
    store: RefCell<Arc<InMemorySessionStore>>,
    certificates: RefCell<Vec<CertificateRecord>>,
    payers: RefCell<Vec<PayerRecord>>,
    calls: Arc<Calls>,
    login: RefCell<Option<LoginOutcome>>,
    workflow: RefCell<Option<CertificateWorkflow>>,
    directory: RefCell<Option<DirectoryView>>,
    redirected: RefCell<bool>,
    action: RefCell<Option<ActionOutcome>>,
    connect: RefCell<Option<ConnectOutcome>>,
}

impl ConsoleWorld {
    fn new() -> Self {
        Self {
            runtime: tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("runtime"),
            clock: Arc::new(MutableClock::new()),
            store: RefCell::new(Arc::new(InMemorySessionStore::default())),
            certificates: RefCell::new(Vec::new()),
            payers: RefCell::new(Vec::new()),
            calls: Arc::new(Calls::default()),
            login: RefCell::new(None),
            workflow: RefCell::new(None),
            directory: RefCell::new(None),
            redirected: RefCell::new(false),
            action: RefCell::new(None),
            connect: RefCell::new(None),
        }
    }

    fn portal(&self) -> MockPortalApi {
        let mut api = MockPortalApi::new();
        let certificates = self.certificates.borrow().clone();
        api.expect_fetch_certificate_details().returning(move |_| {
            Ok(CertificateDetails {
                records: certificates.clone(),
                endpoint: None,
            })
        });
        let payers = self.payers.borrow().clone();
        api.expect_fetch_all_payers()
            .returning(move || Ok(payers.clone()));

        let login = self.calls.counter("login");
        api.expect_validate_login().returning(move |_| {
            login.fetch_add(1, Ordering::SeqCst);
            Ok(LoginIdentity {
                display_name: "Ada".to_owned(),
                email: "ada@acme.test".to_owned(),
                payer_id: "P-1".to_owned(),
            })
        });
        let generate = self.calls.counter("generate");
        api.expect_generate_certificate().returning(move |_| {
            generate.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let verify = self.calls.counter("verify");
        api.expect_verify_certificate().returning(move |_, _| {
            verify.fetch_add(1, Ordering::SeqCst);
            Ok(VerificationReply {
                passed: true,
                message: "verified".to_owned(),
            })
        });
        let upload = self.calls.counter("upload");
        api.expect_upload_certificate().returning(move |_| {
            upload.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let connect = self.calls.counter("connect");
        api.expect_connect_payer().returning(move |_| {
            connect.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        api
    }

    fn context(&self) -> ConsoleContext {
        ConsoleContext::new(
            Arc::new(self.portal()),
            self.store.borrow().clone(),
            Arc::new(MockDownloadSink::new()),
            self.clock.clone(),
        )
    }

    fn with_workflow<T>(&self, f: impl FnOnce(&mut CertificateWorkflow) -> T) -> T {
        let mut slot = self.workflow.borrow_mut();
        let workflow = slot.as_mut().expect("certificate view should be open");
        f(workflow)
    }

    fn ensure_directory(&self) {
        if self.directory.borrow().is_some() {
            return;
        }
        let Navigation::Render(mut view) = DirectoryView::open(self.context()) else {
            panic!("directory should open for a signed-in administrator");
        };
        self.runtime.block_on(view.refresh());
        *self.directory.borrow_mut() = Some(view);
    }
}

fn payer(id: &str, name: &str, email: &str, verified_count: u32) -> PayerRecord {
    PayerRecord {
        payer_id: PayerId::new(id).expect("payer id"),
        payer_name: name.to_owned(),
        admin_name: "Admin".to_owned(),
        admin_email: email.to_owned(),
        admin_phone: String::new(),
        address_line1: "1 Main St".to_owned(),
        address_line2: String::new(),
        city: "Springfield".to_owned(),
        state: "IL".to_owned(),
        zip: "62701".to_owned(),
        certificate_uploaded: verified_count > 0,
        certificate_verified: verified_count == 2,
        verified_count,
    }
}

#[fixture]
fn world() -> ConsoleWorld {
    ConsoleWorld::new()
}

#[given("a signed-out administrator")]
fn a_signed_out_administrator(world: &ConsoleWorld) {
    *world.store.borrow_mut() = Arc::new(InMemorySessionStore::default());
}

#[given("a signed-in administrator")]
fn a_signed_in_administrator(world: &ConsoleWorld) {
    let session = Session::try_from_parts("Ada", "ada@acme.test", "P-1").expect("session");
    *world.store.borrow_mut() = Arc::new(InMemorySessionStore::with_session(&session));
}

#[given("the portal holds an unverified client certificate")]
fn the_portal_holds_an_unverified_client_certificate(world: &ConsoleWorld) {
    world.certificates.borrow_mut().push(CertificateRecord {
        payer_id: PayerId::new("P-1").expect("payer id"),
        cert_type: CertType::Client,
        certificate_verified: false,
        valid_from: None,
        valid_until: None,
    });
}

#[given("the directory lists Blue River and Cedar Care")]
fn the_directory_lists_blue_river_and_cedar_care(world: &ConsoleWorld) {
    *world.payers.borrow_mut() = vec![
        payer("P-1", "Acme Health", "ada@acme.test", 2),
        payer("P-2", "Blue River", "ops@blueriver.test", 2),
        payer("P-3", "Cedar Care", "ops@cedar.test", 1),
    ];
}

#[given("the directory lists no payers")]
fn the_directory_lists_no_payers(world: &ConsoleWorld) {
    world.payers.borrow_mut().clear();
}

#[when("the administrator logs in as {email} with password {password}")]
fn the_administrator_logs_in(world: &ConsoleWorld, email: String, password: String) {
    let flow = LoginFlow::new(world.context());
    let outcome = world
        .runtime
        .block_on(flow.login(&LoginForm::new(email, password)))
        .expect("login should not fail at the portal");
    *world.login.borrow_mut() = Some(outcome);
}

#[when("the administrator opens the certificate view")]
fn the_administrator_opens_the_certificate_view(world: &ConsoleWorld) {
    match CertificateWorkflow::open(world.context()) {
        Navigation::Render(mut workflow) => {
            world.runtime.block_on(workflow.refresh());
            *world.workflow.borrow_mut() = Some(workflow);
        }
        Navigation::RedirectToLogin => *world.redirected.borrow_mut() = true,
    }
}

#[when("the administrator generates a client certificate")]
fn the_administrator_generates_a_client_certificate(world: &ConsoleWorld) {
    let outcome =
        world.with_workflow(|workflow| world.runtime.block_on(workflow.generate(CertType::Client)));
    *world.action.borrow_mut() = Some(outcome);
}

#[when("the administrator verifies the server certificate")]
fn the_administrator_verifies_the_server_certificate(world: &ConsoleWorld) {
    let outcome =
        world.with_workflow(|workflow| world.runtime.block_on(workflow.verify(CertType::Server)));
    *world.action.borrow_mut() = Some(outcome);
}

#[when("the administrator uploads a certificate for {endpoint}")]
fn the_administrator_uploads_a_certificate(world: &ConsoleWorld, endpoint: String) {
    let form = UploadForm {
        certificate: Some("-----BEGIN CERTIFICATE-----".to_owned()),
        endpoint_url: endpoint,
    };
    let outcome = world.with_workflow(|workflow| world.runtime.block_on(workflow.upload(&form)));
    *world.action.borrow_mut() = Some(outcome);
}

#[when("{seconds} seconds pass")]
fn seconds_pass(world: &ConsoleWorld, seconds: i64) {
    world.clock.advance(TimeDelta::seconds(seconds));
}

#[when("the administrator opens the directory")]
fn the_administrator_opens_the_directory(world: &ConsoleWorld) {
    world.ensure_directory();
}

#[when("the administrator searches the directory for {text}")]
fn the_administrator_searches_the_directory(world: &ConsoleWorld, text: String) {
    world.ensure_directory();
    if let Some(view) = world.directory.borrow_mut().as_mut() {
        view.set_search(text);
    }
}

#[when("the administrator connects to {email}")]
fn the_administrator_connects_to(world: &ConsoleWorld, email: String) {
    world.ensure_directory();
    let mut slot = world.directory.borrow_mut();
    let view = slot.as_mut().expect("directory open");
    let outcome = world.runtime.block_on(view.connect(&email, ConnectKind::New));
    *world.connect.borrow_mut() = Some(outcome);
}

#[then("the password field reports {message}")]
fn the_password_field_reports(world: &ConsoleWorld, message: String) {
    let login = world.login.borrow();
    let Some(LoginOutcome::Invalid(errors)) = login.as_ref() else {
        panic!("expected an invalid login form");
    };
    assert_eq!(errors.message_for(PASSWORD_FIELD), Some(message.as_str()));
}

#[then("the portal received {count} {kind} requests")]
fn the_portal_received_requests(world: &ConsoleWorld, count: usize, kind: String) {
    assert_eq!(world.calls.count(&kind), count, "{kind} requests");
}

#[then("the console redirects to the login screen")]
fn the_console_redirects_to_the_login_screen(world: &ConsoleWorld) {
    assert!(*world.redirected.borrow());
    assert!(world.workflow.borrow().is_none());
}

#[then("the action is disabled")]
fn the_action_is_disabled(world: &ConsoleWorld) {
    assert_eq!(world.action.borrow().as_ref(), Some(&ActionOutcome::Disabled));
}

#[then("the status reads {text}")]
fn the_status_reads(world: &ConsoleWorld, text: String) {
    let shown = world.with_workflow(|workflow| workflow.status().text().map(str::to_owned));
    assert_eq!(shown.as_deref(), Some(text.as_str()));
}

#[then("the status is empty")]
fn the_status_is_empty(world: &ConsoleWorld) {
    assert!(world.with_workflow(|workflow| workflow.status().current().is_none()));
}

#[then("{count} payer is shown")]
fn payers_are_shown(world: &ConsoleWorld, count: usize) {
    let directory = world.directory.borrow();
    let page = directory.as_ref().expect("directory open").page();
    assert_eq!(page.rows.len(), count);
}

#[then("the directory shows {message}")]
fn the_directory_shows(world: &ConsoleWorld, message: String) {
    let directory = world.directory.borrow();
    let page = directory.as_ref().expect("directory open").page();
    assert!(page.rows.is_empty());
    assert_eq!(page.empty_message, Some(message));
}

#[then("the directory hides its page controls")]
fn the_directory_hides_its_page_controls(world: &ConsoleWorld) {
    let directory = world.directory.borrow();
    let page = directory.as_ref().expect("directory open").page();
    assert!(!page.show_controls);
    assert!(page.buttons.is_empty());
}

#[then("the connection is blocked because certificates are unverified")]
fn the_connection_is_blocked(world: &ConsoleWorld) {
    assert_eq!(
        world.connect.borrow().as_ref(),
        Some(&ConnectOutcome::Blocked {
            reason: UNVERIFIED_REASON.to_owned()
        })
    );
}

#[scenario(
    path = "tests/features/console_flows.feature",
    name = "A short password is rejected before the portal is called"
)]
fn short_password_is_rejected(world: ConsoleWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/console_flows.feature",
    name = "Protected views redirect when nobody is signed in"
)]
fn protected_views_redirect(world: ConsoleWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/console_flows.feature",
    name = "Generate is inert once a certificate of that type exists"
)]
fn generate_is_inert(world: ConsoleWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/console_flows.feature",
    name = "Verify is inert when no certificate of that type exists"
)]
fn verify_is_inert(world: ConsoleWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/console_flows.feature",
    name = "A successful upload shows a status that clears on its own"
)]
fn upload_status_clears(world: ConsoleWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/console_flows.feature",
    name = "Directory search filters payers and explains empty results"
)]
fn directory_search_filters(world: ConsoleWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/console_flows.feature",
    name = "An empty directory quotes the blank search and hides paging"
)]
fn empty_directory_hides_paging(world: ConsoleWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/console_flows.feature",
    name = "Connecting to an unverified payer is blocked"
)]
fn connecting_to_unverified_payer_is_blocked(world: ConsoleWorld) {
    drop(world);
}
