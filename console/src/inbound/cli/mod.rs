//! Command-line entry point over the console views.
//!
//! Each subcommand opens one view, performs one action and renders the
//! resulting state. Protected commands go through the navigation guard and
//! print [`render::SIGNED_OUT`] instead of running when no session exists.

pub mod render;

use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use clap::{Args, Parser, Subcommand, ValueEnum};
use zeroize::Zeroizing;

use crate::domain::activation::ACTIVATED_MESSAGE;
use crate::domain::ports::ConnectKind;
use crate::domain::{
    ActivationFlow, ActivationOutcome, CertType, CertificateWorkflow, ConsoleContext,
    ConsoleResult, DashboardView, DirectoryView, GuardOutcome, LoginFlow, LoginForm,
    LoginOutcome, Navigation, NavigationGuard, SigningForm, UploadForm,
};
use render::Rendered;

/// `portal-console` arguments.
#[derive(Debug, Parser)]
#[command(
    name = "portal-console",
    about = "Administer payer certificates and connections on the data exchange portal",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CertKind {
    Client,
    Server,
}

impl From<CertKind> for CertType {
    fn from(value: CertKind) -> Self {
        match value {
            CertKind::Client => Self::Client,
            CertKind::Server => Self::Server,
        }
    }
}

/// Search text and page number for list commands.
#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    /// Case-insensitive search text.
    #[arg(long, default_value = "")]
    pub search: String,
    /// 1-based page number.
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Sign in and store the session.
    Login {
        #[arg(long, value_name = "email")]
        username: String,
        /// Read from standard input when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session.
    Logout,
    /// Show the signed-in administrator.
    Whoami,
    /// List the payer directory.
    Payers(ListArgs),
    /// Connect to another payer by administrator email.
    Connect {
        email: String,
        /// Reconnect to a payer connected before.
        #[arg(long)]
        existing: bool,
    },
    /// Show certificate rows and verification state.
    Certs,
    /// Upload a certificate file for an endpoint.
    Upload {
        #[arg(long, value_name = "path")]
        file: PathBuf,
        #[arg(long, value_name = "url")]
        endpoint: String,
    },
    /// Ask the portal to generate a certificate.
    Generate {
        #[arg(value_enum)]
        cert_type: CertKind,
    },
    /// Submit a private key and certificate signing request.
    Csr {
        #[arg(value_enum)]
        cert_type: CertKind,
        #[arg(long, value_name = "path")]
        private_key: PathBuf,
        #[arg(long, value_name = "path")]
        csr: PathBuf,
    },
    /// Verify an uploaded certificate.
    Verify {
        #[arg(value_enum)]
        cert_type: CertKind,
    },
    /// Save a certificate payload as JSON.
    Download {
        #[arg(value_enum)]
        cert_type: CertKind,
    },
    /// Show headline counters, connections and activity.
    Dashboard(ListArgs),
    /// List established connections.
    Connections(ListArgs),
    /// Confirm an activation link.
    Activate {
        #[arg(long)]
        key: String,
        #[arg(long = "act-id")]
        act_id: String,
    },
}

/// Errors that stop a command before it reaches a view.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Console(#[from] crate::domain::Error),
}

/// Read a UTF-8 file through `cap_std`.
///
/// # Errors
///
/// Returns [`CliError::Read`] when the parent directory or file cannot be
/// opened.
pub fn read_text_file(path: &Path) -> Result<String, CliError> {
    let read_error = |source| CliError::Read {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .ok_or_else(|| read_error(io::Error::new(io::ErrorKind::InvalidInput, "not a file")))?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
    dir.read_to_string(name).map_err(read_error)
}

fn guarded<V>(navigation: Navigation<V>) -> Result<V, Rendered> {
    match navigation {
        Navigation::Render(view) => Ok(view),
        Navigation::RedirectToLogin => Err(Rendered::failed(render::SIGNED_OUT)),
    }
}

macro_rules! open_or_return {
    ($navigation:expr) => {
        match guarded($navigation) {
            Ok(view) => view,
            Err(rendered) => return Ok(rendered),
        }
    };
}

/// Run one command against the wired context.
///
/// `password` supplies the login password when the flag was omitted.
///
/// # Errors
///
/// Returns [`CliError`] for unreadable input files and for console errors
/// that are not part of a view's own status line.
pub async fn run(
    command: Command,
    context: ConsoleContext,
    password: impl FnOnce() -> io::Result<String>,
) -> Result<Rendered, CliError> {
    match command {
        Command::Login {
            username,
            password: flag,
        } => {
            let password = match flag {
                Some(password) => Zeroizing::new(password),
                None => Zeroizing::new(password().map_err(|source| CliError::Read {
                    path: PathBuf::from("<stdin>"),
                    source,
                })?),
            };
            login(context, LoginForm::new(username, password.trim_end().to_owned())).await
        }
        Command::Logout => {
            LoginFlow::new(context).logout()?;
            Ok(Rendered::ok("Signed out"))
        }
        Command::Whoami => Ok(match NavigationGuard::check(context.sessions.as_ref()) {
            GuardOutcome::Proceed(session) => Rendered::ok(render::session(&session)),
            GuardOutcome::RedirectToLogin => Rendered::failed(render::SIGNED_OUT),
        }),
        Command::Payers(list) => {
            let mut view = open_or_return!(DirectoryView::open(context));
            view.refresh().await;
            view.set_search(list.search);
            view.set_page(list.page);
            Ok(Rendered::ok(render::payers(&view.page(), view.status())))
        }
        Command::Connect { email, existing } => {
            let mut view = open_or_return!(DirectoryView::open(context));
            view.refresh().await;
            let kind = if existing {
                ConnectKind::Existing
            } else {
                ConnectKind::New
            };
            Ok(render::connect(view.connect(&email, kind).await))
        }
        Command::Certs => {
            let mut workflow = open_or_return!(CertificateWorkflow::open(context));
            workflow.refresh().await;
            Ok(Rendered::ok(render::certificates(&workflow)))
        }
        Command::Upload { file, endpoint } => {
            let certificate = read_text_file(&file)?;
            let mut workflow = open_or_return!(CertificateWorkflow::open(context));
            workflow.refresh().await;
            let form = UploadForm {
                certificate: Some(certificate),
                endpoint_url: endpoint,
            };
            Ok(render::outcome(workflow.upload(&form).await))
        }
        Command::Generate { cert_type } => {
            let mut workflow = open_or_return!(CertificateWorkflow::open(context));
            workflow.refresh().await;
            Ok(render::outcome(workflow.generate(cert_type.into()).await))
        }
        Command::Csr {
            cert_type,
            private_key,
            csr,
        } => {
            let form = SigningForm {
                private_key: Zeroizing::new(read_text_file(&private_key)?),
                csr: read_text_file(&csr)?,
            };
            let mut workflow = open_or_return!(CertificateWorkflow::open(context));
            workflow.refresh().await;
            Ok(render::outcome(
                workflow
                    .submit_certificate_request(cert_type.into(), &form)
                    .await,
            ))
        }
        Command::Verify { cert_type } => {
            let mut workflow = open_or_return!(CertificateWorkflow::open(context));
            workflow.refresh().await;
            Ok(render::outcome(workflow.verify(cert_type.into()).await))
        }
        Command::Download { cert_type } => {
            let mut workflow = open_or_return!(CertificateWorkflow::open(context));
            workflow.refresh().await;
            Ok(render::outcome(workflow.download(cert_type.into()).await))
        }
        Command::Dashboard(list) => {
            let mut view = open_or_return!(DashboardView::open(context));
            view.load().await;
            view.set_connection_search(list.search);
            view.set_connection_page(list.page);
            Ok(Rendered::ok(render::dashboard(&view)))
        }
        Command::Connections(list) => {
            let mut view = open_or_return!(DashboardView::open(context));
            view.load().await;
            view.set_connection_search(list.search);
            view.set_connection_page(list.page);
            Ok(Rendered::ok(render::connections(&view.connection_page())))
        }
        Command::Activate { key, act_id } => {
            let outcome = ActivationFlow::new(context).activate(&key, &act_id).await?;
            Ok(match outcome {
                ActivationOutcome::Activated => Rendered::ok(ACTIVATED_MESSAGE),
                ActivationOutcome::NotActivated(message) => Rendered::failed(message),
            })
        }
    }
}

async fn login(context: ConsoleContext, form: LoginForm) -> Result<Rendered, CliError> {
    let outcome: ConsoleResult<LoginOutcome> = LoginFlow::new(context).login(&form).await;
    Ok(match outcome? {
        LoginOutcome::Invalid(errors) => Rendered::failed(render::field_errors(&errors)),
        LoginOutcome::SignedIn(session) => {
            Rendered::ok(format!("Signed in as {}", render::session(&session)))
        }
    })
}
