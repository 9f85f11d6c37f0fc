//! Domain types, view controllers and ports.
//!
//! Purpose: hold console state and rules independently of HTTP, files and
//! the terminal. Views receive a [`ConsoleContext`] and reach the outside
//! world only through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: console error payload and category.
//! - Session: signed-in administrator identity.
//! - CertificateWorkflow, DirectoryView, DashboardView: protected views.
//! - LoginFlow, ActivationFlow: unguarded flows.
//! - NavigationGuard: session check in front of protected views.

pub mod activation;
pub mod auth;
pub mod certificate;
pub mod certificate_workflow;
pub mod context;
pub mod dashboard;
pub mod directory;
pub mod envelope;
pub mod error;
pub mod generation;
pub mod guard;
pub mod list;
pub mod login;
pub mod payer;
pub mod ports;
pub mod search;
pub mod session;
pub mod status;
pub mod validation;

pub use self::activation::{ActivationFlow, ActivationOutcome};
pub use self::auth::{LoginCredentials, LoginForm};
pub use self::certificate::{CertType, CertificateDetails, CertificateRecord, VerificationSummary};
pub use self::certificate_workflow::{ActionOutcome, CertificateWorkflow, SigningForm, UploadForm};
pub use self::context::{ConsoleContext, ViewOptions};
pub use self::dashboard::DashboardView;
pub use self::directory::{ConnectOutcome, DirectoryView};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::generation::RefreshOutcome;
pub use self::guard::{GuardOutcome, Navigation, NavigationGuard};
pub use self::login::{LoginFlow, LoginOutcome};
pub use self::payer::{PayerId, PayerRecord};
pub use self::session::Session;
pub use self::validation::{FieldError, FieldErrors};

/// Convenient console result alias.
pub type ConsoleResult<T> = Result<T, Error>;
