//! Seed data for the local portal.
//!
//! Twelve payers so the console's directory spans two pages, one
//! administrator login per payer that has one, and a short activity history.

use chrono::{DateTime, Months, TimeDelta, Utc};

use crate::state::{
    Account, Activation, Activity, CertKind, Certificate, Connection, Directory, Payer,
};

/// `(payer_id, name, admin, email, city, state, zip)`
const PAYERS: [(&str, &str, &str, &str, &str, &str, &str); 12] = [
    ("P-1001", "Acme Health", "Ada Moreno", "ada@acme.test", "Austin", "TX", "73301"),
    ("P-1002", "Blue River Health", "Ben Okafor", "ops@blueriver.test", "Denver", "CO", "80202"),
    ("P-1003", "Cedar Care Alliance", "Chloe Park", "admin@cedarcare.test", "Portland", "OR", "97201"),
    ("P-1004", "Delta Mutual", "Dev Patel", "it@deltamutual.test", "Atlanta", "GA", "30301"),
    ("P-1005", "Evergreen Benefits", "Erin Walsh", "erin@evergreen.test", "Seattle", "WA", "98101"),
    ("P-1006", "Frontier Plans", "Femi Ade", "femi@frontier.test", "Omaha", "NE", "68102"),
    ("P-1007", "Granite State Health", "Gus Lind", "gus@granite.test", "Concord", "NH", "03301"),
    ("P-1008", "Harbor Shield", "Hana Ito", "hana@harborshield.test", "Boston", "MA", "02108"),
    ("P-1009", "Iris Medical Group", "Ivan Cruz", "ivan@iris.test", "Phoenix", "AZ", "85001"),
    ("P-1010", "Juniper Care", "Jo Reyes", "jo@juniper.test", "Boise", "ID", "83702"),
    ("P-1011", "Keystone Health Plan", "Kai Brooks", "kai@keystone.test", "Harrisburg", "PA", "17101"),
    ("P-1012", "Lakeside Assurance", "Lena Novak", "lena@lakeside.test", "Madison", "WI", "53703"),
];

/// Login password shared by every seeded administrator.
pub const DEMO_PASSWORD: &str = "passw0rd1";

/// Activation link accepted once by `verify/verify`.
pub const DEMO_ACTIVATION: (&str, &str) = ("welcome-key", "42");

/// Placeholder PEM body for seeded and generated certificates.
pub fn placeholder_pem(subject: &str, cert_type: CertKind) -> String {
    format!(
        "-----BEGIN CERTIFICATE-----\n{subject}-{cert_type}\n-----END CERTIFICATE-----\n"
    )
}

fn certificate(payer_id: &str, cert_type: CertKind, verified: bool, issued: DateTime<Utc>) -> Certificate {
    Certificate {
        payer_id: payer_id.to_owned(),
        cert_type,
        certificate_verified: verified,
        valid_from: issued,
        valid_until: issued.checked_add_months(Months::new(12)).unwrap_or(issued),
        pem: placeholder_pem(payer_id, cert_type),
    }
}

/// Build the seeded directory relative to `now`.
pub fn seed_directory(now: DateTime<Utc>) -> Directory {
    let payers: Vec<Payer> = PAYERS
        .iter()
        .map(|&(payer_id, payer_name, adm_name, adm_email, city, state, zip)| Payer {
            payer_id: payer_id.to_owned(),
            payer_name: payer_name.to_owned(),
            adm_name: adm_name.to_owned(),
            adm_email: adm_email.to_owned(),
            adm_phone: "555-0100".to_owned(),
            address1: "100 Main Street".to_owned(),
            address2: String::new(),
            city: city.to_owned(),
            state: state.to_owned(),
            zip: zip.to_owned(),
            endpoint: None,
            certificate_uploaded: false,
        })
        .collect();
    let accounts = payers
        .iter()
        .map(|payer| Account {
            email: payer.adm_email.clone(),
            password: DEMO_PASSWORD.to_owned(),
            display_name: payer.adm_name.clone(),
            payer_id: payer.payer_id.clone(),
        })
        .collect();

    let issued = now - TimeDelta::days(30);
    let certificates = vec![
        certificate("P-1001", CertKind::Client, false, issued),
        certificate("P-1002", CertKind::Client, true, issued),
        certificate("P-1002", CertKind::Server, true, issued),
        certificate("P-1004", CertKind::Client, true, issued),
        certificate("P-1004", CertKind::Server, true, issued),
        certificate("P-1005", CertKind::Server, false, issued),
    ];

    let connections = vec![
        Connection {
            payer_id: "P-1004".to_owned(),
            payer_name: "Delta Mutual".to_owned(),
            status: "active".to_owned(),
            trust_framework: "advanced".to_owned(),
            connected_on: (now - TimeDelta::days(21)).date_naive(),
        },
        Connection {
            payer_id: "P-1008".to_owned(),
            payer_name: "Harbor Shield".to_owned(),
            status: "pending".to_owned(),
            trust_framework: "intermediate".to_owned(),
            connected_on: (now - TimeDelta::days(2)).date_naive(),
        },
    ];

    let activity = vec![
        Activity {
            id: 1,
            description: "Uploaded a client certificate".to_owned(),
            actor: "Ada Moreno".to_owned(),
            occurred_at: now - TimeDelta::days(30),
        },
        Activity {
            id: 2,
            description: "Connected to Delta Mutual".to_owned(),
            actor: "Ben Okafor".to_owned(),
            occurred_at: now - TimeDelta::days(21),
        },
    ];

    Directory {
        accounts,
        payers,
        certificates,
        connections,
        activity,
        activations: vec![Activation {
            key: DEMO_ACTIVATION.0.to_owned(),
            act_id: DEMO_ACTIVATION.1.to_owned(),
            used: false,
        }],
    }
}
