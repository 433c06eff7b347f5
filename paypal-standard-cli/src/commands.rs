//! Subcommand implementations.
//!
//! Each command returns the text to print on stdout; `main` owns process exit codes.

use std::path::Path;

use paypal_standard::{
    IntegrationError,
    config::IntegrationConfig,
    envelope::{Credentials, EnvelopeBuilder, load_certificate, load_private_key},
    form::{CheckoutRequest, FieldSet},
    mapping::MappingTable,
    notification::{NotificationVerifier, RecurringNotification},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::observability::{HealthCheck, HealthReport};

/// Errors surfaced by the command line.
#[derive(Debug, Error)]
pub enum CliError {
    /// Library failure.
    #[error(transparent)]
    Integration(#[from] IntegrationError),

    /// An input file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The order file is not a valid checkout request.
    #[error("invalid order file: {0}")]
    Order(#[from] toml::de::Error),

    /// Output could not be rendered.
    #[error("cannot render output: {0}")]
    Json(#[from] serde_json::Error),
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path)
        .map_err(|source| CliError::Io { path: path.display().to_string(), source })
}

/// `form` output. Serialized directly so `fields` keeps insertion order.
#[derive(Debug, Serialize)]
struct FormOutput<'a> {
    action: &'a str,
    fields: &'a FieldSet,
}

/// Builds the button fields for an order file, sealing them when `encrypt` is set.
#[instrument(skip(config), fields(order = %order_path.display()))]
pub fn form(config: &IntegrationConfig, order_path: &Path, encrypt: bool) -> Result<String, CliError> {
    let request: CheckoutRequest = toml::from_str(&read_file(order_path)?)?;

    let form = request.to_form(
        MappingTable::paypal(),
        &config.account,
        config.application_id.as_deref(),
    )?;

    let fields = if encrypt {
        EnvelopeBuilder::new(config.credentials.clone()).seal_form(form.form_fields())?
    } else {
        form.into_fields()
    };
    info!(fields = fields.len(), encrypt, "built payment form");

    let output = FormOutput { action: config.service_url(), fields: &fields };
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Outcome of `verify`.
#[derive(Debug)]
pub struct VerifyOutcome {
    /// Whether PayPal confirmed the notification.
    pub verified: bool,
    /// JSON summary for stdout.
    pub output: String,
}

/// Parses and acknowledges a raw notification body.
#[instrument(skip_all, fields(body_len = body.len()))]
pub async fn verify(config: &IntegrationConfig, body: Vec<u8>) -> Result<VerifyOutcome, CliError> {
    let notification = RecurringNotification::parse(body)?;
    let verifier = NotificationVerifier::from_config(config)?;
    let verified = verifier.acknowledge(&notification).await?;

    let output = serde_json::json!({
        "verified": verified,
        "txn_type": notification.transaction_type(),
        "subscription_id": notification.subscription_id(),
        "item_id": notification.item_id(),
        "invoice": notification.invoice(),
        "gross": notification.gross(),
        "currency": notification.currency(),
        "payer_status": notification.status(),
        "test": notification.is_test(),
    });
    Ok(VerifyOutcome { verified, output: serde_json::to_string_pretty(&output)? })
}

/// Checks that the configured account and credentials are usable.
#[must_use]
pub fn check(config: &IntegrationConfig) -> HealthReport {
    let credentials = &config.credentials;
    let mut checks = Vec::new();

    checks.push(if config.account.trim().is_empty() {
        HealthCheck::fail("account", "no merchant account configured")
    } else {
        HealthCheck::pass_with_message("account", config.account.clone())
    });

    checks.push(match credentials.cert_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => HealthCheck::pass_with_message("cert_id", id),
        _ => HealthCheck::warn("cert_id", "not configured; encrypted buttons unavailable"),
    });

    let files = [
        ("merchant_certificate", credentials.pubcert_path()),
        ("paypal_certificate", credentials.paypal_cert_path()),
    ];
    for (name, path) in files {
        checks.push(match load_certificate(&path) {
            Ok(_) => HealthCheck::pass_with_message(name, path.display().to_string()),
            Err(e) => HealthCheck::warn(name, e.to_string()),
        });
    }

    let key_path = credentials.prvkey_path();
    checks.push(match load_private_key(&key_path, &credentials.prvkey_passphrase) {
        Ok(_) => HealthCheck::pass_with_message("merchant_key", key_path.display().to_string()),
        Err(e) => HealthCheck::warn("merchant_key", e.to_string()),
    });

    if let Ok(loaded) = Credentials::load(credentials) {
        checks.push(if loaded.key_matches_certificate() {
            HealthCheck::pass_with_message("key_pair", "merchant key matches certificate")
        } else {
            HealthCheck::fail("key_pair", "merchant key does not match merchant certificate")
        });
    }

    HealthReport::new(config.service_url(), checks)
}
