//! `expo-updates-crypto verify-legacy` - Verify a manifest against the publisher key.
//!
//! Without `--public-key` the key is fetched through the cached transport,
//! configured from `EXPO_UPDATES_KEY_*` variables.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::oneshot;

use expo_updates_crypto::{
    spawn_verify_expo_public_rsa_signature, verify_public_rsa_signature, HttpKeyTransport,
    RsaSignatureOutcome,
};

use super::{exit_code_for, read_text};
use crate::cli::args::VerifyLegacyArgs;
use crate::exit_codes;

pub async fn cmd_verify(args: VerifyLegacyArgs) -> i32 {
    let outcome = match run(&args).await {
        Ok(outcome) => outcome,
        Err(e) => {
            if !args.quiet {
                eprintln!("error: {e:#}");
            }
            return exit_code_for(&e);
        }
    };

    match outcome {
        RsaSignatureOutcome::Completed { is_valid: true } => {
            if !args.quiet {
                println!("Signature valid");
            }
            exit_codes::SUCCESS
        }
        RsaSignatureOutcome::Completed { is_valid: false } => {
            if !args.quiet {
                eprintln!("Signature invalid");
            }
            exit_codes::SIGNATURE_INVALID
        }
        RsaSignatureOutcome::Error {
            error,
            is_network_error,
        } => {
            if !args.quiet {
                if is_network_error {
                    eprintln!("error: could not fetch public key: {}", error);
                } else {
                    eprintln!("error: {}", error);
                }
            }
            error.exit_code()
        }
    }
}

async fn run(args: &VerifyLegacyArgs) -> Result<RsaSignatureOutcome> {
    let data = read_text(&args.file, "manifest")?;

    if let Some(path) = &args.public_key {
        let pem = read_text(path, "public key")?;
        let outcome = match verify_public_rsa_signature(&pem, &data, &args.signature) {
            Ok(is_valid) => RsaSignatureOutcome::Completed { is_valid },
            Err(error) => RsaSignatureOutcome::Error {
                is_network_error: error.is_network(),
                error,
            },
        };
        return Ok(outcome);
    }

    let transport = Arc::new(HttpKeyTransport::from_env()?);
    let (tx, rx) = oneshot::channel();
    spawn_verify_expo_public_rsa_signature(transport, data, args.signature.clone(), tx);

    rx.await
        .context("verification task ended without reporting an outcome")
}
