use anyhow::{Context, Result};
use std::path::Path;

use expo_updates_crypto::{CodeSigningConfiguration, CryptoError};

use super::args::{CertificateArgs, Cli, Command};
use crate::exit_codes;

pub mod accept_header;
pub mod inspect_certificate;
pub mod verify_code_signing;
pub mod verify_legacy;

pub async fn dispatch(cli: Cli) -> Result<i32> {
    match cli.cmd {
        Command::AcceptHeader(args) => Ok(accept_header::cmd_accept_header(args)),
        Command::InspectCertificate(args) => Ok(inspect_certificate::cmd_inspect(args)),
        Command::VerifyCodeSigning(args) => Ok(verify_code_signing::cmd_verify(args)),
        Command::VerifyLegacy(args) => Ok(verify_legacy::cmd_verify(args).await),
    }
}

/// Exit code for a failed command, preferring the library's classification.
pub(crate) fn exit_code_for(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<CryptoError>()
        .map(CryptoError::exit_code)
        .unwrap_or(exit_codes::USAGE_ERROR)
}

pub(crate) fn read_text(path: &Path, what: &str) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}: {}", what, path.display()))
}

pub(crate) fn load_configuration(args: &CertificateArgs) -> Result<CodeSigningConfiguration> {
    let certificate = read_text(&args.certificate, "certificate")?;
    let configuration = match &args.metadata {
        Some(metadata) => CodeSigningConfiguration::from_metadata_json(certificate, metadata)?,
        None => CodeSigningConfiguration::new(certificate, None),
    };
    Ok(configuration)
}
