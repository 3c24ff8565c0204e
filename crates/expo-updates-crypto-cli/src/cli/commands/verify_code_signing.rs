//! `expo-updates-crypto verify-code-signing` - Verify a code-signed body.

use anyhow::{Context, Result};

use expo_updates_crypto::{parse_signature_header, verify_code_signing};

use super::{exit_code_for, load_configuration};
use crate::cli::args::VerifyCodeSigningArgs;
use crate::exit_codes;

pub fn cmd_verify(args: VerifyCodeSigningArgs) -> i32 {
    match run(&args) {
        Ok(true) => {
            if !args.quiet {
                println!("Signature valid");
            }
            exit_codes::SUCCESS
        }
        Ok(false) => {
            if !args.quiet {
                eprintln!("Signature invalid");
            }
            exit_codes::SIGNATURE_INVALID
        }
        Err(e) => {
            if !args.quiet {
                eprintln!("error: {e:#}");
            }
            exit_code_for(&e)
        }
    }
}

fn run(args: &VerifyCodeSigningArgs) -> Result<bool> {
    let configuration = load_configuration(&args.certificate)?;
    let body = std::fs::read(&args.file)
        .with_context(|| format!("failed to read body: {}", args.file.display()))?;

    let info = parse_signature_header(Some(&args.signature_header))?;
    tracing::debug!(key_id = ?info.key_id, "decoded signature header");

    Ok(verify_code_signing(&configuration, &info, &body)?)
}
