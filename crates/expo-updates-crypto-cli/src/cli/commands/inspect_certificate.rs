//! `expo-updates-crypto inspect-certificate` - Validate a code signing certificate.

use anyhow::Result;

use expo_updates_crypto::CodeSigningConfiguration;

use super::{exit_code_for, read_text};
use crate::cli::args::InspectCertificateArgs;
use crate::exit_codes;

pub fn cmd_inspect(args: InspectCertificateArgs) -> i32 {
    match run(&args) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            if args.json {
                let report = serde_json::json!({
                    "valid": false,
                    "error": e.to_string(),
                });
                println!("{}", report);
            } else {
                eprintln!("error: {e:#}");
            }
            exit_code_for(&e)
        }
    }
}

fn run(args: &InspectCertificateArgs) -> Result<()> {
    let text = read_text(&args.certificate, "certificate")?;
    let configuration = CodeSigningConfiguration::new(text, None);
    let certificate = configuration.embedded_certificate()?;
    let public_key = certificate.public_key()?;

    if args.json {
        let report = serde_json::json!({
            "valid": true,
            "subject": certificate.subject,
            "not_before": certificate.not_before.to_rfc3339(),
            "not_after": certificate.not_after.to_rfc3339(),
            "fingerprint": certificate.fingerprint,
            "key_bits": public_key.size() * 8,
            "key_fingerprint": public_key.fingerprint()?,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Certificate valid for code signing");
    println!();
    println!("  subject:     {}", certificate.subject);
    println!("  not_before:  {}", certificate.not_before.to_rfc3339());
    println!("  not_after:   {}", certificate.not_after.to_rfc3339());
    println!("  fingerprint: {}", certificate.fingerprint);
    println!("  key:         RSA {} bits", public_key.size() * 8);

    Ok(())
}
