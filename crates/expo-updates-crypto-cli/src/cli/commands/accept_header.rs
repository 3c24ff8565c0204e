//! `expo-updates-crypto accept-header` - Print the signature capability header.

use anyhow::Result;

use expo_updates_crypto::{create_accept_signature_header, EXPO_EXPECT_SIGNATURE_HEADER};

use super::{exit_code_for, load_configuration};
use crate::cli::args::CertificateArgs;
use crate::exit_codes;

pub fn cmd_accept_header(args: CertificateArgs) -> i32 {
    match run(&args) {
        Ok(value) => {
            println!("{}: {}", EXPO_EXPECT_SIGNATURE_HEADER, value);
            exit_codes::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            exit_code_for(&e)
        }
    }
}

fn run(args: &CertificateArgs) -> Result<String> {
    let configuration = load_configuration(args)?;
    Ok(create_accept_signature_header(&configuration)?)
}
