use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "expo-updates-crypto",
    version,
    about = "Verify the authenticity of over-the-air updates"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the expo-expect-signature value for an embedded certificate
    AcceptHeader(CertificateArgs),
    /// Validate a code signing certificate and print its details
    InspectCertificate(InspectCertificateArgs),
    /// Verify a response body against an expo-signature header
    VerifyCodeSigning(VerifyCodeSigningArgs),
    /// Verify a manifest signed with the remote publisher key
    VerifyLegacy(VerifyLegacyArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CertificateArgs {
    /// Code signing certificate (PEM)
    #[arg(long)]
    pub certificate: PathBuf,

    /// Code signing metadata as a JSON object, e.g. '{"keyid":"main"}'
    #[arg(long)]
    pub metadata: Option<String>,
}

#[derive(Args, Debug)]
pub struct InspectCertificateArgs {
    /// Code signing certificate (PEM)
    pub certificate: PathBuf,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct VerifyCodeSigningArgs {
    #[command(flatten)]
    pub certificate: CertificateArgs,

    /// Response body that was signed
    #[arg(long)]
    pub file: PathBuf,

    /// Raw expo-signature header value
    #[arg(long, env = "EXPO_SIGNATURE")]
    pub signature_header: String,

    /// Quiet mode - only exit code, no output
    #[arg(long, short)]
    pub quiet: bool,
}

#[derive(Args, Debug)]
pub struct VerifyLegacyArgs {
    /// Manifest text that was signed
    #[arg(long)]
    pub file: PathBuf,

    /// Base64 RSA-SHA256 signature
    #[arg(long)]
    pub signature: String,

    /// Verify against a local public key (PEM) instead of fetching it
    #[arg(long)]
    pub public_key: Option<PathBuf>,

    /// Quiet mode - only exit code, no output
    #[arg(long, short)]
    pub quiet: bool,
}
