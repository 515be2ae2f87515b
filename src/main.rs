// Secure QR decoder command line
// Reads the decimal integer from a QR scan and prints the decoded record

use aadhaar_qr::{
    Contact, ExtractedSecureQrData, ExtractorConfig, SecureQrError, SecureQrExtractor,
};
use clap::Parser;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "aadhaar-qr", version, about = "Decode Secure QR identity payloads")]
struct Cli {
    /// Decimal integer read from the QR code ("-" or omitted reads stdin)
    input: Option<String>,

    /// Read the integer from a file instead
    #[arg(short, long, conflicts_with = "input")]
    file: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, env = "AADHAAR_QR_CONFIG")]
    config: Option<PathBuf>,

    /// Override the JPEG quality of the re-encoded photograph
    #[arg(long)]
    jpeg_quality: Option<u8>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Print a human-readable report instead of JSON
    #[arg(long)]
    report: bool,

    /// Write the photograph as JPEG to this path
    #[arg(long)]
    photo_out: Option<PathBuf>,

    /// Check an email address against the embedded hash
    #[arg(long)]
    verify_email: Option<String>,

    /// Check a mobile number against the embedded hash
    #[arg(long)]
    verify_mobile: Option<String>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error decoding Secure QR data: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn run(cli: &Cli) -> Result<(), SecureQrError> {
    let mut config = match &cli.config {
        Some(path) => ExtractorConfig::from_file(path)?,
        None => ExtractorConfig::default(),
    };
    if let Some(quality) = cli.jpeg_quality {
        config.jpeg_quality = quality;
    }

    let extractor = SecureQrExtractor::with_config(config)?;
    let data = extractor.extract_str(&read_input(cli)?)?;

    if cli.report {
        print_detailed_report(&data);
    } else {
        println!("{}", data.to_json_string(cli.pretty)?);
    }

    if let Some(path) = &cli.photo_out {
        fs::write(path, &data.image.jpeg)?;
        log::info!("Wrote photograph to {}", path.display());
    }

    if let Some(email) = &cli.verify_email {
        report_verification(&data.contact_info.email, email, cli.report);
    }
    if let Some(mobile) = &cli.verify_mobile {
        report_verification(&data.contact_info.mobile, mobile, cli.report);
    }

    Ok(())
}

fn read_input(cli: &Cli) -> Result<String, SecureQrError> {
    if let Some(path) = &cli.file {
        return fs::read_to_string(path).map_err(|e| {
            SecureQrError::IoError(format!("Failed to read {}: {}", path.display(), e))
        });
    }
    match cli.input.as_deref() {
        Some(text) if text != "-" => Ok(text.to_string()),
        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

// An absent contact is reported rather than treated as a failure
fn report_verification(contact: &Contact, candidate: &str, to_stdout: bool) {
    let outcome = match contact.verify(candidate) {
        Ok(true) => "MATCH".to_string(),
        Ok(false) => "NO MATCH".to_string(),
        Err(SecureQrError::ContactNotFound(_)) => "NOT PRESENT IN QR DATA".to_string(),
        Err(err) => format!("ERROR ({})", err),
    };
    let line = format!("{} verification: {}", contact.kind, outcome);
    if to_stdout {
        println!("{}", line);
    } else {
        eprintln!("{}", line);
    }
}

fn print_detailed_report(data: &ExtractedSecureQrData) {
    let text = &data.text_data;
    let address = &text.address;

    println!("\n===============================================");
    println!("        SECURE QR DECODED RECORD");
    println!("===============================================\n");

    println!("PERSONAL INFORMATION:");
    println!("  Name: {}", text.name);
    println!("  Date of Birth: {}", text.date_of_birth);
    println!("  Gender: {}", text.gender);
    println!(
        "  Reference ID: ****{} generated {}",
        text.reference_id.last_four_aadhaar_digits, text.reference_id.timestamp
    );

    println!("\nADDRESS:");
    println!("  Care of: {}", address.care_of);
    println!("  House: {}", address.house);
    println!("  Street: {}", address.street);
    println!("  Landmark: {}", address.landmark);
    println!("  Location: {}", address.location);
    println!("  VTC: {}", address.vtc);
    println!("  Post Office: {}", address.post_office);
    println!("  Sub-district: {}", address.sub_district);
    println!("  District: {}", address.district);
    println!("  State: {}", address.state);
    println!("  PIN Code: {}", address.pin_code);

    println!("\nCONTACT HASHES:");
    for contact in [&data.contact_info.email, &data.contact_info.mobile] {
        println!(
            "  {}: {}",
            contact.kind,
            contact.hash.as_deref().unwrap_or("not present")
        );
    }

    println!("\nPHOTOGRAPH:");
    println!(
        "  {}x{} pixels, {} bytes as JPEG",
        data.image.width(),
        data.image.height(),
        data.image.jpeg.len()
    );
    println!("\nSIGNATURE: {} bytes (not verified)", data.signature.bytes.len());
}
