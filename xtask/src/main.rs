use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{exit, Command};

use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const LAMBDA_PACKAGE: &str = "cfn_secure_string_lambda";
const LAMBDA_BINARY: &str = "secure_string_handler";
const DIST_DIR: &str = "dist";

type TaskResult = Result<(), String>;

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the SecureString custom resource workspace"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks (fmt, clippy, tests)
    Ci {
        /// Also build and package the handler for the host target
        #[arg(long)]
        package: bool,
    },
    /// Build the custom resource handler and zip it as a Lambda `bootstrap`
    LambdaPackage {
        /// Linux target triple of the Lambda architecture
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }
}

fn cargo(args: &[&str]) -> TaskResult {
    eprintln!("+ cargo {}", args.join(" "));
    let status = Command::new("cargo")
        .args(args)
        .status()
        .map_err(|error| format!("failed to execute cargo: {error}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("`cargo {}` exited with {status}", args.join(" ")))
    }
}

fn ci() -> TaskResult {
    cargo(&["fmt", "--all", "--", "--check"])?;
    cargo(&["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])?;
    cargo(&["test", "--workspace"])
}

fn lambda_package(target: Option<&str>, profile: BuildProfile) -> TaskResult {
    let mut args = vec!["build", "-p", LAMBDA_PACKAGE, "--bin", LAMBDA_BINARY];
    if let Some(target) = target {
        args.extend(["--target", target]);
    }
    if let BuildProfile::Release = profile {
        args.push("--release");
    }
    cargo(&args)?;

    let mut binary_path = PathBuf::from("target");
    if let Some(target) = target {
        binary_path.push(target);
    }
    binary_path.push(profile.dir_name());
    binary_path.push(LAMBDA_BINARY);

    fs::create_dir_all(DIST_DIR)
        .map_err(|error| format!("failed to create {DIST_DIR}: {error}"))?;
    let zip_path = Path::new(DIST_DIR).join(format!("{LAMBDA_BINARY}.zip"));
    write_bootstrap_zip(&binary_path, &zip_path)?;

    eprintln!("packaged {}", zip_path.display());
    Ok(())
}

/// The `provided.al2023` runtime executes a file named `bootstrap`.
fn write_bootstrap_zip(binary_path: &Path, zip_path: &Path) -> TaskResult {
    let binary = fs::read(binary_path)
        .map_err(|error| format!("failed to read '{}': {error}", binary_path.display()))?;
    let file = fs::File::create(zip_path)
        .map_err(|error| format!("failed to create '{}': {error}", zip_path.display()))?;

    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)
        .map_err(|error| format!("failed to add bootstrap entry: {error}"))?;
    zip.write_all(&binary)
        .map_err(|error| format!("failed to write bootstrap entry: {error}"))?;
    zip.finish()
        .map_err(|error| format!("failed to finish lambda zip: {error}"))?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ci { package } => ci().and_then(|()| {
            if package {
                lambda_package(None, BuildProfile::Debug)
            } else {
                Ok(())
            }
        }),
        Commands::LambdaPackage { target, profile } => lambda_package(Some(&target), profile),
    };

    if let Err(message) = result {
        eprintln!("error: {message}");
        exit(1);
    }
}
