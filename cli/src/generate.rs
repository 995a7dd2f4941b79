#![deny(missing_docs)]

//! # Generate Command
//!
//! Reads an API definition (YAML or JSON) and writes the synthesized OpenAPI
//! document. Output format follows the output file extension; stdout always
//! receives JSON.

use oas_synth_core::error::{AppError, AppResult};
use oas_synth_core::{build_document, synthesize, ApiDefinition, SynthesisOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Server URL used when `--base-url` is not given.
pub const DEFAULT_BASE_URL: &str = "https://api.example.com/api/v1";

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Path to the API definition (.yaml, .yml or .json).
    #[clap(long)]
    pub definition: PathBuf,

    /// Absolute URL of the API server.
    #[clap(long, env = "OAS_SYNTH_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Tag for routes outside any group.
    #[clap(long)]
    pub name: Option<String>,

    /// Optional YAML file of document overrides (info, external_docs,
    /// security_schemes, max_depth).
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Output path. Supports .json and .yaml/.yml extensions.
    /// If not provided, prints JSON to stdout.
    #[clap(long)]
    pub output: Option<PathBuf>,
}

/// Executes the generation.
pub fn execute(args: &GenerateArgs) -> AppResult<()> {
    let api = load_definition(&args.definition)?;
    let options = match &args.config {
        Some(path) => SynthesisOptions::from_yaml(&read(path)?)?,
        None => SynthesisOptions::default(),
    };
    debug!(routes = api.routes.len(), max_depth = options.max_depth, "definition loaded");

    match &args.output {
        Some(out_path) => {
            let rendered = render(&api, args, &options, out_path)?;
            if let Some(parent) = out_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(out_path, rendered)?;
            info!(output = %out_path.display(), "OpenAPI document written");
        }
        None => println!(
            "{}",
            synthesize(&api, &args.base_url, args.name.as_deref(), &options)?
        ),
    }
    Ok(())
}

/// Parses the definition at `path`; `.json` files are JSON, anything else YAML.
pub fn load_definition(path: &Path) -> AppResult<ApiDefinition> {
    let content = read(path)?;
    match extension(path) {
        Some("json") => ApiDefinition::from_json(&content),
        _ => ApiDefinition::from_yaml(&content),
    }
}

fn render(
    api: &ApiDefinition,
    args: &GenerateArgs,
    options: &SynthesisOptions,
    out_path: &Path,
) -> AppResult<String> {
    let name = args.name.as_deref();
    match extension(out_path) {
        Some("yaml") | Some("yml") => {
            let document = build_document(api, &args.base_url, name, options)?;
            Ok(serde_yaml::to_string(&document)?)
        }
        _ => synthesize(api, &args.base_url, name, options),
    }
}

fn read(path: &Path) -> AppResult<String> {
    if !path.exists() {
        return Err(AppError::General(format!("File not found: {:?}", path)));
    }
    Ok(fs::read_to_string(path)?)
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}
