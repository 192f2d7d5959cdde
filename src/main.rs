//! xui-elements CLI
//!
//! Usage:
//!   xui-elements [OPTIONS] <MANIFEST>
//!
//! Options:
//!   -m, --mount <NAME>  Mount only the named element (repeatable)
//!   -d, --debug         Enable debug logging
//!   -h, --help          Print help

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use xui_elements::{CustomElementRegistry, Manifest, TemplateResolutionError, WidgetClass};

#[derive(Parser, Debug)]
#[command(name = "xui-elements")]
#[command(about = "Define the widgets in a manifest and print their rendered templates")]
struct Cli {
    /// Widget manifest (TOML)
    manifest: PathBuf,

    /// Mount only these elements (defaults to every autonomous element)
    #[arg(short, long = "mount", value_name = "NAME")]
    mount: Vec<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    tracing::debug!("xui-elements starting with args: {:?}", cli);

    let manifest = match Manifest::from_file(&cli.manifest) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error loading manifest '{}': {}", cli.manifest.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let mut registry = CustomElementRegistry::new();
    let classes = match manifest.define(&mut registry) {
        Ok(classes) => classes,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let names: Vec<String> = if cli.mount.is_empty() {
        registry
            .names()
            .filter(|name| {
                registry
                    .definition(name)
                    .is_some_and(|d| d.options.extends.is_none())
            })
            .map(str::to_string)
            .collect()
    } else {
        cli.mount.clone()
    };

    let mut failed = false;
    for name in &names {
        let mut instance = match registry.create_element(name) {
            Ok(instance) => instance,
            Err(e) => {
                eprintln!("Error: {}", e);
                failed = true;
                continue;
            }
        };

        if let Err(e) = instance.connected_callback() {
            report_template_error(name, instance.class(), &e);
            failed = true;
            continue;
        }

        println!("<{}>", name);
        match instance.shadow_root() {
            Some(root) => println!("{}", root),
            None => println!("(no template)"),
        }
    }

    tracing::debug!(defined = classes.len(), mounted = names.len(), "done");
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn report_template_error(name: &str, class: &WidgetClass, err: &TemplateResolutionError) {
    match (err, class.template_cache()) {
        (TemplateResolutionError::Markup { errors, .. }, Some(cache)) => {
            let filename = format!("{} template", name);
            for e in errors {
                eprint!("{}", e.format(cache.source(), &filename));
            }
        }
        _ => eprintln!("Error: {}", err),
    }
}
