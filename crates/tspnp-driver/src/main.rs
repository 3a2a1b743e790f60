use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tspnp_driver::{find_manifest, scan_imports};
use tspnp_manifest::{is_builtin_module, ManifestLocator, PnpLocator};
use tspnp_resolver::{parse_specifier, PnpResolver, RealFs};

#[derive(Parser)]
#[command(
    name = "tspnp",
    version = "0.1.0",
    about = "Plug'n'Play-aware module resolution for TypeScript projects",
    long_about = "Resolves import specifiers the way the type checker does,\nconsulting a .pnp.data.json install manifest when conventional\nnode_modules resolution fails."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a single specifier and print the result
    Resolve {
        /// Import specifier or type-reference directive name
        specifier: String,

        /// File the specifier is imported from
        #[arg(short, long)]
        from: PathBuf,

        /// Resolve as a type-reference directive instead of a module
        #[arg(long)]
        types: bool,

        /// Install manifest path (discovered from --from when omitted)
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Disable the manifest overlay
        #[arg(long)]
        no_pnp: bool,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Resolve every import in a source file and report failures
    Check {
        /// Input TypeScript file
        input: PathBuf,

        /// Install manifest path (discovered from the input when omitted)
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Disable the manifest overlay
        #[arg(long)]
        no_pnp: bool,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            specifier,
            from,
            types,
            manifest,
            no_pnp,
            verbose,
        } => resolve_command(specifier, from, types, manifest, no_pnp, verbose),
        Commands::Check {
            input,
            manifest,
            no_pnp,
            verbose,
        } => check_command(input, manifest, no_pnp, verbose),
    }
}

fn resolve_command(
    specifier: String,
    from: PathBuf,
    types: bool,
    manifest: Option<PathBuf>,
    no_pnp: bool,
    verbose: bool,
) -> ExitCode {
    init_tracing(verbose);

    let resolver = match build_resolver(manifest, no_pnp, &from) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if types {
        let result = resolver.resolve_type_reference_directive(&specifier, &from);
        match result.resolved {
            Some(resolution) => {
                println!("{}", resolution.resolved_file_name.display());
                ExitCode::SUCCESS
            }
            None => report_unresolved(&specifier, &from, &result.failed_lookup_locations),
        }
    } else {
        let result = resolver.resolve_module_name(&specifier, &from);
        match result.resolved {
            Some(resolution) => {
                println!("{}", resolution.resolved_file_name.display());
                ExitCode::SUCCESS
            }
            None => report_unresolved(&specifier, &from, &result.failed_lookup_locations),
        }
    }
}

fn check_command(
    input: PathBuf,
    manifest: Option<PathBuf>,
    no_pnp: bool,
    verbose: bool,
) -> ExitCode {
    init_tracing(verbose);

    let source = match fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let filename = input.to_string_lossy().to_string();

    let resolver = match build_resolver(manifest, no_pnp, &input) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let imports = scan_imports(&source);
    let mut unresolved = 0usize;

    for import in &imports {
        // Built-in modules have no on-disk location to find.
        if is_builtin_module(parse_specifier(&import.specifier).package_name) {
            continue;
        }

        let result = resolver.resolve_module_name(&import.specifier, &input);
        match result.resolved {
            Some(resolution) => {
                if verbose {
                    println!(
                        "  {} -> {}",
                        import.specifier,
                        resolution.resolved_file_name.display()
                    );
                }
            }
            None => {
                unresolved += 1;
                report_error(
                    "E0100",
                    "Unresolved import",
                    &format!(
                        "cannot resolve '{}' ({} locations tried)",
                        import.specifier,
                        result.failed_lookup_locations.len()
                    ),
                    import.start,
                    import.end,
                    &filename,
                    &source,
                );
            }
        }
    }

    if unresolved > 0 {
        eprintln!("{} of {} imports failed to resolve", unresolved, imports.len());
        ExitCode::FAILURE
    } else {
        println!("All {} imports resolved", imports.len());
        ExitCode::SUCCESS
    }
}

// Helper functions

fn init_tracing(verbose: bool) {
    if verbose {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

/// Construct the resolver: an explicit manifest wins, otherwise discovery
/// walks up from the issuing file. No manifest means conventional-only
/// resolution.
fn build_resolver(
    manifest: Option<PathBuf>,
    no_pnp: bool,
    anchor_file: &Path,
) -> Result<PnpResolver<RealFs>, String> {
    if no_pnp {
        return Ok(PnpResolver::new(RealFs, None));
    }

    let anchor = anchor_file.parent().unwrap_or_else(|| Path::new("."));
    let manifest_path = manifest.or_else(|| find_manifest(&RealFs, anchor));

    let locator = match manifest_path {
        Some(path) => {
            let locator = PnpLocator::load(&path)
                .map_err(|e| format!("failed to load manifest: {}", e))?;
            tracing::debug!(
                manifest = %path.display(),
                packages = locator.manifest().packages.len(),
                "using install manifest"
            );
            Some(Box::new(locator) as Box<dyn ManifestLocator>)
        }
        None => {
            tracing::debug!(
                anchor = %anchor.display(),
                "no install manifest found, conventional resolution only"
            );
            None
        }
    };

    Ok(PnpResolver::new(RealFs, locator))
}

fn report_unresolved(specifier: &str, from: &Path, failed: &[PathBuf]) -> ExitCode {
    eprintln!("Cannot resolve '{}' from {}", specifier, from.display());
    for location in failed {
        eprintln!("  tried: {}", location.display());
    }
    ExitCode::FAILURE
}

fn report_error(
    code: &str,
    title: &str,
    message: &str,
    start: usize,
    end: usize,
    filename: &str,
    source: &str,
) {
    let span = (filename, start..end);
    Report::build(ReportKind::Error, span.clone())
        .with_code(code)
        .with_message(title)
        .with_label(
            Label::new(span)
                .with_message(message)
                .with_color(Color::Red),
        )
        .finish()
        .print((filename, Source::from(source)))
        .unwrap();
}
