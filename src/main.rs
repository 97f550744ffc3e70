use clap::error::ErrorKind;
use clap::Parser;
use std::process;
use unarchive::{
    logging, Cli, Extractor, OutputFormatter, OutputMode, TerminalPrompt, Unarchive,
    UnarchiveError, UserFriendlyError,
};

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    // Parse CLI arguments; help and version are not failures
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return handle_parse_error(e),
    };

    if let Err(e) = logging::init(cli.verbosity_level(), cli.quiet) {
        eprintln!("Warning: {:#}", e);
    }

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let root = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            print_startup_error(&UnarchiveError::Io(e));
            return 1;
        }
    };

    let unarchive = match Unarchive::from_cli(&cli, &root) {
        Ok(unarchive) => unarchive,
        Err(e) => {
            print_startup_error(&e);
            return 1;
        }
    };

    if cli.dry_run {
        return handle_dry_run(&unarchive);
    }

    let mut prompt = TerminalPrompt::new();
    match unarchive.run(&mut prompt) {
        Ok(report) => unarchive.exit_code(&report),
        Err(e) => {
            unarchive.handle_error(&e);
            1
        }
    }
}

fn handle_parse_error(error: clap::Error) -> i32 {
    let _ = error.print();
    match error.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "unarchive.toml".to_string());

    match Unarchive::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  unarchive --config {}", config_path);
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(unarchive: &Unarchive) -> i32 {
    let formatter = unarchive.output_formatter();
    formatter.print_header("Dry run: nothing will be extracted");

    let archives = match unarchive.scan() {
        Ok(archives) => archives,
        Err(e) => {
            unarchive.handle_error(&e);
            return 1;
        }
    };

    let config = unarchive.config();
    let extractor = unarchive.extractor();

    if !matches!(formatter.mode(), OutputMode::Json) {
        println!("  Directory: {}", unarchive.root().display());
        println!("  Strategy: {}", extractor.strategy());
        println!(
            "  Selection: {}",
            if config.selection.extract_all {
                "all archives"
            } else {
                "ask for each archive"
            }
        );
        formatter.print_separator();
    }

    if archives.is_empty() {
        formatter.warning("No archives found");
        return 0;
    }

    formatter.print_archive_list(&archives);

    if let Extractor::Bulk(bulk) = &extractor {
        for archive in &archives {
            let target = bulk.output_dir_for(archive);
            if target.exists() && !config.extraction.overwrite_existing {
                formatter.warning(&format!(
                    "{} already exists; {} would fail without --overwrite",
                    target.display(),
                    archive.name
                ));
            }
        }
    }

    formatter.success("Dry run completed successfully");
    0
}

fn print_startup_error(error: &UnarchiveError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
