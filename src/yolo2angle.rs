use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

use yolo2angle::{Args, OutputFormat, RecordView, ReviewSession};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    for dir in [&args.image_dir, &args.label_dir] {
        if !PathBuf::from(dir).is_dir() {
            error!("The specified directory does not exist: {}", dir);
            return ExitCode::FAILURE;
        }
    }

    let session = match ReviewSession::open(&args.to_matcher_config()) {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to scan dataset: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let skipped = session.report().total_skipped();
    if skipped > 0 {
        info!("{} images were left out of the catalog.", skipped);
    }

    match &args.show {
        Some(key) => match session.view(key) {
            Ok(view) => print_view(&view, args.output_format),
            Err(e) => {
                error!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => print_catalog(&session, args.output_format),
    }

    ExitCode::SUCCESS
}

fn print_view(view: &RecordView, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            println!("{}", view.image_path);
            println!("{}", view.degrees_text());
        }
        OutputFormat::Json => print_json(view),
    }
}

fn print_catalog(session: &ReviewSession, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            for key in session.list_keys() {
                if let Ok(record) = session.get(key) {
                    println!("{}", record.list_label());
                }
            }
        }
        OutputFormat::Json => {
            let views: Vec<RecordView> = session
                .list_keys()
                .into_iter()
                .filter_map(|key| session.view(key).ok())
                .collect();
            print_json(&views);
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to serialize output: {}", e),
    }
}
