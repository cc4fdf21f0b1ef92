mod errors;
mod config;
mod features;
mod scenario;
mod entities;
mod auction;
mod linear_layer;
mod auction_model;
mod scenario_run;
mod simulation;
mod reports;
mod logger;

use std::path::PathBuf;

use config::SimulationConfig;
use logger::{ConsoleReceiver, FileReceiver, LogEvent, Logger, sanitize_filename};
use reports::get_report_catalog;
use simulation::Simulation;

fn parse_verbose(name: &str) -> Option<LogEvent> {
    match name {
        "auction" => Some(LogEvent::Auction),
        "training" => Some(LogEvent::Training),
        "entity" => Some(LogEvent::Entity),
        _ => None,
    }
}

fn main() {
    let raw_args: Vec<String> = std::env::args().collect();
    let mut config = SimulationConfig::default();

    // Parse and filter out --scenario and --verbose arguments
    let mut args = Vec::new();
    let mut verbose = Vec::new();
    let mut skip_next = false;
    for (i, arg) in raw_args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--scenario" {
            match raw_args.get(i + 1) {
                Some(descriptor) => config.scenario = descriptor.clone(),
                None => {
                    eprintln!("Error: --scenario expects a descriptor such as 1Ux1Ax2B");
                    std::process::exit(1);
                }
            }
            skip_next = true;
            continue;
        }
        if arg == "--verbose" {
            match raw_args.get(i + 1).and_then(|name| parse_verbose(name)) {
                Some(event) => verbose.push(event),
                None => {
                    eprintln!("Error: --verbose expects one of auction, training, entity");
                    std::process::exit(1);
                }
            }
            skip_next = true;
            continue;
        }
        args.push(arg.clone());
    }

    let report_arg = args.get(1).map(String::as_str).unwrap_or("all");

    if let Some(raw) = args.get(2) {
        match raw.parse::<u64>() {
            Ok(n) => config.iterations = n,
            Err(_) => {
                eprintln!("Error: Invalid iterations parameter '{}'. Expected a number.", raw);
                std::process::exit(1);
            }
        }
    }

    if let Some(raw) = args.get(3) {
        match raw.parse::<u64>() {
            Ok(n) => config.start_seed = n,
            Err(_) => {
                eprintln!("Error: Invalid start seed parameter '{}'. Expected a number.", raw);
                std::process::exit(1);
            }
        }
    }

    // Filter reports: if "all", use every report; otherwise the named one
    let all_reports = get_report_catalog();
    let selected: Vec<_> = if report_arg == "all" {
        all_reports.clone()
    } else {
        match all_reports.iter().find(|r| r.short_name == report_arg) {
            Some(report) => vec![report.clone()],
            None => {
                eprintln!("Error: Report '{}' not found.", report_arg);
                eprintln!("Available reports:");
                for r in &all_reports {
                    eprintln!("  - {}: {}", r.short_name, r.description);
                }
                std::process::exit(1);
            }
        }
    };

    let log_dir = PathBuf::from("log").join(sanitize_filename(&config.scenario));
    let mut logger = Logger::new();
    logger.add_receiver(ConsoleReceiver::new(vec![LogEvent::Report]));

    let file_receivers = [
        ("iterations.csv", vec![LogEvent::Iteration]),
        ("report.log", vec![LogEvent::Report]),
        ("auction.csv", vec![LogEvent::Auction]),
        ("training.log", vec![LogEvent::Training]),
        ("entity.log", vec![LogEvent::Entity]),
    ];
    for (file_name, events) in file_receivers {
        let wanted = match events[0] {
            LogEvent::Iteration | LogEvent::Report => true,
            event => verbose.contains(&event),
        };
        if !wanted {
            continue;
        }
        match FileReceiver::new(&log_dir.join(file_name), events) {
            Ok(receiver) => {
                logger.add_receiver(receiver);
            }
            Err(e) => {
                eprintln!("Error: cannot open log file {}: {}", log_dir.join(file_name).display(), e);
                std::process::exit(1);
            }
        }
    }

    if config.iterations == 0 {
        warnln!(logger, LogEvent::Report, "No iterations requested, reports have nothing to aggregate");
    }

    println!("Running scenario '{}' {} times from seed {}...", config.scenario, config.iterations, config.start_seed);
    let simulation = match Simulation::run(&config, &mut logger) {
        Ok(simulation) => simulation,
        Err(e) => {
            errln!(logger, LogEvent::Report, "Simulation failed: {}", e);
            let _ = logger.flush();
            std::process::exit(1);
        }
    };

    for report in &selected {
        // Report-level receiver
        let report_path = log_dir.join(format!("{}.log", sanitize_filename(report.short_name)));
        let report_receiver_id = match FileReceiver::new(&report_path, vec![LogEvent::Report]) {
            Ok(receiver) => Some(logger.add_receiver(receiver)),
            Err(e) => {
                eprintln!("Warning: cannot open log file {}: {}", report_path.display(), e);
                None
            }
        };

        let result = (report.run)(&simulation, &mut logger);
        if let Err(e) = &result {
            errln!(logger, LogEvent::Report, "Report '{}' failed: {}", report.short_name, e);
        }

        if let Some(id) = report_receiver_id {
            logger.remove_receiver(id);
        }
        if result.is_err() {
            let _ = logger.flush();
            std::process::exit(1);
        }
    }

    let _ = logger.flush();
}
