// Standalone replay tool for recorded Cyber Worm sessions
//
// Usage:
//   cargo run --bin replay -- <log_file> [options]
//
// Options:
//   --config <path>   Path to Worm.toml (default: Worm.toml)
//   --verbose         Log every replayed event
//   --strict          Exit non-zero if the replay diverges from the recording

use std::env;
use std::process;

use cyber_worm::config::Config;
use cyber_worm::replay::ReplayEngine;

fn print_usage() {
    eprintln!("Cyber Worm Replay Tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  replay <log_file> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --config <path>   Path to Worm.toml (default: Worm.toml)");
    eprintln!("  --verbose         Log every replayed event");
    eprintln!("  --strict          Exit with status 2 on any divergence");
    eprintln!("  --help            Show this help message");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("  replay worm_events.jsonl");
    eprintln!("  replay worm_events.jsonl --config other.toml --strict");
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.contains(&"--help".to_string()) {
        print_usage();
        process::exit(if args.contains(&"--help".to_string()) {
            0
        } else {
            1
        });
    }

    let log_file = &args[1];
    let mut config_path = "Worm.toml".to_string();
    let mut verbose = false;
    let mut strict = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --config requires an argument");
                    process::exit(1);
                }
                config_path = args[i + 1].clone();
                i += 1;
            }
            "--verbose" => verbose = true,
            "--strict" => strict = true,
            _ => {
                eprintln!("Error: Unknown option '{}'", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = Config::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", config_path, e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });

    println!("Loaded configuration from: {}", config_path);
    println!("Replay log file: {}", log_file);
    println!();

    let engine = ReplayEngine::new(config, verbose);

    let stats = match engine.replay_file(log_file) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("Error during replay: {}", e);
            process::exit(1);
        }
    };

    engine.print_report(&stats);

    if strict && !stats.matches() {
        process::exit(2);
    }
}
