//! Inspection tool for console deployments.
//!
//! Examples:
//!   chip8-console catalog
//!   chip8-console catalog web/roms.json
//!   chip8-console probes
//!   chip8-console config
//!
//! A config file can be given with `--config path.json` or through the
//! `CHIP8_CONSOLE_CONFIG` environment variable; otherwise defaults are used.

use std::path::{Path, PathBuf};
use std::process;

use chip8_console::config::{ConsoleConfig, CONFIG_ENV_VAR};
use chip8_console::probe::probe_set;
use chip8_console::program::{catalog_or_empty, read_catalog};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn usage() -> ! {
    eprintln!(
        "usage: chip8-console [--config FILE] <command>\n\
         \n\
         commands:\n\
         \x20 catalog [FILE]   list programs in the metadata document\n\
         \x20 probes           print the telemetry probe layout\n\
         \x20 config           print the effective configuration"
    );
    process::exit(2);
}

fn load_config(explicit: Option<PathBuf>) -> ConsoleConfig {
    let path = explicit.or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));
    let Some(path) = path else {
        return ConsoleConfig::default();
    };
    match ConsoleConfig::load(&path) {
        Ok(cfg) => {
            info!("Loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

fn print_catalog(path: &Path) {
    let programs = catalog_or_empty(read_catalog(path));
    if programs.is_empty() {
        println!("no programs in {}", path.display());
        return;
    }
    for (i, p) in programs.iter().enumerate() {
        println!("{i:>3}  {:<24} {:<20} speed={}", p.title, p.filename, p.speed);
        for flag in &p.flags {
            println!("       {}={}", flag.name, flag.enabled);
        }
    }
}

fn print_probes(cfg: &ConsoleConfig) {
    for (i, probe) in probe_set(cfg.register_count, cfg.stack_size).iter().enumerate() {
        let index = probe
            .accessor
            .index()
            .map(|x| format!("({x})"))
            .unwrap_or_default();
        println!(
            "{i:>3}  {:<10} width={}  {}{}",
            probe.identifier,
            probe.width,
            probe.accessor.entry(),
            index
        );
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let mut config_path = None;
    let mut positional = Vec::new();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => match args.next() {
                Some(p) => config_path = Some(PathBuf::from(p)),
                None => usage(),
            },
            "-h" | "--help" => usage(),
            _ => positional.push(arg),
        }
    }

    let cfg = load_config(config_path);
    match positional.first().map(String::as_str) {
        Some("catalog") => {
            let path = positional
                .get(1)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(&cfg.metadata_path));
            print_catalog(&path);
        }
        Some("probes") => print_probes(&cfg),
        Some("config") => match serde_json::to_string_pretty(&cfg) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        },
        _ => usage(),
    }
}
