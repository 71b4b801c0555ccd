use clap::Parser;
use log::info;

use dmg_core::cli::Args;
use dmg_core::config::Config;
use dmg_core::environment::Environment;

fn main() {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match Config::from_file(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                eprintln!("failed to load config {}: {err}", path.display());
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    if let Some(rom) = &args.rom {
        config.rom = rom.clone();
    }
    config.debugger |= args.debugger;
    if args.max_cycles.is_some() {
        config.max_cycles = args.max_cycles;
    }
    let verbosity = config.verbosity.max(args.verbose);

    init_logger(verbosity);

    info!("Reading ROM from {}", config.rom.display());
    let rom = match std::fs::read(&config.rom) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("failed to read ROM {}: {err}", config.rom.display());
            std::process::exit(1);
        }
    };

    print_hex_dump(&rom[..rom.len().min(dmg_core::bus::ROM_SIZE)]);

    let mut env = Environment::new(rom, config.debugger);
    env.reset();

    match env.run(config.max_cycles) {
        Ok(()) => {
            info!("End");
            std::process::exit(0);
        }
        Err(_) => std::process::exit(1),
    }
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env().filter_level(level).init();
}

/// Hex dump of the ROM header: 16 bytes per line, space-separated,
/// lowercase.
fn print_hex_dump(bytes: &[u8]) {
    for (i, byte) in bytes.iter().enumerate() {
        print!("{byte:02x} ");
        if i % 0x10 == 0xF {
            println!();
        }
    }
    println!();
}
