use clap::Parser;
use haml_interpret::{cli, commands};

fn main() {
    let args = cli::Args::parse();

    if let Err(e) = commands::interpret::run(args.input_file) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
