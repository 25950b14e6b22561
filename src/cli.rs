use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// HAML XML file with solid-phase bead results to interpret
    #[arg(default_value = "HAML.xml")]
    pub input_file: String,
}
