use crate::antigen::ConversionMap;
use crate::config::Config;
use crate::haml::Document;
use crate::interpretation::{interpret_document, InterpretationSummary, SoftwareInfo};
use crate::utils::paths::interpreted_output_path;
use crate::utils::progress::phase_spinner;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

pub fn run(input_file: String) -> Result<()> {
    let config = Config::load();
    let input = Path::new(&input_file);
    let output = interpreted_output_path(input, &config.output_suffix);

    println!("Processing {}", input.display());

    let table = config.conversion_table_path();
    let spinner = phase_spinner(format!("Loading {}...", table.display()))?;
    let conversion = ConversionMap::load(&table)?;
    spinner.finish_and_clear();

    let summary = process_file(input, &output, &conversion, &config.software())?;

    println!(
        "Interpreted {} assay(s), skipped {}; classified {} bead(s) ({} positive, {} borderline, {} negative), {} unparseable",
        summary.assays_interpreted,
        summary.assays_skipped,
        summary.beads_classified,
        summary.positive,
        summary.borderline,
        summary.negative,
        summary.beads_unparseable,
    );
    println!("Processed XML successfully written to {}", output.display());
    Ok(())
}

/// Reads `input`, interprets every assay and writes the augmented document to
/// `output`. Nothing is written unless the whole document was processed.
pub fn process_file(
    input: &Path,
    output: &Path,
    conversion: &ConversionMap,
    software: &SoftwareInfo,
) -> Result<InterpretationSummary> {
    if !input.exists() {
        bail!("Input file '{}' not found.", input.display());
    }

    let spinner = phase_spinner(format!("Parsing {}...", input.display()))?;
    let xml = fs::read_to_string(input)
        .with_context(|| format!("Error reading XML file '{}'", input.display()))?;
    let mut document = Document::parse_str(&xml)
        .with_context(|| format!("Error parsing XML file '{}'", input.display()))?;

    spinner.set_message("Interpreting assays...");
    let summary = interpret_document(&mut document, conversion, software);

    spinner.set_message(format!("Writing {}...", output.display()));
    let serialized = document.to_xml_string()?;
    fs::write(output, serialized)
        .with_context(|| format!("Error writing XML file '{}'", output.display()))?;

    spinner.finish_and_clear();
    Ok(summary)
}
