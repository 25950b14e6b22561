pub mod classifier;
pub mod specificities;

pub use classifier::{classify, BeadClassification};
pub use specificities::Specificities;

use crate::antigen::ConversionMap;
use crate::haml::{tag, Document, Element, HAML_NAMESPACE as NS};

pub const INTERPRETATION_REASON: &str = "MFI-cutoff-setting";

/// Identity written into every element this tool generates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftwareInfo {
    pub name: String,
    pub version: String,
}

impl SoftwareInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl Default for SoftwareInfo {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InterpretationSummary {
    pub assays_interpreted: usize,
    /// Assays without a working sample or solid-phase panel.
    pub assays_skipped: usize,
    pub beads_classified: usize,
    /// Beads whose raw MFI was present but not an integer.
    pub beads_unparseable: usize,
    pub positive: usize,
    pub borderline: usize,
    pub negative: usize,
}

impl InterpretationSummary {
    fn record(&mut self, classification: BeadClassification) {
        self.beads_classified += 1;
        match classification {
            BeadClassification::Positive => self.positive += 1,
            BeadClassification::Borderline => self.borderline += 1,
            BeadClassification::Negative => self.negative += 1,
        }
    }
}

enum BeadReading {
    /// Target or raw MFI element missing. Skipped without a warning.
    Incomplete,
    Unparseable { target: String, raw: String },
    Measured { target: String, mfi: i64 },
}

/// Walks patient → sample → assay and interprets every assay in place.
pub fn interpret_document(
    document: &mut Document,
    conversion: &ConversionMap,
    software: &SoftwareInfo,
) -> InterpretationSummary {
    let mut summary = InterpretationSummary::default();

    for patient in document.root_mut().children_mut(NS, tag::PATIENT) {
        for sample in patient.children_mut(NS, tag::SAMPLE) {
            for assay in sample.children_mut(NS, tag::ASSAY) {
                if interpret_assay(assay, conversion, software, &mut summary) {
                    summary.assays_interpreted += 1;
                } else {
                    summary.assays_skipped += 1;
                }
            }
        }
    }

    summary
}

/// Classifies the beads of one assay and replaces its `interpretation`.
///
/// Returns `false`, leaving the assay untouched, when it has no
/// working-sample/solid-phase-panel.
pub fn interpret_assay(
    assay: &mut Element,
    conversion: &ConversionMap,
    software: &SoftwareInfo,
    summary: &mut InterpretationSummary,
) -> bool {
    let Some(panel) = assay
        .child_mut(NS, tag::WORKING_SAMPLE)
        .and_then(|working_sample| working_sample.child_mut(NS, tag::SOLID_PHASE_PANEL))
    else {
        return false;
    };

    // Recorded on every run, even when no bead ends up classified.
    let name = panel
        .create_element(tag::INTERPRETATION_SOFTWARE)
        .with_text(&software.name);
    let version = panel
        .create_element(tag::INTERPRETATION_SOFTWARE_VERSION)
        .with_text(&software.version);
    panel.append_child(name);
    panel.append_child(version);

    let mut specificities = Specificities::default();
    for bead in panel.children_mut(NS, tag::BEAD) {
        match read_bead(bead) {
            BeadReading::Incomplete => {}
            BeadReading::Unparseable { target, raw } => {
                eprintln!(
                    "Warning: Could not parse MFI value '{}' for bead {}",
                    raw.trim(),
                    target
                );
                summary.beads_unparseable += 1;
            }
            BeadReading::Measured { target, mfi } => {
                let classification = classify(mfi);
                let converted_data = bead.ensure_child(tag::CONVERTED_DATA);
                let record = bead_interpretation(converted_data, classification, software);
                converted_data.append_child(record);

                summary.record(classification);
                specificities.push(classification, target);
            }
        }
    }

    let interpretation = specificities.to_element(assay, conversion, software);
    assay.remove_children(NS, tag::INTERPRETATION);
    assay.append_child(interpretation);
    true
}

fn read_bead(bead: &Element) -> BeadReading {
    let target = bead
        .child(NS, tag::BEAD_INFO)
        .and_then(|info| info.child(NS, tag::HLA_TARGET_TYPE))
        .and_then(Element::text)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());
    let raw = bead
        .child(NS, tag::RAW_DATA)
        .and_then(|raw_data| raw_data.child(NS, tag::SAMPLE_RAW_MFI))
        .and_then(Element::text);

    let (Some(target), Some(raw)) = (target, raw) else {
        return BeadReading::Incomplete;
    };
    match raw.trim().parse::<i64>() {
        Ok(mfi) => BeadReading::Measured { target, mfi },
        Err(_) => BeadReading::Unparseable { target, raw },
    }
}

fn bead_interpretation(
    converted_data: &Element,
    classification: BeadClassification,
    software: &SoftwareInfo,
) -> Element {
    let mut record = converted_data.create_element(tag::BEAD_INTERPRETATION);
    let fields = [
        (tag::CLASSIFICATION_ENTITY, software.name.clone()),
        (tag::INTERPRETATION_REASON, INTERPRETATION_REASON.to_string()),
        (tag::BEAD_CLASSIFICATION, classification.label().to_string()),
        (tag::BEAD_RANK, classification.rank().to_string()),
    ];
    for (local, value) in fields {
        let field = record.create_element(local).with_text(value);
        record.append_child(field);
    }
    record
}
