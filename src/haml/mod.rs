pub mod document;

pub use document::{Document, Element, Node};

/// Namespace URI every HAML element lives in.
pub const HAML_NAMESPACE: &str = "urn:HAML.Namespace";

/// Local names of the HAML elements read or written by the interpreter.
pub mod tag {
    pub const PATIENT: &str = "patient";
    pub const SAMPLE: &str = "sample";
    pub const ASSAY: &str = "assay";
    pub const WORKING_SAMPLE: &str = "working-sample";
    pub const SOLID_PHASE_PANEL: &str = "solid-phase-panel";

    pub const BEAD: &str = "bead";
    pub const BEAD_INFO: &str = "bead-info";
    pub const HLA_TARGET_TYPE: &str = "HLA-target-type";
    pub const RAW_DATA: &str = "raw-data";
    pub const SAMPLE_RAW_MFI: &str = "sample-raw-MFI";
    pub const CONVERTED_DATA: &str = "converted-data";

    pub const BEAD_INTERPRETATION: &str = "bead-interpretation";
    pub const CLASSIFICATION_ENTITY: &str = "classification-entity";
    pub const INTERPRETATION_REASON: &str = "interpretation-reason";
    pub const BEAD_CLASSIFICATION: &str = "bead-classification";
    pub const BEAD_RANK: &str = "bead-rank";

    pub const INTERPRETATION: &str = "interpretation";
    pub const INTERPRETATION_SOFTWARE: &str = "interpretation-software";
    pub const INTERPRETATION_SOFTWARE_VERSION: &str = "interpretation-software-version";
    pub const POSITIVE_SPECIFICITIES: &str = "positive-specificities";
    pub const QUESTIONABLE_SPECIFICITIES: &str = "questionable-specificities";
    pub const NEGATIVE_SPECIFICITIES: &str = "negative-specificities";
    pub const HLA_PLSTRING: &str = "HLA-plstring";
    pub const HLA_ABLSTRING: &str = "HLA-ablstring";
}
