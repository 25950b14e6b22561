use super::classifier::BeadClassification;
use super::SoftwareInfo;
use crate::antigen::{build_antigen_string, ConversionMap};
use crate::haml::{tag, Element};

/// HLA targets of one assay, bucketed by classification in document order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Specificities {
    pub positive: Vec<String>,
    pub questionable: Vec<String>,
    pub negative: Vec<String>,
}

impl Specificities {
    pub fn push(&mut self, classification: BeadClassification, target: String) {
        match classification {
            BeadClassification::Positive => self.positive.push(target),
            BeadClassification::Borderline => self.questionable.push(target),
            BeadClassification::Negative => self.negative.push(target),
        }
    }

    /// Builds the assay-level `interpretation` element. All three groups are
    /// always present; empty ones have no children.
    pub fn to_element(
        &self,
        assay: &Element,
        conversion: &ConversionMap,
        software: &SoftwareInfo,
    ) -> Element {
        let mut interpretation = assay.create_element(tag::INTERPRETATION);
        let name = interpretation
            .create_element(tag::INTERPRETATION_SOFTWARE)
            .with_text(&software.name);
        let version = interpretation
            .create_element(tag::INTERPRETATION_SOFTWARE_VERSION)
            .with_text(&software.version);
        interpretation.append_child(name);
        interpretation.append_child(version);

        let groups = [
            (tag::POSITIVE_SPECIFICITIES, &self.positive),
            (tag::QUESTIONABLE_SPECIFICITIES, &self.questionable),
            (tag::NEGATIVE_SPECIFICITIES, &self.negative),
        ];
        for (local, targets) in groups {
            let group = specificity_group(&interpretation, local, targets, conversion);
            interpretation.append_child(group);
        }
        interpretation
    }
}

fn specificity_group(
    parent: &Element,
    local: &str,
    targets: &[String],
    conversion: &ConversionMap,
) -> Element {
    let mut group = parent.create_element(local);
    if targets.is_empty() {
        return group;
    }

    let pl_string = targets.join("+");
    let abl_string = build_antigen_string(&pl_string, conversion);
    let pl = group.create_element(tag::HLA_PLSTRING).with_text(pl_string);
    let abl = group.create_element(tag::HLA_ABLSTRING).with_text(abl_string);
    group.append_child(pl);
    group.append_child(abl);
    group
}
