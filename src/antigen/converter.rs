use super::ConversionMap;

const HETERODIMER_SEPARATOR: char = '&';
const LIST_SEPARATOR: &str = "+";
// Only the beta chain of a DQ/DP heterodimer carries the serologic antigen.
const ANTIGEN_BEARING_CHAINS: [&str; 2] = ["DQB1*", "DPB1*"];

/// Maps one allele code to its antigen label.
///
/// Heterodimer codes (`DQA1*01:01&DQB1*02:01`) resolve through their first
/// DQB1/DPB1 part; a heterodimer with no such part is returned whole.
pub fn convert_allele<'a>(allele: &'a str, conversion: &'a ConversionMap) -> &'a str {
    if allele.contains(HETERODIMER_SEPARATOR) {
        return allele
            .split(HETERODIMER_SEPARATOR)
            .find(|part| {
                ANTIGEN_BEARING_CHAINS
                    .iter()
                    .any(|chain| part.starts_with(chain))
            })
            .map_or(allele, |part| conversion.antigen_for(part));
    }
    conversion.antigen_for(allele)
}

/// Converts a `+`-joined allele list (PL string) into a `+`-joined antigen
/// list (ABL string), keeping the first occurrence of each antigen.
pub fn build_antigen_string(pl_string: &str, conversion: &ConversionMap) -> String {
    if pl_string.is_empty() {
        return String::new();
    }

    let mut antigens: Vec<&str> = Vec::new();
    for allele in pl_string.split(LIST_SEPARATOR) {
        let antigen = convert_allele(allele.trim(), conversion);
        if !antigens.contains(&antigen) {
            antigens.push(antigen);
        }
    }
    antigens.join(LIST_SEPARATOR)
}
