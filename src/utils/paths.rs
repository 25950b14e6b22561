use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// `HAML.xml` + `_interpreted` → `HAML_interpreted.xml`, next to the input.
pub fn interpreted_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    let mut file_name = OsString::from(stem);
    file_name.push(suffix);
    if let Some(extension) = input.extension() {
        file_name.push(".");
        file_name.push(extension);
    }
    input.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_goes_before_extension() {
        let cases = vec![
            ("HAML.xml", "HAML_interpreted.xml"),
            ("data/run.1.haml", "data/run.1_interpreted.haml"),
            ("plain", "plain_interpreted"),
            (".xml", ".xml_interpreted"),
        ];

        for (input, expected) in cases {
            assert_eq!(
                interpreted_output_path(Path::new(input), "_interpreted"),
                PathBuf::from(expected)
            );
        }
    }
}
