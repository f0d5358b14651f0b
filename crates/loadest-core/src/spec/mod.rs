//! Run-specification loading: parse the human-authored YAML document into a
//! validated [`RunSpec`]. This is a structural loader; option codes are
//! carried through opaquely and no semantic range checking happens here
//! beyond the two fixed-field constraints of the header format.

use crate::domain::{
    FLAG_MAX, FLAG_MIN, LoadestError, LoadestResult, NAME_FIELD_WIDTH,
};
use serde::Deserialize;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// One tracked substance: header name, the two unit-conversion flags, and
/// the calibration-table column holding its observed concentration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constituent {
    pub name: String,
    pub ucflag: i64,
    pub ulflag: i64,
    pub colname: String,
}

/// Validated, immutable run configuration. The constituent count is always
/// derived from the list; an authored `nconst` key is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSpec {
    pub title: String,
    pub prtopt: String,
    pub seopt: String,
    pub ldopt: String,
    pub modno: String,
    pub est_file: PathBuf,
    pub calib_file: PathBuf,
    pub constituents: Vec<Constituent>,
}

impl RunSpec {
    pub fn constituent_count(&self) -> usize {
        self.constituents.len()
    }
}

/// Command-line overrides. An override always wins over the document value,
/// and a document key covered by an override need not be present at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecOverrides {
    pub est_file: Option<PathBuf>,
    pub calib_file: Option<PathBuf>,
    pub modno: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawConstituent {
    cname: String,
    ucflag: i64,
    ulflag: i64,
    colname: String,
}

pub fn load_run_spec(path: &Path, overrides: &SpecOverrides) -> LoadestResult<RunSpec> {
    let source = fs::read_to_string(path).map_err(|source| {
        LoadestError::io_system(
            "IO.SPEC_READ",
            format!("failed to read specification '{}': {}", path.display(), source),
        )
    })?;
    parse_run_spec(&source, path, overrides)
}

pub fn parse_run_spec(
    source: &str,
    origin: &Path,
    overrides: &SpecOverrides,
) -> LoadestResult<RunSpec> {
    let document: Value = serde_yaml::from_str(source).map_err(|source| {
        LoadestError::schema(
            "INPUT.SPEC_PARSE",
            format!("specification '{}' is not valid YAML: {}", origin.display(), source),
        )
    })?;

    if !document.is_mapping() {
        return Err(LoadestError::schema(
            "INPUT.SPEC_SHAPE",
            format!(
                "specification '{}' must be a mapping of configuration keys",
                origin.display()
            ),
        ));
    }

    let constituents = parse_constituents(&document)?;

    Ok(RunSpec {
        title: require_scalar(&document, "title")?,
        prtopt: require_scalar(&document, "prtopt")?,
        seopt: require_scalar(&document, "seopt")?,
        ldopt: require_scalar(&document, "ldopt")?,
        modno: match &overrides.modno {
            Some(modno) => modno.clone(),
            None => require_scalar(&document, "modno")?,
        },
        est_file: table_reference(&document, "est_file", overrides.est_file.as_deref())?,
        calib_file: table_reference(&document, "calib_file", overrides.calib_file.as_deref())?,
        constituents,
    })
}

/// A table reference is required from the document only when no override
/// supplies it; a missing key plus an override is a valid configuration.
fn table_reference(
    document: &Value,
    key: &str,
    override_path: Option<&Path>,
) -> LoadestResult<PathBuf> {
    match override_path {
        Some(path) => Ok(path.to_path_buf()),
        None => require_scalar(document, key).map(PathBuf::from),
    }
}

fn parse_constituents(document: &Value) -> LoadestResult<Vec<Constituent>> {
    let sequence = document
        .get("constituents")
        .ok_or_else(|| missing_key("constituents"))?
        .as_sequence()
        .ok_or_else(|| {
            LoadestError::schema(
                "INPUT.SPEC_FIELD",
                "key 'constituents' must be a list of constituent records",
            )
        })?;

    if sequence.is_empty() {
        return Err(LoadestError::schema(
            "INPUT.SPEC_FIELD",
            "key 'constituents' must list at least one constituent",
        ));
    }

    let mut constituents = Vec::with_capacity(sequence.len());
    for (index, entry) in sequence.iter().enumerate() {
        let raw: RawConstituent = serde_yaml::from_value(entry.clone()).map_err(|source| {
            LoadestError::schema(
                "INPUT.SPEC_CONSTITUENT",
                format!("constituent {} is malformed: {}", index + 1, source),
            )
        })?;
        constituents.push(validate_constituent(index, raw)?);
    }
    Ok(constituents)
}

fn validate_constituent(index: usize, raw: RawConstituent) -> LoadestResult<Constituent> {
    if raw.cname.chars().count() > NAME_FIELD_WIDTH {
        return Err(LoadestError::schema(
            "INPUT.SPEC_CONSTITUENT",
            format!(
                "constituent {} name '{}' exceeds the {}-character name field",
                index + 1,
                raw.cname,
                NAME_FIELD_WIDTH
            ),
        ));
    }

    for (label, flag) in [("ucflag", raw.ucflag), ("ulflag", raw.ulflag)] {
        if !(FLAG_MIN..=FLAG_MAX).contains(&flag) {
            return Err(LoadestError::schema(
                "INPUT.SPEC_CONSTITUENT",
                format!(
                    "constituent {} {} value {} does not fit a {}-character field",
                    index + 1,
                    label,
                    flag,
                    crate::domain::FLAG_FIELD_WIDTH
                ),
            ));
        }
    }

    Ok(Constituent {
        name: raw.cname,
        ucflag: raw.ucflag,
        ulflag: raw.ulflag,
        colname: raw.colname,
    })
}

fn require_scalar(document: &Value, key: &str) -> LoadestResult<String> {
    let value = document.get(key).ok_or_else(|| missing_key(key))?;
    scalar_string(value).ok_or_else(|| {
        LoadestError::schema(
            "INPUT.SPEC_FIELD",
            format!("key '{}' must be a scalar value", key),
        )
    })
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn missing_key(key: &str) -> LoadestError {
    LoadestError::schema(
        "INPUT.SPEC_FIELD",
        format!("missing required key '{}'", key),
    )
}

#[cfg(test)]
mod tests {
    use super::{SpecOverrides, load_run_spec, parse_run_spec};
    use crate::domain::LoadestErrorCategory;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const SPEC_FIXTURE: &str = "\
title: Maumee River nitrate
prtopt: 2
seopt: 1
ldopt: 0
modno: 9
est_file: flows.csv
calib_file: samples.csv
constituents:
  - cname: nitrate as N
    ucflag: 1
    ulflag: 3
    colname: no3
  - cname: total phosphorus
    ucflag: 1
    ulflag: 3
    colname: tp
";

    fn origin() -> &'static Path {
        Path::new("maumee.yaml")
    }

    fn no_overrides() -> SpecOverrides {
        SpecOverrides::default()
    }

    #[test]
    fn parses_a_complete_specification() {
        let spec =
            parse_run_spec(SPEC_FIXTURE, origin(), &no_overrides()).expect("spec should parse");
        assert_eq!(spec.title, "Maumee River nitrate");
        assert_eq!(spec.prtopt, "2");
        assert_eq!(spec.modno, "9");
        assert_eq!(spec.constituent_count(), 2);
        assert_eq!(spec.constituents[0].colname, "no3");
        assert_eq!(spec.constituents[1].ucflag, 1);
    }

    #[test]
    fn constituent_count_is_derived_not_authored() {
        let source = format!("{}nconst: 12\n", SPEC_FIXTURE);
        let spec = parse_run_spec(&source, origin(), &no_overrides()).expect("spec should parse");
        assert_eq!(spec.constituent_count(), 2);
    }

    #[test]
    fn missing_required_key_is_named_in_the_error() {
        let source = SPEC_FIXTURE.replace("modno: 9\n", "");
        let error =
            parse_run_spec(&source, origin(), &no_overrides()).expect_err("spec should fail");
        assert_eq!(error.category(), LoadestErrorCategory::SchemaError);
        assert!(error.message().contains("'modno'"));
    }

    #[test]
    fn missing_table_reference_without_an_override_is_named_in_the_error() {
        let source = SPEC_FIXTURE.replace("est_file: flows.csv\n", "");
        let error =
            parse_run_spec(&source, origin(), &no_overrides()).expect_err("spec should fail");
        assert_eq!(error.category(), LoadestErrorCategory::SchemaError);
        assert!(error.message().contains("'est_file'"));
    }

    #[test]
    fn override_satisfies_a_missing_table_reference() {
        let source = SPEC_FIXTURE.replace("est_file: flows.csv\n", "");
        let overrides = SpecOverrides {
            est_file: Some("april_flows.csv".into()),
            calib_file: None,
            modno: None,
        };

        let spec = parse_run_spec(&source, origin(), &overrides).expect("spec should parse");
        assert_eq!(spec.est_file, Path::new("april_flows.csv"));
        assert_eq!(spec.calib_file, Path::new("samples.csv"));
    }

    #[test]
    fn constituent_missing_flag_is_a_schema_error() {
        let source = SPEC_FIXTURE.replace("    ulflag: 3\n", "");
        let error =
            parse_run_spec(&source, origin(), &no_overrides()).expect_err("spec should fail");
        assert_eq!(error.category(), LoadestErrorCategory::SchemaError);
        assert!(error.message().contains("constituent"));
    }

    #[test]
    fn rejects_names_wider_than_the_name_field() {
        let long_name = "x".repeat(46);
        let source = SPEC_FIXTURE.replace("nitrate as N", &long_name);
        let error =
            parse_run_spec(&source, origin(), &no_overrides()).expect_err("spec should fail");
        assert!(error.message().contains("45-character"));
    }

    #[test]
    fn rejects_flags_that_do_not_fit_five_characters() {
        let source = SPEC_FIXTURE.replace("ucflag: 1\n", "ucflag: 123456\n");
        let error =
            parse_run_spec(&source, origin(), &no_overrides()).expect_err("spec should fail");
        assert!(error.message().contains("5-character"));
    }

    #[test]
    fn overrides_replace_document_values() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("maumee.yaml");
        fs::write(&path, SPEC_FIXTURE).expect("spec fixture should be written");

        let overrides = SpecOverrides {
            est_file: Some("other_flows.csv".into()),
            calib_file: None,
            modno: Some("0".to_string()),
        };
        let spec = load_run_spec(&path, &overrides).expect("spec should load");

        assert_eq!(spec.est_file, Path::new("other_flows.csv"));
        assert_eq!(spec.calib_file, Path::new("samples.csv"));
        assert_eq!(spec.modno, "0");
        assert_eq!(spec.constituent_count(), 2);
    }
}
