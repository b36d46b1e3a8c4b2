//! Shared test fixtures: a small, self-consistent artifact bundle, a
//! two-tree model fitted on its schema, and one clean record.
//!
//! Available to this crate's tests and, through the `test-utils`
//! feature, to downstream test suites.

use std::collections::HashMap;
use std::path::Path;

use serde_json::json;

use quotelens_types::config::{ArtifactsConfig, PipelineConfig};
use quotelens_types::{RawRecord, Result, Value};

use crate::artifacts::{
    ArtifactBundle, ArtifactParts, ConversionRateTable, ConversionRatesFile, EncodersFile,
    HandleUnknown, InputSchemaFile, OneHotEncoder,
};
use crate::model::{Node, Tree, TreeEnsemble};

/// Passthrough columns in the fixture schema.
pub const PASSTHROUGH_COUNT: usize = 13;
/// Total feature columns in the fixture schema.
pub const FEATURE_COUNT: usize = 34;

pub const DEFAULT_SF5_RATE: f64 = 0.05158873442859722;
pub const DEFAULT_PF9_RATE: f64 = 0.2278782877483513;
pub const DEFAULT_SF1B_RATE: f64 = 0.2970842197472156;

/// Fixture input columns in training order.
pub const INPUT_COLUMNS: [&str; 21] = [
    "QuoteNumber",
    "Original_Quote_Date",
    "Field6",
    "Field7",
    "Field10",
    "Field12",
    "PersonalField1",
    "PersonalField2",
    "PersonalField84",
    "PropertyField6",
    "PropertyField29",
    "PropertyField30",
    "GeographicField10A",
    "GeographicField63",
    "SalesField5",
    "PersonalField9",
    "SalesField1B",
    "CoverageField1A",
    "CoverageField1B",
    "CoverageField2A",
    "CoverageField2B",
];

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn table(field: &str, feature: &str, default: f64, rates: &[(&str, f64)]) -> ConversionRateTable {
    ConversionRateTable {
        field: field.into(),
        feature: feature.into(),
        default,
        rates: rates
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect::<HashMap<_, _>>(),
    }
}

fn encoder(field: &str, categories: &[&str]) -> OneHotEncoder {
    OneHotEncoder::new(field, strings(categories), HandleUnknown::Ignore)
        .expect("fixture encoder is valid")
}

/// Unvalidated fixture artifacts.
pub fn artifact_parts() -> ArtifactParts {
    ArtifactParts {
        input_columns: strings(&INPUT_COLUMNS),
        conversion_tables: vec![
            table("SalesField5", "FE_salesField5", DEFAULT_SF5_RATE, &[("1", 0.02), ("5", 0.11)]),
            table("PersonalField9", "FE_pesonalField9", DEFAULT_PF9_RATE, &[("1", 0.3), ("2", 0.1)]),
            table("SalesField1B", "FE_salesField1B", DEFAULT_SF1B_RATE, &[("0", 0.25), ("4", 0.4)]),
        ],
        encoders: vec![
            encoder("Field6", &["A", "B", "C"]),
            encoder("Field12", &["N", "Y"]),
            encoder("PropertyField30", &["N", "Y"]),
            encoder("GeographicField63", &["N", "Y"]),
        ],
        binary_features: strings(&[
            "Field12",
            "PropertyField30",
            "GeographicField63",
            "PersonalField1",
            "PersonalField2",
        ]),
        feature_pairs: strings(&[
            "CoverageField1A",
            "CoverageField1B",
            "CoverageField2A",
            "CoverageField2B",
        ]),
    }
}

/// Validated fixture bundle with default pipeline settings.
pub fn bundle() -> ArtifactBundle {
    ArtifactBundle::from_parts(artifact_parts(), PipelineConfig::default())
        .expect("fixture bundle is valid")
}

fn model_trees() -> Vec<Tree> {
    let stump = |feature: &str, threshold: f64, left: f64, right: f64| Tree {
        nodes: vec![
            Node::Split {
                feature: feature.into(),
                threshold,
                left: 1,
                right: 2,
                default_left: true,
            },
            Node::Leaf { leaf: left },
            Node::Leaf { leaf: right },
        ],
    };
    vec![
        stump("same_value_count", 0.5, -1.0, 1.5),
        stump("Field7", 20.0, 0.3, -0.2),
    ]
}

/// Two-stump model over the fixture schema.
///
/// The clean [`record`] reaches leaves 1.5 and -0.2: margin 1.3.
pub fn model() -> TreeEnsemble {
    let names = bundle().feature_schema().names().map(String::from).collect();
    TreeEnsemble::build(names, 0.0, model_trees()).expect("fixture model is valid")
}

/// One clean record with no missing values.
pub fn record() -> RawRecord {
    RawRecord::from_pairs([
        ("QuoteNumber", Value::Int(1)),
        ("Original_Quote_Date", Value::from("2023-07-15")),
        ("Field6", Value::from("B")),
        ("Field7", Value::Int(23)),
        ("Field10", Value::from("1,165")),
        ("Field12", Value::from("Y")),
        ("PersonalField1", Value::Int(0)),
        ("PersonalField2", Value::Int(1)),
        ("PersonalField84", Value::Int(2)),
        ("PropertyField6", Value::from("N")),
        ("PropertyField29", Value::Int(0)),
        ("PropertyField30", Value::from("N")),
        ("GeographicField10A", Value::Int(25)),
        ("GeographicField63", Value::from("Y")),
        ("SalesField5", Value::Int(5)),
        ("PersonalField9", Value::Int(2)),
        ("SalesField1B", Value::Int(4)),
        ("CoverageField1A", Value::Int(5)),
        ("CoverageField1B", Value::Int(5)),
        ("CoverageField2A", Value::Int(3)),
        ("CoverageField2B", Value::Int(4)),
    ])
}

/// [`record`] as a one-row CSV upload (header line plus one data line).
pub fn csv_upload() -> String {
    let header = INPUT_COLUMNS.join(",");
    let row = "1,2023-07-15,B,23,\"1,165\",Y,0,1,2,N,0,N,25,Y,5,2,4,5,5,3,4";
    format!("{header}\n{row}\n")
}

fn write_json(path: &Path, value: &impl serde::Serialize) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text)?;
    Ok(())
}

/// Write the fixture bundle and model to `dir` under the default file names.
pub fn write_artifacts(dir: &Path) -> Result<ArtifactsConfig> {
    let artifacts = ArtifactsConfig {
        dir: dir.to_path_buf(),
        ..Default::default()
    };
    let parts = artifact_parts();

    write_json(
        &artifacts.resolve(&artifacts.schema),
        &InputSchemaFile {
            columns: parts.input_columns.clone(),
        },
    )?;
    write_json(
        &artifacts.resolve(&artifacts.conversion_rates),
        &ConversionRatesFile {
            tables: parts.conversion_tables.clone(),
        },
    )?;
    write_json(
        &artifacts.resolve(&artifacts.encoders),
        &EncodersFile {
            encoders: parts.encoders.clone(),
        },
    )?;
    write_json(&artifacts.resolve(&artifacts.binary_features), &parts.binary_features)?;
    write_json(&artifacts.resolve(&artifacts.feature_pairs), &parts.feature_pairs)?;

    let names: Vec<String> = ArtifactBundle::from_parts(parts, PipelineConfig::default())?
        .feature_schema()
        .names()
        .map(String::from)
        .collect();
    let model = json!({
        "feature_names": names,
        "base_score": 0.0,
        "trees": model_trees(),
    });
    write_json(&artifacts.resolve(&artifacts.model), &model)?;
    Ok(artifacts)
}
