use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;

use crate::election::*;

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: Option<String>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

/// The configuration as written in the summary.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    pub rule: String,
    pub tiebreak: String,
    #[serde(rename = "numberOfWinners")]
    pub number_of_winners: u32,
    pub quota: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputSource {
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    #[serde(rename = "firstValueColumnIndex")]
    pub _first_value_column_index: Option<JSValue>,
    #[serde(rename = "hasHeader")]
    pub has_header: Option<bool>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl InputSource {
    /// The column of the first value, starting from 0. The configuration counts from 1.
    pub fn first_value_column_index(&self) -> ScResult<usize> {
        match &self._first_value_column_index {
            None => Ok(0),
            x => {
                let idx = read_js_int(x)?;
                ensure!(idx >= 1, ParsingJsonNumberSnafu { content: idx.to_string() });
                Ok(idx - 1)
            }
        }
    }

    pub fn has_header(&self) -> bool {
        self.has_header.unwrap_or(true)
    }

    /// The provider, either given or guessed from the extension of the file.
    pub fn provider(&self) -> String {
        if let Some(p) = &self.provider {
            return p.clone();
        }
        let ext = self
            .file_path
            .as_ref()
            .and_then(|p| Path::new(p).extension())
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match ext.as_deref() {
            Some("xlsx") => "xlsx".to_string(),
            _ => "csv".to_string(),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ScRules {
    #[serde(default = "default_rule")]
    pub rule: String,
    #[serde(rename = "tiebreakMode")]
    pub tiebreak_mode: Option<String>,
    #[serde(rename = "randomSeed")]
    pub random_seed: Option<JSValue>,
    #[serde(rename = "tiebreakAgent")]
    pub tiebreak_agent: Option<u32>,
    pub dictator: Option<u32>,
    #[serde(rename = "numberOfWinners")]
    pub number_of_winners: Option<u32>,
    #[serde(rename = "scoreVector")]
    pub score_vector: Option<Vec<f64>>,
    #[serde(rename = "rangeMin")]
    pub range_min: Option<f64>,
    #[serde(rename = "rangeMax")]
    pub range_max: Option<f64>,
}

fn default_rule() -> String {
    "plurality".to_string()
}

impl Default for ScRules {
    fn default() -> ScRules {
        ScRules {
            rule: default_rule(),
            tiebreak_mode: None,
            random_seed: None,
            tiebreak_agent: None,
            dictator: None,
            number_of_winners: None,
            score_vector: None,
            range_min: None,
            range_max: None,
        }
    }
}

impl ScRules {
    /// The seed is written as a number or as a string of digits.
    pub fn random_seed(&self) -> ScResult<Option<u64>> {
        match &self.random_seed {
            None => Ok(None),
            Some(JSValue::Number(n)) => n.as_u64().map(Some).context(ParsingJsonNumberSnafu {
                content: n.to_string(),
            }),
            Some(JSValue::String(s)) => s.trim().parse::<u64>().ok().map(Some).context(
                ParsingJsonNumberSnafu {
                    content: s.clone(),
                },
            ),
            Some(x) => None.context(ParsingJsonNumberSnafu {
                content: x.to_string(),
            }),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "inputSource", default)]
    pub input_source: InputSource,
    #[serde(default)]
    pub rules: ScRules,
}

pub fn parse_config(content: &str) -> ScResult<ScConfig> {
    serde_json::from_str(content).context(ParsingJsonSnafu {})
}

/// Reads a configuration file. The paths it contains are resolved against
/// the directory of the file.
pub fn read_config(path: &str) -> ScResult<ScConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let mut config = parse_config(contents.as_str())?;
    let root = Path::new(path).parent().context(MissingParentDirSnafu {})?;
    if let Some(p) = &config.input_source.file_path {
        config.input_source.file_path = Some(root.join(p).display().to_string());
    }
    match &config.output_settings.output_path {
        Some(p) if p != "stdout" => {
            config.output_settings.output_path = Some(root.join(p).display().to_string());
        }
        _ => {}
    }
    Ok(config)
}

pub fn read_summary(path: &str) -> ScResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
}

/// Reads a positive integer, written either as a number, as a string or
/// as an Excel-style column name (A is 1).
fn read_js_int(x: &Option<JSValue>) -> ScResult<usize> {
    match x {
        Some(JSValue::Number(n)) => n.as_u64().map(|x| x as usize).context(ParsingJsonNumberSnafu {
            content: n.to_string(),
        }),
        Some(JSValue::String(s)) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            Ok(s.to_ascii_lowercase()
                .chars()
                .fold(0, |acc, c| acc * 26 + (c as usize) - ('a' as usize) + 1))
        }
        Some(JSValue::String(s)) => s.trim().parse::<usize>().ok().context(ParsingJsonNumberSnafu {
            content: s.clone(),
        }),
        x => None.context(ParsingJsonNumberSnafu {
            content: format!("{:?}", x),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_full_config() {
        let config = parse_config(
            r#"{
            "outputSettings": {"contestName": "Board", "outputPath": "summary.json"},
            "inputSource": {"provider": "csv", "filePath": "values.csv",
                            "firstValueColumnIndex": 2, "hasHeader": true},
            "rules": {"rule": "stv", "tiebreakMode": "random", "randomSeed": "42",
                      "numberOfWinners": 2}
        }"#,
        )
        .unwrap();
        assert_eq!(config.output_settings.contest_name, Some("Board".to_string()));
        assert_eq!(config.input_source.first_value_column_index().unwrap(), 1);
        assert!(config.input_source.has_header());
        assert_eq!(config.rules.rule, "stv");
        assert_eq!(config.rules.random_seed().unwrap(), Some(42));
        assert_eq!(config.rules.number_of_winners, Some(2));
    }

    #[test]
    fn parse_empty_config() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config, ScConfig::default());
        assert_eq!(config.rules.rule, "plurality");
        assert_eq!(config.input_source.first_value_column_index().unwrap(), 0);
        assert_eq!(config.input_source.provider(), "csv");
    }

    #[test]
    fn provider_from_extension() {
        let source = InputSource {
            file_path: Some("data/Values.XLSX".to_string()),
            ..InputSource::default()
        };
        assert_eq!(source.provider(), "xlsx");
    }

    #[test]
    fn column_indexes() {
        assert_eq!(read_js_int(&Some(json!(3))).unwrap(), 3);
        assert_eq!(read_js_int(&Some(json!("3"))).unwrap(), 3);
        assert_eq!(read_js_int(&Some(json!("C"))).unwrap(), 3);
        assert_eq!(read_js_int(&Some(json!("AB"))).unwrap(), 28);
        assert!(read_js_int(&Some(json!(-1))).is_err());
        assert!(read_js_int(&None).is_err());

        let source = InputSource {
            _first_value_column_index: Some(json!(0)),
            ..InputSource::default()
        };
        assert!(source.first_value_column_index().is_err());
    }

    #[test]
    fn random_seeds() {
        let seed_of = |js: JSValue| ScRules {
            random_seed: Some(js),
            ..ScRules::default()
        }
        .random_seed();
        assert_eq!(seed_of(json!(7)).unwrap(), Some(7));
        assert_eq!(seed_of(json!(" 18446744073709551615 ")).unwrap(), Some(u64::MAX));
        assert!(seed_of(json!("AB")).is_err());
        assert!(seed_of(json!(-3)).is_err());
        assert!(seed_of(json!(1.5)).is_err());
        assert!(seed_of(json!([1])).is_err());
        assert_eq!(ScRules::default().random_seed().unwrap(), None);
    }

    #[test]
    fn malformed_config() {
        let err = parse_config(r#"{"rules": {"numberOfWinners": "two"}}"#).unwrap_err();
        assert!(matches!(err, ScError::ParsingJson { .. }));
    }
}
