use crate::allocation::*;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "preferenceCountFile")]
    pub preference_count_file: Option<String>,
    #[serde(rename = "scoreWiseFile")]
    pub score_wise_file: Option<String>,
    #[serde(rename = "rollWiseFile")]
    pub roll_wise_file: Option<String>,
    #[serde(rename = "generateSummaryJson")]
    pub generate_summary_json: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllocRules {
    #[serde(rename = "duplicateRankMode")]
    pub duplicate_rank_mode: Option<String>,
}

impl AllocRules {
    pub fn allocation_rules(&self) -> AllocResult<AllocationRules> {
        let duplicate_rank_mode = match self.duplicate_rank_mode.as_deref() {
            None | Some("reject") => DuplicateRankMode::Reject,
            Some("useColumnOrder") => DuplicateRankMode::UseColumnOrder,
            Some(x) => whatever!("unknown duplicate rank mode: {}", x),
        };
        Ok(AllocationRules {
            duplicate_rank_mode,
        })
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllocConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "inputSource", default)]
    pub input_source: FileSource,
    #[serde(default)]
    pub rules: AllocRules,
}

pub fn read_config(path: &str) -> AllocResult<AllocConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read_config: content: {:?}", contents);
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> AllocResult<AllocConfig> {
    serde_json::from_str(contents).context(ParsingJsonSnafu {})
}
