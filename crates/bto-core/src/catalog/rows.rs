use std::io::Read;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use crate::allocation::UserId;

#[derive(Debug, Deserialize)]
pub(crate) struct UserRow {
    #[serde(rename = "National ID")]
    pub(crate) national_id: String,
    #[serde(rename = "Name")]
    pub(crate) name: String,
    #[serde(rename = "Age")]
    pub(crate) age: u8,
    #[serde(rename = "Marital Status")]
    pub(crate) marital_status: String,
    #[serde(rename = "Role")]
    pub(crate) role: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectRow {
    #[serde(rename = "Project Name")]
    pub(crate) name: String,
    #[serde(rename = "Neighborhood")]
    pub(crate) neighborhood: String,
    #[serde(rename = "Opens On")]
    pub(crate) opens_on: NaiveDate,
    #[serde(rename = "Closes On")]
    pub(crate) closes_on: NaiveDate,
    #[serde(rename = "Two Room Units", default)]
    pub(crate) two_room_units: Option<u32>,
    #[serde(rename = "Three Room Units", default)]
    pub(crate) three_room_units: Option<u32>,
    #[serde(rename = "Officer Slots")]
    pub(crate) officer_slots: usize,
    #[serde(rename = "Manager")]
    pub(crate) manager: String,
    #[serde(rename = "Officers", default, deserialize_with = "empty_string_as_none")]
    pub(crate) officers: Option<String>,
    #[serde(rename = "Visible", default)]
    pub(crate) visible: Option<bool>,
}

impl ProjectRow {
    /// The `Officers` column holds a semicolon-separated national-id list.
    pub(crate) fn officer_ids(&self) -> Vec<UserId> {
        self.officers
            .as_deref()
            .map(|list| {
                list.split(';')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(|id| UserId(id.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

pub(crate) fn parse_users<R: Read>(reader: R) -> Result<Vec<UserRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    csv_reader.deserialize::<UserRow>().collect()
}

pub(crate) fn parse_projects<R: Read>(reader: R) -> Result<Vec<ProjectRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    csv_reader.deserialize::<ProjectRow>().collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
