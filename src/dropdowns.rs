//! Option-set adapters for the two dropdowns the page hosts.
//!
//! The backend ships raw data; these turn it into one option set per field
//! of a [`DropdownController`].

use std::collections::BTreeMap;

use cg_ui::{DropdownController, DropdownError, DropdownOption};
use serde::Deserialize;

/// Container of the character dropdown
pub const CHARACTER_CONTAINER: &str = "mydropdown-container";
/// Container of the view dropdown
pub const VIEW_CONTAINER: &str = "myviews-container";

const CHARACTER_LABELS: [&str; 4] = ["character1", "character2", "character3", "original_character"];
const VIEW_LABELS: [&str; 4] = ["angle", "camera", "background", "view"];
const VIEW_KEYS: [&str; 4] = ["angle", "camera", "background", "style"];

/// Raw option data as sent by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OptionData {
    /// `[[keys], [values]]` shared by all but the last field
    Character(Vec<String>, Vec<String>),
    /// One list per view category
    View(BTreeMap<String, Vec<String>>),
}

/// Which adapter a dropdown uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Character,
    View,
}

impl OptionKind {
    pub fn for_container(container: &str) -> Option<Self> {
        match container {
            CHARACTER_CONTAINER => Some(OptionKind::Character),
            VIEW_CONTAINER => Some(OptionKind::View),
            _ => None,
        }
    }

    pub fn default_labels(&self) -> Vec<String> {
        let labels: &[&str] = match self {
            OptionKind::Character => &CHARACTER_LABELS,
            OptionKind::View => &VIEW_LABELS,
        };
        labels.iter().map(|l| l.to_string()).collect()
    }

    /// A fresh controller for this kind. Only the character list previews
    /// the hovered option.
    pub fn controller(&self) -> DropdownController {
        DropdownController::new(self.default_labels())
            .searchable(true)
            .hover_preview(*self == OptionKind::Character)
    }

    /// Build the option sets for `count` fields.
    pub fn option_sets(
        &self,
        data: &OptionData,
        originals: &[String],
        count: usize,
    ) -> Result<Vec<Vec<DropdownOption>>, DropdownError> {
        match (self, data) {
            (OptionKind::Character, OptionData::Character(keys, values)) => {
                character_options(keys, values, originals, count)
            }
            (OptionKind::View, OptionData::View(data)) => view_options(data, count),
            _ => Err(DropdownError::InvalidOptions(format!(
                "{:?} data for a {:?} dropdown",
                data, self
            ))),
        }
    }
}

/// Character list: the first `count - 1` fields share the key/value pairs,
/// the last one offers the `originals` keyed by themselves.
pub fn character_options(
    keys: &[String],
    values: &[String],
    originals: &[String],
    count: usize,
) -> Result<Vec<Vec<DropdownOption>>, DropdownError> {
    if keys.len() != values.len() {
        return Err(DropdownError::InvalidOptions(format!(
            "{} keys for {} values",
            keys.len(),
            values.len()
        )));
    }
    if count == 0 {
        return Ok(Vec::new());
    }

    let shared: Vec<DropdownOption> = keys
        .iter()
        .zip(values)
        .map(|(key, value)| DropdownOption::new(key.clone(), value.clone()))
        .collect();
    let mut sets = vec![shared; count - 1];
    sets.push(originals.iter().cloned().map(DropdownOption::keyed).collect());
    Ok(sets)
}

/// View list: one category per field, in angle, camera, background, style
/// order.
pub fn view_options(
    data: &BTreeMap<String, Vec<String>>,
    count: usize,
) -> Result<Vec<Vec<DropdownOption>>, DropdownError> {
    if data.len() != count {
        return Err(DropdownError::InvalidOptions(format!(
            "{} view categories for {} fields",
            data.len(),
            count
        )));
    }
    VIEW_KEYS
        .iter()
        .take(count)
        .map(|key| {
            data.get(*key)
                .map(|items| items.iter().cloned().map(DropdownOption::keyed).collect())
                .ok_or_else(|| DropdownError::InvalidOptions(format!("missing '{}'", key)))
        })
        .collect()
}

/// Split a comma-separated label list.
pub fn parse_labels(text: &str) -> Vec<String> {
    text.split(',').map(|label| label.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_character_options() {
        let sets = character_options(
            &strings(&["Alice", "Bob"]),
            &strings(&["alice (series)", "Bob"]),
            &strings(&["none", "oc1"]),
            4,
        )
        .unwrap();
        assert_eq!(sets.len(), 4);
        assert_eq!(sets[0], sets[2]);
        assert_eq!(sets[0][0].label(false), "Alice\n(alice (series))");
        assert_eq!(sets[0][1].label(false), "Bob");
        assert_eq!(sets[3][1], DropdownOption::keyed("oc1"));

        assert!(character_options(&strings(&["a"]), &[], &[], 4).is_err());
    }

    #[test]
    fn test_view_options() {
        let data: OptionData = serde_json::from_str(
            r#"{"angle":["front"],"camera":["close-up","wide"],"background":["sky"],"style":["anime"]}"#,
        )
        .unwrap();
        let sets = OptionKind::View.option_sets(&data, &[], 4).unwrap();
        assert_eq!(sets[1].len(), 2);
        assert_eq!(sets[3][0].key, "anime");

        let missing: OptionData =
            serde_json::from_str(r#"{"angle":[],"camera":[],"background":[],"styles":[]}"#).unwrap();
        assert!(OptionKind::View.option_sets(&missing, &[], 4).is_err());
    }

    #[test]
    fn test_option_data_shapes() {
        let data: OptionData = serde_json::from_str(r#"[["k"],["v"]]"#).unwrap();
        assert_eq!(data, OptionData::Character(strings(&["k"]), strings(&["v"])));
        assert!(OptionKind::View.option_sets(&data, &[], 4).is_err());
        assert_eq!(
            OptionKind::for_container(CHARACTER_CONTAINER),
            Some(OptionKind::Character)
        );
        assert_eq!(parse_labels("a, b ,c"), strings(&["a", "b", "c"]));
    }
}
