use serde::{Deserialize, Serialize};

use crate::constants::{COLLABORATOR_ROLE_TAG, MINISTER_ROLE_TAGS, OUTPUT_MINISTER_ROLE};

/// Root output entity: one government office-holder.
///
/// Field order is the compatibility contract with the front-end and is
/// reproduced as-is by serde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Minister {
    pub id: String,
    pub name: String,
    pub role: String,
    pub email: String,
    pub party: String,
    pub photo: String,
    pub portfolio: String,
    pub description: String,
    pub superior_id: Option<String>,
    pub ministries: Vec<Ministry>,
    pub biography: Vec<BiographyEntry>,
    pub collaborators: Vec<Collaborator>,
    pub delegates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ministry {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub color: String,
    pub is_primary: bool,
    pub role_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiographyEntry {
    pub title: String,
    pub organization: String,
    pub bio_section: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub event_date: Option<String>,
    pub event_text: Option<String>,
    pub ongoing: bool,
    /// Ordering key only, never an identifier
    pub sort_index: i64,
}

/// Cabinet member attached to its superior minister.
/// Keeps the snake_case names the cabinet view reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collaborator {
    pub id: String,
    pub name: String,
    pub full_name: String,
    pub superior_id: String,
    pub job_title: Option<String>,
    pub cabinet_role: Option<String>,
    pub cabinet_order: i64,
    pub cabinet_badge: Option<String>,
    pub collab_grade: Option<String>,
    pub pole_name: Option<String>,
    pub photo_url: Option<String>,
    pub description: Option<String>,
}

/// Role tag carried by a person row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonRole {
    /// Any of the office-holder tags; keeps the source tag for logging
    Minister(String),
    Collaborator,
    Other(String),
}

impl PersonRole {
    pub fn parse(tag: &str) -> Self {
        let tag = tag.trim().to_lowercase();
        if MINISTER_ROLE_TAGS.contains(&tag.as_str()) {
            PersonRole::Minister(tag)
        } else if tag == COLLABORATOR_ROLE_TAG {
            PersonRole::Collaborator
        } else {
            PersonRole::Other(tag)
        }
    }

    pub fn is_minister(&self) -> bool {
        matches!(self, PersonRole::Minister(_))
    }

    /// Normalized role emitted on output records, if this role produces one
    pub fn output_role(&self) -> Option<&'static str> {
        match self {
            PersonRole::Minister(_) => Some(OUTPUT_MINISTER_ROLE),
            PersonRole::Collaborator | PersonRole::Other(_) => None,
        }
    }
}

impl Minister {
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minister_tags_collapse_to_single_role() {
        for tag in ["minister", "Minister-Delegate", " ministre-delegue ", "president"] {
            let role = PersonRole::parse(tag);
            assert!(role.is_minister(), "{tag} should be a minister tag");
            assert_eq!(role.output_role(), Some("minister"));
        }
    }

    #[test]
    fn test_collaborator_and_unknown_tags() {
        assert_eq!(PersonRole::parse("collaborator"), PersonRole::Collaborator);
        assert_eq!(PersonRole::parse("advisor"), PersonRole::Other("advisor".to_string()));
        assert_eq!(PersonRole::parse("advisor").output_role(), None);
    }

    #[test]
    fn test_minister_serializes_in_contract_order() {
        let m = Minister {
            id: "m1".to_string(),
            name: "A".to_string(),
            role: "minister".to_string(),
            email: String::new(),
            party: String::new(),
            photo: String::new(),
            portfolio: String::new(),
            description: String::new(),
            superior_id: None,
            ministries: Vec::new(),
            biography: Vec::new(),
            collaborators: Vec::new(),
            delegates: Vec::new(),
        };
        let json = serde_json::to_string(&m).unwrap();
        let keys = [
            "\"id\"", "\"name\"", "\"role\"", "\"email\"", "\"party\"", "\"photo\"",
            "\"portfolio\"", "\"description\"", "\"superiorId\"", "\"ministries\"",
            "\"biography\"", "\"collaborators\"", "\"delegates\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");
    }
}
