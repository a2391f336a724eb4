//! MembershipRecord - which resources a registrant's license covers
//!
//! Storage keeps the member list serialized as a JSON array of strings.
//! Duplicate entries are kept: they count towards usage ranking.

use serde::{Deserialize, Serialize};

use crate::error::{ResmanError, Result};

/// An owner and the resource identifiers it references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRecord {
    /// Registrant identifier
    pub owner_id: String,
    /// Referenced resource identifiers, duplicates preserved
    pub member_ids: Vec<String>,
}

impl MembershipRecord {
    pub fn new<I, S>(owner_id: impl Into<String>, member_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            owner_id: owner_id.into(),
            member_ids: member_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Decode a stored row whose member list is a JSON array of strings
    pub fn from_json(owner_id: &str, payload: &str) -> Result<Self> {
        let member_ids: Vec<String> =
            serde_json::from_str(payload).map_err(|e| ResmanError::InvalidMembership {
                owner_id: owner_id.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            owner_id: owner_id.to_string(),
            member_ids,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.member_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let record = MembershipRecord::from_json("1122", r#"["model-a", "model-b", "model-a"]"#)
            .unwrap();
        assert_eq!(record.owner_id, "1122");
        assert_eq!(record.member_ids, vec!["model-a", "model-b", "model-a"]);
    }

    #[test]
    fn test_from_json_empty_list() {
        let record = MembershipRecord::from_json("1122", "[]").unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        for payload in ["", "model-a", r#"{"a": 1}"#, "[1, 2]", r#"["a""#] {
            let err = MembershipRecord::from_json("1122", payload).unwrap_err();
            assert!(matches!(err, ResmanError::InvalidMembership { .. }), "{payload}");
        }
    }
}
