use serde::Deserialize;

use orgtree_core::hierarchy::{GroupId, GroupUpdate, NewGroup};
use orgtree_core::serde::deserialize_nullable;

/// Request payload for creating a new group.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateGroup {
    pub group_name: String,
    #[serde(default)]
    pub parent_group_id: Option<GroupId>,
}

impl CreateGroup {
    /// Converts the create request into an insert payload.
    pub fn into_new_group(self) -> NewGroup {
        NewGroup::new(self.group_name, self.parent_group_id)
    }
}

/// Request payload for updating a group.
///
/// `parentGroupId: null` detaches the group into a root; omitting the field
/// keeps the current parent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateGroup {
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub parent_group_id: Option<Option<GroupId>>,
}

impl UpdateGroup {
    pub fn into_update(self) -> GroupUpdate {
        GroupUpdate {
            group_name: self.group_name,
            parent_group_id: self.parent_group_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_group_defaults_to_root() {
        let payload: CreateGroup = serde_json::from_str(r#"{"groupName": "Root"}"#).unwrap();

        assert_eq!(payload.into_new_group(), NewGroup::new("Root", None));
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let detach: UpdateGroup = serde_json::from_str(r#"{"parentGroupId": null}"#).unwrap();
        let keep: UpdateGroup = serde_json::from_str(r#"{"groupName": "Renamed"}"#).unwrap();
        let move_to: UpdateGroup = serde_json::from_str(r#"{"parentGroupId": 4}"#).unwrap();

        assert_eq!(detach.into_update().parent_group_id, Some(None));
        assert_eq!(keep.into_update().parent_group_id, None);
        assert_eq!(move_to.into_update().parent_group_id, Some(Some(4)));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result = serde_json::from_str::<UpdateGroup>(r#"{"parent": 1}"#);

        assert!(result.is_err());
    }
}
