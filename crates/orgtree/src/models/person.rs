use serde::Deserialize;

use orgtree_core::hierarchy::{GroupId, NewPerson, PersonUpdate};
use orgtree_core::serde::deserialize_nullable;

/// Request payload for creating a new person.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreatePerson {
    pub first_name: String,
    pub last_name: String,
    pub job_title: String,
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

impl CreatePerson {
    pub fn into_new_person(self) -> NewPerson {
        NewPerson::new(self.first_name, self.last_name, self.job_title, self.group_id)
    }
}

/// Request payload for updating a person. `groupId: null` unassigns.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdatePerson {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub group_id: Option<Option<GroupId>>,
}

impl UpdatePerson {
    pub fn into_update(self) -> PersonUpdate {
        PersonUpdate {
            first_name: self.first_name,
            last_name: self.last_name,
            job_title: self.job_title,
            group_id: self.group_id,
        }
    }
}
