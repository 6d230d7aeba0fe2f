use super::error::ValidationError;
use super::types::{GroupUpdate, NewGroup, NewPerson, PersonUpdate};

const MAX_NAME_LEN: usize = 100;

fn validate_group_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyGroupName);
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::GroupNameTooLong);
    }
    Ok(())
}

fn validate_person_field(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    if value.len() > MAX_NAME_LEN {
        return Err(ValidationError::FieldTooLong(field));
    }
    Ok(())
}

/// Validates a group before creation.
pub fn validate_new_group(group: &NewGroup) -> Result<(), ValidationError> {
    validate_group_name(&group.group_name)
}

/// Validates the fields present in a group update.
pub fn validate_group_update(update: &GroupUpdate) -> Result<(), ValidationError> {
    match &update.group_name {
        Some(name) => validate_group_name(name),
        None => Ok(()),
    }
}

/// Validates a person before creation.
pub fn validate_new_person(person: &NewPerson) -> Result<(), ValidationError> {
    validate_person_field("firstName", &person.first_name)?;
    validate_person_field("lastName", &person.last_name)?;
    validate_person_field("jobTitle", &person.job_title)
}

/// Validates the fields present in a person update.
pub fn validate_person_update(update: &PersonUpdate) -> Result<(), ValidationError> {
    let fields = [
        ("firstName", &update.first_name),
        ("lastName", &update.last_name),
        ("jobTitle", &update.job_title),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            validate_person_field(field, value)?;
        }
    }
    Ok(())
}
