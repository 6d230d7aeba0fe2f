mod group;
mod person;

pub use group::{CreateGroup, UpdateGroup};
pub use person::{CreatePerson, UpdatePerson};
