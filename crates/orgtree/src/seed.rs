//! Demo organization loaded by `--seed`.

use orgtree_core::hierarchy::{NewGroup, NewPerson, Result};

use crate::hierarchy::HierarchyService;

/// Group name, index of the parent within this list, and members.
const DEMO_GROUPS: &[(&str, Option<usize>, &[(&str, &str, &str)])] = &[
    ("Acme", None, &[("Grace", "Hopper", "ceo")]),
    (
        "Engineering",
        Some(0),
        &[("Linus", "Torvalds", "manager")],
    ),
    (
        "Platform",
        Some(1),
        &[
            ("Alice", "Smith", "eng"),
            ("Ken", "Thompson", "eng"),
        ],
    ),
    (
        "Frontend",
        Some(1),
        &[("Ada", "Lovelace", "eng"), ("Alan", "Kay", "designer")],
    ),
    ("Sales", Some(0), &[("Bob", "Jones", "sales")]),
];

/// Creates the demo tree through the service so every write is validated.
pub async fn seed_demo_tree(service: &HierarchyService) -> Result<()> {
    let mut ids = Vec::with_capacity(DEMO_GROUPS.len());

    for (name, parent, members) in DEMO_GROUPS {
        let parent_id = parent.and_then(|index| ids.get(index).copied());
        let group = service.create_group(NewGroup::new(*name, parent_id)).await?;

        for (first_name, last_name, job_title) in *members {
            service
                .create_person(NewPerson::new(*first_name, *last_name, *job_title, Some(group.id)))
                .await?;
        }

        ids.push(group.id);
    }

    tracing::info!(groups = ids.len(), "Seeded demo organization");
    Ok(())
}
