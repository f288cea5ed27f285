use crate::models::Note;

/// A root note and its direct children. Children cannot carry children of
/// their own, so the tree is two levels by construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootNode {
    pub note: Note,
    pub children: Vec<Note>,
}

/// Derives the two-level tree from the flat cache.
///
/// Roots and children keep cache order. A child whose parent is not a root
/// (missing, or itself a child) is left out.
pub fn build_hierarchy(notes: &[Note]) -> Vec<RootNode> {
    let (roots, children): (Vec<&Note>, Vec<&Note>) = notes.iter().partition(|n| n.is_root());

    roots
        .into_iter()
        .map(|root| RootNode {
            note: root.clone(),
            children: children
                .iter()
                .filter(|c| c.parent_ref() == Some(root.id.as_str()))
                .map(|c| (*c).clone())
                .collect(),
        })
        .collect()
}

/// Cached notes that `build_hierarchy` hides.
pub fn orphans(notes: &[Note]) -> Vec<&Note> {
    notes
        .iter()
        .filter(|n| match n.parent_ref() {
            None => false,
            Some(parent) => !notes.iter().any(|r| r.is_root() && r.id == parent),
        })
        .collect()
}

/// Normalizes a create target so the new note lands at most one level deep.
///
/// A root target is kept. A child target is flattened to its root. An unknown
/// target, or a child whose own parent is unknown, yields a root-level create.
pub fn resolve_parent(notes: &[Note], requested: Option<&str>) -> Option<String> {
    let requested = requested.filter(|id| !id.is_empty())?;
    let target = notes.iter().find(|n| n.id == requested)?;

    match target.parent_ref() {
        None => Some(target.id.clone()),
        Some(grand) => notes
            .iter()
            .find(|n| n.id == grand && n.is_root())
            .map(|root| root.id.clone()),
    }
}
