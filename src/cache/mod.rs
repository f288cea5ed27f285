pub(crate) mod notes;

pub use notes::{append_note, remove_cascade, replace_note, set_field};
