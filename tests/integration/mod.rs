//! Integration tests driving the relver binary in temporary git repositories

mod helpers;
mod test_apply;
mod test_bump;
mod test_changed;
mod test_manifest;
mod test_notes;
mod test_tag;
