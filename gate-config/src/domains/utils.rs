//! Default functions for serde

pub fn default_true() -> bool {
    true
}
