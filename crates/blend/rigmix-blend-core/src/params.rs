//! Named-parameter store consumed for blend weights.
//!
//! Hosts implement this over whatever owns their animation parameters; the
//! core only ever reads. Plain hash maps work out of the box for tests and
//! simple orchestrators.

/// Read-only view of named scalar parameters.
pub trait ParamStore {
    fn get(&self, key: &str) -> Option<f64>;
}

impl ParamStore for std::collections::HashMap<String, f64> {
    fn get(&self, key: &str) -> Option<f64> {
        std::collections::HashMap::get(self, key).copied()
    }
}

impl ParamStore for hashbrown::HashMap<String, f64> {
    fn get(&self, key: &str) -> Option<f64> {
        hashbrown::HashMap::get(self, key).copied()
    }
}
