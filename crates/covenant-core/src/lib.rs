//! Contract lifecycle kernel: the transition state machine, criteria
//! evaluation coupling, preset catalog, identity directory, and the
//! operator console facade over them.

pub mod console;
pub mod criteria;
pub mod identity;
pub mod lifecycle;
pub mod preset;
