//! Database access for zelo-ra

pub mod alerts;
pub mod events;
pub mod recurrence;
