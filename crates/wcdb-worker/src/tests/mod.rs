//! Test suites for the database worker.

mod dispatch_behaviour;
pub(crate) mod support;
