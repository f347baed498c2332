// Business logic services layer
//
// Higher-level operations composed from several API calls, reusable from the
// CLI or any other front end.

pub mod artifacts;
pub mod monitoring;
