// Shared fixtures for the integration and contract test targets
//
// Each test target pulls these in with
//   #[path = "../helpers/mod.rs"] mod helpers;
// so not every target uses every helper or re-export.
#![allow(dead_code, unused_imports)]

pub mod test_data;

pub use failing_store::*;
pub use recording_sink::*;
pub use test_data::*;
pub use test_database::*;
