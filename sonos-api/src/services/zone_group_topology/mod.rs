//! ZoneGroupTopology service
//!
//! Reports the household topology: which speakers are grouped together, who
//! coordinates each group and where every member lives on the network.

pub mod operations;

pub use operations::*;
