// # Mapping Source Implementations
//
// This module provides implementations of the MappingSource trait.

pub mod file;
pub mod fixed;

pub use file::FileMappingSource;
pub use fixed::StaticMappingSource;
