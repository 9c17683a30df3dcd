//! Arrow and other network exporters.
//!
//! This module provides writers and readers for network export/import in various formats,
//! with emphasis on the normalized Arrow directory format for lossless roundtrips.

pub mod arrow_directory_reader;
pub mod arrow_directory_writer;

pub use arrow_directory_reader::{open_arrow_directory, ArrowDirectoryReader};
pub use arrow_directory_writer::{
    write_network_to_arrow_directory, ArrowDirectoryWriter, SystemInfo,
};
