//! CSV Snapshot Adapter
//!
//! Implements the `RowSource` port against the CSV file WeeWX writes to
//! the ramdisk each archive interval.

pub mod reader;

pub use reader::CsvRowSource;
