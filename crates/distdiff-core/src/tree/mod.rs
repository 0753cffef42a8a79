//! Reading distribution trees and the baseline ADDED/REMOVED/SAME split.

pub mod baseline;
pub mod reader;

pub use baseline::baseline_diff;
pub use reader::{read_tree, relative_path_of};
