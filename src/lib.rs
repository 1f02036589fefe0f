pub mod catalog;
pub mod constants;
pub mod diagnostics;
pub mod geometry;
pub mod kepler;
pub mod orbit;
pub mod ref_frame;
pub mod result_cache;
pub mod time;
pub mod uvplan_errors;
