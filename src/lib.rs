// Categorical axis support for 2-D plotting pipelines.
//
// Plotting pipelines work on numeric coordinate pairs. Given a series like
// [["February", 34], ["March", 20], ...], this crate maps each textual label
// to a stable numeric index, rewrites the point buffer in place, and supplies
// a tick generator that shows the original labels on the axis. The finished
// mapping stays available on the axis (`axis.category`) for inverse lookups
// by tooltips and click handlers.

pub mod category;
pub mod format;
pub mod pipeline;
pub mod points;
pub mod series;
pub mod ticks;
