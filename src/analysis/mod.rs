pub mod degree_days;
pub mod estimate;
pub mod heat_load;
pub mod refine;
pub mod report;
pub mod stats;

pub use degree_days::*;
pub use estimate::*;
pub use heat_load::*;
pub use refine::*;
pub use report::*;
pub use stats::*;
