//! Application state module

mod app_state;
mod draft;
mod estimation;
mod exclusions;
mod forms;
mod survey;
mod wizard;

pub use app_state::*;
pub use draft::*;
pub use estimation::*;
pub use exclusions::*;
pub use forms::*;
pub use survey::*;
pub use wizard::*;
