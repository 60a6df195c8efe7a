pub mod id;
pub mod rules;
pub mod names;
pub mod query;
pub mod mask;
pub mod pose;
pub mod clip;

pub use id::*;
pub use rules::*;
pub use names::*;
pub use query::*;
pub use mask::*;
pub use pose::*;
pub use clip::*;
