pub mod indexer;
pub mod object;
pub mod participation;
pub mod quests;
pub mod submissions;

pub use object::*;
pub use participation::*;
pub use quests::*;
pub use submissions::*;
