mod match_record;
mod ruleset;
mod venue;

pub use match_record::{EntryMethod, MatchRecord, MatchType};
pub use ruleset::{GameMode, Ruleset, UmaRule};
pub use venue::Venue;
