pub mod golfer;
pub mod normalized_name;
pub mod result_record;
pub mod roster_entry;
pub mod status;
pub mod tournament;

pub use golfer::Golfer;
pub use normalized_name::NormalizedFullName;
pub use result_record::{NewResultRecord, Placement, ResultRecord};
pub use roster_entry::{NewRosterEntry, RosterEntry};
pub use status::CanonicalStatus;
pub use tournament::Tournament;
