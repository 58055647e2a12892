pub mod golfer;
pub mod result;
pub mod roster;
pub mod tournament;

pub use golfer::GolferRepository;
pub use result::ResultRepository;
pub use roster::RosterRepository;
pub use tournament::TournamentRepository;
