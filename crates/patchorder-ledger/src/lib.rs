mod history;
mod state;

pub use history::PatchHistory;
pub use state::AppliedPatchRecord;
