mod dispatcher;
mod navigation;
mod profile;
mod store;

pub use dispatcher::{DispatchMode, SubmitOutcome, TurnDispatcher};
pub use navigation::{
    Confirm, History, LeaveDecision, LeaveRequest, NavigationGuard, Route, LEAVE_PROMPT,
};
pub use profile::{FetchOutcome, FetchState, ProfileFetch};
pub use store::{Admission, Session, SessionEvent, SessionHandle};
