pub mod pricing;
pub mod workflow;

pub use pricing::PriceBreakdown;
pub use workflow::{
    BookingAttempt, BookingOrchestrator, CancellationOutcome, Confirmation, PassengerDetails,
    Presenter, RouteQuery, SeatMap, SeatState, Stage, WorkflowError,
};
