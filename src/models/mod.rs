pub mod booking;
pub mod profile;
pub mod quote;
pub mod service;

pub use booking::{Booking, BookingStatus};
pub use profile::{Profile, UserRole};
pub use quote::{QuoteRequest, QuoteStatus, QuoteSubmission};
pub use service::{Service, ServiceDraft};
