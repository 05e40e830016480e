pub mod booking;
pub mod catalog;
pub mod dashboard;
pub mod estimator;
pub mod identity;
pub mod occupancy;
pub mod quote;
pub mod slots;
