pub mod dashboard;
pub mod expiry;
pub mod links;
pub mod validation;
