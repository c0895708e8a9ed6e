pub mod forecast;
pub mod station;
