// Service exports
pub mod venue_store;
pub mod weather;

pub use venue_store::{LoadOptions, StoreError, VenueStore};
pub use weather::{WeatherError, WeatherService};
