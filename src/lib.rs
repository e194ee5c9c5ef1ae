pub mod adapters;
pub mod broadcast;
pub mod params;
