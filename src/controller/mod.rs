pub mod controller;
pub mod params;
pub mod view;
