pub mod states;
pub mod region;
pub mod params;
pub mod engine;
pub mod collision;
pub mod quadtree;
pub mod integrator;
pub mod scenario;
