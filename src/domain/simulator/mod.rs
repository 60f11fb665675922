pub mod simulator;

mod simulator_tests;

pub use simulator::{SimulationState, Simulator};
