#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
pub extern crate vector;

pub mod accumulator;
pub mod constants;
pub mod couplings;
pub mod error;
pub mod integrand;
pub mod integrator;
pub mod loop_functions;
pub mod matrix_elements;
pub mod pdf;
pub mod phase_space_generator;
pub mod run_card;

pub use crate::error::{Error, Result};
pub use crate::integrand::Integrand;
pub use crate::integrator::{IntegrationResult, Integrator, IntegratorSettings, IntegratorState};
pub use crate::run_card::{Process, RunCard};
