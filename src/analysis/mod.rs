// src/analysis/mod.rs
//
// Numeric side of the engine.
//
// Signal flow:
//   tracked points → physics (speed / angle / distance samples)
//                  → trajectory (overlay curve, view space)
//   Both fit through parabola::fit_parabola.

pub mod outlier_filter;
pub mod parabola;
pub mod physics;
pub mod trajectory;

pub use outlier_filter::remove_outliers;
pub use parabola::{fit_parabola, solve_3x3, ParabolaCoefficients};
pub use physics::{first_speed_calc_point, PhysicsEstimator, PhysicsSample};
pub use trajectory::{trajectory_curve, TrajectoryCurve};
