pub mod bootstrap;
pub mod calibration_usecase;

pub use bootstrap::{MirrorApp, bootstrap, bootstrap_with_output};
pub use calibration_usecase::{CalibrationUseCase, SessionSnapshot};
