/// Dense matrix ops and their application to state vectors.
pub mod matrix_ops;
/// Measurement probabilities, sampling and collapse.
pub mod measurement_ops;
