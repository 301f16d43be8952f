use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KnotworkError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Parameter {param} is outside the domain [{min}, {max}]")]
    OutOfDomain { param: f64, min: f64, max: f64 },

    #[error("Knot {knot} would reach multiplicity {requested}, maximum is {max}")]
    MultiplicityExceeded {
        knot: f64,
        requested: usize,
        max: usize,
    },

    #[error("Degenerate weights: rational denominator {0} is too close to zero")]
    DegenerateWeights(f64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, KnotworkError>;
