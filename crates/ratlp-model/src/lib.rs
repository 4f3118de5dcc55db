mod format;
mod instance;

pub use format::{FormatError, parse_rational};
pub use instance::{IntoRational, LpInstance, ModelError, dot, rational_to_f64};
pub use num_bigint::BigInt;
pub use num_rational::BigRational;
