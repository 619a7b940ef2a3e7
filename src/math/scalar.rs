use std::fmt::{Debug, Display};

use num_traits::Signed;

/// Element type accepted by [`Matrix`](crate::math::matrix::Matrix).
///
/// Any signed integer or float qualifies; the network itself always uses `f64`.
pub trait Scalar: Signed + Copy + PartialOrd + Send + Sync + Debug + Display + 'static {}

impl<T> Scalar for T where T: Signed + Copy + PartialOrd + Send + Sync + Debug + Display + 'static {}
