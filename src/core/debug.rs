// Copyright @yucwang 2026

use crate::math::constants::Float;
use crate::math::spectrum::SpectralResponse;

/// Values checked by `validate!`: finite and non-negative.
pub trait Validate {
    fn is_valid_value(&self) -> bool;
    fn describe(&self) -> String;
}

impl Validate for Float {
    fn is_valid_value(&self) -> bool {
        self.is_finite() && *self >= 0.0
    }

    fn describe(&self) -> String {
        format!("{}", self)
    }
}

impl Validate for SpectralResponse {
    fn is_valid_value(&self) -> bool {
        self.is_valid()
    }

    fn describe(&self) -> String {
        format!("{:?}", self)
    }
}

pub fn report_invalid_value(name: &str, value: &dyn Validate, file: &str, line: u32) {
    log::error!("Validation failed: {} ({}) at {} [{}]", name, value.describe(), file, line);
    if cfg!(feature = "diagnostics") {
        panic!("invalid value {} at {}:{}", name, file, line);
    }
}

/// Debug-build invariant hook; compiled out of release builds.
#[macro_export]
macro_rules! validate {
    ($value:expr) => {
        #[cfg(debug_assertions)]
        {
            let v = &$value;
            if !$crate::core::debug::Validate::is_valid_value(v) {
                $crate::core::debug::report_invalid_value(stringify!($value), v, file!(), line!());
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::Validate;
    use crate::math::spectrum::SpectralQuery;

    #[test]
    fn test_validation_predicates() {
        assert!(1.0f32.is_valid_value());
        assert!(!(-1.0f32).is_valid_value());
        assert!(!std::f32::NAN.is_valid_value());
        let q = SpectralQuery::sample(0.5);
        assert!(q.constant(2.0).is_valid_value());
        assert!(!q.constant(std::f32::INFINITY).is_valid_value());
    }

    #[cfg(not(feature = "diagnostics"))]
    #[test]
    fn test_invalid_value_is_reported_not_fatal() {
        let bad = -3.0f32;
        validate!(bad);
    }
}
