use crate::errors::CancelGuardError;

// Validation
pub fn validate_float_parameter(value: f64, min: f64, max: f64, parameter: &str) -> Result<(), CancelGuardError> {
    if value.is_nan() || value < min || max < value {
        let ex_msg = format!("real value within range {} and {}", min, max);
        Err(CancelGuardError::InvalidParameter(
            parameter.to_string(),
            ex_msg,
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

pub fn validate_positive_usize_parameter(value: usize, parameter: &str) -> Result<(), CancelGuardError> {
    if value == 0 {
        Err(CancelGuardError::InvalidParameter(
            parameter.to_string(),
            "positive integer".to_string(),
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

pub fn precision_round(n: f64, precision: i32) -> f64 {
    let p = (10.0_f64).powi(precision);
    (n * p).round() / p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_round() {
        assert_eq!(precision_round(68.556363, 2), 68.56);
        assert_eq!(precision_round(0.123456, 3), 0.123);
    }

    #[test]
    fn test_validate_float_parameter() {
        assert!(validate_float_parameter(0.2, 0.0, 1.0, "test_size").is_ok());
        assert!(validate_float_parameter(1.5, 0.0, 1.0, "test_size").is_err());
        assert!(validate_float_parameter(f64::NAN, 0.0, 1.0, "test_size").is_err());
        assert!(validate_positive_usize_parameter(0, "max_depth").is_err());
        assert!(validate_positive_usize_parameter(8, "max_depth").is_ok());
    }
}
