//! Probability distributions used by the inference routines
//!
//! Thin helpers over `statrs` so the confidence-interval, normality and
//! portmanteau code can ask for a quantile or tail probability without
//! repeating distribution construction and its error mapping.

use statrs::distribution::{ChiSquared, ContinuousCDF, Normal, StudentsT};

use crate::core::error::{distribution_error, Error, Result};

fn check_probability(p: f64) -> Result<()> {
    if p > 0.0 && p < 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidValue(format!(
            "probability must be in (0, 1), got {}",
            p
        )))
    }
}

/// Standard normal quantile (inverse CDF)
pub fn normal_quantile(p: f64) -> Result<f64> {
    check_probability(p)?;
    let normal = Normal::new(0.0, 1.0).map_err(|e| distribution_error("normal", e))?;
    Ok(normal.inverse_cdf(p))
}

/// Upper tail of a normal distribution N(mean, std²)
pub fn normal_sf(x: f64, mean: f64, std_dev: f64) -> Result<f64> {
    let normal = Normal::new(mean, std_dev).map_err(|e| distribution_error("normal", e))?;
    Ok(normal.sf(x))
}

/// Student's t quantile with `df` degrees of freedom
pub fn student_t_quantile(p: f64, df: f64) -> Result<f64> {
    check_probability(p)?;
    let t = StudentsT::new(0.0, 1.0, df).map_err(|e| distribution_error("Student's t", e))?;
    Ok(t.inverse_cdf(p))
}

/// Upper tail probability of a chi-squared distribution
pub fn chi_squared_sf(x: f64, df: f64) -> Result<f64> {
    let chi2 = ChiSquared::new(df).map_err(|e| distribution_error("chi-squared", e))?;
    Ok(chi2.sf(x))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_quantile() {
        let z = normal_quantile(0.975).unwrap();
        assert!((z - 1.959964).abs() < 1e-5);
        assert!(normal_quantile(0.0).is_err());
        assert!(normal_quantile(1.5).is_err());
    }

    #[test]
    fn test_student_t_quantile() {
        // t_{0.975, 9}
        let t = student_t_quantile(0.975, 9.0).unwrap();
        assert!((t - 2.262157).abs() < 1e-4);
        assert!(student_t_quantile(0.975, 0.0).is_err());
    }

    #[test]
    fn test_chi_squared_sf() {
        // chi2_{0.95, 1} = 3.841459
        let p = chi_squared_sf(3.841459, 1.0).unwrap();
        assert!((p - 0.05).abs() < 1e-5);
        assert!((chi_squared_sf(0.0, 4.0).unwrap() - 1.0).abs() < 1e-12);
    }
}
