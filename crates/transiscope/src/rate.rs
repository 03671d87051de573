//! Event density with a Poisson counting error.

/// Events per second per square micrometer.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct RateEstimate {
    pub rate: f64,
    pub standard_error: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateError {
    /// No pixel size was ever applied, so there is no physical area.
    MissingArea,
    NonPositiveArea { area: f64 },
    NonPositiveDuration { duration: f64 },
}

impl std::fmt::Display for RateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingArea => write!(f, "physical area is not set"),
            Self::NonPositiveArea { area } => write!(f, "area must be > 0 um^2, got {}", area),
            Self::NonPositiveDuration { duration } => {
                write!(f, "observation duration must be > 0 s, got {}", duration)
            }
        }
    }
}

impl std::error::Error for RateError {}

/// `rate = n / (T * A)`, `standard_error = sqrt(n) / (T * A)`.
///
/// Callers that cannot normalize should report a zero rate with a warning.
pub fn normalize_rate(
    event_count: usize,
    duration_s: f64,
    area_sq_um: Option<f64>,
) -> Result<RateEstimate, RateError> {
    let area = area_sq_um.ok_or(RateError::MissingArea)?;
    if !(area.is_finite() && area > 0.0) {
        return Err(RateError::NonPositiveArea { area });
    }
    if !(duration_s.is_finite() && duration_s > 0.0) {
        return Err(RateError::NonPositiveDuration {
            duration: duration_s,
        });
    }

    let exposure = duration_s * area;
    let n = event_count as f64;
    Ok(RateEstimate {
        rate: n / exposure,
        standard_error: n.sqrt() / exposure,
    })
}
