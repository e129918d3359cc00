use crossval_executor::{BoxError, Metric};

fn check_lengths(observed: &[f64], predicted: &[f64]) -> Result<(), BoxError> {
    if observed.is_empty() {
        return Err("metric computed over an empty assessment set".into());
    }
    if observed.len() != predicted.len() {
        return Err(format!(
            "observed has {} values, predicted has {}",
            observed.len(),
            predicted.len()
        )
        .into());
    }
    Ok(())
}

/// Root Mean Squared Error.
pub struct Rmse;

impl Metric for Rmse {
    fn name(&self) -> &str {
        "rmse"
    }

    fn compute(&self, observed: &[f64], predicted: &[f64]) -> Result<f64, BoxError> {
        check_lengths(observed, predicted)?;
        let mse = observed
            .iter()
            .zip(predicted)
            .map(|(o, p)| {
                let d = o - p;
                d * d
            })
            .sum::<f64>()
            / observed.len() as f64;
        Ok(mse.sqrt())
    }
}

/// Mean Absolute Error.
pub struct Mae;

impl Metric for Mae {
    fn name(&self) -> &str {
        "mae"
    }

    fn compute(&self, observed: &[f64], predicted: &[f64]) -> Result<f64, BoxError> {
        check_lengths(observed, predicted)?;
        Ok(observed
            .iter()
            .zip(predicted)
            .map(|(o, p)| (o - p).abs())
            .sum::<f64>()
            / observed.len() as f64)
    }
}

/// R² (coefficient of determination).
pub struct RSquared;

impl Metric for RSquared {
    fn name(&self) -> &str {
        "rsq"
    }

    fn compute(&self, observed: &[f64], predicted: &[f64]) -> Result<f64, BoxError> {
        check_lengths(observed, predicted)?;
        let n = observed.len() as f64;
        let mean = observed.iter().sum::<f64>() / n;

        let ss_res: f64 = observed
            .iter()
            .zip(predicted)
            .map(|(o, p)| {
                let d = o - p;
                d * d
            })
            .sum();
        let ss_tot: f64 = observed
            .iter()
            .map(|o| {
                let d = o - mean;
                d * d
            })
            .sum();

        if ss_tot < 1e-15 {
            return Ok(0.0);
        }
        Ok(1.0 - ss_res / ss_tot)
    }
}
