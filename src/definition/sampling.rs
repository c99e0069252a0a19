//! Monte-Carlo resampling of `_stdDev`-tagged parameters.

use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::StandardNormal;
use tracing::debug;

use crate::error::Error;
use crate::vector::Vec3;

use super::model::Definition;

impl Definition {
    /// Redraws every parameter that has a paired `<key>_stdDev` entry.
    ///
    /// The first pass moves each parameter's declared value to `<key>_mean`;
    /// later passes keep drawing around that persisted mean, so repeated
    /// resampling never drifts from the declared distribution. Parameters
    /// must parse as scalars or as 3-component vectors; vectors draw one
    /// sample per component, in component order, from the same stream.
    ///
    /// No-op when sampling was disabled at construction.
    pub fn resample_probabilistic_values(&mut self) -> Result<(), Error> {
        if !self.sampling {
            return Ok(());
        }

        // Snapshot the key set: the pass inserts _mean keys while it runs.
        let keys: Vec<String> = self.table.keys().cloned().collect();

        for key in keys {
            let stddev_key = format!("{key}_stdDev");
            let Some(stddev) = self.table.get(&stddev_key).cloned() else {
                continue;
            };

            let mean_key = format!("{key}_mean");
            let mean = match self.table.get(&mean_key) {
                Some(mean) => mean.clone(),
                None => {
                    let Some(current) = self.table.get(&key).cloned() else {
                        continue;
                    };
                    self.table.insert(mean_key, current.clone());
                    current
                }
            };

            if let (Ok(mu), Ok(sigma)) = (mean.parse::<f64>(), stddev.parse::<f64>()) {
                let sampled = gauss(&mut self.rng, mu, sigma);
                debug!(%key, value = sampled, "sampled scalar parameter");
                self.table.insert(key, sampled.to_string());
            } else if let (Ok(mu), Ok(sigma)) = (mean.parse::<Vec3>(), stddev.parse::<Vec3>()) {
                let x = gauss(&mut self.rng, mu.x, sigma.x);
                let y = gauss(&mut self.rng, mu.y, sigma.y);
                let z = gauss(&mut self.rng, mu.z, sigma.z);
                let sampled = Vec3::new(x, y, z);
                debug!(%key, value = %sampled, "sampled vector parameter");
                self.table.insert(key, sampled.to_string());
            } else {
                return Err(Error::InvalidProbabilisticValue { key, mean, stddev });
            }
        }

        Ok(())
    }
}

fn gauss(rng: &mut StdRng, mean: f64, stddev: f64) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    mean + stddev * z
}
