//! Fallback values consulted when a key is missing from a definition.

use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

/// An immutable lookup table of `key -> value` fallbacks.
///
/// Every [`Definition`](crate::Definition) carries one of these. Lookups
/// first try the definition's own entries, then the exact key here, then a
/// class-based match (see [`Definition::get_value`]). The built-in table from
/// [`builtin`] covers the stock simulation vocabulary; callers with their own
/// vocabulary can supply a custom table through
/// [`DefinitionBuilder::with_defaults`](crate::DefinitionBuilder::with_defaults).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefaultTable {
    entries: BTreeMap<String, String>,
}

impl DefaultTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the exact key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Inserts an entry, returning the previous value if the key was present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for DefaultTable
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Returns the built-in default table shared by all definitions that do not
/// override it.
pub fn builtin() -> Arc<DefaultTable> {
    Arc::clone(&BUILTIN)
}

static BUILTIN: Lazy<Arc<DefaultTable>> = Lazy::new(|| {
    let entries: &[(&str, &str)] = &[
        ("Optimization.showConvergencePlot", "True"),
        ("MonteCarlo.output", "landingLocations"),
        ("SimControl.plot", "Position FlightAnimation"),
        ("SimControl.loggingLevel", "2"),
        ("SimControl.EndCondition", "Altitude"),
        ("SimControl.EndConditionValue", "-1"),
        ("SimControl.StageDropPaths.compute", "true"),
        ("SimControl.StageDropPaths.endCondition", "Altitude"),
        ("SimControl.StageDropPaths.endConditionValue", "0"),
        ("SimControl.timeDiscretization", "RK45Adaptive"),
        ("SimControl.timeStep", "0.01"),
        ("SimControl.TimeStepAdaptation.controller", "PID"),
        ("SimControl.TimeStepAdaptation.targetError", "0.001"),
        ("SimControl.TimeStepAdaptation.minFactor", "0.3"),
        ("SimControl.TimeStepAdaptation.maxFactor", "1.5"),
        ("SimControl.TimeStepAdaptation.Elementary.safetyFactor", "0.9"),
        ("SimControl.TimeStepAdaptation.maxTimeStep", "30"),
        ("SimControl.TimeStepAdaptation.minTimeStep", "0.0001"),
        ("SimControl.TimeStepAdaptation.PID.coefficients", "-0.01 -0.001 0"),
        ("SimControl.TimeStepAdaptation.eventTimingAccuracy", "0.001"),
        ("SimControl.RocketPlot", "Off"),
        ("Environment.EarthModel", "Flat"),
        ("Environment.AtmosphericPropertiesModel", "USStandardAtmosphere"),
        ("Environment.LaunchSite.elevation", "0"),
        ("Environment.LaunchSite.railLength", "0"),
        ("Environment.LaunchSite.latitude", "0"),
        ("Environment.LaunchSite.longitude", "0"),
        ("Environment.MeanWindModel", "Constant"),
        ("Environment.ConstantMeanWind.velocity", "(0 0 0)"),
        ("Environment.SampledGroundWindData.launchMonth", "Yearly"),
        ("Environment.SampledRadioSondeData.launchMonth", "Yearly"),
        ("Environment.Hellman.alphaCoeff", "0.1429"),
        ("Environment.Hellman.altitudeLimit", "1000"),
        ("Environment.TurbulenceModel", "None"),
        ("Environment.turbulenceOffWhenUnderChute", "True"),
        ("Environment.ConstantAtmosphere.temp", "15"),
        ("Environment.ConstantAtmosphere.pressure", "101325"),
        ("Environment.ConstantAtmosphere.density", "1.225"),
        ("Environment.ConstantAtmosphere.viscosity", "1.789e-5"),
        ("Environment.TabulatedAtmosphere.filePath", "data/us_standard_atmosphere.txt"),
        ("Rocket.HIL.quatUpdateRate", "100"),
        ("Rocket.HIL.posUpdateRate", "20"),
        ("Rocket.HIL.velUpdateRate", "20"),
        ("Rocket.HIL.teensyComPort", "COM20"),
        ("Rocket.HIL.imuComPort", "COM15"),
        ("Rocket.HIL.teensyBaudrate", "9600"),
        ("Rocket.HIL.imuBaudrate", "57600"),
        ("Rocket.ControlSystem.desiredFlightDirection", "(0 0 1)"),
        ("Rocket.ControlSystem.MomentController.Type", "ScheduledGainPIDRocket"),
        ("Rocket.ControlSystem.updateRate", "0"),
        ("Rocket.name", "Rocket"),
        ("Rocket.position", "(0 0 10)"),
        ("Rocket.initialDirection", "(0 0 1)"),
        ("Rocket.velocity", "(0 0 0)"),
        ("Rocket.angularVelocity", "(0 0 0)"),
        ("Rocket.Aero.fullyTurbulentBL", "true"),
        ("Rocket.Aero.addZeroLengthBoatTailsToAccountForBaseDrag", "true"),
        ("Rocket.Aero.surfaceRoughness", "0.000005"),
        ("Stage.stageNumber", "0"),
        ("Stage.separationTriggerType", "None"),
        ("Stage.separationTriggerValue", "0"),
        ("Stage.separationDelay", "0"),
        ("Stage.position", "(0 0 0)"),
        ("AeroForce.Lref", "0"),
        ("AeroForce.Cd", "0"),
        ("AeroForce.Cl", "0"),
        ("AeroForce.momentCoeffs", "(0 0 0)"),
        ("AeroDamping.zDampingCoeffs", "(0 0 0)"),
        ("AeroDamping.yDampingCoeffs", "(0 0 0)"),
        ("AeroDamping.xDampingCoeffs", "(0 0 0)"),
        ("FinSet.finCantAngle", "0"),
        ("FinSet.firstFinAngle", "0"),
        ("FinSet.LeadingEdge.shape", "Round"),
        ("FinSet.TrailingEdge.shape", "Tapered"),
        ("FinSet.numFinSpanSlicesForIntegration", "10"),
        ("Nosecone.shape", "tangentOgive"),
        ("BoatTail.shape", "cone"),
        ("Mass.cg", "(0 0 0)"),
        ("Motor.impulseAdjustFactor", "1.0"),
        ("Motor.burnTimeAdjustFactor", "1.0"),
        ("Actuator.controller", "TableInterpolating"),
        ("Actuator.responseModel", "FirstOrder"),
        ("Actuator.responseTime", "0.1"),
        ("RecoverySystem.cg", "(0 0 0)"),
        ("TabulatedAeroForce.Lref", "0"),
    ];
    Arc::new(entries.iter().copied().collect())
});
