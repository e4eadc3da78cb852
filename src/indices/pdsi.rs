//! Palmer Drought Severity Index.
//!
//! A monthly two-layer soil-moisture water balance drives Palmer's
//! moisture departure, climatic characteristic weighting and duration
//! recursion. The recursion makes PDSI a sequential fold over the full
//! ordered history from a defined start point: state is carried in an
//! explicit [`PdsiState`] value passed through each step, never in
//! mutable global accounting, so independent stations stay independent.
//!
//! The water balance follows Palmer (1965): precipitation and potential
//! evapotranspiration are balanced against a thin surface layer that
//! gives up moisture freely and an underlying layer that gives it up in
//! proportion to its remaining store.

use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{Error, Result};
use crate::na::NA;
use crate::resample::{resample_mean, resample_sum, ResamplePeriod};
use crate::series::TimeSeries;

use super::spi::months_contiguous;
use super::{ClimateIndexCalculator, ClimateIndexResult, ClimateInputs, IndexKind};

/// Minimum contiguous monthly history for a meaningful calibration.
pub const MIN_HISTORY_MONTHS: usize = 12;

// Palmer's duration-recursion constants: X_t = 0.897·X_{t−1} + Z_t / 3.
const DURATION_CARRY: f64 = 0.897;
const DURATION_GAIN: f64 = 1.0 / 3.0;

// Palmer's climatic-characteristic constants assume inches.
const MM_PER_INCH: f64 = 25.4;

/// Available water capacity of the two soil layers, in mm. These vary by
/// soil type and region, so there is no default.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SoilCapacity {
    /// Surface layer capacity (Palmer's thin plow layer, commonly 25 mm).
    pub surface: f64,
    /// Underlying layer capacity.
    pub underlying: f64,
}

impl SoilCapacity {
    fn total(&self) -> f64 {
        self.surface + self.underlying
    }
}

/// How potential evapotranspiration is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EtMethod {
    /// Estimate from monthly mean temperature and latitude via
    /// Thornthwaite's method.
    Thornthwaite,
    /// Use a caller-supplied PET series.
    Provided,
}

/// PDSI configuration. Soil capacities are mandatory; `latitude`
/// (degrees, positive north) is required for the Thornthwaite method's
/// daylength correction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PdsiOptions {
    /// Two-layer available water capacity.
    pub soil_capacity: SoilCapacity,
    /// PET estimation method.
    pub et_method: EtMethod,
    /// Station latitude in degrees; required for Thornthwaite.
    pub latitude: Option<f64>,
}

/// Carried state of the PDSI fold: layer moisture plus the previous
/// index value. Fresh values are returned from each step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PdsiState {
    /// Moisture stored in the surface layer, mm.
    pub surface_moisture: f64,
    /// Moisture stored in the underlying layer, mm.
    pub underlying_moisture: f64,
    /// Index value of the previous step.
    pub index: f64,
}

impl PdsiState {
    /// Defined initial state: both layers full, index zero.
    fn saturated(capacity: SoilCapacity) -> Self {
        PdsiState {
            surface_moisture: capacity.surface,
            underlying_moisture: capacity.underlying,
            index: 0.0,
        }
    }
}

/// One month of water-balance accounting: actual and potential terms.
#[derive(Debug, Clone, Copy)]
struct MonthlyBalance {
    date: NaiveDate,
    precipitation: f64,
    pet: f64,
    et: f64,
    recharge: f64,
    potential_recharge: f64,
    runoff: f64,
    potential_runoff: f64,
    loss: f64,
    potential_loss: f64,
}

/// Palmer Drought Severity Index calculator.
#[derive(Debug, Clone)]
pub struct PdsiCalculator {
    options: PdsiOptions,
}

impl PdsiCalculator {
    /// Calculator with explicit soil capacities and PET method.
    ///
    /// # Errors
    /// `InvalidConfiguration` for non-positive capacities.
    pub fn new(options: PdsiOptions) -> Result<Self> {
        if options.soil_capacity.surface <= 0.0 || options.soil_capacity.underlying <= 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "soil capacities must be positive, got surface={} underlying={}",
                options.soil_capacity.surface, options.soil_capacity.underlying
            )));
        }
        Ok(PdsiCalculator { options })
    }

    /// Compute PDSI over a precipitation history, with temperature
    /// (Thornthwaite) or a PET series (Provided) as the second input.
    /// Inputs may be daily; they are aggregated to calendar months.
    ///
    /// Deterministic: identical full input histories produce identical
    /// outputs, step for step.
    ///
    /// # Errors
    /// - `InsufficientHistory` when the monthly history is shorter than
    ///   [`MIN_HISTORY_MONTHS`] or has a gap in its monthly axis.
    /// - `MissingInput` when PET cannot be derived from the configured
    ///   method and supplied fields, or an input month is missing.
    /// - `DegenerateInput` when the history carries no moisture departure
    ///   at all, so no climatic weighting can be calibrated.
    pub fn calculate(
        &self,
        precipitation: &TimeSeries,
        temperature: Option<&TimeSeries>,
        pet: Option<&TimeSeries>,
    ) -> Result<Vec<ClimateIndexResult>> {
        let monthly_precip = resample_sum(precipitation, ResamplePeriod::Monthly)?;
        let n = monthly_precip.len();
        if n < MIN_HISTORY_MONTHS {
            return Err(Error::InsufficientHistory(format!(
                "PDSI needs at least {} months of history, got {}",
                MIN_HISTORY_MONTHS, n
            )));
        }
        if !months_contiguous(monthly_precip.timestamps()) {
            return Err(Error::InsufficientHistory(
                "PDSI needs a contiguous monthly history; the precipitation record has gaps"
                    .into(),
            ));
        }

        let precip_values = unwrap_months(&monthly_precip, "precipitation")?;
        let pet_values = self.monthly_pet(&monthly_precip, temperature, pet)?;

        // First pass: water balance over the full history from the
        // defined saturated start state.
        let mut state = PdsiState::saturated(self.options.soil_capacity);
        let mut balances = Vec::with_capacity(n);
        for (i, &date) in monthly_precip.timestamps().iter().enumerate() {
            let (next, balance) =
                self.water_balance_step(state, date, precip_values[i], pet_values[i]);
            state = next;
            balances.push(balance);
        }

        // Calibration: climatic coefficients per calendar month.
        let coefficients = CalendarCoefficients::from_balances(&balances);
        let departures: Vec<f64> = balances
            .iter()
            .map(|b| b.precipitation - coefficients.cafec_precipitation(b))
            .collect();
        let characteristic = coefficients.climatic_characteristic(&balances, &departures)?;

        // Second pass: moisture anomaly and duration recursion.
        let mut state = PdsiState::saturated(self.options.soil_capacity);
        let results = balances
            .iter()
            .zip(departures.iter())
            .map(|(balance, &d)| {
                let month_index = balance.date.month0() as usize;
                let z = characteristic[month_index] * d;
                state.index = DURATION_CARRY * state.index + DURATION_GAIN * z;
                ClimateIndexResult {
                    timestamp: balance.date,
                    value: state.index,
                    kind: IndexKind::Pdsi,
                    source_label: precipitation.label().to_string(),
                }
            })
            .collect();

        debug!(
            "PDSI for {}: {} months balanced, start {}",
            precipitation.label(),
            n,
            monthly_precip.timestamps()[0]
        );
        Ok(results)
    }

    /// Monthly PET on the precipitation axis, per the configured method.
    fn monthly_pet(
        &self,
        monthly_precip: &TimeSeries,
        temperature: Option<&TimeSeries>,
        pet: Option<&TimeSeries>,
    ) -> Result<Vec<f64>> {
        match self.options.et_method {
            EtMethod::Provided => {
                let pet = pet.ok_or_else(|| {
                    Error::MissingInput(
                        "PDSI with the Provided method requires an evapotranspiration series"
                            .into(),
                    )
                })?;
                let monthly = resample_sum(pet, ResamplePeriod::Monthly)?;
                aligned_months(monthly_precip, &monthly, "evapotranspiration")
            }
            EtMethod::Thornthwaite => {
                let temperature = temperature.ok_or_else(|| {
                    Error::MissingInput(
                        "PDSI with the Thornthwaite method requires a temperature series".into(),
                    )
                })?;
                let latitude = self.options.latitude.ok_or_else(|| {
                    Error::MissingInput(
                        "Thornthwaite PET requires the station latitude for the daylength \
                         correction"
                            .into(),
                    )
                })?;
                let monthly = resample_mean(temperature, ResamplePeriod::Monthly)?;
                let temps = aligned_months(monthly_precip, &monthly, "temperature")?;
                Ok(thornthwaite_pet(
                    monthly_precip.timestamps(),
                    &temps,
                    latitude,
                ))
            }
        }
    }

    /// One month of Palmer's two-layer moisture accounting. The surface
    /// layer fills and empties first; the underlying layer exchanges
    /// moisture in proportion to its remaining share of the combined
    /// capacity.
    fn water_balance_step(
        &self,
        state: PdsiState,
        date: NaiveDate,
        precipitation: f64,
        pet: f64,
    ) -> (PdsiState, MonthlyBalance) {
        let capacity = self.options.soil_capacity;
        let awc = capacity.total();
        let ss = state.surface_moisture;
        let su = state.underlying_moisture;

        let potential_recharge = awc - (ss + su);
        let potential_runoff = ss + su;
        let potential_loss = if ss >= pet {
            pet
        } else {
            (ss + (pet - ss) * su / awc).min(ss + su)
        };

        let (et, recharge, runoff, loss, next_ss, next_su);
        if precipitation >= pet {
            et = pet;
            let mut excess = precipitation - pet;
            let surface_fill = excess.min(capacity.surface - ss);
            excess -= surface_fill;
            let underlying_fill = excess.min(capacity.underlying - su);
            excess -= underlying_fill;
            recharge = surface_fill + underlying_fill;
            runoff = excess;
            loss = 0.0;
            next_ss = ss + surface_fill;
            next_su = su + underlying_fill;
        } else {
            let deficit = pet - precipitation;
            let surface_loss = deficit.min(ss);
            let underlying_loss = ((deficit - surface_loss) * su / awc).min(su);
            et = precipitation + surface_loss + underlying_loss;
            recharge = 0.0;
            runoff = 0.0;
            loss = surface_loss + underlying_loss;
            next_ss = ss - surface_loss;
            next_su = su - underlying_loss;
        }

        let next = PdsiState {
            surface_moisture: next_ss,
            underlying_moisture: next_su,
            index: state.index,
        };
        let balance = MonthlyBalance {
            date,
            precipitation,
            pet,
            et,
            recharge,
            potential_recharge,
            runoff,
            potential_runoff,
            loss,
            potential_loss,
        };
        (next, balance)
    }
}

/// Per-calendar-month climatic coefficients from the calibration pass.
#[derive(Debug, Clone)]
struct CalendarCoefficients {
    // alpha..delta are Palmer's ET/recharge/runoff/loss ratios.
    alpha: [f64; 12],
    beta: [f64; 12],
    gamma: [f64; 12],
    delta: [f64; 12],
    mean_precipitation: [f64; 12],
    mean_pet: [f64; 12],
    mean_recharge: [f64; 12],
    mean_runoff: [f64; 12],
    mean_loss: [f64; 12],
}

impl CalendarCoefficients {
    fn from_balances(balances: &[MonthlyBalance]) -> Self {
        let mut sums = [[0.0f64; 9]; 12];
        let mut counts = [0usize; 12];
        for b in balances {
            let m = b.date.month0() as usize;
            counts[m] += 1;
            let s = &mut sums[m];
            s[0] += b.et;
            s[1] += b.pet;
            s[2] += b.recharge;
            s[3] += b.potential_recharge;
            s[4] += b.runoff;
            s[5] += b.potential_runoff;
            s[6] += b.loss;
            s[7] += b.potential_loss;
            s[8] += b.precipitation;
        }

        let mut coeffs = CalendarCoefficients {
            alpha: [1.0; 12],
            beta: [1.0; 12],
            gamma: [1.0; 12],
            delta: [1.0; 12],
            mean_precipitation: [0.0; 12],
            mean_pet: [0.0; 12],
            mean_recharge: [0.0; 12],
            mean_runoff: [0.0; 12],
            mean_loss: [0.0; 12],
        };
        for m in 0..12 {
            if counts[m] == 0 {
                continue;
            }
            let n = counts[m] as f64;
            coeffs.alpha[m] = ratio(sums[m][0] / n, sums[m][1] / n);
            coeffs.beta[m] = ratio(sums[m][2] / n, sums[m][3] / n);
            coeffs.gamma[m] = ratio(sums[m][4] / n, sums[m][5] / n);
            coeffs.delta[m] = ratio(sums[m][6] / n, sums[m][7] / n);
            coeffs.mean_pet[m] = sums[m][1] / n;
            coeffs.mean_recharge[m] = sums[m][2] / n;
            coeffs.mean_runoff[m] = sums[m][4] / n;
            coeffs.mean_loss[m] = sums[m][6] / n;
            coeffs.mean_precipitation[m] = sums[m][8] / n;
        }
        coeffs
    }

    /// CAFEC ("climatically appropriate for existing conditions")
    /// precipitation for one month's potential terms.
    fn cafec_precipitation(&self, b: &MonthlyBalance) -> f64 {
        let m = b.date.month0() as usize;
        self.alpha[m] * b.pet + self.beta[m] * b.potential_recharge
            + self.gamma[m] * b.potential_runoff
            - self.delta[m] * b.potential_loss
    }

    /// Palmer's climatic characteristic K per calendar month, normalized
    /// so the annual sum of weighted mean departures is 17.67.
    ///
    /// The empirical constants (1.5, 2.8, 0.5, 17.67) are calibrated for
    /// water-balance terms in inches, so the departure statistics are
    /// converted before the formula is applied and the final K carries
    /// the mm conversion, keeping `Z = K·d` on Palmer's scale for mm
    /// inputs.
    ///
    /// # Errors
    /// `DegenerateInput` when the history has no moisture departure at
    /// all, leaving nothing to normalize against.
    fn climatic_characteristic(
        &self,
        balances: &[MonthlyBalance],
        departures: &[f64],
    ) -> Result<[f64; 12]> {
        let mut abs_sums = [0.0f64; 12];
        let mut counts = [0usize; 12];
        for (b, &d) in balances.iter().zip(departures.iter()) {
            let m = b.date.month0() as usize;
            abs_sums[m] += d.abs();
            counts[m] += 1;
        }

        let mut k_prime = [0.0f64; 12];
        for m in 0..12 {
            if counts[m] == 0 {
                continue;
            }
            let mean_abs_departure = abs_sums[m] / counts[m] as f64 / MM_PER_INCH;
            if mean_abs_departure <= 0.0 {
                // A month with no departure at all carries Palmer's
                // baseline weight.
                k_prime[m] = 0.5;
                continue;
            }
            let supply = self.mean_precipitation[m] + self.mean_loss[m];
            let demand = self.mean_pet[m] + self.mean_recharge[m] + self.mean_runoff[m];
            let moisture_ratio = if supply > 0.0 { demand / supply } else { 0.0 };
            k_prime[m] = 1.5 * ((moisture_ratio + 2.8) / mean_abs_departure).log10() + 0.5;
        }

        let annual: f64 = (0..12)
            .filter(|&m| counts[m] > 0)
            .map(|m| (abs_sums[m] / counts[m] as f64 / MM_PER_INCH) * k_prime[m])
            .sum();
        if annual <= 0.0 {
            return Err(Error::DegenerateInput(
                "history shows no moisture departure; the climatic characteristic is undefined"
                    .into(),
            ));
        }

        let mut k = [0.0f64; 12];
        for m in 0..12 {
            k[m] = 17.67 / annual * k_prime[m] / MM_PER_INCH;
        }
        Ok(k)
    }
}

/// Palmer's 0/0 convention: a term that is climatically absent in both
/// numerator and denominator contributes a neutral coefficient of 1.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator.abs() > f64::EPSILON {
        numerator / denominator
    } else if numerator.abs() <= f64::EPSILON {
        1.0
    } else {
        0.0
    }
}

/// Unwrap every month of a resampled series, failing on gaps in coverage.
fn unwrap_months(monthly: &TimeSeries, what: &str) -> Result<Vec<f64>> {
    monthly
        .iter()
        .map(|(date, value)| match value {
            NA::Value(v) => Ok(v),
            NA::NA => Err(Error::MissingInput(format!(
                "{} has no non-missing value for {}",
                what, date
            ))),
        })
        .collect()
}

/// Values of `other` aligned month-for-month with the reference axis.
fn aligned_months(reference: &TimeSeries, other: &TimeSeries, what: &str) -> Result<Vec<f64>> {
    if reference.timestamps() != other.timestamps() {
        return Err(Error::MissingInput(format!(
            "{} series does not cover the same months as precipitation",
            what
        )));
    }
    unwrap_months(other, what)
}

/// Thornthwaite monthly PET in mm from monthly mean temperature (°C) and
/// latitude (degrees), with the standard daylength and month-length
/// correction.
fn thornthwaite_pet(timestamps: &[NaiveDate], temps: &[f64], latitude: f64) -> Vec<f64> {
    // Annual heat index from per-calendar-month average temperatures.
    let mut sums = [0.0f64; 12];
    let mut counts = [0usize; 12];
    for (date, &t) in timestamps.iter().zip(temps.iter()) {
        let m = date.month0() as usize;
        sums[m] += t;
        counts[m] += 1;
    }
    let heat_index: f64 = (0..12)
        .filter(|&m| counts[m] > 0)
        .map(|m| {
            let mean = sums[m] / counts[m] as f64;
            if mean > 0.0 {
                (mean / 5.0).powf(1.514)
            } else {
                0.0
            }
        })
        .sum();

    let a = 6.75e-7 * heat_index.powi(3) - 7.71e-5 * heat_index.powi(2)
        + 1.792e-2 * heat_index
        + 0.49239;

    timestamps
        .iter()
        .zip(temps.iter())
        .map(|(date, &t)| {
            let unadjusted = if t <= 0.0 || heat_index <= 0.0 {
                0.0
            } else if t < 26.5 {
                16.0 * (10.0 * t / heat_index).powf(a)
            } else {
                // High-temperature branch where the exponential form
                // overshoots (Willmott et al. 1985).
                -415.85 + 32.24 * t - 0.43 * t * t
            };
            let correction =
                daylength_hours(latitude, *date) / 12.0 * days_in_month(*date) / 30.0;
            (unadjusted * correction).max(0.0)
        })
        .collect()
}

/// Mean daylength in hours for the month of `date` at the given latitude,
/// from the sunset hour angle at mid-month.
fn daylength_hours(latitude: f64, date: NaiveDate) -> f64 {
    let mid_month = NaiveDate::from_ymd_opt(date.year(), date.month(), 15)
        .unwrap_or(date)
        .ordinal() as f64;
    let declination = (23.45_f64).to_radians() * (2.0 * PI * (284.0 + mid_month) / 365.0).sin();
    let phi = latitude.to_radians();
    // Clamp covers polar day and night.
    let cos_omega = (-phi.tan() * declination.tan()).clamp(-1.0, 1.0);
    24.0 / PI * cos_omega.acos()
}

fn days_in_month(date: NaiveDate) -> f64 {
    let (next_year, next_month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1);
    let next = NaiveDate::from_ymd_opt(next_year, next_month, 1);
    match (first, next) {
        (Some(first), Some(next)) => (next - first).num_days() as f64,
        _ => 30.0,
    }
}

impl ClimateIndexCalculator for PdsiCalculator {
    fn kind(&self) -> IndexKind {
        IndexKind::Pdsi
    }

    fn compute(&self, inputs: &ClimateInputs<'_>) -> Result<Vec<ClimateIndexResult>> {
        let precipitation = inputs.precipitation.ok_or_else(|| {
            Error::MissingInput("PDSI requires a precipitation series".into())
        })?;
        self.calculate(precipitation, inputs.temperature, inputs.evapotranspiration)
    }
}
