//! Deterministic synthetic output files.
//!
//! [`SyntheticSource`] implements the [`OutputSource`] contract over a
//! generated Genesis-shaped record tree (beam moments, field harmonics,
//! lattice parameters). The data is derived from the file name, so opening
//! the same path twice yields identical records. The demos and the test
//! suite use it as a stand-in for a real file backend.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use regex::Regex;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use super::{LineKind, OutputSource, PlotRecord, SourceEntry, SourceError, SourceFactory};
use crate::data::field::PlotMode;

/// Number of longitudinal integration steps.
const STEPS: usize = 192;
/// Number of slices along the bunch.
const SLICES: usize = 64;
/// Step length in meters.
const DZ: f64 = 0.015;
/// Slice spacing in meters.
const DS: f64 = 1.0e-6;

enum RecordData {
    /// One value per step.
    One(Vec<f64>),
    /// `values[step][slice]`.
    Two(Vec<Vec<f64>>),
}

struct Record {
    data: RecordData,
    line: LineKind,
}

impl Record {
    fn shape(&self) -> Vec<usize> {
        match &self.data {
            RecordData::One(v) => vec![v.len()],
            RecordData::Two(v) => vec![v.len(), v.first().map_or(0, Vec::len)],
        }
    }
}

/// An in-memory output file with generated records.
pub struct SyntheticSource {
    seed: u64,
    records: BTreeMap<String, Record>,
}

impl SyntheticSource {
    /// Build a source whose record values are seeded from `name`.
    pub fn new(name: &str) -> Self {
        let seed = hash_name(name);
        Self {
            seed,
            records: generate_records(seed),
        }
    }

    /// Resolve a field text to a record. Field texts produced by the
    /// browser carry the file display name as their first path component,
    /// so a failed exact lookup retries without it.
    fn lookup(&self, field: &str) -> Option<&Record> {
        if let Some(record) = self.records.get(field) {
            return Some(record);
        }
        let (_, rest) = field.split_once('/')?;
        self.records.get(rest)
    }

    /// Slice profile of a record at the step selected by `position`.
    fn profile_at(&self, field: &str, position: f64) -> Option<Vec<f64>> {
        match &self.lookup(field)?.data {
            RecordData::Two(d) => Some(d[step_at(position, d.len())].clone()),
            RecordData::One(v) => Some(v.clone()),
        }
    }
}

impl OutputSource for SyntheticSource {
    fn reload(&mut self) -> Result<(), SourceError> {
        self.records = generate_records(self.seed);
        Ok(())
    }

    fn find_records(&self, pattern: &Regex) -> BTreeSet<String> {
        self.records
            .keys()
            .filter(|path| pattern.is_match(path))
            .cloned()
            .collect()
    }

    fn entries(&self, group: &str) -> Vec<SourceEntry> {
        let prefix = if group.is_empty() {
            String::new()
        } else {
            format!("{group}/")
        };
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for (path, record) in &self.records {
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((child, _)) => {
                    if seen.insert(child.to_string()) {
                        out.push(SourceEntry::group(child));
                    }
                }
                None => {
                    if seen.insert(rest.to_string()) {
                        out.push(SourceEntry::dataset(rest, record.shape()));
                    }
                }
            }
        }
        out
    }

    fn get_data(
        &self,
        field: &str,
        mode: PlotMode,
        position: f64,
    ) -> Result<Option<PlotRecord>, SourceError> {
        let Some(record) = self.lookup(field) else {
            return Ok(None);
        };
        let result = match &record.data {
            RecordData::One(v) => PlotRecord::curve(
                "z (m)",
                (0..v.len()).map(|i| i as f64 * DZ).collect(),
                v.clone(),
                record.line,
            ),
            RecordData::Two(d) => reduce_2d(d, mode, position, record.line),
        };
        Ok(Some(result))
    }

    fn get_coherence(
        &self,
        field: &str,
        position: f64,
        order: u8,
    ) -> Result<Option<PlotRecord>, SourceError> {
        let Some(mut profile) = self.profile_at(field, position) else {
            return Ok(None);
        };
        if order >= 2 {
            for v in &mut profile {
                *v = *v * *v;
            }
        }
        let n = profile.len();
        let mut corr = vec![0.0; n];
        for tau in 0..n {
            let mut sum = 0.0;
            for s in 0..n - tau {
                sum += profile[s] * profile[s + tau];
            }
            // Unbiased estimate so the tail is not suppressed by the
            // shrinking overlap.
            corr[tau] = sum / (n - tau) as f64;
        }
        let norm = corr[0];
        if norm > 0.0 {
            for v in &mut corr {
                *v /= norm;
            }
        }
        Ok(Some(PlotRecord::curve(
            "s (m)",
            (0..n).map(|i| i as f64 * DS).collect(),
            corr,
            LineKind::Default,
        )))
    }

    fn get_convolution(
        &self,
        field: &str,
        position: f64,
    ) -> Result<Option<PlotRecord>, SourceError> {
        let Some(profile) = self.profile_at(field, position) else {
            return Ok(None);
        };
        let n = profile.len();
        let mut conv = vec![0.0; n];
        for tau in 0..n {
            let mut sum = 0.0;
            for s in 0..n - tau {
                sum += profile[s] * profile[s + tau];
            }
            conv[tau] = sum;
        }
        let norm = conv[0];
        if norm > 0.0 {
            for v in &mut conv {
                *v /= norm;
            }
        }
        Ok(Some(PlotRecord::curve(
            "s (m)",
            (0..n).map(|i| i as f64 * DS).collect(),
            conv,
            LineKind::Default,
        )))
    }

    fn get_wigner(&self, field: &str, position: f64) -> Result<Option<PlotRecord>, SourceError> {
        // The field text arrives in its wrapped display form.
        let inner = field
            .strip_prefix("Wigner(")
            .and_then(|s| s.strip_suffix(')'))
            .unwrap_or(field);
        let Some(profile) = self.profile_at(inner, position) else {
            return Ok(None);
        };
        let n = profile.len();
        if n < 4 {
            return Ok(None);
        }
        let half = n / 2;
        let fft = FftPlanner::new().plan_fft_forward(n);
        let mut map = Vec::with_capacity(n);
        for s in 0..n {
            // Discrete pseudo-Wigner kernel with circular indexing.
            let mut buf: Vec<Complex<f64>> = (0..n)
                .map(|m| {
                    let a = profile[(s + m) % n];
                    let b = profile[(s + n - m) % n];
                    Complex::new(a * b, 0.0)
                })
                .collect();
            fft.process(&mut buf);
            map.push(buf[..half].iter().map(|c| c.re).collect::<Vec<f64>>());
        }
        let freq_step = 1.0 / (n as f64 * DS);
        Ok(Some(PlotRecord::image(
            "s (m)",
            (0..n).map(|i| i as f64 * DS).collect(),
            (0..half).map(|k| k as f64 * freq_step).collect(),
            map,
        )))
    }
}

fn reduce_2d(d: &[Vec<f64>], mode: PlotMode, position: f64, line: LineKind) -> PlotRecord {
    let steps = d.len();
    let slices = d.first().map_or(0, Vec::len);
    let z_axis = || (0..steps).map(|i| i as f64 * DZ).collect::<Vec<f64>>();
    let s_axis = || (0..slices).map(|i| i as f64 * DS).collect::<Vec<f64>>();

    match mode {
        PlotMode::Profile | PlotMode::ProfileNorm => {
            let mut y = d[step_at(position, steps)].clone();
            if mode == PlotMode::ProfileNorm {
                normalize_by_max(&mut y);
            }
            PlotRecord::curve("s (m)", s_axis(), y, line)
        }
        PlotMode::Mean => {
            let y = d
                .iter()
                .map(|row| row.iter().sum::<f64>() / slices.max(1) as f64)
                .collect();
            PlotRecord::curve("z (m)", z_axis(), y, line)
        }
        PlotMode::Max => {
            let y = d
                .iter()
                .map(|row| row.iter().copied().fold(f64::NEG_INFINITY, f64::max))
                .collect();
            PlotRecord::curve("z (m)", z_axis(), y, line)
        }
        PlotMode::Min => {
            let y = d
                .iter()
                .map(|row| row.iter().copied().fold(f64::INFINITY, f64::min))
                .collect();
            PlotRecord::curve("z (m)", z_axis(), y, line)
        }
        PlotMode::Weighted => {
            // Value-weighted centroid along the bunch, one point per step.
            let y = d
                .iter()
                .map(|row| {
                    let total: f64 = row.iter().sum();
                    if total <= 0.0 {
                        return 0.0;
                    }
                    row.iter()
                        .enumerate()
                        .map(|(i, v)| i as f64 * DS * v)
                        .sum::<f64>()
                        / total
                })
                .collect();
            PlotRecord::curve("z (m)", z_axis(), y, line)
        }
        PlotMode::TwoD | PlotMode::TwoDNorm => {
            let mut z = d.to_vec();
            if mode == PlotMode::TwoDNorm {
                for row in &mut z {
                    normalize_by_max(row);
                }
            }
            PlotRecord::image("z (m)", z_axis(), s_axis(), z)
        }
        PlotMode::Line => {
            let slice = step_at(position, slices);
            let y = d.iter().map(|row| row[slice]).collect();
            PlotRecord::curve("z (m)", z_axis(), y, line)
        }
    }
}

fn normalize_by_max(values: &mut [f64]) {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max > 0.0 {
        for v in values {
            *v /= max;
        }
    }
}

/// Map the position selector in `[0, 1]` to an index.
fn step_at(position: f64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (position.clamp(0.0, 1.0) * (len - 1) as f64).round() as usize
}

/// Factory producing a [`SyntheticSource`] for any path.
#[derive(Default)]
pub struct SyntheticFactory;

impl SourceFactory for SyntheticFactory {
    fn load(&self, path: &Path) -> Result<Box<dyn OutputSource>, SourceError> {
        let name = path.to_string_lossy();
        tracing::debug!(file = %name, "generating synthetic records");
        Ok(Box::new(SyntheticSource::new(&name)))
    }
}

// ── Record generation ────────────────────────────────────────────────────────

/// Small xorshift generator, good enough for reproducible jitter.
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed | 1)
    }

    fn next_f64(&mut self) -> f64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        (x >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn hash_name(name: &str) -> u64 {
    // FNV-1a.
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for b in name.bytes() {
        h ^= b as u64;
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    h
}

fn generate_records(seed: u64) -> BTreeMap<String, Record> {
    let mut rng = Rng::new(seed);
    let mut records = BTreeMap::new();

    let gain_length = 0.6 + 0.2 * rng.next_f64();
    let saturation = 1.0e9 * (1.0 + rng.next_f64());
    let centroid = SLICES as f64 * (0.4 + 0.2 * rng.next_f64());
    let width = SLICES as f64 * (0.12 + 0.05 * rng.next_f64());

    let power = field_power(&mut rng, gain_length, saturation, centroid, width, 1.0);
    let power2 = field_power(&mut rng, gain_length * 0.8, saturation * 0.05, centroid, width * 0.7, 2.0);

    let intensity = scaled(&power, 1.0 / 3.0e-4);
    let intensity2 = scaled(&power2, 1.0 / 3.0e-4);
    let phase = phase_map(&mut rng);

    records.insert("Field/power".into(), two(power));
    records.insert("Field/intensity".into(), two(intensity));
    records.insert("Field/phase".into(), two(phase));
    records.insert("Field2/power".into(), two(power2));
    records.insert("Field2/intensity".into(), two(intensity2));

    records.insert("Beam/energy".into(), two(beam_energy(&mut rng)));
    records.insert("Beam/xsize".into(), two(beam_size(&mut rng, 28.0e-6)));
    records.insert("Beam/ysize".into(), two(beam_size(&mut rng, 23.0e-6)));

    records.insert(
        "Lattice/aw".into(),
        Record {
            data: RecordData::One(lattice_aw()),
            line: LineKind::Steps,
        },
    );
    records.insert(
        "Lattice/qf".into(),
        Record {
            data: RecordData::One(lattice_qf()),
            line: LineKind::Steps,
        },
    );

    records.insert(
        "Meta/Version/Major".into(),
        Record {
            data: RecordData::One(vec![4.0]),
            line: LineKind::Default,
        },
    );

    records
}

fn two(values: Vec<Vec<f64>>) -> Record {
    Record {
        data: RecordData::Two(values),
        line: LineKind::Default,
    }
}

fn scaled(values: &[Vec<f64>], factor: f64) -> Vec<Vec<f64>> {
    values
        .iter()
        .map(|row| row.iter().map(|v| v * factor).collect())
        .collect()
}

/// Exponential gain with logistic saturation and a Gaussian slice profile.
fn field_power(
    rng: &mut Rng,
    gain_length: f64,
    saturation: f64,
    centroid: f64,
    width: f64,
    harmonic: f64,
) -> Vec<Vec<f64>> {
    (0..STEPS)
        .map(|step| {
            let z = step as f64 * DZ;
            let growth = (z / gain_length).exp();
            let level = saturation * growth / (growth + saturation / 1.0e3);
            (0..SLICES)
                .map(|s| {
                    let ds = (s as f64 - centroid) / width;
                    let envelope = (-0.5 * ds * ds * harmonic).exp();
                    level * envelope * (1.0 + 0.05 * (rng.next_f64() - 0.5))
                })
                .collect()
        })
        .collect()
}

fn phase_map(rng: &mut Rng) -> Vec<Vec<f64>> {
    let chirp = 0.02 + 0.01 * rng.next_f64();
    (0..STEPS)
        .map(|step| {
            (0..SLICES)
                .map(|s| (step as f64 * 0.05 + s as f64 * s as f64 * chirp) % std::f64::consts::TAU)
                .collect()
        })
        .collect()
}

fn beam_energy(rng: &mut Rng) -> Vec<Vec<f64>> {
    let gamma0 = 8000.0 + 500.0 * rng.next_f64();
    (0..STEPS)
        .map(|step| {
            let z = step as f64 * DZ;
            (0..SLICES)
                .map(|s| gamma0 - 0.8 * z * z - 0.3 * (s as f64 - SLICES as f64 / 2.0).abs())
                .collect()
        })
        .collect()
}

fn beam_size(rng: &mut Rng, sigma0: f64) -> Vec<Vec<f64>> {
    let beta_wave = 0.35 + 0.1 * rng.next_f64();
    (0..STEPS)
        .map(|step| {
            let z = step as f64 * DZ;
            let breathing = 1.0 + 0.15 * (z / beta_wave).sin();
            (0..SLICES).map(|_| sigma0 * breathing).collect()
        })
        .collect()
}

/// Undulator strength: active segments separated by drifts.
fn lattice_aw() -> Vec<f64> {
    (0..STEPS)
        .map(|step| if (step / 24) % 2 == 0 { 1.7 } else { 0.0 })
        .collect()
}

/// Alternating quadrupole focusing in the drift sections.
fn lattice_qf() -> Vec<f64> {
    (0..STEPS)
        .map(|step| match (step / 24) % 4 {
            1 => 30.0,
            3 => -30.0,
            _ => 0.0,
        })
        .collect()
}
