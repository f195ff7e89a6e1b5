use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::Float64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Peak drive voltage (V).
const V_MAX: f64 = 10.0;
/// Coercive voltage (V).
const V_COERCIVE: f64 = 3.0;
/// Width of the polarization switching (V).
const SWITCH_WIDTH: f64 = 0.6;
/// Effective d33 (nm/V); 0.4 nm/V = 400 pm/V.
const D33: f64 = 0.4;
/// Samples per quarter cycle.
const QUARTER: usize = 100;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Triangle sweep 0 → +V_MAX → 0 → -V_MAX → 0.
///
/// Returns `(voltage, rising)` pairs; `rising` selects the switching branch.
fn bipolar_sweep() -> Vec<(f64, bool)> {
    let step = V_MAX / QUARTER as f64;
    let mut out = Vec::with_capacity(4 * QUARTER + 1);
    for i in 0..QUARTER {
        out.push((i as f64 * step, true));
    }
    for i in 0..2 * QUARTER {
        out.push((V_MAX - i as f64 * step, false));
    }
    for i in 0..=QUARTER {
        out.push((-V_MAX + i as f64 * step, true));
    }
    out
}

/// Displacement of a ferroelectric with polarization switching at ±V_COERCIVE.
fn butterfly(voltage: f64, rising: bool) -> f64 {
    let shift = if rising { -V_COERCIVE } else { V_COERCIVE };
    let polarization = ((voltage + shift) / SWITCH_WIDTH).tanh();
    D33 * polarization * voltage
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let (voltage, displacement): (Vec<f64>, Vec<f64>) = bipolar_sweep()
        .into_iter()
        .map(|(v, rising)| (v, butterfly(v, rising) + rng.gauss(0.0, 0.01)))
        .unzip();

    // Write CSV
    let csv_path = "hyster_sample.csv";
    let mut writer = csv::Writer::from_path(csv_path).context("creating CSV output")?;
    writer.write_record(["Voltage", "Displacement"])?;
    for (v, x) in voltage.iter().zip(&displacement) {
        writer.write_record([v.to_string(), x.to_string()])?;
    }
    writer.flush()?;

    // Write Parquet
    let schema = Arc::new(Schema::new(vec![
        Field::new("voltage", DataType::Float64, false),
        Field::new("displacement", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(voltage.clone())),
            Arc::new(Float64Array::from(displacement)),
        ],
    )
    .context("building record batch")?;

    let parquet_path = "hyster_sample.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch)?;
    writer.close()?;

    println!(
        "Wrote {} samples (±{V_MAX} V sweep) to {csv_path} and {parquet_path}",
        voltage.len()
    );
    Ok(())
}
