//! Synthetic Transaction Generator
//!
//! Writes transaction inputs as JSON lines for the `batch` command.
//!
//! Usage: synth-transactions [OUTPUT|-] [COUNT] [FRAUD_RATE]

use anyhow::{Context, Result};
use card_fraud_analysis::types::labels::{MERCHANT_CATEGORIES, US_STATES};
use card_fraud_analysis::TransactionInput;
use rand::Rng;
use std::io::{BufWriter, Write};
use tracing::info;

/// Transaction generator for testing
struct TransactionGenerator {
    rng: rand::rngs::ThreadRng,
}

impl TransactionGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }

    /// Generate a random everyday transaction
    fn generate_legitimate(&mut self) -> TransactionInput {
        let category = self.random_choice(&[
            "grocery_pos",
            "gas_transport",
            "home",
            "kids_pets",
            "food_dining",
            "health_fitness",
            "personal_care",
            "entertainment",
        ]);
        let state = self.random_state();
        let gender = self.random_choice(&["F", "M"]);

        let amount = (self.rng.gen_range(5.0..250.0_f64) * 100.0).round() / 100.0;
        TransactionInput::new(category, amount, gender, state)
            .with_age(self.rng.gen_range(18..=85))
            .with_hour(self.rng.gen_range(7..=21))
            .on_weekend(self.rng.gen_bool(2.0 / 7.0))
    }

    /// Generate a transaction with the usual fraud markers
    fn generate_suspicious(&mut self) -> TransactionInput {
        let category = self.random_choice(&["shopping_net", "misc_net", "grocery_pos", "shopping_pos"]);
        let state = self.random_state();
        let gender = self.random_choice(&["F", "M"]);

        let amount = (self.rng.gen_range(300.0..1500.0_f64) * 100.0).round() / 100.0; // High amount
        let hour = if self.rng.gen_bool(0.8) {
            self.rng.gen_range(22..=27) % 24 // Night time
        } else {
            self.rng.gen_range(0..24)
        };
        TransactionInput::new(category, amount, gender, state)
            .with_age(self.rng.gen_range(18..=95))
            .with_hour(hour)
            .on_weekend(self.rng.gen_bool(0.4))
    }

    fn random_state(&mut self) -> &'static str {
        US_STATES[self.rng.gen_range(0..US_STATES.len())].0
    }

    fn random_choice<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("synth_transactions=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let output = args.get(1).map(|s| s.as_str()).unwrap_or("-");
    let count: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100);
    let fraud_rate: f64 = args
        .get(3)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.1_f64)
        .clamp(0.0, 1.0);

    info!(
        output = %output,
        count = count,
        fraud_rate = fraud_rate,
        categories = MERCHANT_CATEGORIES.len(),
        "Configuration loaded"
    );

    let writer: Box<dyn Write> = if output == "-" {
        Box::new(std::io::stdout().lock())
    } else {
        Box::new(
            std::fs::File::create(output).with_context(|| format!("Failed to create {}", output))?,
        )
    };
    let mut writer = BufWriter::new(writer);

    let mut generator = TransactionGenerator::new();
    let mut rng = rand::thread_rng();
    let mut legitimate_count = 0;
    let mut suspicious_count = 0;

    for _ in 0..count {
        let transaction = if rng.gen_bool(fraud_rate) {
            suspicious_count += 1;
            generator.generate_suspicious()
        } else {
            legitimate_count += 1;
            generator.generate_legitimate()
        };

        serde_json::to_writer(&mut writer, &transaction)?;
        writeln!(writer)?;
    }
    writer.flush().context("Failed to flush output")?;

    info!(
        "Completed! Wrote {} transactions ({} legitimate, {} suspicious)",
        count, legitimate_count, suspicious_count
    );

    Ok(())
}
