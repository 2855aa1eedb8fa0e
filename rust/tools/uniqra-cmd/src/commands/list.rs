use anyhow::Result;
use clap::ValueEnum;

use super::run::Scenario;

pub fn run() -> Result<()> {
    for scenario in Scenario::value_variants() {
        if let Some(value) = scenario.to_possible_value() {
            println!(
                "{:<14} {}",
                value.get_name(),
                value.get_help().map(ToString::to_string).unwrap_or_default()
            );
        }
    }
    Ok(())
}
