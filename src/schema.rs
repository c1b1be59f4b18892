use schemars::schema_for;

use donation_allocator::simulate::scenario::Scenario;

/// Generate and print the JSON Schema for `Scenario`.
pub fn run() -> anyhow::Result<()> {
    let schema = schema_for!(Scenario);
    let json = serde_json::to_string_pretty(&schema)?;
    println!("{json}");
    Ok(())
}
