use donation_allocator::simulate::example;

/// Print an example scenario JSON to stdout.
pub fn run() -> anyhow::Result<()> {
    let scenario = example::scenario();
    let json = serde_json::to_string_pretty(&scenario)?;
    println!("{json}");
    Ok(())
}
