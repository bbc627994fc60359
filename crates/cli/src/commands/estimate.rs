//! `tensive estimate`: spot-repair material manifest without a model call.

use tensive_tools::calculate_spot_repair;

pub fn run(
    length: f64,
    width: f64,
    count: u32,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let manifest = calculate_spot_repair(length, width, count)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
        return Ok(());
    }

    println!("{count} x {length}' x {width}' patch(es)");
    println!("Total area: {} sq ft\n", manifest.total_area);
    for line in &manifest.materials {
        println!("  {:<28} {:>4} {}", line.name, line.quantity, line.unit);
    }

    Ok(())
}
