//! Example: Generate a walled town
//!
//! Demonstrates the basic usage of the generation pipeline.
//! Run with `RUST_LOG=debug` to see the timing of every stage.

use rust_voronoi_town::*;

fn main() -> Result<()> {
    env_logger::init();

    println!("Voronoi Town Generation Example");
    println!("===============================\n");

    let config = TownConfigBuilder::new()
        .seed(42)
        .size(TownSize::SmallCity)
        .walls(true)
        .plaza(true)
        .build()?;

    println!("Configuration:");
    println!("  Seed: {}", config.seed);
    println!("  Patches: {}", config.patch_count);
    println!();

    println!("Generating town...");
    let town = Town::generate(config)?;
    let resolved = town.config();
    println!(
        "Plaza: {:?}, citadel: {:?}, walls: {:?}\n",
        resolved.plaza, resolved.citadel, resolved.walls
    );

    println!("Statistics:");
    println!("  Patches: {} ({} in the city)", town.patches().len(), town.inner().len());
    println!("  City radius: {:.1}", town.city_radius());
    println!("  Gates: {}", town.gates().len());
    println!("  Streets: {}, roads: {}, arteries: {}", town.streets().len(), town.roads().len(), town.arteries().len());
    for wall in town.walls() {
        println!(
            "  Wall: {} vertices, {} gates, {} towers",
            wall.shape.len(),
            wall.gates.len(),
            wall.towers.len()
        );
    }
    println!();

    println!("City wards:");
    for &i in town.inner() {
        let patch = &town.patches()[i];
        let Some(ward) = &patch.ward else { continue };
        let center = patch.shape.center(town.points());
        println!(
            "  Patch {:3}: {:<15} at ({:7.1}, {:7.1}), {} buildings",
            i,
            patch.label().unwrap_or("-"),
            center.x,
            center.y,
            ward.geometry.len()
        );
    }

    let probe = DVec2::ZERO;
    if let Some(i) = town.find_patch_at(probe) {
        println!("\nThe origin lies in patch {} ({:?})", i, town.patches()[i].label());
    }

    println!("\nGeneration complete!");
    Ok(())
}
