//! Ward distribution across town sizes and seeds

use std::collections::BTreeMap;

use rust_voronoi_town::*;

fn main() -> Result<()> {
    env_logger::init();

    let sizes = [
        TownSize::SmallTown,
        TownSize::LargeTown,
        TownSize::SmallCity,
        TownSize::LargeCity,
        TownSize::Metropolis,
    ];

    for size in sizes {
        println!("{} ({} patches)", size.name(), size.patch_count());
        for seed in 1..=3 {
            let config = TownConfigBuilder::new().seed(seed).size(size).build()?;
            let town = match Town::generate(config) {
                Ok(town) => town,
                Err(err) => {
                    println!("  seed {}: {}", seed, err);
                    continue;
                }
            };

            let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
            for &i in town.inner() {
                if let Some(label) = town.patches()[i].label() {
                    *counts.entry(label).or_insert(0) += 1;
                }
            }
            let flags = town.config();
            println!(
                "  seed {}: plaza={} citadel={} walls={} gates={} radius={:.0}",
                seed,
                flags.plaza.unwrap_or(false),
                flags.citadel.unwrap_or(false),
                flags.walls.unwrap_or(false),
                town.gates().len(),
                town.city_radius()
            );
            let line: Vec<String> = counts.iter().map(|(k, v)| format!("{} {}", v, k)).collect();
            println!("    {}", line.join(", "));
        }
        println!();
    }
    Ok(())
}
