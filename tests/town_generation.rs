use rust_voronoi_town::*;

fn config(patch_count: usize, seed: u64) -> TownConfigBuilder {
    TownConfigBuilder::new()
        .seed(seed)
        .patch_count(patch_count)
        .unwrap()
}

/// Positions and ward kinds of every patch
fn fingerprint(town: &Town) -> Vec<(Vec<DVec2>, Option<WardKind>)> {
    town.patches()
        .iter()
        .map(|p| (p.shape.positions(town.points()), p.ward.as_ref().map(|w| w.kind)))
        .collect()
}

#[test]
fn test_walled_town_layout() {
    let config = config(15, 42).walls(true).plaza(false).citadel(false).build().unwrap();
    let town = Town::generate(config).unwrap();

    let walls: Vec<&CurtainWall> = town.walls().collect();
    assert_eq!(walls.len(), 1);
    let wall = walls[0];
    assert!(wall.is_real());
    assert!(!wall.gates.is_empty());
    assert!(wall.segments.iter().any(|&s| !s));
    for gate in &wall.gates {
        assert!(wall.shape.contains(*gate));
        assert!(!wall.towers.contains(&town.position(*gate)));
    }

    // one street per gate, running from the centre to the gate
    assert_eq!(town.streets().len(), town.gates().len());
    for (street, gate) in town.streets().iter().zip(town.gates()) {
        assert_eq!(street.first(), Some(&town.center()));
        assert_eq!(street.last(), Some(gate));
    }

    for patch in town.patches() {
        assert!(patch.ward.is_some());
        assert!(patch.shape.len() >= 3);
    }
    for &i in town.inner() {
        let kind = town.patches()[i].ward.as_ref().map(|w| w.kind);
        assert!(!matches!(kind, Some(WardKind::Countryside) | Some(WardKind::Farm)));
    }
}

#[test]
fn test_same_seed_same_town() {
    let config = config(12, 2024).build().unwrap();
    let a = Town::generate(config).unwrap();
    let b = Town::generate(config).unwrap();

    assert_eq!(fingerprint(&a), fingerprint(&b));
    assert_eq!(a.gates(), b.gates());
    assert_eq!(a.arteries(), b.arteries());
    assert_eq!(a.config(), b.config());
}

#[test]
fn test_explicit_rng_matches_seed() {
    let config = config(10, 77).build().unwrap();
    let a = Town::generate(config).unwrap();
    let mut rng = SeededRandom::new(77);
    let b = Town::generate_with_rng(config, &mut rng).unwrap();
    assert_eq!(fingerprint(&a), fingerprint(&b));
}

#[test]
fn test_different_seeds_differ() {
    let a = Town::generate(config(10, 1).build().unwrap()).unwrap();
    let b = Town::generate(config(10, 2).build().unwrap()).unwrap();
    assert_ne!(fingerprint(&a), fingerprint(&b));
}

#[test]
fn test_citadel_and_plaza() {
    let config = config(20, 7)
        .walls(true)
        .citadel(true)
        .plaza(true)
        .build()
        .unwrap();
    let town = Town::generate(config).unwrap();

    let citadel = town.citadel().unwrap();
    assert_eq!(citadel.ward.as_ref().map(|w| w.kind), Some(WardKind::Castle));
    assert!(citadel.shape.compactness(town.points()) >= 0.75);

    let castle_wall = town.citadel_wall().unwrap();
    assert!(castle_wall.is_real());
    assert_eq!(town.walls().count(), 2);

    let wall = town.wall().unwrap();
    assert_eq!(town.gates().len(), wall.gates.len() + castle_wall.gates.len());

    let plaza = town.plaza().unwrap();
    assert_eq!(plaza.ward.as_ref().map(|w| w.kind), Some(WardKind::Market));
    assert!(town.ward_count(WardKind::Castle) == 1);
}

#[test]
fn test_open_town() {
    let config = config(8, 11)
        .walls(false)
        .citadel(false)
        .build()
        .unwrap();
    let town = Town::generate(config).unwrap();

    assert!(town.wall().is_none());
    assert_eq!(town.walls().count(), 0);
    assert!(!town.border().is_real());
    assert!(town.border().towers.is_empty());
    assert!(!town.gates().is_empty());
    assert!(town.city_radius() > 0.0);
}

#[test]
fn test_invalid_configs() {
    let config = TownConfig {
        patch_count: 3,
        walls: Some(true),
        ..Default::default()
    };
    assert!(matches!(Town::generate(config), Err(TownError::InvalidConfig(_))));

    let config = TownConfig {
        patch_count: 101,
        ..Default::default()
    };
    assert!(matches!(Town::generate(config), Err(TownError::InvalidConfig(_))));

    let config = TownConfig {
        max_attempts: 0,
        ..Default::default()
    };
    assert!(matches!(Town::generate(config), Err(TownError::InvalidConfig(_))));
}

#[test]
fn test_buildings_inside_their_patch() {
    let config = config(10, 5).walls(true).build().unwrap();
    let town = Town::generate(config).unwrap();

    let buildings: usize = town
        .patches()
        .iter()
        .filter_map(|p| p.ward.as_ref())
        .map(|w| w.geometry.len())
        .sum();
    assert!(buildings > 0);

    for patch in town.patches() {
        let Some(ward) = &patch.ward else { continue };
        if ward.kind == WardKind::Countryside {
            assert!(ward.geometry.is_empty());
        }
    }
}

#[test]
fn test_topology_over_generated_patches() {
    let config = config(12, 31).walls(true).build().unwrap();
    let town = Town::generate(config).unwrap();

    let topology = Topology::new(town.points(), town.patches(), &town.border().shape, &[]);
    assert!(!topology.graph().is_empty());
    for &gate in town.gates() {
        let path = topology.build_path(town.center(), gate, &[]);
        assert_eq!(path.first(), Some(&gate));
        assert_eq!(path.last(), Some(&town.center()));
    }
}

#[cfg(feature = "serde")]
#[test]
fn test_config_serde_round_trip() {
    let config = config(24, 9).walls(true).build().unwrap();
    let json = serde_json::to_string(&config).unwrap();
    let restored: TownConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(config, restored);

    let kind: WardKind = serde_json::from_str(&serde_json::to_string(&WardKind::Cathedral).unwrap()).unwrap();
    assert_eq!(kind, WardKind::Cathedral);
}
