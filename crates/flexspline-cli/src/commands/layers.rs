//! Layers command

use super::open_scene;
use anyhow::{Context, Result};
use flexspline::MeshKind;

pub fn run(scene_path: &str) -> Result<()> {
    let scene = open_scene(scene_path)?;
    let spline = scene.spline();
    let mut flex = scene.flex_spline().context("Invalid layer configuration")?;
    let mut host = scene.host();
    flex.reconcile(&spline, &mut host);

    if flex.layers().is_empty() {
        println!("No layers in {}", scene_path);
        return Ok(());
    }

    println!("Layers ({}):", flex.layers().len());
    for (ordinal, layer) in flex.layers().iter().enumerate() {
        let config = &layer.config;
        println!(
            "  {}. {} [{}] kind={:?} mode={:?} chance={:.2}{} loop={}",
            ordinal,
            layer.name(),
            if config.flags.is_active() { "active" } else { "inactive" },
            config.mesh.kind,
            config.render.mode,
            config.render.spawn_chance,
            if config.render.randomize_spawn_chance { " (random)" } else { "" },
            config.flags.loops()
        );
        if let Some(asset) = &config.mesh.asset {
            println!("     mesh: {}", asset);
        }
    }

    println!();
    println!("Deforming instances: {}", flex.instance_count_for_kind(MeshKind::Deforming));
    println!("Rigid instances: {}", flex.instance_count_for_kind(MeshKind::Rigid));

    Ok(())
}
