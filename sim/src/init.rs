use crate::scene::{Scene, SceneBody};
use bevy::prelude::*;
use bevy_app::ScheduleRunnerPlugin;
use bevy_rapier3d::prelude::*;
use buoyancy::rapier::configure_gravity;
use buoyancy::{
    BuoyancyPlugin, BuoyancySet, BuoyantBodyBundle, FloaterBundle, Ocean, Submersion,
};
use std::time::Duration;

/// Run settings taken from the command line.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    /// Fixed steps to run before exiting
    pub ticks: u64,
    pub tick_rate: f64,
    /// Log a body report every this many steps, 0 disables it
    pub report_every: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            ticks: 600,
            tick_rate: 60.0,
            report_every: 60,
        }
    }
}

#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct TickCount(pub u64);

#[derive(Component, Debug, Clone)]
pub struct BodyName(pub String);

/// Adds physics, buoyancy and the scene's bodies to `app`.
///
/// Does not add a runner or logging so tests can drive the app by hand.
pub fn setup_simulation(app: &mut App, scene: Scene, config: SimConfig) {
    app.insert_resource(Time::<Fixed>::from_hz(config.tick_rate))
        .insert_resource(config)
        .insert_resource(TickCount::default())
        .insert_resource(Ocean::new(scene.surface))
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
        .add_plugins(BuoyancyPlugin)
        .add_systems(Startup, configure_gravity(Vec3::NEG_Y * scene.gravity))
        .add_systems(
            FixedUpdate,
            (count_ticks, report_bodies)
                .chain()
                .after(BuoyancySet::ApplyForces)
                .after(PhysicsSet::Writeback),
        );

    for body in scene.bodies {
        spawn_body(app.world_mut(), body);
    }

    info!("Scene {} ready", scene.name);
}

pub fn spawn_body(world: &mut World, body: SceneBody) -> Entity {
    match body {
        SceneBody::Buoyant {
            name,
            position,
            half_extents,
            mass,
            body,
        } => world
            .spawn((
                BuoyantBodyBundle::new(body, half_extents, mass)
                    .with_transform(Transform::from_translation(position)),
                BodyName(name),
            ))
            .id(),
        SceneBody::Floater {
            name,
            position,
            width,
            mass,
            floater,
        } => world
            .spawn((
                FloaterBundle::new(floater, width, mass)
                    .with_transform(Transform::from_translation(position)),
                BodyName(name),
            ))
            .id(),
    }
}

fn count_ticks(
    mut ticks: ResMut<TickCount>,
    config: Res<SimConfig>,
    mut exit: EventWriter<AppExit>,
) {
    ticks.0 += 1;
    if ticks.0 >= config.ticks {
        info!("Reached {} ticks, stopping", ticks.0);
        exit.write(AppExit::Success);
    }
}

fn report_bodies(
    ticks: Res<TickCount>,
    config: Res<SimConfig>,
    ocean: Res<Ocean>,
    time: Res<Time>,
    bodies: Query<(&BodyName, &Transform, &Submersion)>,
) {
    if config.report_every == 0 || ticks.0 % config.report_every != 0 {
        return;
    }

    let elapsed = time.elapsed_secs();
    for (name, transform, submersion) in bodies.iter() {
        let position = transform.translation;
        info!(
            "[tick {} t={:.2}s] {}: y={:.3} water={:.3} displaced={:.3} ({} points) tilt={:.1}°",
            ticks.0,
            elapsed,
            name.0,
            position.y,
            ocean.height_at(position, elapsed),
            submersion.displaced_volume,
            submersion.submerged_points,
            (transform.rotation * Vec3::Y).angle_between(Vec3::Y).to_degrees(),
        );
    }
}

pub fn init(scene: Scene, config: SimConfig) -> AppExit {
    let mut app = App::new();
    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / config.tick_rate,
        ))),
    );
    app.add_plugins(bevy::transform::TransformPlugin);
    app.add_plugins(bevy::log::LogPlugin::default());

    info!(
        "Starting simulation: {} ticks at {} Hz, {} bodies",
        config.ticks,
        config.tick_rate,
        scene.bodies.len()
    );

    setup_simulation(&mut app, scene, config);

    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneConfig;

    #[test]
    fn test_scene_bodies_are_spawned() {
        let scene = SceneConfig::default().build().unwrap();
        let mut world = World::new();
        let names: Vec<String> = scene
            .bodies
            .into_iter()
            .map(|body| {
                let entity = spawn_body(&mut world, body);
                world.get::<BodyName>(entity).unwrap().0.clone()
            })
            .collect();

        assert_eq!(names, ["crate", "buoy", "raft"]);
        let mut floaters = world.query::<&buoyancy::FloaterBody>();
        assert_eq!(floaters.iter(&world).count(), 2);
        let mut buoyant = world.query::<(&buoyancy::Buoyant, &Transform)>();
        let (_, transform) = buoyant.iter(&world).next().unwrap();
        assert_eq!(transform.translation, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_exit_after_configured_ticks() {
        let mut app = App::new();
        app.insert_resource(SimConfig {
            ticks: 3,
            tick_rate: 60.0,
            report_every: 0,
        })
        .insert_resource(TickCount::default())
        .add_systems(Update, count_ticks);

        app.update();
        app.update();
        assert_eq!(app.world().resource::<TickCount>().0, 2);
        assert!(app.should_exit().is_none());

        app.update();
        assert_eq!(app.should_exit(), Some(AppExit::Success));
    }
}
