//! Presentation: body discs, motion-blur ghosts, and the metaball layer.
//!
//! ## Layer Model
//!
//! | Layer          | Technology        | Visible when                          |
//! |----------------|-------------------|---------------------------------------|
//! | Body discs     | `Mesh2d`          | shape effect is not `Composited`      |
//! | Blur ghosts    | `Mesh2d`          | shape effect is `Blur`                |
//! | Metaball layer | `Sprite` + `Image`| scene compositing enabled             |
//!
//! ## System Responsibilities
//!
//! | System                          | Schedule | Purpose                              |
//! |---------------------------------|----------|--------------------------------------|
//! | `setup_body_visuals_system`     | Startup  | Spawn one disc + ghosts per body     |
//! | `setup_metaball_layer_system`   | Startup  | Spawn the hidden full-screen sprite  |
//! | `sync_body_visuals_system`      | Update   | Move/show/hide discs                 |
//! | `sync_blur_ghosts_system`       | Update   | Spread ghosts along the blur         |
//! | `sync_metaball_layer_system`    | Update   | Upload the composited pixels         |
//!
//! Every system here only reads [`RenderShape`](crate::scene::RenderShape)s and the compositor layer; the
//! simulation never looks at entities.

use crate::constants::{BLUR_GHOST_ALPHA, BLUR_GHOST_COUNT};
use crate::metaball::MetaballCompositor;
use crate::mode::RenderModeController;
use crate::physics::PhysicsWorld;
use crate::scene::render_shapes;
use crate::simulation::{spawn_scene_system, DemoSet};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};

/// Segments in the shared unit-circle mesh.
const CIRCLE_SIDES: u32 = 48;

// ── Components & resources ────────────────────────────────────────────────────

/// Index of the body an entity draws, into `PhysicsWorld::bodies`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyIndex(pub usize);

/// One translucent copy of a body, offset along its blur direction.
#[derive(Component, Debug, Clone, Copy)]
pub struct BlurGhost {
    pub index: usize,
    /// Signed position along the blur in `[-1, 1]`.
    pub offset: f32,
}

/// Marker for the full-viewport metaball sprite.
#[derive(Component)]
pub struct MetaballSprite;

/// Image the metaball layer is uploaded into every composited frame.
#[derive(Resource)]
pub struct MetaballImage(pub Handle<Image>);

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Startup,
            (setup_body_visuals_system, setup_metaball_layer_system).after(spawn_scene_system),
        )
        .add_systems(
            Update,
            (
                sync_body_visuals_system,
                sync_blur_ghosts_system,
                sync_metaball_layer_system,
            )
                .in_set(DemoSet::Present),
        );
    }
}

// ── Coordinate helpers ────────────────────────────────────────────────────────

/// Viewport point (origin bottom-left) → camera space (origin at centre).
pub fn to_camera_space(position: Vec2, viewport: Vec2) -> Vec2 {
    position - viewport * 0.5
}

/// Signed offsets of the ghosts along the blur, evenly spread over `[-1, 1]`.
pub fn ghost_offsets(count: usize) -> Vec<f32> {
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        n => (0..n)
            .map(|i| i as f32 / (n - 1) as f32 * 2.0 - 1.0)
            .collect(),
    }
}

// ── Startup ───────────────────────────────────────────────────────────────────

/// Spawn a disc per body plus its blur ghosts.
///
/// Ghost materials get their alpha once here: nearer the body centre is more
/// opaque.  Per frame only transforms and visibility change.
pub fn setup_body_visuals_system(
    mut commands: Commands,
    world: Res<PhysicsWorld>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    // One unit circle shared by every disc and ghost; scale carries the radius.
    let mesh = meshes.add(circle_mesh(1.0, CIRCLE_SIDES));
    let viewport = world.boundary.size();

    for (index, body) in world.bodies.iter().enumerate() {
        let translation = to_camera_space(body.position, viewport);
        commands.spawn((
            BodyIndex(index),
            Mesh2d(mesh.clone()),
            MeshMaterial2d(materials.add(ColorMaterial::from_color(body.color))),
            Transform::from_translation(translation.extend(0.5))
                .with_scale(Vec3::splat(body.radius)),
            Visibility::Visible,
        ));

        for offset in ghost_offsets(BLUR_GHOST_COUNT) {
            let alpha = BLUR_GHOST_ALPHA * (1.0 - offset.abs() * 0.7);
            commands.spawn((
                BlurGhost { index, offset },
                Mesh2d(mesh.clone()),
                MeshMaterial2d(materials.add(ColorMaterial::from_color(
                    body.color.with_alpha(alpha),
                ))),
                Transform::from_translation(translation.extend(0.4))
                    .with_scale(Vec3::splat(body.radius)),
                Visibility::Hidden,
            ));
        }
    }
    eprintln!("[SETUP] Body visuals spawned");
}

/// Spawn the metaball sprite with a placeholder 1×1 transparent image.
pub fn setup_metaball_layer_system(mut commands: Commands, mut images: ResMut<Assets<Image>>) {
    let image = Image::new_fill(
        Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        &[0, 0, 0, 0],
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    );
    let handle = images.add(image);
    commands.insert_resource(MetaballImage(handle.clone()));
    commands.spawn((
        MetaballSprite,
        Sprite::from_image(handle),
        Transform::from_xyz(0.0, 0.0, 0.6),
        Visibility::Hidden,
    ));
}

// ── Update ────────────────────────────────────────────────────────────────────

/// Place each disc at its body and hide the ones drawn by the metaball layer.
pub fn sync_body_visuals_system(
    world: Res<PhysicsWorld>,
    controller: Res<RenderModeController>,
    mut query: Query<(&BodyIndex, &mut Transform, &mut Visibility)>,
) {
    let shapes = render_shapes(&world.bodies, &controller);
    let viewport = world.boundary.size();

    for (index, mut transform, mut visibility) in query.iter_mut() {
        let Some(shape) = shapes.get(index.0) else {
            *visibility = Visibility::Hidden;
            continue;
        };
        let p = to_camera_space(shape.position, viewport);
        transform.translation.x = p.x;
        transform.translation.y = p.y;
        transform.scale = Vec3::splat(shape.radius);
        *visibility = if shape.disc_visible() {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
    }
}

/// Spread ghosts along `±blur.radius` in the blur direction.
pub fn sync_blur_ghosts_system(
    world: Res<PhysicsWorld>,
    controller: Res<RenderModeController>,
    mut query: Query<(&BlurGhost, &mut Transform, &mut Visibility)>,
) {
    let shapes = render_shapes(&world.bodies, &controller);
    let viewport = world.boundary.size();

    for (ghost, mut transform, mut visibility) in query.iter_mut() {
        let blur = shapes.get(ghost.index).and_then(|s| s.blur().map(|b| (s, b)));
        let Some((shape, blur)) = blur else {
            *visibility = Visibility::Hidden;
            continue;
        };
        let p = to_camera_space(
            shape.position + blur.direction() * blur.radius * ghost.offset,
            viewport,
        );
        transform.translation.x = p.x;
        transform.translation.y = p.y;
        transform.scale = Vec3::splat(shape.radius);
        *visibility = Visibility::Visible;
    }
}

/// Upload the compositor's pixels and cover the viewport with the sprite.
pub fn sync_metaball_layer_system(
    world: Res<PhysicsWorld>,
    controller: Res<RenderModeController>,
    compositor: Res<MetaballCompositor>,
    layer_image: Res<MetaballImage>,
    mut images: ResMut<Assets<Image>>,
    mut query: Query<(&mut Sprite, &mut Transform, &mut Visibility), With<MetaballSprite>>,
) {
    let Ok((mut sprite, mut transform, mut visibility)) = query.single_mut() else {
        return;
    };
    if !controller.scene_compositing_enabled() {
        *visibility = Visibility::Hidden;
        return;
    }

    let layer = compositor.layer();
    if layer.width == 0 || layer.height == 0 {
        return;
    }
    if let Some(image) = images.get_mut(&layer_image.0) {
        let size = Extent3d {
            width: layer.width as u32,
            height: layer.height as u32,
            depth_or_array_layers: 1,
        };
        if image.texture_descriptor.size != size {
            image.resize(size);
        }
        image.data = Some(layer.pixels().to_vec());
    }

    // The grid is rounded up to whole samples, so it can overhang the
    // viewport's top/right edges; keep its bottom-left on the viewport corner.
    let extent = Vec2::new(
        layer.width as f32 * layer.spacing,
        layer.height as f32 * layer.spacing,
    );
    sprite.custom_size = Some(extent);
    let centre = to_camera_space(extent * 0.5, world.boundary.size());
    transform.translation.x = centre.x;
    transform.translation.y = centre.y;
    *visibility = Visibility::Visible;
}

// ── Geometry helpers ──────────────────────────────────────────────────────────

/// Fan-triangulated circle centred on the origin.
fn circle_mesh(radius: f32, sides: u32) -> Mesh {
    let n = sides as usize;
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(n + 1);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(n + 1);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(n + 1);

    positions.push([0.0, 0.0, 0.0]);
    normals.push([0.0, 0.0, 1.0]);
    uvs.push([0.5, 0.5]);

    for i in 0..n {
        let angle = std::f32::consts::TAU * i as f32 / n as f32;
        let x = radius * angle.cos();
        let y = radius * angle.sin();
        positions.push([x, y, 0.0]);
        normals.push([0.0, 0.0, 1.0]);
        uvs.push([x / (2.0 * radius) + 0.5, y / (2.0 * radius) + 0.5]);
    }

    let mut indices: Vec<u32> = Vec::with_capacity(n * 3);
    for i in 0..n as u32 {
        indices.extend_from_slice(&[0, i + 1, (i + 1) % n as u32 + 1]);
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}
