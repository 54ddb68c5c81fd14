//! Per-frame effect dispatch and the render descriptors handed to the
//! presentation layer.
//!
//! The mode controller decides which pipeline runs; [`dispatch_effects`] runs
//! it and [`render_shapes`] describes what each body should look like.  The
//! Bevy systems in [`crate::rendering`] only read these descriptors.

use crate::body::Body;
use crate::metaball::MetaballCompositor;
use crate::mode::RenderModeController;
use crate::motion_blur::{BlurDescriptor, MotionBlurParameterizer};
use crate::physics::PhysicsWorld;
use bevy::prelude::*;

/// How a single body is drawn this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeEffect {
    /// Solid disc.
    Plain,
    /// Disc smeared along the descriptor.
    Blur(BlurDescriptor),
    /// Not drawn on its own: the body is part of the metaball layer.
    Composited,
}

/// Renderable description of one body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderShape {
    /// Index into `PhysicsWorld::bodies`.
    pub index: usize,
    pub position: Vec2,
    pub radius: f32,
    pub fill: Color,
    pub stroke: Color,
    pub effect: ShapeEffect,
}

impl RenderShape {
    pub fn blur(&self) -> Option<BlurDescriptor> {
        match self.effect {
            ShapeEffect::Blur(b) => Some(b),
            _ => None,
        }
    }

    pub fn disc_visible(&self) -> bool {
        self.effect != ShapeEffect::Composited
    }
}

/// Run whichever effect pipeline the controller has enabled.
///
/// Motion blur touches each body's own descriptor only; compositing reads all
/// metaball-capable bodies and writes the compositor's layer.
pub fn dispatch_effects(
    world: &mut PhysicsWorld,
    controller: &RenderModeController,
    parameterizer: &MotionBlurParameterizer,
    compositor: &mut MetaballCompositor,
) {
    if controller.body_blur_enabled() {
        parameterizer.update_bodies(&mut world.bodies);
    }
    if controller.scene_compositing_enabled() {
        let viewport = world.boundary.size();
        compositor.composite(
            viewport,
            world
                .bodies
                .iter()
                .filter(|b| b.effects.metaball)
                .map(|b| (b.position, b.radius, b.color)),
        );
    }
}

/// Describe every body for the renderer.
pub fn render_shapes(bodies: &[Body], controller: &RenderModeController) -> Vec<RenderShape> {
    bodies
        .iter()
        .enumerate()
        .map(|(index, body)| RenderShape {
            index,
            position: body.position,
            radius: body.radius,
            fill: body.color,
            stroke: body.color,
            effect: shape_effect(body, controller),
        })
        .collect()
}

fn shape_effect(body: &Body, controller: &RenderModeController) -> ShapeEffect {
    if controller.scene_compositing_enabled() && body.effects.metaball {
        ShapeEffect::Composited
    } else if controller.body_blur_enabled()
        && body.effects.blur
        && body.blur_enabled
        && !body.blur.is_noop()
    {
        ShapeEffect::Blur(body.blur)
    } else {
        ShapeEffect::Plain
    }
}
