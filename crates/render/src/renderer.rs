use campus_assets::TextureId;
use campus_common::Rect;
use campus_kernel::{DrawTarget, Viewport, World};
use glam::{Affine2, Vec2};

/// One primitive as a backend would receive it, already in world space.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    SetView { center: Vec2, size: Vec2 },
    Sprite { texture: TextureId, bounds: Rect },
    Text { text: String, color: [u8; 4], position: Vec2 },
}

/// A draw target that keeps every call in order instead of rasterizing.
#[derive(Debug, Default)]
pub struct RecordingTarget {
    calls: Vec<DrawCall>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn into_calls(self) -> Vec<DrawCall> {
        self.calls
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl DrawTarget for RecordingTarget {
    fn set_view(&mut self, view: &Viewport) {
        self.calls.push(DrawCall::SetView {
            center: view.center(),
            size: view.size(),
        });
    }

    fn draw_sprite(&mut self, texture: TextureId, local: Rect, transform: &Affine2) {
        self.calls.push(DrawCall::Sprite {
            texture,
            bounds: local.transformed(transform),
        });
    }

    fn draw_text(&mut self, text: &str, color: [u8; 4], transform: &Affine2) {
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            color,
            position: transform.translation,
        });
    }
}

/// Renderer-agnostic interface. A renderer reads the world and produces a
/// frame; it never mutates the world.
pub trait Renderer {
    type Output;

    fn render(&self, world: &World) -> Self::Output;
}

/// Produces the ordered draw list for a frame.
#[derive(Debug, Default)]
pub struct RecordingRenderer;

impl Renderer for RecordingRenderer {
    type Output = Vec<DrawCall>;

    fn render(&self, world: &World) -> Vec<DrawCall> {
        let mut target = RecordingTarget::new();
        world.draw(&mut target);
        target.into_calls()
    }
}

/// Text rendering of a frame for the CLI and logs. Lists what falls inside
/// the viewport; the background is summarized, not listed.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, world: &World) -> String {
        let view = world.view().bounds();
        let calls = RecordingRenderer.render(world);

        let mut out = String::new();
        out.push_str(&format!("=== Campus (tick={}) ===\n", world.tick()));
        out.push_str(&format!("Nodes: {}\n", world.node_count()));
        out.push_str(&format!(
            "View: ({:.1}, {:.1}) {}x{}\n",
            view.left, view.top, view.width, view.height
        ));
        if let (Some(p), Some(player)) = (world.player_position(), world.player()) {
            out.push_str(&format!(
                "Player: pos=({:.2}, {:.2}) hp={}\n",
                p.x,
                p.y,
                player.hitpoints()
            ));
        }

        let mut offscreen = 0;
        for call in &calls {
            match call {
                DrawCall::Sprite {
                    texture: TextureId::Grass,
                    ..
                }
                | DrawCall::SetView { .. } => {}
                DrawCall::Sprite { texture, bounds } if bounds.intersects(&view) => {
                    let c = bounds.center();
                    out.push_str(&format!("  {texture:?} at ({:.1}, {:.1})\n", c.x, c.y));
                }
                DrawCall::Text { text, position, .. } if view.contains(*position) => {
                    out.push_str(&format!(
                        "  \"{text}\" at ({:.1}, {:.1})\n",
                        position.x, position.y
                    ));
                }
                _ => offscreen += 1,
            }
        }
        out.push_str(&format!("Offscreen: {offscreen}\n"));
        out
    }
}
