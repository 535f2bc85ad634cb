//! Interactive 3D step viewer using kiss3d.
//!
//! Frames arrive from the solver thread over a channel and are appended to
//! the step history as they come; the viewer never blocks on the solver.
//! The history keeps the latest `MAX_KEPT_STEPS` steps.

use std::collections::VecDeque;
use std::sync::mpsc::Receiver;

use kiss3d::prelude::*;

use gridfall::frames::{AxisDir, ColorClass, Drawable, Frame, Step, ViewFit};

/// Half the edge of the cube the fitted scene is drawn into.
const VIEW_RADIUS: f32 = 4.0;
/// Zoom factor per keypress.
const ZOOM_STEP: f32 = 1.25;
/// Rendered frames per step while playing.
const PLAY_INTERVAL: u32 = 10;
/// Thickness of flat areas relative to their size.
const AREA_THICKNESS: f32 = 0.05;
/// Steps kept for stepping back and forth; older ones are dropped.
const MAX_KEPT_STEPS: usize = 512;
/// Upper bound on cubes used to draw one slanted line.
const MAX_LINE_SEGMENTS: usize = 32;

/// Returns the display color for a color class.
///
/// The mapping is stable to keep colors consistent across steps.
fn class_color(class: ColorClass) -> Color {
    match class {
        ColorClass::Current => Color::new(1.0, 0.2, 0.2, 1.0),    // red
        ColorClass::Known => Color::new(0.2, 0.6, 1.0, 1.0),      // blue
        ColorClass::Marked => Color::new(1.0, 1.0, 0.2, 1.0),     // yellow
        ColorClass::Background => Color::new(0.6, 0.6, 0.6, 1.0), // grey
    }
}

fn to_vec3(point: [f32; 3]) -> Vec3 {
    Vec3::new(point[0], point[1], point[2])
}

/// Maps puzzle-space coordinates and sizes into the window.
struct Projection {
    fit: ViewFit,
    zoom: f32,
}

impl Projection {
    fn position(&self, point: [f32; 3]) -> Vec3 {
        to_vec3(self.fit.apply(point)) * VIEW_RADIUS * self.zoom
    }

    fn length(&self, size: f32) -> f32 {
        size * self.fit.scale * VIEW_RADIUS * self.zoom
    }
}

/// Adds one cube to the scene and returns its node.
fn add_box(scene: &mut SceneNode3d, dims: Vec3, position: Vec3, class: ColorClass) -> SceneNode3d {
    scene
        .add_cube(dims.x, dims.y, dims.z)
        .set_color(class_color(class))
        .set_position(position)
}

/// Draws a segment. Axis-aligned segments become one stretched box, slanted
/// ones a row of small cubes.
fn add_segment(
    scene: &mut SceneNode3d,
    projection: &Projection,
    from: [f32; 3],
    to: [f32; 3],
    size: f32,
    class: ColorClass,
) -> Vec<SceneNode3d> {
    let start = projection.position(from);
    let end = projection.position(to);
    let thickness = projection.length(size).max(0.005);
    let delta = end - start;
    let spanned_axes = [delta.x, delta.y, delta.z]
        .iter()
        .filter(|d| d.abs() > f32::EPSILON)
        .count();

    if spanned_axes <= 1 {
        let dims = Vec3::new(
            delta.x.abs().max(thickness),
            delta.y.abs().max(thickness),
            delta.z.abs().max(thickness),
        );
        return vec![add_box(scene, dims, (start + end) / 2.0, class)];
    }

    let segments = ((delta.length() / thickness).ceil() as usize).clamp(2, MAX_LINE_SEGMENTS);
    (0..=segments)
        .map(|i| {
            let t = i as f32 / segments as f32;
            add_box(scene, Vec3::splat(thickness), start + delta * t, class)
        })
        .collect()
}

/// Builds the scene nodes for one step.
fn build_scene(scene: &mut SceneNode3d, step: &Step, projection: &Projection) -> Vec<SceneNode3d> {
    let mut nodes = Vec::with_capacity(step.objects.len());

    for object in &step.objects {
        match object {
            Drawable::Point { at, size, class, .. } => {
                let edge = projection.length(*size);
                nodes.push(add_box(scene, Vec3::splat(edge), projection.position(*at), *class));
            }
            Drawable::Line {
                from,
                to,
                size,
                class,
                ..
            } => nodes.extend(add_segment(scene, projection, *from, *to, *size, *class)),
            Drawable::Text {
                from, to, size, class, ..
            } => {
                // kiss3d has no 3D text; mark the anchor midpoint instead
                let middle = (projection.position(*from) + projection.position(*to)) / 2.0;
                let edge = projection.length(*size);
                nodes.push(add_box(scene, Vec3::splat(edge), middle, *class));
            }
            Drawable::Area {
                center,
                ratio,
                size,
                normal,
                class,
                ..
            } => {
                let long = projection.length(*size * *ratio);
                let short = projection.length(*size);
                let thin = short * AREA_THICKNESS;
                let dims = match normal {
                    AxisDir::X => Vec3::new(thin, short, long),
                    AxisDir::Y => Vec3::new(long, thin, short),
                    AxisDir::Z => Vec3::new(long, short, thin),
                };
                nodes.push(add_box(scene, dims, projection.position(*center), *class));
            }
        }
    }

    nodes
}

/// The steps the viewer keeps, with a cursor on the one on screen.
///
/// Holds at most `capacity` steps. Once full, every new step evicts the
/// oldest one, so a long search shows its latest steps instead of growing
/// without bound.
struct StepHistory {
    steps: VecDeque<Step>,
    capacity: usize,
    evicted: usize,
    current: Option<usize>,
}

impl StepHistory {
    fn new(capacity: usize) -> Self {
        Self {
            steps: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
            evicted: 0,
            current: None,
        }
    }

    /// Appends a step; returns whether the step on screen changed.
    fn push(&mut self, step: Step) -> bool {
        let mut changed = false;
        if self.steps.len() == self.capacity {
            self.steps.pop_front();
            self.evicted += 1;
            changed = self.current == Some(0);
            self.current = self.current.map(|index| index.saturating_sub(1));
        }
        self.steps.push_back(step);
        if self.current.is_none() {
            self.current = Some(0);
            changed = true;
        }
        changed
    }

    fn next(&mut self) -> bool {
        match self.current {
            Some(index) if index + 1 < self.steps.len() => {
                self.current = Some(index + 1);
                true
            }
            _ => false,
        }
    }

    fn previous(&mut self) -> bool {
        match self.current {
            Some(index) if index > 0 => {
                self.current = Some(index - 1);
                true
            }
            _ => false,
        }
    }

    fn current(&self) -> Option<&Step> {
        self.current.and_then(|index| self.steps.get(index))
    }

    fn title(&self, name: &str) -> String {
        let Some(step) = self.current() else {
            return format!("{} - waiting for frames", name);
        };
        let position = self.current.unwrap_or_default() + self.evicted + 1;
        let total = self.steps.len() + self.evicted;
        let evicted = if self.evicted > 0 {
            format!(" ({} oldest dropped)", self.evicted)
        } else {
            String::new()
        };
        format!(
            "{} - step {}/{}{}: {} - [Left/Right] step, [Up/Down] zoom, [R] reset, [P] play",
            name, position, total, evicted, step.label
        )
    }
}

/// Displays solver frames in an interactive 3D viewer until the window closes.
pub fn display(frames: Receiver<Frame>, name: &str) {
    pollster::block_on(display_async(frames, name));
}

async fn display_async(frames: Receiver<Frame>, name: &str) {
    let mut history = StepHistory::new(MAX_KEPT_STEPS);
    let mut window = Window::new(&history.title(name)).await;

    let mut camera = OrbitCamera3d::default();
    camera.set_dist(3.0 * VIEW_RADIUS);

    let mut scene = SceneNode3d::empty();
    scene
        .add_light(Light::point(100.0))
        .set_position(Vec3::new(2.0 * VIEW_RADIUS, 2.0 * VIEW_RADIUS, 2.0 * VIEW_RADIUS));

    let mut projection = Projection {
        fit: ViewFit::default(),
        zoom: 1.0,
    };
    let mut nodes: Vec<SceneNode3d> = Vec::new();
    let mut playing = false;
    let mut frames_since_advance: u32 = 0;
    // whether the scene needs to be rebuilt (after a step or zoom change)
    let mut needs_rebuild = false;

    loop {
        let mut arrived = false;
        for frame in frames.try_iter() {
            match frame {
                Frame::Fit(fit) => {
                    projection.fit = fit;
                    needs_rebuild = true;
                }
                Frame::Step(step) => {
                    needs_rebuild |= history.push(step);
                    arrived = true;
                }
            }
        }
        if arrived {
            window.set_title(&history.title(name));
        }

        for event in window.events().iter() {
            if let kiss3d::event::WindowEvent::Key(key, action, _) = event.value {
                use kiss3d::event::{Action, Key};
                if action == Action::Press {
                    match key {
                        Key::Up => projection.zoom *= ZOOM_STEP,
                        Key::Down => projection.zoom /= ZOOM_STEP,
                        Key::R => projection.zoom = 1.0,
                        Key::P => playing = !playing,
                        Key::Right => {
                            history.next();
                        }
                        Key::Left => {
                            history.previous();
                        }
                        _ => {}
                    }
                    needs_rebuild = true;
                }
            }
        }

        if playing {
            frames_since_advance += 1;
            if frames_since_advance >= PLAY_INTERVAL {
                frames_since_advance = 0;
                needs_rebuild |= history.next();
            }
        }

        if needs_rebuild {
            for mut node in nodes.drain(..) {
                node.remove();
            }
            if let Some(step) = history.current() {
                nodes = build_scene(&mut scene, step, &projection);
            }
            window.set_title(&history.title(name));
            needs_rebuild = false;
        }

        if !window.render_3d(&mut scene, &mut camera).await {
            break;
        }
    }
}
