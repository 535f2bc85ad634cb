//! Animation frames and the sinks that carry them to a viewer.
//!
//! The engines never talk to a window. They describe what to draw as plain
//! [`Drawable`] values and hand whole steps to a [`StepSink`]. The viewer
//! side owns the receiving end and renders steps at its own pace.

use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::Mutex;

use log::warn;

/// Color class of a primitive; the viewer maps classes to colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorClass {
    /// The element currently being examined.
    Current,
    /// Part of the best-known solution so far.
    Known,
    /// Highlighted by an analysis result.
    Marked,
    /// Everything else.
    Background,
}

/// Normal direction of a flat area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisDir {
    X,
    Y,
    Z,
}

/// A named primitive in viewer space.
#[derive(Debug, Clone, PartialEq)]
pub enum Drawable {
    /// A cube of edge `size` centered on `at`.
    Point {
        id: String,
        at: [f32; 3],
        size: f32,
        class: ColorClass,
    },
    Line {
        id: String,
        from: [f32; 3],
        to: [f32; 3],
        size: f32,
        class: ColorClass,
    },
    /// Text anchored on the segment between two points.
    Text {
        id: String,
        text: String,
        from: [f32; 3],
        to: [f32; 3],
        size: f32,
        class: ColorClass,
    },
    /// A flat rectangle `ratio * size` by `size` facing `normal`.
    Area {
        id: String,
        center: [f32; 3],
        ratio: f32,
        size: f32,
        normal: AxisDir,
        class: ColorClass,
    },
}

impl Drawable {
    pub fn id(&self) -> &str {
        match self {
            Drawable::Point { id, .. }
            | Drawable::Line { id, .. }
            | Drawable::Text { id, .. }
            | Drawable::Area { id, .. } => id,
        }
    }

    pub fn class(&self) -> ColorClass {
        match self {
            Drawable::Point { class, .. }
            | Drawable::Line { class, .. }
            | Drawable::Text { class, .. }
            | Drawable::Area { class, .. } => *class,
        }
    }

    /// The anchor points used for view fitting.
    pub fn anchors(&self) -> Vec<[f32; 3]> {
        match self {
            Drawable::Point { at, .. } => vec![*at],
            Drawable::Line { from, to, .. } | Drawable::Text { from, to, .. } => vec![*from, *to],
            Drawable::Area { center, .. } => vec![*center],
        }
    }
}

/// Center offset and uniform scale that fit a set of primitives into a
/// cube of edge 2 around the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewFit {
    pub offset: [f32; 3],
    pub scale: f32,
}

impl Default for ViewFit {
    fn default() -> Self {
        Self {
            offset: [0.0; 3],
            scale: 1.0,
        }
    }
}

impl ViewFit {
    pub fn from_drawables(objects: &[Drawable]) -> Self {
        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];
        for anchor in objects.iter().flat_map(Drawable::anchors) {
            for axis in 0..3 {
                min[axis] = min[axis].min(anchor[axis]);
                max[axis] = max[axis].max(anchor[axis]);
            }
        }
        if objects.is_empty() {
            return Self::default();
        }

        let offset = [
            (min[0] + max[0]) / 2.0,
            (min[1] + max[1]) / 2.0,
            (min[2] + max[2]) / 2.0,
        ];
        let mut extent = (0..3).map(|axis| max[axis] - min[axis]).fold(0.0, f32::max);
        if extent == 0.0 {
            extent = 1.0;
        }
        Self {
            offset,
            scale: 2.0 / extent,
        }
    }

    /// Maps a point from puzzle space into the fitted view.
    #[inline]
    pub fn apply(&self, point: [f32; 3]) -> [f32; 3] {
        [
            (point[0] - self.offset[0]) * self.scale,
            (point[1] - self.offset[1]) * self.scale,
            (point[2] - self.offset[2]) * self.scale,
        ]
    }
}

/// One labeled animation frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub label: String,
    pub objects: Vec<Drawable>,
}

/// Messages travelling from an engine to a viewer.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Fit(ViewFit),
    Step(Step),
}

/// Receives animation frames. Implementations must never block the caller
/// for long and never report failure back to it.
pub trait StepSink {
    /// Recomputes the view fit from the bounding box of `objects`.
    fn adjust_scale(&mut self, objects: &[Drawable]);

    /// Appends one animation frame.
    fn add_step(&mut self, label: &str, objects: Vec<Drawable>);

    /// Whether `adjust_scale` has been called yet.
    fn is_scaled(&self) -> bool;
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl StepSink for NullSink {
    fn adjust_scale(&mut self, _: &[Drawable]) {}

    fn add_step(&mut self, _: &str, _: Vec<Drawable>) {}

    fn is_scaled(&self) -> bool {
        true
    }
}

/// Keeps every frame in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    frames: Mutex<Vec<Frame>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of all frames so far.
    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().map(|frames| frames.clone()).unwrap_or_default()
    }

    /// Labels of all recorded steps, in order.
    pub fn labels(&self) -> Vec<String> {
        self.frames()
            .into_iter()
            .filter_map(|frame| match frame {
                Frame::Step(step) => Some(step.label),
                Frame::Fit(_) => None,
            })
            .collect()
    }

    fn push(&self, frame: Frame) {
        if let Ok(mut frames) = self.frames.lock() {
            frames.push(frame);
        }
    }
}

impl StepSink for RecordingSink {
    fn adjust_scale(&mut self, objects: &[Drawable]) {
        self.push(Frame::Fit(ViewFit::from_drawables(objects)));
    }

    fn add_step(&mut self, label: &str, objects: Vec<Drawable>) {
        self.push(Frame::Step(Step {
            label: label.to_string(),
            objects,
        }));
    }

    fn is_scaled(&self) -> bool {
        self.frames().iter().any(|frame| matches!(frame, Frame::Fit(_)))
    }
}

/// Sends frames over a bounded channel to another thread.
///
/// When the queue is full the newest frame is dropped and counted, so the
/// producer never waits for the viewer. A disconnected receiver silently
/// swallows frames.
pub struct ChannelSink {
    sender: SyncSender<Frame>,
    scaled: bool,
    dropped: usize,
}

impl ChannelSink {
    /// Creates a sink and its receiving end holding at most `capacity` frames.
    pub fn bounded(capacity: usize) -> (Self, Receiver<Frame>) {
        let (sender, receiver) = mpsc::sync_channel(capacity);
        (
            Self {
                sender,
                scaled: false,
                dropped: 0,
            },
            receiver,
        )
    }

    /// Frames dropped because the viewer fell behind.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    fn send(&mut self, frame: Frame) {
        match self.sender.try_send(frame) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(_)) => {
                if self.dropped == 0 {
                    warn!("viewer queue is full, dropping frames");
                }
                self.dropped += 1;
            }
        }
    }
}

impl StepSink for ChannelSink {
    fn adjust_scale(&mut self, objects: &[Drawable]) {
        self.scaled = true;
        self.send(Frame::Fit(ViewFit::from_drawables(objects)));
    }

    fn add_step(&mut self, label: &str, objects: Vec<Drawable>) {
        self.send(Frame::Step(Step {
            label: label.to_string(),
            objects,
        }));
    }

    fn is_scaled(&self) -> bool {
        self.scaled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(at: [f32; 3]) -> Drawable {
        Drawable::Point {
            id: format!("{at:?}"),
            at,
            size: 0.1,
            class: ColorClass::Background,
        }
    }

    #[test]
    fn test_view_fit_centers_bounding_box() {
        let fit = ViewFit::from_drawables(&[
            point([0.0, 0.0, 0.0]),
            Drawable::Line {
                id: "l".to_string(),
                from: [2.0, 1.0, 0.0],
                to: [4.0, 1.0, 1.0],
                size: 0.1,
                class: ColorClass::Known,
            },
        ]);
        assert_eq!(fit.offset, [2.0, 0.5, 0.5]);
        assert_eq!(fit.scale, 0.5);
        assert_eq!(fit.apply([4.0, 1.0, 1.0]), [1.0, 0.25, 0.25]);
    }

    #[test]
    fn test_view_fit_of_single_point_keeps_unit_scale() {
        let fit = ViewFit::from_drawables(&[point([3.0, 3.0, 3.0])]);
        assert_eq!(fit.offset, [3.0, 3.0, 3.0]);
        assert_eq!(fit.scale, 2.0);
        assert_eq!(ViewFit::from_drawables(&[]), ViewFit::default());
    }

    #[test]
    fn test_recording_sink_keeps_order() {
        let mut sink = RecordingSink::new();
        assert!(!sink.is_scaled());
        sink.adjust_scale(&[point([0.0; 3])]);
        sink.add_step("first", vec![point([0.0; 3])]);
        sink.add_step("second", Vec::new());
        assert!(sink.is_scaled());
        assert_eq!(sink.labels(), vec!["first", "second"]);
        assert_eq!(sink.frames().len(), 3);
    }

    #[test]
    fn test_channel_sink_drops_when_full() {
        let (mut sink, receiver) = ChannelSink::bounded(2);
        for i in 0..5 {
            sink.add_step(&format!("step {i}"), Vec::new());
        }
        assert_eq!(sink.dropped(), 3);

        let labels: Vec<String> = receiver
            .try_iter()
            .filter_map(|frame| match frame {
                Frame::Step(step) => Some(step.label),
                Frame::Fit(_) => None,
            })
            .collect();
        assert_eq!(labels, vec!["step 0", "step 1"]);
    }

    #[test]
    fn test_channel_sink_ignores_closed_viewer() {
        let (mut sink, receiver) = ChannelSink::bounded(1);
        drop(receiver);
        sink.add_step("lost", Vec::new());
        assert_eq!(sink.dropped(), 0);
    }

    #[test]
    fn test_drawable_accessors() {
        let area = Drawable::Area {
            id: "a".to_string(),
            center: [1.0, 2.0, 3.0],
            ratio: 2.0,
            size: 1.0,
            normal: AxisDir::Z,
            class: ColorClass::Marked,
        };
        assert_eq!(area.id(), "a");
        assert_eq!(area.class(), ColorClass::Marked);
        assert_eq!(area.anchors(), vec![[1.0, 2.0, 3.0]]);
    }
}
