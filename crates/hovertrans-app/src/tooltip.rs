use std::time::Duration;

use hovertrans_core::dom::Document;
use hovertrans_core::error::DomError;
use hovertrans_core::markup::{CONTENT_CLASS, ERROR_CLASS, TOOLTIP_CLASS, render_text, render_with_link};
use hovertrans_types::{HostCommand, NodeId, Point, Size};

use crate::timer::{TimerId, TimerSlot, Timers};

pub const FADE_DURATION: Duration = Duration::from_millis(200);

const ANCHOR_OFFSET: f64 = 15.0;
const FLIP_MARGIN: f64 = 10.0;
const MAX_WIDTH: f64 = 360.0;
const CHAR_WIDTH: f64 = 7.5;
const LINE_HEIGHT: f64 = 20.0;
const PADDING: f64 = 12.0;

/// Box estimate for `content`, wrapping lines at the tooltip's max width
pub fn estimate_size(content: &str) -> Size {
    let mut widest: f64 = 0.0;
    let mut rows = 0.0;
    for line in content.split('\n') {
        let px = line.chars().count() as f64 * CHAR_WIDTH;
        widest = widest.max(px.min(MAX_WIDTH));
        rows += (px / MAX_WIDTH).ceil().max(1.0);
    }
    Size::new(widest + 2.0 * PADDING, rows * LINE_HEIGHT + 2.0 * PADDING)
}

/// Place a box near `anchor`, flipping to the other side of the anchor on
/// overflow and clamping into the viewport.
pub fn place(anchor: Point, size: Size, viewport: Size) -> Point {
    let mut x = anchor.x + ANCHOR_OFFSET;
    let mut y = anchor.y + ANCHOR_OFFSET;

    if x + size.width > viewport.width {
        x = anchor.x - size.width - FLIP_MARGIN;
    }
    if y + size.height > viewport.height {
        y = anchor.y - size.height - FLIP_MARGIN;
    }

    Point::new(
        x.min(viewport.width - size.width).max(0.0),
        y.min(viewport.height - size.height).max(0.0),
    )
}

#[derive(Debug)]
struct Tooltip {
    id: NodeId,
    content: NodeId,
    generation: u64,
    fading: bool,
}

/// Owner of the single floating tooltip
#[derive(Debug, Default)]
pub struct TooltipRenderer {
    current: Option<Tooltip>,
    fade: TimerSlot<NodeId>,
    generations: u64,
}

impl TooltipRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tear down any previous tooltip, then show `content` near `anchor`.
    /// Returns the generation of the new tooltip.
    pub fn show(
        &mut self,
        doc: &mut Document,
        anchor: Point,
        content: &str,
        commands: &mut Vec<HostCommand>,
    ) -> Result<u64, DomError> {
        self.teardown(doc, commands);

        let body = doc.body()?;
        let id = doc.create_element(body, "div")?;
        doc.set_attribute(id, "class", TOOLTIP_CLASS)?;
        let content_id = doc.create_element(id, "div")?;
        doc.set_attribute(content_id, "class", CONTENT_CLASS)?;

        let html = render_text(content);
        doc.set_inner_html(content_id, html.clone())?;

        let position = place(anchor, estimate_size(content), doc.viewport());
        doc.set_attribute(
            id,
            "style",
            &format!("left: {}px; top: {}px; opacity: 1", position.x, position.y),
        )?;

        self.generations += 1;
        self.current = Some(Tooltip {
            id,
            content: content_id,
            generation: self.generations,
            fading: false,
        });
        tracing::debug!("Tooltip {id:?} shown at ({}, {})", position.x, position.y);

        commands.push(HostCommand::ShowTooltip {
            id,
            x: position.x,
            y: position.y,
            html,
        });
        Ok(self.generations)
    }

    /// Replace the text, marking the tooltip as an error when flagged
    pub fn update(&mut self, doc: &mut Document, content: &str, is_error: bool) -> Vec<HostCommand> {
        let Some(tooltip) = &self.current else {
            return Vec::new();
        };

        if is_error {
            let _ = doc.set_attribute(tooltip.id, "class", &format!("{TOOLTIP_CLASS} {ERROR_CLASS}"));
        }
        self.write(doc, render_text(content), is_error)
    }

    /// Replace the text, turning the literal `url` into a clickable link
    pub fn update_with_link(&mut self, doc: &mut Document, content: &str, url: &str) -> Vec<HostCommand> {
        self.write(doc, render_with_link(content, url), false)
    }

    fn write(&mut self, doc: &mut Document, html: String, error: bool) -> Vec<HostCommand> {
        let Some(tooltip) = &self.current else {
            return Vec::new();
        };
        if doc.set_inner_html(tooltip.content, html.clone()).is_err() {
            return Vec::new();
        }
        vec![HostCommand::UpdateTooltip {
            id: tooltip.id,
            html,
            error,
        }]
    }

    /// Fade out, removing the node once the fade is over. No-op when there is
    /// nothing to hide or it is already fading.
    pub fn hide(&mut self, doc: &mut Document, timers: &mut Timers) -> Vec<HostCommand> {
        let Some(tooltip) = self.current.as_mut().filter(|t| !t.fading) else {
            return Vec::new();
        };

        tooltip.fading = true;
        let id = tooltip.id;
        let _ = doc.set_attribute(id, "style", "opacity: 0");
        self.fade.arm(timers.schedule(FADE_DURATION), id);

        vec![HostCommand::FadeTooltip { id }]
    }

    /// Finish a fade started by [`hide`](Self::hide)
    pub fn on_timer(&mut self, doc: &mut Document, timer: TimerId) -> Option<Vec<HostCommand>> {
        let id = self.fade.fire(timer)?;
        let mut commands = Vec::new();
        if self.current.as_ref().is_some_and(|t| t.id == id) {
            self.teardown(doc, &mut commands);
        }
        Some(commands)
    }

    /// Synchronous removal, used before showing a replacement
    fn teardown(&mut self, doc: &mut Document, commands: &mut Vec<HostCommand>) {
        self.fade.cancel();
        if let Some(tooltip) = self.current.take() {
            doc.remove(tooltip.id);
            commands.push(HostCommand::RemoveTooltip { id: tooltip.id });
        }
    }

    /// Forget the tooltip without touching the document, after a reload
    pub fn reset(&mut self) {
        self.fade.cancel();
        self.current = None;
    }

    /// Generation of the visible, non-fading tooltip
    pub fn live_generation(&self) -> Option<u64> {
        self.current.as_ref().filter(|t| !t.fading).map(|t| t.generation)
    }

    pub fn is_shown(&self) -> bool {
        self.current.is_some()
    }

    /// Whether `node` is the tooltip or one of its descendants
    pub fn contains(&self, doc: &Document, node: NodeId) -> bool {
        self.current
            .as_ref()
            .is_some_and(|t| doc.is_within(node, t.id))
    }
}

#[cfg(test)]
mod tests {
    use hovertrans_types::ElementSpec;

    use super::*;
    use crate::events::SessionEvent;

    fn doc() -> Document {
        let mut doc = Document::new();
        doc.load("host", Size::new(800.0, 600.0), &ElementSpec::new(1, "body"));
        doc
    }

    fn tooltip_count(doc: &Document) -> usize {
        doc.subtree(NodeId(1))
            .into_iter()
            .filter(|id| doc.get(*id).is_some_and(|e| e.has_class(TOOLTIP_CLASS)))
            .count()
    }

    #[test]
    fn placement_offsets_from_anchor() {
        let p = place(Point::new(100.0, 100.0), Size::new(200.0, 50.0), Size::new(800.0, 600.0));
        assert_eq!(p, Point::new(115.0, 115.0));
    }

    #[test]
    fn placement_flips_on_overflow() {
        let p = place(Point::new(700.0, 580.0), Size::new(200.0, 50.0), Size::new(800.0, 600.0));
        assert_eq!(p, Point::new(490.0, 520.0));
    }

    #[test]
    fn placement_stays_inside_small_viewports() {
        let p = place(Point::new(50.0, 20.0), Size::new(200.0, 100.0), Size::new(220.0, 110.0));
        assert!(p.x >= 0.0 && p.x + 200.0 <= 220.0);
        assert!(p.y >= 0.0 && p.y + 100.0 <= 110.0);
    }

    #[test]
    fn size_grows_with_lines() {
        let one = estimate_size("short");
        let two = estimate_size("short\nlines");
        assert!(two.height > one.height);
        assert_eq!(one.width, 5.0 * CHAR_WIDTH + 2.0 * PADDING);
        assert_eq!(estimate_size(&"x".repeat(200)).width, MAX_WIDTH + 2.0 * PADDING);
    }

    #[tokio::test(start_paused = true)]
    async fn show_replaces_previous_tooltip() {
        let (tx, _rx) = kanal::unbounded_async::<SessionEvent>();
        let mut timers = Timers::new(tx);
        let mut doc = doc();
        let mut renderer = TooltipRenderer::new();
        let mut commands = Vec::new();

        let first = renderer.show(&mut doc, Point::new(10.0, 10.0), "one", &mut commands).unwrap();
        renderer.hide(&mut doc, &mut timers);
        let second = renderer.show(&mut doc, Point::new(10.0, 10.0), "two", &mut commands).unwrap();

        assert!(second > first);
        assert_eq!(tooltip_count(&doc), 1);
        assert_eq!(renderer.live_generation(), Some(second));
        assert!(matches!(commands[1], HostCommand::RemoveTooltip { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn hide_fades_then_removes() {
        let (tx, rx) = kanal::unbounded_async::<SessionEvent>();
        let mut timers = Timers::new(tx);
        let mut doc = doc();
        let mut renderer = TooltipRenderer::new();
        let mut commands = Vec::new();

        renderer.show(&mut doc, Point::new(10.0, 10.0), "hi", &mut commands).unwrap();
        assert_eq!(renderer.hide(&mut doc, &mut timers).len(), 1);
        // already fading
        assert!(renderer.hide(&mut doc, &mut timers).is_empty());
        assert_eq!(renderer.live_generation(), None);
        assert!(renderer.is_shown());

        let Ok(SessionEvent::TimerFired(id)) = rx.recv().await else {
            panic!("Wrong event");
        };
        let removed = renderer.on_timer(&mut doc, id).unwrap();
        assert!(matches!(removed[..], [HostCommand::RemoveTooltip { .. }]));
        assert!(!renderer.is_shown());
        assert_eq!(tooltip_count(&doc), 0);

        assert!(renderer.hide(&mut doc, &mut timers).is_empty());
    }

    #[test]
    fn update_escapes_and_flags_errors() {
        let mut doc = doc();
        let mut renderer = TooltipRenderer::new();
        let mut commands = Vec::new();
        renderer.show(&mut doc, Point::new(0.0, 0.0), "...", &mut commands).unwrap();

        let update = renderer.update(&mut doc, "<script>\"x\" & y", true);
        match &update[..] {
            [HostCommand::UpdateTooltip { html, error, .. }] => {
                assert_eq!(html, "&lt;script&gt;&quot;x&quot; &amp; y");
                assert!(error);
            }
            other => panic!("unexpected {other:?}"),
        }

        let tooltip = doc
            .subtree(NodeId(1))
            .into_iter()
            .find(|id| doc.get(*id).is_some_and(|e| e.has_class(TOOLTIP_CLASS)))
            .unwrap();
        assert!(doc.get(tooltip).unwrap().has_class(ERROR_CLASS));
    }

    #[test]
    fn update_without_tooltip_is_noop() {
        let mut doc = doc();
        let mut renderer = TooltipRenderer::new();
        assert!(renderer.update(&mut doc, "x", false).is_empty());
        assert!(renderer.update_with_link(&mut doc, "x", "http://x").is_empty());
    }

    #[test]
    fn show_without_document_fails() {
        let mut doc = Document::new();
        let mut renderer = TooltipRenderer::new();
        let result = renderer.show(&mut doc, Point::default(), "x", &mut Vec::new());
        assert!(matches!(result, Err(DomError::NotLoaded)));
    }
}
