use std::time::Duration;

use hovertrans_config::Config;
use hovertrans_core::dom::Document;
use hovertrans_core::domain::is_domain_allowed;
use hovertrans_core::extract::{extract_text, is_eligible, selection_text};
use hovertrans_core::suppress::NativeTooltipSuppressor;
use hovertrans_core::trace::is_error_text;
use hovertrans_types::{HostCommand, HostEvent, NodeId, Point};
use kanal::{AsyncReceiver, AsyncSender};
use tokio_util::sync::CancellationToken;

use crate::background::RequestBridge;
use crate::events::SessionEvent;
use crate::orchestrator::{CycleSettings, Plan, TooltipContent, execute, immediate_content, plan};
use crate::timer::{TimerId, TimerSlot, Timers};
use crate::tooltip::TooltipRenderer;

/// Delay before hiding after the pointer leaves the hovered element
pub const HIDE_GRACE: Duration = Duration::from_millis(300);
/// Delay before hiding after the pointer leaves the tooltip itself
pub const TOOLTIP_LEAVE_DELAY: Duration = Duration::from_millis(200);
/// Wait for a mouse-up/key-up selection to settle
pub const SELECTION_SETTLE: Duration = Duration::from_millis(100);

const SELECTION_GAP: f64 = 5.0;

#[derive(Debug)]
struct HoverTrigger {
    text: String,
    is_error: bool,
    anchor: Point,
}

#[derive(Debug, Clone, Copy)]
enum HideReason {
    /// Skipped if the pointer made it onto the tooltip meanwhile
    Grace,
    TooltipLeave,
}

#[derive(Debug)]
struct ActiveCycle {
    id: u64,
    generation: u64,
}

/// Trigger controller: owns the page mirror, the tooltip and every timer, and
/// turns host events into tooltip commands. Runs on a single task.
pub struct Session {
    config: Config,
    doc: Document,
    suppressor: NativeTooltipSuppressor,
    tooltip: TooltipRenderer,
    timers: Timers,
    bridge: RequestBridge,
    inbox: AsyncSender<SessionEvent>,
    debounce: TimerSlot<HoverTrigger>,
    settle: TimerSlot<()>,
    hide: TimerSlot<HideReason>,
    hovered: Option<NodeId>,
    processing: bool,
    cycles: u64,
    active: Option<ActiveCycle>,
}

impl Session {
    pub fn new(config: Config, bridge: RequestBridge, inbox: AsyncSender<SessionEvent>) -> Self {
        Self {
            config,
            doc: Document::new(),
            suppressor: NativeTooltipSuppressor::new(),
            tooltip: TooltipRenderer::new(),
            timers: Timers::new(inbox.clone()),
            bridge,
            inbox,
            debounce: TimerSlot::default(),
            settle: TimerSlot::default(),
            hide: TimerSlot::default(),
            hovered: None,
            processing: false,
            cycles: 0,
            active: None,
        }
    }

    pub fn handle(&mut self, event: SessionEvent) -> Vec<HostCommand> {
        match event {
            SessionEvent::Host(event) => self.on_host_event(event),
            SessionEvent::ConfigChanged(patch) => {
                // in-flight cycles keep the settings they started with
                self.config.merge(patch);
                tracing::info!("Working config updated");
                Vec::new()
            }
            SessionEvent::TimerFired(id) => self.on_timer(id),
            SessionEvent::CycleFinished { cycle, content } => self.on_cycle_finished(cycle, content),
        }
    }

    fn on_host_event(&mut self, event: HostEvent) -> Vec<HostCommand> {
        match event {
            HostEvent::Load {
                hostname,
                viewport,
                body,
            } => {
                self.doc.load(&hostname, viewport, &body);
                // ids restart with every page
                self.suppressor = NativeTooltipSuppressor::new();
                self.tooltip.reset();
                self.debounce.cancel();
                self.settle.cancel();
                self.hide.cancel();
                self.hovered = None;
                if self.config.ignore_native_tooltips {
                    let registered = self.suppressor.scan(&self.doc, body.id);
                    tracing::debug!("Registered {registered} native tooltips on load");
                }
                tracing::info!("Page loaded: {hostname} ({} elements)", self.doc.len());
                Vec::new()
            }
            HostEvent::PointerOver { target, x, y } => self.on_pointer_over(target, Point::new(x, y)),
            HostEvent::PointerOut { target, related } => self.on_pointer_out(target, related),
            HostEvent::PointerDown | HostEvent::Scroll => {
                self.debounce.cancel();
                self.hide.cancel();
                self.tooltip.hide(&mut self.doc, &mut self.timers)
            }
            HostEvent::MouseUp | HostEvent::KeyUp => {
                if self.config.enabled && !self.processing && self.domain_allowed() {
                    let timer = self.timers.schedule(SELECTION_SETTLE);
                    self.settle.arm(timer, ());
                }
                Vec::new()
            }
            HostEvent::SelectionChanged { selection } => {
                self.doc.set_selection(selection);
                Vec::new()
            }
            HostEvent::InputValue { target, value } => {
                if let Err(e) = self.doc.set_value(target, &value) {
                    tracing::warn!("Input value for unknown element: {e}");
                }
                Vec::new()
            }
            HostEvent::NodesInserted { parent, node } => {
                match self.doc.insert(parent, &node) {
                    Ok(inserted) => {
                        if self.config.ignore_native_tooltips {
                            self.suppressor.scan(&self.doc, node.id);
                        }
                        tracing::trace!("Inserted {} elements", inserted.len());
                    }
                    Err(e) => tracing::warn!("Dropping inserted subtree: {e}"),
                }
                Vec::new()
            }
            HostEvent::NodeRemoved { node } => {
                let removed = self.doc.remove(node);
                self.suppressor.on_removed(&removed);
                if self.hovered.is_some_and(|h| removed.contains(&h)) {
                    self.hovered = None;
                }
                Vec::new()
            }
            HostEvent::Resize { viewport } => {
                self.doc.set_viewport(viewport);
                Vec::new()
            }
        }
    }

    fn on_pointer_over(&mut self, target: NodeId, anchor: Point) -> Vec<HostCommand> {
        let mut commands = Vec::new();
        if self.config.ignore_native_tooltips {
            commands.extend(self.suppressor.on_pointer_over(&mut self.doc, target));
        }

        self.hovered = Some(target);
        if self.tooltip.contains(&self.doc, target) {
            if self.hide.cancel() {
                tracing::debug!("Pointer on tooltip, hide cancelled");
            }
            return commands;
        }

        if !self.config.enabled || self.processing || !self.domain_allowed() {
            return commands;
        }
        if !is_eligible(&self.doc, target) {
            return commands;
        }

        let text = extract_text(&self.doc, self.suppressor.registry(), target);
        if text.is_empty() {
            return commands;
        }

        let is_error = is_error_text(&self.doc.text_content(target));
        let timer = self.timers.schedule(self.config.debounce());
        self.debounce.arm(
            timer,
            HoverTrigger {
                text,
                is_error,
                anchor,
            },
        );
        commands
    }

    fn on_pointer_out(&mut self, target: NodeId, related: Option<NodeId>) -> Vec<HostCommand> {
        // restore even if suppression was switched off mid-hover
        let commands = self.suppressor.on_pointer_out(&mut self.doc, target);

        self.hovered = related;
        if self.tooltip.contains(&self.doc, target) {
            let still_inside = related.is_some_and(|r| self.tooltip.contains(&self.doc, r));
            if !still_inside {
                let timer = self.timers.schedule(TOOLTIP_LEAVE_DELAY);
                self.hide.arm(timer, HideReason::TooltipLeave);
            }
            return commands;
        }

        if self.debounce.cancel() {
            tracing::debug!("Pointer left before debounce elapsed");
        }
        if self.tooltip.is_shown() {
            let timer = self.timers.schedule(HIDE_GRACE);
            self.hide.arm(timer, HideReason::Grace);
        }
        commands
    }

    fn on_timer(&mut self, id: TimerId) -> Vec<HostCommand> {
        if let Some(trigger) = self.debounce.fire(id) {
            return self.start_hover_cycle(trigger);
        }
        if self.settle.fire(id).is_some() {
            return self.start_selection_cycle();
        }
        if let Some(reason) = self.hide.fire(id) {
            if matches!(reason, HideReason::Grace) && self.is_pointer_over_tooltip() {
                return Vec::new();
            }
            return self.tooltip.hide(&mut self.doc, &mut self.timers);
        }
        self.tooltip.on_timer(&mut self.doc, id).unwrap_or_default()
    }

    fn start_hover_cycle(&mut self, trigger: HoverTrigger) -> Vec<HostCommand> {
        if self.processing {
            return Vec::new();
        }

        match plan(&trigger.text, trigger.is_error, &self.config, self.doc.hostname()) {
            Some(plan) => self.start_cycle(plan, trigger.anchor),
            None => {
                tracing::debug!("Hovered text needs no translation");
                Vec::new()
            }
        }
    }

    fn start_selection_cycle(&mut self) -> Vec<HostCommand> {
        if self.processing || !self.config.enabled {
            return Vec::new();
        }

        let Some((text, anchor)) = self.doc.selection().and_then(|selection| {
            let text = selection_text(&selection.text)?;
            let rect = selection.rect;
            let anchor = Point::new(rect.left + rect.width / 2.0, rect.bottom() + SELECTION_GAP);
            Some((text.to_string(), anchor))
        }) else {
            return Vec::new();
        };

        self.debounce.cancel();
        match plan(&text, false, &self.config, self.doc.hostname()) {
            Some(plan) => self.start_cycle(plan, anchor),
            None => Vec::new(),
        }
    }

    fn start_cycle(&mut self, plan: Plan, anchor: Point) -> Vec<HostCommand> {
        let mut commands = Vec::new();

        self.hide.cancel();
        let generation = match self
            .tooltip
            .show(&mut self.doc, anchor, plan.loading_text(), &mut commands)
        {
            Ok(generation) => generation,
            Err(e) => {
                tracing::warn!("Cannot show tooltip: {e}");
                return commands;
            }
        };

        if let Some(content) = immediate_content(&plan, self.config.api.is_configured()) {
            commands.extend(self.render(content));
            return commands;
        }

        self.processing = true;
        self.cycles += 1;
        let cycle = self.cycles;
        self.active = Some(ActiveCycle {
            id: cycle,
            generation,
        });
        tracing::info!("Cycle {cycle} started");

        let settings = CycleSettings::from(&self.config);
        let bridge = self.bridge.clone();
        let inbox = self.inbox.clone();
        tokio::spawn(async move {
            let content = execute(plan, settings, &bridge).await;
            if inbox
                .send(SessionEvent::CycleFinished { cycle, content })
                .await
                .is_err()
            {
                tracing::debug!("Session gone, dropping cycle {cycle}");
            }
        });

        commands
    }

    fn on_cycle_finished(&mut self, cycle: u64, content: TooltipContent) -> Vec<HostCommand> {
        let Some(active) = self.active.take_if(|a| a.id == cycle) else {
            tracing::debug!("Ignoring result of unknown cycle {cycle}");
            return Vec::new();
        };
        self.processing = false;

        if self.tooltip.live_generation() != Some(active.generation) {
            tracing::info!("Dropping stale result of cycle {cycle}");
            return Vec::new();
        }

        tracing::info!("Cycle {cycle} finished");
        self.render(content)
    }

    fn render(&mut self, content: TooltipContent) -> Vec<HostCommand> {
        match content {
            TooltipContent::Text { content, error } => self.tooltip.update(&mut self.doc, &content, error),
            TooltipContent::Link { content, url } => {
                self.tooltip.update_with_link(&mut self.doc, &content, &url)
            }
        }
    }

    fn domain_allowed(&self) -> bool {
        is_domain_allowed(&self.config.domain_whitelist, self.doc.hostname())
    }

    fn is_pointer_over_tooltip(&self) -> bool {
        self.hovered
            .is_some_and(|h| self.tooltip.contains(&self.doc, h))
    }
}

/// Drive a session from its inbox until cancelled
pub async fn session_loop(
    mut session: Session,
    inbox: AsyncReceiver<SessionEvent>,
    commands: AsyncSender<HostCommand>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    tracing::info!("Session loop started");
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = inbox.recv() => event?,
        };

        for command in session.handle(event) {
            commands.send(command).await?;
        }
    }

    tracing::info!("Session loop stopping");
    Ok(())
}
