//! In-memory simulated driver.
//!
//! Models the dynamics that make the real interface hard to drive: elements
//! render after a delay, choice controls are repopulated (and invalidated)
//! after an earlier selection, clicked selections commit asynchronously, and
//! the confirmation modal closes on its own schedule. Mutations are scheduled
//! against the tokio clock and applied lazily on the next driver call, so
//! paused-time tests stay deterministic.
//!
//! Used by the end-to-end tests and the CLI's simulate mode. Not a browser.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use formpilot_core_types::FlowError;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::{Driver, Handle, Selector};

/// One observed interface interaction, for test assertions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimEvent {
    Navigated(String),
    Clicked(String),
    Typed { target: String, text: String },
    Cleared(String),
    OptionPicked { control: String, value: String },
    SessionClosed,
}

/// Delays (in milliseconds) for the scripted page dynamics.
#[derive(Clone, Copy, Debug)]
pub struct SimLatency {
    /// Click on the entry affordance until the form's fields render.
    pub render_ms: u64,
    /// Form selection until the unit option sets are repopulated.
    pub options_ms: u64,
    /// Option click until the control's value reflects the selection.
    pub commit_ms: u64,
    /// Submit click until the modal overlay closes.
    pub modal_close_ms: u64,
}

impl Default for SimLatency {
    fn default() -> Self {
        Self {
            render_ms: 30,
            options_ms: 40,
            commit_ms: 20,
            modal_close_ms: 60,
        }
    }
}

/// Selector map and option sets of the scripted entry site.
#[derive(Clone, Debug)]
pub struct EntrySiteSpec {
    pub create_button: String,
    pub name_input: String,
    pub description_input: Option<String>,
    pub form_select: String,
    pub order_unit_select: String,
    pub cost_unit_select: String,
    pub switches: Vec<String>,
    pub submit_button: String,
    pub modal_overlay: String,
    /// Option codes of the form selector (the two recognized form values).
    pub form_options: Vec<String>,
    /// Unit option codes rendered after a solid / liquid form selection.
    pub mass_codes: Vec<String>,
    pub volume_codes: Vec<String>,
}

#[derive(Clone, Debug)]
enum NodeKind {
    Input,
    Choice,
    OptionItem { control: u64, value: String },
    Button,
    Toggle,
    Overlay,
}

#[derive(Clone, Debug)]
struct Node {
    id: u64,
    epoch: u64,
    css: Option<String>,
    label: Option<String>,
    kind: NodeKind,
    visible: bool,
    hidden_until: Option<Instant>,
    attrs: HashMap<String, String>,
    in_form: bool,
}

impl Node {
    fn display(&self) -> String {
        match (&self.css, &self.label) {
            (Some(css), _) => css.clone(),
            (None, Some(label)) => format!("label[{label}]"),
            (None, None) => format!("node#{}", self.id),
        }
    }

    fn currently_visible(&self, now: Instant) -> bool {
        if !self.visible {
            return false;
        }
        match self.hidden_until {
            Some(until) => now >= until,
            None => true,
        }
    }
}

#[derive(Debug)]
enum Mutation {
    RenderEntryForm,
    PopulateOptions { control_css: String, codes: Vec<String> },
    CommitSelection { control: u64, value: String },
    CloseModal,
    Remove { css: String },
}

#[derive(Debug)]
struct Job {
    due: Instant,
    mutation: Mutation,
}

#[derive(Default)]
struct PageState {
    nodes: Vec<Node>,
    next_id: u64,
    epoch: u64,
    jobs: Vec<Job>,
    events: Vec<SimEvent>,
    url: String,
    closed: bool,
}

/// The simulated interface session.
pub struct SimDriver {
    state: Mutex<PageState>,
    site: Option<EntrySiteSpec>,
    latency: SimLatency,
}

impl SimDriver {
    /// An empty page with no scripted behavior; build it up with the
    /// `add_*` methods. Component tests use this.
    pub fn blank() -> Self {
        Self {
            state: Mutex::new(PageState::default()),
            site: None,
            latency: SimLatency::default(),
        }
    }

    /// A page scripted as the record entry site: the create affordance is
    /// present, and clicks drive the render / repopulate / commit / close
    /// dynamics described by `latency`.
    pub fn entry_site(spec: EntrySiteSpec, latency: SimLatency) -> Self {
        let driver = Self {
            state: Mutex::new(PageState::default()),
            site: Some(spec.clone()),
            latency,
        };
        driver.add_button(&spec.create_button);
        driver
    }

    // -- page building -----------------------------------------------------

    pub fn add_input(&self, css: &str) {
        self.insert(Some(css), None, NodeKind::Input, false);
    }

    pub fn add_button(&self, css: &str) {
        self.insert(Some(css), None, NodeKind::Button, false);
    }

    pub fn add_toggle(&self, label: &str) {
        self.insert(None, Some(label), NodeKind::Toggle, false);
    }

    pub fn add_choice(&self, css: &str) {
        self.insert(Some(css), None, NodeKind::Choice, false);
    }

    pub fn add_overlay(&self, css: &str) {
        self.insert(Some(css), None, NodeKind::Overlay, false);
    }

    /// Add one rendered option under an existing choice control.
    pub fn add_option(&self, control_css: &str, code: &str) {
        let mut state = self.state.lock();
        let control = state
            .nodes
            .iter()
            .find(|n| n.css.as_deref() == Some(control_css))
            .map(|n| n.id);
        if let Some(control) = control {
            let node = Self::build_node(
                &mut state,
                None,
                None,
                NodeKind::OptionItem {
                    control,
                    value: code.to_string(),
                },
                false,
            );
            state.nodes.push(node);
        }
    }

    /// Hide every match of `css` until `duration` from now has elapsed.
    pub fn conceal(&self, css: &str, duration: Duration) {
        let until = Instant::now() + duration;
        let mut state = self.state.lock();
        for node in state
            .nodes
            .iter_mut()
            .filter(|n| n.css.as_deref() == Some(css))
        {
            node.hidden_until = Some(until);
        }
    }

    pub fn set_visible(&self, css: &str, visible: bool) {
        let mut state = self.state.lock();
        for node in state
            .nodes
            .iter_mut()
            .filter(|n| n.css.as_deref() == Some(css))
        {
            node.visible = visible;
        }
    }

    /// Remove every match of `css` from the page after `delay`.
    pub fn remove_after(&self, css: &str, delay: Duration) {
        let mut state = self.state.lock();
        let due = Instant::now() + delay;
        state.jobs.push(Job {
            due,
            mutation: Mutation::Remove {
                css: css.to_string(),
            },
        });
    }

    /// Invalidate all current handles to matches of `css`, simulating a
    /// framework re-render of that region.
    pub fn rerender(&self, css: &str) {
        let mut state = self.state.lock();
        state.epoch += 1;
        let epoch = state.epoch;
        for node in state
            .nodes
            .iter_mut()
            .filter(|n| n.css.as_deref() == Some(css))
        {
            node.epoch = epoch;
        }
    }

    // -- observation -------------------------------------------------------

    pub fn events(&self) -> Vec<SimEvent> {
        self.state.lock().events.clone()
    }

    /// Number of clicks observed on the element displayed as `target`.
    pub fn clicks_on(&self, target: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, SimEvent::Clicked(t) if t == target))
            .count()
    }

    pub fn typed_into(&self, css: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SimEvent::Typed { target, text } if target == css => Some(text),
                _ => None,
            })
            .collect()
    }

    /// The committed value attribute of the first match of `css`, applying
    /// any due mutations first.
    pub fn committed_value(&self, css: &str) -> Option<String> {
        let mut state = self.state.lock();
        self.apply_due(&mut state);
        state
            .nodes
            .iter()
            .find(|n| n.css.as_deref() == Some(css))
            .and_then(|n| n.attrs.get("value").cloned())
    }

    // -- internals ---------------------------------------------------------

    fn insert(&self, css: Option<&str>, label: Option<&str>, kind: NodeKind, in_form: bool) {
        let mut state = self.state.lock();
        let node = Self::build_node(&mut state, css, label, kind, in_form);
        state.nodes.push(node);
    }

    fn build_node(
        state: &mut PageState,
        css: Option<&str>,
        label: Option<&str>,
        kind: NodeKind,
        in_form: bool,
    ) -> Node {
        state.next_id += 1;
        let mut attrs = HashMap::new();
        match kind {
            NodeKind::Input | NodeKind::Choice => {
                attrs.insert("value".to_string(), String::new());
            }
            NodeKind::Toggle => {
                attrs.insert("state".to_string(), "off".to_string());
            }
            _ => {}
        }
        Node {
            id: state.next_id,
            epoch: state.epoch,
            css: css.map(str::to_string),
            label: label.map(str::to_string),
            kind,
            visible: true,
            hidden_until: None,
            attrs,
            in_form,
        }
    }

    fn apply_due(&self, state: &mut PageState) {
        let now = Instant::now();
        // drain in insertion order so same-instant jobs stay deterministic
        let mut remaining = Vec::new();
        for job in state.jobs.drain(..).collect::<Vec<_>>() {
            if job.due <= now {
                self.apply(state, job.mutation);
            } else {
                remaining.push(job);
            }
        }
        state.jobs = remaining;
    }

    fn apply(&self, state: &mut PageState, mutation: Mutation) {
        match mutation {
            Mutation::RenderEntryForm => self.render_entry_form(state),
            Mutation::PopulateOptions { control_css, codes } => {
                self.populate_options(state, &control_css, &codes)
            }
            Mutation::CommitSelection { control, value } => {
                if let Some(node) = state.nodes.iter_mut().find(|n| n.id == control) {
                    node.attrs.insert("value".to_string(), value);
                }
            }
            Mutation::CloseModal => {
                state.epoch += 1;
                state.nodes.retain(|n| !n.in_form);
                debug!("sim: modal closed, entry form torn down");
            }
            Mutation::Remove { css } => {
                state.epoch += 1;
                state.nodes.retain(|n| n.css.as_deref() != Some(css.as_str()));
            }
        }
    }

    fn render_entry_form(&self, state: &mut PageState) {
        let Some(site) = &self.site else { return };
        state.epoch += 1;
        state.nodes.retain(|n| !n.in_form);

        let mut new_nodes = Vec::new();
        let mut push = |state: &mut PageState, css: Option<&str>, label: Option<&str>, kind| {
            let node = Self::build_node(state, css, label, kind, true);
            let id = node.id;
            new_nodes.push(node);
            id
        };

        push(state, Some(&site.modal_overlay), None, NodeKind::Overlay);
        push(state, Some(&site.name_input), None, NodeKind::Input);
        if let Some(description) = &site.description_input {
            push(state, Some(description), None, NodeKind::Input);
        }
        let form_id = push(state, Some(&site.form_select), None, NodeKind::Choice);
        for code in &site.form_options {
            push(
                state,
                None,
                None,
                NodeKind::OptionItem {
                    control: form_id,
                    value: code.clone(),
                },
            );
        }
        push(state, Some(&site.order_unit_select), None, NodeKind::Choice);
        push(state, Some(&site.cost_unit_select), None, NodeKind::Choice);
        for label in &site.switches {
            push(state, None, Some(label), NodeKind::Toggle);
        }
        push(state, Some(&site.submit_button), None, NodeKind::Button);

        state.nodes.extend(new_nodes);
        debug!("sim: entry form rendered");
    }

    fn populate_options(&self, state: &mut PageState, control_css: &str, codes: &[String]) {
        state.epoch += 1;
        let epoch = state.epoch;
        let Some(control_id) = state
            .nodes
            .iter()
            .find(|n| n.css.as_deref() == Some(control_css))
            .map(|n| n.id)
        else {
            return;
        };
        // the control itself re-renders: old handles to it go stale
        let mut in_form = false;
        for node in state.nodes.iter_mut().filter(|n| n.id == control_id) {
            node.epoch = epoch;
            node.attrs.insert("value".to_string(), String::new());
            in_form = node.in_form;
        }
        state.nodes.retain(
            |n| !matches!(&n.kind, NodeKind::OptionItem { control, .. } if *control == control_id),
        );
        for code in codes {
            let mut node = Self::build_node(
                state,
                None,
                None,
                NodeKind::OptionItem {
                    control: control_id,
                    value: code.clone(),
                },
                in_form,
            );
            node.epoch = epoch;
            state.nodes.push(node);
        }
        debug!(control = control_css, count = codes.len(), "sim: options repopulated");
    }

    fn on_click(&self, state: &mut PageState, id: u64) {
        let (kind, css) = match state.nodes.iter().find(|n| n.id == id) {
            Some(node) => (node.kind.clone(), node.css.clone()),
            None => return,
        };
        let now = Instant::now();
        match kind {
            NodeKind::Button => {
                let Some(site) = &self.site else { return };
                if css.as_deref() == Some(site.create_button.as_str()) {
                    state.jobs.push(Job {
                        due: now + Duration::from_millis(self.latency.render_ms),
                        mutation: Mutation::RenderEntryForm,
                    });
                } else if css.as_deref() == Some(site.submit_button.as_str()) {
                    state.jobs.push(Job {
                        due: now + Duration::from_millis(self.latency.modal_close_ms),
                        mutation: Mutation::CloseModal,
                    });
                }
            }
            NodeKind::Toggle => {
                if let Some(node) = state.nodes.iter_mut().find(|n| n.id == id) {
                    let flipped = match node.attrs.get("state").map(String::as_str) {
                        Some("on") => "off",
                        _ => "on",
                    };
                    node.attrs.insert("state".to_string(), flipped.to_string());
                }
            }
            NodeKind::OptionItem { control, value } => {
                let control_css = state
                    .nodes
                    .iter()
                    .find(|n| n.id == control)
                    .and_then(|n| n.css.clone())
                    .unwrap_or_default();
                state.events.push(SimEvent::OptionPicked {
                    control: control_css.clone(),
                    value: value.clone(),
                });
                state.jobs.push(Job {
                    due: now + Duration::from_millis(self.latency.commit_ms),
                    mutation: Mutation::CommitSelection {
                        control,
                        value: value.clone(),
                    },
                });
                if let Some(site) = &self.site {
                    if control_css == site.form_select {
                        let codes = if value == "solid" {
                            site.mass_codes.clone()
                        } else if value == "liquid" {
                            site.volume_codes.clone()
                        } else {
                            Vec::new()
                        };
                        for unit_css in [&site.order_unit_select, &site.cost_unit_select] {
                            state.jobs.push(Job {
                                due: now + Duration::from_millis(self.latency.options_ms),
                                mutation: Mutation::PopulateOptions {
                                    control_css: unit_css.clone(),
                                    codes: codes.clone(),
                                },
                            });
                        }
                    }
                }
            }
            NodeKind::Input | NodeKind::Choice | NodeKind::Overlay => {}
        }
    }

    fn guard_open(state: &PageState) -> Result<(), FlowError> {
        if state.closed {
            Err(FlowError::DriverIo("session closed".into()))
        } else {
            Ok(())
        }
    }

    fn node_index(state: &PageState, handle: &Handle) -> Result<usize, FlowError> {
        match state.nodes.iter().position(|n| n.id == handle.node) {
            None => Err(FlowError::NotFound(format!("{handle} is gone"))),
            Some(index) => {
                if state.nodes[index].epoch != handle.epoch {
                    Err(FlowError::StaleHandle(format!(
                        "{handle} superseded by epoch {}",
                        state.nodes[index].epoch
                    )))
                } else {
                    Ok(index)
                }
            }
        }
    }

    fn matches(state: &PageState, selector: &Selector) -> Vec<u64> {
        match selector {
            Selector::Css(css) => state
                .nodes
                .iter()
                .filter(|n| n.css.as_deref() == Some(css.as_str()))
                .map(|n| n.id)
                .collect(),
            Selector::LabelText(text) => state
                .nodes
                .iter()
                .filter(|n| n.label.as_deref() == Some(text.as_str()))
                .map(|n| n.id)
                .collect(),
            Selector::Option { control, value } => {
                let Some(control_id) = Self::matches(state, control).into_iter().next() else {
                    return Vec::new();
                };
                state
                    .nodes
                    .iter()
                    .filter(|n| {
                        matches!(&n.kind, NodeKind::OptionItem { control, value: v }
                            if *control == control_id && v == value)
                    })
                    .map(|n| n.id)
                    .collect()
            }
        }
    }
}

#[async_trait]
impl Driver for SimDriver {
    async fn navigate(&self, url: &str) -> Result<(), FlowError> {
        let mut state = self.state.lock();
        Self::guard_open(&state)?;
        state.url = url.to_string();
        state.events.push(SimEvent::Navigated(url.to_string()));
        Ok(())
    }

    async fn current_url(&self) -> Result<String, FlowError> {
        let state = self.state.lock();
        Self::guard_open(&state)?;
        Ok(state.url.clone())
    }

    async fn locate_all(&self, selector: &Selector) -> Result<Vec<Handle>, FlowError> {
        let mut state = self.state.lock();
        Self::guard_open(&state)?;
        self.apply_due(&mut state);
        let ids = Self::matches(&state, selector);
        Ok(ids
            .into_iter()
            .filter_map(|id| {
                state.nodes.iter().find(|n| n.id == id).map(|n| Handle {
                    node: n.id,
                    epoch: n.epoch,
                })
            })
            .collect())
    }

    async fn is_visible(&self, handle: &Handle) -> Result<bool, FlowError> {
        let mut state = self.state.lock();
        Self::guard_open(&state)?;
        self.apply_due(&mut state);
        let index = Self::node_index(&state, handle)?;
        Ok(state.nodes[index].currently_visible(Instant::now()))
    }

    async fn click(&self, handle: &Handle) -> Result<(), FlowError> {
        let mut state = self.state.lock();
        Self::guard_open(&state)?;
        self.apply_due(&mut state);
        let index = Self::node_index(&state, handle)?;
        if !state.nodes[index].currently_visible(Instant::now()) {
            return Err(FlowError::DriverIo(format!(
                "{} is not interactable",
                state.nodes[index].display()
            )));
        }
        let display = state.nodes[index].display();
        let id = state.nodes[index].id;
        state.events.push(SimEvent::Clicked(display));
        self.on_click(&mut state, id);
        Ok(())
    }

    async fn type_text(&self, handle: &Handle, text: &str) -> Result<(), FlowError> {
        let mut state = self.state.lock();
        Self::guard_open(&state)?;
        self.apply_due(&mut state);
        let index = Self::node_index(&state, handle)?;
        if !matches!(state.nodes[index].kind, NodeKind::Input) {
            return Err(FlowError::DriverIo(format!(
                "{} does not accept text",
                state.nodes[index].display()
            )));
        }
        let display = state.nodes[index].display();
        state.nodes[index]
            .attrs
            .insert("value".to_string(), text.to_string());
        state.events.push(SimEvent::Typed {
            target: display,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn clear(&self, handle: &Handle) -> Result<(), FlowError> {
        let mut state = self.state.lock();
        Self::guard_open(&state)?;
        self.apply_due(&mut state);
        let index = Self::node_index(&state, handle)?;
        let display = state.nodes[index].display();
        state.nodes[index]
            .attrs
            .insert("value".to_string(), String::new());
        state.events.push(SimEvent::Cleared(display));
        Ok(())
    }

    async fn read_attribute(
        &self,
        handle: &Handle,
        name: &str,
    ) -> Result<Option<String>, FlowError> {
        let mut state = self.state.lock();
        Self::guard_open(&state)?;
        self.apply_due(&mut state);
        let index = Self::node_index(&state, handle)?;
        Ok(state.nodes[index].attrs.get(name).cloned())
    }

    async fn close(&self) -> Result<(), FlowError> {
        let mut state = self.state.lock();
        if !state.closed {
            state.closed = true;
            state.events.push(SimEvent::SessionClosed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn rerender_invalidates_old_handles() {
        let sim = SimDriver::blank();
        sim.add_input("#name");
        let handle = sim.locate_all(&Selector::css("#name")).await.unwrap()[0];
        sim.rerender("#name");
        let err = sim.type_text(&handle, "x").await.unwrap_err();
        assert!(matches!(err, FlowError::StaleHandle(_)));
        // a fresh lookup works again
        let fresh = sim.locate_all(&Selector::css("#name")).await.unwrap()[0];
        sim.type_text(&fresh, "x").await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn concealed_nodes_report_invisible_until_deadline() {
        let sim = SimDriver::blank();
        sim.add_button("#create");
        sim.conceal("#create", Duration::from_millis(200));
        let handle = sim.locate_all(&Selector::css("#create")).await.unwrap()[0];
        assert!(!sim.is_visible(&handle).await.unwrap());
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(sim.is_visible(&handle).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn option_clicks_commit_after_latency() {
        let sim = SimDriver::blank();
        sim.add_choice("#unit");
        sim.add_option("#unit", "5");
        let control = Selector::css("#unit");
        let option = Selector::option_of(&control, "5");
        let handle = sim.locate_all(&option).await.unwrap()[0];
        sim.click(&handle).await.unwrap();
        // commit is scheduled, not synchronous
        assert_eq!(sim.committed_value("#unit"), Some(String::new()));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sim.committed_value("#unit"), Some("5".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn closed_session_rejects_operations() {
        let sim = SimDriver::blank();
        sim.add_input("#name");
        sim.close().await.unwrap();
        let err = sim.locate_all(&Selector::css("#name")).await.unwrap_err();
        assert!(matches!(err, FlowError::DriverIo(_)));
        // close is idempotent
        sim.close().await.unwrap();
    }
}
