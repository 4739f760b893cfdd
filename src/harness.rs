use std::collections::VecDeque;
use std::fmt;

use tracing::trace;

use super::*;
use crate::adapter::{
    ControlKind, ControlState, DomAdapter, DomQuery, Transition, VisibilityAction,
};
use crate::controller::{AttachOutcome, DependentQuestions, FieldValue};
use crate::core_impl::{control_kind, is_checkbox_input, is_radio_input, parse_html};
use crate::options::Options;

const DEFAULT_TRACE_LOG_LIMIT: usize = 10_000;

/// One animated show/hide, as it would have been started in a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectRecord {
    pub node: NodeId,
    /// `tag#id`, `tag[name=..]` or `tag@index`.
    pub target: String,
    pub action: VisibilityAction,
    pub duration_ms: u64,
}

impl fmt::Display for EffectRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}ms", self.action, self.target, self.duration_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ChangeListener {
    root: NodeId,
    field: String,
}

#[derive(Debug, Default, Clone)]
struct ListenerStore {
    map: HashMap<NodeId, Vec<ChangeListener>>,
}

impl ListenerStore {
    fn add(&mut self, node_id: NodeId, listener: ChangeListener) -> bool {
        let listeners = self.map.entry(node_id).or_default();
        if listeners.contains(&listener) {
            return false;
        }
        listeners.push(listener);
        true
    }

    fn get(&self, node_id: NodeId) -> &[ChangeListener] {
        self.map.get(&node_id).map(Vec::as_slice).unwrap_or_default()
    }
}

#[derive(Debug)]
struct TraceState {
    enabled: bool,
    logs: VecDeque<String>,
    log_limit: usize,
}

impl Default for TraceState {
    fn default() -> Self {
        Self {
            enabled: false,
            logs: VecDeque::new(),
            log_limit: DEFAULT_TRACE_LOG_LIMIT,
        }
    }
}

impl TraceState {
    fn line(&mut self, line: String) {
        trace!(target: "dependent_questions::harness", "{line}");
        if self.enabled {
            if self.logs.len() >= self.log_limit {
                self.logs.pop_front();
            }
            self.logs.push_back(line);
        }
    }
}

/// The harness state a controller is allowed to touch while it runs.
struct HarnessDriver<'a> {
    dom: &'a mut Dom,
    listeners: &'a mut ListenerStore,
    effects: &'a mut Vec<EffectRecord>,
    trace_state: &'a mut TraceState,
}

impl DomQuery for Dom {
    type Node = NodeId;

    fn select_within(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        self.query_selector_all_from(root, selector)
    }

    fn ancestors_matching(&self, node: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        Dom::ancestors_matching(self, node, selector)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.attr(node, name)
    }

    fn controls_named(&self, name: &str) -> Vec<NodeId> {
        Dom::controls_named(self, name)
    }

    fn control_state(&self, node: NodeId) -> Option<ControlState> {
        let element = self.element(node)?;
        let kind = control_kind(self, node);
        let selected = match kind {
            ControlKind::SelectMultiple => self.selected_option_values(node).ok()?,
            _ => Vec::new(),
        };
        Some(ControlState {
            kind,
            value: element.value.clone(),
            checked: element.checked,
            selected,
        })
    }
}

impl DomQuery for HarnessDriver<'_> {
    type Node = NodeId;

    fn select_within(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        self.dom.select_within(root, selector)
    }

    fn ancestors_matching(&self, node: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        DomQuery::ancestors_matching(&*self.dom, node, selector)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.dom.attribute(node, name)
    }

    fn controls_named(&self, name: &str) -> Vec<NodeId> {
        DomQuery::controls_named(&*self.dom, name)
    }

    fn control_state(&self, node: NodeId) -> Option<ControlState> {
        self.dom.control_state(node)
    }
}

impl DomAdapter for HarnessDriver<'_> {
    fn set_visible(
        &mut self,
        nodes: &[NodeId],
        visible: bool,
        transition: Transition,
    ) -> Result<()> {
        for node in nodes {
            let action = transition.action(visible);
            let target = self.dom.node_label(*node);
            match transition {
                Transition::Instant => {
                    self.trace_state
                        .line(format!("[effect] {action} {target} instant"));
                }
                Transition::Animated { .. } => {
                    let record = EffectRecord {
                        node: *node,
                        target,
                        action,
                        duration_ms: transition.duration_ms(),
                    };
                    self.trace_state.line(format!("[effect] {record}"));
                    self.effects.push(record);
                }
            }
            self.dom.set_displayed(*node, visible)?;
        }
        Ok(())
    }

    fn listen_change(&mut self, root: NodeId, field: &str) -> bool {
        let controls = self.dom.controls_named(field);
        if controls.is_empty() {
            return false;
        }
        for control in controls {
            let listener = ChangeListener {
                root,
                field: field.to_string(),
            };
            if self.listeners.add(control, listener) {
                let label = self.dom.node_label(control);
                self.trace_state
                    .line(format!("[listen] change target={label} field={field}"));
            }
        }
        true
    }
}

/// In-memory document with the dependent-questions controller wired to its
/// form controls.
#[derive(Debug)]
pub struct Harness {
    dom: Dom,
    listeners: ListenerStore,
    registry: DependentQuestions<NodeId>,
    effects: Vec<EffectRecord>,
    trace_state: TraceState,
}

impl Harness {
    pub fn from_html(html: &str) -> Result<Self> {
        let dom = parse_html(html)?;
        Ok(Self {
            dom,
            listeners: ListenerStore::default(),
            registry: DependentQuestions::new(),
            effects: Vec::new(),
            trace_state: TraceState::default(),
        })
    }

    /// Attaches the controller to every element matching `selector`. An empty
    /// match is not an error.
    pub fn attach(
        &mut self,
        selector: &str,
        options: Options,
    ) -> Result<Vec<AttachOutcome<NodeId>>> {
        options.validate()?;
        let roots = self.dom.query_selector_all(selector)?;
        let mut outcomes = Vec::with_capacity(roots.len());

        for root in roots {
            let mut driver = HarnessDriver {
                dom: &mut self.dom,
                listeners: &mut self.listeners,
                effects: &mut self.effects,
                trace_state: &mut self.trace_state,
            };
            let outcome = self.registry.attach(&mut driver, root, options.clone())?;

            let label = self.dom.node_label(root);
            let line = match &outcome {
                AttachOutcome::Attached(summary) => format!(
                    "[attach] root={label} questions={} keys={} fields={} skipped={} unbound={}",
                    summary.questions,
                    summary.keys,
                    summary.fields.join(","),
                    summary.skipped.len(),
                    summary.unbound_fields.join(","),
                ),
                AttachOutcome::AlreadyAttached { .. } => {
                    format!("[attach] root={label} already attached")
                }
            };
            self.trace_state.line(line);
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    pub fn attach_with_json(
        &mut self,
        selector: &str,
        options: &str,
    ) -> Result<Vec<AttachOutcome<NodeId>>> {
        let options = Options::from_json(options)?;
        self.attach(selector, options)
    }

    pub fn is_attached(&self, selector: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        Ok(self.registry.is_attached(target))
    }

    pub fn set_checked(&mut self, selector: &str, checked: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        if !is_checkbox_input(&self.dom, target) && !is_radio_input(&self.dom, target) {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input[type=checkbox|radio]".into(),
                actual: self.describe_node(target),
            });
        }
        if self.dom.disabled(target) {
            return Ok(());
        }

        if self.dom.checked(target)? != checked {
            self.dom.set_checked(target, checked)?;
            if checked && is_radio_input(&self.dom, target) {
                self.dom.uncheck_other_radios_in_group(target)?;
            }
            self.dispatch_change(target)?;
        }
        Ok(())
    }

    /// Checkboxes toggle and radios select; other elements only get a trace
    /// line.
    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }

        if is_checkbox_input(&self.dom, target) {
            let checked = self.dom.checked(target)?;
            self.dom.set_checked(target, !checked)?;
            return self.dispatch_change(target);
        }
        if is_radio_input(&self.dom, target) {
            if self.dom.checked(target)? {
                return Ok(());
            }
            self.dom.set_checked(target, true)?;
            self.dom.uncheck_other_radios_in_group(target)?;
            return self.dispatch_change(target);
        }

        let label = self.dom.node_label(target);
        self.trace_state.line(format!("[event] click target={label}"));
        Ok(())
    }

    /// Replaces the value and commits it, so `change` fires once.
    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let tag = self
            .dom
            .tag_name(target)
            .unwrap_or_default()
            .to_ascii_lowercase();
        if tag != "input" && tag != "textarea" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: tag,
            });
        }
        if is_checkbox_input(&self.dom, target) || is_radio_input(&self.dom, target) {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "text input or textarea".into(),
                actual: self.describe_node(target),
            });
        }
        if self.dom.disabled(target) {
            return Ok(());
        }

        if self.dom.value(target)? != text {
            self.dom.set_value(target, text)?;
            self.dispatch_change(target)?;
        }
        Ok(())
    }

    pub fn select_option(&mut self, selector: &str, value: &str) -> Result<()> {
        self.select_options(selector, &[value])
    }

    /// Selects exactly `values`. More than one value requires a
    /// `select[multiple]`.
    pub fn select_options(&mut self, selector: &str, values: &[&str]) -> Result<()> {
        let target = self.select_one(selector)?;
        let kind = control_kind(&self.dom, target);
        let is_select = self
            .dom
            .tag_name(target)
            .is_some_and(|tag| tag.eq_ignore_ascii_case("select"));
        if !is_select {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "select".into(),
                actual: self.describe_node(target),
            });
        }
        if values.len() > 1 && kind != ControlKind::SelectMultiple {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "select[multiple]".into(),
                actual: "select".into(),
            });
        }
        if self.dom.disabled(target) {
            return Ok(());
        }

        let available = self.option_values(target)?;
        let missing = values
            .iter()
            .find(|value| !available.iter().any(|v| v == *value));
        if let Some(missing) = missing {
            return Err(Error::Dom(format!(
                "{} has no option with value {missing:?}",
                self.dom.node_label(target)
            )));
        }

        // A single select with no `selected` option still reports its first one.
        let changed = if kind == ControlKind::SelectMultiple {
            let before = self.dom.selected_option_values(target)?;
            self.dom.set_select_values(target, values)?;
            self.dom.selected_option_values(target)? != before
        } else {
            let before = self.dom.value(target)?;
            self.dom.set_select_values(target, values)?;
            self.dom.value(target)? != before
        };
        if changed {
            self.dispatch_change(target)?;
        }
        Ok(())
    }

    /// Fires `event` on the first match without touching form state.
    pub fn dispatch(&mut self, selector: &str, event: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if event == "change" {
            return self.dispatch_change(target);
        }
        let label = self.dom.node_label(target);
        self.trace_state
            .line(format!("[event] {event} target={label} listeners=0"));
        Ok(())
    }

    fn dispatch_change(&mut self, target: NodeId) -> Result<()> {
        let listeners = self.listeners.get(target).to_vec();
        let label = self.dom.node_label(target);
        self.trace_state.line(format!(
            "[event] change target={label} listeners={}",
            listeners.len()
        ));

        for listener in listeners {
            let mut driver = HarnessDriver {
                dom: &mut self.dom,
                listeners: &mut self.listeners,
                effects: &mut self.effects,
                trace_state: &mut self.trace_state,
            };
            self.registry
                .handle_change(&mut driver, listener.root, &listener.field)?;
        }
        Ok(())
    }

    /// Whether the first match and all of its ancestors are displayed.
    pub fn is_visible(&self, selector: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        self.dom.is_rendered(target)
    }

    pub fn assert_visible(&self, selector: &str) -> Result<()> {
        self.assert_visibility(selector, true)
    }

    pub fn assert_hidden(&self, selector: &str) -> Result<()> {
        self.assert_visibility(selector, false)
    }

    fn assert_visibility(&self, selector: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.is_rendered(target)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: visibility_name(expected).to_string(),
                actual: visibility_name(actual).to_string(),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.value(target)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_checked(&self, selector: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.checked(target)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    /// The value the controller would read for `field`.
    pub fn current_value(&self, field: &str) -> Option<FieldValue> {
        crate::controller::current_value(&self.dom, field)
    }

    /// Number of change listeners bound to the first match.
    pub fn change_listener_count(&self, selector: &str) -> Result<usize> {
        let target = self.select_one(selector)?;
        Ok(self.listeners.get(target).len())
    }

    pub fn effect_log(&self) -> &[EffectRecord] {
        &self.effects
    }

    pub fn take_effect_log(&mut self) -> Vec<EffectRecord> {
        std::mem::take(&mut self.effects)
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace_state.enabled = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::InvalidOptions(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace_state.log_limit = max_entries;
        while self.trace_state.logs.len() > self.trace_state.log_limit {
            self.trace_state.logs.pop_front();
        }
        Ok(())
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        self.trace_state.logs.drain(..).collect()
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), 200)
    }

    fn describe_node(&self, node_id: NodeId) -> String {
        let tag = self.dom.tag_name(node_id).unwrap_or("#text").to_ascii_lowercase();
        match self.dom.attr(node_id, "type") {
            Some(kind) if tag == "input" => format!("input[type={}]", kind.to_ascii_lowercase()),
            _ => tag,
        }
    }

    fn option_values(&self, select_node: NodeId) -> Result<Vec<String>> {
        let options = self.dom.query_selector_all_from(select_node, "option")?;
        Ok(options
            .into_iter()
            .map(|option| {
                self.dom
                    .attr(option, "value")
                    .unwrap_or_else(|| self.dom.text_content(option).trim().to_string())
            })
            .collect())
    }
}

fn visibility_name(visible: bool) -> &'static str {
    if visible { "visible" } else { "hidden" }
}
