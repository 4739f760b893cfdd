//! Conditional visibility controller.
//!
//! Attaching scans a subtree for `data-depends-on` / `data-depends-off`
//! markers, groups the enclosing question regions by controller key, binds a
//! single change listener per controller field and applies the initial
//! visibility without animation.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::Result;
use crate::adapter::{ControlKind, DomAdapter, DomQuery, Transition};
use crate::declaration::{DependMode, DependencyDeclaration, DependencyKey, SkipReason};
use crate::options::Options;

const DEPENDENCY_MARKERS: &str = "[data-depends-on], [data-depends-off]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Scalar(String),
    /// Checked checkboxes or selected options of a multiple select.
    Multiple(Vec<String>),
}

/// Reads the value of the controls named `field`. The first control's kind
/// decides how the group is read; `None` means there is no control at all, or
/// a radio group with nothing checked.
pub fn current_value<A>(adapter: &A, field: &str) -> Option<FieldValue>
where
    A: DomQuery + ?Sized,
{
    let controls = adapter.controls_named(field);
    let first = adapter.control_state(*controls.first()?)?;

    match first.kind {
        ControlKind::Single => Some(FieldValue::Scalar(first.value)),
        ControlKind::Radio => controls
            .iter()
            .filter_map(|node| adapter.control_state(*node))
            .find(|state| state.checked)
            .map(|state| FieldValue::Scalar(state.value)),
        ControlKind::Checkbox => Some(FieldValue::Multiple(
            controls
                .iter()
                .filter_map(|node| adapter.control_state(*node))
                .filter(|state| state.checked)
                .map(|state| state.value)
                .collect(),
        )),
        ControlKind::SelectMultiple => Some(FieldValue::Multiple(first.selected)),
    }
}

pub fn value_matches(value: Option<&FieldValue>, expected: &str) -> bool {
    match value {
        Some(FieldValue::Scalar(value)) => value == expected,
        Some(FieldValue::Multiple(values)) => values.iter().any(|value| value == expected),
        None => false,
    }
}

/// Regions toggled by one controller key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependents<N> {
    pub on: Vec<N>,
    pub off: Vec<N>,
}

impl<N> Default for Dependents<N> {
    fn default() -> Self {
        Self {
            on: Vec::new(),
            off: Vec::new(),
        }
    }
}

impl<N: PartialEq> Dependents<N> {
    fn insert(&mut self, mode: DependMode, region: N) {
        let set = match mode {
            DependMode::On => &mut self.on,
            DependMode::Off => &mut self.off,
        };
        if !set.contains(&region) {
            set.push(region);
        }
    }
}

/// Controller key to dependents, kept in first-seen order.
#[derive(Debug, Clone)]
pub struct DependencyMap<N> {
    entries: Vec<(DependencyKey, Dependents<N>)>,
    index: HashMap<DependencyKey, usize>,
}

impl<N> Default for DependencyMap<N> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<N: PartialEq> DependencyMap<N> {
    pub fn insert(&mut self, declaration: DependencyDeclaration, region: N) {
        let DependencyDeclaration { key, mode } = declaration;
        let slot = match self.index.get(&key) {
            Some(slot) => *slot,
            None => {
                let slot = self.entries.len();
                self.index.insert(key.clone(), slot);
                self.entries.push((key, Dependents::default()));
                slot
            }
        };
        self.entries[slot].1.insert(mode, region);
    }

    pub fn get(&self, key: &DependencyKey) -> Option<&Dependents<N>> {
        self.index.get(key).map(|slot| &self.entries[*slot].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DependencyKey, &Dependents<N>)> {
        self.entries.iter().map(|(key, dependents)| (key, dependents))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One entry of a field's toggle spec: the dependency-map slot it refers to
/// and the value that counts as a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleBinding {
    pub slot: usize,
    pub expected: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDeclaration<N> {
    pub region: N,
    pub mode: DependMode,
    pub raw: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachSummary<N> {
    pub root: N,
    pub questions: usize,
    pub keys: usize,
    /// Controller fields in the order their first key was recorded.
    pub fields: Vec<String>,
    /// Fields with no matching control in the document.
    pub unbound_fields: Vec<String>,
    pub skipped: Vec<SkippedDeclaration<N>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachOutcome<N> {
    Attached(AttachSummary<N>),
    AlreadyAttached { root: N },
}

#[derive(Debug, Clone)]
pub struct Controller<N> {
    root: N,
    options: Options,
    map: DependencyMap<N>,
    field_order: Vec<String>,
    toggle_specs: HashMap<String, Vec<ToggleBinding>>,
}

impl<N> Controller<N>
where
    N: Copy + Eq + std::hash::Hash + std::fmt::Debug,
{
    fn build<A>(adapter: &mut A, root: N, options: Options) -> Result<(Self, AttachSummary<N>)>
    where
        A: DomAdapter<Node = N> + ?Sized,
    {
        options.validate()?;

        let mut questions = Vec::new();
        let mut seen = HashSet::new();
        for marker in adapter.select_within(root, DEPENDENCY_MARKERS)? {
            for question in adapter.ancestors_matching(marker, &options.question_selector)? {
                if seen.insert(question) {
                    questions.push(question);
                }
            }
        }

        let mut map = DependencyMap::default();
        let mut skipped = Vec::new();
        for question in &questions {
            let Some((mode, raw)) = declaration_of(&*adapter, *question)? else {
                continue;
            };
            match DependencyDeclaration::parse(&raw, mode) {
                Ok(declaration) => map.insert(declaration, *question),
                Err(reason) => {
                    debug!(
                        region = ?question,
                        raw = %raw,
                        %reason,
                        "skipping dependency declaration"
                    );
                    skipped.push(SkippedDeclaration {
                        region: *question,
                        mode,
                        raw,
                        reason,
                    });
                }
            }
        }

        let mut field_order: Vec<String> = Vec::new();
        let mut toggle_specs: HashMap<String, Vec<ToggleBinding>> = HashMap::new();
        for (slot, (key, _)) in map.iter().enumerate() {
            if !toggle_specs.contains_key(&key.field) {
                field_order.push(key.field.clone());
            }
            toggle_specs
                .entry(key.field.clone())
                .or_default()
                .push(ToggleBinding {
                    slot,
                    expected: key.expected.clone(),
                });
        }

        let mut unbound_fields = Vec::new();
        for field in &field_order {
            if !adapter.listen_change(root, field) {
                debug!(field = %field, "no control for dependency field");
                unbound_fields.push(field.clone());
            }
        }

        let controller = Self {
            root,
            options,
            map,
            field_order,
            toggle_specs,
        };
        controller.apply_initial_state(adapter)?;

        let summary = AttachSummary {
            root,
            questions: questions.len(),
            keys: controller.map.len(),
            fields: controller.field_order.clone(),
            unbound_fields,
            skipped,
        };
        debug!(
            root = ?root,
            questions = summary.questions,
            keys = summary.keys,
            fields = summary.fields.len(),
            skipped = summary.skipped.len(),
            "dependent questions attached"
        );
        Ok((controller, summary))
    }

    pub fn root(&self) -> N {
        self.root
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn dependency_map(&self) -> &DependencyMap<N> {
        &self.map
    }

    pub fn fields(&self) -> &[String] {
        &self.field_order
    }

    pub fn toggle_spec(&self, field: &str) -> &[ToggleBinding] {
        self.toggle_specs
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn apply_initial_state<A>(&self, adapter: &mut A) -> Result<()>
    where
        A: DomAdapter<Node = N> + ?Sized,
    {
        for (key, dependents) in self.map.iter() {
            let value = current_value(&*adapter, &key.field);
            apply(adapter, dependents, value.as_ref(), &key.expected, Transition::Instant)?;
        }
        Ok(())
    }

    /// Re-evaluates every binding recorded for `field`, animating with the
    /// configured effect. Returns how many bindings were applied.
    pub fn handle_change<A>(&self, adapter: &mut A, field: &str) -> Result<usize>
    where
        A: DomAdapter<Node = N> + ?Sized,
    {
        let bindings = self.toggle_spec(field);
        if bindings.is_empty() {
            return Ok(0);
        }

        let value = current_value(&*adapter, field);
        let transition = Transition::Animated {
            effect: self.options.effect,
            duration: self.options.duration,
        };
        trace!(field = %field, value = ?value, bindings = bindings.len(), "evaluating change");
        for binding in bindings {
            let dependents = &self.map.entries[binding.slot].1;
            apply(adapter, dependents, value.as_ref(), &binding.expected, transition)?;
        }
        Ok(bindings.len())
    }
}

fn declaration_of<A>(adapter: &A, question: A::Node) -> Result<Option<(DependMode, String)>>
where
    A: DomQuery + ?Sized,
{
    for mode in [DependMode::On, DependMode::Off] {
        let attribute = mode.attribute();
        let selector = format!("[{attribute}]");
        if let Some(marker) = adapter.select_within(question, &selector)?.first() {
            let raw = adapter.attribute(*marker, attribute).unwrap_or_default();
            return Ok(Some((mode, raw)));
        }
    }
    Ok(None)
}

fn apply<A>(
    adapter: &mut A,
    dependents: &Dependents<A::Node>,
    value: Option<&FieldValue>,
    expected: &str,
    transition: Transition,
) -> Result<()>
where
    A: DomAdapter + ?Sized,
{
    let matched = value_matches(value, expected);
    adapter.set_visible(&dependents.on, matched, transition)?;
    adapter.set_visible(&dependents.off, !matched, transition)?;
    Ok(())
}

/// Registry of attached roots; attaching the same root twice is a no-op.
#[derive(Debug, Clone)]
pub struct DependentQuestions<N> {
    controllers: Vec<Controller<N>>,
    attached: HashSet<N>,
}

impl<N> Default for DependentQuestions<N> {
    fn default() -> Self {
        Self {
            controllers: Vec::new(),
            attached: HashSet::new(),
        }
    }
}

impl<N> DependentQuestions<N>
where
    N: Copy + Eq + std::hash::Hash + std::fmt::Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach<A>(
        &mut self,
        adapter: &mut A,
        root: N,
        options: Options,
    ) -> Result<AttachOutcome<N>>
    where
        A: DomAdapter<Node = N> + ?Sized,
    {
        if self.attached.contains(&root) {
            debug!(root = ?root, "dependent questions already attached");
            return Ok(AttachOutcome::AlreadyAttached { root });
        }

        let (controller, summary) = Controller::build(adapter, root, options)?;
        self.attached.insert(root);
        self.controllers.push(controller);
        Ok(AttachOutcome::Attached(summary))
    }

    pub fn handle_change<A>(&self, adapter: &mut A, root: N, field: &str) -> Result<usize>
    where
        A: DomAdapter<Node = N> + ?Sized,
    {
        match self.controller(root) {
            Some(controller) => controller.handle_change(adapter, field),
            None => Ok(0),
        }
    }

    pub fn controller(&self, root: N) -> Option<&Controller<N>> {
        self.controllers
            .iter()
            .find(|controller| controller.root == root)
    }

    pub fn is_attached(&self, root: N) -> bool {
        self.attached.contains(&root)
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}
