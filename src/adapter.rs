use std::fmt;
use std::hash::Hash;

use crate::Result;
use crate::options::{Duration, Effect};

/// How a control reports its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// Text-like inputs, textareas, single selects.
    Single,
    Radio,
    Checkbox,
    SelectMultiple,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlState {
    pub kind: ControlKind,
    pub value: String,
    pub checked: bool,
    /// Selected option values; only populated for [`ControlKind::SelectMultiple`].
    pub selected: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityAction {
    Show,
    Hide,
    SlideDown,
    SlideUp,
    FadeIn,
    FadeOut,
}

impl VisibilityAction {
    pub fn name(self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Hide => "hide",
            Self::SlideDown => "slideDown",
            Self::SlideUp => "slideUp",
            Self::FadeIn => "fadeIn",
            Self::FadeOut => "fadeOut",
        }
    }
}

impl fmt::Display for VisibilityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Used for the initial pass.
    Instant,
    Animated { effect: Effect, duration: Duration },
}

impl Transition {
    pub fn action(self, visible: bool) -> VisibilityAction {
        match (self, visible) {
            (Self::Instant, true) => VisibilityAction::Show,
            (Self::Instant, false) => VisibilityAction::Hide,
            (Self::Animated { effect, .. }, true) => effect.show_action(),
            (Self::Animated { effect, .. }, false) => effect.hide_action(),
        }
    }

    pub fn duration_ms(self) -> u64 {
        match self {
            Self::Instant => 0,
            Self::Animated { duration, .. } => duration.millis(),
        }
    }
}

/// Read access to a document host.
pub trait DomQuery {
    type Node: Copy + Eq + Hash + fmt::Debug;

    /// Elements strictly below `root` matching `selector`, in document order.
    fn select_within(&self, root: Self::Node, selector: &str) -> Result<Vec<Self::Node>>;

    /// Ancestors of `node` matching `selector`, nearest first.
    fn ancestors_matching(&self, node: Self::Node, selector: &str) -> Result<Vec<Self::Node>>;

    fn attribute(&self, node: Self::Node, name: &str) -> Option<String>;

    /// Form controls carrying `name`, in document order.
    fn controls_named(&self, name: &str) -> Vec<Self::Node>;

    fn control_state(&self, node: Self::Node) -> Option<ControlState>;
}

/// Everything the controller needs from a document host.
///
/// Implementations own event dispatch: when a bound control changes they are
/// expected to call back into [`crate::DependentQuestions::handle_change`]
/// with the root and field name that were passed to
/// [`DomAdapter::listen_change`].
pub trait DomAdapter: DomQuery {
    fn set_visible(
        &mut self,
        nodes: &[Self::Node],
        visible: bool,
        transition: Transition,
    ) -> Result<()>;

    /// Binds one change listener for (`root`, `field`) to every control named
    /// `field`. Returns `false` when no such control exists; binding the same
    /// pair twice must not add a second listener.
    fn listen_change(&mut self, root: Self::Node, field: &str) -> bool;
}
