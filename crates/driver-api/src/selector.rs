use std::fmt;

/// How an element is addressed.
///
/// `Option` selectors address one rendered option of a choice control by its
/// option code; a concrete driver maps this to whatever the binding needs
/// (e.g. `control option[value='code']` for a CSS-capable binding).
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Selector {
    /// CSS-style structural selector.
    Css(String),
    /// A control addressed by its adjacent label text (toggle switches).
    LabelText(String),
    /// One option of a choice control, addressed by option code.
    Option {
        control: Box<Selector>,
        value: String,
    },
}

impl Selector {
    pub fn css(selector: impl Into<String>) -> Self {
        Selector::Css(selector.into())
    }

    pub fn label(text: impl Into<String>) -> Self {
        Selector::LabelText(text.into())
    }

    pub fn option_of(control: &Selector, value: impl Into<String>) -> Self {
        Selector::Option {
            control: Box::new(control.clone()),
            value: value.into(),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(css) => f.write_str(css),
            Selector::LabelText(text) => write!(f, "label[{text}]"),
            Selector::Option { control, value } => {
                write!(f, "{control} option[value={value}]")
            }
        }
    }
}

/// Reference to one rendered element.
///
/// Handles are epoch-tagged: a render-affecting mutation bumps the epoch of
/// the elements it touches, and a handle from an older epoch fails with
/// [`formpilot_core_types::FlowError::StaleHandle`]. A handle must therefore
/// never be held across a mutation; re-locate instead.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Handle {
    pub node: u64,
    pub epoch: u64,
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}@{}", self.node, self.epoch)
    }
}
