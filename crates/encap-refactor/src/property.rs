//! Property block generation
//!
//! One [`PropertyAttributeSet`] becomes a `Property Get` block, optionally
//! followed by `Property Let` and `Property Set` blocks.

use encap_source::{BlockIndenter, Indenter, MemberPath};

/// Everything needed to emit one property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyAttributeSet {
    /// Property name
    pub property_name: String,
    /// Storage read and written, e.g. `this.Count`
    pub backing_field: MemberPath,
    /// Property type
    pub as_type_name: String,
    /// Setter parameter
    pub parameter_name: String,
    /// Emit `Property Let`
    pub generate_letter: bool,
    /// Emit `Property Set`
    pub generate_setter: bool,
    /// Getter assigns with `Set`
    pub uses_set_assignment: bool,
    /// Backing is a record; Let takes it `ByRef`
    pub is_record_property: bool,
    /// Getter branches on `IsObject`
    pub is_variant: bool,
}

/// Emits property blocks, indented by `I`
#[derive(Debug, Clone, Default)]
pub struct PropertyGenerator<I: Indenter = BlockIndenter> {
    indenter: I,
}

impl<I: Indenter> PropertyGenerator<I> {
    /// Create with a specific indenter
    #[inline]
    #[must_use]
    pub fn new(indenter: I) -> Self {
        Self { indenter }
    }

    /// Get block, then Let and Set where requested, separated by a blank line
    #[must_use]
    pub fn generate(&self, set: &PropertyAttributeSet) -> String {
        let mut blocks = vec![self.getter(set)];
        if set.generate_letter {
            blocks.push(self.letter(set));
        }
        if set.generate_setter {
            blocks.push(self.setter(set));
        }
        blocks.join("\n\n")
    }

    fn getter(&self, set: &PropertyAttributeSet) -> String {
        let name = &set.property_name;
        let backing = &set.backing_field;
        let body = if set.is_variant {
            format!(
                "If IsObject({backing}) Then\nSet {name} = {backing}\nElse\n{name} = {backing}\nEnd If"
            )
        } else if set.uses_set_assignment {
            format!("Set {name} = {backing}")
        } else {
            format!("{name} = {backing}")
        };
        self.block(
            &format!("Public Property Get {name}() As {}", set.as_type_name),
            &body,
        )
    }

    fn letter(&self, set: &PropertyAttributeSet) -> String {
        let passing = if set.is_record_property { "ByRef" } else { "ByVal" };
        self.block(
            &format!(
                "Public Property Let {}({passing} {} As {})",
                set.property_name, set.parameter_name, set.as_type_name
            ),
            &format!("{} = {}", set.backing_field, set.parameter_name),
        )
    }

    fn setter(&self, set: &PropertyAttributeSet) -> String {
        self.block(
            &format!(
                "Public Property Set {}(ByVal {} As {})",
                set.property_name, set.parameter_name, set.as_type_name
            ),
            &format!("Set {} = {}", set.backing_field, set.parameter_name),
        )
    }

    fn block(&self, signature: &str, body: &str) -> String {
        self.indenter
            .indent(&format!("{signature}\n{body}\nEnd Property"))
            .join("\n")
    }
}
