use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// A message field that is either a fixed value or computed per gateway.
///
/// Some providers want the same logical message rendered differently (e.g. a
/// signature prefix in square brackets vs. none at all). A computed field
/// receives the gateway name once the concrete gateway for an attempt is
/// known, and is evaluated at that point, not before.
pub enum DynamicField<T> {
    /// The same value for every gateway.
    Literal(T),
    /// A per-gateway rendering, keyed by gateway name.
    Computed(Arc<dyn Fn(&str) -> T + Send + Sync>),
}

impl<T: Clone> DynamicField<T> {
    /// Resolve the field for the named gateway.
    pub fn resolve(&self, gateway: &str) -> T {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Computed(render) => render(gateway),
        }
    }
}

impl<T: Clone> Clone for DynamicField<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Literal(value) => Self::Literal(value.clone()),
            Self::Computed(render) => Self::Computed(Arc::clone(render)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<&str> for DynamicField<String> {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_owned())
    }
}

impl From<String> for DynamicField<String> {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
/// Template parameters: either named or positional, whichever the provider's
/// template engine expects.
pub enum TemplateData {
    /// Named parameters (`{"code": "1234"}`).
    Map(BTreeMap<String, String>),
    /// Positional parameters (`["1234", "5"]`).
    List(Vec<String>),
}

impl TemplateData {
    /// Build named parameters from key/value pairs.
    pub fn map<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build positional parameters from a sequence of values.
    pub fn list<V: Into<String>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, Default)]
/// What to send: literal or per-gateway content, or a provider template with
/// parameters, plus optional per-message overrides of the gateways to try
/// and the selection strategy.
///
/// Exactly one of `content` or `template` + `data` is meaningful per send; a
/// gateway adapter decides which it consumes. Unset fields resolve to `None`,
/// which is not an error.
pub struct Message {
    content: Option<DynamicField<String>>,
    template: Option<DynamicField<String>>,
    data: Option<DynamicField<TemplateData>>,
    gateways: Option<Vec<String>>,
    strategy: Option<String>,
}

impl Message {
    /// Message with literal text content.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(DynamicField::Literal(content.into())),
            ..Self::default()
        }
    }

    /// Message backed by a provider template and its parameters.
    pub fn from_template(template: impl Into<String>, data: TemplateData) -> Self {
        Self {
            template: Some(DynamicField::Literal(template.into())),
            data: Some(DynamicField::Literal(data)),
            ..Self::default()
        }
    }

    /// Set content rendered per gateway.
    pub fn with_content_fn(
        mut self,
        render: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.content = Some(DynamicField::Computed(Arc::new(render)));
        self
    }

    /// Set a template id selected per gateway.
    pub fn with_template_fn(
        mut self,
        render: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.template = Some(DynamicField::Computed(Arc::new(render)));
        self
    }

    /// Set template parameters built per gateway.
    pub fn with_data_fn(
        mut self,
        render: impl Fn(&str) -> TemplateData + Send + Sync + 'static,
    ) -> Self {
        self.data = Some(DynamicField::Computed(Arc::new(render)));
        self
    }

    /// Restrict this message to the named gateways.
    pub fn with_gateways<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.gateways = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Select the strategy used to order gateways for this message.
    pub fn with_strategy(mut self, name: impl Into<String>) -> Self {
        self.strategy = Some(name.into());
        self
    }

    /// Resolve the content for the named gateway, `None` when unset.
    pub fn content(&self, gateway: &str) -> Option<String> {
        self.content.as_ref().map(|field| field.resolve(gateway))
    }

    /// Resolve the template id for the named gateway, `None` when unset.
    pub fn template(&self, gateway: &str) -> Option<String> {
        self.template.as_ref().map(|field| field.resolve(gateway))
    }

    /// Resolve the template parameters for the named gateway, `None` when
    /// unset.
    pub fn data(&self, gateway: &str) -> Option<TemplateData> {
        self.data.as_ref().map(|field| field.resolve(gateway))
    }

    /// Per-message gateway override, if any.
    pub fn gateways(&self) -> Option<&[String]> {
        self.gateways.as_deref()
    }

    /// Per-message strategy override, if any.
    pub fn strategy(&self) -> Option<&str> {
        self.strategy.as_deref()
    }
}
