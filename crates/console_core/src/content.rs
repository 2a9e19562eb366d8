use serde_json::Value;

/// Backend payload fragment, parsed once at the transport boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderableContent {
    Text(String),
    /// Ordered key/value pairs; key order follows the payload.
    Structured(Vec<(String, RenderableContent)>),
    List(Vec<RenderableContent>),
}

impl RenderableContent {
    /// Converts a JSON value, dropping `null` entries. A top-level `null` yields `None`.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(flag) => Some(Self::Text(flag.to_string())),
            Value::Number(number) => Some(Self::Text(number.to_string())),
            Value::String(text) => Some(Self::Text(text)),
            Value::Array(items) => Some(Self::List(
                items.into_iter().filter_map(Self::from_json).collect(),
            )),
            Value::Object(map) => Some(Self::Structured(
                map.into_iter()
                    .filter_map(|(key, value)| Self::from_json(value).map(|content| (key, content)))
                    .collect(),
            )),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Looks up a key on a structured value.
    pub fn get(&self, key: &str) -> Option<&RenderableContent> {
        match self {
            Self::Structured(entries) => entries
                .iter()
                .find(|(candidate, _)| candidate == key)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// Follows a path of keys through nested structured values.
    pub fn get_path(&self, path: &[&str]) -> Option<&RenderableContent> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Structured(entries) => entries.is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }
}

impl From<&str> for RenderableContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for RenderableContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::RenderableContent;
    use serde_json::json;

    #[test]
    fn nulls_are_dropped_and_order_is_kept() {
        let value = json!({
            "zeta": 1,
            "alpha": null,
            "beta": [true, null, "x"],
        });
        let content = RenderableContent::from_json(value).unwrap();
        assert_eq!(
            content,
            RenderableContent::Structured(vec![
                ("zeta".to_string(), RenderableContent::text("1")),
                (
                    "beta".to_string(),
                    RenderableContent::List(vec![
                        RenderableContent::text("true"),
                        RenderableContent::text("x"),
                    ])
                ),
            ])
        );
    }

    #[test]
    fn top_level_null_is_absent() {
        assert_eq!(RenderableContent::from_json(serde_json::Value::Null), None);
    }

    #[test]
    fn path_lookup_walks_nested_maps() {
        let content = RenderableContent::from_json(json!({
            "agents_outputs": { "doc_assistant": { "document": "# Doc" } }
        }))
        .unwrap();
        let doc = content.get_path(&["agents_outputs", "doc_assistant", "document"]);
        assert_eq!(doc.and_then(RenderableContent::as_text), Some("# Doc"));
        assert!(content.get_path(&["agents_outputs", "missing"]).is_none());
    }
}
