//! Reading element paths off host-document elements.
//!
//! Host elements carry a `data-path` attribute holding one or more element
//! path strings separated by whitespace, shallowest first.

use crate::core::path::ElementPath;

pub const PATH_ATTRIBUTE: &str = "data-path";

/// Attribute access on a live host-document element.
pub trait HostElement {
    fn attribute(&self, name: &str) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathWithString {
    pub path: ElementPath,
    pub as_string: String,
}

/// Split a multi-path attribute value into individual path strings.
pub fn split_path_strings(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| value.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Parse every path in `raw`, dropping entries that fail to parse.
pub fn paths_from_string(raw: Option<&str>) -> Vec<ElementPath> {
    split_path_strings(raw)
        .iter()
        .filter_map(|path| path.parse().ok())
        .collect()
}

pub fn path_strings_on_element(element: &dyn HostElement) -> Vec<String> {
    split_path_strings(element.attribute(PATH_ATTRIBUTE).as_deref())
}

pub fn paths_on_element(element: &dyn HostElement) -> Vec<ElementPath> {
    paths_from_string(element.attribute(PATH_ATTRIBUTE).as_deref())
}

pub fn paths_with_strings_on_element(element: &dyn HostElement) -> Vec<PathWithString> {
    path_strings_on_element(element)
        .into_iter()
        .filter_map(|as_string| {
            let path = as_string.parse().ok()?;
            Some(PathWithString { path, as_string })
        })
        .collect()
}

/// The last parseable path on the element.
pub fn deepest_path_on_element(element: &dyn HostElement) -> Option<ElementPath> {
    paths_on_element(element).pop()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeElement(HashMap<String, String>);

    impl FakeElement {
        fn with_paths(paths: &str) -> Self {
            Self(HashMap::from([(
                PATH_ATTRIBUTE.to_string(),
                paths.to_string(),
            )]))
        }
    }

    impl HostElement for FakeElement {
        fn attribute(&self, name: &str) -> Option<String> {
            self.0.get(name).cloned()
        }
    }

    #[test]
    fn unparseable_paths_are_dropped() {
        let element = FakeElement::with_paths("app/card  app//broken app/card:root");
        assert_eq!(path_strings_on_element(&element).len(), 3);
        let paths = paths_on_element(&element);
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[1].to_uid(), "root");

        let with_strings = paths_with_strings_on_element(&element);
        assert_eq!(with_strings[0].as_string, "app/card");
        assert_eq!(with_strings[1].as_string, "app/card:root");
    }

    #[test]
    fn deepest_path_is_last() {
        let element = FakeElement::with_paths("app app/card app/card:root");
        assert_eq!(
            deepest_path_on_element(&element).map(|path| path.to_string()),
            Some("app/card:root".to_string())
        );
    }

    #[test]
    fn missing_attribute_yields_nothing() {
        let element = FakeElement(HashMap::new());
        assert!(paths_on_element(&element).is_empty());
        assert!(deepest_path_on_element(&element).is_none());
    }
}
