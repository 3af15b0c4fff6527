//! Path-based extraction from XML carrier responses and escaping for XML
//! request templates. Element names are matched on their local part, so
//! namespace prefixes such as `res:` are ignored.

use roxmltree::Node;

/// First child element named `name`.
pub fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|candidate| candidate.is_element() && candidate.tag_name().name() == name)
}

/// All child elements named `name`, in document order.
pub fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |candidate| candidate.is_element() && candidate.tag_name().name() == name)
}

/// Follows element names from `node`, taking the first match at each step.
pub fn path<'a, 'input>(node: Node<'a, 'input>, names: &[&str]) -> Option<Node<'a, 'input>> {
    names.iter().try_fold(node, |current, name| child(current, name))
}

/// Trimmed text of the element at `names`; `None` when absent or blank.
pub fn text_at(node: Node<'_, '_>, names: &[&str]) -> Option<String> {
    path(node, names)
        .and_then(|found| found.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

/// Text at `names`, or an empty string.
pub fn text_or_empty(node: Node<'_, '_>, names: &[&str]) -> String {
    text_at(node, names).unwrap_or_default()
}

/// First descendant element (including `node` itself) named `name`.
pub fn descendant<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants()
        .find(|candidate| candidate.is_element() && candidate.tag_name().name() == name)
}

/// Escapes text for element content and attribute values.
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
