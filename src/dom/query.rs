//! DOM queries: selector matching over a scope, lookup by id, `closest`.
//!
//! Queries walk the light tree in document order. They never enter template
//! content (it is not a child of the template element) and never cross into
//! shadow roots (they are not children of their host).

use super::node::NodeId;
use super::selector::{SelectorError, SelectorList};
use super::tree::Dom;

impl Dom {
    /// Find the first descendant of `scope` matching `selector`.
    ///
    /// `scope` itself is never returned.
    pub fn query_selector(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>, SelectorError> {
        let list = SelectorList::parse(selector)?;
        Ok(self.descendants(scope).find(|&id| list.matches(self, id)))
    }

    /// Find every descendant of `scope` matching `selector`, in tree order.
    pub fn query_selector_all(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let list = SelectorList::parse(selector)?;
        Ok(self
            .descendants(scope)
            .filter(|&id| list.matches(self, id))
            .collect())
    }

    /// Check whether `node` matches `selector`.
    pub fn matches(&self, node: NodeId, selector: &str) -> Result<bool, SelectorError> {
        Ok(SelectorList::parse(selector)?.matches(self, node))
    }

    /// Find the nearest inclusive ancestor of `node` matching `selector`.
    pub fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        let list = SelectorList::parse(selector)?;
        if list.matches(self, node) {
            return Ok(Some(node));
        }
        Ok(self
            .ancestors(node)
            .into_iter()
            .find(|&id| list.matches(self, id)))
    }

    /// Find the first element in `scope`'s subtree whose `id` attribute
    /// equals `id`. Tree order, `scope` included.
    pub fn element_by_id(&self, scope: NodeId, id: &str) -> Option<NodeId> {
        self.walk_depth_first(scope)
            .into_iter()
            .find(|&node| self.get(node).is_some_and(|d| d.is_element() && d.id() == Some(id)))
    }

    /// Strict descendants of `scope` in tree order.
    fn descendants(&self, scope: NodeId) -> impl Iterator<Item = NodeId> {
        self.walk_depth_first(scope).into_iter().skip(1)
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::node::{NodeData, NodeId};
    use crate::dom::tree::Dom;

    /// Build a test tree for queries:
    /// ```text
    /// root (document)
    ///  └ div#app.shell
    ///     ├ template#main-layout
    ///     │   content: main#app-content
    ///     ├ nav
    ///     │  ├ a.link[href=/]
    ///     │  └ a.link[href=/alt]
    ///     └ app-sidebar (shadow: slot)
    /// ```
    struct Fixture {
        dom: Dom,
        root: NodeId,
        app: NodeId,
        links: [NodeId; 2],
        sidebar: NodeId,
        slot: NodeId,
    }

    fn build() -> Fixture {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::document());
        let app = dom.insert_child(root, NodeData::element("div").with_id("app").with_class("shell"));

        let template = dom.insert_child(app, NodeData::element("template").with_id("main-layout"));
        let content = dom.insert(NodeData::fragment());
        dom.insert_child(content, NodeData::element("main").with_id("app-content"));
        if let Some(data) = dom.get_mut(template) {
            data.template_content = Some(content);
        }

        let nav = dom.insert_child(app, NodeData::element("nav"));
        let a = dom.insert_child(nav, NodeData::element("a").with_class("link").with_attribute("href", "/"));
        let b = dom.insert_child(
            nav,
            NodeData::element("a").with_class("link").with_attribute("href", "/alt"),
        );

        let sidebar = dom.insert_child(app, NodeData::element("app-sidebar"));
        let shadow = dom.insert(NodeData::shadow_root());
        dom.attach_shadow_root(sidebar, shadow);
        let slot = dom.insert_child(shadow, NodeData::element("slot"));

        Fixture {
            dom,
            root,
            app,
            links: [a, b],
            sidebar,
            slot,
        }
    }

    #[test]
    fn query_selector_returns_first_in_tree_order() {
        let f = build();
        assert_eq!(f.dom.query_selector(f.root, "a.link").unwrap(), Some(f.links[0]));
        assert_eq!(f.dom.query_selector(f.root, "nav > a[href='/alt']").unwrap(), Some(f.links[1]));
    }

    #[test]
    fn query_selector_excludes_scope() {
        let f = build();
        assert_eq!(f.dom.query_selector(f.app, "#app").unwrap(), None);
        assert_eq!(f.dom.query_selector(f.root, "#app").unwrap(), Some(f.app));
    }

    #[test]
    fn query_selector_all_in_order() {
        let f = build();
        assert_eq!(f.dom.query_selector_all(f.root, "a").unwrap(), f.links.to_vec());
        assert!(f.dom.query_selector_all(f.root, "section").unwrap().is_empty());
    }

    #[test]
    fn queries_skip_template_content() {
        let f = build();
        assert_eq!(f.dom.query_selector(f.root, "#app-content").unwrap(), None);
        assert_eq!(f.dom.element_by_id(f.root, "app-content"), None);
        assert!(f.dom.element_by_id(f.root, "main-layout").is_some());
    }

    #[test]
    fn queries_skip_shadow_trees() {
        let f = build();
        assert_eq!(f.dom.query_selector(f.root, "slot").unwrap(), None);
        let shadow = f.dom.shadow_root(f.sidebar).unwrap();
        assert_eq!(f.dom.query_selector(shadow, "slot").unwrap(), Some(f.slot));
    }

    #[test]
    fn closest_is_inclusive() {
        let f = build();
        assert_eq!(f.dom.closest(f.links[0], "a").unwrap(), Some(f.links[0]));
        assert_eq!(f.dom.closest(f.links[0], ".shell").unwrap(), Some(f.app));
        assert_eq!(f.dom.closest(f.links[0], "section").unwrap(), None);
    }

    #[test]
    fn closest_stops_at_shadow_root() {
        let f = build();
        assert_eq!(f.dom.closest(f.slot, "#app").unwrap(), None);
    }

    #[test]
    fn matches_reports_selector_errors() {
        let f = build();
        assert!(f.dom.matches(f.app, "div#app.shell").unwrap());
        assert!(f.dom.matches(f.app, "div >").is_err());
    }
}
