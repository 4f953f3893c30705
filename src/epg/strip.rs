use super::document::{Channel, EPG_TAG_DESC, EPG_TAG_TITLE, Programme};
use serde::Serialize;

/// Content removal applied to kept records before output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StripOptions {
    /// Drop `desc` elements
    pub nodesc: bool,
    /// Reduce programmes to their attributes and titles
    pub basic: bool,
}

impl StripOptions {
    pub fn is_noop(&self) -> bool {
        !self.nodesc && !self.basic
    }

    pub fn programme(&self, programme: &Programme) -> Programme {
        let mut node = programme.node().clone();
        if self.basic {
            node = node.retain_children(|child| child.name == EPG_TAG_TITLE);
        }
        if self.nodesc {
            node = node.without_descendants(EPG_TAG_DESC);
        }
        programme.with_node(node)
    }

    pub fn channel(&self, channel: &Channel) -> Channel {
        if self.nodesc {
            channel.with_node(channel.node().without_descendants(EPG_TAG_DESC))
        } else {
            channel.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epg::document::XmlNode;

    fn programme() -> Programme {
        let mut node = XmlNode::new("programme");
        node.attributes = vec![
            ("start".to_string(), "20240101100000 +0000".to_string()),
            ("stop".to_string(), "20240101110000 +0000".to_string()),
            ("channel".to_string(), "1".to_string()),
        ];
        for (name, text) in [("title", "News"), ("sub-title", "Late"), ("desc", "About"), ("rating", "PG")] {
            let mut child = XmlNode::new(name);
            child.text = Some(text.to_string());
            node.children.push(child);
        }
        Programme::from_node(node).unwrap()
    }

    #[test]
    fn nodesc_removes_only_description() {
        let stripped = StripOptions { nodesc: true, basic: false }.programme(&programme());
        assert!(!stripped.has_sub_element("desc"));
        assert_eq!(stripped.sub_element("rating"), Some("PG"));
        assert_eq!(stripped.title(), Some("News"));
    }

    #[test]
    fn basic_keeps_attributes_and_title() {
        let stripped = StripOptions { nodesc: false, basic: true }.programme(&programme());
        let names: Vec<&str> = stripped.node().children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["title"]);
        assert_eq!(stripped.node().attributes.len(), 3);
        assert_eq!(stripped.stop(), Some("20240101110000 +0000"));
    }

    #[test]
    fn basic_is_idempotent() {
        let options = StripOptions { nodesc: false, basic: true };
        let once = options.programme(&programme());
        let twice = options.programme(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn basic_subsumes_nodesc() {
        let both = StripOptions { nodesc: true, basic: true }.programme(&programme());
        let basic = StripOptions { nodesc: false, basic: true }.programme(&programme());
        assert_eq!(both, basic);
    }
}
