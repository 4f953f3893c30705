use crate::error::{FilterError, RecordError};
use log::{debug, warn};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

pub const EPG_TAG_TV: &str = "tv";
pub const EPG_TAG_CHANNEL: &str = "channel";
pub const EPG_TAG_PROGRAMME: &str = "programme";
pub const EPG_TAG_DISPLAY_NAME: &str = "display-name";
pub const EPG_TAG_ICON: &str = "icon";
pub const EPG_TAG_TITLE: &str = "title";
pub const EPG_TAG_DESC: &str = "desc";
pub const EPG_ATTRIB_ID: &str = "id";
pub const EPG_ATTRIB_CHANNEL: &str = "channel";
pub const EPG_ATTRIB_START: &str = "start";
pub const EPG_ATTRIB_STOP: &str = "stop";

/// A generic XML element, kept whole so unknown sub-elements survive output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(|child| child.text.as_deref())
    }

    /// A copy keeping only the direct children for which `keep` holds
    pub fn retain_children(&self, keep: impl Fn(&XmlNode) -> bool) -> XmlNode {
        XmlNode {
            name: self.name.clone(),
            attributes: self.attributes.clone(),
            text: self.text.clone(),
            children: self.children.iter().filter(|c| keep(c)).cloned().collect(),
        }
    }

    /// A copy with every element named `name` removed, at any depth
    pub fn without_descendants(&self, name: &str) -> XmlNode {
        XmlNode {
            name: self.name.clone(),
            attributes: self.attributes.clone(),
            text: self.text.clone(),
            children: self
                .children
                .iter()
                .filter(|child| child.name != name)
                .map(|child| child.without_descendants(name))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    id: String,
    node: XmlNode,
}

impl Channel {
    pub fn from_node(node: XmlNode) -> Result<Self, RecordError> {
        let id = node
            .attribute(EPG_ATTRIB_ID)
            .ok_or(RecordError::MissingAttribute {
                element: EPG_TAG_CHANNEL,
                attribute: EPG_ATTRIB_ID,
            })?
            .to_string();
        Ok(Channel { id, node })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> Option<&str> {
        self.node.child_text(EPG_TAG_DISPLAY_NAME)
    }

    pub fn icon(&self) -> Option<&str> {
        self.node
            .child(EPG_TAG_ICON)
            .and_then(|icon| icon.attribute("src"))
    }

    pub fn node(&self) -> &XmlNode {
        &self.node
    }

    pub(crate) fn with_node(&self, node: XmlNode) -> Channel {
        Channel {
            id: self.id.clone(),
            node,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Programme {
    channel: String,
    start: String,
    node: XmlNode,
}

impl Programme {
    pub fn from_node(node: XmlNode) -> Result<Self, RecordError> {
        let required = |attribute: &'static str| {
            node.attribute(attribute)
                .map(str::to_string)
                .ok_or(RecordError::MissingAttribute {
                    element: EPG_TAG_PROGRAMME,
                    attribute,
                })
        };
        let channel = required(EPG_ATTRIB_CHANNEL)?;
        let start = required(EPG_ATTRIB_START)?;
        Ok(Programme {
            channel,
            start,
            node,
        })
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Raw XMLTV start timestamp
    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn stop(&self) -> Option<&str> {
        self.node.attribute(EPG_ATTRIB_STOP)
    }

    pub fn title(&self) -> Option<&str> {
        self.node.child_text(EPG_TAG_TITLE)
    }

    /// Text of an optional sub-element such as `desc` or `category`
    pub fn sub_element(&self, name: &str) -> Option<&str> {
        self.node.child_text(name)
    }

    pub fn has_sub_element(&self, name: &str) -> bool {
        self.node.child(name).is_some()
    }

    pub fn node(&self) -> &XmlNode {
        &self.node
    }

    pub(crate) fn with_node(&self, node: XmlNode) -> Programme {
        Programme {
            channel: self.channel.clone(),
            start: self.start.clone(),
            node,
        }
    }
}

/// A top-level record of the guide, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Channel(Channel),
    Programme(Programme),
}

/// A parsed XMLTV guide
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmltvDocument {
    pub doctype: Option<String>,
    pub root_attributes: Vec<(String, String)>,
    pub records: Vec<Record>,
    /// Records dropped while parsing
    pub skipped: Vec<RecordError>,
}

impl XmltvDocument {
    /// Parses an XMLTV document.
    ///
    /// Reader errors and a missing or foreign root element are fatal. A
    /// channel or programme with bad or missing attributes is skipped.
    pub fn parse(content: &str) -> Result<Self, FilterError> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(false);

        let mut document = XmltvDocument::default();
        let mut root_seen = false;
        let mut root_closed = false;
        let mut stack: Vec<PendingNode> = Vec::new();

        loop {
            match reader.read_event()? {
                Event::DocType(text) => {
                    document.doctype = Some(String::from_utf8_lossy(&text).trim().to_string());
                }
                Event::Start(start) => {
                    let pending = PendingNode::open(&start);
                    if root_closed {
                        return Err(FilterError::TrailingElement(pending.node.name));
                    }
                    if !root_seen {
                        document.root_attributes = accept_root(&pending)?;
                        root_seen = true;
                    } else {
                        stack.push(pending);
                    }
                }
                Event::Empty(start) => {
                    let pending = PendingNode::open(&start);
                    if root_closed {
                        return Err(FilterError::TrailingElement(pending.node.name));
                    }
                    if !root_seen {
                        document.root_attributes = accept_root(&pending)?;
                        root_seen = true;
                        root_closed = true;
                    } else {
                        document.attach(&mut stack, pending);
                    }
                }
                Event::End(_) => match stack.pop() {
                    Some(pending) => document.attach(&mut stack, pending),
                    None => root_closed = true,
                },
                Event::Text(text) => {
                    if let Some(top) = stack.last_mut() {
                        match text.unescape() {
                            Ok(value) if value.trim().is_empty() => {}
                            Ok(value) => top.push_text(&value),
                            Err(err) => top.fail(format!("bad text content: {err}")),
                        }
                    }
                }
                Event::CData(data) => {
                    if let Some(top) = stack.last_mut() {
                        top.push_text(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !root_seen {
            return Err(FilterError::UnexpectedRoot(String::new()));
        }
        if !root_closed || !stack.is_empty() {
            return Err(FilterError::UnclosedDocument);
        }

        Ok(document)
    }

    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.records.iter().filter_map(|record| match record {
            Record::Channel(channel) => Some(channel),
            Record::Programme(_) => None,
        })
    }

    pub fn programmes(&self) -> impl Iterator<Item = &Programme> {
        self.records.iter().filter_map(|record| match record {
            Record::Programme(programme) => Some(programme),
            Record::Channel(_) => None,
        })
    }

    /// Hands a closed element to its parent, or files it as a record when it
    /// sits directly under the root.
    fn attach(&mut self, stack: &mut [PendingNode], pending: PendingNode) {
        if let Some(parent) = stack.last_mut() {
            if parent.error.is_none() {
                parent.error = pending.error;
            }
            parent.node.children.push(pending.node);
            return;
        }

        let element = match pending.node.name.as_str() {
            EPG_TAG_CHANNEL => EPG_TAG_CHANNEL,
            EPG_TAG_PROGRAMME => EPG_TAG_PROGRAMME,
            other => {
                debug!("Dropping top-level <{other}> element");
                return;
            }
        };

        let record = match pending.error {
            Some(reason) => Err(RecordError::BadAttribute { element, reason }),
            None if element == EPG_TAG_CHANNEL => Channel::from_node(pending.node).map(Record::Channel),
            None => Programme::from_node(pending.node).map(Record::Programme),
        };

        match record {
            Ok(record) => self.records.push(record),
            Err(err) => {
                warn!("Skipping malformed record: {err}");
                self.skipped.push(err);
            }
        }
    }
}

fn accept_root(pending: &PendingNode) -> Result<Vec<(String, String)>, FilterError> {
    if pending.node.name != EPG_TAG_TV {
        return Err(FilterError::UnexpectedRoot(pending.node.name.clone()));
    }
    if let Some(reason) = &pending.error {
        warn!("Ignoring unreadable <tv> attributes: {reason}");
    }
    Ok(pending.node.attributes.clone())
}

/// An element still being read, with the first problem found inside it
struct PendingNode {
    node: XmlNode,
    error: Option<String>,
}

impl PendingNode {
    fn open(start: &BytesStart) -> Self {
        let mut node = XmlNode::new(String::from_utf8_lossy(start.name().as_ref()));
        let mut error = None;

        for attr in start.attributes() {
            let parsed = attr.map_err(|err| err.to_string()).and_then(|attr| {
                let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
                attr.unescape_value()
                    .map(|value| (key, value.to_string()))
                    .map_err(|err| err.to_string())
            });
            match parsed {
                Ok(pair) => node.attributes.push(pair),
                Err(reason) => {
                    error.get_or_insert(reason);
                }
            }
        }

        PendingNode { node, error }
    }

    fn push_text(&mut self, text: &str) {
        self.node.text.get_or_insert_with(String::new).push_str(text);
    }

    fn fail(&mut self, reason: String) {
        self.error.get_or_insert(reason);
    }
}
