use super::document::{EPG_TAG_TV, Record, XmlNode, XmltvDocument};
use crate::error::FilterError;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Write;

/// Serialises a guide with an XML declaration and two-space indentation
pub fn write_document(document: &XmltvDocument) -> Result<String, FilterError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_events(&mut writer, document)?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(|err| FilterError::Output {
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
    })
}

fn write_events<W: Write>(writer: &mut Writer<W>, document: &XmltvDocument) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    if let Some(doctype) = &document.doctype {
        writer.write_event(Event::DocType(BytesText::from_escaped(doctype.as_str())))?;
    }

    let mut root = BytesStart::new(EPG_TAG_TV);
    for (key, value) in &document.root_attributes {
        root.push_attribute((key.as_str(), value.as_str()));
    }
    writer.write_event(Event::Start(root))?;

    for record in &document.records {
        match record {
            Record::Channel(channel) => write_node(writer, channel.node())?,
            Record::Programme(programme) => write_node(writer, programme.node())?,
        }
    }

    writer.write_event(Event::End(BytesEnd::new(EPG_TAG_TV)))?;
    Ok(())
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &XmlNode) -> Result<(), quick_xml::Error> {
    let mut start = BytesStart::new(node.name.as_str());
    for (key, value) in &node.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if node.text.is_none() && node.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(text) = &node.text {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in &node.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(node.name.as_str())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_parses_back_to_same_records() {
        let xml = r#"<?xml version="1.0"?>
<!DOCTYPE tv SYSTEM "xmltv.dtd">
<tv source-info-name="x"><channel id="a&amp;b"><display-name>A &lt;1&gt;</display-name><icon src="i.png"/></channel><programme start="20240101100000 +0000" channel="a&amp;b"><title>T</title><desc><![CDATA[cdata text]]></desc></programme></tv>"#;
        let document = XmltvDocument::parse(xml).unwrap();
        let written = write_document(&document).unwrap();

        assert!(written.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(written.contains(r#"<!DOCTYPE tv SYSTEM "xmltv.dtd">"#));
        assert!(written.contains(r#"<icon src="i.png"/>"#));

        let reparsed = XmltvDocument::parse(&written).unwrap();
        assert_eq!(reparsed.records, document.records);
        assert_eq!(reparsed.root_attributes, document.root_attributes);
    }

    #[test]
    fn empty_guide_keeps_root() {
        let document = XmltvDocument::parse("<tv/>").unwrap();
        let written = write_document(&document).unwrap();
        let reparsed = XmltvDocument::parse(&written).unwrap();
        assert!(reparsed.records.is_empty());
    }
}
